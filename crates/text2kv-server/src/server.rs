use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware, Router};
use directories::ProjectDirs;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    auth::require_token,
    handlers::dispatch,
    store::{ContentStore, KvBackend, MemoryBackend, RedbBackend},
    AppState,
};

/// Token used when none is configured.
pub const DEFAULT_TOKEN: &str = "passwd";

/// Which key-value backend to bind at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// `text2kv.db` in the data directory.
    Redb,
    /// In-process map, lost on restart.
    Memory,
    /// No backend; every request answers 500.
    Unbound,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redb" => Ok(Self::Redb),
            "memory" => Ok(Self::Memory),
            "unbound" | "none" => Ok(Self::Unbound),
            other => anyhow::bail!("unknown backend '{other}' (expected redb, memory or unbound)"),
        }
    }
}

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub token: String,
    pub data_dir: Option<PathBuf>,
    pub backend: BackendKind,
    /// Staleness tolerated by cached reads ($TEXT2KV_CACHE_TTL_SECS).
    /// Passed to the backend on every read; the bundled redb and memory
    /// backends have no read cache and ignore it.
    pub cache_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEXT2KV_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("TEXT2KV_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            token: DEFAULT_TOKEN.into(),
            data_dir: std::env::var("TEXT2KV_DATA_DIR").ok().map(PathBuf::from),
            backend: std::env::var("TEXT2KV_BACKEND")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(BackendKind::Redb),
            cache_ttl: Duration::from_secs(
                std::env::var("TEXT2KV_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }
}

/// Read a token from a file, trimming surrounding whitespace.
/// Fails if the file cannot be read or is empty after trimming.
pub fn read_token_file(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read token file: {}", path.display()))?;
    let token = content.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("token file is empty: {}", path.display());
    }
    Ok(token)
}

/// Resolve the shared token from `TEXT2KV_TOKEN_FILE` (preferred),
/// `TEXT2KV_TOKEN`, or [`DEFAULT_TOKEN`].
pub fn resolve_token() -> Result<String> {
    if let Ok(path) = std::env::var("TEXT2KV_TOKEN_FILE") {
        let token = read_token_file(Path::new(&path))?;
        if std::env::var("TEXT2KV_TOKEN").is_ok() {
            warn!("both TEXT2KV_TOKEN and TEXT2KV_TOKEN_FILE are set; using file");
        }
        return Ok(token);
    }
    match std::env::var("TEXT2KV_TOKEN") {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => {
            warn!("no token configured; falling back to the default token");
            Ok(DEFAULT_TOKEN.into())
        }
    }
}

/// Resolve and create the data directory: explicit path first, then the
/// platform data dir (`~/.local/share/text2kv/`, etc.).
pub fn resolve_data_dir(data_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let path = match data_dir {
        Some(d) => d.clone(),
        None => ProjectDirs::from("", "", "text2kv")
            .context("could not determine platform data directory")?
            .data_dir()
            .to_owned(),
    };
    std::fs::create_dir_all(&path).context("create data dir")?;
    Ok(path)
}

fn bind_store(cfg: &ServerConfig) -> Result<Option<ContentStore>> {
    let backend: Arc<dyn KvBackend> = match cfg.backend {
        BackendKind::Redb => {
            let data_dir = resolve_data_dir(cfg.data_dir.as_ref())?;
            info!(data_dir = %data_dir.display(), "using data directory");
            let db_path = data_dir.join("text2kv.db");
            Arc::new(RedbBackend::open(&db_path).context("open store")?)
        }
        BackendKind::Memory => {
            warn!("using in-memory backend; entries are lost on restart");
            Arc::new(MemoryBackend::new())
        }
        BackendKind::Unbound => {
            warn!("no key-value backend bound; all requests will fail");
            return Ok(None);
        }
    };
    Ok(Some(ContentStore::new(backend).with_cache_ttl(cfg.cache_ttl)))
}

/// Every path and method goes to [`dispatch`], behind the token check.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(cfg: ServerConfig) -> Result<()> {
    let store = bind_store(&cfg)?;
    let app = router(AppState::new(&cfg.token, store));

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .context("invalid host/port")?;

    info!(%addr, backend = ?cfg.backend, "text2kv server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind listener")?;

    axum::serve(listener, app).await.context("server error")
}
