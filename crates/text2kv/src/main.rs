use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing_subscriber::EnvFilter;

/// Lines uploaded from a file, matching the generated update scripts.
const UPLOAD_MAX_LINES: usize = 2000;

// ── CLI definition ─────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "text2kv", about = "Token-protected text file store", version)]
struct Cli {
    /// Server URL (default: http://localhost:8080 or $TEXT2KV_SERVER)
    #[arg(long, env = "TEXT2KV_SERVER", default_value = "http://localhost:8080")]
    server: String,

    /// Shared token ($TEXT2KV_TOKEN)
    #[arg(long, env = "TEXT2KV_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (default: $TEXT2KV_PORT or 8080)
        #[arg(long, env = "TEXT2KV_PORT", default_value = "8080")]
        port: u16,
        /// Host to bind (default: $TEXT2KV_HOST or 0.0.0.0)
        #[arg(long, env = "TEXT2KV_HOST", default_value = "0.0.0.0")]
        host: String,
        /// Key-value backend: redb, memory or unbound
        #[arg(long, env = "TEXT2KV_BACKEND", default_value = "redb")]
        backend: String,
    },
    /// Print a stored file
    Get {
        /// File name, e.g. ip.txt
        key: String,
    },
    /// Store a file, either inline text or the first 2000 lines of a local file
    Put {
        /// File name to store under
        key: String,
        /// Local file to upload (base64-encoded in transit)
        #[arg(conflicts_with = "text", required_unless_present = "text")]
        file: Option<String>,
        /// Store this text verbatim instead of reading a file
        #[arg(long)]
        text: Option<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TEXT2KV_LOG_LEVEL")
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            backend,
        } => cmd_serve(host, port, &backend).await,

        Commands::Get { key } => {
            let token = require_token(&cli.token)?;
            cmd_get(&cli.server, &token, &key).await
        }

        Commands::Put { key, file, text } => {
            let token = require_token(&cli.token)?;
            cmd_put(&cli.server, &token, &key, file.as_deref(), text.as_deref()).await
        }
    }
}

// ── Command implementations ───────────────────────────────────────────────────

async fn cmd_serve(host: String, port: u16, backend: &str) -> Result<()> {
    let cfg = text2kv_server::ServerConfig {
        host,
        port,
        token: text2kv_server::resolve_token()?,
        backend: backend.parse()?,
        ..Default::default()
    };

    text2kv_server::run(cfg).await
}

async fn cmd_get(server: &str, token: &str, key: &str) -> Result<()> {
    let resp = Client::new()
        .get(file_url(server, key))
        .query(&[("token", token)])
        .send()
        .await
        .context("HTTP request failed")?;

    let status = resp.status();
    let body = resp.text().await.context("read response body")?;
    if !status.is_success() {
        anyhow::bail!("server returned {status}: {body}");
    }
    println!("{body}");
    Ok(())
}

async fn cmd_put(
    server: &str,
    token: &str,
    key: &str,
    file: Option<&str>,
    text: Option<&str>,
) -> Result<()> {
    let mut query = vec![("token", token.to_owned())];
    match (text, file) {
        (Some(text), _) => query.push(("text", text.to_owned())),
        (None, Some(path)) => {
            let content =
                std::fs::read_to_string(path).with_context(|| format!("read file: {path}"))?;
            query.push(("b64", STANDARD.encode(first_lines(&content, UPLOAD_MAX_LINES))));
        }
        (None, None) => anyhow::bail!("either a FILE or --text is required"),
    }

    let resp = Client::new()
        .get(file_url(server, key))
        .query(&query)
        .send()
        .await
        .context("HTTP request failed")?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("server returned {status}: {body}");
    }
    println!("✓ stored {key}");
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn require_token(token: &Option<String>) -> Result<String> {
    token
        .clone()
        .context("--token / TEXT2KV_TOKEN is required for this command")
}

fn file_url(server: &str, key: &str) -> String {
    format!(
        "{}/{}",
        server.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

/// Up to `max` `\n`-delimited lines, byte-for-byte. `\r` stays with its line.
fn first_lines(content: &str, max: usize) -> String {
    content.split('\n').take(max).collect::<Vec<_>>().join("\n")
}
