/// Everything a request path can resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Status page listing the stored IPs.
    ConfigPage,
    /// Windows uploader script.
    BatScript,
    /// POSIX uploader script.
    ShScript,
    /// Generic read or write of a stored entry.
    File(String),
}

pub const CONFIG_KEY: &str = "config";
pub const BAT_SCRIPT_KEY: &str = "config/update.bat";
pub const SH_SCRIPT_KEY: &str = "config/update.sh";

/// Strip one leading `/` and lowercase.
pub fn normalize_key(path: &str) -> String {
    path.strip_prefix('/').unwrap_or(path).to_lowercase()
}

impl Route {
    /// Resolve a raw request path. The secret itself is an alias for the
    /// config page, compared as configured against the lowercased path, so
    /// a secret containing uppercase letters never matches here.
    pub fn resolve(path: &str, secret: &str) -> Self {
        let key = normalize_key(path);
        if key == CONFIG_KEY || key == secret {
            return Route::ConfigPage;
        }
        match key.as_str() {
            BAT_SCRIPT_KEY => Route::BatScript,
            SH_SCRIPT_KEY => Route::ShScript,
            _ => Route::File(key),
        }
    }
}
