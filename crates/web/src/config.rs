/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// SQLite database URL (default: `sqlite://shelfmark.db`).
    pub database_url: String,
    /// Directory uploaded cover images are written to (default: `uploads`).
    pub upload_dir: String,
    /// Directory page templates are loaded from (default: `templates`).
    pub template_dir: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Login session lifetime in hours (default: `12`).
    pub session_ttl_hours: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `4000`                  |
    /// | `DATABASE_URL`         | `sqlite://shelfmark.db` |
    /// | `UPLOAD_DIR`           | `uploads`               |
    /// | `TEMPLATE_DIR`         | `templates`             |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `SESSION_TTL_HOURS`    | `12`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "4000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://shelfmark.db".into());

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());

        let template_dir = std::env::var("TEMPLATE_DIR").unwrap_or_else(|_| "templates".into());

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session_ttl_hours: i64 = std::env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "12".into())
            .parse()
            .expect("SESSION_TTL_HOURS must be a valid i64");

        Self {
            host,
            port,
            database_url,
            upload_dir,
            template_dir,
            request_timeout_secs,
            session_ttl_hours,
        }
    }
}
