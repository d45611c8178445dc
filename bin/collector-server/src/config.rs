//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for collector-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite (or other) database URL (default: `"sqlite://collector.db"`).
    /// Supports any sqlx-compatible connection string.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origin allowlist; `None` means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Serve the Swagger UI and OpenAPI document (default: `true`).
    /// Disable in production to avoid exposing the API structure.
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("COLLECTOR_BIND", "0.0.0.0:3000"),
            database_url: env_or("COLLECTOR_DATABASE_URL", "sqlite://collector.db"),
            log_level: env_or("COLLECTOR_LOG", "info"),
            log_json: env_bool("COLLECTOR_LOG_JSON", false),
            cors_allowed_origins: std::env::var("COLLECTOR_CORS_ORIGINS").ok(),
            enable_swagger: env_bool("COLLECTOR_ENABLE_SWAGGER", true),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
