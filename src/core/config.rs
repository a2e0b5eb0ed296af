use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | HTTP_PORT | 3000 | HTTP service port |
/// | DATABASE_PATH | swaad.db | SQLite database file |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | tracing level filter |
/// | LOG_DIR | (unset) | daily rolling log files when set |
/// | GEMINI_API_KEY | (unset) | AI narration; placeholders when unset |
/// | FRONTEND_URL | http://localhost:5173 | base for password reset links |
///
/// JWT settings (`JWT_SECRET`, `JWT_EXPIRATION_MINUTES`, `JWT_ISSUER`,
/// `JWT_AUDIENCE`) are read by [`JwtConfig`].
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// Path to the SQLite database file
    pub database_path: String,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    /// When set, logs also roll daily into this directory
    pub log_dir: Option<String>,
    pub jwt: JwtConfig,
    /// Gemini API key; narration degrades to placeholders when absent
    pub gemini_api_key: Option<String>,
    /// Base URL of the storefront, used in password reset links
    pub frontend_url: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "swaad.db".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            jwt: JwtConfig::default(),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        }
    }

    /// Override database path and port, for test setups
    pub fn with_overrides(database_path: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
