use crate::error::AppError;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// Interval between server pings
    pub heartbeat_interval: Duration,
    /// Connections silent for longer than this are closed
    pub client_timeout: Duration,
}

impl WebSocketConfig {
    /// A zero interval would make the heartbeat timer fire continuously.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.heartbeat_interval.is_zero() {
            return Err(AppError::Config(
                "WS_HEARTBEAT_INTERVAL_SECS must be positive".to_string(),
            ));
        }
        if self.client_timeout <= self.heartbeat_interval {
            return Err(AppError::Config(
                "WS_CLIENT_TIMEOUT_SECS must exceed WS_HEARTBEAT_INTERVAL_SECS".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct Config {
    pub app_env: String,
    pub host: String,
    pub port: u16,
    /// `None` runs the service on the in-memory store
    pub database: Option<DatabaseConfig>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub cors_allowed_origins: Vec<String>,
    pub websocket: WebSocketConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_env", &self.app_env)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database.as_ref().map(|_| "<configured>"))
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_hours", &self.jwt_ttl_hours)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("websocket", &self.websocket)
            .finish()
    }
}

impl Config {
    /// Local defaults around a signing secret; used by `from_env` and tests.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            app_env: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 5000,
            database: None,
            jwt_secret: jwt_secret.into(),
            jwt_ttl_hours: crypto_core::jwt::DEFAULT_TOKEN_TTL_HOURS,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            websocket: WebSocketConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenv();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Config("JWT_SECRET must be set".to_string()))?;
        if jwt_secret.len() < crypto_core::jwt::MIN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "JWT_SECRET must be at least {} bytes",
                crypto_core::jwt::MIN_SECRET_LEN
            )));
        }

        let mut cfg = Self::with_secret(jwt_secret);

        if let Ok(app_env) = env::var("APP_ENV") {
            cfg.app_env = app_env;
        }
        if let Ok(host) = env::var("POST_SERVICE_HOST") {
            cfg.host = host;
        }
        cfg.port = parse_var("POST_SERVICE_PORT", cfg.port)?;
        cfg.jwt_ttl_hours = parse_var("JWT_TTL_HOURS", cfg.jwt_ttl_hours)?;
        if cfg.jwt_ttl_hours <= 0 {
            return Err(AppError::Config("JWT_TTL_HOURS must be positive".to_string()));
        }

        cfg.database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            }),
            _ => None,
        };

        if let Ok(origins) = env::var("CORS_ALLOWED_ORIGINS") {
            cfg.cors_allowed_origins = parse_list(&origins);
        }

        cfg.websocket = WebSocketConfig {
            heartbeat_interval: Duration::from_secs(parse_var(
                "WS_HEARTBEAT_INTERVAL_SECS",
                cfg.websocket.heartbeat_interval.as_secs(),
            )?),
            client_timeout: Duration::from_secs(parse_var(
                "WS_CLIENT_TIMEOUT_SECS",
                cfg.websocket.client_timeout.as_secs(),
            )?),
        };
        cfg.websocket.validate()?;

        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
