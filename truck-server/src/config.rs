//! Server configuration

use std::str::FromStr;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Where catalog and order data live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local tables, lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("unknown STORE_BACKEND: {other}").into()),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    pub http_port: u16,
    pub store_backend: StoreBackend,
    /// PostgreSQL connection URL (required for the postgres backend)
    pub database_url: Option<String>,
    /// Hosted confirmation-email function
    pub order_email_function_url: Option<String>,
    /// Bearer token sent to the hosted function
    pub function_api_key: Option<String>,
    /// Resend API key used by the built-in email relay
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub order_email_from: String,
    pub support_email: String,
    /// Server-side key for geocoding; never sent to browsers
    pub google_maps_api_key: Option<String>,
    /// Referrer-restricted key placed in public embed URLs
    pub google_maps_embed_key: Option<String>,
    /// Upper bound on every collaborator call
    pub request_timeout: Duration,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            http_port: 3000,
            store_backend: StoreBackend::Memory,
            database_url: None,
            order_email_function_url: None,
            function_api_key: None,
            resend_api_key: None,
            resend_api_url: "https://api.resend.com/emails".into(),
            order_email_from: "orders@afrojerk.com".into(),
            support_email: "support@afrojerk.com".into(),
            google_maps_api_key: None,
            google_maps_embed_key: None,
            request_timeout: Duration::from_millis(10_000),
            log_level: None,
            log_dir: None,
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let defaults = Self::default();
        let environment = std::env::var("ENVIRONMENT").unwrap_or(defaults.environment);

        let store_backend = match env_opt("STORE_BACKEND") {
            Some(v) => v.parse()?,
            None => StoreBackend::Postgres,
        };
        let database_url = env_opt("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err("DATABASE_URL must be set (or STORE_BACKEND=memory)".into());
        }

        let order_email_function_url = env_opt("ORDER_EMAIL_FUNCTION_URL");
        let resend_api_key = env_opt("RESEND_API_KEY");
        if environment != "development"
            && order_email_function_url.is_none()
            && resend_api_key.is_none()
        {
            return Err(format!(
                "ORDER_EMAIL_FUNCTION_URL or RESEND_API_KEY must be set in {environment} environment"
            )
            .into());
        }

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.http_port),
            store_backend,
            database_url,
            order_email_function_url,
            function_api_key: env_opt("FUNCTION_API_KEY"),
            resend_api_key,
            resend_api_url: env_opt("RESEND_API_URL").unwrap_or(defaults.resend_api_url),
            order_email_from: env_opt("ORDER_EMAIL_FROM").unwrap_or(defaults.order_email_from),
            support_email: env_opt("SUPPORT_EMAIL").unwrap_or(defaults.support_email),
            google_maps_api_key: env_opt("GOOGLE_MAPS_API_KEY"),
            google_maps_embed_key: env_opt("GOOGLE_MAPS_EMBED_KEY"),
            request_timeout: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            log_level: env_opt("LOG_LEVEL"),
            log_dir: env_opt("LOG_DIR"),
            environment,
        })
    }
}
