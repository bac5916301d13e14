use std::env;

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 30;
/// Upper bound on `TOKEN_TTL_HOURS`: ten years.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// immutable afterwards; pulled into handlers and extractors via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. Absent only when the in-memory store is selected.
    pub db_url: Option<String>,
    pub store: StoreKind,
    // Runtime environment marker. Selects log format and secret requirements.
    pub env: Env,
    // HS256 secret used to sign and verify access tokens.
    pub jwt_secret: String,
    // Access token lifetime.
    pub token_ttl_hours: i64,
    pub host: String,
    pub port: u16,
}

/// Env
///
/// Defines the runtime context: human-readable logs and a development secret locally,
/// JSON logs and mandatory secrets in production.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// Which `Repository` implementation backs the process.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    MissingSecret(&'static str),
    #[error("DATABASE_URL is required when STORE=postgres")]
    MissingDatabaseUrl,
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            db_url: None,
            store: StoreKind::Memory,
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from the environment and fails fast with a `ConfigError`
    /// when something required for the selected environment or store is missing.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let store = match env::var("STORE").as_deref() {
            Err(_) | Ok("postgres") => StoreKind::Postgres,
            Ok("memory") => StoreKind::Memory,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE",
                    value: other.to_string(),
                });
            }
        };

        // The production secret is mandatory; locally a development fallback is used.
        let jwt_secret = match (env, env::var("JWT_SECRET")) {
            (_, Ok(secret)) if !secret.is_empty() => secret,
            (Env::Production, _) => return Err(ConfigError::MissingSecret("JWT_SECRET")),
            (Env::Local, _) => LOCAL_JWT_SECRET.to_string(),
        };

        let db_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        if store == StoreKind::Postgres && db_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let token_ttl_hours = parse_var("TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            });
        }

        Ok(Self {
            db_url,
            store,
            env,
            jwt_secret,
            token_ttl_hours,
            host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("APP_PORT", 3000)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(_) => Err(ConfigError::Invalid { name, value: raw }),
        },
    }
}
