//! Process configuration.
//!
//! Built once at startup from the environment and handed to the store,
//! repositories and middleware by `Arc`. Nothing reads the environment
//! after [`Config::from_env`] returns.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_BOOKS_PATH: &str = "./data/books.json";
pub const DEFAULT_REVIEWS_PATH: &str = "./data/reviews.json";
pub const DEFAULT_AUTH_HEADER: &str = "authorization";
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Free-form environment name ("development", "production", ...).
    pub environment: String,
    pub api_prefix: String,
    pub pagination: PaginationConfig,
    pub auth: AuthConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub allowed_tokens: Vec<String>,
    /// Lower-cased header name the token is read from first.
    pub header_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_tokens: Vec::new(),
            header_name: DEFAULT_AUTH_HEADER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub books_path: PathBuf,
    pub reviews_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            books_path: PathBuf::from(DEFAULT_BOOKS_PATH),
            reviews_path: PathBuf::from(DEFAULT_REVIEWS_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Cross-cutting HTTP settings: CORS, request-rate and body-size limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Allowed CORS origins. `["*"]` reflects any requesting origin.
    pub cors_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec!["*".to_string()],
            rate_limit: RateLimitConfig::default(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Fixed-window limit applied per client IP to everything under the API prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window; `0` disables the limiter.
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", raw))?,
            None => DEFAULT_PORT,
        };
        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let bind_addr: SocketAddr = format!("{}:{}", host.trim(), port)
            .parse()
            .with_context(|| format!("Invalid HOST value: {}", host))?;

        let allowed_tokens = get("ALLOWED_TOKENS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let parse_num = |key: &str| -> Result<Option<u64>> {
            get(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .with_context(|| format!("Invalid {} value: {}", key, raw))
                })
                .transpose()
        };

        let defaults = HttpConfig::default();
        let cors_origins: Vec<String> = get("CORS_ORIGIN")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .filter(|origins: &Vec<String>| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);

        let max_requests = match parse_num("RATE_LIMIT_MAX")? {
            Some(n) => u32::try_from(n).context("RATE_LIMIT_MAX is too large")?,
            None => defaults.rate_limit.max_requests,
        };
        let window = parse_num("RATE_LIMIT_WINDOW_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.rate_limit.window);
        let body_limit = match parse_num("BODY_LIMIT_BYTES")? {
            Some(n) => usize::try_from(n).context("BODY_LIMIT_BYTES is too large")?,
            None => defaults.body_limit,
        };

        let header_name = get("AUTH_HEADER")
            .map(|h| h.trim().to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_AUTH_HEADER.to_string());

        Ok(Self {
            bind_addr,
            environment: get("APP_ENV").unwrap_or_else(|| "development".to_string()),
            api_prefix: "/api".to_string(),
            pagination: PaginationConfig::default(),
            auth: AuthConfig {
                allowed_tokens,
                header_name,
            },
            data: DataConfig {
                books_path: get("BOOKS_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_BOOKS_PATH)),
                reviews_path: get("REVIEWS_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_REVIEWS_PATH)),
            },
            logging: LoggingConfig {
                level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                file: get("LOG_FILE").map(PathBuf::from),
            },
            http: HttpConfig {
                cors_origins,
                rate_limit: RateLimitConfig {
                    max_requests,
                    window,
                },
                body_limit,
            },
        })
    }

    /// Development mode adds the error chain to 500 responses.
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.pagination.default_limit, 10);
        assert_eq!(config.pagination.max_limit, 100);
        assert_eq!(config.auth.header_name, "authorization");
        assert!(config.auth.allowed_tokens.is_empty());
        assert_eq!(config.data.books_path, PathBuf::from(DEFAULT_BOOKS_PATH));
        assert!(config.is_development());
        assert!(config.logging.file.is_none());
        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.http.rate_limit.max_requests, 100);
        assert_eq!(config.http.rate_limit.window, Duration::from_secs(900));
        assert_eq!(config.http.body_limit, 10 * 1024 * 1024);
    }

    #[test]
    fn test_http_settings_from_env() {
        let config = Config::from_lookup(lookup(&[
            ("CORS_ORIGIN", "https://a.example, https://b.example"),
            ("RATE_LIMIT_MAX", "5"),
            ("RATE_LIMIT_WINDOW_SECS", "60"),
            ("BODY_LIMIT_BYTES", "2048"),
        ]))
        .unwrap();

        assert_eq!(
            config.http.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.http.rate_limit.max_requests, 5);
        assert_eq!(config.http.rate_limit.window, Duration::from_secs(60));
        assert_eq!(config.http.body_limit, 2048);
    }

    #[test]
    fn test_environment_controls_development_mode() {
        let production = Config::from_lookup(lookup(&[("APP_ENV", "production")])).unwrap();
        let development = Config::from_lookup(lookup(&[("APP_ENV", "Development")])).unwrap();

        assert!(!production.is_development());
        assert!(development.is_development());
    }

    #[test]
    fn test_invalid_rate_limit_fails() {
        let result = Config::from_lookup(lookup(&[("RATE_LIMIT_MAX", "lots")]));
        assert!(result.unwrap_err().to_string().contains("RATE_LIMIT_MAX"));
    }

    #[test]
    fn test_allowed_tokens_are_split_and_trimmed() {
        let config =
            Config::from_lookup(lookup(&[("ALLOWED_TOKENS", " token1, token2 ,,token3")]))
                .unwrap();

        assert_eq!(
            config.auth.allowed_tokens,
            vec!["token1", "token2", "token3"]
        );
    }

    #[test]
    fn test_auth_header_is_lowercased() {
        let config = Config::from_lookup(lookup(&[("AUTH_HEADER", "X-Custom-Token")])).unwrap();
        assert_eq!(config.auth.header_name, "x-custom-token");
    }

    #[test]
    fn test_invalid_port_fails() {
        let result = Config::from_lookup(lookup(&[("PORT", "not-a-port")]));

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PORT"));
    }

    #[test]
    fn test_paths_and_bind_override() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("BOOKS_PATH", "/tmp/b.json"),
            ("REVIEWS_PATH", "/tmp/r.json"),
            ("APP_ENV", "production"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8081".parse().unwrap());
        assert_eq!(config.data.books_path, PathBuf::from("/tmp/b.json"));
        assert_eq!(config.data.reviews_path, PathBuf::from("/tmp/r.json"));
        assert!(!config.is_development());
    }
}
