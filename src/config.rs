//! Layered server configuration.
//!
//! Values resolve with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (read by clap through `env`)
//! 3. TOML config file (`--config` or `<config_dir>/taskwright/config.toml`)
//! 4. Compiled defaults

use crate::agent::services::AgentSettings;
use crate::enrichment::adapters::http::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::enrichment::services::GatewaySettings;
use crate::identity::domain::{PasswordHasher, PasswordPolicy};
use crate::identity::services::TokenSettings;
use crate::task::domain::PagePolicy;
use clap::{Parser, ValueEnum};
use rand::RngCore;
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Shortest JWT secret accepted outside development mode, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_ACCESS_TTL_MINUTES: i64 = 30;
const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;
const MAX_ACCESS_TTL_MINUTES: i64 = 24 * 60;
const MAX_REFRESH_TTL_DAYS: i64 = 365;
const DEFAULT_PASSWORD_MIN_LENGTH: usize = 12;
const DEFAULT_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_RATE_LIMIT_CALLS: usize = 10;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;
const DEFAULT_AGENT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Process-local maps. Everything is lost on exit.
    #[default]
    Memory,
    /// PostgreSQL through an r2d2 pool.
    Postgres,
}

/// Taskwright: multi-user task tracker with AI task enrichment.
#[derive(Parser, Debug, Default)]
#[command(name = "taskwright", version, about)]
pub struct CliArgs {
    /// Path to a TOML config file.
    #[arg(short, long, env = "TASKWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind to.
    #[arg(short, long, env = "TASKWRIGHT_BIND")]
    pub bind: Option<String>,

    /// Accept cross-origin requests from any origin.
    #[arg(long, env = "TASKWRIGHT_CORS_ALLOW_ANY")]
    pub cors_allow_any: Option<bool>,

    /// Storage backend.
    #[arg(long, value_enum, env = "TASKWRIGHT_STORAGE")]
    pub storage: Option<StorageKind>,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections.
    #[arg(long, env = "TASKWRIGHT_POOL_SIZE")]
    pub pool_size: Option<u32>,

    /// Apply the bundled schema on startup.
    #[arg(long)]
    pub migrate: bool,

    /// HMAC secret for bearer tokens (at least 32 bytes).
    #[arg(long, env = "TASKWRIGHT_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Access token lifetime in minutes.
    #[arg(long, env = "TASKWRIGHT_ACCESS_TTL_MINUTES")]
    pub access_ttl_minutes: Option<i64>,

    /// Refresh token lifetime in days.
    #[arg(long, env = "TASKWRIGHT_REFRESH_TTL_DAYS")]
    pub refresh_ttl_days: Option<i64>,

    /// PBKDF2 iteration count for new password hashes.
    #[arg(long, env = "TASKWRIGHT_PBKDF2_ITERATIONS")]
    pub pbkdf2_iterations: Option<u32>,

    /// API key for the inference provider. Enrichment is disabled without one.
    #[arg(long, env = "TASKWRIGHT_INFERENCE_API_KEY", hide_env_values = true)]
    pub inference_api_key: Option<String>,

    /// Chat-completions endpoint.
    #[arg(long, env = "TASKWRIGHT_INFERENCE_ENDPOINT")]
    pub inference_endpoint: Option<String>,

    /// Model name sent to the provider.
    #[arg(long, env = "TASKWRIGHT_INFERENCE_MODEL")]
    pub inference_model: Option<String>,

    /// Hard timeout for one inference call, in milliseconds.
    #[arg(long, env = "TASKWRIGHT_ENRICHMENT_TIMEOUT_MS")]
    pub enrichment_timeout_ms: Option<u64>,

    /// Hard timeout for one task agent call, in milliseconds.
    #[arg(long, env = "TASKWRIGHT_AGENT_TIMEOUT_MS")]
    pub agent_timeout_ms: Option<u64>,

    /// Log level filter (overridden by `RUST_LOG`).
    #[arg(short, long, env = "TASKWRIGHT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Development mode: a missing or short JWT secret is replaced by a
    /// random one that lives as long as the process.
    #[arg(long)]
    pub dev: bool,
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The bind address does not parse.
    #[error("invalid bind address {value:?}: {source}")]
    InvalidBind {
        /// Rejected value.
        value: String,
        /// Parser error.
        source: std::net::AddrParseError,
    },

    /// No JWT secret or one shorter than [`MIN_JWT_SECRET_LEN`].
    #[error("JWT secret must be at least {MIN_JWT_SECRET_LEN} bytes, got {length}")]
    WeakJwtSecret {
        /// Length of the supplied secret.
        length: usize,
    },

    /// PostgreSQL storage without a connection URL.
    #[error("storage 'postgres' requires a database URL")]
    MissingDatabaseUrl,

    /// A numeric setting is out of range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Setting name as written in the config file.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

// ---------------------------------------------------------------------------
// TOML file shape
// ---------------------------------------------------------------------------

/// Top-level TOML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// `[server]` section.
    pub server: ServerFileConfig,
    /// `[storage]` section.
    pub storage: StorageFileConfig,
    /// `[auth]` section.
    pub auth: AuthFileConfig,
    /// `[enrichment]` section.
    pub enrichment: EnrichmentFileConfig,
    /// `[agent]` section.
    pub agent: AgentFileConfig,
    /// `[pagination]` section.
    pub pagination: PaginationFileConfig,
    /// Log level filter.
    pub log_level: Option<String>,
}

/// `[server]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerFileConfig {
    /// Listen address.
    pub bind: Option<String>,
    /// Accept any origin.
    pub cors_allow_any: Option<bool>,
}

/// `[storage]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageFileConfig {
    /// Backend kind.
    pub kind: Option<StorageKind>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: Option<u32>,
}

/// `[auth]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthFileConfig {
    /// Token signing secret.
    pub jwt_secret: Option<String>,
    /// Access token lifetime in minutes.
    pub access_ttl_minutes: Option<i64>,
    /// Refresh token lifetime in days.
    pub refresh_ttl_days: Option<i64>,
    /// Minimum password length.
    pub password_min_length: Option<usize>,
    /// Require an uppercase letter.
    pub password_require_uppercase: Option<bool>,
    /// Require a lowercase letter.
    pub password_require_lowercase: Option<bool>,
    /// Require a digit.
    pub password_require_digit: Option<bool>,
    /// PBKDF2 iteration count.
    pub pbkdf2_iterations: Option<u32>,
}

/// `[enrichment]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichmentFileConfig {
    /// Provider API key.
    pub api_key: Option<String>,
    /// Chat-completions endpoint.
    pub endpoint: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Inference timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Calls admitted per window.
    pub rate_limit_calls: Option<usize>,
    /// Window length in seconds.
    pub rate_limit_window_secs: Option<u64>,
    /// Grace period for in-flight jobs at shutdown, in seconds.
    pub shutdown_grace_secs: Option<u64>,
}

/// `[agent]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentFileConfig {
    /// Inference timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Calls admitted per window.
    pub rate_limit_calls: Option<usize>,
    /// Window length in seconds.
    pub rate_limit_window_secs: Option<u64>,
}

/// `[pagination]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationFileConfig {
    /// Page size when the request names none.
    pub default_page_size: Option<u32>,
    /// Upper clamp for requested page sizes.
    pub max_page_size: Option<u32>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// A secret string that never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns the secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Accept any origin.
    pub cors_allow_any: bool,
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Backend kind.
    pub kind: StorageKind,
    /// Connection URL, required for PostgreSQL.
    pub database_url: Option<Secret>,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// Apply the bundled schema on startup.
    pub migrate: bool,
}

/// Credential settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token signing secret.
    pub jwt_secret: Secret,
    /// Whether `jwt_secret` was generated for this process only.
    pub ephemeral_secret: bool,
    /// Token lifetimes.
    pub tokens: TokenSettings,
    /// Registration password rules.
    pub password_policy: PasswordPolicy,
    /// Password hasher work factor.
    pub hasher: PasswordHasher,
}

/// Enrichment settings.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Provider API key. `None` disables enrichment.
    pub api_key: Option<Secret>,
    /// Chat-completions endpoint.
    pub endpoint: String,
    /// Model name.
    pub model: String,
    /// Timeout and rate limit.
    pub gateway: GatewaySettings,
    /// Grace period for in-flight jobs at shutdown.
    pub shutdown_grace: Duration,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Storage backend.
    pub storage: StorageConfig,
    /// Credentials and tokens.
    pub auth: AuthConfig,
    /// AI enrichment.
    pub enrichment: EnrichmentConfig,
    /// Task agent limits. The agent shares the enrichment provider.
    pub agent: AgentSettings,
    /// List page sizes.
    pub pagination: PagePolicy,
    /// Log level filter.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from CLI args, environment, config file, and
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed,
    /// or if the merged values are invalid.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, file)
    }

    /// Merges CLI args over file config over defaults and validates the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unparseable bind address, a weak JWT
    /// secret outside development mode, PostgreSQL without a URL, or an
    /// out-of-range numeric setting.
    pub fn resolve(cli: &CliArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let server = resolve_server(cli, file.server)?;
        let storage = resolve_storage(cli, file.storage)?;
        let auth = resolve_auth(cli, file.auth)?;
        let enrichment = resolve_enrichment(cli, file.enrichment)?;
        let agent = resolve_agent(cli, &file.agent)?;
        let pagination = resolve_pagination(&file.pagination)?;
        let log_level = cli
            .log_level
            .clone()
            .or(file.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());

        Ok(Self {
            server,
            storage,
            auth,
            enrichment,
            agent,
            pagination,
            log_level,
        })
    }
}

fn resolve_server(cli: &CliArgs, file: ServerFileConfig) -> Result<ServerConfig, ConfigError> {
    let raw = cli
        .bind
        .clone()
        .or(file.bind)
        .unwrap_or_else(|| DEFAULT_BIND.to_owned());
    let bind = raw
        .parse()
        .map_err(|source| ConfigError::InvalidBind { value: raw, source })?;
    Ok(ServerConfig {
        bind,
        cors_allow_any: cli.cors_allow_any.or(file.cors_allow_any).unwrap_or(false),
    })
}

fn resolve_storage(cli: &CliArgs, file: StorageFileConfig) -> Result<StorageConfig, ConfigError> {
    let kind = cli.storage.or(file.kind).unwrap_or_default();
    let database_url = cli
        .database_url
        .clone()
        .or(file.database_url)
        .filter(|url| !url.trim().is_empty())
        .map(Secret::new);
    if kind == StorageKind::Postgres && database_url.is_none() {
        return Err(ConfigError::MissingDatabaseUrl);
    }
    let pool_size = cli
        .pool_size
        .or(file.pool_size)
        .unwrap_or(DEFAULT_POOL_SIZE);
    if pool_size == 0 {
        return Err(ConfigError::Invalid {
            field: "storage.pool_size",
            reason: "must be at least 1",
        });
    }
    Ok(StorageConfig {
        kind,
        database_url,
        pool_size,
        migrate: cli.migrate,
    })
}

fn resolve_auth(cli: &CliArgs, file: AuthFileConfig) -> Result<AuthConfig, ConfigError> {
    let supplied = cli.jwt_secret.clone().or(file.jwt_secret);
    let length = supplied.as_ref().map_or(0, String::len);
    let (jwt_secret, ephemeral_secret) = match supplied {
        Some(secret) if secret.len() >= MIN_JWT_SECRET_LEN => (secret, false),
        _ if cli.dev => (generate_secret(), true),
        _ => return Err(ConfigError::WeakJwtSecret { length }),
    };

    let access_minutes = cli
        .access_ttl_minutes
        .or(file.access_ttl_minutes)
        .unwrap_or(DEFAULT_ACCESS_TTL_MINUTES);
    if !(1..=MAX_ACCESS_TTL_MINUTES).contains(&access_minutes) {
        return Err(ConfigError::Invalid {
            field: "auth.access_ttl_minutes",
            reason: "must be between 1 and 1440",
        });
    }
    let refresh_days = cli
        .refresh_ttl_days
        .or(file.refresh_ttl_days)
        .unwrap_or(DEFAULT_REFRESH_TTL_DAYS);
    if !(1..=MAX_REFRESH_TTL_DAYS).contains(&refresh_days) {
        return Err(ConfigError::Invalid {
            field: "auth.refresh_ttl_days",
            reason: "must be between 1 and 365",
        });
    }

    let iterations = cli
        .pbkdf2_iterations
        .or(file.pbkdf2_iterations)
        .unwrap_or(PasswordHasher::DEFAULT_ITERATIONS);
    if iterations == 0 {
        return Err(ConfigError::Invalid {
            field: "auth.pbkdf2_iterations",
            reason: "must be at least 1",
        });
    }

    let min_length = file
        .password_min_length
        .unwrap_or(DEFAULT_PASSWORD_MIN_LENGTH);
    let password_policy = PasswordPolicy::with_min_length(min_length)
        .require_uppercase(file.password_require_uppercase.unwrap_or(true))
        .require_lowercase(file.password_require_lowercase.unwrap_or(true))
        .require_digit(file.password_require_digit.unwrap_or(true));

    Ok(AuthConfig {
        jwt_secret: Secret::new(jwt_secret),
        ephemeral_secret,
        tokens: TokenSettings {
            access_ttl: chrono::Duration::minutes(access_minutes),
            refresh_ttl: chrono::Duration::days(refresh_days),
            ..TokenSettings::default()
        },
        password_policy,
        hasher: PasswordHasher::new(iterations),
    })
}

fn resolve_enrichment(
    cli: &CliArgs,
    file: EnrichmentFileConfig,
) -> Result<EnrichmentConfig, ConfigError> {
    let timeout_ms = cli
        .enrichment_timeout_ms
        .or(file.timeout_ms)
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(ConfigError::Invalid {
            field: "enrichment.timeout_ms",
            reason: "must be at least 1",
        });
    }
    let window_secs = file
        .rate_limit_window_secs
        .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);
    if window_secs == 0 {
        return Err(ConfigError::Invalid {
            field: "enrichment.rate_limit_window_secs",
            reason: "must be at least 1",
        });
    }

    Ok(EnrichmentConfig {
        api_key: cli
            .inference_api_key
            .clone()
            .or(file.api_key)
            .filter(|key| !key.trim().is_empty())
            .map(Secret::new),
        endpoint: cli
            .inference_endpoint
            .clone()
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
        model: cli
            .inference_model
            .clone()
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
        gateway: GatewaySettings {
            timeout: Duration::from_millis(timeout_ms),
            rate_limit_calls: file.rate_limit_calls.unwrap_or(DEFAULT_RATE_LIMIT_CALLS),
            rate_limit_window: Duration::from_secs(window_secs),
        },
        shutdown_grace: Duration::from_secs(
            file.shutdown_grace_secs
                .unwrap_or(DEFAULT_SHUTDOWN_GRACE_SECS),
        ),
    })
}

fn resolve_agent(cli: &CliArgs, file: &AgentFileConfig) -> Result<AgentSettings, ConfigError> {
    let timeout_ms = cli
        .agent_timeout_ms
        .or(file.timeout_ms)
        .unwrap_or(DEFAULT_AGENT_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(ConfigError::Invalid {
            field: "agent.timeout_ms",
            reason: "must be at least 1",
        });
    }
    let window_secs = file
        .rate_limit_window_secs
        .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);
    if window_secs == 0 {
        return Err(ConfigError::Invalid {
            field: "agent.rate_limit_window_secs",
            reason: "must be at least 1",
        });
    }
    Ok(AgentSettings {
        timeout: Duration::from_millis(timeout_ms),
        rate_limit_calls: file.rate_limit_calls.unwrap_or(DEFAULT_RATE_LIMIT_CALLS),
        rate_limit_window: Duration::from_secs(window_secs),
    })
}

fn resolve_pagination(file: &PaginationFileConfig) -> Result<PagePolicy, ConfigError> {
    let max = file.max_page_size.unwrap_or(MAX_PAGE_SIZE);
    let default = file.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if max == 0 || default == 0 {
        return Err(ConfigError::Invalid {
            field: "pagination",
            reason: "page sizes must be at least 1",
        });
    }
    if default > max {
        return Err(ConfigError::Invalid {
            field: "pagination.default_page_size",
            reason: "must not exceed max_page_size",
        });
    }
    Ok(PagePolicy::new(default, max))
}

/// 32 random bytes, hex encoded.
fn generate_secret() -> String {
    let mut bytes = [0_u8; MIN_JWT_SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Loads the TOML config file.
///
/// An explicit path must exist. Without one, the default location is tried
/// and a missing file yields an empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let Some((path, required)) = explicit_path
        .map(|path| (path.to_path_buf(), true))
        .or_else(|| default_config_path().map(|path| (path, false)))
    else {
        return Ok(FileConfig::default());
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
            Ok(FileConfig::default())
        }
        Err(source) => Err(ConfigError::ReadFile { path, source }),
    }
}

/// `<config_dir>/taskwright/config.toml`, when the platform has a config
/// directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskwright").join("config.toml"))
}
