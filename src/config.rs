use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::core::policy::{
    PlaceOverride, SearchPolicy, DEFAULT_PREFIX_LEN, DEFAULT_RADIUS_MILES, MAX_RADIUS_MILES,
    MIN_RADIUS_MILES,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub pagination: PaginationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// L2 cache; L1-only when absent
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

/// Proximity search tunables
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_radius_miles")]
    pub default_radius_miles: f64,
    #[serde(default = "default_min_radius_miles")]
    pub min_radius_miles: f64,
    #[serde(default = "default_max_radius_miles")]
    pub max_radius_miles: f64,
    #[serde(default = "default_prefix_len")]
    pub prefix_len: usize,
    #[serde(default = "default_true")]
    pub boost_expected_place: bool,
    #[serde(default)]
    pub overrides: Vec<PlaceOverride>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_radius_miles: default_radius_miles(),
            min_radius_miles: default_min_radius_miles(),
            max_radius_miles: default_max_radius_miles(),
            prefix_len: default_prefix_len(),
            boost_expected_place: true,
            overrides: Vec::new(),
        }
    }
}

impl From<&SearchSettings> for SearchPolicy {
    fn from(settings: &SearchSettings) -> Self {
        let policy = SearchPolicy {
            default_radius_miles: settings.default_radius_miles,
            min_radius_miles: settings.min_radius_miles,
            max_radius_miles: settings.max_radius_miles,
            prefix_len: settings.prefix_len,
            boost_expected_place: settings.boost_expected_place,
            overrides: settings.overrides.clone(),
        };

        // Fields hold the bounds and default actually enforced
        let (min, max) = policy.radius_bounds();
        let default = policy.default_radius();
        SearchPolicy {
            default_radius_miles: default,
            min_radius_miles: min,
            max_radius_miles: max,
            ..policy
        }
    }
}

fn default_radius_miles() -> f64 { DEFAULT_RADIUS_MILES }
fn default_min_radius_miles() -> f64 { MIN_RADIUS_MILES }
fn default_max_radius_miles() -> f64 { MAX_RADIUS_MILES }
fn default_prefix_len() -> usize { DEFAULT_PREFIX_LEN }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

fn default_per_page() -> u32 { 20 }
fn default_max_per_page() -> u32 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ION__)
    /// 5. DATABASE_URL / REDIS_URL / LOG_LEVEL / LOG_FORMAT
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ION__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("ION")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional DATABASE_URL, REDIS_URL, LOG_LEVEL and LOG_FORMAT variables on top
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format)?;
    }

    builder.build()
}
