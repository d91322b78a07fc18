use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Optional YAML override for the named location table.
    pub locations_path: Option<PathBuf>,
    pub api_key_hash_salt: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub recommend_limit: usize,
    pub nearby_radius_km: f64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("locations_path", &self.locations_path)
            .field("database_url", &"[redacted]")
            .field("api_key_hash_salt", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("recommend_limit", &self.recommend_limit)
            .field("nearby_radius_km", &self.nearby_radius_km)
            .finish()
    }
}

impl AppConfig {
    /// Load the named location table from `locations_path`, or fall back to
    /// the built-in table when no path is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configured file cannot be loaded.
    pub fn location_table(&self) -> Result<crate::NamedLocationTable, crate::ConfigError> {
        match &self.locations_path {
            Some(path) => crate::load_locations(path),
            None => Ok(crate::NamedLocationTable::default()),
        }
    }
}
