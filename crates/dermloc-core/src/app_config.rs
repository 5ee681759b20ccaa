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
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Geodata query endpoints in priority order. Never empty.
    pub overpass_endpoints: Vec<String>,
    pub nominatim_url: String,
    pub charts_api_base: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub geolocation_timeout_secs: u64,
    pub max_results: usize,
    pub prefs_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("overpass_endpoints", &self.overpass_endpoints)
            .field("nominatim_url", &self.nominatim_url)
            .field("charts_api_base", &self.charts_api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("geolocation_timeout_secs", &self.geolocation_timeout_secs)
            .field("max_results", &self.max_results)
            .field("prefs_path", &self.prefs_path)
            .finish()
    }
}
