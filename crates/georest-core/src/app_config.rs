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
    pub log_level: String,
    pub elastic_url: String,
    pub photon_url: String,
    pub nominatim_url: String,
    pub geocoder_url: String,
    pub geocoder_api_key: Option<String>,
    /// Response language requested from geocoding and region providers.
    pub language: String,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub http_max_retries: u32,
    pub http_retry_backoff_ms: u64,
    /// Worker count of the region-name lookup pool.
    pub lookup_concurrency: usize,
    pub engines_path: PathBuf,
    /// Replaces the couriers engine's index, including one read from the registry file.
    pub couriers_index: Option<String>,
    /// Replaces the index of both order engines.
    pub orders_index: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("elastic_url", &self.elastic_url)
            .field("photon_url", &self.photon_url)
            .field("nominatim_url", &self.nominatim_url)
            .field("geocoder_url", &self.geocoder_url)
            .field(
                "geocoder_api_key",
                &self.geocoder_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("language", &self.language)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("http_max_retries", &self.http_max_retries)
            .field("http_retry_backoff_ms", &self.http_retry_backoff_ms)
            .field("lookup_concurrency", &self.lookup_concurrency)
            .field("engines_path", &self.engines_path)
            .field("couriers_index", &self.couriers_index)
            .field("orders_index", &self.orders_index)
            .finish()
    }
}
