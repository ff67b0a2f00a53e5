use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read engines file {path}: {source}")]
    EnginesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse engines file: {0}")]
    EnginesFileParse(#[from] serde_yaml::Error),

    #[error("engine configuration invalid: {0}")]
    Validation(String),
}
