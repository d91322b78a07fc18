use thiserror::Error;

/// Errors raised by the ranking and recommendation core.
///
/// All variants are deterministic for a given input; nothing here is worth
/// retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Malformed or out-of-range input, e.g. a latitude of `91.0`.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("consumer {0} not found")]
    UnknownConsumer(i64),

    /// The proximity strategy found no seller with a known distance.
    #[error("no seller has a resolvable location")]
    NoResolvableSeller,
}

impl CoreError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read locations file {path}: {source}")]
    LocationsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse locations file: {0}")]
    LocationsFileParse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
