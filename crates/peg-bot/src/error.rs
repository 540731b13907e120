//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Webex error: {0}")]
    Webex(#[from] webex_client::WebexError),

    #[error("Store error: {0}")]
    Store(#[from] peg_store::StoreError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Trigger(String),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;

/// Trigger registry invariant violations. Fatal at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry {0} has no triggers")]
    Empty(&'static str),

    #[error("registry {0} does not end with a default trigger")]
    MissingDefault(&'static str),

    #[error("registry {registry} has a default trigger at position {position} that is not last")]
    DefaultNotLast {
        registry: &'static str,
        position: usize,
    },

    #[error("registry {0} has more than one default trigger")]
    MultipleDefaults(&'static str),
}

/// Failures recovered at the dispatch boundary.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("matcher panicked: {0}")]
    MatchEvaluation(String),

    #[error("trigger {trigger} failed: {source}")]
    ResponseProduction {
        trigger: String,
        #[source]
        source: AppError,
    },

    #[error("trigger {trigger} panicked: {message}")]
    ResponsePanicked { trigger: String, message: String },

    #[error("trigger {0} produced an empty reply")]
    EmptyReply(String),
}
