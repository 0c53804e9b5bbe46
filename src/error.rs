use thiserror::Error;

/// Unified error type for drclean operations
#[derive(Error, Debug)]
pub enum DrcleanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Revision parsing error: {0}")]
    Revision(String),

    #[error("No valid tags found to continue from")]
    NoValidTags,

    #[error("Registry operation failed: {0}")]
    Registry(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in drclean
pub type Result<T> = std::result::Result<T, DrcleanError>;

impl DrcleanError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        DrcleanError::Config(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        DrcleanError::Tag(msg.into())
    }

    /// Create a revision error with context
    pub fn revision(msg: impl Into<String>) -> Self {
        DrcleanError::Revision(msg.into())
    }

    /// Create a registry error with context
    pub fn registry(msg: impl Into<String>) -> Self {
        DrcleanError::Registry(msg.into())
    }
}
