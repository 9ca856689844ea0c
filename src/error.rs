use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single page fetch/extract cycle
#[derive(Debug, Error)]
pub enum PageError {
    /// An expected DOM node is absent on an otherwise-loaded page
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// The readiness wait exceeded its bound
    #[error("timed out after {timeout:?} waiting for {condition}")]
    PageLoadTimeout { condition: String, timeout: Duration },

    /// The renderer process is unresponsive or gone
    #[error("renderer fault: {0}")]
    RendererFault(String),

    /// No usable session could be obtained for this page
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Extracted rows could not be written
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Anything else
    #[error("{0}")]
    Unclassified(String),
}

impl PageError {
    /// Short label used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            PageError::ElementNotFound(_) => "ElementNotFound",
            PageError::PageLoadTimeout { .. } => "PageLoadTimeout",
            PageError::RendererFault(_) => "RendererFault",
            PageError::Session(_) => "SessionUnavailable",
            PageError::Sink(_) => "SinkFailure",
            PageError::Unclassified(_) => "UnclassifiedException",
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no renderer session has been started")]
    NotStarted,

    #[error("failed to create renderer: {0}")]
    Create(String),

    #[error("identity pool is empty")]
    NoIdentity,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to prepare {path}: {source}")]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} was not prepared for this company")]
    NotPrepared(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("roster {0} contains no usable companies")]
    Empty(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Install(#[from] log::SetLoggerError),
}

/// Errors that stop a harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
