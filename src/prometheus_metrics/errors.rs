use thiserror::Error;

/// Possible errors when setting up metrics.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// A metric could not be registered, usually because one with the same name already was.
    #[error("Failed to register metric '{0}': {1}")]
    Registration(&'static str, #[source] prometheus::Error),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
