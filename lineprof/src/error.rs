use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("missing required parameters")]
    Builder,

    #[error("invalid input: {0}")]
    Input(String),

    #[error("dataset {0} not found")]
    DatasetNotFound(String),

    #[error("dataset {dataset} unreadable: {reason}")]
    DatasetUnreadable { dataset: String, reason: String },

    #[error("no usable transform for {dataset}: {reason}")]
    Metadata { dataset: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

/// A raster value lookup failed as a whole.
///
/// Lookups for individual coordinates that fail are reported as
/// `None` entries instead.
#[derive(Error, Debug)]
#[error("value lookup failed: {0}")]
pub struct SampleError(pub String);
