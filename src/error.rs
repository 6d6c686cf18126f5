//! Crate wide error type
use thiserror::Error;

/// Result alias with [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors which can be returned by fallible operations of this crate.
///
/// The iteration controller itself never fails, non convergence
/// is reported through its return value.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value
    #[error("invalid configuration: {key} = {value} ({reason})")]
    Config {
        /// Name of the offending parameter
        key: String,
        /// Value as string
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Mesh failed its consistency check
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// Array size does not match
    #[error("size mismatch for {name}: expected {expected}, got {actual}")]
    SizeMismatch {
        /// What was read
        name: String,
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Error from the hdf5 library
    #[error("hdf5: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// Error from the linear algebra backend
    #[error("linear algebra: {0}")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),

    /// Zero pivot in a linear system
    #[error("singular matrix, zero pivot in row {0}")]
    Singular(usize),

    /// Linear solver did not reach its tolerance
    #[error("linear solver did not converge after {iterations} iterations (residual {residual:e})")]
    NotConverged {
        /// Iterations performed
        iterations: usize,
        /// Last residual norm
        residual: f64,
    },

    /// Io error
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Json (de)serialization error
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`]
    pub fn config(key: &str, value: impl ToString, reason: &str) -> Self {
        Self::Config {
            key: key.to_owned(),
            value: value.to_string(),
            reason: reason.to_owned(),
        }
    }
}
