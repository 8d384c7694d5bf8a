//! Bridge error types.

use ponte_core::ModelError;
use std::path::PathBuf;

/// Errors raised while writing the NL file, running the solver, or
/// parsing the SOL file.
#[derive(Debug)]
pub enum AmplError {
    /// Model-side failure (validation, unsupported expression, ...).
    Model(ModelError),
    /// The SOL file violates the expected fixed layout.
    SolFormat { reason: String },
    /// IO failure on the problem or result file, or spawning the solver.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl AmplError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            AmplError::Model(err) => err.code(),
            AmplError::SolFormat { .. } => "SOL_FORMAT_VIOLATION",
            AmplError::Io { .. } => "AMPL_IO",
        }
    }

    pub(crate) fn sol_format(reason: impl Into<String>) -> Self {
        AmplError::SolFormat {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| AmplError::Io { path, source }
    }
}

impl std::fmt::Display for AmplError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmplError::Model(err) => write!(f, "{}", err),
            AmplError::SolFormat { reason } => {
                write!(f, "[{}] Malformed SOL file: {}", self.code(), reason)
            }
            AmplError::Io { path, source } => {
                write!(f, "[{}] IO error on {}: {}", self.code(), path.display(), source)
            }
        }
    }
}

impl std::error::Error for AmplError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmplError::Model(err) => Some(err),
            AmplError::SolFormat { .. } => None,
            AmplError::Io { source, .. } => Some(source),
        }
    }
}

impl From<ModelError> for AmplError {
    fn from(err: ModelError) -> Self {
        AmplError::Model(err)
    }
}
