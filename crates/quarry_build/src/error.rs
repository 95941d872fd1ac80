//! Target-level build errors.

use std::path::PathBuf;

/// Unrecoverable failures of one target's build.
///
/// Everything recoverable (load, compile, and cache-read problems) is
/// absorbed at the unit boundary and reported as a warning; these errors
/// fail the whole target. Other targets in the same run are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// After normalization and expansion, the target has no usable unit.
    #[error("target '{target}' has no valid input")]
    NoValidInput {
        /// The failed target name.
        target: String,
    },

    /// An output document could not be written.
    #[error("cannot write output {path}: {source}")]
    OutputWrite {
        /// The output path being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An extraction worker died unexpectedly.
    #[error("extraction worker failed: {message}")]
    Worker {
        /// Description of the worker failure.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_valid_input_display() {
        let err = BuildError::NoValidInput {
            target: "api".to_string(),
        };
        assert_eq!(format!("{err}"), "target 'api' has no valid input");
    }

    #[test]
    fn output_write_display() {
        let err = BuildError::OutputWrite {
            path: PathBuf::from("/out/api/Acme.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Acme.json"));
        assert!(msg.contains("denied"));
    }
}
