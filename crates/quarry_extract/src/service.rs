//! The compiler service seam.

use std::path::PathBuf;

use quarry_metadata::UnitMetadata;
use quarry_workspace::SourceLanguage;

/// One extraction request: a unit and the documents to extract from.
#[derive(Clone, Debug)]
pub struct CompileRequest {
    /// The canonical key of the unit being extracted.
    pub unit: String,
    /// The language of the unit's documents.
    pub language: SourceLanguage,
    /// The source documents to extract metadata from.
    pub documents: Vec<PathBuf>,
}

/// Errors raised while extracting metadata from a unit.
///
/// Any error fails the whole unit; the orchestrator reports it and the
/// unit contributes nothing to the merge.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A document could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The document being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A document could not be parsed.
    #[error("cannot parse {path}: {reason}")]
    Parse {
        /// The document being parsed.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The unit's language has no extractor.
    #[error("no extractor for language '{language}'")]
    Unsupported {
        /// The unsupported language tag.
        language: String,
    },
}

/// Produces a metadata tree for a compilation unit.
///
/// Implementations must be shareable across extraction workers.
pub trait CompilerService: Send + Sync {
    /// Extracts the metadata tree for one unit.
    fn compile(&self, request: &CompileRequest) -> Result<UnitMetadata, CompileError>;
}
