//! Diagnostic codes with subsystem prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The subsystem a diagnostic originates from, determining its prefix letter.
///
/// Each category maps to a single-character prefix used in diagnostic code
/// display (e.g., `I101` for an input problem, `K301` for a cache problem).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Input classification and normalization, prefixed with `I`.
    Input,
    /// Workspace and project loading, prefixed with `L`.
    Load,
    /// Metadata extraction, prefixed with `C`.
    Compile,
    /// Cache reads and writes, prefixed with `K`.
    Cache,
    /// Top-level build orchestration, prefixed with `B`.
    Build,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Input => 'I',
            Category::Load => 'L',
            Category::Compile => 'C',
            Category::Cache => 'K',
            Category::Build => 'B',
        }
    }
}

/// A structured diagnostic code combining a subsystem prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `I101`, `L204`, `K302`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The subsystem of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
