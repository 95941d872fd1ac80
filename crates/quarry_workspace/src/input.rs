//! Input classification and target normalization.

use std::path::{Path, PathBuf};

use quarry_common::CanonicalPath;
use quarry_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

/// The language of a standalone source file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum SourceLanguage {
    /// C# (`.cs`).
    CSharp,
}

impl SourceLanguage {
    /// Short tag used in unit keys and diagnostics.
    pub fn tag(self) -> &'static str {
        match self {
            SourceLanguage::CSharp => "cs",
        }
    }
}

/// What kind of compilation input a path is.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputKind {
    /// A solution file expanding to multiple projects.
    Solution,
    /// A single project file.
    Project,
    /// A standalone source file.
    Source(SourceLanguage),
    /// Anything else; dropped with a warning.
    Unsupported,
}

/// Classifies a path by its extension against the fixed input table.
pub fn classify(path: &Path) -> InputKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("sln") => InputKind::Solution,
        Some("csproj") => InputKind::Project,
        Some("cs") => InputKind::Source(SourceLanguage::CSharp),
        _ => InputKind::Unsupported,
    }
}

/// One output target: a folder name fed by an ordered set of canonical inputs.
#[derive(Clone, Debug)]
pub struct InputTarget {
    /// The output folder name for this target.
    pub name: String,
    /// Ordered, deduplicated canonical input paths.
    pub inputs: Vec<CanonicalPath>,
}

impl InputTarget {
    /// Ordered canonical key strings of this target's inputs.
    pub fn input_keys(&self) -> Vec<String> {
        self.inputs.iter().map(|p| p.key()).collect()
    }
}

/// Normalizes raw targets into canonical [`InputTarget`]s.
///
/// Per input path: canonicalization failure (usually a missing file) and
/// unsupported extensions each drop the path with a warning; duplicates
/// within a target are dropped silently, keeping the first occurrence.
/// Targets with no raw inputs are dropped with a warning; a target whose
/// inputs *all* fail normalization is kept empty so the orchestrator can
/// fail it as a target-level error.
pub fn normalize_targets(
    raw: &[(String, Vec<PathBuf>)],
    sink: &DiagnosticSink,
) -> Vec<InputTarget> {
    let mut targets = Vec::new();

    for (name, paths) in raw {
        if paths.is_empty() {
            sink.emit(Diagnostic::warning(
                DiagnosticCode::new(Category::Input, 103),
                format!("target '{name}' has no inputs and was dropped"),
            ));
            continue;
        }

        let mut inputs: Vec<CanonicalPath> = Vec::new();
        for path in paths {
            let canonical = match CanonicalPath::normalize(path) {
                Ok(canonical) => canonical,
                Err(err) => {
                    sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::new(Category::Input, 101),
                            format!("input ignored: {err}"),
                        )
                        .with_source(path.clone()),
                    );
                    continue;
                }
            };
            if classify(canonical.as_path()) == InputKind::Unsupported {
                sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::new(Category::Input, 102),
                        "unsupported input type ignored".to_string(),
                    )
                    .with_source(canonical.as_path()),
                );
                continue;
            }
            if !inputs.contains(&canonical) {
                inputs.push(canonical);
            }
        }

        targets.push(InputTarget {
            name: name.clone(),
            inputs,
        });
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_extension() {
        assert_eq!(classify(Path::new("a/MyLib.sln")), InputKind::Solution);
        assert_eq!(classify(Path::new("a/MyLib.csproj")), InputKind::Project);
        assert_eq!(
            classify(Path::new("a/Widget.cs")),
            InputKind::Source(SourceLanguage::CSharp)
        );
        assert_eq!(classify(Path::new("a/readme.md")), InputKind::Unsupported);
        assert_eq!(classify(Path::new("a/noext")), InputKind::Unsupported);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify(Path::new("A/MYLIB.SLN")), InputKind::Solution);
        assert_eq!(classify(Path::new("A/Widget.CS")), InputKind::Source(SourceLanguage::CSharp));
    }

    #[test]
    fn normalize_dedupes_preserving_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csproj");
        let b = dir.path().join("b.csproj");
        std::fs::write(&a, "<Project/>").unwrap();
        std::fs::write(&b, "<Project/>").unwrap();

        let sink = DiagnosticSink::new();
        let raw = vec![(
            "api".to_string(),
            vec![b.clone(), a.clone(), b.clone()],
        )];
        let targets = normalize_targets(&raw, &sink);
        assert_eq!(targets.len(), 1);
        let keys = targets[0].input_keys();
        assert_eq!(keys.len(), 2);
        assert!(keys[0].ends_with("b.csproj"));
        assert!(keys[1].ends_with("a.csproj"));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn normalize_drops_missing_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csproj");
        std::fs::write(&a, "<Project/>").unwrap();

        let sink = DiagnosticSink::new();
        let raw = vec![(
            "api".to_string(),
            vec![dir.path().join("missing.csproj"), a],
        )];
        let targets = normalize_targets(&raw, &sink);
        assert_eq!(targets[0].inputs.len(), 1);
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("input ignored"));
    }

    #[test]
    fn normalize_drops_unsupported_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "notes").unwrap();

        let sink = DiagnosticSink::new();
        let raw = vec![("api".to_string(), vec![txt])];
        let targets = normalize_targets(&raw, &sink);
        assert!(targets[0].inputs.is_empty());
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("unsupported input type")));
    }

    #[test]
    fn normalize_drops_empty_raw_target() {
        let sink = DiagnosticSink::new();
        let raw = vec![("empty".to_string(), Vec::new())];
        let targets = normalize_targets(&raw, &sink);
        assert!(targets.is_empty());
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("no inputs")));
    }
}
