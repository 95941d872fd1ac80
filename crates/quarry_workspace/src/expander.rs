//! Expansion of target inputs into registered compilation units.

use quarry_common::CanonicalPath;
use quarry_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

use crate::document_set::DocumentSet;
use crate::input::SourceLanguage;
use crate::loader::{ProjectHandle, WorkspaceLoader};
use crate::registry::ProjectRegistry;

/// A group of same-language standalone source files with no project file.
#[derive(Clone, Debug)]
pub struct SourceFileGroup {
    /// The shared language of the files.
    pub language: SourceLanguage,
    /// Ordered canonical file paths.
    pub files: Vec<CanonicalPath>,
}

impl SourceFileGroup {
    /// The unit key of this group in registries and cache scopes.
    pub fn unit_key(&self) -> String {
        format!("group:{}", self.language.tag())
    }

    /// The group's dependency file set (the files themselves).
    pub fn document_set(&self) -> DocumentSet {
        let mut set = DocumentSet::new();
        for file in &self.files {
            set.insert(file);
        }
        set
    }
}

/// Expands a solution input: loads it and registers every member project.
///
/// A solution that fails to load is reported as a warning and excluded;
/// the run continues with the remaining inputs. Member projects already
/// registered (e.g. reachable from another solution) are skipped by the
/// registry's insert-if-absent semantics.
pub fn expand_solution(
    loader: &dyn WorkspaceLoader,
    path: &CanonicalPath,
    registry: &ProjectRegistry,
    sink: &DiagnosticSink,
) {
    match loader.load_solution(path, sink) {
        Ok(projects) => {
            for handle in projects {
                registry.register(handle);
            }
        }
        Err(err) => {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::new(Category::Load, 201),
                    format!("solution excluded: {err}"),
                )
                .with_source(path.as_path()),
            );
        }
    }
}

/// Expands an explicitly listed project input.
///
/// Skipped silently when the project was already discovered via a
/// solution. A project that fails to load is reported as a warning and
/// excluded; the run continues.
pub fn expand_project(
    loader: &dyn WorkspaceLoader,
    path: &CanonicalPath,
    registry: &ProjectRegistry,
    sink: &DiagnosticSink,
) {
    if registry.contains(&path.key()) {
        return;
    }
    match loader.load_project(path, sink) {
        Ok(handle) => {
            registry.register(handle);
        }
        Err(err) => {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::new(Category::Load, 204),
                    format!("project excluded: {err}"),
                )
                .with_source(path.as_path()),
            );
        }
    }
}

/// Groups standalone source files into one unit per language.
pub fn group_sources(sources: &[(CanonicalPath, SourceLanguage)]) -> Vec<SourceFileGroup> {
    let mut groups: Vec<SourceFileGroup> = Vec::new();
    for (path, language) in sources {
        match groups.iter_mut().find(|g| g.language == *language) {
            Some(group) => {
                if !group.files.contains(path) {
                    group.files.push(path.clone());
                }
            }
            None => groups.push(SourceFileGroup {
                language: *language,
                files: vec![path.clone()],
            }),
        }
    }
    groups
}
