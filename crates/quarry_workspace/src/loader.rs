//! Loading solutions and projects from disk.
//!
//! Solutions use the Visual Studio text format; projects are MSBuild XML.
//! Only the parts Quarry needs are read: member project paths from
//! solutions, and compile items plus reference paths from projects.

use std::path::{Path, PathBuf};

use quarry_common::CanonicalPath;
use quarry_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

use crate::input::{classify, InputKind};

/// A loaded project: its canonical path, documents, and reference paths.
#[derive(Clone, Debug)]
pub struct ProjectHandle {
    /// Canonical path of the project file.
    pub path: CanonicalPath,
    /// Canonical paths of the project's source documents.
    pub documents: Vec<CanonicalPath>,
    /// Canonical paths of binary and project references.
    pub references: Vec<CanonicalPath>,
}

/// Errors raised while loading a solution or project.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file content could not be parsed.
    #[error("malformed {path}: {reason}")]
    Malformed {
        /// The file being parsed.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },
}

/// Expands solutions into projects and projects into document sets.
///
/// Implementations must be shareable across extraction workers. Paths in
/// loaded members that cannot be resolved are reported to the sink and
/// skipped; only a failure to read or parse the requested file itself is
/// an error.
pub trait WorkspaceLoader: Send + Sync {
    /// Loads a solution and every loadable member project.
    fn load_solution(
        &self,
        path: &CanonicalPath,
        sink: &DiagnosticSink,
    ) -> Result<Vec<ProjectHandle>, LoadError>;

    /// Loads a single project.
    fn load_project(
        &self,
        path: &CanonicalPath,
        sink: &DiagnosticSink,
    ) -> Result<ProjectHandle, LoadError>;
}

/// The production loader reading solutions and projects from the filesystem.
pub struct FsWorkspaceLoader;

impl WorkspaceLoader for FsWorkspaceLoader {
    fn load_solution(
        &self,
        path: &CanonicalPath,
        sink: &DiagnosticSink,
    ) -> Result<Vec<ProjectHandle>, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.as_path().to_path_buf(),
            source,
        })?;
        let solution_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut projects = Vec::new();
        for member in solution_members(&content) {
            let member_path = solution_dir.join(member);
            let canonical = match CanonicalPath::normalize(&member_path) {
                Ok(canonical) => canonical,
                Err(err) => {
                    sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::new(Category::Load, 202),
                            format!("solution member skipped: {err}"),
                        )
                        .with_source(path.as_path()),
                    );
                    continue;
                }
            };
            match self.load_project(&canonical, sink) {
                Ok(handle) => projects.push(handle),
                Err(err) => {
                    sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::new(Category::Load, 203),
                            format!("solution member skipped: {err}"),
                        )
                        .with_source(path.as_path()),
                    );
                }
            }
        }
        Ok(projects)
    }

    fn load_project(
        &self,
        path: &CanonicalPath,
        sink: &DiagnosticSink,
    ) -> Result<ProjectHandle, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.as_path().to_path_buf(),
            source,
        })?;
        let doc = roxmltree::Document::parse(&content).map_err(|e| LoadError::Malformed {
            path: path.as_path().to_path_buf(),
            reason: e.to_string(),
        })?;
        let project_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut document_paths = Vec::new();
        let mut reference_paths = Vec::new();
        for node in doc.descendants() {
            match node.tag_name().name() {
                "Compile" => {
                    if let Some(include) = node.attribute("Include") {
                        document_paths.extend(expand_include(project_dir, include));
                    }
                }
                "ProjectReference" => {
                    if let Some(include) = node.attribute("Include") {
                        reference_paths.push(project_dir.join(windows_separators(include)));
                    }
                }
                "HintPath" => {
                    if let Some(hint) = node.text() {
                        reference_paths.push(project_dir.join(windows_separators(hint.trim())));
                    }
                }
                _ => {}
            }
        }

        // SDK-style projects compile every .cs file under the project
        // directory unless items are listed explicitly.
        let is_sdk_style = doc.root_element().attribute("Sdk").is_some();
        if document_paths.is_empty() && is_sdk_style {
            let mut found = Vec::new();
            walk_sources(project_dir, "cs", &mut found);
            found.sort();
            document_paths = found;
        }

        let documents = resolve_members(path, &document_paths, sink);
        let references = resolve_members(path, &reference_paths, sink);

        Ok(ProjectHandle {
            path: path.clone(),
            documents,
            references,
        })
    }
}

/// Extracts member project paths from solution file content.
///
/// Member lines look like:
/// `Project("{GUID}") = "Name", "rel\path.csproj", "{GUID}"`.
/// Entries whose path is not a recognized project file (solution folders,
/// website projects) are skipped.
fn solution_members(content: &str) -> Vec<PathBuf> {
    let mut members = Vec::new();
    for line in content.lines() {
        let line = line.trim_start();
        if !line.starts_with("Project(") {
            continue;
        }
        let quoted: Vec<&str> = line.split('"').collect();
        // Quoted segments: [1] type GUID, [3] name, [5] relative path.
        if quoted.len() < 6 {
            continue;
        }
        let member = windows_separators(quoted[5]);
        if classify(&member) == InputKind::Project {
            members.push(member);
        }
    }
    members
}

/// Converts MSBuild backslash separators to the host separator.
fn windows_separators(raw: &str) -> PathBuf {
    PathBuf::from(raw.replace('\\', "/"))
}

/// Expands one `<Compile Include=...>` item.
///
/// Literal paths resolve against the project directory. Wildcard patterns
/// match recursively below the pattern's fixed directory prefix, filtered
/// by the pattern's extension.
fn expand_include(project_dir: &Path, include: &str) -> Vec<PathBuf> {
    let pattern = windows_separators(include);
    let text = pattern.to_string_lossy();
    if !text.contains('*') {
        return vec![project_dir.join(&pattern)];
    }

    let mut base = project_dir.to_path_buf();
    for component in text.split('/') {
        if component.contains('*') {
            break;
        }
        base.push(component);
    }
    let ext = Path::new(text.as_ref())
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("cs")
        .to_ascii_lowercase();

    let mut found = Vec::new();
    walk_sources(&base, &ext, &mut found);
    found.sort();
    found
}

/// Recursively collects files with the given extension, skipping build
/// output and hidden directories.
fn walk_sources(dir: &Path, ext: &str, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == "bin" || name == "obj" || name.starts_with('.') {
                continue;
            }
            walk_sources(&path, ext, files);
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        {
            files.push(path);
        }
    }
}

/// Canonicalizes member paths, warning about and skipping unresolvable ones.
fn resolve_members(
    owner: &CanonicalPath,
    paths: &[PathBuf],
    sink: &DiagnosticSink,
) -> Vec<CanonicalPath> {
    let mut resolved = Vec::new();
    for path in paths {
        match CanonicalPath::normalize(path) {
            Ok(canonical) => resolved.push(canonical),
            Err(err) => {
                sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::new(Category::Load, 205),
                        format!("project item skipped: {err}"),
                    )
                    .with_source(owner.as_path()),
                );
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn canonical(path: &Path) -> CanonicalPath {
        CanonicalPath::normalize(path).unwrap()
    }

    const OLD_STYLE_PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <ItemGroup>
    <Compile Include="A.cs" />
    <Compile Include="Sub\B.cs" />
  </ItemGroup>
  <ItemGroup>
    <Reference Include="Newtonsoft.Json">
      <HintPath>libs\Newtonsoft.Json.dll</HintPath>
    </Reference>
  </ItemGroup>
</Project>
"#;

    #[test]
    fn load_old_style_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("Lib.csproj"), OLD_STYLE_PROJECT);
        write(&root.join("A.cs"), "class A {}");
        write(&root.join("Sub/B.cs"), "class B {}");
        write(&root.join("libs/Newtonsoft.Json.dll"), "dll");

        let sink = DiagnosticSink::new();
        let handle = FsWorkspaceLoader
            .load_project(&canonical(&root.join("Lib.csproj")), &sink)
            .unwrap();

        assert_eq!(handle.documents.len(), 2);
        assert!(handle.documents[0].key().ends_with("A.cs"));
        assert!(handle.documents[1].key().ends_with("B.cs"));
        assert_eq!(handle.references.len(), 1);
        assert!(handle.references[0].key().ends_with("Newtonsoft.Json.dll"));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn load_sdk_style_project_globs_sources() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("Lib.csproj"),
            "<Project Sdk=\"Microsoft.NET.Sdk\">\n</Project>\n",
        );
        write(&root.join("A.cs"), "class A {}");
        write(&root.join("Sub/B.cs"), "class B {}");
        write(&root.join("bin/Gen.cs"), "class Gen {}");
        write(&root.join("obj/Tmp.cs"), "class Tmp {}");

        let sink = DiagnosticSink::new();
        let handle = FsWorkspaceLoader
            .load_project(&canonical(&root.join("Lib.csproj")), &sink)
            .unwrap();

        let keys: Vec<String> = handle.documents.iter().map(|d| d.key()).collect();
        assert_eq!(keys.len(), 2, "bin/ and obj/ must be excluded: {keys:?}");
        assert!(keys.iter().any(|k| k.ends_with("A.cs")));
        assert!(keys.iter().any(|k| k.ends_with("B.cs")));
    }

    #[test]
    fn load_project_with_wildcard_include() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("Lib.csproj"),
            r#"<Project ToolsVersion="15.0">
  <ItemGroup>
    <Compile Include="Gen\**\*.cs" />
  </ItemGroup>
</Project>
"#,
        );
        write(&root.join("Gen/One.cs"), "class One {}");
        write(&root.join("Gen/Deep/Two.cs"), "class Two {}");
        write(&root.join("Other.cs"), "class Other {}");

        let sink = DiagnosticSink::new();
        let handle = FsWorkspaceLoader
            .load_project(&canonical(&root.join("Lib.csproj")), &sink)
            .unwrap();

        let keys: Vec<String> = handle.documents.iter().map(|d| d.key()).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.contains("Gen")));
    }

    #[test]
    fn project_reference_is_collected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("app/App.csproj"),
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <ProjectReference Include="..\lib\Lib.csproj" />
  </ItemGroup>
</Project>
"#,
        );
        write(&root.join("app/Main.cs"), "class Main {}");
        write(&root.join("lib/Lib.csproj"), "<Project Sdk=\"Microsoft.NET.Sdk\"/>");

        let sink = DiagnosticSink::new();
        let handle = FsWorkspaceLoader
            .load_project(&canonical(&root.join("app/App.csproj")), &sink)
            .unwrap();
        assert_eq!(handle.references.len(), 1);
        assert!(handle.references[0].key().ends_with("Lib.csproj"));
    }

    #[test]
    fn missing_document_warns_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("Lib.csproj"),
            r#"<Project ToolsVersion="15.0">
  <ItemGroup>
    <Compile Include="A.cs" />
    <Compile Include="Gone.cs" />
  </ItemGroup>
</Project>
"#,
        );
        write(&root.join("A.cs"), "class A {}");

        let sink = DiagnosticSink::new();
        let handle = FsWorkspaceLoader
            .load_project(&canonical(&root.join("Lib.csproj")), &sink)
            .unwrap();
        assert_eq!(handle.documents.len(), 1);
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("project item skipped")));
    }

    #[test]
    fn malformed_project_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bad.csproj");
        write(&path, "<Project><unclosed</Project>");

        let sink = DiagnosticSink::new();
        let err = FsWorkspaceLoader
            .load_project(&canonical(&path), &sink)
            .unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
    }

    const SOLUTION: &str = r#"Microsoft Visual Studio Solution File, Format Version 12.00
# Visual Studio Version 17
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "LibA", "LibA\LibA.csproj", "{11111111-1111-1111-1111-111111111111}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "LibB", "LibB\LibB.csproj", "{22222222-2222-2222-2222-222222222222}"
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "Items", "Items", "{33333333-3333-3333-3333-333333333333}"
EndProject
Global
EndGlobal
"#;

    #[test]
    fn load_solution_skips_solution_folders() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("All.sln"), SOLUTION);
        write(
            &root.join("LibA/LibA.csproj"),
            "<Project Sdk=\"Microsoft.NET.Sdk\"/>",
        );
        write(&root.join("LibA/A.cs"), "class A {}");
        write(
            &root.join("LibB/LibB.csproj"),
            "<Project Sdk=\"Microsoft.NET.Sdk\"/>",
        );

        let sink = DiagnosticSink::new();
        let projects = FsWorkspaceLoader
            .load_solution(&canonical(&root.join("All.sln")), &sink)
            .unwrap();
        assert_eq!(projects.len(), 2);
        assert!(projects[0].path.key().ends_with("LibA.csproj"));
        assert_eq!(projects[0].documents.len(), 1);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn load_solution_warns_on_missing_member() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("All.sln"), SOLUTION);
        write(
            &root.join("LibA/LibA.csproj"),
            "<Project Sdk=\"Microsoft.NET.Sdk\"/>",
        );
        // LibB is missing.

        let sink = DiagnosticSink::new();
        let projects = FsWorkspaceLoader
            .load_solution(&canonical(&root.join("All.sln")), &sink)
            .unwrap();
        assert_eq!(projects.len(), 1);
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("solution member skipped")));
    }

    #[test]
    fn load_missing_solution_errors() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("x.sln");
        write(&existing, SOLUTION);
        let canonical = CanonicalPath::normalize(&existing).unwrap();
        std::fs::remove_file(&existing).unwrap();

        let sink = DiagnosticSink::new();
        let err = FsWorkspaceLoader
            .load_solution(&canonical, &sink)
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
