//! Configuration types deserialized from `quarry.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `quarry.toml`.
///
/// Contains project metadata, build settings (output and cache locations,
/// extraction concurrency), and the named metadata targets.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, version).
    pub project: ProjectMeta,
    /// Build settings (output root, cache root, concurrency cap).
    #[serde(default)]
    pub build: BuildSettings,
    /// Named metadata targets: output folder name → input set.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Core project metadata required in every `quarry.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
    /// List of project authors.
    #[serde(default)]
    pub authors: Vec<String>,
}

/// Build settings controlling output locations and extraction parallelism.
#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    /// Root directory for generated metadata, relative to the project root.
    #[serde(default = "default_output")]
    pub output: String,
    /// Root directory for the build cache, relative to the project root.
    #[serde(default = "default_cache")]
    pub cache: String,
    /// Maximum number of concurrently processed compilation units.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
            cache: default_cache(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_output() -> String {
    "_meta".to_string()
}

fn default_cache() -> String {
    ".quarry/cache".to_string()
}

fn default_concurrency() -> usize {
    60
}

/// One metadata target: an output folder fed by an ordered set of inputs.
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    /// Input paths: solutions, projects, or standalone source files.
    pub inputs: Vec<String>,
}
