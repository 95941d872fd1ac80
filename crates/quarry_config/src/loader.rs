//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Loads and validates a `quarry.toml` configuration from a project directory.
///
/// Reads `<project_dir>/quarry.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join("quarry.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `quarry.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.targets.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one [targets.*] entry is required".to_string(),
        ));
    }
    if config.build.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "build.concurrency must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "mylib-docs"
version = "0.1.0"

[targets.api]
inputs = ["src/MyLib.sln"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "mylib-docs");
        assert_eq!(config.project.version, "0.1.0");
        assert_eq!(config.build.concurrency, 60);
        assert_eq!(config.targets["api"].inputs, vec!["src/MyLib.sln"]);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "mylib-docs"
version = "0.2.0"
description = "API metadata for MyLib"
authors = ["Alice", "Bob"]

[build]
output = "docs/_meta"
cache = ".cache/quarry"
concurrency = 8

[targets.api]
inputs = ["src/MyLib.sln", "tools/Extra.csproj"]

[targets.samples]
inputs = ["samples/Widget.cs"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.authors.len(), 2);
        assert_eq!(config.build.output, "docs/_meta");
        assert_eq!(config.build.cache, ".cache/quarry");
        assert_eq!(config.build.concurrency, 8);
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets["samples"].inputs, vec!["samples/Widget.cs"]);
    }

    #[test]
    fn missing_name_rejected() {
        let toml = r#"
[project]
name = ""
version = "0.1.0"

[targets.api]
inputs = ["a.sln"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn no_targets_rejected() {
        let toml = r#"
[project]
name = "docs"
version = "0.1.0"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn zero_concurrency_rejected() {
        let toml = r#"
[project]
name = "docs"
version = "0.1.0"

[build]
concurrency = 0

[targets.api]
inputs = ["a.sln"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn invalid_toml_rejected() {
        let err = load_config_from_str("not toml {{{").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("quarry.toml"),
            "[project]\nname = \"t\"\nversion = \"0.1.0\"\n[targets.api]\ninputs = [\"a.sln\"]\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "t");
    }

    #[test]
    fn load_from_missing_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_config(&missing).unwrap_err(),
            ConfigError::IoError(_)
        ));
    }
}
