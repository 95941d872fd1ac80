//! `quarry init` — project scaffolding command.

use std::fs;
use std::path::PathBuf;

/// Runs the `quarry init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory.
/// Returns exit code 0 on success.
pub fn run(name: Option<String>) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{n}' already exists").into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };

    let config_path = project_dir.join("quarry.toml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()).into());
    }

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("my-docs");

    fs::write(&config_path, config_template(project_name))?;
    eprintln!("  Created {}", config_path.display());
    eprintln!("  Add solutions, projects, or source files to [targets.api]");

    Ok(0)
}

/// The scaffolded `quarry.toml` content.
fn config_template(project_name: &str) -> String {
    format!(
        r#"[project]
name = "{project_name}"
version = "0.1.0"

[build]
# output = "_meta"
# cache = ".quarry/cache"
# concurrency = 60

[targets.api]
inputs = []
"#
    )
}
