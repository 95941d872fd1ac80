//! `quarry clean` — drops the build cache.

use crate::project::resolve_project_root;
use crate::GlobalArgs;

/// Runs the `quarry clean` command.
///
/// Removes the configured cache root. The next build starts cold.
/// Returns exit code 0 on success.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = quarry_config::load_config(&project_dir)?;
    let cache_dir = project_dir.join(&config.build.cache);

    if cache_dir.is_dir() {
        std::fs::remove_dir_all(&cache_dir)?;
        if !global.quiet {
            eprintln!("  Removed {}", cache_dir.display());
        }
    } else if !global.quiet {
        eprintln!("  Nothing to clean");
    }

    Ok(0)
}
