//! The artifact mover: relocating previously produced outputs.

use std::path::Path;

/// Copies `files` (relative paths) from `source_root` into `dest_root`.
///
/// Used by the application-level short-circuit to reuse a previous build's
/// outputs instead of recompiling. When source and destination are the
/// same folder the files are only verified to exist. With `overwrite`
/// false, files already present in the destination are left untouched.
/// Returns the number of files copied (or verified in place).
pub fn copy_outputs(
    files: &[std::path::PathBuf],
    source_root: &Path,
    dest_root: &Path,
    overwrite: bool,
) -> std::io::Result<usize> {
    if source_root == dest_root {
        for file in files {
            let path = source_root.join(file);
            if !path.is_file() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("missing output {}", path.display()),
                ));
            }
        }
        return Ok(files.len());
    }

    let mut copied = 0;
    for file in files {
        let dest = dest_root.join(file);
        if !overwrite && dest.exists() {
            continue;
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(source_root.join(file), &dest)?;
        copied += 1;
    }
    Ok(copied)
}
