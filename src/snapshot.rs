use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

/// Write the panel fragment as a dated page (`YYYY-MM-DD.html`) under `dir`.
/// One file per calendar day; a second change on the same day overwrites it.
pub fn save_snapshot(dir: &Path, fragment: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .context(format!("Failed to create snapshot dir {}", dir.display()))?;

    let now = Local::now();
    let path = dir.join(format!("{}.html", now.format("%Y-%m-%d")));
    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Birthday Info ({})</title></head>\n<body>\n\
         <!-- Last updated: {} -->\n{}\n</body>\n</html>",
        now.format("%Y-%m-%d"),
        now.format("%Y-%m-%d %H:%M:%S"),
        fragment
    );

    std::fs::write(&path, page)
        .context(format!("Failed to write snapshot {}", path.display()))?;
    Ok(path)
}

/// All `.html` files under `root`, recursively, extension matched
/// case-insensitively. Order is whatever the filesystem yields; callers
/// must not depend on it.
pub fn collect_documents(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, &mut files)
        .context(format!("Failed to scan snapshot dir {}", root.display()))?;
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("html"))
        {
            files.push(path);
        }
    }
    Ok(())
}

// ── Tests ──
