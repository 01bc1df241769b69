// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small filesystem helpers shared by staging and archiving.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Copy one file, creating the destination's parent directories.
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)
}

/// Recursively copy every file under `src` into `dst`. Returns the file count.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<usize> {
    let files = walk_files(src)?;
    fs::create_dir_all(dst)?;
    for rel in &files {
        copy_file(&src.join(rel), &dst.join(rel))?;
    }
    Ok(files.len())
}

/// All regular files under `root`, as sorted paths relative to `root`.
///
/// Directories are traversed but not listed. Symlinks are not followed.
pub fn walk_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(rel_dir) = pending.pop() {
        for entry in fs::read_dir(root.join(&rel_dir))? {
            let entry = entry?;
            let rel = rel_dir.join(entry.file_name());
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(rel);
            } else if file_type.is_file() {
                files.push(rel);
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_lists_nested_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        fs::create_dir_all(dir.path().join("assets/js")).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("plugin.yaml"), "id: p").unwrap();
        fs::write(dir.path().join("bin/plugin"), "elf").unwrap();
        fs::write(dir.path().join("assets/js/app.js"), "js").unwrap();

        let files = walk_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("assets/js/app.js"),
                PathBuf::from("bin/plugin"),
                PathBuf::from("plugin.yaml"),
            ]
        );
    }

    #[test]
    fn copy_dir_all_preserves_layout() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("css")).unwrap();
        fs::write(src.path().join("index.js"), "a").unwrap();
        fs::write(src.path().join("css/site.css"), "b").unwrap();

        let target = dst.path().join("assets");
        assert_eq!(copy_dir_all(src.path(), &target).unwrap(), 2);
        assert_eq!(fs::read_to_string(target.join("css/site.css")).unwrap(), "b");
    }

    #[test]
    fn copy_dir_all_missing_source_fails() {
        let dst = tempfile::tempdir().unwrap();
        assert!(copy_dir_all(Path::new("/nonexistent/assets"), dst.path()).is_err());
    }
}
