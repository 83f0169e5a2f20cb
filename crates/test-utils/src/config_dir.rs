//! Temporary configuration directories.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// A scratch directory populated with `(relative path, contents)` files.
///
/// The directory lives as long as the returned `TempDir`.
pub fn config_dir(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (relative, contents) in files {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write config file");
    }
    let root = dir.path().to_path_buf();
    (dir, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_written_under_the_root() {
        let (_guard, root) = config_dir(&[("services/s101.yaml", "serviceCode: S101\n")]);
        let text = fs::read_to_string(root.join("services/s101.yaml")).unwrap();
        assert!(text.contains("S101"));
    }
}
