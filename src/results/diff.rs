//! Diff artifact sweep
//!
//! Failed comparisons leave `*.dif` files next to the test that produced
//! them. After a run they are concatenated into one diagnostic log.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Every `*.dif` file under `root` (extension matched case-insensitively),
/// sorted by path
pub fn find_dif_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("dif"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// `./relative/path` form used in the log headers
fn display_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    format!("./{}", relative.display())
}

/// Write every diff under `root` to `out`, each preceded by a
/// `FILENAME:` header. Returns the number of files written.
pub fn write_dif_files(root: &Path, out: &mut impl Write) -> Result<usize> {
    let files = find_dif_files(root);

    for path in &files {
        let name = display_name(root, path);
        info!("{}", name);

        let content =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        writeln!(out, "FILENAME: {name}")?;
        out.write_all(&content)?;
    }

    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_and_write() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("test/dhfr")).unwrap();
        fs::create_dir_all(root.path().join("AmberTools/test/leap")).unwrap();
        fs::write(root.path().join("test/dhfr/mdout.dif"), "< 1.0\n> 1.1\n").unwrap();
        fs::write(root.path().join("AmberTools/test/leap/prmtop.DIF"), "< a\n> b\n").unwrap();
        fs::write(root.path().join("test/dhfr/mdout.save"), "not a diff\n").unwrap();

        let files = find_dif_files(root.path());
        assert_eq!(files.len(), 2);

        let mut out = Vec::new();
        let count = write_dif_files(root.path(), &mut out).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "FILENAME: ./AmberTools/test/leap/prmtop.DIF\n< a\n> b\n\
             FILENAME: ./test/dhfr/mdout.dif\n< 1.0\n> 1.1\n"
        );
    }

    #[test]
    fn test_no_diffs() {
        let root = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        assert_eq!(write_dif_files(root.path(), &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }
}
