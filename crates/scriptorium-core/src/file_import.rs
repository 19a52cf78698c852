use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{Result, ScriptoriumError};

/// SHA-256 of the full byte content, lowercase hex.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Title fallback for documents without embedded metadata: the file name
/// without its final extension.
pub fn stem_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

/// Path recorded for a file: canonical when resolvable, otherwise as given.
pub fn display_path(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// Case-insensitive extension check against a list like `["pdf"]`.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            extensions.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}

/// Collect files under `dir` whose extension is in `extensions`, sorted by path.
pub fn scan_directory(dir: &Path, recursive: bool, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ScriptoriumError::NotFound(dir.display().to_string()));
    }

    let mut files = Vec::new();
    collect_files(dir, recursive, extensions, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(
    dir: &Path,
    recursive: bool,
    extensions: &[&str],
    out: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, true, extensions, out)?;
            }
        } else if path.is_file() && has_extension(&path, extensions) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
    }

    #[test]
    fn test_stem_title() {
        assert_eq!(stem_title(Path::new("/tmp/attention.v2.pdf")), "attention.v2");
        assert_eq!(stem_title(Path::new("paper.pdf")), "paper");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a.pdf"), &["pdf"]));
        assert!(has_extension(Path::new("a.PDF"), &["pdf"]));
        assert!(!has_extension(Path::new("a.epub"), &["pdf"]));
        assert!(!has_extension(Path::new("README"), &["pdf"]));
    }

    #[test]
    fn test_scan_directory() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("b.pdf")).unwrap();
        File::create(dir.path().join("a.pdf")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let files = scan_directory(dir.path(), false, &["pdf"]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.pdf"));
        assert!(files[1].ends_with("b.pdf"));
    }

    #[test]
    fn test_scan_directory_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("subdir");
        fs::create_dir(&sub).unwrap();
        File::create(dir.path().join("root.pdf")).unwrap();
        File::create(sub.join("nested.pdf")).unwrap();

        assert_eq!(scan_directory(dir.path(), false, &["pdf"]).unwrap().len(), 1);
        assert_eq!(scan_directory(dir.path(), true, &["pdf"]).unwrap().len(), 2);
    }

    #[test]
    fn test_scan_missing_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = scan_directory(&dir.path().join("nope"), false, &["pdf"]).unwrap_err();
        assert!(matches!(err, ScriptoriumError::NotFound(_)));
    }
}
