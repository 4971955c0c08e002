use crate::error::{CodegenError, Result};
use std::path::{Path, PathBuf};

/// Extension that marks a file as an error definition file
pub const DEFINITION_EXTENSION: &str = "json";

/// Find candidate definition files directly inside `dir`.
///
/// Only immediate entries are considered. Subdirectories and files with any
/// other extension are skipped without complaint. The result is sorted so
/// callers see the same order on every platform.
pub async fn find_definition_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| CodegenError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let file_type = entry.file_type().await.map_err(io_err)?;
        if file_type.is_dir() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(DEFINITION_EXTENSION) {
            continue;
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_skips_dirs_and_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        std::fs::write(dir.path().join("data.json.bak"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let files = find_definition_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[tokio::test]
    async fn test_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = find_definition_files(&missing).await.unwrap_err();
        match err {
            CodegenError::Io { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
