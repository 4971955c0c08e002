//! Write primitives for generated artifacts.
//!
//! Each artifact is written whole with a single call. Nothing here spans
//! more than one file, so a failed run can leave some artifacts from the
//! new generation next to some from the old one.

use crate::error::{CodegenError, Result};
use std::path::{Path, PathBuf};

/// Write `content` to `path`, replacing any existing file
pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(CodegenError::EmptyPath);
    }

    std::fs::write(path, content).map_err(|source| CodegenError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

fn create_dir_all(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| CodegenError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write the generated source file, creating its parent directory
pub fn write_code_file(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(CodegenError::EmptyPath);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }

    write_to_file(path, content)?;
    tracing::info!(path = %path.display(), "wrote generated code");
    Ok(())
}

/// `<out_dir>/<domain>/<domain>.md`, with the domain lower-cased
pub fn markdown_path(out_dir: &Path, domain: &str) -> PathBuf {
    let domain = domain.to_lowercase();
    out_dir.join(&domain).join(format!("{domain}.md"))
}

/// Write one domain's Markdown page into its own subdirectory of `out_dir`
pub fn write_markdown_file(out_dir: &Path, domain: &str, content: &str) -> Result<PathBuf> {
    if out_dir.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(CodegenError::EmptyPath);
    }

    let path = markdown_path(out_dir, domain);
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    write_to_file(&path, content)?;
    tracing::info!(path = %path.display(), domain, "wrote markdown");
    Ok(path)
}
