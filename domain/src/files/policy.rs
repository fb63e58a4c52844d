//! Write policy for agent-produced files.
//!
//! A target path is checked lexically: it must be relative, must stay under
//! the project root once `.` and `..` components are resolved, and must carry
//! an extension from [`WRITABLE_EXTENSIONS`] (or none at all).

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Extensions agents may write, lowercase and without the leading dot.
pub const WRITABLE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "json", "yaml", "yml", "toml", "ini", "cfg", "html", "css",
    "scss", "md", "txt", "sh", "bat", "ps1", "sql", "c", "cpp", "h", "hpp", "java", "go", "rs",
    "php", "rb", "swift", "kt", "vue", "svelte",
];

/// Dotfiles allowed by name.
pub const WRITABLE_DOTFILES: &[&str] = &[".gitignore", ".env.example"];

/// Extensions whose written contents are sent back for review.
pub const REVIEWABLE_EXTENSIONS: &[&str] = &["py", "js", "ts", "html", "css"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteRejection {
    #[error("empty path")]
    EmptyPath,

    #[error("absolute path not allowed: {0}")]
    AbsolutePath(String),

    #[error("path escapes the project root: {0}")]
    Traversal(String),

    #[error("extension not allowed for writing: .{extension} ({path})")]
    ExtensionNotAllowed { path: String, extension: String },
}

/// Validate a root-relative path and return it with `.`/`..` resolved.
pub fn validate_write_path(path: &str) -> Result<PathBuf, WriteRejection> {
    let relative = resolve_under_root(path)?;
    check_extension(path, &relative)?;
    Ok(relative)
}

fn resolve_under_root(path: &str) -> Result<PathBuf, WriteRejection> {
    let normalized = path.trim().replace('\\', "/");
    if normalized.is_empty() {
        return Err(WriteRejection::EmptyPath);
    }
    if normalized.starts_with('/') || has_drive_prefix(&normalized) {
        return Err(WriteRejection::AbsolutePath(path.to_string()));
    }

    let mut resolved = PathBuf::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(WriteRejection::Traversal(path.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(WriteRejection::AbsolutePath(path.to_string()));
            }
        }
    }

    if resolved.as_os_str().is_empty() {
        return Err(WriteRejection::EmptyPath);
    }
    Ok(resolved)
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn check_extension(original: &str, relative: &Path) -> Result<(), WriteRejection> {
    let file_name = relative
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if WRITABLE_DOTFILES.contains(&file_name) {
        return Ok(());
    }

    match relative.extension().and_then(|e| e.to_str()) {
        None => Ok(()),
        Some(ext) => {
            let ext = ext.to_lowercase();
            if WRITABLE_EXTENSIONS.contains(&ext.as_str()) {
                Ok(())
            } else {
                Err(WriteRejection::ExtensionNotAllowed {
                    path: original.to_string(),
                    extension: ext,
                })
            }
        }
    }
}

/// Whether a written file should be read back for review.
pub fn is_reviewable(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| REVIEWABLE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
