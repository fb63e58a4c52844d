//! Gated file writer.
//!
//! [`FileWriter`] is the only path from specialist output to the disk. For a
//! batch of [`ParsedFile`]s it produces one [`FileWriteOutcome`] per file:
//!
//! 1. the session state must allow writes, else every file is `blocked`
//!    (checked first; no path is even looked at)
//! 2. the path must pass the write policy, else `rejected`
//! 3. storage failures become `error` without aborting the batch
//!
//! Content is written with exactly one trailing newline added when missing.

use crate::ports::project_storage::ProjectStorage;
use conductor_domain::{
    FileWriteOutcome, ParsedFile, SessionState, is_reviewable, validate_write_path,
};
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct FileWriter {
    storage: Arc<dyn ProjectStorage>,
}

impl FileWriter {
    pub fn new(storage: Arc<dyn ProjectStorage>) -> Self {
        Self { storage }
    }

    /// Write `files` under `root`; last write wins for repeated paths.
    pub fn write(
        &self,
        root: &Path,
        files: &[ParsedFile],
        session: &SessionState,
    ) -> Vec<FileWriteOutcome> {
        if !session.can_write_disk() {
            warn!("Disk write blocked ({}): {} file(s)", session, files.len());
            let reason = format!("disk writes not allowed ({})", session);
            return files
                .iter()
                .map(|f| FileWriteOutcome::blocked(&f.path, &reason))
                .collect();
        }

        files
            .iter()
            .map(|file| match validate_write_path(&file.path) {
                Err(rejection) => {
                    warn!("Write rejected: {} ({})", file.path, rejection);
                    FileWriteOutcome::rejected(&file.path, rejection)
                }
                Ok(relative) => match self.storage.write(
                    root,
                    &relative,
                    &with_trailing_newline(&file.content),
                ) {
                    Ok(bytes) => {
                        info!("File written: {} ({} bytes)", relative.display(), bytes);
                        FileWriteOutcome::written(&file.path, bytes)
                    }
                    Err(e) => {
                        warn!("Write failed: {} ({})", file.path, e);
                        FileWriteOutcome::error(&file.path, e)
                    }
                },
            })
            .collect()
    }

    /// Read back written source files for review, `max_lines` lines each.
    ///
    /// Each path is read once, in first-written order. Unreadable files are
    /// skipped.
    pub fn read_for_review(
        &self,
        root: &Path,
        outcomes: &[FileWriteOutcome],
        max_lines: usize,
    ) -> Vec<(String, String)> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for outcome in outcomes.iter().filter(|o| o.is_written()) {
            if !is_reviewable(&outcome.path) || !seen.insert(outcome.path.as_str()) {
                continue;
            }
            let Ok(relative) = validate_write_path(&outcome.path) else {
                continue;
            };
            match self.storage.read_to_string(root, &relative) {
                Ok(content) => files.push((outcome.path.clone(), truncate_lines(&content, max_lines))),
                Err(e) => warn!("Could not read {} for review: {}", outcome.path, e),
            }
        }

        files
    }
}

fn with_trailing_newline(content: &str) -> Cow<'_, str> {
    if content.is_empty() || content.ends_with('\n') {
        Cow::Borrowed(content)
    } else {
        Cow::Owned(format!("{}\n", content))
    }
}

fn truncate_lines(content: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= max_lines {
        return content.to_string();
    }
    format!(
        "{}\n# ... truncated ({} lines total)",
        lines[..max_lines].join("\n"),
        lines.len()
    )
}
