//! Append-only JSONL transcript of a conversation.
//!
//! One line per [`ConversationEvent`]: the event's own fields and `type`
//! tag, plus a `timestamp` (RFC 3339, milliseconds) and a `seq` counter
//! that restarts at 0 for each logger instance. A transcript spanning
//! several `conductor` runs therefore shows where each run began.

use conductor_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

#[derive(Serialize)]
struct Record<'a> {
    timestamp: String,
    seq: u64,
    #[serde(flatten)]
    event: &'a ConversationEvent,
}

struct Sink {
    writer: BufWriter<File>,
    seq: u64,
}

impl Sink {
    fn append(&mut self, event: &ConversationEvent) -> std::io::Result<()> {
        let record = Record {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            seq: self.seq,
            event,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.seq += 1;
        Ok(())
    }
}

/// File-backed [`ConversationLogger`].
pub struct JsonlConversationLogger {
    sink: Mutex<Sink>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open `path` for appending, creating it and its parent directories.
    ///
    /// Returns `None` (after a warning) when the file cannot be opened; the
    /// caller then runs without a transcript.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create conversation log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .inspect_err(|e| warn!("Could not open conversation log {}: {}", path.display(), e))
            .ok()?;

        Some(Self {
            sink: Mutex::new(Sink {
                writer: BufWriter::new(file),
                seq: 0,
            }),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        if let Err(e) = sink.append(&event) {
            warn!(
                "Dropped {} event for {}: {}",
                event.kind(),
                self.path.display(),
                e
            );
        }
    }
}
