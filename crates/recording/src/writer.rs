//! Append-only JSONL recording files.
//!
//! Layout: the first line is `# ` followed by the JSON header, then one
//! JSON [`RecordedEntry`] per line.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_data_model::archetype::Archetype;
use rowcast_data_model::entity_path::EntityPath;
use rowcast_data_model::time::TimePoint;

use crate::sink::{RecordedEntry, RecordingHeader, RecordingSink};

/// Entries between automatic flushes.
const FLUSH_EVERY: u64 = 1000;

/// Writes entries to a JSONL recording file.
pub struct RecordingWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    entries_written: u64,
}

/// A recording read back from disk.
#[derive(Debug, Clone)]
pub struct Recording {
    pub header: Option<RecordingHeader>,
    pub entries: Vec<RecordedEntry>,
}

impl RecordingWriter {
    /// Create (or truncate) a recording file, writing the header as the first line.
    pub fn create(path: impl Into<PathBuf>, header: &RecordingHeader) -> RowcastResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);

        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| RowcastError::recording(format!("Failed to write header: {e}")))?;

        tracing::debug!(path = %path.display(), source = %header.source, "Created recording");

        Ok(Self {
            writer,
            path,
            entries_written: 0,
        })
    }

    /// Number of entries written.
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    /// Path to the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordingSink for RecordingWriter {
    fn record(
        &mut self,
        path: &EntityPath,
        time: &TimePoint,
        archetype: &Archetype,
    ) -> RowcastResult<()> {
        let entry = RecordedEntry {
            path: path.clone(),
            time: time.clone(),
            archetype: archetype.clone(),
        };
        let json = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| RowcastError::recording(format!("Failed to write entry: {e}")))?;
        self.entries_written += 1;

        if self.entries_written % FLUSH_EVERY == 0 {
            self.flush()?;
        }

        Ok(())
    }

    fn flush(&mut self) -> RowcastResult<()> {
        self.writer
            .flush()
            .map_err(|e| RowcastError::recording(format!("Failed to flush recording: {e}")))
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

impl Drop for RecordingWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Read a recording file: optional `# ` header line plus entries.
pub fn read_recording(path: &Path) -> RowcastResult<Recording> {
    if !path.exists() {
        return Err(RowcastError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;

    let mut header = None;
    let mut entries = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if line_no == 0 {
                header = Some(serde_json::from_str(comment.trim()).map_err(|e| {
                    RowcastError::recording(format!("Invalid recording header: {e}"))
                })?);
            }
            continue;
        }
        let entry = serde_json::from_str(line).map_err(|e| {
            RowcastError::recording(format!(
                "Invalid entry at {}:{}: {e}",
                path.display(),
                line_no + 1
            ))
        })?;
        entries.push(entry);
    }

    Ok(Recording { header, entries })
}
