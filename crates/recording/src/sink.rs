//! Recording sink contract and the entry format shared by all sinks.

use serde::{Deserialize, Serialize};

use rowcast_common::error::RowcastResult;
use rowcast_data_model::archetype::Archetype;
use rowcast_data_model::entity_path::EntityPath;
use rowcast_data_model::time::TimePoint;

/// Current recording file schema version.
pub const RECORDING_SCHEMA_VERSION: &str = "1.0";

/// Destination for logged entries.
pub trait RecordingSink {
    /// Store one archetype under `path` at time point `time`.
    fn record(
        &mut self,
        path: &EntityPath,
        time: &TimePoint,
        archetype: &Archetype,
    ) -> RowcastResult<()>;

    /// Flush buffered entries.
    fn flush(&mut self) -> RowcastResult<()> {
        Ok(())
    }

    /// Sink name.
    fn name(&self) -> &str;
}

impl<S: RecordingSink + ?Sized> RecordingSink for Box<S> {
    fn record(
        &mut self,
        path: &EntityPath,
        time: &TimePoint,
        archetype: &Archetype,
    ) -> RowcastResult<()> {
        (**self).record(path, time, archetype)
    }

    fn flush(&mut self) -> RowcastResult<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// One logged entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEntry {
    pub path: EntityPath,
    pub time: TimePoint,
    pub archetype: Archetype,
}

/// Recording metadata, written as the first line of a recording file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Application id the recording was produced under.
    pub application_id: String,

    /// Free-form description of the source (dataset and episode).
    #[serde(default)]
    pub source: String,

    /// Wall-clock creation time (RFC 3339).
    pub created_at: String,
}

impl RecordingHeader {
    pub fn new(application_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            schema_version: RECORDING_SCHEMA_VERSION.to_string(),
            application_id: application_id.into(),
            source: source.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
