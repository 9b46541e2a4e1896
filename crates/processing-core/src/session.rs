//! Recording session: current time point plus a sink.

use rowcast_common::error::RowcastResult;
use rowcast_data_model::archetype::Archetype;
use rowcast_data_model::entity_path::EntityPath;
use rowcast_data_model::time::{TimePoint, TimeValue};
use rowcast_recording::sink::RecordingSink;

/// A recording context.
///
/// Time is mutated only through the `set_time_*`/`reset_time` methods and
/// every [`Session::log`] call hands the current [`TimePoint`] to the sink
/// alongside the entry.
pub struct Session<S: RecordingSink> {
    sink: S,
    time: TimePoint,
    entries_logged: u64,
}

impl<S: RecordingSink> Session<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            time: TimePoint::new(),
            entries_logged: 0,
        }
    }

    /// Set a sequence-indexed coordinate.
    pub fn set_time_sequence(&mut self, timeline: &str, sequence: i64) {
        self.time.set(timeline, TimeValue::Sequence(sequence));
    }

    /// Set a seconds-denominated coordinate.
    pub fn set_time_seconds(&mut self, timeline: &str, seconds: f64) {
        self.time.set(timeline, TimeValue::Seconds(seconds));
    }

    /// Drop every timeline coordinate.
    pub fn reset_time(&mut self) {
        self.time.clear();
    }

    pub fn time(&self) -> &TimePoint {
        &self.time
    }

    /// Log `archetype` under `path` at the current time point.
    pub fn log(&mut self, path: &EntityPath, archetype: &Archetype) -> RowcastResult<()> {
        tracing::trace!(path = %path, kind = %archetype.kind(), "log");
        self.sink.record(path, &self.time, archetype)?;
        self.entries_logged += 1;
        Ok(())
    }

    pub fn entries_logged(&self) -> u64 {
        self.entries_logged
    }

    /// Flush the sink and hand it back.
    pub fn finish(mut self) -> RowcastResult<S> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}
