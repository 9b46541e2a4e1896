//! Rowcast Recording
//!
//! Destinations for logged entries. A recording is an ordered stream of
//! `(entity path, time point, archetype)` entries:
//! - **RecordingWriter:** append-only JSONL recording file
//! - **MemoryRecording:** entries kept in memory
//! - **read_recording:** parse a recording file back

pub mod memory;
pub mod sink;
pub mod writer;

pub use memory::MemoryRecording;
pub use sink::{RecordedEntry, RecordingHeader, RecordingSink};
pub use writer::{read_recording, Recording, RecordingWriter};
