//! In-memory recording.

use rowcast_common::error::RowcastResult;
use rowcast_data_model::archetype::{Archetype, ArchetypeKind};
use rowcast_data_model::entity_path::EntityPath;
use rowcast_data_model::time::TimePoint;

use crate::sink::{RecordedEntry, RecordingSink};

/// Keeps every entry in order.
#[derive(Debug, Default, Clone)]
pub struct MemoryRecording {
    entries: Vec<RecordedEntry>,
}

impl MemoryRecording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[RecordedEntry] {
        &self.entries
    }

    /// Entries logged under `path`.
    pub fn entries_at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a RecordedEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.path.to_string() == path)
    }

    /// Archetype kinds in logging order.
    pub fn kinds(&self) -> Vec<ArchetypeKind> {
        self.entries.iter().map(|e| e.archetype.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecordingSink for MemoryRecording {
    fn record(
        &mut self,
        path: &EntityPath,
        time: &TimePoint,
        archetype: &Archetype,
    ) -> RowcastResult<()> {
        self.entries.push(RecordedEntry {
            path: path.clone(),
            time: time.clone(),
            archetype: archetype.clone(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowcast_data_model::time::TimeValue;

    #[test]
    fn test_entries_keep_order_and_time() {
        let mut recording = MemoryRecording::new();
        let t0 = TimePoint::new().with("index", TimeValue::Sequence(0));
        let t1 = TimePoint::new().with("index", TimeValue::Sequence(1));

        recording
            .record(&EntityPath::from_column("reward"), &t0, &Archetype::scalar(0.0))
            .unwrap();
        recording
            .record(&EntityPath::from_column("reward"), &t1, &Archetype::scalar(1.0))
            .unwrap();
        recording
            .record(&EntityPath::from_column("note"), &t1, &Archetype::text("done"))
            .unwrap();

        assert_eq!(recording.len(), 3);
        let rewards: Vec<_> = recording.entries_at("reward").collect();
        assert_eq!(rewards.len(), 2);
        assert_eq!(rewards[1].time.get("index"), Some(TimeValue::Sequence(1)));
        assert_eq!(
            recording.kinds(),
            vec![
                ArchetypeKind::Scalar,
                ArchetypeKind::Scalar,
                ArchetypeKind::TextDocument
            ]
        );
    }
}
