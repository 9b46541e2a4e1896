//! Timeline coordinates.
//!
//! Every logged entry carries the full [`TimePoint`] that was current when
//! it was logged. Timelines are either sequence-indexed (integer steps) or
//! seconds-denominated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A coordinate on a single timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeValue {
    /// Sequence-indexed coordinate (frame numbers, row indices).
    Sequence(i64),

    /// Seconds-denominated coordinate.
    Seconds(f64),
}

/// Coordinates on every active timeline, keyed by timeline name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimePoint(BTreeMap<String, TimeValue>);

impl TimePoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) the coordinate on `timeline`.
    pub fn set(&mut self, timeline: impl Into<String>, value: TimeValue) {
        self.0.insert(timeline.into(), value);
    }

    pub fn with(mut self, timeline: impl Into<String>, value: TimeValue) -> Self {
        self.set(timeline, value);
        self
    }

    pub fn get(&self, timeline: &str) -> Option<TimeValue> {
        self.0.get(timeline).copied()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TimeValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_existing_timeline() {
        let mut tp = TimePoint::new();
        tp.set("frame_id", TimeValue::Sequence(1));
        tp.set("frame_id", TimeValue::Sequence(2));
        assert_eq!(tp.len(), 1);
        assert_eq!(tp.get("frame_id"), Some(TimeValue::Sequence(2)));
    }

    #[test]
    fn test_json_shape() {
        let tp = TimePoint::new()
            .with("index", TimeValue::Sequence(3))
            .with("timestamp", TimeValue::Seconds(0.5));
        let json = serde_json::to_string(&tp).unwrap();
        assert_eq!(json, r#"{"index":{"sequence":3},"timestamp":{"seconds":0.5}}"#);
    }
}
