//! Per-conversion video frame cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_data_model::cell::ImageData;

use crate::decoder::{DecodedVideo, VideoDecoder};

/// Slack added before flooring so that `k / fps` maps back to frame `k`.
const FRAME_INDEX_TOLERANCE: f64 = 1e-6;

/// Decoded videos keyed by path.
///
/// Entries are never evicted; the cache lives exactly as long as the
/// conversion that owns it.
pub struct VideoCache<D: VideoDecoder> {
    decoder: D,
    videos: HashMap<PathBuf, DecodedVideo>,
    decodes: usize,
}

impl<D: VideoDecoder> VideoCache<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            videos: HashMap::new(),
            decodes: 0,
        }
    }

    /// Return the frame of `path` shown at `timestamp` seconds.
    ///
    /// The video is fully decoded on first access.
    pub fn resolve_frame(&mut self, path: &Path, timestamp: f64) -> RowcastResult<&ImageData> {
        if !self.videos.contains_key(path) {
            let video = self.decoder.decode(path)?;
            tracing::info!(
                path = %path.display(),
                frames = video.frames.len(),
                frame_rate = video.frame_rate,
                decoder = self.decoder.name(),
                "Decoded video"
            );
            self.videos.insert(path.to_path_buf(), video);
            self.decodes += 1;
        }

        let video = self
            .videos
            .get(path)
            .ok_or_else(|| RowcastError::video(format!("Video {} not cached", path.display())))?;

        let out_of_range = |index: i64| RowcastError::FrameOutOfRange {
            path: path.to_path_buf(),
            timestamp,
            index,
            frame_count: video.frames.len(),
        };

        let index = frame_index(timestamp, video.frame_rate).ok_or_else(|| out_of_range(-1))?;
        usize::try_from(index)
            .ok()
            .and_then(|i| video.frames.get(i))
            .ok_or_else(|| out_of_range(index))
    }

    /// Number of decodes performed (cache misses).
    pub fn decode_count(&self) -> usize {
        self.decodes
    }

    /// Number of cached videos.
    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.videos.contains_key(path)
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}

/// Frame index shown at `timestamp`: `floor(timestamp * frame_rate)`.
///
/// Returns `None` for non-finite inputs.
pub fn frame_index(timestamp: f64, frame_rate: f64) -> Option<i64> {
    let position = timestamp * frame_rate;
    if !position.is_finite() {
        return None;
    }
    Some((position + FRAME_INDEX_TOLERANCE).floor() as i64)
}
