//! Rowcast Video
//!
//! Resolves video frame references to still images:
//! - **Decoders:** Full eager decode of a video into RGB frames (ffmpeg)
//! - **Frame cache:** Decoded videos memoized per path for one conversion
//!
//! Decoding is intentionally not seek-based: a video is decoded once and
//! every later reference to it is served from memory.

pub mod cache;
pub mod decoder;

pub use cache::{frame_index, VideoCache};
pub use decoder::{DecodedVideo, FfmpegDecoder, VideoDecoder};
