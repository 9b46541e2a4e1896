//! Video decoders.

use std::path::Path;
use std::process::Command;

use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_data_model::cell::{ImageData, PixelBuffer};

/// A fully decoded video.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedVideo {
    /// Frames in presentation order.
    pub frames: Vec<ImageData>,

    /// Nominal stream frame rate (frames per second).
    pub frame_rate: f64,
}

/// Trait for video decode backends (ffmpeg, test doubles, ...).
pub trait VideoDecoder {
    /// Decode every frame of the video at `path`.
    fn decode(&mut self, path: &Path) -> RowcastResult<DecodedVideo>;

    /// Check if this decoder can run on the system.
    fn is_available(&self) -> bool;

    /// Decoder name.
    fn name(&self) -> &str;
}

impl<D: VideoDecoder + ?Sized> VideoDecoder for Box<D> {
    fn decode(&mut self, path: &Path) -> RowcastResult<DecodedVideo> {
        (**self).decode(path)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Stream properties reported by `ffprobe`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
}

/// Decoder that shells out to `ffprobe` and `ffmpeg`.
///
/// Frames are decoded to packed RGB24.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self::with_binaries("ffmpeg", "ffprobe")
    }

    /// Use explicit binary names or paths.
    pub fn with_binaries(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Whether the `ffmpeg` binary is on `PATH`.
    pub fn ffmpeg_available(&self) -> bool {
        command_exists(&self.ffmpeg)
    }

    /// Whether the `ffprobe` binary is on `PATH`.
    pub fn ffprobe_available(&self) -> bool {
        command_exists(&self.ffprobe)
    }

    /// Probe the first video stream.
    pub fn probe(&self, path: &Path) -> RowcastResult<VideoInfo> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,r_frame_rate",
                "-of",
                "default=noprint_wrappers=1",
            ])
            .arg(path)
            .output()
            .map_err(|e| RowcastError::video(format!("Failed to start ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(RowcastError::video(format!(
                "ffprobe failed on {} (status {}): {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        parse_probe_output(&raw).ok_or_else(|| {
            RowcastError::video(format!(
                "ffprobe returned no usable video stream for {}",
                path.display()
            ))
        })
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn decode(&mut self, path: &Path) -> RowcastResult<DecodedVideo> {
        if !path.exists() {
            return Err(RowcastError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let info = self.probe(path)?;
        tracing::debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            frame_rate = info.frame_rate,
            "Decoding video"
        );

        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .output()
            .map_err(|e| RowcastError::video(format!("Failed to start ffmpeg: {e}")))?;

        if !output.status.success() {
            return Err(RowcastError::video(format!(
                "ffmpeg decode failed on {} (status {}): {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let frames = split_rgb_frames(&output.stdout, info.width, info.height);
        if frames.is_empty() {
            return Err(RowcastError::video(format!(
                "ffmpeg produced no frames for {}",
                path.display()
            )));
        }

        Ok(DecodedVideo {
            frames,
            frame_rate: info.frame_rate,
        })
    }

    fn is_available(&self) -> bool {
        self.ffmpeg_available() && self.ffprobe_available()
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Parse `key=value` lines from `ffprobe -of default=noprint_wrappers=1`.
pub fn parse_probe_output(raw: &str) -> Option<VideoInfo> {
    let mut width = None;
    let mut height = None;
    let mut frame_rate = None;

    for line in raw.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        match key {
            "width" => width = value.parse::<u32>().ok(),
            "height" => height = value.parse::<u32>().ok(),
            "r_frame_rate" => frame_rate = parse_frame_rate(value),
            _ => {}
        }
    }

    let (width, height, frame_rate) = (width?, height?, frame_rate?);
    if width == 0 || height == 0 {
        return None;
    }
    Some(VideoInfo {
        width,
        height,
        frame_rate,
    })
}

/// Parse a rational (`30000/1001`) or decimal frame rate.
pub fn parse_frame_rate(value: &str) -> Option<f64> {
    let rate = match value.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => value.trim().parse::<f64>().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Split a packed RGB24 byte stream into frames.
///
/// A trailing partial frame is dropped.
pub fn split_rgb_frames(bytes: &[u8], width: u32, height: u32) -> Vec<ImageData> {
    let frame_len = width as usize * height as usize * 3;
    if frame_len == 0 {
        return Vec::new();
    }

    let chunks = bytes.chunks_exact(frame_len);
    if !chunks.remainder().is_empty() {
        tracing::warn!(
            trailing_bytes = chunks.remainder().len(),
            frame_len,
            "Dropping partial trailing video frame"
        );
    }

    chunks
        .map(|chunk| ImageData::new(width, height, 3, PixelBuffer::U8(chunk.to_vec())))
        .collect()
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let raw = "width=640\nheight=480\nr_frame_rate=30/1\n";
        let info = parse_probe_output(raw).unwrap();
        assert_eq!(info.width, 640);
        assert_eq!(info.height, 480);
        assert!((info.frame_rate - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_probe_output_rejects_missing_fields() {
        assert!(parse_probe_output("width=640\nr_frame_rate=30/1\n").is_none());
        assert!(parse_probe_output("width=0\nheight=480\nr_frame_rate=30/1\n").is_none());
    }

    #[test]
    fn test_parse_frame_rate_variants() {
        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.001);
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_split_rgb_frames_drops_partial_tail() {
        let bytes: Vec<u8> = (0..(2 * 2 * 3 * 2 + 5)).map(|i| i as u8).collect();
        let frames = split_rgb_frames(&bytes, 2, 2);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].pixels, PixelBuffer::U8((12..24).collect()));
    }

    #[test]
    fn test_missing_video_is_file_not_found() {
        let mut decoder = FfmpegDecoder::new();
        let missing = std::env::temp_dir().join("rowcast_no_such_video.mp4");
        let err = decoder.decode(&missing).unwrap_err();
        assert!(matches!(err, RowcastError::FileNotFound { .. }));
    }
}
