//! Column classifier: which archetype a cell is rendered as.
//!
//! Rules are evaluated in order and the first match wins; the categories
//! overlap (a rank-0 array is both an array and a scalar), so the order
//! is part of the contract:
//!
//! 1. Images: `DepthImage` when the column name contains `depth`, else `Image`.
//! 2. Numeric arrays by rank: 0 -> `Scalar`, 1 -> `BarChart`,
//!    2 -> `DepthImage`/`Image`, 3 with 3 or 4 channels -> `Image`,
//!    anything else -> `Tensor`.
//! 3. Lists: `BarChart` when non-empty and all floats, else text.
//! 4. Plain numbers -> `Scalar`.
//! 5. Video frame references -> the decoded frame as `Image`.
//! 6. Everything else -> `TextDocument` of the value's string form.

use std::path::Path;

use rowcast_common::error::RowcastResult;
use rowcast_data_model::archetype::{Archetype, ArchetypeKind, TensorData};
use rowcast_data_model::cell::{CellValue, ImageData, NumericArray, PixelBuffer, Scalar, VideoRef};
use rowcast_video::cache::VideoCache;
use rowcast_video::decoder::VideoDecoder;

/// Substring marking depth columns.
const DEPTH_MARKER: &str = "depth";

/// Outcome of the pure classification step.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification<'v> {
    /// Fully determined archetype.
    Archetype(Archetype),

    /// A video frame that still has to be decoded; renders as `Image`.
    VideoFrame(&'v VideoRef),
}

/// Everything frame resolution needs.
pub struct ClassifyContext<'a, D: VideoDecoder> {
    /// Directory video paths resolve against.
    pub videos_root: &'a Path,

    /// Decoded videos for the current conversion.
    pub video_cache: &'a mut VideoCache<D>,
}

/// Classify a cell, decoding video frames through the context's cache.
pub fn classify<D: VideoDecoder>(
    column: &str,
    value: &CellValue,
    ctx: &mut ClassifyContext<'_, D>,
) -> RowcastResult<Archetype> {
    match classify_value(column, value) {
        Classification::Archetype(archetype) => Ok(archetype),
        Classification::VideoFrame(video) => {
            let path = ctx.videos_root.join(&video.path);
            let frame = ctx.video_cache.resolve_frame(&path, video.timestamp)?;
            Ok(Archetype::Image(frame.clone()))
        }
    }
}

/// Pure classification: never touches the filesystem.
pub fn classify_value<'v>(column: &str, value: &'v CellValue) -> Classification<'v> {
    let archetype = match value {
        CellValue::Image(image) => image_archetype(column, image.clone()),
        CellValue::Array(array) => classify_array(column, array),
        CellValue::List(items) => classify_list(items, value),
        CellValue::Int(i) => Archetype::scalar(*i as f64),
        CellValue::Float(f) => Archetype::scalar(*f),
        CellValue::VideoRef(video) => return Classification::VideoFrame(video),
        CellValue::Other(_) => Archetype::text(value.to_string()),
    };
    Classification::Archetype(archetype)
}

/// Archetype kind a cell maps to, without decoding video.
pub fn archetype_kind(column: &str, value: &CellValue) -> ArchetypeKind {
    match classify_value(column, value) {
        Classification::Archetype(archetype) => archetype.kind(),
        Classification::VideoFrame(_) => ArchetypeKind::Image,
    }
}

fn is_depth_column(column: &str) -> bool {
    column.contains(DEPTH_MARKER)
}

fn image_archetype(column: &str, image: ImageData) -> Archetype {
    if is_depth_column(column) {
        Archetype::DepthImage(image)
    } else {
        Archetype::Image(image)
    }
}

fn classify_array(column: &str, array: &NumericArray) -> Archetype {
    let shape = array.shape();
    match shape.len() {
        0 => Archetype::scalar(array.as_scalar().map(Scalar::as_f64).unwrap_or_default()),
        1 => Archetype::bar_chart(array.to_vec()),
        2 => image_archetype(column, array_image(shape[0], shape[1], 1, array)),
        3 if matches!(shape[2], 3 | 4) => {
            Archetype::Image(array_image(shape[0], shape[1], shape[2], array))
        }
        _ => Archetype::Tensor(TensorData {
            shape: shape.to_vec(),
            data: array.to_vec(),
        }),
    }
}

/// `height x width (x channels)` array as a float image.
fn array_image(height: usize, width: usize, channels: usize, array: &NumericArray) -> ImageData {
    ImageData::new(
        width as u32,
        height as u32,
        channels as u8,
        PixelBuffer::F64(array.to_vec()),
    )
}

fn classify_list(items: &[CellValue], value: &CellValue) -> Archetype {
    let floats: Option<Vec<f64>> = items
        .iter()
        .map(|item| match item {
            CellValue::Float(f) => Some(*f),
            _ => None,
        })
        .collect();

    match floats {
        Some(values) if !values.is_empty() => Archetype::bar_chart(values),
        _ => Archetype::text(value.to_string()),
    }
}
