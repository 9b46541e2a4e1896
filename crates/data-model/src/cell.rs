//! Cell values: the finite set of shapes a dataset cell can take.
//!
//! Cells arrive as JSON. Plain numbers, lists and objects map directly;
//! images and tensors use a small tagged encoding:
//!
//! ```json
//! {"_type": "image", "path": "images/000001.png"}
//! {"_type": "tensor", "shape": [2, 3], "data": [0, 1, 2, 3, 4, 5]}
//! {"path": "videos/ep_000.mp4", "timestamp": 1.5}
//! ```
//!
//! The last form is a video frame reference and is recognized by the
//! presence of both keys.

use std::fmt;
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dataset::DatasetError;

/// Key used to tag structured cell encodings.
pub const TYPE_TAG: &str = "_type";

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Decoded image object.
    Image(ImageData),

    /// Numeric array of arbitrary rank.
    Array(NumericArray),

    /// Plain list of cells.
    List(Vec<CellValue>),

    /// Plain integer.
    Int(i64),

    /// Plain float.
    Float(f64),

    /// Reference to a frame inside a video file.
    VideoRef(VideoRef),

    /// Anything else (strings, booleans, null, unrecognized objects).
    Other(Value),
}

/// Element type of a numeric array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericDType {
    Int,
    Float,
}

/// Numeric array of arbitrary rank with its element type.
///
/// Values are stored as `f64`; `dtype` records whether the source elements
/// were integers so that rank-0 arrays unwrap to the right scalar kind.
/// Integers beyond 2^53 lose precision in `f64`, so a rank-0 integer array
/// also keeps its exact `i64` value.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    values: ArrayD<f64>,
    dtype: NumericDType,
    exact_int: Option<i64>,
}

/// A plain scalar extracted from a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

/// Reference to a frame of a video file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    /// Video path, relative to the dataset's videos root.
    pub path: PathBuf,

    /// Frame timestamp in seconds.
    pub timestamp: f64,
}

/// Decoded image pixels, row-major and channel-interleaved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: PixelBuffer,
}

/// Pixel storage for an [`ImageData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F64(Vec<f64>),
}

/// Context needed to decode cells that reference files.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    /// Directory relative paths are resolved against.
    pub root: &'a Path,
}

impl NumericArray {
    /// Build an array from a shape and row-major data.
    pub fn from_shape_vec(
        shape: Vec<usize>,
        data: Vec<f64>,
        dtype: NumericDType,
    ) -> Result<Self, ndarray::ShapeError> {
        let values = ArrayD::from_shape_vec(IxDyn(&shape), data)?;
        Ok(Self {
            values,
            dtype,
            exact_int: None,
        })
    }

    /// Rank-0 integer array holding `value` exactly.
    pub fn scalar_int(value: i64) -> Self {
        Self {
            values: ArrayD::from_elem(IxDyn(&[]), value as f64),
            dtype: NumericDType::Int,
            exact_int: Some(value),
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.values.ndim()
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn dtype(&self) -> NumericDType {
        self.dtype
    }

    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// Elements in logical (row-major) order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// Unwrap a rank-0 array into a plain scalar.
    pub fn as_scalar(&self) -> Option<Scalar> {
        if self.rank() != 0 {
            return None;
        }
        if let Some(exact) = self.exact_int {
            return Some(Scalar::Int(exact));
        }
        let value = *self.values.first()?;
        Some(match self.dtype {
            NumericDType::Int => Scalar::Int(value as i64),
            NumericDType::Float => Scalar::Float(value),
        })
    }
}

impl ImageData {
    pub fn new(width: u32, height: u32, channels: u8, pixels: PixelBuffer) -> Self {
        Self {
            width,
            height,
            channels,
            pixels,
        }
    }

    /// Convert a decoded image, keeping gray/RGBA layouts and mapping the rest to RGB8.
    pub fn from_dynamic(img: image::DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        match img {
            image::DynamicImage::ImageLuma8(buf) => {
                Self::new(width, height, 1, PixelBuffer::U8(buf.into_raw()))
            }
            image::DynamicImage::ImageLuma16(buf) => {
                Self::new(width, height, 1, PixelBuffer::U16(buf.into_raw()))
            }
            image::DynamicImage::ImageRgba8(buf) => {
                Self::new(width, height, 4, PixelBuffer::U8(buf.into_raw()))
            }
            other => Self::new(width, height, 3, PixelBuffer::U8(other.to_rgb8().into_raw())),
        }
    }

    /// Load and decode an image file.
    pub fn load(path: &Path) -> Result<Self, image::ImageError> {
        image::open(path).map(Self::from_dynamic)
    }

    /// Number of pixel elements (`width * height * channels`).
    pub fn element_count(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }
}

impl PixelBuffer {
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CellValue {
    /// Decode a JSON value into a cell.
    ///
    /// `column` is only used for error messages.
    pub fn from_json(column: &str, value: Value, ctx: CellContext<'_>) -> Result<Self, DatasetError> {
        match value {
            Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => Self::Int(i),
                None => match n.as_f64() {
                    Some(f) if !n.is_u64() => Self::Float(f),
                    // u64 beyond i64 range
                    _ => Self::Other(Value::Number(n)),
                },
            }),
            Value::Array(items) => items
                .into_iter()
                .map(|item| Self::from_json(column, item, ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Value::Object(map) => decode_object(column, map, ctx),
            other => Ok(Self::Other(other)),
        }
    }

    /// Plain scalar view: numbers and rank-0 arrays.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Int(i) => Some(Scalar::Int(*i)),
            Self::Float(f) => Some(Scalar::Float(*f)),
            Self::Array(array) => array.as_scalar(),
            _ => None,
        }
    }

    /// Integer view used for equality filters (integral floats included).
    pub fn as_i64(&self) -> Option<i64> {
        match self.as_scalar()? {
            Scalar::Int(i) => Some(i),
            Scalar::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
            Scalar::Float(_) => None,
        }
    }

    /// Short description of the cell's shape, for listings.
    pub fn type_name(&self) -> String {
        match self {
            Self::Image(img) => format!("image {}x{}x{}", img.width, img.height, img.channels),
            Self::Array(array) => format!("array{:?}", array.shape()),
            Self::List(items) => format!("list[{}]", items.len()),
            Self::Int(_) => "int".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::VideoRef(_) => "video frame".to_string(),
            Self::Other(Value::String(_)) => "string".to_string(),
            Self::Other(Value::Bool(_)) => "bool".to_string(),
            Self::Other(Value::Null) => "null".to_string(),
            Self::Other(_) => "object".to_string(),
        }
    }
}

impl Scalar {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

fn decode_object(
    column: &str,
    mut map: Map<String, Value>,
    ctx: CellContext<'_>,
) -> Result<CellValue, DatasetError> {
    match map.get(TYPE_TAG).and_then(Value::as_str) {
        Some("image") => {
            let rel = map
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| DatasetError::invalid_cell(column, "image cell without a path"))?;
            let path = ctx.root.join(rel);
            let image = ImageData::load(&path).map_err(|source| DatasetError::Image {
                path: path.clone(),
                source,
            })?;
            return Ok(CellValue::Image(image));
        }
        Some("tensor") => return decode_tensor(column, &map).map(CellValue::Array),
        _ => {}
    }

    let is_video_ref = matches!(map.get("path"), Some(Value::String(_)))
        && matches!(map.get("timestamp"), Some(Value::Number(_)));
    if is_video_ref {
        let timestamp = map
            .get("timestamp")
            .and_then(Value::as_f64)
            .unwrap_or_default();
        if let Some(Value::String(path)) = map.remove("path") {
            return Ok(CellValue::VideoRef(VideoRef {
                path: PathBuf::from(path),
                timestamp,
            }));
        }
    }

    Ok(CellValue::Other(Value::Object(map)))
}

fn decode_tensor(column: &str, map: &Map<String, Value>) -> Result<NumericArray, DatasetError> {
    let shape = map
        .get("shape")
        .and_then(Value::as_array)
        .ok_or_else(|| DatasetError::invalid_cell(column, "tensor cell without a shape"))?
        .iter()
        .map(|dim| {
            dim.as_u64()
                .map(|d| d as usize)
                .ok_or_else(|| DatasetError::invalid_cell(column, "tensor shape must be unsigned"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let raw = map
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| DatasetError::invalid_cell(column, "tensor cell without data"))?;

    let mut data = Vec::with_capacity(raw.len());
    let mut all_integers = true;
    for element in raw {
        let number = element
            .as_f64()
            .ok_or_else(|| DatasetError::invalid_cell(column, "tensor data must be numeric"))?;
        all_integers &= element.is_i64() || element.is_u64();
        data.push(number);
    }

    let dtype = match map.get("dtype").and_then(Value::as_str) {
        Some("int") => NumericDType::Int,
        Some("float") => NumericDType::Float,
        Some(other) => {
            return Err(DatasetError::invalid_cell(
                column,
                format!("unknown tensor dtype '{other}'"),
            ))
        }
        None if all_integers => NumericDType::Int,
        None => NumericDType::Float,
    };

    if let ([], NumericDType::Int, [element]) = (shape.as_slice(), dtype, raw.as_slice()) {
        if let Some(exact) = element.as_i64() {
            return Ok(NumericArray::scalar_int(exact));
        }
    }

    NumericArray::from_shape_vec(shape, data, dtype)
        .map_err(|e| DatasetError::invalid_cell(column, format!("tensor shape mismatch: {e}")))
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(img) => write!(
                f,
                "<image {}x{} channels={}>",
                img.width, img.height, img.channels
            ),
            Self::Array(array) => write!(f, "{}", array.values()),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        Self::Other(value @ Value::String(_)) => write!(f, "{value}")?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "]")
            }
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::VideoRef(video) => write!(
                f,
                "{{\"path\": {:?}, \"timestamp\": {:?}}}",
                video.path.display().to_string(),
                video.timestamp
            ),
            Self::Other(Value::String(s)) => write!(f, "{s}"),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> CellValue {
        let root = std::env::temp_dir();
        CellValue::from_json("col", value, CellContext { root: &root }).unwrap()
    }

    #[test]
    fn test_integer_and_float_numbers_stay_distinct() {
        assert_eq!(decode(json!(3)), CellValue::Int(3));
        assert_eq!(decode(json!(1.0)), CellValue::Float(1.0));
        assert_eq!(decode(json!(-2.5)), CellValue::Float(-2.5));
    }

    #[test]
    fn test_list_decodes_elementwise() {
        let cell = decode(json!([0.1, 2, "x"]));
        assert_eq!(
            cell,
            CellValue::List(vec![
                CellValue::Float(0.1),
                CellValue::Int(2),
                CellValue::Other(json!("x")),
            ])
        );
    }

    #[test]
    fn test_tensor_infers_dtype_and_shape() {
        let cell = decode(json!({"_type": "tensor", "shape": [2, 3], "data": [0, 1, 2, 3, 4, 5]}));
        let CellValue::Array(array) = cell else {
            panic!("expected array");
        };
        assert_eq!(array.rank(), 2);
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array.dtype(), NumericDType::Int);
        assert_eq!(array.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_rank_zero_tensor_unwraps_to_scalar() {
        let int_cell = decode(json!({"_type": "tensor", "shape": [], "data": [7]}));
        assert_eq!(int_cell.as_scalar(), Some(Scalar::Int(7)));

        let float_cell =
            decode(json!({"_type": "tensor", "shape": [], "data": [0.25], "dtype": "float"}));
        assert_eq!(float_cell.as_scalar(), Some(Scalar::Float(0.25)));
    }

    #[test]
    fn test_rank_zero_int_tensor_keeps_large_values_exact() {
        let big = (1i64 << 53) + 1;
        let cell = decode(json!({"_type": "tensor", "shape": [], "data": [big]}));
        assert_eq!(cell.as_scalar(), Some(Scalar::Int(big)));
        assert_eq!(cell.as_i64(), Some(big));
        assert_eq!(NumericArray::scalar_int(big).rank(), 0);
    }

    #[test]
    fn test_tensor_shape_mismatch_is_an_error() {
        let root = std::env::temp_dir();
        let err = CellValue::from_json(
            "state",
            json!({"_type": "tensor", "shape": [2, 2], "data": [1, 2, 3]}),
            CellContext { root: &root },
        )
        .unwrap_err();
        assert!(err.to_string().contains("state"));
    }

    #[test]
    fn test_video_reference_needs_both_keys() {
        assert_eq!(
            decode(json!({"path": "ep.mp4", "timestamp": 1.0})),
            CellValue::VideoRef(VideoRef {
                path: PathBuf::from("ep.mp4"),
                timestamp: 1.0,
            })
        );
        assert!(matches!(
            decode(json!({"path": "ep.mp4"})),
            CellValue::Other(Value::Object(_))
        ));
    }

    #[test]
    fn test_image_cell_loads_relative_to_root() {
        let dir = std::env::temp_dir().join("rowcast_test_image_cell");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("images")).unwrap();

        let img = image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
        img.save(dir.join("images").join("frame.png")).unwrap();

        let cell = CellValue::from_json(
            "observation.image",
            json!({"_type": "image", "path": "images/frame.png"}),
            CellContext { root: &dir },
        )
        .unwrap();

        let CellValue::Image(data) = cell else {
            panic!("expected image");
        };
        assert_eq!((data.width, data.height, data.channels), (4, 2, 3));
        assert_eq!(data.pixels.len(), data.element_count());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_image_file_is_an_error() {
        let root = std::env::temp_dir().join("rowcast_test_no_such_dir");
        let result = CellValue::from_json(
            "img",
            json!({"_type": "image", "path": "missing.png"}),
            CellContext { root: &root },
        );
        assert!(matches!(result, Err(DatasetError::Image { .. })));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(decode(json!([1, "a"])).to_string(), "[1, \"a\"]");
        assert_eq!(decode(json!("hello")).to_string(), "hello");
        assert_eq!(CellValue::Float(1.0).to_string(), "1.0");
        assert_eq!(CellValue::List(vec![]).to_string(), "[]");
    }

    #[test]
    fn test_as_i64_accepts_integral_floats() {
        assert_eq!(CellValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(CellValue::Float(3.5).as_i64(), None);
        assert_eq!(CellValue::Other(json!("3")).as_i64(), None);
    }
}
