//! Visualization archetypes: the shapes a cell is rendered as.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::ImageData;

/// A loggable visualization value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Archetype {
    /// Color or grayscale image.
    Image(ImageData),

    /// Single-channel depth image.
    DepthImage(ImageData),

    /// Generic n-dimensional tensor.
    Tensor(TensorData),

    /// One-dimensional bar chart.
    BarChart { values: Vec<f64> },

    /// Single plotted value.
    Scalar { value: f64 },

    /// Text rendering of a value.
    TextDocument { text: String },
}

/// Dense tensor payload, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorData {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

/// Payload-free discriminant of an [`Archetype`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeKind {
    Image,
    DepthImage,
    Tensor,
    BarChart,
    Scalar,
    TextDocument,
}

impl Archetype {
    pub fn kind(&self) -> ArchetypeKind {
        match self {
            Self::Image(_) => ArchetypeKind::Image,
            Self::DepthImage(_) => ArchetypeKind::DepthImage,
            Self::Tensor(_) => ArchetypeKind::Tensor,
            Self::BarChart { .. } => ArchetypeKind::BarChart,
            Self::Scalar { .. } => ArchetypeKind::Scalar,
            Self::TextDocument { .. } => ArchetypeKind::TextDocument,
        }
    }

    pub fn scalar(value: f64) -> Self {
        Self::Scalar { value }
    }

    pub fn bar_chart(values: Vec<f64>) -> Self {
        Self::BarChart { values }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::TextDocument { text: text.into() }
    }
}

impl ArchetypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::DepthImage => "DepthImage",
            Self::Tensor => "Tensor",
            Self::BarChart => "BarChart",
            Self::Scalar => "Scalar",
            Self::TextDocument => "TextDocument",
        }
    }
}

impl fmt::Display for ArchetypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
