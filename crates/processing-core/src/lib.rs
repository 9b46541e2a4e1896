//! Rowcast Processing Core
//!
//! Turns dataset rows into timeline-stamped visualization entries:
//! - **Classifier:** Decide which archetype a cell is rendered as
//! - **Session:** Explicit recording context holding the current time point
//! - **Row logger:** Apply time-like columns, then log every data column
//! - **Conversion:** Dataset episode -> recording sink in one call
//!
//! Time columns of a row are always applied before any of its data
//! columns are logged; the time point is passed with every entry.

pub mod classifier;
pub mod conversion;
pub mod row_logger;
pub mod session;

pub use classifier::{archetype_kind, classify, classify_value, Classification, ClassifyContext};
pub use conversion::log_dataset;
pub use row_logger::{ColumnRoles, ConversionProgress, LogSummary, ProgressCallback, RowLogger};
pub use session::Session;
