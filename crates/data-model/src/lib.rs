//! Rowcast Data Model
//!
//! Defines the core data contracts shared by the conversion pipeline:
//! - **Cells and rows:** Dataset rows as ordered column -> value mappings
//! - **Archetypes:** Visualization shapes a cell is rendered as
//! - **Time points:** Timeline coordinates attached to every logged entry
//! - **Datasets:** Streaming JSONL row sources with episode selection
//!
//! Cell types are discovered per value at decode time; no schema is
//! declared up front.

pub mod archetype;
pub mod cell;
pub mod dataset;
pub mod entity_path;
pub mod row;
pub mod time;

pub use archetype::*;
pub use cell::*;
pub use dataset::*;
pub use entity_path::*;
pub use row::*;
pub use time::*;
