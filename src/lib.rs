//! Lumiscene converts human-authored lighting spreadsheets (CSV exports of
//! two known installation templates) into a normalized model of scenes and
//! schedules, and renders that model as the fixed-format initialization
//! statements the downstream lighting controller is flashed with.
//!
//! The whole pipeline is synchronous and batch: load the row grid, locate the
//! table structure by keyword, extract typed fixture records, synthesize
//! scenes and schedules, and (separately, on demand) split oversized scenes
//! against the hardware capacity and emit code.

pub mod codegen;
pub mod error;
pub mod import;
pub mod model;

pub use error::{Marker, ParseError};
pub use import::parse_csv;
pub use model::{Light, ParsedDocument, Scene, Schedule, TriggerTime};
