//! CSV import pipeline: loader → structure locator → row extractor → scene
//! synthesizer → (section composer) → schedule synthesizer.
//!
//! One call to [`parse_csv`] is one atomic transform: it either returns a
//! complete [`ParsedDocument`] or a [`ParseError`], never a partial result.
//! All bookkeeping maps live on the stack of that one call.

pub mod grid;
pub mod layout;
pub mod rows;
pub mod scenes;
pub mod schedules;
pub mod sections;

pub use grid::{Row, RowGrid};

use crate::error::ParseError;
use crate::model::ParsedDocument;

// ── Structural keywords ─────────────────────────────────────────────
// The two recognized spreadsheet templates are keyword-delimited; matching is
// case-insensitive via uppercased row text. "SCENE OVERIDE" is the
// misspelling the real exports contain, kept alongside the correct form.

pub const SCENE_HEADER_KEYWORDS: &[&str] = &["SCENE SETTING", "SCENE OVERRIDE", "SCENE OVERIDE"];
pub const GROUP_COLUMN_KEYWORDS: &[&str] = &["GROUP", "ĐỊA CHỈ"];
pub const NAME_COLUMN_KEYWORDS: &[&str] = &["TÊN LỘ", "TEN LO"];
pub const SECTION_BOUNDARY_KEYWORDS: &[&str] = &["TỦ ĐIỆN", "TU DIEN"];

/// Token marking a fixture row's group cell ("GROUP 12").
pub const GROUP_TOKEN: &str = "GROUP";
/// Cabinet labels carry the DMX bus identifier ("DMX-LT-GYM").
pub const SECTION_NAME_TOKEN: &str = "DMX-";
/// Cabinet boundary rows without a bus identifier fall back to this label.
pub const DEFAULT_SECTION_NAME: &str = "Tủ không tên";

/// Structural markers must appear within the first rows of a (sub-)table.
pub const STRUCTURE_SCAN_ROWS: usize = 10;
/// Header + names + time + column row + at least one fixture row.
pub const MIN_INPUT_ROWS: usize = 5;

// ── Entry points ────────────────────────────────────────────────────

/// Parse CSV text into scenes and schedules.
///
/// With `separate_cabinets` set, the input is split at cabinet boundary rows
/// and each cabinet runs through the pipeline independently, its scene names
/// suffixed with the cabinet label; otherwise the whole input is one table.
pub fn parse_csv(content: &str, separate_cabinets: bool) -> Result<ParsedDocument, ParseError> {
    let grid = RowGrid::from_csv(content)?;
    if grid.len() < MIN_INPUT_ROWS {
        return Err(ParseError::EmptyOrTooShortInput);
    }
    if separate_cabinets {
        parse_multi_section(&grid)
    } else {
        parse_single_section(&grid)
    }
}

fn parse_single_section(grid: &RowGrid) -> Result<ParsedDocument, ParseError> {
    let layout = layout::locate(grid)?;
    let extracted = rows::extract(grid, &layout);
    let scenes = scenes::synthesize(&extracted, &layout).into_ordered();
    let times = schedules::times_by_base(&layout);
    let schedules = schedules::synthesize(&scenes, &times);
    Ok(ParsedDocument { scenes, schedules })
}

fn parse_multi_section(grid: &RowGrid) -> Result<ParsedDocument, ParseError> {
    let composed = sections::compose(grid)?;
    let schedules = schedules::synthesize(&composed.scenes, &composed.times);
    Ok(ParsedDocument {
        scenes: composed.scenes,
        schedules,
    })
}
