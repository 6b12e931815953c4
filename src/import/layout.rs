use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{Marker, ParseError};
use crate::model::TriggerTime;

use super::grid::RowGrid;
use super::{GROUP_COLUMN_KEYWORDS, NAME_COLUMN_KEYWORDS, SCENE_HEADER_KEYWORDS, STRUCTURE_SCAN_ROWS};

/// Where everything lives inside one (sub-)table, as discovered by keyword
/// scanning. Column order of `scene_columns` is insertion order, which is the
/// left-to-right order of the spreadsheet and therefore the scene output order.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub scene_columns: IndexMap<String, usize>,
    pub group_column: usize,
    pub name_column: Option<usize>,
    /// Trigger times read from the row beneath the scene-name row, keyed by
    /// scene name. Only present for columns whose time cell parsed cleanly.
    pub scene_times: HashMap<String, TriggerTime>,
}

impl TableLayout {
    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scene_columns.keys().map(String::as_str)
    }
}

/// Find the first row within the first `limit` rows whose joined text contains
/// any of `keywords` (all keywords are stored uppercase). Shared by the
/// single-section and multi-section paths so their matching rules cannot
/// diverge.
pub fn find_row_matching(grid: &RowGrid, keywords: &[&str], limit: usize) -> Option<usize> {
    let limit = limit.min(grid.len());
    grid.rows().iter().take(limit).position(|row| {
        let joined = row.joined_upper();
        keywords.iter().any(|kw| joined.contains(kw))
    })
}

/// Extract an `H:MM` / `HH:MM` time embedded anywhere in a cell. Out-of-range
/// values (hour > 23, minute > 59) yield None.
pub fn parse_trigger_time(cell: &str) -> Option<TriggerTime> {
    let bytes = cell.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b':' {
            continue;
        }
        // Up to two digits immediately before the colon.
        let start = bytes
            .get(..i)
            .map_or(i, |prefix| i - prefix.iter().rev().take(2).take_while(|c| c.is_ascii_digit()).count());
        // Exactly two digits after.
        let minute_digits = bytes.get(i + 1..i + 3).filter(|d| d.iter().all(u8::is_ascii_digit));
        let (Some(hour_str), Some(minute_digits)) = (cell.get(start..i), minute_digits) else {
            continue;
        };
        if hour_str.is_empty() {
            continue;
        }
        // A third digit in front ("123:45") means this is not a clock time.
        if bytes.get(start.wrapping_sub(1)).is_some_and(u8::is_ascii_digit) {
            continue;
        }
        let hour = hour_str.parse::<u8>().ok()?;
        let minute = std::str::from_utf8(minute_digits).ok()?.parse::<u8>().ok()?;
        if let Some(time) = TriggerTime::new(hour, minute) {
            return Some(time);
        }
    }
    None
}

/// Locate the scene header, scene-name row, trigger-time row, and the
/// group/name columns for one (sub-)table.
///
/// The scene-name row is defined as the row immediately following the header;
/// the time row is the row after that, read opportunistically (the template
/// variant without a dedicated time row simply yields no times there).
pub fn locate(grid: &RowGrid) -> Result<TableLayout, ParseError> {
    let header_row =
        find_row_matching(grid, SCENE_HEADER_KEYWORDS, STRUCTURE_SCAN_ROWS).ok_or(
            ParseError::StructureNotFound {
                marker: Marker::SceneHeader,
                section: None,
            },
        )?;
    let name_row = grid
        .row(header_row + 1)
        .ok_or(ParseError::NoNamedScenesFound { section: None })?;

    // Scene-name cells: non-blank, and not a time cell (the older template
    // puts times on this same row for some columns).
    let mut scene_columns = IndexMap::new();
    for (col, cell) in name_row.cells() {
        if !cell.contains(':') {
            scene_columns.insert(cell.to_string(), col);
        }
    }
    if scene_columns.is_empty() {
        return Err(ParseError::NoNamedScenesFound { section: None });
    }

    let mut scene_times = HashMap::new();
    if let Some(time_row) = grid.row(header_row + 2) {
        for (name, &col) in &scene_columns {
            if let Some(time) = time_row.cell(col).and_then(parse_trigger_time) {
                scene_times.insert(name.clone(), time);
            }
        }
    }

    let (group_column, name_column) = locate_columns(grid)?;

    Ok(TableLayout {
        scene_columns,
        group_column,
        name_column,
        scene_times,
    })
}

/// Scan the first rows for the group-address column marker and the
/// fixture-name column marker. The scan stops at the first row that yields a
/// group column; the name column is optional.
fn locate_columns(grid: &RowGrid) -> Result<(usize, Option<usize>), ParseError> {
    let limit = STRUCTURE_SCAN_ROWS.min(grid.len());
    let mut name_column = None;

    for row in grid.rows().iter().take(limit) {
        let mut group_column = None;
        for (col, cell) in row.cells() {
            let upper = cell.to_uppercase();
            if GROUP_COLUMN_KEYWORDS.iter().any(|kw| upper.contains(kw)) {
                group_column = Some(col);
            }
            if NAME_COLUMN_KEYWORDS.iter().any(|kw| upper.contains(kw)) {
                name_column = Some(col);
            }
        }
        if let Some(group_column) = group_column {
            return Ok((group_column, name_column));
        }
    }

    Err(ParseError::StructureNotFound {
        marker: Marker::GroupColumn,
        section: None,
    })
}
