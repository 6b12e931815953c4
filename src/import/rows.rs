use std::collections::{BTreeMap, HashMap};

use crate::model::{Light, DEFAULT_LIGHT_NAME};

use super::grid::{Row, RowGrid};
use super::layout::TableLayout;
use super::GROUP_TOKEN;

/// Everything one fixture row contributes once deduplicated: the display name
/// for its address and the brightness this address takes in each scene.
#[derive(Debug, Clone)]
pub struct LightRecord {
    pub name: String,
    /// Scene name -> brightness. Missing scenes default to 100 at synthesis.
    pub values: HashMap<String, u8>,
}

/// The open and close halves of one bistable actuator, keyed by the numeral
/// in the fixture names ("OPEN 2" / "CLOSE 2" pair under 2).
#[derive(Debug, Clone, Default)]
pub struct OpenClosePair {
    pub open: Vec<Light>,
    pub close: Vec<Light>,
}

/// Typed output of the row-extraction passes. BTreeMaps keep group/numeral
/// order deterministic for everything built on top.
#[derive(Debug, Default)]
pub struct ExtractedRows {
    pub by_group: BTreeMap<u32, LightRecord>,
    pub open_close: BTreeMap<u32, OpenClosePair>,
}

/// Extract the group address from a group-column cell. The cell must contain
/// the `GROUP` marker token (case-insensitive); the address is the integer
/// following it, with optional whitespace between. Anything else is not a
/// fixture row.
pub fn group_address(cell: &str) -> Option<u32> {
    let upper = cell.to_ascii_uppercase();
    let pos = upper.find(GROUP_TOKEN)?;
    let after = upper.get(pos + GROUP_TOKEN.len()..)?.trim_start();
    let digits: String = after.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Convert a raw brightness token into a 0-100 value. Pure and total: messy
/// human input defaults to full brightness rather than failing the import.
pub fn convert_brightness(token: Option<&str>) -> u8 {
    let Some(token) = token else {
        return 100;
    };
    let lower = token.trim().to_lowercase();
    match lower.as_str() {
        "" | "on" | "on/off" | "on-off" => return 100,
        "off" => return 0,
        _ => {}
    }
    let stripped = lower.replace('%', "");
    match stripped.trim().parse::<i64>() {
        Ok(v) if (0..=100).contains(&v) => v as u8,
        _ => 100,
    }
}

/// Classify a fixture name as the open or close half of an actuator pair.
/// Returns (is_open, pair numeral) when the name starts with OPEN or CLOSE
/// and ends in a numeral; anything else is an ordinary fixture.
pub fn classify_open_close(name: &str) -> Option<(bool, u32)> {
    let upper = name.to_uppercase();
    let is_open = upper.starts_with("OPEN");
    let is_close = upper.starts_with("CLOSE");
    if !is_open && !is_close {
        return None;
    }
    let digits: String = name
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok().map(|n| (is_open, n))
}

fn light_name(row: &Row, layout: &TableLayout) -> String {
    layout
        .name_column
        .and_then(|col| row.cell(col))
        .unwrap_or(DEFAULT_LIGHT_NAME)
        .to_string()
}

fn fixture_address(row: &Row, layout: &TableLayout) -> Option<u32> {
    row.cell(layout.group_column).and_then(group_address)
}

/// Pass 1: count how often each address appears among ordinary fixture rows.
/// Open/close rows never participate; an address seen more than once gets the
/// synthetic `Group {address}` display name in pass 2.
fn count_addresses(grid: &RowGrid, layout: &TableLayout) -> HashMap<u32, usize> {
    let mut counts = HashMap::new();
    for row in grid.rows() {
        let Some(address) = fixture_address(row, layout) else {
            continue;
        };
        if classify_open_close(&light_name(row, layout)).is_some() {
            continue;
        }
        *counts.entry(address).or_insert(0) += 1;
    }
    counts
}

/// Pass 2 over the same rows: build the deduplicated records.
///
/// Duplicate-address tie-break: a row carrying any non-default (!= 100)
/// brightness replaces an all-default stored record; between two equally
/// informative rows the last one seen wins. Inferred from observed template
/// behavior, not a documented rule.
pub fn extract(grid: &RowGrid, layout: &TableLayout) -> ExtractedRows {
    let counts = count_addresses(grid, layout);
    let mut extracted = ExtractedRows::default();

    for row in grid.rows() {
        let Some(address) = fixture_address(row, layout) else {
            continue;
        };
        let name = light_name(row, layout);

        if let Some((is_open, numeral)) = classify_open_close(&name) {
            let pair = extracted.open_close.entry(numeral).or_default();
            let light = Light {
                group: address,
                value: 100, // placeholder, set per synthesized scene
                name,
            };
            if is_open {
                pair.open.push(light);
            } else {
                pair.close.push(light);
            }
            continue;
        }

        let values: HashMap<String, u8> = layout
            .scene_columns
            .iter()
            .map(|(scene, &col)| (scene.clone(), convert_brightness(row.cell(col))))
            .collect();

        let display_name = if counts.get(&address).copied().unwrap_or(0) > 1 {
            format!("Group {address}")
        } else {
            name
        };
        let record = LightRecord {
            name: display_name,
            values,
        };

        let incoming_informative = record.values.values().any(|&v| v != 100);
        match extracted.by_group.entry(address) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
            }
            std::collections::btree_map::Entry::Occupied(mut slot) => {
                let stored_informative = slot.get().values.values().any(|&v| v != 100);
                if incoming_informative || !stored_informative {
                    slot.insert(record);
                }
            }
        }
    }

    extracted
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::import::layout::locate;
    use crate::import::RowGrid;

    #[test]
    fn group_address_requires_the_marker_token() {
        assert_eq!(group_address("GROUP 12"), Some(12));
        assert_eq!(group_address("group5"), Some(5));
        assert_eq!(group_address("Group   7 (hall)"), Some(7));
        assert_eq!(group_address("12"), None);
        assert_eq!(group_address("GROUP"), None);
        assert_eq!(group_address("GROUP x"), None);
    }

    #[test]
    fn brightness_conversion_is_total() {
        assert_eq!(convert_brightness(Some("on")), 100);
        assert_eq!(convert_brightness(Some("ON/OFF")), 100);
        assert_eq!(convert_brightness(Some("on-off")), 100);
        assert_eq!(convert_brightness(Some("off")), 0);
        assert_eq!(convert_brightness(Some("")), 100);
        assert_eq!(convert_brightness(None), 100);
        assert_eq!(convert_brightness(Some("75%")), 75);
        assert_eq!(convert_brightness(Some("40")), 40);
        assert_eq!(convert_brightness(Some("0")), 0);
        assert_eq!(convert_brightness(Some("150")), 100);
        assert_eq!(convert_brightness(Some("-5")), 100);
        assert_eq!(convert_brightness(Some("abc")), 100);
    }

    #[test]
    fn open_close_classification_needs_prefix_and_numeral() {
        assert_eq!(classify_open_close("OPEN 2"), Some((true, 2)));
        assert_eq!(classify_open_close("close 10"), Some((false, 10)));
        assert_eq!(classify_open_close("OPENING"), None);
        assert_eq!(classify_open_close("OPEN"), None);
        assert_eq!(classify_open_close("Sảnh 3"), None);
    }

    fn extract_from(csv: &str) -> ExtractedRows {
        let grid = RowGrid::from_csv(csv).unwrap();
        let layout = locate(&grid).unwrap();
        extract(&grid, &layout)
    }

    #[test]
    fn builds_records_per_address() {
        let extracted = extract_from(
            ",,SCENE SETTING,\n\
             ,,DAY TIME,NIGHT TIME\n\
             ĐỊA CHỈ,TÊN LỘ,,\n\
             GROUP 1,Sảnh,on,off\n\
             GROUP 2,Vườn,50%,off\n",
        );
        assert_eq!(extracted.by_group.len(), 2);
        let garden = &extracted.by_group[&2];
        assert_eq!(garden.name, "Vườn");
        assert_eq!(garden.values["DAY TIME"], 50);
        assert_eq!(garden.values["NIGHT TIME"], 0);
    }

    #[test]
    fn duplicate_addresses_get_synthetic_name_and_informative_values() {
        let extracted = extract_from(
            ",,SCENE SETTING,\n\
             ,,DAY TIME,\n\
             ĐỊA CHỈ,TÊN LỘ,,\n\
             GROUP 5,Hành lang,40%,\n\
             GROUP 5,Kho,,\n",
        );
        let record = &extracted.by_group[&5];
        assert_eq!(record.name, "Group 5");
        // The 40% row is more informative than the all-default row that follows.
        assert_eq!(record.values["DAY TIME"], 40);
    }

    #[test]
    fn equally_informative_duplicates_resolve_to_last_seen() {
        let extracted = extract_from(
            ",,SCENE SETTING,\n\
             ,,DAY TIME,\n\
             ĐỊA CHỈ,TÊN LỘ,,\n\
             GROUP 5,A,30%,\n\
             GROUP 5,B,60%,\n",
        );
        assert_eq!(extracted.by_group[&5].values["DAY TIME"], 60);
    }

    #[test]
    fn open_close_rows_are_bucketed_not_counted() {
        let extracted = extract_from(
            ",,SCENE SETTING,\n\
             ,,DAY TIME,\n\
             ĐỊA CHỈ,TÊN LỘ,,\n\
             GROUP 1,OPEN 1,,\n\
             GROUP 2,CLOSE 1,,\n\
             GROUP 3,Sảnh,on,\n",
        );
        assert_eq!(extracted.by_group.len(), 1);
        assert!(extracted.by_group.contains_key(&3));
        let pair = &extracted.open_close[&1];
        assert_eq!(pair.open.len(), 1);
        assert_eq!(pair.close.len(), 1);
        assert_eq!(pair.open[0].group, 1);
    }

    #[test]
    fn blank_name_falls_back_to_placeholder() {
        let extracted = extract_from(
            ",,SCENE SETTING,\n\
             ,,DAY TIME,\n\
             ĐỊA CHỈ,TÊN LỘ,,\n\
             GROUP 4,,on,\n",
        );
        assert_eq!(extracted.by_group[&4].name, DEFAULT_LIGHT_NAME);
    }
}
