use std::collections::HashMap;

use crate::error::{Marker, ParseError};
use crate::model::TriggerTime;

use super::grid::RowGrid;
use super::layout;
use super::rows;
use super::scenes::{self, SectionScenes};
use super::schedules;
use super::{DEFAULT_SECTION_NAME, SECTION_BOUNDARY_KEYWORDS, SECTION_NAME_TOKEN};

/// One delimited cabinet sub-table: its display name and row span
/// (boundary row included; the header is found again inside the span).
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Scenes and trigger times contributed by every section of a multi-cabinet
/// input, before schedule synthesis.
#[derive(Debug)]
pub struct ComposedSections {
    /// All sections' regular+master scenes first, then all sections'
    /// open/close scenes, per-section order preserved within each half.
    pub scenes: Vec<crate::model::Scene>,
    /// Trigger times keyed by base scene name (no cabinet suffix);
    /// the last section to provide a time for a base name wins.
    pub times: HashMap<String, TriggerTime>,
}

/// Find every cabinet boundary row in the input. Unlike the header scan this
/// covers the whole grid: later cabinets sit arbitrarily far down.
pub fn find_sections(grid: &RowGrid) -> Vec<Section> {
    let mut boundaries: Vec<(usize, String)> = Vec::new();
    for (idx, row) in grid.rows().iter().enumerate() {
        let joined = row.joined_upper();
        if !SECTION_BOUNDARY_KEYWORDS.iter().any(|kw| joined.contains(kw)) {
            continue;
        }
        // The cabinet label is the cell carrying the bus identifier.
        let name = row
            .cells()
            .find(|(_, cell)| cell.contains(SECTION_NAME_TOKEN))
            .map_or_else(|| DEFAULT_SECTION_NAME.to_string(), |(_, cell)| cell.to_string());
        boundaries.push((idx, name));
    }

    let ends: Vec<usize> = boundaries
        .iter()
        .skip(1)
        .map(|&(start, _)| start)
        .chain(std::iter::once(grid.len()))
        .collect();
    boundaries
        .into_iter()
        .zip(ends)
        .map(|((start, name), end)| Section { name, start, end })
        .collect()
}

/// Run the full locate/extract/synthesize pipeline once per section and merge
/// the results, suffixing every scene name with its cabinet label so same-name
/// scenes from different cabinets stay distinct.
pub fn compose(grid: &RowGrid) -> Result<ComposedSections, ParseError> {
    let sections = find_sections(grid);
    if sections.is_empty() {
        return Err(ParseError::StructureNotFound {
            marker: Marker::SectionBoundary,
            section: None,
        });
    }

    let mut regular = Vec::new();
    let mut open_close = Vec::new();
    let mut times: HashMap<String, TriggerTime> = HashMap::new();

    for section in &sections {
        let sub = grid.slice(section.start, section.end);
        let layout = layout::locate(&sub).map_err(|e| e.in_section(&section.name))?;
        let extracted = rows::extract(&sub, &layout);
        let mut built: SectionScenes = scenes::synthesize(&extracted, &layout);

        for scene in built.regular.iter_mut().chain(built.open_close.iter_mut()) {
            scene.name = format!("{} ({})", scene.name, section.name);
        }
        times.extend(schedules::times_by_base(&layout));

        regular.extend(built.regular);
        open_close.extend(built.open_close);
    }

    // Open/close scenes from every cabinet stay grouped at the end.
    regular.extend(open_close);
    Ok(ComposedSections {
        scenes: regular,
        times,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;

    const TWO_CABINETS: &str = "\
TỦ ĐIỆN,DMX-LT-A,\n\
,,SCENE SETTING,\n\
,,DAY TIME,NIGHT TIME\n\
,,6:00,18:00\n\
ĐỊA CHỈ,TÊN LỘ,,\n\
GROUP 1,Sảnh,on,off\n\
GROUP 2,Vườn,on,off\n\
GROUP 9,OPEN 1,,\n\
GROUP 10,CLOSE 1,,\n\
TỦ ĐIỆN,DMX-LT-B,\n\
,,SCENE SETTING,\n\
,,DAY TIME,NIGHT TIME\n\
,,6:00,18:00\n\
ĐỊA CHỈ,TÊN LỘ,,\n\
GROUP 4,Kho,on,off\n";

    fn grid(csv: &str) -> RowGrid {
        RowGrid::from_csv(csv).unwrap()
    }

    #[test]
    fn finds_boundaries_and_names() {
        let sections = find_sections(&grid(TWO_CABINETS));
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "DMX-LT-A");
        assert_eq!(sections[1].name, "DMX-LT-B");
        assert_eq!(sections[0].end, sections[1].start);
        assert_eq!(sections[1].end, 15);
    }

    #[test]
    fn boundary_without_bus_label_gets_default_name() {
        let sections = find_sections(&grid("TU DIEN,,\nx,y\n"));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, DEFAULT_SECTION_NAME);
    }

    #[test]
    fn scene_names_carry_the_cabinet_suffix() {
        let composed = compose(&grid(TWO_CABINETS)).unwrap();
        let names: Vec<&str> = composed.scenes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "DAY TIME (DMX-LT-A)",
                "NIGHT TIME (DMX-LT-A)",
                "DAY TIME (DMX-LT-B)",
                "NIGHT TIME (DMX-LT-B)",
                "OPEN 1 (DMX-LT-A)",
                "CLOSE 1 (DMX-LT-A)",
            ]
        );
    }

    #[test]
    fn times_are_keyed_by_base_name() {
        let composed = compose(&grid(TWO_CABINETS)).unwrap();
        assert_eq!(composed.times["DAY TIME"], TriggerTime::new(6, 0).unwrap());
        assert_eq!(composed.times["NIGHT TIME"], TriggerTime::new(18, 0).unwrap());
    }

    #[test]
    fn later_cabinet_time_overrides_earlier_for_same_base() {
        let csv = "\
TỦ ĐIỆN,DMX-LT-A,\n\
,,SCENE SETTING,\n\
,,DAY TIME,\n\
,,6:00,\n\
ĐỊA CHỈ,TÊN LỘ,,\n\
GROUP 1,Sảnh,on,\n\
TỦ ĐIỆN,DMX-LT-B,\n\
,,SCENE SETTING,\n\
,,DAY TIME,\n\
,,6:30,\n\
ĐỊA CHỈ,TÊN LỘ,,\n\
GROUP 4,Kho,on,\n";
        let composed = compose(&grid(csv)).unwrap();
        assert_eq!(composed.times["DAY TIME"], TriggerTime::new(6, 30).unwrap());
    }

    #[test]
    fn no_boundaries_is_structure_not_found() {
        let err = compose(&grid("a,b\nc,d\ne,f\ng,h\ni,j\n")).unwrap_err();
        assert!(matches!(
            err,
            ParseError::StructureNotFound {
                marker: Marker::SectionBoundary,
                ..
            }
        ));
    }

    #[test]
    fn section_errors_name_the_cabinet() {
        // Second cabinet has no scene header at all.
        let csv = "\
TỦ ĐIỆN,DMX-LT-A,\n\
,,SCENE SETTING,\n\
,,DAY TIME,\n\
,,6:00,\n\
ĐỊA CHỈ,TÊN LỘ,,\n\
GROUP 1,Sảnh,on,\n\
TỦ ĐIỆN,DMX-LT-B,\n\
x,y,z\n";
        let err = compose(&grid(csv)).unwrap_err();
        match err {
            ParseError::StructureNotFound { section, .. } => {
                assert_eq!(section.as_deref(), Some("DMX-LT-B"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
