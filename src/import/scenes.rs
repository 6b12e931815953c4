use std::collections::HashSet;

use crate::model::{compact_if_continuous, Light, Scene};

use super::layout::TableLayout;
use super::rows::ExtractedRows;

/// Scene-name column spellings that mean "this column is the combined master
/// on/off control", not a scene of its own.
const MASTER_ON_OFF_MARKERS: &[&str] = &["MASTER ON/OFF", "MASTER ON-OFF", "MASTER ON OFF"];

/// Scenes produced for one section, kept in two groups so the composer can
/// guarantee open/close scenes land after everything else regardless of how
/// many sections contribute.
#[derive(Debug, Default)]
pub struct SectionScenes {
    /// Regular scenes in column order, then the synthesized master pair.
    pub regular: Vec<Scene>,
    /// OPEN/CLOSE pair scenes in numeral order.
    pub open_close: Vec<Scene>,
}

impl SectionScenes {
    /// Flatten into final output order (regular + master first, open/close last).
    pub fn into_ordered(self) -> Vec<Scene> {
        let mut scenes = self.regular;
        scenes.extend(self.open_close);
        scenes
    }
}

fn is_master_column(name: &str) -> bool {
    let upper = name.to_uppercase();
    MASTER_ON_OFF_MARKERS.iter().any(|m| upper.contains(m))
}

/// Build every scene for one section from the extracted rows: one scene per
/// discovered scene-name column, the synthesized MASTER ON / MASTER OFF pair
/// when a master column is present, and one OPEN/CLOSE scene pair per
/// actuator numeral.
pub fn synthesize(extracted: &ExtractedRows, layout: &TableLayout) -> SectionScenes {
    // Names that synthesized open/close scenes will claim; a column that
    // happens to carry such a name would collide, so it is dropped.
    let reserved: HashSet<String> = extracted
        .open_close
        .keys()
        .flat_map(|n| [format!("OPEN {n}"), format!("CLOSE {n}")])
        .collect();

    let has_master = layout.scene_names().any(is_master_column);
    let mut result = SectionScenes::default();

    for name in layout.scene_names() {
        if reserved.contains(name) || is_master_column(name) {
            continue;
        }
        let lights: Vec<Light> = extracted
            .by_group
            .iter()
            .map(|(&group, record)| Light {
                group,
                value: record.values.get(name).copied().unwrap_or(100),
                name: record.name.clone(),
            })
            .collect();
        let mut scene = Scene::explicit(name, lights);
        compact_if_continuous(&mut scene);
        result.regular.push(scene);
    }

    if has_master && !extracted.by_group.is_empty() {
        result.regular.push(master_scene("MASTER ON", extracted, 100));
        result.regular.push(master_scene("MASTER OFF", extracted, 0));
    }

    for (numeral, pair) in &extracted.open_close {
        // OPEN scene: open fixtures full on, close fixtures off; CLOSE inverts.
        let open = pair_scene(format!("OPEN {numeral}"), &pair.open, &pair.close);
        let close = pair_scene(format!("CLOSE {numeral}"), &pair.close, &pair.open);
        if let Some(scene) = open {
            result.open_close.push(scene);
        }
        if let Some(scene) = close {
            result.open_close.push(scene);
        }
    }

    result
}

fn master_scene(name: &str, extracted: &ExtractedRows, value: u8) -> Scene {
    let lights: Vec<Light> = extracted
        .by_group
        .iter()
        .map(|(&group, record)| Light {
            group,
            value,
            name: record.name.clone(),
        })
        .collect();
    let mut scene = Scene::explicit(name, lights);
    compact_if_continuous(&mut scene);
    scene
}

/// Build one half of an open/close pair: `active` fixtures at 100, `inactive`
/// at 0, sorted by group. These scenes are never compacted. Returns None when
/// the pair has no fixtures at all.
fn pair_scene(name: String, active: &[Light], inactive: &[Light]) -> Option<Scene> {
    let mut lights: Vec<Light> = active
        .iter()
        .map(|l| Light {
            group: l.group,
            value: 100,
            name: l.name.clone(),
        })
        .chain(inactive.iter().map(|l| Light {
            group: l.group,
            value: 0,
            name: l.name.clone(),
        }))
        .collect();
    if lights.is_empty() {
        return None;
    }
    lights.sort_by_key(|l| l.group);
    Some(Scene::explicit(name, lights))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::import::grid::RowGrid;
    use crate::import::layout::locate;
    use crate::import::rows::extract;

    fn synthesize_from(csv: &str) -> SectionScenes {
        let grid = RowGrid::from_csv(csv).unwrap();
        let layout = locate(&grid).unwrap();
        let extracted = extract(&grid, &layout);
        synthesize(&extracted, &layout)
    }

    #[test]
    fn one_scene_per_column_in_column_order() {
        let scenes = synthesize_from(
            ",,SCENE SETTING,\n\
             ,,DAY TIME,NIGHT TIME\n\
             ĐỊA CHỈ,TÊN LỘ,,\n\
             GROUP 1,Sảnh,on,off\n\
             GROUP 3,Vườn,60%,off\n",
        );
        let names: Vec<&str> = scenes.regular.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["DAY TIME", "NIGHT TIME"]);
        // Gap between groups 1 and 3 plus mixed values: stays explicit.
        assert!(!scenes.regular[0].is_sequential);
        assert_eq!(scenes.regular[0].lights[1].value, 60);
    }

    #[test]
    fn contiguous_uniform_scene_is_compacted() {
        let scenes = synthesize_from(
            ",,SCENE SETTING,\n\
             ,,DAY TIME,\n\
             ĐỊA CHỈ,TÊN LỘ,,\n\
             GROUP 1,A,on,\n\
             GROUP 2,B,on,\n\
             GROUP 3,C,on,\n",
        );
        let day = &scenes.regular[0];
        assert!(day.is_sequential);
        assert_eq!(day.start_group, Some(1));
        assert_eq!(day.amount, 3);
        assert_eq!(day.sequential_value(), 100);
    }

    #[test]
    fn master_column_synthesizes_on_and_off_scenes() {
        let scenes = synthesize_from(
            ",,SCENE SETTING,\n\
             ,,DAY TIME,MASTER ON/OFF\n\
             ĐỊA CHỈ,TÊN LỘ,,\n\
             GROUP 1,A,on,on\n\
             GROUP 2,B,on,on\n",
        );
        let names: Vec<&str> = scenes.regular.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["DAY TIME", "MASTER ON", "MASTER OFF"]);
        let off = &scenes.regular[2];
        assert!(off.is_sequential);
        assert_eq!(off.sequential_value(), 0);
        assert_eq!(off.amount, 2);
    }

    #[test]
    fn open_close_pairs_become_complementary_scenes() {
        let scenes = synthesize_from(
            ",,SCENE SETTING,\n\
             ,,DAY TIME,\n\
             ĐỊA CHỈ,TÊN LỘ,,\n\
             GROUP 1,A,on,\n\
             GROUP 8,OPEN 2,,\n\
             GROUP 9,CLOSE 2,,\n",
        );
        assert_eq!(scenes.open_close.len(), 2);
        let open = &scenes.open_close[0];
        assert_eq!(open.name, "OPEN 2");
        assert!(!open.is_sequential);
        assert_eq!(
            open.lights.iter().map(|l| (l.group, l.value)).collect::<Vec<_>>(),
            vec![(8, 100), (9, 0)]
        );
        let close = &scenes.open_close[1];
        assert_eq!(close.name, "CLOSE 2");
        assert_eq!(
            close.lights.iter().map(|l| (l.group, l.value)).collect::<Vec<_>>(),
            vec![(8, 0), (9, 100)]
        );
        // The actuator groups never leak into regular scenes.
        assert_eq!(scenes.regular[0].lights.len(), 1);
    }

    #[test]
    fn missing_scene_value_defaults_to_full_brightness() {
        let scenes = synthesize_from(
            ",,SCENE SETTING,\n\
             ,,DAY TIME,NIGHT TIME\n\
             ĐỊA CHỈ,TÊN LỘ,,\n\
             GROUP 1,A,40%\n",
        );
        // NIGHT TIME column has no cell on the fixture row: defaults to 100.
        assert_eq!(scenes.regular[1].lights[0].value, 100);
    }
}
