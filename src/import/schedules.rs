use std::collections::HashMap;

use indexmap::IndexMap;

use crate::model::{Scene, Schedule, TriggerTime};

use super::layout::TableLayout;

/// Fallback trigger times for scene families whose name advertises a time of
/// day but whose spreadsheet carried no explicit time row.
const KEYWORD_TIMES: &[(&str, u8, u8)] = &[("DAY", 6, 0), ("NIGHT", 18, 0), ("LATE", 1, 0)];

/// Strip the per-cabinet decoration from a scene name: a trailing
/// `" (cabinet)"` suffix, else a trailing `" N"` numeral (the older suffix
/// convention still present in saved documents).
pub fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end();
    if let Some(open) = trimmed.rfind(" (") {
        if trimmed.ends_with(')') {
            return trimmed.get(..open).unwrap_or(trimmed);
        }
    }
    if let Some(space) = trimmed.rfind(' ') {
        let tail = trimmed.get(space + 1..).unwrap_or("");
        if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
            return trimmed.get(..space).unwrap_or(trimmed);
        }
    }
    trimmed
}

/// Re-key a layout's located trigger times by base scene name, walking the
/// scene columns in order so a later column overrides an earlier one for the
/// same family. Columns whose names carry a suffix ("ZONE 2") keep their
/// explicit time-row entries under the family key the grouper looks up.
pub fn times_by_base(layout: &TableLayout) -> HashMap<String, TriggerTime> {
    let mut times = HashMap::new();
    for name in layout.scene_names() {
        if let Some(time) = layout.scene_times.get(name) {
            times.insert(base_name(name).to_string(), *time);
        }
    }
    times
}

fn keyword_time(base: &str) -> Option<TriggerTime> {
    let upper = base.to_uppercase();
    KEYWORD_TIMES
        .iter()
        .find(|(kw, _, _)| upper.contains(kw))
        .and_then(|&(_, hour, minute)| TriggerTime::new(hour, minute))
}

/// Group scenes by base name and emit one all-weekdays schedule per group
/// that has a resolvable trigger time: a located time-row entry first, the
/// name-keyword table second. Groups with neither produce no schedule.
///
/// `scene_group` holds the 1-based positions of every member scene, in final
/// scene-list order, so one schedule fires the same look in every cabinet.
pub fn synthesize(scenes: &[Scene], times: &HashMap<String, TriggerTime>) -> Vec<Schedule> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (idx, scene) in scenes.iter().enumerate() {
        groups
            .entry(base_name(&scene.name).to_string())
            .or_default()
            .push(idx + 1);
    }

    groups
        .into_iter()
        .filter_map(|(base, positions)| {
            let time = times.get(&base).copied().or_else(|| keyword_time(&base))?;
            Some(Schedule::daily(base, positions, time))
        })
        .collect()
}
