//! Capacity-aware splitter and fixed-format code emitter.
//!
//! The downstream controller holds at most [`SCENE_CAPACITY`] output entries
//! per scene. Any larger scene is re-partitioned here, schedule references are
//! rewritten against the expansion, and the result is rendered as the literal
//! initialization statements the firmware tooling consumes.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::model::{ParsedDocument, Scene, Schedule};

/// Hard per-scene entry limit enforced by the controller hardware.
pub const SCENE_CAPACITY: usize = 60;

/// Report entry for a scene that had to be re-partitioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitNotice {
    pub scene: String,
    pub parts: usize,
}

/// Rendered firmware text plus the split report the operator is shown.
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    pub code: String,
    pub notices: Vec<SplitNotice>,
}

fn part_name(name: &str, part: usize) -> String {
    if part == 0 {
        name.to_string()
    } else {
        format!("{name} (phần {})", part + 1)
    }
}

/// Split one scene into capacity-sized parts. Scenes at or under the limit
/// come back as a single unchanged clone.
pub fn split_scene(scene: &Scene) -> Vec<Scene> {
    let size = scene.effective_size();
    if size <= SCENE_CAPACITY {
        return vec![scene.clone()];
    }

    if scene.is_sequential {
        let start = scene.start_group.unwrap_or(1);
        let value = scene.sequential_value();
        let parts = size.div_ceil(SCENE_CAPACITY);
        (0..parts)
            .map(|part| {
                let offset = part * SCENE_CAPACITY;
                let count = SCENE_CAPACITY.min(size - offset);
                Scene::sequential(
                    part_name(&scene.name, part),
                    start + offset as u32,
                    count,
                    value,
                )
            })
            .collect()
    } else {
        scene
            .lights
            .chunks(SCENE_CAPACITY)
            .enumerate()
            .map(|(part, chunk)| Scene::explicit(part_name(&scene.name, part), chunk.to_vec()))
            .collect()
    }
}

/// Expand every oversized scene and build the reference map:
/// original 1-based position -> ordered 1-based positions of its parts.
pub fn expand_scenes(scenes: &[Scene]) -> (Vec<Scene>, HashMap<usize, Vec<usize>>) {
    let mut expanded = Vec::with_capacity(scenes.len());
    let mut positions = HashMap::new();

    for (idx, scene) in scenes.iter().enumerate() {
        let parts = split_scene(scene);
        let first = expanded.len() + 1;
        positions.insert(idx + 1, (first..first + parts.len()).collect());
        expanded.extend(parts);
    }
    (expanded, positions)
}

/// Rewrite a schedule's scene references through the expansion map,
/// order-preserving and flattened. References that never pointed at a valid
/// scene are dropped rather than invented.
pub fn rewrite_schedule(schedule: &Schedule, positions: &HashMap<usize, Vec<usize>>) -> Schedule {
    let scene_group: Vec<usize> = schedule
        .scene_group
        .iter()
        .flat_map(|original| positions.get(original).cloned().unwrap_or_default())
        .collect();
    let mut rewritten = schedule.clone();
    rewritten.scene_amount = scene_group.len();
    rewritten.scene_group = scene_group;
    rewritten
}

// ── Rendering ───────────────────────────────────────────────────────
// The output format is fixed; the firmware tooling does a textual diff
// against previously flashed configs, so every byte matters.

fn render_scene(out: &mut String, idx: usize, scene: &Scene) {
    let _ = writeln!(out, "sceneObj[{idx}].amount = {};", scene.effective_size());
    if scene.is_sequential {
        let start = scene.start_group.unwrap_or(1);
        let value = scene.sequential_value();
        let _ = writeln!(out, "for(j=0; j<sceneObj[{idx}].amount; j++) {{");
        let _ = writeln!(out, "    sceneObj[{idx}].outputObj[j].type = OBJ_LIGHTING;");
        let _ = writeln!(out, "    sceneObj[{idx}].outputObj[j].group = j + {start};");
        let _ = writeln!(out, "    sceneObj[{idx}].outputObj[j].value = {value}*255/100;");
        let _ = writeln!(out, "}}");
    } else {
        for (j, light) in scene.lights.iter().enumerate() {
            let _ = writeln!(out, "sceneObj[{idx}].outputObj[{j}].type = OBJ_LIGHTING;");
            let _ = writeln!(out, "sceneObj[{idx}].outputObj[{j}].group = {};", light.group);
            let _ = writeln!(
                out,
                "sceneObj[{idx}].outputObj[{j}].value = {}*255/100;",
                light.value
            );
        }
    }
    out.push('\n');
}

fn render_schedule(out: &mut String, idx: usize, schedule: &Schedule) {
    let flag = |b: bool| usize::from(b);
    let _ = writeln!(out, "schedule[{idx}].enable = {};", flag(schedule.enable));
    let _ = writeln!(out, "schedule[{idx}].sceneAmount = {};", schedule.scene_amount);
    for (k, position) in schedule.scene_group.iter().enumerate() {
        let _ = writeln!(out, "schedule[{idx}].sceneGroup[{k}] = {position};");
    }
    let _ = writeln!(out, "schedule[{idx}].monday = {};", flag(schedule.monday));
    let _ = writeln!(out, "schedule[{idx}].tuesday = {};", flag(schedule.tuesday));
    let _ = writeln!(out, "schedule[{idx}].wednesday = {};", flag(schedule.wednesday));
    let _ = writeln!(out, "schedule[{idx}].thursday = {};", flag(schedule.thursday));
    let _ = writeln!(out, "schedule[{idx}].friday = {};", flag(schedule.friday));
    let _ = writeln!(out, "schedule[{idx}].saturday = {};", flag(schedule.saturday));
    let _ = writeln!(out, "schedule[{idx}].sunday = {};", flag(schedule.sunday));
    let _ = writeln!(out, "schedule[{idx}].hour = {};", schedule.hour);
    let _ = writeln!(out, "schedule[{idx}].minute = {};", schedule.minute);
    out.push('\n');
}

/// Split, rewrite, and render a finished document into controller
/// initialization statements.
pub fn render_document(doc: &ParsedDocument) -> GeneratedCode {
    let (scenes, positions) = expand_scenes(&doc.scenes);

    let notices: Vec<SplitNotice> = doc
        .scenes
        .iter()
        .enumerate()
        .filter_map(|(idx, scene)| {
            let parts = positions.get(&(idx + 1)).map_or(1, Vec::len);
            (parts > 1).then(|| SplitNotice {
                scene: scene.name.clone(),
                parts,
            })
        })
        .collect();

    let mut code = String::new();
    for (idx, scene) in scenes.iter().enumerate() {
        render_scene(&mut code, idx, scene);
    }
    for (idx, schedule) in doc.schedules.iter().enumerate() {
        render_schedule(&mut code, idx, &rewrite_schedule(schedule, &positions));
    }

    GeneratedCode { code, notices }
}
