use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Placeholder display name used when a fixture row carries no name, and for
/// the single stand-in light inside a compacted sequential scene. Matches the
/// label the installation spreadsheets' operators already know.
pub const DEFAULT_LIGHT_NAME: &str = "Đèn chưa đặt tên";

/// One addressable fixture (or fixture bank) with its brightness for a scene.
/// Identity for deduplication is the group address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Light {
    /// Bus address of the fixture. Always >= 1.
    pub group: u32,
    /// Brightness percentage, 0-100.
    pub value: u8,
    pub name: String,
}

/// A named set of fixture/brightness pairs applied atomically.
///
/// Two representations share this struct:
/// - explicit: `lights.len() == amount`, groups sorted ascending, possibly sparse;
/// - sequential (compacted): `is_sequential` is set, `lights` holds exactly one
///   light whose value applies uniformly to the contiguous range
///   `[start_group, start_group + amount - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Scene {
    pub name: String,
    /// Number of fixtures the scene addresses (also valid in sequential form).
    pub amount: usize,
    pub lights: Vec<Light>,
    pub is_sequential: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_group: Option<u32>,
}

impl Scene {
    /// Build an explicit (non-sequential) scene from an already-sorted light list.
    pub fn explicit(name: impl Into<String>, lights: Vec<Light>) -> Self {
        Self {
            name: name.into(),
            amount: lights.len(),
            lights,
            is_sequential: false,
            start_group: None,
        }
    }

    /// Build a compacted sequential scene covering `amount` fixtures starting
    /// at `start_group`, all at `value`.
    pub fn sequential(name: impl Into<String>, start_group: u32, amount: usize, value: u8) -> Self {
        Self {
            name: name.into(),
            amount,
            lights: vec![Light {
                group: start_group,
                value,
                name: DEFAULT_LIGHT_NAME.to_string(),
            }],
            is_sequential: true,
            start_group: Some(start_group),
        }
    }

    /// Number of hardware entries this scene occupies.
    pub fn effective_size(&self) -> usize {
        if self.is_sequential {
            self.amount
        } else {
            self.lights.len()
        }
    }

    /// Uniform brightness of a sequential scene (the single stand-in light's value).
    /// Falls back to 100 if the light list is unexpectedly empty.
    pub fn sequential_value(&self) -> u8 {
        self.lights.first().map_or(100, |l| l.value)
    }

    /// Expand a sequential scene back into its explicit contiguous light list.
    /// Non-sequential scenes return their lights unchanged.
    pub fn expand_lights(&self) -> Vec<Light> {
        if !self.is_sequential {
            return self.lights.clone();
        }
        let start = self.start_group.unwrap_or(1);
        let value = self.sequential_value();
        (0..self.amount)
            .map(|i| Light {
                group: start + i as u32,
                value,
                name: DEFAULT_LIGHT_NAME.to_string(),
            })
            .collect()
    }
}

/// True when the lights form a contiguous ascending group run with no gaps
/// and every light shares one brightness value. Lists of 0 or 1 lights count
/// as continuous.
pub fn is_continuous_uniform(lights: &[Light]) -> bool {
    let mut sorted: Vec<&Light> = lights.iter().collect();
    sorted.sort_by_key(|l| l.group);

    let Some(first) = sorted.first() else {
        return true;
    };
    if sorted.iter().any(|l| l.value != first.value) {
        return false;
    }
    sorted
        .windows(2)
        .all(|pair| matches!(pair, [a, b] if b.group == a.group + 1))
}

/// Apply the continuity compaction heuristic: if the scene's explicit lights
/// are contiguous and uniform, rewrite it into sequential form. The compact
/// form maps directly onto a loop in the generated controller code.
pub fn compact_if_continuous(scene: &mut Scene) {
    if scene.is_sequential || scene.lights.is_empty() {
        return;
    }
    if !is_continuous_uniform(&scene.lights) {
        return;
    }
    let min_group = scene.lights.iter().map(|l| l.group).min().unwrap_or(1);
    let value = scene.sequential_value();
    scene.is_sequential = true;
    scene.start_group = Some(min_group);
    scene.lights = vec![Light {
        group: min_group,
        value,
        name: DEFAULT_LIGHT_NAME.to_string(),
    }];
}
