pub mod scene;
pub mod schedule;

// Re-export commonly used types at the model level.
pub use scene::{compact_if_continuous, is_continuous_uniform, Light, Scene, DEFAULT_LIGHT_NAME};
pub use schedule::{Schedule, TriggerTime};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The complete result of one parse invocation: either this whole pair is
/// produced or the parse fails with an error, never a partial document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParsedDocument {
    pub scenes: Vec<Scene>,
    pub schedules: Vec<Schedule>,
}
