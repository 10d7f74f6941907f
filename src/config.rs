/// Picker configuration
use crate::animator::{Animator, HIGHLIGHT_STEPS, STEP_DELAY};
use crate::notice::NOTICE_TTL;
use crate::parser::{ItemParser, DEFAULT_MAX_RANGE_LEN};
use crate::storage::{DEFAULT_SLOT, EXPORT_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for a [`crate::WallPicker`]. Every field has a default, so a
/// partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Store slot holding the saved input
    pub slot: String,
    /// Intermediate highlights per pick
    pub highlight_steps: usize,
    pub step_delay_ms: u64,
    pub notice_ttl_ms: u64,
    pub export_file_name: String,
    /// Largest number of items one range line may expand to
    pub max_range_len: u64,
}

impl Default for PickerConfig {
    fn default() -> Self {
        PickerConfig {
            slot: DEFAULT_SLOT.to_string(),
            highlight_steps: HIGHLIGHT_STEPS,
            step_delay_ms: STEP_DELAY.as_millis() as u64,
            notice_ttl_ms: NOTICE_TTL.as_millis() as u64,
            export_file_name: EXPORT_FILE_NAME.to_string(),
            max_range_len: DEFAULT_MAX_RANGE_LEN,
        }
    }
}

impl PickerConfig {
    /// Parse a JSON config document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn animator(&self) -> Animator {
        Animator::new(self.highlight_steps, Duration::from_millis(self.step_delay_ms))
    }

    pub fn parser(&self) -> ItemParser {
        ItemParser::new().with_max_range_len(self.max_range_len)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}
