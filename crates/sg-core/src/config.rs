use serde::{Deserialize, Serialize};

use crate::types::ScriptId;

pub const DEFAULT_THREAD_PREFIX: &str = "sure";
pub const DEFAULT_MAX_SCRIPT_ID: ScriptId = 9099;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotationConfig {
    pub thread_prefix: String,
    pub max_script_id: ScriptId,
    pub mnemonics: MnemonicTable,
    pub layout: LayoutConfig,
}

impl Default for NotationConfig {
    fn default() -> Self {
        Self {
            thread_prefix: DEFAULT_THREAD_PREFIX.to_string(),
            max_script_id: DEFAULT_MAX_SCRIPT_ID,
            mnemonics: MnemonicTable::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl NotationConfig {
    /// Scripts above the threshold are system scripts and carry no story.
    pub fn is_story_script(&self, script_id: ScriptId) -> bool {
        script_id <= self.max_script_id
    }
}

/// Mnemonic spellings for the instruction kinds the toolchain understands.
/// The set of kinds is closed; only their spellings vary between builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MnemonicTable {
    pub set_speaker: Vec<String>,
    pub append_line: Vec<String>,
    pub branching3: Vec<String>,
    pub branching4: Vec<String>,
    pub jump: Vec<String>,
    pub choice_jump: Vec<String>,
}

impl Default for MnemonicTable {
    fn default() -> Self {
        fn names(values: &[&str]) -> Vec<String> {
            values.iter().map(|value| value.to_string()).collect()
        }

        Self {
            set_speaker: names(&["call fn_EB4C"]),
            append_line: names(&["call fn_E340"]),
            branching3: names(&["call fn_3B78C", "call fn_3BB24"]),
            branching4: names(&["call fn_54B4C"]),
            jump: names(&["call fn_15C0", "call fn_1608"]),
            choice_jump: names(&["call fn_F794", "call fn_54F3C"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub max_width_px: u32,
    pub dialogue_max_lines: usize,
    pub branching_slots: usize,
    /// Template prepended to the first line of scaled text; `{percent}` is substituted.
    pub scale_directive: String,
    pub fallback_advance: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_width_px: 1500,
            dialogue_max_lines: 3,
            branching_slots: 4,
            scale_directive: "<scale={percent}>".to_string(),
            fallback_advance: 0,
        }
    }
}
