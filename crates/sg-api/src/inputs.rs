use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use sg_core::{NotationConfig, StoryError, TranslationRecord};
use sg_layout::FontMetrics;
use sg_rewrite::SpeakerTable;

use crate::error_map::{map_api_input_invalid, map_api_input_read};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoryError> {
    let raw = fs::read_to_string(path).map_err(|error| map_api_input_read(path, error))?;
    serde_json::from_str(&raw).map_err(|error| map_api_input_invalid(path, error))
}

/// Reads a notation config; `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<NotationConfig, StoryError> {
    match path {
        Some(path) => read_json(path),
        None => Ok(NotationConfig::default()),
    }
}

/// Reads `{ "<char or code point>": advance, ... }`.
pub fn load_font_metrics(path: &Path, config: &NotationConfig) -> Result<FontMetrics, StoryError> {
    let widths: BTreeMap<String, u32> = read_json(path)?;
    let metrics = FontMetrics::from_keyed_widths(&widths, config.layout.fallback_advance)?;
    tracing::debug!(path = %path.display(), glyphs = metrics.len(), "loaded font metrics");
    Ok(metrics)
}

/// Reads `{ "<source name>": "<target name>", ... }`; `None` is an empty table.
pub fn load_speakers(path: Option<&Path>) -> Result<SpeakerTable, StoryError> {
    match path {
        Some(path) => Ok(SpeakerTable::new(read_json(path)?)),
        None => Ok(SpeakerTable::default()),
    }
}

pub fn load_translations(path: &Path) -> Result<Vec<TranslationRecord>, StoryError> {
    read_json(path)
}
