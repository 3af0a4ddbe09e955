use std::fs;
use std::path::{Path, PathBuf};

use sg_core::{NotationConfig, ScriptId, StoryError};
use walkdir::WalkDir;

use crate::error_map::{map_api_script_read, map_api_source_path, map_api_source_scan};

pub const SCRIPT_EXTENSION: &str = "asm";

/// A script file whose stem is its numeric script id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSource {
    pub script_id: ScriptId,
    pub path: PathBuf,
}

impl ScriptSource {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.{}", self.script_id, SCRIPT_EXTENSION))
    }

    pub fn read_lines(&self) -> Result<Vec<String>, StoryError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|error| map_api_script_read(&self.path, error))?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredScripts {
    pub scripts: Vec<ScriptSource>,
    /// Script files left out: non-numeric stems and ids above the story range.
    pub skipped: usize,
}

pub fn resolve_dir(dir: &Path) -> Result<PathBuf, StoryError> {
    let absolute = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(map_api_source_path)?
            .join(dir)
    };

    if !absolute.exists() {
        return Err(StoryError::new(
            "API_SOURCE_NOT_FOUND",
            format!("scripts-dir does not exist: {}", absolute.display()),
        ));
    }
    if !absolute.is_dir() {
        return Err(StoryError::new(
            "API_SOURCE_NOT_DIR",
            format!("scripts-dir is not a directory: {}", absolute.display()),
        ));
    }
    Ok(absolute)
}

/// Lists the `*.asm` files directly under `dir`, ordered by script id.
pub fn discover_scripts(
    dir: &Path,
    config: &NotationConfig,
) -> Result<DiscoveredScripts, StoryError> {
    let root = resolve_dir(dir)?;
    let mut found = DiscoveredScripts::default();

    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = entry.map_err(map_api_source_scan)?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some(SCRIPT_EXTENSION)
        {
            continue;
        }

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();
        let Ok(script_id) = stem.parse::<ScriptId>() else {
            tracing::warn!(path = %path.display(), "skipping script without a numeric name");
            found.skipped += 1;
            continue;
        };
        if !config.is_story_script(script_id) {
            tracing::debug!(script_id, "skipping script outside the story range");
            found.skipped += 1;
            continue;
        }

        found.scripts.push(ScriptSource {
            script_id,
            path: path.to_path_buf(),
        });
    }

    found.scripts.sort_by_key(|source| source.script_id);
    Ok(found)
}
