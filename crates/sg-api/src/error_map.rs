use std::fmt::Display;
use std::path::Path;

use sg_core::StoryError;

fn map_error(code: &'static str, error: impl Display) -> StoryError {
    StoryError::new(code, error.to_string())
}

fn map_path_error(code: &'static str, path: &Path, error: impl Display) -> StoryError {
    StoryError::new(code, format!("{}: {}", path.display(), error))
}

pub(crate) fn map_api_source_path(error: std::io::Error) -> StoryError {
    map_error("API_SOURCE_PATH", error)
}

pub(crate) fn map_api_source_scan(error: walkdir::Error) -> StoryError {
    map_error("API_SOURCE_SCAN", error)
}

pub(crate) fn map_api_script_read(path: &Path, error: std::io::Error) -> StoryError {
    map_path_error("API_SCRIPT_READ", path, error)
}

pub(crate) fn map_api_output_write(path: &Path, error: std::io::Error) -> StoryError {
    map_path_error("API_OUTPUT_WRITE", path, error)
}

pub(crate) fn map_api_input_read(path: &Path, error: std::io::Error) -> StoryError {
    map_path_error("API_INPUT_READ", path, error)
}

pub(crate) fn map_api_input_invalid(path: &Path, error: serde_json::Error) -> StoryError {
    map_path_error("API_INPUT_INVALID", path, error)
}
