use std::fmt::Display;
use std::path::Path;

use sg_core::StoryError;

fn map_error(code: &'static str, path: &Path, error: impl Display) -> StoryError {
    StoryError::new(code, format!("{}: {}", path.display(), error))
}

pub(crate) fn map_store_read(path: &Path, error: std::io::Error) -> StoryError {
    map_error("STORE_READ", path, error)
}

pub(crate) fn map_store_write(path: &Path, error: std::io::Error) -> StoryError {
    map_error("STORE_WRITE", path, error)
}

pub(crate) fn map_store_invalid(path: &Path, error: serde_json::Error) -> StoryError {
    map_error("STORE_INVALID", path, error)
}

pub(crate) fn map_store_encode(error: serde_json::Error) -> StoryError {
    StoryError::new("STORE_ENCODE", error.to_string())
}
