use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ScriptId;

/// Position of an offending instruction inside a script file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptLocation {
    pub script_id: ScriptId,
    pub address: Option<u32>,
    pub line: Option<usize>,
}

impl ScriptLocation {
    pub fn script(script_id: ScriptId) -> Self {
        Self {
            script_id,
            address: None,
            line: None,
        }
    }

    pub fn address(script_id: ScriptId, address: u32) -> Self {
        Self {
            script_id,
            address: Some(address),
            line: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for ScriptLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script {}", self.script_id)?;
        if let Some(address) = self.address {
            write!(f, " @ {:06X}", address)?;
        }
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct StoryError {
    pub code: String,
    pub message: String,
    pub location: Option<ScriptLocation>,
}

impl StoryError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Builds an error whose message is prefixed with the location, so the
    /// rendered text alone is enough to find the instruction again.
    pub fn at(
        code: impl Into<String>,
        message: impl Into<String>,
        location: ScriptLocation,
    ) -> Self {
        Self {
            code: code.into(),
            message: format!("{}: {}", location, message.into()),
            location: Some(location),
        }
    }
}
