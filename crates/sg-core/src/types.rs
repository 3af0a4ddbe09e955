use std::fmt;

use serde::{Deserialize, Serialize};

pub type ScriptId = u32;
pub type ThreadName = String;

/// A branch point in the story graph. Ordered by script id, then thread name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub script_id: ScriptId,
    pub thread: ThreadName,
}

impl Node {
    pub fn new(script_id: ScriptId, thread: impl Into<ThreadName>) -> Self {
        Self {
            script_id,
            thread: thread.into(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.script_id, self.thread)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueRecord {
    pub script_id: ScriptId,
    pub address: u32,
    pub thread: ThreadName,
    #[serde(default)]
    pub speaker: Option<String>,
    pub body: String,
    #[serde(default)]
    pub variant_body: Option<String>,
}

impl DialogueRecord {
    pub fn node(&self) -> Node {
        Node::new(self.script_id, self.thread.clone())
    }

    /// Replaces body and variant with translated text, keeping thread and speaker.
    pub fn translated(&self, translation: &TranslationRecord) -> DialogueRecord {
        DialogueRecord {
            body: translation.body.clone(),
            variant_body: normalize_variant(&translation.body, translation.variant_body.clone()),
            ..self.clone()
        }
    }
}

/// A variant equal to its body carries no information and is dropped.
pub fn normalize_variant(body: &str, variant: Option<String>) -> Option<String> {
    variant.filter(|variant| variant != body)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub tail: Node,
    pub head: Node,
    #[serde(default)]
    pub choice: Option<String>,
}

impl EdgeRecord {
    pub fn unconditional(tail: Node, head: Node) -> Self {
        Self {
            tail,
            head,
            choice: None,
        }
    }

    pub fn choice(tail: Node, head: Node, choice: impl Into<String>) -> Self {
        Self {
            tail,
            head,
            choice: Some(choice.into()),
        }
    }

    pub fn is_unconditional(&self) -> bool {
        self.choice.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    pub script_id: ScriptId,
    pub address: u32,
    pub body: String,
    #[serde(default)]
    pub variant_body: Option<String>,
}

/// Everything extracted from one script file; committed to a store as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptBatch {
    pub script_id: ScriptId,
    pub dialogue: Vec<DialogueRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl ScriptBatch {
    pub fn new(script_id: ScriptId) -> Self {
        Self {
            script_id,
            dialogue: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Unconditional edges are inserted once per node pair; choice edges always stack.
    pub fn push_edge(&mut self, edge: EdgeRecord) -> bool {
        if edge.is_unconditional() && self.edges.contains(&edge) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.dialogue.is_empty() && self.edges.is_empty()
    }
}
