use std::collections::{BTreeMap, BTreeSet, HashMap};

use sg_core::StoryError;

/// Per-character advance widths of the target font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontMetrics {
    advances: HashMap<char, u32>,
    fallback_advance: u32,
}

impl FontMetrics {
    pub fn new(advances: HashMap<char, u32>, fallback_advance: u32) -> Self {
        Self {
            advances,
            fallback_advance,
        }
    }

    /// Builds the table from string keys: either a single character or a
    /// decimal code point (needed for characters such as `"` and space).
    pub fn from_keyed_widths(
        widths: &BTreeMap<String, u32>,
        fallback_advance: u32,
    ) -> Result<Self, StoryError> {
        let mut advances = HashMap::with_capacity(widths.len());
        for (key, width) in widths {
            let ch = parse_glyph_key(key).ok_or_else(|| {
                StoryError::new(
                    "LAYOUT_FONT_KEY",
                    format!(
                        "Font metrics key \"{}\" is neither a character nor a code point.",
                        key
                    ),
                )
            })?;
            advances.insert(ch, *width);
        }
        Ok(Self::new(advances, fallback_advance))
    }

    pub fn advance(&self, ch: char) -> u32 {
        self.advances
            .get(&ch)
            .copied()
            .unwrap_or(self.fallback_advance)
    }

    pub fn text_width(&self, text: &str) -> u32 {
        text.chars().map(|ch| self.advance(ch)).sum()
    }

    pub fn missing_glyphs(&self, text: &str) -> BTreeSet<char> {
        text.chars()
            .filter(|ch| !ch.is_whitespace() && !self.advances.contains_key(ch))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.advances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advances.is_empty()
    }
}

fn parse_glyph_key(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        (Some(_), Some(_)) => key.parse::<u32>().ok().and_then(char::from_u32),
        _ => None,
    }
}
