use std::collections::BTreeMap;

/// Source-language speaker names mapped to their target-language names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerTable {
    names: BTreeMap<String, String>,
}

impl SpeakerTable {
    pub fn new(names: BTreeMap<String, String>) -> Self {
        Self { names }
    }

    pub fn translate(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for SpeakerTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
