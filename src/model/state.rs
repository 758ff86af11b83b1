use indexmap::IndexMap;

use super::attribute::AttrValue;

/// A fixture's resolved attribute values, keyed by attribute name
/// (`"dimmer"`, `"color"`, `"color_<n>"`, …). Absence of a key means "use
/// the attribute's default". Insertion order is preserved for debug
/// output but carries no semantic weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureState(IndexMap<String, AttrValue>);

impl FixtureState {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: AttrValue) {
        self.0.insert(key.into(), value);
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, AttrValue)> for FixtureState {
    fn from_iter<T: IntoIterator<Item = (String, AttrValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
