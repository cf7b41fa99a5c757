use std::collections::BTreeMap;

/// Named values remembered from assignment results. Keys are case-sensitive;
/// entries are only ever overwritten, never removed individually.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    values: BTreeMap<String, String>,
}

impl VariableStore {
    pub fn upsert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        tracing::debug!(%name, %value, "variable bound");
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Owned copy for a recognition request; later upserts do not affect it.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
