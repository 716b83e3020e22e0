use indexmap::IndexMap;
use serde::Serialize;

use crate::protocol::types::OpcodeEntry;

/// Version -> packet name -> entry. Built once by the loader and only read afterwards.
///
/// Versions keep the order in which the source document first mentioned them.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct OpcodeTable {
    versions: IndexMap<String, IndexMap<String, OpcodeEntry>>,
}

impl OpcodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins for a repeated (version, name) pair.
    pub(crate) fn insert(&mut self, version: &str, name: &str, entry: OpcodeEntry) {
        self.versions
            .entry(version.to_string())
            .or_default()
            .insert(name.to_string(), entry);
    }

    /// Registers a version even if none of its entries survive validation.
    pub(crate) fn ensure_version(&mut self, version: &str) {
        self.versions.entry(version.to_string()).or_default();
    }

    pub fn get(&self, version: &str, name: &str) -> Option<OpcodeEntry> {
        self.versions.get(version)?.get(name).copied()
    }

    pub fn contains_version(&self, version: &str) -> bool {
        self.versions.contains_key(version)
    }

    pub fn entries(&self, version: &str) -> Option<&IndexMap<String, OpcodeEntry>> {
        self.versions.get(version)
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.versions.keys().map(String::as_str)
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Total number of (version, name) entries.
    pub fn len(&self) -> usize {
        self.versions.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
