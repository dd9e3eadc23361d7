//! Name-keyed capability registries.
//!
//! Registries are filled while options are applied and only read afterwards.
//! Iteration is ordered by name so that anything derived from a registry
//! (for example an accept-encoding list) is deterministic.

use std::collections::BTreeMap;

use connect_options_core::{BoxedCodec, BoxedCompressor};

/// Codecs a handler accepts, keyed by registered name.
pub type CodecRegistry = Registry<BoxedCodec>;

/// Compressors a client or handler supports, keyed by registered name.
pub type CompressorRegistry = Registry<BoxedCompressor>;

/// What a [`Registry::register`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The name was empty; nothing changed.
    Ignored,
    /// A new entry was added.
    Inserted,
    /// An existing entry was overwritten.
    Replaced,
    /// An existing entry was removed.
    Removed,
    /// Removal was requested for a name that was not registered.
    Absent,
}

/// A name → capability map.
#[derive(Clone)]
pub struct Registry<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register, replace, or remove a capability.
    ///
    /// - An empty `name` is ignored.
    /// - `None` removes the entry registered under `name`.
    /// - `Some` inserts or overwrites.
    pub fn register(&mut self, name: &str, value: Option<T>) -> Registration {
        if name.is_empty() {
            return Registration::Ignored;
        }
        match value {
            None => match self.entries.remove(name) {
                Some(_) => Registration::Removed,
                None => Registration::Absent,
            },
            Some(value) => match self.entries.insert(name.to_owned(), value) {
                Some(_) => Registration::Replaced,
                None => Registration::Inserted,
            },
        }
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_insert_and_replace() {
        let mut registry = Registry::new();
        assert_eq!(registry.register("json", Some(1)), Registration::Inserted);
        assert_eq!(registry.register("json", Some(2)), Registration::Replaced);
        assert_eq!(registry.get("json"), Some(&2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_empty_name_is_ignored() {
        let mut registry = Registry::new();
        assert_eq!(registry.register("", Some(1)), Registration::Ignored);
        assert_eq!(registry.register("", None::<i32>), Registration::Ignored);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_none_removes() {
        let mut registry = Registry::new();
        registry.register("gzip", Some(1));
        registry.register("br", Some(2));

        assert_eq!(registry.register("gzip", None), Registration::Removed);
        assert_eq!(registry.register("gzip", None), Registration::Absent);
        assert!(!registry.contains("gzip"));
        assert!(registry.contains("br"));
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = Registry::new();
        registry.register("zstd", Some(()));
        registry.register("br", Some(()));
        registry.register("gzip", Some(()));

        assert_eq!(registry.names().collect::<Vec<_>>(), ["br", "gzip", "zstd"]);
        assert_eq!(format!("{:?}", registry), r#"{"br", "gzip", "zstd"}"#);
    }
}
