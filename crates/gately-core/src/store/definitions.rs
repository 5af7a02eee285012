// ── Definition store ──
//
// Active code definitions are read on every scan and replaced
// wholesale on (re)load, so they live behind an `ArcSwap`: lock-free
// reads, atomic swap on load. Supplied order is preserved because it
// is the resolver's precedence order.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::model::CodeDefinition;

/// Lock-free holder for the loaded code definitions.
pub struct DefinitionStore {
    inner: ArcSwap<Vec<Arc<CodeDefinition>>>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Replace the full definition set. Returns how many were loaded.
    pub fn replace(&self, definitions: Vec<CodeDefinition>) -> usize {
        let definitions: Vec<Arc<CodeDefinition>> =
            definitions.into_iter().map(Arc::new).collect();
        let count = definitions.len();
        self.inner.store(Arc::new(definitions));
        tracing::debug!(count, "definitions replaced");
        count
    }

    /// Current snapshot in load order.
    pub fn snapshot(&self) -> Arc<Vec<Arc<CodeDefinition>>> {
        self.inner.load_full()
    }

    pub fn by_id(&self, id: &str) -> Option<Arc<CodeDefinition>> {
        self.inner
            .load()
            .iter()
            .find(|def| def.id == id)
            .map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::CodeSelector;

    fn def(id: &str, selector: &str) -> CodeDefinition {
        CodeDefinition {
            id: id.into(),
            name: id.into(),
            description: None,
            selector: CodeSelector::parse(selector).unwrap(),
            color: None,
            duration_minutes: 60,
            price: 100,
            price_per_extra_minute: 5,
            active: true,
        }
    }

    #[test]
    fn replace_preserves_order() {
        let store = DefinitionStore::new();
        store.replace(vec![def("b", "2*"), def("a", "1*")]);

        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].id, "b");
        assert_eq!(snapshot[1].id, "a");
    }

    #[test]
    fn by_id_finds_loaded_definitions() {
        let store = DefinitionStore::new();
        store.replace(vec![def("basic", "1*")]);

        assert_eq!(store.by_id("basic").unwrap().id, "basic");
        assert!(store.by_id("missing").is_none());
    }

    #[test]
    fn replace_swaps_wholesale() {
        let store = DefinitionStore::new();
        store.replace(vec![def("old", "1*")]);
        store.replace(vec![def("new", "2*")]);

        assert_eq!(store.len(), 1);
        assert!(store.by_id("old").is_none());
        assert!(store.by_id("new").is_some());
    }
}
