// src/pmc.rs
//
// Interned object-class names. The driver resolves a class name to a
// PmcTypeId, parks it in the context's pending slot, and the next
// pmc-typed identifier consumes it.

use rustc_hash::FxHashMap;

/// Handle to an interned object-class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PmcTypeId(u32);

impl PmcTypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interns object-class names to unique ids.
#[derive(Debug, Default)]
pub struct PmcTypeRegistry {
    map: FxHashMap<String, PmcTypeId>,
    names: Vec<String>,
}

impl PmcTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> PmcTypeId {
        if let Some(&id) = self.map.get(name) {
            return id;
        }

        let id = PmcTypeId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.map.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, name: &str) -> Option<PmcTypeId> {
        self.map.get(name).copied()
    }

    pub fn name(&self, id: PmcTypeId) -> &str {
        &self.names[id.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_id() {
        let mut registry = PmcTypeRegistry::new();
        let a = registry.intern("Sub");
        let b = registry.intern("Sub");
        let c = registry.intern("Coroutine");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn name_resolves_back() {
        let mut registry = PmcTypeRegistry::new();
        let id = registry.intern("ResizablePMCArray");
        assert_eq!(registry.name(id), "ResizablePMCArray");
        assert_eq!(registry.get("ResizablePMCArray"), Some(id));
        assert_eq!(registry.get("Hash"), None);
    }
}
