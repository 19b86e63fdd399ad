// src/table.rs
//
// Open-chained symbol table keyed by name (optionally by name plus value
// class). Keeps the compiler's historical string hash - polynomial
// accumulation with multiplier 65599 - and doubles at load factor 1.0.
// Bucket-internal order is not preserved across a resize; callers may
// only rely on membership and on lookups seeing the newest entry first.

use tracing::{debug, trace};

use crate::arena::{SymbolArena, SymbolId};
use crate::symbol::{Symbol, ValueKind};

const INITIAL_BUCKETS: usize = 16;

/// Hash table mapping names to symbols stored in a [`SymbolArena`].
///
/// The table owns membership only; record storage stays in the arena, so
/// one symbol can be reached from a table, a key chain and call metadata
/// at the same time.
#[derive(Debug)]
pub struct SymbolTable {
    buckets: Vec<Vec<SymbolId>>,
    entries: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            buckets: vec![Vec::new(); INITIAL_BUCKETS],
            entries: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Current bucket array size; always a power of two and strictly
    /// greater than `len()` after every insert.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, name: &str) -> usize {
        hash_name(name) as usize % self.buckets.len()
    }

    /// Store a symbol. The newest entry for a name shadows older ones
    /// with the same name. Reaching load factor 1.0 doubles the table.
    pub fn insert(&mut self, syms: &SymbolArena, id: SymbolId) {
        trace!(name = %syms[id].name, "store symbol");
        let slot = self.bucket_of(&syms[id].name);
        self.buckets[slot].push(id);
        self.entries += 1;

        if self.entries >= self.buckets.len() {
            self.grow(syms);
        }
    }

    fn grow(&mut self, syms: &SymbolArena) {
        let new_size = self.buckets.len() * 2;
        debug!(entries = self.entries, new_size, "resizing symbol table");

        let mut buckets = vec![Vec::new(); new_size];
        for bucket in self.buckets.drain(..) {
            for id in bucket {
                let slot = hash_name(&syms[id].name) as usize % new_size;
                buckets[slot].push(id);
            }
        }
        self.buckets = buckets;
    }

    /// Latest symbol stored under `name`, regardless of value class.
    pub fn lookup(&self, syms: &SymbolArena, name: &str) -> Option<SymbolId> {
        self.buckets[self.bucket_of(name)]
            .iter()
            .rev()
            .copied()
            .find(|&id| syms[id].name == name)
    }

    /// Latest symbol stored under `name` with the given value class.
    /// Lets two symbols share a name across different value domains.
    pub fn lookup_typed(
        &self,
        syms: &SymbolArena,
        name: &str,
        value: Option<ValueKind>,
    ) -> Option<SymbolId> {
        self.buckets[self.bucket_of(name)]
            .iter()
            .rev()
            .copied()
            .find(|&id| {
                let sym = &syms[id];
                sym.value == value && sym.name == name
            })
    }

    /// Empty the table, handing every stored symbol to `on_discard`
    /// first. The bucket array keeps its size; arena records stay alive.
    pub fn clear(&mut self, syms: &SymbolArena, mut on_discard: impl FnMut(SymbolId, &Symbol)) {
        for bucket in &mut self.buckets {
            for id in bucket.drain(..) {
                on_discard(id, &syms[id]);
            }
        }
        self.entries = 0;
    }

    /// Every name currently stored, in no particular order. For
    /// diagnostics and tests only.
    pub fn names<'a>(&'a self, syms: &'a SymbolArena) -> impl Iterator<Item = &'a str> {
        self.buckets
            .iter()
            .flatten()
            .map(|&id| syms[id].name.as_str())
    }
}

/// Polynomial string hash with multiplier 65599.
fn hash_name(name: &str) -> u32 {
    name.bytes()
        .fold(0u32, |h, b| h.wrapping_mul(65599).wrapping_add(u32::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(table: &mut SymbolTable, syms: &mut SymbolArena, name: &str) -> SymbolId {
        let id = syms.alloc(Symbol::new(name.to_string(), Some(ValueKind::Int)));
        table.insert(syms, id);
        id
    }

    #[test]
    fn lookup_finds_stored_symbol() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();

        let id = store(&mut table, &mut syms, "x");
        assert_eq!(table.lookup(&syms, "x"), Some(id));
        assert_eq!(table.lookup(&syms, "y"), None);
    }

    #[test]
    fn newest_entry_shadows_older_ones() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();

        let first = store(&mut table, &mut syms, "x");
        let second = store(&mut table, &mut syms, "x");

        assert_ne!(first, second);
        assert_eq!(table.lookup(&syms, "x"), Some(second));
    }

    #[test]
    fn typed_lookup_distinguishes_value_classes() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();

        let int_sym = store(&mut table, &mut syms, "x");
        let num_sym = syms.alloc(Symbol::new("x".to_string(), Some(ValueKind::Num)));
        table.insert(&syms, num_sym);

        assert_eq!(
            table.lookup_typed(&syms, "x", Some(ValueKind::Int)),
            Some(int_sym)
        );
        assert_eq!(
            table.lookup_typed(&syms, "x", Some(ValueKind::Num)),
            Some(num_sym)
        );
        assert_eq!(table.lookup_typed(&syms, "x", Some(ValueKind::Str)), None);
    }

    #[test]
    fn load_factor_one_triggers_doubling() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();
        assert_eq!(table.bucket_count(), 16);

        for i in 0..100 {
            store(&mut table, &mut syms, &format!("sym{i}"));
            // entries < size holds immediately after every insert
            assert!(table.len() < table.bucket_count());
        }
        assert_eq!(table.len(), 100);
        assert_eq!(table.bucket_count(), 128);
    }

    #[test]
    fn membership_survives_resizes() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();

        let ids: Vec<_> = (0..50)
            .map(|i| store(&mut table, &mut syms, &format!("sym{i}")))
            .collect();

        for (i, id) in ids.iter().enumerate() {
            assert_eq!(table.lookup(&syms, &format!("sym{i}")), Some(*id));
        }
        assert_eq!(table.names(&syms).count(), 50);
    }

    #[test]
    fn clear_invokes_hook_once_per_symbol() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();
        for i in 0..20 {
            store(&mut table, &mut syms, &format!("sym{i}"));
        }

        let mut seen = Vec::new();
        table.clear(&syms, |id, sym| seen.push((id, sym.name.clone())));

        assert_eq!(seen.len(), 20);
        assert!(table.is_empty());
        assert_eq!(table.lookup(&syms, "sym0"), None);
    }
}
