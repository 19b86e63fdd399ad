// src/keys.rs
//
// Canonical key chains for multi-component keyed access (`P0["a";3;I1]`).
// A chain head owns deep copies of its components, never the originals:
// one component symbol may appear in several chains with different
// flags, and sharing would corrupt the other chains. Register
// components keep a back-reference so liveness and coloring can reach
// the original register through the copy.

use smallvec::SmallVec;

use crate::arena::{SymbolArena, SymbolId};
use crate::context::{CompilationUnit, CompilerContext};
use crate::symbol::{Symbol, SymbolKind, ValueKind};
use crate::table::SymbolTable;

/// Link `parts` into a canonical key chain stored in `table`.
///
/// A single plain component is returned as-is unless `force` is set: a
/// one-part chain is indistinguishable from the component itself.
/// Non-slice chains are deduplicated by their `;`-joined canonical
/// name; slice chains never are, because the slice markers live on the
/// copies.
///
/// Panics when `parts` is empty - callers always supply at least one
/// component.
pub fn link_keys(
    table: &mut SymbolTable,
    syms: &mut SymbolArena,
    parts: &[SymbolId],
    force: bool,
) -> SymbolId {
    assert!(!parts.is_empty(), "link_keys: no key components");

    if parts.len() == 1
        && !force
        && !syms[parts[0]].kind.intersects(SymbolKind::SLICE_MARKERS)
    {
        return parts[0];
    }

    let any_slice = parts
        .iter()
        .any(|&part| syms[part].kind.intersects(SymbolKind::SLICE_MARKERS));

    // the first component of a slice access might not carry the markers
    // itself; it still starts and ends its own one-element slice
    if any_slice && !syms[parts[0]].kind.intersects(SymbolKind::SLICE_MARKERS) {
        syms[parts[0]].kind |= SymbolKind::SLICE_START | SymbolKind::SLICE_END;
    }

    let canonical = parts
        .iter()
        .map(|&part| syms[part].name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    if !any_slice {
        if let Some(existing) = table.lookup(syms, &canonical) {
            return existing;
        }
    }

    let mut head = Symbol::new(canonical, Some(ValueKind::Key));
    head.kind = SymbolKind::CONSTANT;
    head.use_count = 1;

    let mut copies: SmallVec<[SymbolId; 4]> = SmallVec::with_capacity(parts.len());
    for &part in parts {
        let is_register = syms[part].needs_register();
        if is_register {
            head.kind |= SymbolKind::REGKEY;
        }

        let mut copy = syms[part].clone();
        if is_register {
            copy.origin = Some(part);
        }
        copies.push(syms.alloc(copy));
    }
    head.key_parts = copies.into_vec();

    let id = syms.alloc(head);
    table.insert(syms, id);
    id
}

impl CompilerContext {
    /// Link keys in the active unit's table, or in the global table
    /// when no unit is active (namespace keys are global constants).
    pub fn link_keys(
        &mut self,
        unit: Option<&mut CompilationUnit>,
        parts: &[SymbolId],
        force: bool,
    ) -> SymbolId {
        match unit {
            Some(unit) => link_keys(&mut unit.table, &mut self.symbols, parts, force),
            None => link_keys(&mut self.globals, &mut self.symbols, parts, force),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(syms: &mut SymbolArena, table: &mut SymbolTable, name: &str) -> SymbolId {
        table.define_constant(syms, name.to_string(), ValueKind::Str)
    }

    fn register(syms: &mut SymbolArena, table: &mut SymbolTable, name: &str) -> SymbolId {
        table.define(syms, name.to_string(), Some(ValueKind::Int))
    }

    #[test]
    fn single_plain_component_passes_through() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();
        let a = constant(&mut syms, &mut table, "\"a\"");
        let before = syms.len();

        let chain = link_keys(&mut table, &mut syms, &[a], false);

        assert_eq!(chain, a);
        assert_eq!(syms.len(), before);
    }

    #[test]
    fn forced_single_component_builds_a_chain() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();
        let a = constant(&mut syms, &mut table, "\"a\"");

        let chain = link_keys(&mut table, &mut syms, &[a], true);

        assert_ne!(chain, a);
        assert_eq!(syms[chain].key_parts.len(), 1);
    }

    #[test]
    fn chains_join_component_names_with_semicolons() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();
        let a = constant(&mut syms, &mut table, "\"a\"");
        let b = constant(&mut syms, &mut table, "0");

        let chain = link_keys(&mut table, &mut syms, &[a, b], false);

        assert_eq!(syms[chain].name, "\"a\";0");
        assert_eq!(syms[chain].value, Some(ValueKind::Key));
        assert_eq!(syms[chain].color, Symbol::UNASSIGNED);
        assert!(syms[chain].kind.contains(SymbolKind::CONSTANT));
    }

    #[test]
    fn equal_chains_are_deduplicated() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();
        let a = constant(&mut syms, &mut table, "\"a\"");
        let b = constant(&mut syms, &mut table, "0");

        let first = link_keys(&mut table, &mut syms, &[a, b], false);
        let second = link_keys(&mut table, &mut syms, &[a, b], false);

        assert_eq!(first, second);
    }

    #[test]
    fn components_are_copied_not_shared() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();
        let a = constant(&mut syms, &mut table, "\"a\"");
        let b = constant(&mut syms, &mut table, "0");

        let chain = link_keys(&mut table, &mut syms, &[a, b], false);

        for (&copy, &original) in syms[chain].key_parts.clone().iter().zip([a, b].iter()) {
            assert_ne!(copy, original);
            assert_eq!(syms[copy].name, syms[original].name);
        }
    }

    #[test]
    fn register_components_mark_the_chain_and_keep_a_back_reference() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();
        let name = constant(&mut syms, &mut table, "\"a\"");
        let index = register(&mut syms, &mut table, "i");

        let chain = link_keys(&mut table, &mut syms, &[name, index], false);

        assert!(syms[chain].kind.contains(SymbolKind::REGKEY));
        let parts = syms[chain].key_parts.clone();
        assert_eq!(syms[parts[0]].origin, None);
        assert_eq!(syms[parts[1]].origin, Some(index));
    }

    #[test]
    fn slice_chains_upgrade_the_first_component() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();
        let a = constant(&mut syms, &mut table, "\"a\"");
        let b = constant(&mut syms, &mut table, "1");
        syms[b].kind |= SymbolKind::SLICE_END;

        let first = link_keys(&mut table, &mut syms, &[a, b], false);

        assert!(syms[a].kind.contains(SymbolKind::SLICE_START | SymbolKind::SLICE_END));

        // slice chains are never deduplicated
        let second = link_keys(&mut table, &mut syms, &[a, b], false);
        assert_ne!(first, second);
    }

    #[test]
    #[should_panic(expected = "no key components")]
    fn empty_component_list_is_fatal() {
        let mut syms = SymbolArena::new();
        let mut table = SymbolTable::new();
        link_keys(&mut table, &mut syms, &[], false);
    }
}
