// src/context.rs
//
// Explicit compilation state. The global symbol table, namespace stack,
// pending object type and temp-register serial are all per-context, so
// independent compilations never interfere through process globals.

use tracing::debug;

use crate::arena::{SymbolArena, SymbolId};
use crate::namespace::NamespaceStack;
use crate::pmc::{PmcTypeId, PmcTypeRegistry};
use crate::symbol::{Symbol, SymbolKind};
use crate::table::SymbolTable;

/// State shared by every compilation unit of one compiler run.
///
/// Owns the symbol arena, the global table (literal constants and
/// global addresses), the namespace stack and the object-type registry.
/// Created empty at compiler start, dropped at compiler exit.
#[derive(Debug, Default)]
pub struct CompilerContext {
    pub symbols: SymbolArena,
    pub globals: SymbolTable,
    pub namespaces: NamespaceStack,
    pub pmc_types: PmcTypeRegistry,
    pub(crate) current_namespace: Option<SymbolId>,
    pub(crate) pending_pmc_type: Option<PmcTypeId>,
    pub(crate) temp_serial: u32,
}

impl CompilerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the current namespace key symbol (`None` clears it). Its
    /// name is the rendered quoted form used for sub-name mangling.
    pub fn set_namespace(&mut self, key: Option<SymbolId>) {
        self.current_namespace = key;
    }

    pub fn current_namespace(&self) -> Option<SymbolId> {
        self.current_namespace
    }

    /// Park the object class consumed by the next pmc-typed identifier.
    pub fn set_pending_pmc_type(&mut self, ty: PmcTypeId) {
        self.pending_pmc_type = Some(ty);
    }

    pub fn pending_pmc_type(&self) -> Option<PmcTypeId> {
        self.pending_pmc_type
    }

    /// Rendered prefix of the declared namespace, for sub mangling.
    pub(crate) fn namespace_prefix(&self) -> Option<String> {
        self.current_namespace
            .map(|id| self.symbols[id].name.clone())
    }

    /// Record the declared namespace on `unit` as a global CONST_PTR
    /// alias of the namespace key. Does nothing when no namespace is
    /// declared or the unit already carries one.
    pub fn attach_namespace(&mut self, unit: &mut CompilationUnit) {
        let Some(ns) = self.current_namespace else {
            return;
        };
        if unit.namespace.is_some() {
            return;
        }

        let mut alias = self.symbols[ns].clone();
        alias.kind = SymbolKind::CONST_PTR;
        alias.origin = Some(ns);
        let alias = self.symbols.alloc(alias);

        let already_interned = self
            .globals
            .lookup(&self.symbols, &self.symbols[alias].name)
            .is_some_and(|id| self.symbols[id].kind == SymbolKind::CONST_PTR);
        if !already_interned {
            self.globals.insert(&self.symbols, alias);
        }

        unit.namespace = Some(alias);
    }

    /// Scoped lookup: every namespace qualification innermost first,
    /// then the bare name in the unit table, then the globals.
    pub fn find_symbol(&self, unit: &CompilationUnit, name: &str) -> Option<SymbolId> {
        for candidate in self.namespaces.qualified_candidates(name) {
            if let Some(id) = unit.table.lookup(&self.symbols, &candidate) {
                return Some(id);
            }
        }

        unit.table
            .lookup(&self.symbols, name)
            .or_else(|| self.globals.lookup(&self.symbols, name))
    }

    /// Drop every global symbol from the table at compiler teardown.
    pub fn clear_globals(&mut self) {
        debug!(entries = self.globals.len(), "clearing global symbols");
        self.globals.clear(&self.symbols, |_, _| {});
    }
}

/// One compilation unit (a sub being compiled) and its local symbols.
#[derive(Debug, Default)]
pub struct CompilationUnit {
    pub table: SymbolTable,
    pub(crate) namespace: Option<SymbolId>,
}

impl CompilationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace alias attached by [`CompilerContext::attach_namespace`].
    pub fn namespace(&self) -> Option<SymbolId> {
        self.namespace
    }

    /// Discard the unit's local symbols. `on_discard` runs once per
    /// stored symbol so later passes can tear down attached liveness
    /// data, which is opaque to this crate.
    pub fn clear_locals(
        &mut self,
        syms: &SymbolArena,
        on_discard: impl FnMut(SymbolId, &Symbol),
    ) {
        debug!(entries = self.table.len(), "clearing unit locals");
        self.table.clear(syms, on_discard);
    }
}
