// src/registry.rs
//
// Symbol creation and deduplication policies layered on SymbolTable:
// make-or-get registers, literal constants, addresses with uniqueness
// rules, namespace-qualified identifiers and machine registers.

use crate::arena::{SymbolArena, SymbolId};
use crate::context::{CompilationUnit, CompilerContext};
use crate::errors::SymbolError;
use crate::namespace::mangle_sub_name;
use crate::symbol::{Symbol, SymbolKind, UsageFlags, ValueKind};
use crate::table::SymbolTable;

/// Uniqueness policy for address creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressPolicy {
    /// Always create a fresh symbol, duplicates allowed. Used when
    /// collecting every entry point of a sub.
    AddAll,
    /// Namespace-mangled subroutine name; redefinition is an error.
    AddUniqueSub,
    /// Label name; redefinition is an error.
    AddUniqueLabel,
    /// Plain lookup-or-create, no uniqueness enforcement and no
    /// definition-count bump.
    AddOnce,
}

impl SymbolTable {
    /// Find or create a register symbol for `name` with the given value
    /// class. The name moves into the call either way: on a dedup hit
    /// it is dropped and the existing record returned.
    pub fn define(
        &mut self,
        syms: &mut SymbolArena,
        name: String,
        value: Option<ValueKind>,
    ) -> SymbolId {
        if let Some(id) = self.lookup_typed(syms, &name, value) {
            return id;
        }

        let id = syms.alloc(Symbol::new(name, value));
        self.insert(syms, id);
        id
    }

    /// Define a literal constant. Encoded string literals normalize to
    /// plain strings carrying the ENCODED flag. Every definition site
    /// bumps the use count.
    pub fn define_constant(
        &mut self,
        syms: &mut SymbolArena,
        name: String,
        value: ValueKind,
    ) -> SymbolId {
        let id = self.define(syms, name, Some(value));
        let sym = &mut syms[id];
        sym.kind = SymbolKind::CONSTANT;
        if value == ValueKind::EncodedStr {
            sym.value = Some(ValueKind::Str);
            sym.kind |= SymbolKind::ENCODED;
        }
        sym.use_count += 1;
        id
    }

    /// Create an address symbol under the given uniqueness policy.
    ///
    /// `namespace` is the rendered current-namespace prefix; only
    /// [`AddressPolicy::AddUniqueSub`] consults it, for mangling. A
    /// label or sub that already has a definition (nonzero
    /// `lhs_use_count`) is reported as redefined.
    pub fn define_address(
        &mut self,
        syms: &mut SymbolArena,
        name: String,
        policy: AddressPolicy,
        namespace: Option<&str>,
    ) -> Result<SymbolId, SymbolError> {
        if policy == AddressPolicy::AddAll {
            let mut sym = Symbol::new(name, None);
            sym.kind = SymbolKind::ADDRESS;
            let id = syms.alloc(sym);
            self.insert(syms, id);
            return Ok(id);
        }

        let name = if policy == AddressPolicy::AddUniqueSub {
            mangle_sub_name(namespace, name)
        } else {
            name
        };

        if policy != AddressPolicy::AddOnce {
            if let Some(existing) = self.lookup(syms, &name) {
                let sym = &syms[existing];
                if sym.kind == SymbolKind::ADDRESS && sym.lhs_use_count > 0 {
                    return Err(match policy {
                        AddressPolicy::AddUniqueLabel => SymbolError::LabelRedefined { name },
                        _ => SymbolError::SubroutineRedefined { name },
                    });
                }
            }
        }

        let id = self.define(syms, name, None);
        syms[id].kind = SymbolKind::ADDRESS;
        if policy != AddressPolicy::AddOnce {
            syms[id].lhs_use_count += 1;
        }
        Ok(id)
    }
}

impl CompilerContext {
    /// Register symbol in the unit's table.
    pub fn register(
        &mut self,
        unit: &mut CompilationUnit,
        name: String,
        value: ValueKind,
    ) -> SymbolId {
        unit.table.define(&mut self.symbols, name, Some(value))
    }

    /// Fresh compiler-generated temporary register.
    pub fn temp_register(&mut self, unit: &mut CompilationUnit, value: ValueKind) -> SymbolId {
        self.temp_serial += 1;
        let name = format!("__imc_temp_{}", self.temp_serial);
        unit.table.define(&mut self.symbols, name, Some(value))
    }

    /// Literal constant in the global interner.
    pub fn global_constant(&mut self, name: String, value: ValueKind) -> SymbolId {
        self.globals.define_constant(&mut self.symbols, name, value)
    }

    /// Subroutine symbol carrying empty calling-convention metadata.
    pub fn call_sub(&mut self, unit: &mut CompilationUnit, name: String) -> SymbolId {
        let id = unit.table.define(&mut self.symbols, name, None);
        let sym = &mut self.symbols[id];
        sym.kind = SymbolKind::SUB;
        sym.call_meta = Some(Box::default());
        id
    }

    /// Machine register named in assembly form (`I0`, `S31`, ...).
    /// Reuses an existing unit symbol of the same name; otherwise the
    /// value class comes from the leading letter and the color from the
    /// numeric suffix.
    pub fn machine_register(
        &mut self,
        unit: &mut CompilationUnit,
        name: String,
    ) -> Result<SymbolId, SymbolError> {
        if let Some(id) = unit.table.lookup(&self.symbols, &name) {
            return Ok(id);
        }

        let value = name.chars().next().and_then(ValueKind::from_register_letter);
        let number = name.get(1..).and_then(|digits| digits.parse::<i32>().ok());
        match (value, number) {
            (Some(value), Some(number)) if number >= 0 => {
                let id = unit.table.define(&mut self.symbols, name, Some(value));
                let sym = &mut self.symbols[id];
                sym.kind = SymbolKind::MACHINE_REG;
                sym.color = number;
                Ok(id)
            }
            _ => Err(SymbolError::BadMachineRegister { name }),
        }
    }

    /// Namespace-aware address creation: names with a leading
    /// underscore are process-global and marked for fixup.
    pub fn address(
        &mut self,
        unit: &mut CompilationUnit,
        name: String,
        policy: AddressPolicy,
    ) -> Result<SymbolId, SymbolError> {
        let global = name.starts_with('_');
        let ns = self.namespace_prefix();

        let id = if global {
            self.globals
                .define_address(&mut self.symbols, name, policy, ns.as_deref())?
        } else {
            unit.table
                .define_address(&mut self.symbols, name, policy, ns.as_deref())?
        };

        if global {
            self.symbols[id].usage |= UsageFlags::FIXUP;
        }
        Ok(id)
    }

    /// Global subroutine label: unique within the namespace, with a
    /// fixup entry.
    pub fn sub_label(&mut self, name: String) -> Result<SymbolId, SymbolError> {
        let ns = self.namespace_prefix();
        let id = self.globals.define_address(
            &mut self.symbols,
            name,
            AddressPolicy::AddUniqueSub,
            ns.as_deref(),
        )?;
        self.symbols[id].usage |= UsageFlags::FIXUP;
        Ok(id)
    }

    /// Global address referencing a sub: duplicates allowed, with a
    /// fixup entry.
    pub fn sub_address(&mut self, name: String) -> Result<SymbolId, SymbolError> {
        let id = self
            .globals
            .define_address(&mut self.symbols, name, AddressPolicy::AddAll, None)?;
        self.symbols[id].usage |= UsageFlags::FIXUP;
        Ok(id)
    }

    /// Label defined in the unit; redefinition is an error.
    pub fn local_label(
        &mut self,
        unit: &mut CompilationUnit,
        name: String,
    ) -> Result<SymbolId, SymbolError> {
        unit.table
            .define_address(&mut self.symbols, name, AddressPolicy::AddUniqueLabel, None)
    }

    /// Label referenced in the unit (branch operand): lookup-or-create.
    pub fn label_address(
        &mut self,
        unit: &mut CompilationUnit,
        name: String,
    ) -> Result<SymbolId, SymbolError> {
        unit.table
            .define_address(&mut self.symbols, name, AddressPolicy::AddOnce, None)
    }

    /// Namespace-qualified identifier. Records the fullname in the
    /// active namespace frame; a pmc-typed identifier consumes the
    /// pending object class.
    pub fn identifier(
        &mut self,
        unit: &mut CompilationUnit,
        name: String,
        value: ValueKind,
    ) -> SymbolId {
        let fullname = self.namespaces.qualify(name);
        self.namespaces.declare(&fullname);

        let id = unit.table.define(&mut self.symbols, fullname, Some(value));
        let sym = &mut self.symbols[id];
        sym.kind = SymbolKind::IDENTIFIER;
        if value == ValueKind::Pmc {
            sym.pmc_type = self.pending_pmc_type.take();
        }
        id
    }

    /// Identifier whose value must survive across calls.
    pub fn identifier_nonvolatile(
        &mut self,
        unit: &mut CompilationUnit,
        name: String,
        value: ValueKind,
    ) -> SymbolId {
        let id = self.identifier(unit, name, value);
        self.symbols[id].usage |= UsageFlags::NON_VOLATILE;
        id
    }

    /// Typed constant identifier with initializer `init`. Numeric
    /// constants reject string initializers and cast the initializer to
    /// the declared class; pmc constants cannot be global.
    pub fn const_identifier(
        &mut self,
        unit: &mut CompilationUnit,
        name: String,
        value: ValueKind,
        init: SymbolId,
        global: bool,
    ) -> Result<SymbolId, SymbolError> {
        if matches!(value, ValueKind::Int | ValueKind::Num) {
            if self.symbols[init].value == Some(ValueKind::Str) {
                return Err(SymbolError::BadConstInit { name, kind: value });
            }
            self.symbols[init].value = Some(value);
        }

        let id = if global {
            if value == ValueKind::Pmc {
                return Err(SymbolError::GlobalPmcConstant { name });
            }
            self.globals
                .define(&mut self.symbols, name, Some(value))
        } else {
            self.identifier(unit, name, value)
        };

        let sym = &mut self.symbols[id];
        sym.kind = SymbolKind::CONST_PTR;
        sym.origin = Some(init);
        Ok(id)
    }
}
