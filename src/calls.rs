// src/calls.rs
//
// Per-subroutine calling-convention metadata. Lists only accrete; each
// appended symbol's per-call-site flags are snapshotted into a parallel
// list and then stripped from the symbol, which may be reused with
// different flags at other call sites.

use smallvec::SmallVec;

use crate::arena::SymbolId;
use crate::context::CompilerContext;
use crate::symbol::SymbolKind;

/// Most subs take few arguments.
type SymVec = SmallVec<[SymbolId; 8]>;
type FlagVec = SmallVec<[SymbolKind; 8]>;

/// Calling-convention record owned by exactly one SUB symbol.
#[derive(Debug, Clone, Default)]
pub struct CallMeta {
    args: SymVec,
    arg_flags: FlagVec,
    results: SymVec,
    result_flags: FlagVec,
    multi: SmallVec<[Option<SymbolId>; 4]>,
    target: Option<SymbolId>,
    conv: Option<SymbolId>,
}

impl CallMeta {
    pub fn args(&self) -> &[SymbolId] {
        &self.args
    }

    /// Flag snapshots parallel to `args`, taken before stripping.
    pub fn arg_flags(&self) -> &[SymbolKind] {
        &self.arg_flags
    }

    pub fn results(&self) -> &[SymbolId] {
        &self.results
    }

    /// Flag snapshots parallel to `results`, taken before stripping.
    pub fn result_flags(&self) -> &[SymbolKind] {
        &self.result_flags
    }

    /// Multi-dispatch signature entries; `None` marks a wildcard
    /// position.
    pub fn multi(&self) -> &[Option<SymbolId>] {
        &self.multi
    }

    pub fn target(&self) -> Option<SymbolId> {
        self.target
    }

    pub fn convention(&self) -> Option<SymbolId> {
        self.conv
    }
}

impl CompilerContext {
    fn call_meta_mut(&mut self, sub: SymbolId) -> &mut CallMeta {
        let sym = &mut self.symbols[sub];
        match sym.call_meta {
            Some(ref mut meta) => meta,
            None => panic!("symbol '{}' has no call metadata", sym.name),
        }
    }

    /// Append a call argument, snapshotting its per-site flags.
    ///
    /// The shared argument symbol is stripped of FLAT/OPTIONAL/
    /// OPT_FLAG/NAMED afterwards so other call sites can set their own.
    pub fn add_call_arg(&mut self, sub: SymbolId, arg: SymbolId) {
        let snapshot = self.symbols[arg].kind;
        self.symbols[arg].kind.remove(SymbolKind::CALL_SITE_FLAGS);

        let meta = self.call_meta_mut(sub);
        meta.args.push(arg);
        meta.arg_flags.push(snapshot);
    }

    /// Append a call result; same snapshot-and-strip contract as
    /// [`CompilerContext::add_call_arg`].
    pub fn add_call_result(&mut self, sub: SymbolId, result: SymbolId) {
        let snapshot = self.symbols[result].kind;
        self.symbols[result].kind.remove(SymbolKind::CALL_SITE_FLAGS);

        let meta = self.call_meta_mut(sub);
        meta.results.push(result);
        meta.result_flags.push(snapshot);
    }

    /// Append a multi-dispatch signature entry (`None` = wildcard).
    pub fn add_call_multi(&mut self, sub: SymbolId, entry: Option<SymbolId>) {
        self.call_meta_mut(sub).multi.push(entry);
    }

    /// Set the called sub; overwrites any previous target.
    pub fn set_call_target(&mut self, sub: SymbolId, target: SymbolId) {
        self.call_meta_mut(sub).target = Some(target);
    }

    /// Set the calling-convention symbol; overwrites any previous one.
    pub fn set_call_convention(&mut self, sub: SymbolId, conv: SymbolId) {
        self.call_meta_mut(sub).conv = Some(conv);
    }
}
