// src/symbol.rs
//
// The central symbol record and its classification bitsets. A symbol is
// anything the front end names: a register, a literal constant, a
// declared identifier, a branch target, a machine register, or the head
// of a key chain.

use std::fmt;

use bitflags::bitflags;

use crate::arena::SymbolId;
use crate::calls::CallMeta;
use crate::pmc::PmcTypeId;

bitflags! {
    /// Symbol categories and transient per-call-site flags.
    ///
    /// A symbol may carry several bits at once (a key chain head is a
    /// constant that may also be a register key).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolKind: u32 {
        /// Symbolic register, the default for fresh symbols.
        const REGISTER    = 1 << 0;
        /// Literal constant.
        const CONSTANT    = 1 << 1;
        /// Declared (possibly namespace-qualified) identifier.
        const IDENTIFIER  = 1 << 2;
        /// Branch target: label or subroutine address.
        const ADDRESS     = 1 << 3;
        /// Key chain containing at least one register component.
        const REGKEY      = 1 << 4;
        /// Hardware register named directly in assembly form (`I0`).
        const MACHINE_REG = 1 << 5;
        /// Typed constant identifier pointing at its initializer.
        const CONST_PTR   = 1 << 6;
        /// Subroutine carrying calling-convention metadata.
        const SUB         = 1 << 7;

        /// Argument flattens an aggregate at the call site.
        const FLAT        = 1 << 8;
        /// Argument may be omitted at the call site.
        const OPTIONAL    = 1 << 9;
        /// Argument receives the was-an-optional-passed flag.
        const OPT_FLAG    = 1 << 10;
        /// Argument is passed by name.
        const NAMED       = 1 << 11;
        /// String literal written with an explicit charset prefix.
        const ENCODED     = 1 << 12;

        /// Key component opens a slice.
        const SLICE_START     = 1 << 13;
        /// Key component closes a slice.
        const SLICE_END       = 1 << 14;
        /// Open-ended range start (`..n`).
        const RANGE_FROM_ZERO = 1 << 15;
        /// Open-ended range end (`n..`).
        const RANGE_TO_END    = 1 << 16;
    }
}

impl SymbolKind {
    /// Categories that occupy an allocatable register.
    pub const NEEDS_REGISTER: Self = Self::REGISTER
        .union(Self::IDENTIFIER)
        .union(Self::REGKEY);

    /// Slice markers a key component can carry.
    pub const SLICE_MARKERS: Self = Self::SLICE_START
        .union(Self::SLICE_END)
        .union(Self::RANGE_FROM_ZERO)
        .union(Self::RANGE_TO_END);

    /// Per-call-site flags stripped from a shared symbol once its
    /// snapshot is recorded in call metadata.
    pub const CALL_SITE_FLAGS: Self = Self::FLAT
        .union(Self::OPTIONAL)
        .union(Self::OPT_FLAG)
        .union(Self::NAMED);
}

bitflags! {
    /// Usage hints consumed by later passes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UsageFlags: u8 {
        /// Value must survive across calls.
        const NON_VOLATILE = 1 << 0;
        /// Address needs a fixup entry at emission time.
        const FIXUP        = 1 << 1;
    }
}

/// Coarse value domain of a symbol.
///
/// Participates in dedup identity (two symbols may share a name when
/// their value classes differ) and drives downstream code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Num,
    Str,
    /// Charset-qualified string literal as written; normalized to `Str`
    /// (plus the ENCODED flag) when interned as a constant.
    EncodedStr,
    Pmc,
    Key,
}

impl ValueKind {
    /// Value class of a machine-register name's leading letter.
    pub fn from_register_letter(letter: char) -> Option<Self> {
        match letter {
            'I' => Some(Self::Int),
            'N' => Some(Self::Num),
            'S' => Some(Self::Str),
            'P' => Some(Self::Pmc),
            _ => None,
        }
    }

    /// Single-letter tag used in dumps.
    pub fn letter(self) -> char {
        match self {
            Self::Int => 'I',
            Self::Num => 'N',
            Self::Str => 'S',
            Self::EncodedStr => 'U',
            Self::Pmc => 'P',
            Self::Key => 'K',
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "int",
            Self::Num => "num",
            Self::Str => "string",
            Self::EncodedStr => "encoded string",
            Self::Pmc => "pmc",
            Self::Key => "key",
        })
    }
}

/// A named entity in the front end.
///
/// `color` and `want_reg` belong to the external register allocator;
/// this crate only initializes them. `key_parts` is the chain relation
/// (owned by the chain head) and is kept separate from table membership,
/// which the owning table's buckets track.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub value: Option<ValueKind>,
    /// Allocated register slot; [`Symbol::UNASSIGNED`] until coloring.
    pub color: i32,
    /// Requested register hint; [`Symbol::UNASSIGNED`] when absent.
    pub want_reg: i32,
    pub use_count: u32,
    /// Definition-side uses; gates label/sub redefinition checks.
    pub lhs_use_count: u32,
    pub usage: UsageFlags,
    /// Deep-copied components of a key chain, in access order. Empty
    /// for anything that is not a chain head.
    pub key_parts: Vec<SymbolId>,
    /// Non-owning back-reference, read-only outside this crate: for a
    /// key-chain copy the original register (consulted by liveness and
    /// coloring), for a typed constant its initializer, for a unit
    /// namespace alias the declared namespace key.
    pub origin: Option<SymbolId>,
    /// Calling-convention metadata, present only on SUB symbols.
    pub call_meta: Option<Box<CallMeta>>,
    /// Object class, present only on pmc-typed identifiers.
    pub pmc_type: Option<PmcTypeId>,
}

impl Symbol {
    /// Sentinel for `color` and `want_reg` before allocation.
    pub const UNASSIGNED: i32 = -1;

    /// Fresh register symbol; creation paths retag `kind` afterwards.
    pub fn new(name: String, value: Option<ValueKind>) -> Self {
        Self {
            name,
            kind: SymbolKind::REGISTER,
            value,
            color: Self::UNASSIGNED,
            want_reg: Self::UNASSIGNED,
            use_count: 0,
            lhs_use_count: 0,
            usage: UsageFlags::empty(),
            key_parts: Vec::new(),
            origin: None,
            call_meta: None,
            pmc_type: None,
        }
    }

    /// True for mutable register categories the allocator must color.
    pub fn needs_register(&self) -> bool {
        self.kind.intersects(SymbolKind::NEEDS_REGISTER)
    }

    pub fn is_key_chain(&self) -> bool {
        !self.key_parts.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = self.value.map_or('-', ValueKind::letter);
        write!(
            f,
            "symbol [{}] set [{}] color [{}] kind [",
            self.name, set, self.color
        )?;
        for (i, (name, _)) in self.kind.iter_names().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
        }
        f.write_str("]")
    }
}
