//! Strings, symbols and the string table
//!
//! Strings are immutable UTF-8 byte runs with a precomputed hash. Every
//! string the factory creates is interned through the [`StringTable`], so
//! two string values are equal exactly when their addresses are, and a
//! string can be used directly as a property key.

use bitflags::bitflags;
use hashbrown::HashMap;

use crate::gc::{Address, Heap};
use crate::value::Value;

/// Heap string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcmaString {
    bytes: Box<[u8]>,
    hash: u32,
    is_ascii: bool,
}

impl EcmaString {
    pub fn new(bytes: &[u8]) -> Self {
        EcmaString {
            bytes: bytes.into(),
            hash: hash_string(bytes),
            is_ascii: bytes.is_ascii(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Every byte is below 0x80
    #[inline]
    pub fn is_ascii(&self) -> bool {
        self.is_ascii
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content as text; only strings built from `&str` or ASCII bytes exist,
    /// so this is lossless.
    pub fn to_string_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Array index this string spells, if any
    pub fn array_index(&self) -> Option<u32> {
        std::str::from_utf8(&self.bytes).ok().and_then(is_array_index)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SymbolFlags: u8 {
        /// Not observable from script: used for internal slots
        const PRIVATE = 1 << 0;
        /// Registered in the global symbol registry
        const WELL_KNOWN = 1 << 1;
    }
}

/// Heap symbol
#[derive(Debug, Clone)]
pub struct JSSymbol {
    description: Value,
    hash: u32,
    flags: SymbolFlags,
}

impl JSSymbol {
    /// `description` is a string value or undefined
    pub fn new(description: Value, hash: u32, flags: SymbolFlags) -> Self {
        JSSymbol {
            description,
            hash,
            flags,
        }
    }

    #[inline]
    pub fn description(&self) -> Value {
        self.description
    }

    #[inline]
    pub(crate) fn description_mut(&mut self) -> &mut Value {
        &mut self.description
    }

    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    #[inline]
    pub fn flags(&self) -> SymbolFlags {
        self.flags
    }

    #[inline]
    pub fn is_private(&self) -> bool {
        self.flags.contains(SymbolFlags::PRIVATE)
    }
}

/// Hash of a byte string (`h * 31 + b`)
#[inline]
pub fn hash_string(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |h, &b| h.wrapping_mul(31).wrapping_add(b as u32))
}

/// Check if a string represents a valid array index
#[inline]
pub fn is_array_index(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }

    // Fast path for single digits
    if s.len() == 1 {
        let b = s.as_bytes()[0];
        if b.is_ascii_digit() {
            return Some((b - b'0') as u32);
        }
        return None;
    }

    // Leading zeros are not valid (except "0")
    if s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    s.parse::<u32>().ok().filter(|&n| n < u32::MAX)
}

/// Interned strings by content
///
/// Interned strings live in the old space, so their addresses stay fixed
/// for as long as they are alive. The table does not keep them alive: after
/// a collection [`sweep`](Self::sweep) drops entries whose string was freed.
#[derive(Default)]
pub struct StringTable {
    strings: HashMap<Box<[u8]>, Address, ahash::RandomState>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    #[inline]
    pub fn lookup(&self, bytes: &[u8]) -> Option<Address> {
        self.strings.get(bytes).copied()
    }

    pub fn insert(&mut self, bytes: &[u8], addr: Address) {
        self.strings.insert(bytes.into(), addr);
    }

    /// Removes entries for freed strings; returns how many were dropped.
    pub fn sweep(&mut self, heap: &Heap) -> usize {
        let before = self.strings.len();
        self.strings.retain(|_, addr| heap.is_live(*addr));
        before - self.strings.len()
    }
}
