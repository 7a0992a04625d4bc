//! Tagged value representation
//!
//! A `Value` is a single 64-bit word. The top 16 bits decide whether the word
//! is a number; below that, heap addresses and the special singletons share
//! the remaining encodings.
//!
//! # Value encoding
//! ```text
//! Heap address  [0x0000] [--- 48 bit address ---]  low bits 000 (bit 0 set = weak)
//! Int32         [0xFFFF] [0x0000] [--- int32 ---]
//! Double        [0x0001 .. 0xFFFE] [ IEEE bits + 2^48 ]
//! Specials      undefined 0x02, null 0x03, hole 0x05,
//!               false 0x06, true 0x07, exception 0x0A
//! ```
//!
//! Doubles are stored with an offset of 2^48 added to their bit pattern, so
//! no double ever has its top 16 bits equal to `0x0000` or `0xFFFF`. NaN is
//! canonicalized before encoding, otherwise a negative quiet NaN would wrap
//! into the heap range.

use std::cmp::Ordering;
use std::fmt;

use crate::gc::Address;

/// Raw tagged word
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawValue(pub u64);

impl RawValue {
    pub const TAG_MARK: u64 = 0xFFFF_0000_0000_0000;
    pub const TAG_INT: u64 = Self::TAG_MARK;
    pub const DOUBLE_ENCODE_OFFSET: u64 = 1 << 48;

    pub const TAG_WEAK: u64 = 0x01;
    pub const TAG_NULL: u64 = 0x01;
    pub const TAG_SPECIAL: u64 = 0x02;
    pub const TAG_BOOLEAN: u64 = 0x04;
    pub const TAG_EXCEPTION: u64 = 0x08;

    /// Bits that must all be clear for a word to be a heap address.
    pub const TAG_HEAP_OBJECT_MASK: u64 = Self::TAG_MARK | Self::TAG_SPECIAL | Self::TAG_BOOLEAN;

    pub const UNDEFINED: RawValue = RawValue(Self::TAG_SPECIAL);
    pub const NULL: RawValue = RawValue(Self::TAG_SPECIAL | Self::TAG_NULL);
    pub const HOLE: RawValue = RawValue(Self::TAG_BOOLEAN | Self::TAG_NULL);
    pub const FALSE: RawValue = RawValue(Self::TAG_SPECIAL | Self::TAG_BOOLEAN);
    pub const TRUE: RawValue = RawValue(Self::TAG_SPECIAL | Self::TAG_BOOLEAN | 0x01);
    pub const EXCEPTION: RawValue = RawValue(Self::TAG_SPECIAL | Self::TAG_EXCEPTION);

    /// Bit pattern of the canonical NaN before the double offset is applied.
    pub const CANONICAL_NAN_BITS: u64 = 0x7FF8_0000_0000_0000;

    #[inline]
    pub const fn from_i32(val: i32) -> Self {
        RawValue(Self::TAG_INT | (val as u32 as u64))
    }

    #[inline]
    pub fn from_f64(val: f64) -> Self {
        let bits = if val.is_nan() {
            Self::CANONICAL_NAN_BITS
        } else {
            val.to_bits()
        };
        RawValue(bits.wrapping_add(Self::DOUBLE_ENCODE_OFFSET))
    }

    #[inline]
    pub const fn from_address(addr: Address) -> Self {
        RawValue(addr.raw())
    }

    #[inline]
    pub const fn is_int(self) -> bool {
        (self.0 & Self::TAG_MARK) == Self::TAG_INT
    }

    #[inline]
    pub const fn is_double(self) -> bool {
        let top = self.0 & Self::TAG_MARK;
        top != 0 && top != Self::TAG_INT
    }

    #[inline]
    pub const fn is_number(self) -> bool {
        (self.0 & Self::TAG_MARK) != 0
    }

    /// Strong or weak heap address.
    #[inline]
    pub const fn is_heap_object(self) -> bool {
        (self.0 & Self::TAG_HEAP_OBJECT_MASK) == 0 && (self.0 & !Self::TAG_WEAK) != 0
    }

    #[inline]
    pub const fn is_weak(self) -> bool {
        self.is_heap_object() && (self.0 & Self::TAG_WEAK) != 0
    }

    #[inline]
    pub const fn is_special(self) -> bool {
        matches!(self.0, 0x02 | 0x03 | 0x05 | 0x06 | 0x07 | 0x0A)
    }

    #[inline]
    pub const fn get_int(self) -> i32 {
        self.0 as u32 as i32
    }

    #[inline]
    pub fn get_double(self) -> f64 {
        f64::from_bits(self.0.wrapping_sub(Self::DOUBLE_ENCODE_OFFSET))
    }

    /// Address with the weak bit stripped.
    #[inline]
    pub const fn get_address(self) -> Address {
        Address::from_raw(self.0 & !Self::TAG_WEAK)
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RawValue::UNDEFINED => write!(f, "Undefined"),
            RawValue::NULL => write!(f, "Null"),
            RawValue::HOLE => write!(f, "Hole"),
            RawValue::TRUE => write!(f, "Bool(true)"),
            RawValue::FALSE => write!(f, "Bool(false)"),
            RawValue::EXCEPTION => write!(f, "Exception"),
            v if v.is_int() => write!(f, "Int({})", v.get_int()),
            v if v.is_double() => write!(f, "Double({:?})", v.get_double()),
            v if v.is_weak() => write!(f, "Weak({:#x})", v.get_address().raw()),
            v if v.is_heap_object() => write!(f, "Heap({:#x})", v.0),
            v => write!(f, "Raw({:#x})", v.0),
        }
    }
}

/// Decoded view of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaggedValue {
    Int(i32),
    Double(f64),
    Bool(bool),
    Undefined,
    Null,
    Hole,
    Exception,
    Heap(Address),
    Weak(Address),
}

/// A tagged JavaScript value
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Value(pub RawValue);

impl Value {
    #[inline]
    pub const fn undefined() -> Self {
        Value(RawValue::UNDEFINED)
    }

    #[inline]
    pub const fn null() -> Self {
        Value(RawValue::NULL)
    }

    /// Marker for a deliberately absent element
    #[inline]
    pub const fn hole() -> Self {
        Value(RawValue::HOLE)
    }

    #[inline]
    pub const fn exception() -> Self {
        Value(RawValue::EXCEPTION)
    }

    #[inline]
    pub const fn bool(b: bool) -> Self {
        if b {
            Value(RawValue::TRUE)
        } else {
            Value(RawValue::FALSE)
        }
    }

    #[inline]
    pub const fn int(val: i32) -> Self {
        Value(RawValue::from_i32(val))
    }

    /// Always uses the double encoding
    #[inline]
    pub fn double(val: f64) -> Self {
        Value(RawValue::from_f64(val))
    }

    /// Uses the int encoding when `val` is an integral int32 other than -0.
    pub fn number(val: f64) -> Self {
        match f64_as_int32(val) {
            Some(i) => Value::int(i),
            None => Value::double(val),
        }
    }

    #[inline]
    pub const fn from_address(addr: Address) -> Self {
        Value(RawValue::from_address(addr))
    }

    #[inline]
    pub const fn is_undefined(self) -> bool {
        self.0.0 == RawValue::UNDEFINED.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0.0 == RawValue::NULL.0
    }

    #[inline]
    pub const fn is_nullish(self) -> bool {
        self.is_undefined() || self.is_null()
    }

    #[inline]
    pub const fn is_hole(self) -> bool {
        self.0.0 == RawValue::HOLE.0
    }

    #[inline]
    pub const fn is_exception(self) -> bool {
        self.0.0 == RawValue::EXCEPTION.0
    }

    #[inline]
    pub const fn is_boolean(self) -> bool {
        self.0.0 == RawValue::TRUE.0 || self.0.0 == RawValue::FALSE.0
    }

    #[inline]
    pub const fn is_true(self) -> bool {
        self.0.0 == RawValue::TRUE.0
    }

    #[inline]
    pub const fn is_false(self) -> bool {
        self.0.0 == RawValue::FALSE.0
    }

    #[inline]
    pub const fn is_special(self) -> bool {
        self.0.is_special()
    }

    #[inline]
    pub const fn is_int(self) -> bool {
        self.0.is_int()
    }

    #[inline]
    pub const fn is_double(self) -> bool {
        self.0.is_double()
    }

    #[inline]
    pub const fn is_number(self) -> bool {
        self.0.is_number()
    }

    /// Strong or weak heap reference
    #[inline]
    pub const fn is_heap_object(self) -> bool {
        self.0.is_heap_object()
    }

    #[inline]
    pub const fn is_weak(self) -> bool {
        self.0.is_weak()
    }

    #[inline]
    pub const fn is_strong(self) -> bool {
        self.0.is_heap_object() && !self.0.is_weak()
    }

    #[inline]
    pub const fn to_bool(self) -> Option<bool> {
        if self.is_boolean() {
            Some(self.is_true())
        } else {
            None
        }
    }

    #[inline]
    pub const fn to_i32(self) -> Option<i32> {
        if self.is_int() {
            Some(self.0.get_int())
        } else {
            None
        }
    }

    #[inline]
    pub fn to_f64(self) -> Option<f64> {
        if self.is_int() {
            Some(self.0.get_int() as f64)
        } else if self.is_double() {
            Some(self.0.get_double())
        } else {
            None
        }
    }

    /// Address of a strong reference
    #[inline]
    pub const fn to_address(self) -> Option<Address> {
        if self.is_strong() {
            Some(self.0.get_address())
        } else {
            None
        }
    }

    /// Address of a strong or weak reference, with the weak bit cleared.
    #[inline]
    pub const fn heap_address(self) -> Option<Address> {
        if self.is_heap_object() {
            Some(self.0.get_address())
        } else {
            None
        }
    }

    /// Non-owning view of the same heap object
    #[inline]
    pub const fn create_weak(self) -> Self {
        debug_assert!(self.is_heap_object());
        Value(RawValue(self.0.0 | RawValue::TAG_WEAK))
    }

    /// Strips the weak bit without checking liveness; use
    /// [`Heap::upgrade_weak`](crate::gc::Heap::upgrade_weak) for that.
    #[inline]
    pub const fn weak_to_strong(self) -> Self {
        debug_assert!(self.is_heap_object());
        Value(RawValue(self.0.0 & !RawValue::TAG_WEAK))
    }

    pub fn unpack(self) -> TaggedValue {
        match self.0 {
            RawValue::UNDEFINED => TaggedValue::Undefined,
            RawValue::NULL => TaggedValue::Null,
            RawValue::HOLE => TaggedValue::Hole,
            RawValue::EXCEPTION => TaggedValue::Exception,
            RawValue::TRUE => TaggedValue::Bool(true),
            RawValue::FALSE => TaggedValue::Bool(false),
            raw if raw.is_int() => TaggedValue::Int(raw.get_int()),
            raw if raw.is_double() => TaggedValue::Double(raw.get_double()),
            raw if raw.is_weak() => TaggedValue::Weak(raw.get_address()),
            raw if raw.is_heap_object() => TaggedValue::Heap(raw.get_address()),
            raw => unreachable!("invalid tagged value {:#x}", raw.0),
        }
    }

    /// Key form of this value, ordered and hashed consistently with SameValue.
    #[inline]
    pub fn key(self) -> ValueKey {
        ValueKey::new(self)
    }

    /// SameValue over the tagged bits: `+0` and `-0` differ, NaN equals
    /// itself, an integral double equals the same int. Heap references
    /// compare by identity.
    pub fn same_value(self, other: Value) -> bool {
        self.key() == other.key()
    }

    /// Like [`same_value`](Self::same_value) but `+0` equals `-0`.
    pub fn same_value_zero(self, other: Value) -> bool {
        match (self.to_f64(), other.to_f64()) {
            (Some(a), Some(b)) if a == 0.0 && b == 0.0 => true,
            _ => self.same_value(other),
        }
    }

    #[inline]
    pub const fn raw(self) -> RawValue {
        self.0
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::undefined()
    }
}

impl From<TaggedValue> for Value {
    fn from(tagged: TaggedValue) -> Self {
        match tagged {
            TaggedValue::Int(i) => Value::int(i),
            TaggedValue::Double(d) => Value::double(d),
            TaggedValue::Bool(b) => Value::bool(b),
            TaggedValue::Undefined => Value::undefined(),
            TaggedValue::Null => Value::null(),
            TaggedValue::Hole => Value::hole(),
            TaggedValue::Exception => Value::exception(),
            TaggedValue::Heap(addr) => Value::from_address(addr),
            TaggedValue::Weak(addr) => Value::from_address(addr).create_weak(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::number(d)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unpack() {
            TaggedValue::Int(i) => write!(f, "{}", i),
            TaggedValue::Double(d) => write!(f, "{}", d),
            TaggedValue::Bool(b) => write!(f, "{}", b),
            TaggedValue::Undefined => write!(f, "undefined"),
            TaggedValue::Null => write!(f, "null"),
            TaggedValue::Hole => write!(f, "[hole]"),
            TaggedValue::Exception => write!(f, "[exception]"),
            TaggedValue::Heap(addr) => write!(f, "[object {:#x}]", addr.raw()),
            TaggedValue::Weak(addr) => write!(f, "[weak {:#x}]", addr.raw()),
        }
    }
}

/// Returns the int32 a double can be stored as, if any.
#[inline]
pub fn f64_as_int32(val: f64) -> Option<i32> {
    let i = val as i32;
    if i as f64 == val && !(i == 0 && val.is_sign_negative()) {
        Some(i)
    } else {
        None
    }
}

/// Ordered, hashable key for a [`Value`]
///
/// Two values map to the same key exactly when they are SameValue at the
/// tagged level. Weak references key as their strong counterpart.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueKey(u64);

impl ValueKey {
    pub fn new(value: Value) -> Self {
        let raw = value.0;
        if raw.is_double() {
            let d = raw.get_double();
            if let Some(i) = f64_as_int32(d) {
                return ValueKey(RawValue::from_i32(i).0);
            }
            return ValueKey(RawValue::from_f64(d).0);
        }
        if raw.is_weak() {
            return ValueKey(raw.0 & !RawValue::TAG_WEAK);
        }
        ValueKey(raw.0)
    }

    #[inline]
    pub const fn value(self) -> Value {
        Value(RawValue(self.0))
    }
}

impl Ord for ValueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for ValueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueKey({:?})", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::SpaceKind;

    #[test]
    fn test_specials() {
        assert!(Value::undefined().is_undefined());
        assert!(Value::null().is_null());
        assert!(Value::hole().is_hole());
        assert!(Value::exception().is_exception());
        for v in [
            Value::undefined(),
            Value::null(),
            Value::hole(),
            Value::exception(),
            Value::bool(true),
            Value::bool(false),
        ] {
            assert!(v.is_special());
            assert!(!v.is_heap_object());
            assert!(!v.is_number());
        }
        assert!(!Value::hole().is_undefined());
        assert_eq!(Value::null().to_bool(), None);
    }

    #[test]
    fn test_bool() {
        assert!(Value::bool(true).is_true());
        assert!(Value::bool(false).is_false());
        assert_eq!(Value::bool(true).to_bool(), Some(true));
        assert_eq!(Value::bool(false).to_bool(), Some(false));
    }

    #[test]
    fn test_int() {
        for i in [0, 1, -1, 42, i32::MAX, i32::MIN] {
            let v = Value::int(i);
            assert!(v.is_int());
            assert!(v.is_number());
            assert!(!v.is_double());
            assert_eq!(v.to_i32(), Some(i));
        }
    }

    #[test]
    fn test_double() {
        for d in [0.5, -0.0, 1e300, -1e-300, f64::INFINITY, f64::NEG_INFINITY, f64::MAX] {
            let v = Value::double(d);
            assert!(v.is_double());
            assert!(!v.is_heap_object());
            assert_eq!(v.to_f64().map(f64::to_bits), Some(d.to_bits()));
        }
    }

    #[test]
    fn test_nan_is_canonical() {
        let negative_nan = f64::from_bits(0xFFF8_0000_0000_0001);
        let v = Value::double(negative_nan);
        assert!(v.is_double());
        assert!(!v.is_heap_object());
        assert!(v.to_f64().is_some_and(f64::is_nan));
        assert_eq!(v, Value::double(f64::NAN));
    }

    #[test]
    fn test_number_prefers_int() {
        assert!(Value::number(3.0).is_int());
        assert!(Value::number(-0.0).is_double());
        assert!(Value::number(0.5).is_double());
        assert!(Value::number(4294967296.0).is_double());
    }

    #[test]
    fn test_heap_address() {
        let addr = Address::new(SpaceKind::Young, 7);
        let v = Value::from_address(addr);
        assert!(v.is_heap_object());
        assert!(v.is_strong());
        assert!(!v.is_weak());
        assert!(!v.is_number());
        assert!(!v.is_special());
        assert_eq!(v.to_address(), Some(addr));

        let weak = v.create_weak();
        assert!(weak.is_weak());
        assert!(weak.is_heap_object());
        assert_eq!(weak.to_address(), None);
        assert_eq!(weak.heap_address(), Some(addr));
        assert_eq!(weak.weak_to_strong(), v);
    }

    #[test]
    fn test_unpack_round_trip() {
        let addr = Address::new(SpaceKind::Old, 3);
        for tagged in [
            TaggedValue::Int(-5),
            TaggedValue::Double(2.5),
            TaggedValue::Bool(true),
            TaggedValue::Undefined,
            TaggedValue::Null,
            TaggedValue::Hole,
            TaggedValue::Exception,
            TaggedValue::Heap(addr),
            TaggedValue::Weak(addr),
        ] {
            assert_eq!(Value::from(tagged).unpack(), tagged);
        }
    }

    #[test]
    fn test_same_value() {
        assert!(Value::double(f64::NAN).same_value(Value::double(f64::NAN)));
        assert!(!Value::double(0.0).same_value(Value::double(-0.0)));
        assert!(Value::int(0).same_value(Value::double(0.0)));
        assert!(!Value::int(0).same_value(Value::double(-0.0)));
        assert!(Value::int(0).same_value_zero(Value::double(-0.0)));
        assert!(Value::int(7).same_value(Value::double(7.0)));
        assert!(!Value::int(7).same_value(Value::undefined()));
    }

    #[test]
    fn test_value_key_ordering() {
        let mut keys = vec![
            Value::double(2.0).key(),
            Value::int(2).key(),
            Value::double(f64::NAN).key(),
            Value::double(f64::NAN).key(),
            Value::double(-0.0).key(),
        ];
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 3);
        let a = Value::int(1).key();
        let b = Value::undefined().key();
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn test_raw_value_debug() {
        assert_eq!(format!("{:?}", RawValue::NULL), "Null");
        assert_eq!(format!("{:?}", RawValue::UNDEFINED), "Undefined");
        assert_eq!(format!("{:?}", RawValue::TRUE), "Bool(true)");
        assert_eq!(format!("{:?}", RawValue::from_i32(42)), "Int(42)");
        assert_eq!(format!("{}", Value::int(-3)), "-3");
    }
}
