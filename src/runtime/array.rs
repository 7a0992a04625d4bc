//! Fixed-length heap arrays
//!
//! A [`TaggedArray`] is a run of tagged slots. Its length is fixed at
//! allocation: growing or shrinking means allocating a new array and
//! copying, see [`crate::factory::arrays`]. Unused tail slots hold the hole
//! value, so sparse contents survive a copy unchanged.

use crate::runtime::object::JSType;
use crate::value::Value;

/// Maximum array length (2^30 - 1)
pub const MAX_ARRAY_LENGTH: usize = (1 << 30) - 1;

/// Array of tagged values
#[derive(Debug, Clone)]
pub struct TaggedArray {
    kind: JSType,
    elements: Box<[Value]>,
}

impl TaggedArray {
    /// Creates an array of `len` slots set to `init`
    pub fn new(kind: JSType, len: usize, init: Value) -> Self {
        debug_assert!(matches!(
            kind,
            JSType::TaggedArray | JSType::CowTaggedArray | JSType::LexicalEnv | JSType::ConstantPool
        ));
        debug_assert!(len <= MAX_ARRAY_LENGTH);
        TaggedArray {
            kind,
            elements: vec![init; len].into_boxed_slice(),
        }
    }

    pub fn from_values(kind: JSType, values: Vec<Value>) -> Self {
        debug_assert!(values.len() <= MAX_ARRAY_LENGTH);
        TaggedArray {
            kind,
            elements: values.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn kind(&self) -> JSType {
        self.kind
    }

    /// Copy-on-write arrays are shared and must be copied before writing
    #[inline]
    pub fn is_cow(&self) -> bool {
        self.kind == JSType::CowTaggedArray
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Slot `index`; out-of-range reads are an invariant violation.
    #[inline]
    pub fn get(&self, index: usize) -> Value {
        self.elements[index]
    }

    #[inline]
    pub fn try_get(&self, index: usize) -> Option<Value> {
        self.elements.get(index).copied()
    }

    /// Raw slot store; heap-level writes go through
    /// [`Context::array_set`](crate::Context::array_set) so the write barrier
    /// sees them.
    #[inline]
    pub fn set(&mut self, index: usize, value: Value) {
        self.elements[index] = value;
    }

    #[inline]
    pub fn as_slice(&self) -> &[Value] {
        &self.elements
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Value] {
        &mut self.elements
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        self.elements.iter().copied()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Value> + '_ {
        self.elements.iter_mut()
    }

    /// Number of slots that are not holes
    pub fn count_present(&self) -> usize {
        self.elements.iter().filter(|v| !v.is_hole()).count()
    }

    /// First index of `value` (tagged identity) at or after `from`
    pub fn index_of(&self, value: Value, from: usize) -> Option<usize> {
        (from..self.len()).find(|&i| self.elements[i] == value)
    }

    /// Last index of `value` at or before `from`
    pub fn last_index_of(&self, value: Value, from: usize) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let start = from.min(self.len() - 1);
        (0..=start).rev().find(|&i| self.elements[i] == value)
    }
}

/// Raw byte storage with typed element access
///
/// Elements are stored little-endian at `index * size`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteArray {
    bytes: Vec<u8>,
}

impl ByteArray {
    pub fn new(len: usize) -> Self {
        ByteArray {
            bytes: vec![0; len],
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        ByteArray { bytes }
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
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Reads the `size`-byte element at `index` (size 1, 2, 4 or 8)
    pub fn get_element(&self, index: usize, size: usize) -> Option<u64> {
        debug_assert!(matches!(size, 1 | 2 | 4 | 8));
        let start = index.checked_mul(size)?;
        let chunk = self.bytes.get(start..start.checked_add(size)?)?;
        let mut buf = [0u8; 8];
        buf[..size].copy_from_slice(chunk);
        Some(u64::from_le_bytes(buf))
    }

    /// Writes the low `size` bytes of `value` at element `index`
    pub fn set_element(&mut self, index: usize, size: usize, value: u64) -> bool {
        debug_assert!(matches!(size, 1 | 2 | 4 | 8));
        let Some(start) = index.checked_mul(size) else {
            return false;
        };
        let Some(chunk) = self.bytes.get_mut(start..start + size) else {
            return false;
        };
        chunk.copy_from_slice(&value.to_le_bytes()[..size]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(values: &[i32]) -> TaggedArray {
        TaggedArray::from_values(
            JSType::TaggedArray,
            values.iter().map(|&i| Value::int(i)).collect(),
        )
    }

    #[test]
    fn test_new_fills_with_init() {
        let arr = TaggedArray::new(JSType::TaggedArray, 3, Value::hole());
        assert_eq!(arr.len(), 3);
        assert!(arr.iter().all(|v| v.is_hole()));
        assert_eq!(arr.count_present(), 0);
        assert!(!arr.is_cow());
    }

    #[test]
    fn test_get_set() {
        let mut arr = TaggedArray::new(JSType::TaggedArray, 2, Value::undefined());
        arr.set(1, Value::int(30));
        assert_eq!(arr.get(1), Value::int(30));
        assert!(arr.get(0).is_undefined());
        assert_eq!(arr.try_get(2), None);
    }

    #[test]
    fn test_index_of() {
        let arr = array(&[1, 2, 3, 2]);
        assert_eq!(arr.index_of(Value::int(2), 0), Some(1));
        assert_eq!(arr.index_of(Value::int(2), 2), Some(3));
        assert_eq!(arr.index_of(Value::int(5), 0), None);
        assert_eq!(arr.last_index_of(Value::int(2), 3), Some(3));
        assert_eq!(arr.last_index_of(Value::int(2), 2), Some(1));
        assert_eq!(array(&[]).last_index_of(Value::int(2), 0), None);
    }

    #[test]
    fn test_byte_array_elements() {
        let mut bytes = ByteArray::new(8);
        assert!(bytes.set_element(1, 2, 0xBEEF));
        assert_eq!(bytes.get_element(1, 2), Some(0xBEEF));
        assert_eq!(bytes.as_bytes()[2..4], [0xEF, 0xBE]);
        assert!(bytes.set_element(0, 4, 0x1_0000_0001));
        assert_eq!(bytes.get_element(0, 4), Some(1));
        assert!(!bytes.set_element(2, 4, 0));
        assert_eq!(bytes.get_element(1, 8), None);
    }
}
