//! Hashed property tables
//!
//! One chained hash table serves three heap kinds:
//! - name dictionaries, the property store of dictionary-mode objects
//! - number dictionaries, the element store of sparse arrays
//! - linked hash tables, the backing store of Map, Set and their weak
//!   variants
//!
//! Keys are compared by [`ValueKey`] (SameValue over tagged bits; strings
//! are interned, so identity is content equality). Entries are appended in
//! insertion order and deletion leaves a tombstone, so iteration order is
//! insertion order. The bucket index hashes raw key bits, which change when
//! a young key object moves: the collector calls
//! [`rebuild_index`](PropertyTable::rebuild_index) afterwards.

use crate::runtime::layout::PropertyAttributes;
use crate::runtime::object::JSType;
use crate::value::{Value, ValueKey};

/// One table entry
#[derive(Debug, Clone, Copy)]
pub struct PropertyEntry {
    pub key: Value,
    pub value: Value,
    pub attributes: PropertyAttributes,
    /// Next entry in the bucket chain, 1-based (0 = end of chain)
    hash_next: u32,
}

impl PropertyEntry {
    #[inline]
    fn is_deleted(&self) -> bool {
        self.key.is_hole()
    }
}

/// Ordered hash table keyed by [`ValueKey`]
#[derive(Debug, Clone)]
pub struct PropertyTable {
    kind: JSType,
    /// Number of live entries
    count: u32,
    hash_mask: u32,
    entries: Vec<PropertyEntry>,
    /// Bucket heads, 1-based indexes into `entries`
    buckets: Vec<u32>,
}

impl PropertyTable {
    const MIN_HASH_SIZE: usize = 4;

    /// Maximum load factor before the bucket array doubles
    const MAX_LOAD_FACTOR: f64 = 0.75;

    pub fn new(kind: JSType) -> Self {
        Self::with_capacity(kind, Self::MIN_HASH_SIZE)
    }

    pub fn with_capacity(kind: JSType, capacity: usize) -> Self {
        debug_assert!(matches!(
            kind,
            JSType::NameDictionary | JSType::NumberDictionary | JSType::LinkedHashTable
        ));
        let hash_size = capacity.next_power_of_two().max(Self::MIN_HASH_SIZE);
        PropertyTable {
            kind,
            count: 0,
            hash_mask: (hash_size - 1) as u32,
            entries: Vec::with_capacity(capacity),
            buckets: vec![0; hash_size],
        }
    }

    #[inline]
    pub fn kind(&self) -> JSType {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Entry slots in use, tombstones included
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len().max(self.buckets.len())
    }

    #[inline]
    fn hash_key(key: ValueKey) -> u32 {
        let raw = key.value().raw().0;
        let mut h = (raw ^ (raw >> 32)) as u32;
        h ^= h >> 16;
        h = h.wrapping_mul(0x85eb_ca6b);
        h ^= h >> 13;
        h = h.wrapping_mul(0xc2b2_ae35);
        h ^= h >> 16;
        h
    }

    /// Map and Set compare keys with SameValueZero: `-0` is stored as `+0`.
    fn normalize(&self, key: Value) -> Value {
        if self.kind == JSType::LinkedHashTable
            && key.is_double()
            && key.to_f64().is_some_and(|d| d == 0.0)
        {
            return Value::int(0);
        }
        key
    }

    fn find(&self, key: Value) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let key = self.normalize(key).key();
        let mut idx = self.buckets[(Self::hash_key(key) & self.hash_mask) as usize];
        while idx != 0 {
            let entry_idx = (idx - 1) as usize;
            let entry = &self.entries[entry_idx];
            if !entry.is_deleted() && entry.key.key() == key {
                return Some(entry_idx);
            }
            idx = entry.hash_next;
        }
        None
    }

    pub fn get(&self, key: Value) -> Option<&PropertyEntry> {
        self.find(key).map(|idx| &self.entries[idx])
    }

    pub fn get_value(&self, key: Value) -> Option<Value> {
        self.get(key).map(|entry| entry.value)
    }

    pub fn get_mut(&mut self, key: Value) -> Option<&mut PropertyEntry> {
        self.find(key).map(move |idx| &mut self.entries[idx])
    }

    #[inline]
    pub fn has(&self, key: Value) -> bool {
        self.find(key).is_some()
    }

    /// Inserts or updates `key`. Returns true if the key was new.
    pub fn set(&mut self, key: Value, value: Value, attributes: PropertyAttributes) -> bool {
        debug_assert!(!key.is_hole(), "hole is not a valid key");
        if let Some(idx) = self.find(key) {
            let entry = &mut self.entries[idx];
            entry.value = value;
            entry.attributes = attributes;
            return false;
        }

        let tombstones = self.entries.len() - self.count as usize;
        if tombstones > Self::MIN_HASH_SIZE && tombstones > self.count as usize {
            self.compact();
        }
        let load = (self.entries.len() + 1) as f64 / (self.hash_mask + 1) as f64;
        if load > Self::MAX_LOAD_FACTOR {
            self.resize((self.hash_mask as usize + 1) * 2);
        }

        let key = self.normalize(key);
        let bucket = (Self::hash_key(key.key()) & self.hash_mask) as usize;
        self.entries.push(PropertyEntry {
            key,
            value,
            attributes,
            hash_next: self.buckets[bucket],
        });
        self.buckets[bucket] = self.entries.len() as u32;
        self.count += 1;
        true
    }

    /// Removes `key`, leaving a tombstone. Returns true if it was present.
    pub fn delete(&mut self, key: Value) -> bool {
        let Some(idx) = self.find(key) else {
            return false;
        };
        let entry = &mut self.entries[idx];
        entry.key = Value::hole();
        entry.value = Value::hole();
        self.count -= 1;
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.iter_mut().for_each(|b| *b = 0);
        self.count = 0;
    }

    /// Live entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &PropertyEntry> + '_ {
        self.entries.iter().filter(|e| !e.is_deleted())
    }

    pub fn keys(&self) -> impl Iterator<Item = Value> + '_ {
        self.iter().map(|e| e.key)
    }

    /// Drops tombstones and rehashes
    fn compact(&mut self) {
        self.entries.retain(|e| !e.is_deleted());
        self.rebuild_index();
    }

    fn resize(&mut self, hash_size: usize) {
        self.hash_mask = (hash_size - 1) as u32;
        self.buckets = vec![0; hash_size];
        self.rebuild_index();
    }

    /// Recomputes every bucket chain from the entries
    pub(crate) fn rebuild_index(&mut self) {
        self.buckets.iter_mut().for_each(|b| *b = 0);
        for i in 0..self.entries.len() {
            if self.entries[i].is_deleted() {
                continue;
            }
            let bucket = (Self::hash_key(self.entries[i].key.key()) & self.hash_mask) as usize;
            self.entries[i].hash_next = self.buckets[bucket];
            self.buckets[bucket] = (i + 1) as u32;
        }
    }

    pub(crate) fn visit_values(&self, visitor: &mut dyn FnMut(Value)) {
        for entry in self.entries.iter() {
            visitor(entry.key);
            visitor(entry.value);
        }
    }

    pub(crate) fn visit_values_mut(&mut self, visitor: &mut dyn FnMut(&mut Value)) {
        for entry in self.entries.iter_mut() {
            visitor(&mut entry.key);
            visitor(&mut entry.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::{Address, SpaceKind};

    fn attrs() -> PropertyAttributes {
        PropertyAttributes::default()
    }

    #[test]
    fn test_empty_table() {
        let table = PropertyTable::new(JSType::NameDictionary);
        assert!(table.is_empty());
        assert!(table.get(Value::int(1)).is_none());
    }

    #[test]
    fn test_set_get_update() {
        let mut table = PropertyTable::new(JSType::NameDictionary);
        assert!(table.set(Value::int(1), Value::int(10), attrs()));
        assert!(!table.set(Value::int(1), Value::int(20), attrs()));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_value(Value::int(1)), Some(Value::int(20)));
    }

    #[test]
    fn test_keys_compare_by_same_value() {
        let mut table = PropertyTable::new(JSType::NumberDictionary);
        table.set(Value::int(7), Value::bool(true), attrs());
        assert!(table.has(Value::double(7.0)));
        table.set(Value::double(f64::NAN), Value::int(1), attrs());
        assert!(table.has(Value::double(f64::NAN)));
        assert!(!table.has(Value::double(-0.0)));
    }

    #[test]
    fn test_linked_table_normalizes_negative_zero() {
        let mut table = PropertyTable::new(JSType::LinkedHashTable);
        table.set(Value::double(-0.0), Value::int(1), attrs());
        assert!(table.has(Value::int(0)));
        assert!(table.has(Value::double(-0.0)));
        assert_eq!(table.keys().next(), Some(Value::int(0)));
    }

    #[test]
    fn test_delete_keeps_order() {
        let mut table = PropertyTable::new(JSType::LinkedHashTable);
        for i in 0..5 {
            table.set(Value::int(i), Value::int(i * 10), attrs());
        }
        assert!(table.delete(Value::int(2)));
        assert!(!table.delete(Value::int(2)));
        table.set(Value::int(9), Value::int(90), attrs());
        let keys: Vec<_> = table.keys().collect();
        assert_eq!(
            keys,
            [0, 1, 3, 4, 9].map(Value::int).to_vec()
        );
    }

    #[test]
    fn test_many_entries_and_compaction() {
        let mut table = PropertyTable::with_capacity(JSType::NameDictionary, 4);
        for i in 0..200 {
            table.set(Value::int(i), Value::int(i * 2), attrs());
        }
        for i in 0..150 {
            table.delete(Value::int(i));
        }
        for i in 200..220 {
            table.set(Value::int(i), Value::int(i * 2), attrs());
        }
        assert_eq!(table.len(), 70);
        for i in 150..220 {
            assert_eq!(table.get_value(Value::int(i)), Some(Value::int(i * 2)));
        }
        assert!(!table.has(Value::int(10)));
    }

    #[test]
    fn test_rebuild_after_key_moves() {
        let mut table = PropertyTable::new(JSType::LinkedHashTable);
        let from = Value::from_address(Address::new(SpaceKind::Young, 1));
        let to = Value::from_address(Address::new(SpaceKind::Old, 9));
        table.set(from, Value::int(5), attrs());
        table.visit_values_mut(&mut |v| {
            if *v == from {
                *v = to;
            }
        });
        table.rebuild_index();
        assert_eq!(table.get_value(to), Some(Value::int(5)));
        assert!(!table.has(from));
    }
}
