//! Property layout tables
//!
//! A [`LayoutInfo`] records, for one lineage of hidden classes, which key
//! lives at which property offset. Entries are append-only: a child class
//! that adds one property may share its parent's table and simply see one
//! more entry, so every lookup is bounded by the *class's* property count,
//! never by the table length.
//!
//! Besides insertion order the table keeps an index sorted by key hash,
//! used for binary search once a class has more than
//! [`LayoutInfo::LINEAR_SEARCH_LIMIT`] properties.

use bitflags::bitflags;

use crate::value::Value;

bitflags! {
    /// Property attribute bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u8 {
        const WRITABLE = 1 << 0;
        const ENUMERABLE = 1 << 1;
        const CONFIGURABLE = 1 << 2;
        /// Slot holds an accessor pair instead of a value
        const ACCESSOR = 1 << 3;
    }
}

impl PropertyFlags {
    /// Attributes of a property created by ordinary assignment
    pub const DEFAULT: PropertyFlags = PropertyFlags::WRITABLE
        .union(PropertyFlags::ENUMERABLE)
        .union(PropertyFlags::CONFIGURABLE);
}

impl Default for PropertyFlags {
    fn default() -> Self {
        PropertyFlags::DEFAULT
    }
}

/// Attributes plus storage location of one property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PropertyAttributes {
    flags: PropertyFlags,
    offset: u32,
    inline: bool,
}

impl PropertyAttributes {
    pub const fn new(flags: PropertyFlags) -> Self {
        PropertyAttributes {
            flags,
            offset: 0,
            inline: false,
        }
    }

    /// Places the property at `offset`, in-object when `inline`
    pub const fn at(self, offset: u32, inline: bool) -> Self {
        PropertyAttributes {
            flags: self.flags,
            offset,
            inline,
        }
    }

    #[inline]
    pub const fn flags(self) -> PropertyFlags {
        self.flags
    }

    /// Slot index: in the object's inline slots when [`is_inline`](Self::is_inline),
    /// otherwise in its out-of-line property array
    #[inline]
    pub const fn offset(self) -> u32 {
        self.offset
    }

    #[inline]
    pub const fn is_inline(self) -> bool {
        self.inline
    }

    #[inline]
    pub const fn is_writable(self) -> bool {
        self.flags.contains(PropertyFlags::WRITABLE)
    }

    #[inline]
    pub const fn is_enumerable(self) -> bool {
        self.flags.contains(PropertyFlags::ENUMERABLE)
    }

    #[inline]
    pub const fn is_configurable(self) -> bool {
        self.flags.contains(PropertyFlags::CONFIGURABLE)
    }

    #[inline]
    pub const fn is_accessor(self) -> bool {
        self.flags.contains(PropertyFlags::ACCESSOR)
    }
}

/// One layout entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEntry {
    pub key: Value,
    pub hash: u32,
    pub attributes: PropertyAttributes,
}

/// Append-only key → attributes table shared along a transition chain
#[derive(Debug, Clone, Default)]
pub struct LayoutInfo {
    entries: Vec<LayoutEntry>,
    /// Entry indexes ordered by hash, ties by insertion
    sorted: Vec<u32>,
    capacity: u32,
}

impl LayoutInfo {
    /// Up to this many properties a lookup is a linear scan
    pub const LINEAR_SEARCH_LIMIT: usize = 9;
    pub const MIN_CAPACITY: u32 = 4;
    pub const MAX_CAPACITY: u32 = 1 << 16;

    pub fn with_capacity(capacity: u32) -> Self {
        LayoutInfo {
            entries: Vec::with_capacity(capacity as usize),
            sorted: Vec::with_capacity(capacity as usize),
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub fn has_spare_capacity(&self) -> bool {
        self.entries.len() < self.capacity as usize
    }

    /// Capacity of the table a full table of `current` entries grows into
    pub fn grow_capacity(current: u32) -> u32 {
        current
            .saturating_mul(2)
            .clamp(Self::MIN_CAPACITY, Self::MAX_CAPACITY.max(current.saturating_add(1)))
    }

    #[inline]
    pub fn entry(&self, index: usize) -> &LayoutEntry {
        &self.entries[index]
    }

    /// The first `count` entries in insertion order
    pub fn entries(&self, count: usize) -> &[LayoutEntry] {
        debug_assert!(count <= self.entries.len(), "count past layout length");
        &self.entries[..count]
    }

    /// Appends an entry; the caller checked there is spare capacity.
    pub fn push(&mut self, key: Value, hash: u32, attributes: PropertyAttributes) {
        debug_assert!(self.has_spare_capacity(), "layout table is full");
        let index = self.entries.len() as u32;
        self.entries.push(LayoutEntry {
            key,
            hash,
            attributes,
        });
        let entries = &self.entries;
        let pos = self.sorted.partition_point(|&i| entries[i as usize].hash <= hash);
        self.sorted.insert(pos, index);
    }

    /// New table holding the first `count` entries
    pub fn copy_prefix(&self, count: usize, capacity: u32) -> LayoutInfo {
        debug_assert!(count <= capacity as usize);
        let mut copy = LayoutInfo::with_capacity(capacity);
        for entry in self.entries(count) {
            copy.push(entry.key, entry.hash, entry.attributes);
        }
        copy
    }

    /// Index of `key` among the first `count` entries
    pub fn find(&self, key: Value, hash: u32, count: usize) -> Option<usize> {
        debug_assert!(count <= self.entries.len(), "lookup past layout length");
        if count <= Self::LINEAR_SEARCH_LIMIT {
            return self.entries[..count].iter().position(|e| e.key == key);
        }
        self.binary_search(key, hash, count)
    }

    fn binary_search(&self, key: Value, hash: u32, count: usize) -> Option<usize> {
        let entries = &self.entries;
        let pos = self
            .sorted
            .binary_search_by(|&i| entries[i as usize].hash.cmp(&hash))
            .ok()?;

        let matches = |i: u32| {
            let i = i as usize;
            (i < count && entries[i].key == key).then_some(i)
        };
        for &i in self.sorted[pos..].iter() {
            if entries[i as usize].hash != hash {
                break;
            }
            if let Some(found) = matches(i) {
                return Some(found);
            }
        }
        for &i in self.sorted[..pos].iter().rev() {
            if entries[i as usize].hash != hash {
                break;
            }
            if let Some(found) = matches(i) {
                return Some(found);
            }
        }
        None
    }

    pub(crate) fn visit_values(&self, visitor: &mut dyn FnMut(Value)) {
        self.entries.iter().for_each(|e| visitor(e.key));
    }

    pub(crate) fn visit_values_mut(&mut self, visitor: &mut dyn FnMut(&mut Value)) {
        self.entries.iter_mut().for_each(|e| visitor(&mut e.key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(offset: u32) -> PropertyAttributes {
        PropertyAttributes::new(PropertyFlags::DEFAULT).at(offset, true)
    }

    fn filled(n: u32, hash: impl Fn(u32) -> u32) -> LayoutInfo {
        let mut layout = LayoutInfo::with_capacity(n);
        for i in 0..n {
            layout.push(Value::int(i as i32), hash(i), attrs(i));
        }
        layout
    }

    #[test]
    fn test_flags() {
        let a = PropertyAttributes::new(PropertyFlags::DEFAULT);
        assert!(a.is_writable() && a.is_enumerable() && a.is_configurable());
        assert!(!a.is_accessor());
        let ro = PropertyAttributes::new(PropertyFlags::ENUMERABLE).at(3, false);
        assert!(!ro.is_writable());
        assert_eq!(ro.offset(), 3);
        assert!(!ro.is_inline());
    }

    #[test]
    fn test_linear_find() {
        let layout = filled(5, |i| i * 7);
        assert_eq!(layout.find(Value::int(3), 21, 5), Some(3));
        assert_eq!(layout.find(Value::int(3), 21, 3), None);
        assert_eq!(layout.find(Value::int(9), 63, 5), None);
    }

    #[test]
    fn test_binary_find_with_collisions() {
        let layout = filled(64, |i| i / 4);
        for i in 0..64u32 {
            assert_eq!(layout.find(Value::int(i as i32), i / 4, 64), Some(i as usize));
        }
        assert_eq!(layout.find(Value::int(63), 15, 40), None);
        assert_eq!(layout.find(Value::int(1), 3, 64), None);
    }

    #[test]
    fn test_sorted_index_agrees_with_order() {
        let layout = filled(32, |i| i.wrapping_mul(2654435761) >> 16);
        let hashes: Vec<u32> = layout.sorted.iter().map(|&i| layout.entry(i as usize).hash).collect();
        assert!(hashes.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(layout.sorted.len(), layout.len());
    }

    #[test]
    fn test_copy_prefix() {
        let layout = filled(12, |i| 100 - i);
        let copy = layout.copy_prefix(10, 20);
        assert_eq!(copy.len(), 10);
        assert_eq!(copy.capacity(), 20);
        assert_eq!(copy.entries(10), layout.entries(10));
        assert_eq!(copy.find(Value::int(9), 91, 10), Some(9));
        assert!(copy.has_spare_capacity());
    }

    #[test]
    fn test_grow_capacity() {
        assert_eq!(LayoutInfo::grow_capacity(0), LayoutInfo::MIN_CAPACITY);
        assert_eq!(LayoutInfo::grow_capacity(8), 16);
        assert!(LayoutInfo::grow_capacity(LayoutInfo::MAX_CAPACITY) > LayoutInfo::MAX_CAPACITY);
    }
}
