//! Hidden classes
//!
//! Every heap object points at a hidden class describing its shape: kind,
//! instance size, how many properties live in-object, the layout table
//! mapping keys to slots, and the prototype. Objects built by the same
//! sequence of property additions share one class, found by following
//! transitions.
//!
//! Transitions are keyed by `(key, attribute flags)` and hold *weak*
//! references to the child class, so an unused branch of the transition
//! tree can be collected; the collector prunes dead edges.
//!
//! Hidden classes are allocated in the non-movable space. Their addresses
//! are used as cache keys.

use std::cell::Cell;

use bitflags::bitflags;
use hashbrown::HashMap;

use crate::gc::Heap;
use crate::runtime::layout::{LayoutInfo, PropertyFlags};
use crate::runtime::object::JSType;
use crate::value::{Value, ValueKey};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HClassFlags: u16 {
        const CALLABLE = 1 << 0;
        const CONSTRUCTOR = 1 << 1;
        const EXTENSIBLE = 1 << 2;
        /// Shape produced by an object or array literal
        const LITERAL = 1 << 3;
        /// Shape derived from a static type annotation
        const TS = 1 << 4;
        /// Properties live in a name dictionary, not the layout table
        const DICTIONARY = 1 << 5;
        /// Instances are used as prototypes
        const PROTOTYPE = 1 << 6;
    }
}

type TransitionKey = (ValueKey, u8);

/// A successful lookup remembered on the class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LookupEntry {
    key: Value,
    index: u32,
}

impl LookupEntry {
    const EMPTY: LookupEntry = LookupEntry {
        key: Value::hole(),
        index: 0,
    };
}

/// Shape descriptor
#[derive(Debug)]
pub struct HClass {
    js_type: JSType,
    object_size: u32,
    inline_properties: u32,
    number_of_props: u32,
    layout: Value,
    prototype: Value,
    flags: HClassFlags,
    transitions: HashMap<TransitionKey, Value, ahash::RandomState>,
    lookup_cache: Cell<[LookupEntry; HClass::LOOKUP_CACHE_SIZE]>,
}

impl HClass {
    const LOOKUP_CACHE_SIZE: usize = 4;

    /// A class with no properties. `layout` is an empty layout table,
    /// `object_size` the instance size in bytes.
    pub fn new(js_type: JSType, object_size: u32, inline_properties: u32, layout: Value) -> Self {
        let mut flags = HClassFlags::EXTENSIBLE;
        if js_type.is_function() {
            flags |= HClassFlags::CALLABLE;
        }
        HClass {
            js_type,
            object_size,
            inline_properties,
            number_of_props: 0,
            layout,
            prototype: Value::null(),
            flags,
            transitions: HashMap::default(),
            lookup_cache: Cell::new([LookupEntry::EMPTY; Self::LOOKUP_CACHE_SIZE]),
        }
    }

    /// Child shape of `self` with one more property, sharing or replacing
    /// the layout table
    pub(crate) fn derive(&self, layout: Value) -> Self {
        HClass {
            js_type: self.js_type,
            object_size: self.object_size,
            inline_properties: self.inline_properties,
            number_of_props: self.number_of_props + 1,
            layout,
            prototype: self.prototype,
            flags: self.flags - HClassFlags::PROTOTYPE,
            transitions: HashMap::default(),
            lookup_cache: Cell::new([LookupEntry::EMPTY; Self::LOOKUP_CACHE_SIZE]),
        }
    }

    /// Standalone copy for a dictionary-mode object
    pub(crate) fn to_dictionary(&self, layout: Value) -> Self {
        HClass {
            number_of_props: 0,
            layout,
            flags: self.flags | HClassFlags::DICTIONARY,
            ..self.derive(layout)
        }
    }

    #[inline]
    pub fn js_type(&self) -> JSType {
        self.js_type
    }

    #[inline]
    pub fn object_size(&self) -> u32 {
        self.object_size
    }

    #[inline]
    pub fn inline_properties(&self) -> u32 {
        self.inline_properties
    }

    #[inline]
    pub fn number_of_props(&self) -> u32 {
        self.number_of_props
    }

    #[inline]
    pub fn layout(&self) -> Value {
        self.layout
    }

    #[inline]
    pub fn prototype(&self) -> Value {
        self.prototype
    }

    pub(crate) fn set_prototype(&mut self, prototype: Value) {
        self.prototype = prototype;
    }

    #[inline]
    pub fn flags(&self) -> HClassFlags {
        self.flags
    }

    pub(crate) fn set_flags(&mut self, flags: HClassFlags) {
        self.flags = flags;
    }

    #[inline]
    pub fn is_dictionary(&self) -> bool {
        self.flags.contains(HClassFlags::DICTIONARY)
    }

    #[inline]
    pub fn is_callable(&self) -> bool {
        self.flags.contains(HClassFlags::CALLABLE)
    }

    #[inline]
    pub fn is_extensible(&self) -> bool {
        self.flags.contains(HClassFlags::EXTENSIBLE)
    }

    /// Weak reference to the child class for `(key, flags)`, if recorded
    pub fn find_transition(&self, key: Value, flags: PropertyFlags) -> Option<Value> {
        self.transitions.get(&(key.key(), flags.bits())).copied()
    }

    pub(crate) fn add_transition(&mut self, key: Value, flags: PropertyFlags, child: Value) {
        debug_assert!(child.is_heap_object());
        let weak = if child.is_weak() { child } else { child.create_weak() };
        self.transitions.insert((key.key(), flags.bits()), weak);
    }

    #[inline]
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub(crate) fn prune_transitions(&mut self, is_live: &dyn Fn(Value) -> bool) {
        self.transitions.retain(|_, child| is_live(*child));
    }

    #[inline]
    fn cache_slot(hash: u32) -> usize {
        hash as usize & (Self::LOOKUP_CACHE_SIZE - 1)
    }

    pub(crate) fn cached_lookup(&self, key: Value, hash: u32) -> Option<usize> {
        let entry = self.lookup_cache.get()[Self::cache_slot(hash)];
        (entry.key == key).then_some(entry.index as usize)
    }

    pub(crate) fn cache_lookup(&self, key: Value, hash: u32, index: usize) {
        let mut cache = self.lookup_cache.get();
        cache[Self::cache_slot(hash)] = LookupEntry {
            key,
            index: index as u32,
        };
        self.lookup_cache.set(cache);
    }

    /// Index of `key` in this class's layout, searching only the first
    /// [`number_of_props`](Self::number_of_props) entries.
    pub fn find_property(&self, heap: &Heap, key: Value, hash: u32) -> Option<usize> {
        let count = self.number_of_props as usize;
        if count == 0 {
            return None;
        }
        let layout: &LayoutInfo = heap.cast(self.layout.to_address()?);
        debug_assert!(count <= layout.len(), "property count past layout length");
        if count <= LayoutInfo::LINEAR_SEARCH_LIMIT {
            return layout.find(key, hash, count);
        }
        if let Some(index) = self.cached_lookup(key, hash) {
            if index < count {
                return Some(index);
            }
        }
        let index = layout.find(key, hash, count)?;
        self.cache_lookup(key, hash, index);
        Some(index)
    }

    pub(crate) fn size_in_bytes(&self) -> usize {
        64 + self.transitions.len() * 24
    }

    pub(crate) fn visit_values(&self, visitor: &mut dyn FnMut(Value)) {
        visitor(self.layout);
        visitor(self.prototype);
        self.transitions.values().for_each(|v| visitor(*v));
    }

    pub(crate) fn visit_values_mut(&mut self, visitor: &mut dyn FnMut(&mut Value)) {
        visitor(&mut self.layout);
        visitor(&mut self.prototype);
        self.transitions.values_mut().for_each(|v| visitor(v));
        self.lookup_cache
            .set([LookupEntry::EMPTY; Self::LOOKUP_CACHE_SIZE]);
    }
}

/// Whether two classes describe the same shape: same kind, prototype and
/// inline count, and the same keys and attributes in the same order.
pub fn shape_equivalent(heap: &Heap, a: &HClass, b: &HClass) -> bool {
    if a.js_type != b.js_type
        || a.prototype != b.prototype
        || a.inline_properties != b.inline_properties
        || a.number_of_props != b.number_of_props
        || a.is_dictionary() != b.is_dictionary()
    {
        return false;
    }
    let count = a.number_of_props as usize;
    if count == 0 {
        return true;
    }
    let (Some(la), Some(lb)) = (a.layout.to_address(), b.layout.to_address()) else {
        return false;
    };
    let (la, lb): (&LayoutInfo, &LayoutInfo) = (heap.cast(la), heap.cast(lb));
    la.entries(count)
        .iter()
        .zip(lb.entries(count))
        .all(|(x, y)| x.key == y.key && x.attributes == y.attributes)
}
