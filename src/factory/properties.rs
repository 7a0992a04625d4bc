//! Named properties and elements
//!
//! Adding a property follows the hidden-class transition for
//! `(key, attribute flags)`, creating the child class on a miss. The slot is
//! in-object when the property's offset is below the class's inline count
//! and in the out-of-line `properties` array otherwise. Past the dictionary
//! threshold the object gets its own dictionary-mode class and a name
//! dictionary replaces the layout.
//!
//! Elements are a tagged array that grows geometrically; a write far past
//! its capacity switches the object to a number dictionary.

use tracing::{debug, trace};

use super::ObjectFactory;
use crate::context::Context;
use crate::gc::{Address, Handle, HandleScope, Heap, SpaceKind};
use crate::runtime::array::TaggedArray;
use crate::runtime::hclass::HClass;
use crate::runtime::layout::{LayoutInfo, PropertyAttributes, PropertyFlags};
use crate::runtime::object::{HeapObject, JSObject, JSType};
use crate::runtime::property::PropertyTable;
use crate::value::Value;

/// Element writes further than this past the capacity go to a dictionary
pub const MAX_GAP: usize = 1024;

/// Out-of-line property slots added per growth step
const PROPERTIES_GROW_SIZE: usize = 4;

/// Hash of a property key: strings and symbols carry their own, anything
/// else hashes its tagged bits.
pub fn key_hash(heap: &Heap, key: Value) -> u32 {
    match heap.value_cell(key) {
        Some(HeapObject::String(string)) => string.hash(),
        Some(HeapObject::Symbol(symbol)) => symbol.hash(),
        _ => {
            let raw = key.raw().0;
            let h = (raw ^ (raw >> 32)) as u32;
            h.wrapping_mul(0x9E37_79B9) ^ (h >> 15)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    parent: Value,
    key: Value,
    flags: PropertyFlags,
    child: Value,
}

/// Direct-mapped cache of recent transitions, keyed by parent class address,
/// key and flags. Flushed on every collection.
#[derive(Debug)]
pub(crate) struct TransitionCache {
    entries: Box<[Option<CacheEntry>]>,
}

impl TransitionCache {
    pub(crate) fn new(size: usize) -> Self {
        let size = size.max(1).next_power_of_two();
        TransitionCache {
            entries: vec![None; size].into_boxed_slice(),
        }
    }

    fn slot(&self, parent: Value, key: Value, flags: PropertyFlags) -> usize {
        let h = parent.raw().0 ^ key.raw().0.rotate_left(17) ^ u64::from(flags.bits());
        let h = h ^ (h >> 29);
        (h as usize) & (self.entries.len() - 1)
    }

    pub(crate) fn get(&self, parent: Value, key: Value, flags: PropertyFlags) -> Option<Value> {
        match self.entries[self.slot(parent, key, flags)] {
            Some(e) if e.parent == parent && e.key == key && e.flags == flags => Some(e.child),
            _ => None,
        }
    }

    pub(crate) fn insert(&mut self, parent: Value, key: Value, flags: PropertyFlags, child: Value) {
        let slot = self.slot(parent, key, flags);
        self.entries[slot] = Some(CacheEntry { parent, key, flags, child });
    }

    pub(crate) fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
    }
}

fn address_of(value: Value) -> Address {
    match value.to_address() {
        Some(addr) => addr,
        None => panic!("expected a heap reference, found {:?}", value),
    }
}

fn hclass_of<'h>(heap: &'h Heap, object: Handle<JSObject>) -> &'h HClass {
    heap.cast(address_of(heap.get(object).hclass()))
}

impl ObjectFactory<'_> {
    /// Adds a new own property. `key` is an interned string, a symbol or an
    /// int; `value` must be valid at the time of the call.
    pub fn add_property(&mut self, object: Handle<JSObject>, key: Value, value: Value, flags: PropertyFlags) {
        let mut scope = HandleScope::new(self.ctx);
        let value = scope.heap.new_handle::<Value>(value);

        let (is_dictionary, count) = {
            let hclass = hclass_of(&scope.heap, object);
            (hclass.is_dictionary(), hclass.number_of_props())
        };
        if !is_dictionary && count + 1 > scope.options.dictionary_threshold {
            scope.factory().to_dictionary_mode(object);
        } else if !is_dictionary {
            let parent = scope.heap.get(object).hclass();
            let child = scope.factory().transition(parent, key, flags);
            let child_ref: &HClass = scope.heap.cast(address_of(child));
            let inline = child_ref.inline_properties() as usize;
            let offset = count as usize;
            let value = value.value(&scope.heap);
            if offset < inline {
                scope.heap.get_mut(object).inline[offset] = value;
                scope.heap.write_barrier(value);
            } else {
                scope.factory().store_out_of_line(object, offset - inline, value);
            }
            scope.heap.get_mut(object).hclass = child;
            return;
        }

        let table = scope.heap.get(object).properties();
        let value = value.value(&scope.heap);
        let attributes = PropertyAttributes::new(flags);
        let table: &mut PropertyTable = scope.heap.cast_mut(address_of(table));
        table.set(key, value, attributes);
        scope.heap.write_barrier(value);
    }

    fn store_out_of_line(&mut self, object: Handle<JSObject>, index: usize, value: Value) {
        let mut scope = HandleScope::new(self.ctx);
        let value = scope.heap.new_handle::<Value>(value);
        let properties = scope.heap.get(object).properties();
        let properties: Handle<TaggedArray> = scope.heap.new_handle(properties);
        let len = scope.heap.get(properties).len();
        let properties = if index < len {
            properties
        } else {
            let grown = scope.factory().extend_array(properties, len + PROPERTIES_GROW_SIZE, Value::hole());
            let grown_value = grown.value(&scope.heap);
            scope.set_properties(object, grown_value);
            grown
        };
        let value = value.value(&scope.heap);
        scope.array_set(properties, index, value);
    }

    /// Child of `parent` for `(key, flags)`: transition cache, then the
    /// class's own transitions, then a fresh class.
    fn transition(&mut self, parent: Value, key: Value, flags: PropertyFlags) -> Value {
        if let Some(child) = self.ctx.transition_cache.get(parent, key, flags) {
            return child;
        }
        let parent_addr = address_of(parent);
        let recorded = self.ctx.heap.cast::<HClass>(parent_addr).find_transition(key, flags);
        if let Some(child) = recorded.and_then(|weak| self.ctx.heap.upgrade_weak(weak)) {
            self.ctx.transition_cache.insert(parent, key, flags, child);
            return child;
        }

        let hash = key_hash(&self.ctx.heap, key);
        let (layout_value, count, inline) = {
            let hclass: &HClass = self.ctx.heap.cast(parent_addr);
            (hclass.layout(), hclass.number_of_props() as usize, hclass.inline_properties())
        };
        let attributes = PropertyAttributes::new(flags).at(count as u32, (count as u32) < inline);
        let layout_addr = address_of(layout_value);
        let layout: &LayoutInfo = self.ctx.heap.cast(layout_addr);
        let layout_value = if layout.len() == count && layout.has_spare_capacity() {
            self.ctx.heap.cast_mut::<LayoutInfo>(layout_addr).push(key, hash, attributes);
            layout_value
        } else {
            let mut grown = layout.copy_prefix(count, LayoutInfo::grow_capacity(count as u32));
            grown.push(key, hash, attributes);
            let addr = self.ctx.allocate(JSType::LayoutInfo.default_space(), HeapObject::Layout(grown));
            Value::from_address(addr)
        };

        let mut child = self.ctx.heap.cast::<HClass>(parent_addr).derive(layout_value);
        child.set_prototype(Value::null());
        let addr = self.ctx.allocate(SpaceKind::NonMovable, HeapObject::HClass(Box::new(child)));
        let child = Value::from_address(addr);
        let prototype = self.ctx.heap.cast::<HClass>(parent_addr).prototype();
        self.ctx.heap.cast_mut::<HClass>(addr).set_prototype(prototype);
        self.ctx.heap.write_barrier(prototype);
        self.ctx.heap.cast_mut::<HClass>(parent_addr).add_transition(key, flags, child);
        self.ctx.transition_cache.insert(parent, key, flags, child);
        trace!(props = count + 1, "hidden class transition added");
        child
    }

    /// Moves every named property into a fresh name dictionary and gives
    /// the object its own dictionary-mode class.
    fn to_dictionary_mode(&mut self, object: Handle<JSObject>) {
        let mut scope = HandleScope::new(self.ctx);
        let count = hclass_of(&scope.heap, object).number_of_props() as usize;
        let table = scope
            .factory()
            .new_property_table(JSType::NameDictionary, count + 1);

        let mut template = hclass_of(&scope.heap, object).to_dictionary(scope.globals.empty_layout);
        template.set_prototype(Value::null());
        let addr = scope.allocate(SpaceKind::NonMovable, HeapObject::HClass(Box::new(template)));

        let heap = &scope.heap;
        let hclass = hclass_of(heap, object);
        let prototype = hclass.prototype();
        let layout: &LayoutInfo = heap.cast(address_of(hclass.layout()));
        let entries: Vec<_> = layout
            .entries(count)
            .iter()
            .map(|entry| (entry.key, own_slot(heap, object, entry.attributes), entry.attributes))
            .collect();
        for (key, value, attributes) in entries {
            let plain = PropertyAttributes::new(attributes.flags());
            scope.heap.get_mut(table).set(key, value, plain);
        }

        let dictionary_class = Value::from_address(addr);
        scope.heap.cast_mut::<HClass>(addr).set_prototype(prototype);
        let table_value = table.value(&scope.heap);
        let body = scope.heap.get_mut(object);
        body.hclass = dictionary_class;
        body.properties = table_value;
        body.inline.iter_mut().for_each(|slot| *slot = Value::undefined());
        scope.heap.write_barrier(table_value);
        scope.heap.write_barrier(prototype);
        debug!(properties = count, "object switched to dictionary mode");
    }

    /// Stores an own property, adding it when absent
    pub fn set_property(&mut self, object: Handle<JSObject>, key: Value, value: Value) {
        if !self.ctx.update_own_property(object, key, value) {
            self.add_property(object, key, value, PropertyFlags::DEFAULT);
        }
    }

    /// Stores element `index`, growing or converting the element store
    pub fn set_element(&mut self, object: Handle<JSObject>, index: u32, value: Value) {
        let mut scope = HandleScope::new(self.ctx);
        let value = scope.heap.new_handle::<Value>(value);
        let index_usize = index as usize;
        let elements = scope.heap.get(object).elements();

        let is_dictionary = matches!(scope.heap.value_cell(elements), Some(HeapObject::Table(_)));
        if is_dictionary {
            let value = value.value(&scope.heap);
            let table: &mut PropertyTable = scope.heap.cast_mut(address_of(elements));
            table.set(Value::number(index as f64), value, PropertyAttributes::default());
            scope.heap.write_barrier(value);
        } else {
            let elements: Handle<TaggedArray> = scope.heap.new_handle(elements);
            let capacity = scope.heap.get(elements).len();
            if index_usize >= capacity + MAX_GAP {
                let table = scope.factory().elements_to_dictionary(object, elements);
                let value = value.value(&scope.heap);
                scope.heap.get_mut(table).set(Value::number(index as f64), value, PropertyAttributes::default());
                scope.heap.write_barrier(value);
            } else {
                let store = if index_usize < capacity {
                    elements
                } else {
                    let new_capacity = (capacity + capacity / 2 + 16).max(index_usize + 1);
                    let grown = scope.factory().extend_array(elements, new_capacity, Value::hole());
                    let grown_value = grown.value(&scope.heap);
                    scope.set_elements(object, grown_value);
                    grown
                };
                let value = value.value(&scope.heap);
                scope.array_set(store, index_usize, value);
            }
        }

        if scope.heap.get(object).js_type() == JSType::JsArray {
            let length = scope.get_field(object, "length").to_f64().unwrap_or(0.0);
            if f64::from(index) >= length {
                scope.set_field(object, "length", Value::number(f64::from(index) + 1.0));
            }
        }
    }

    fn elements_to_dictionary(
        &mut self,
        object: Handle<JSObject>,
        elements: Handle<TaggedArray>,
    ) -> Handle<PropertyTable> {
        let present = self.ctx.heap.get(elements).count_present();
        let table = self.new_property_table(JSType::NumberDictionary, present + 1);
        let values: Vec<(usize, Value)> = self
            .ctx
            .heap
            .get(elements)
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_hole())
            .collect();
        let dictionary = self.ctx.heap.get_mut(table);
        for (i, v) in values {
            dictionary.set(Value::number(i as f64), v, PropertyAttributes::default());
        }
        let table_value = table.value(&self.ctx.heap);
        self.ctx.set_elements(object, table_value);
        debug!(elements = present, "elements switched to dictionary mode");
        table
    }
}

/// Value in the slot `attributes` describes
fn own_slot(heap: &Heap, object: Handle<JSObject>, attributes: PropertyAttributes) -> Value {
    let body = heap.get(object);
    let offset = attributes.offset() as usize;
    if attributes.is_inline() {
        return body.inline_property(offset);
    }
    let inline = body.inline_count();
    match body.properties().to_address() {
        Some(addr) => heap.cast::<TaggedArray>(addr).try_get(offset - inline).unwrap_or(Value::hole()),
        None => Value::hole(),
    }
}

impl Context {
    /// Own named property, if present
    pub fn get_own_property(&self, object: Handle<JSObject>, key: Value) -> Option<Value> {
        let heap = &self.heap;
        let hclass = hclass_of(heap, object);
        if hclass.is_dictionary() {
            let table: &PropertyTable = heap.cast(heap.get(object).properties().to_address()?);
            return table.get_value(key);
        }
        let index = hclass.find_property(heap, key, key_hash(heap, key))?;
        let layout: &LayoutInfo = heap.cast(hclass.layout().to_address()?);
        Some(own_slot(heap, object, layout.entry(index).attributes))
    }

    /// Overwrites an existing own property; false when absent
    pub(crate) fn update_own_property(&mut self, object: Handle<JSObject>, key: Value, value: Value) -> bool {
        let hclass = hclass_of(&self.heap, object);
        if hclass.is_dictionary() {
            let Some(addr) = self.heap.get(object).properties().to_address() else {
                return false;
            };
            let updated = match self.heap.cast_mut::<PropertyTable>(addr).get_mut(key) {
                Some(entry) => {
                    entry.value = value;
                    true
                }
                None => false,
            };
            self.heap.write_barrier(value);
            return updated;
        }
        let Some(index) = hclass.find_property(&self.heap, key, key_hash(&self.heap, key)) else {
            return false;
        };
        let Some(layout) = hclass.layout().to_address() else {
            return false;
        };
        let attributes = self.heap.cast::<LayoutInfo>(layout).entry(index).attributes;
        let offset = attributes.offset() as usize;
        if attributes.is_inline() {
            self.heap.get_mut(object).inline[offset] = value;
            self.heap.write_barrier(value);
        } else {
            let inline = self.heap.get(object).inline_count();
            let properties = address_of(self.heap.get(object).properties());
            self.heap.cast_mut::<TaggedArray>(properties).set(offset - inline, value);
            self.heap.write_barrier(value);
        }
        true
    }

    /// Element `index`, `None` for holes and absent entries
    pub fn get_element(&self, object: Handle<JSObject>, index: u32) -> Option<Value> {
        let elements = self.heap.get(object).elements();
        let value = match self.heap.value_cell(elements)? {
            HeapObject::TaggedArray(array) => array.try_get(index as usize)?,
            HeapObject::Table(table) => table.get_value(Value::number(f64::from(index)))?,
            _ => return None,
        };
        (!value.is_hole()).then_some(value)
    }

    /// Number of own named properties
    pub fn own_property_count(&self, object: Handle<JSObject>) -> usize {
        let hclass = hclass_of(&self.heap, object);
        if !hclass.is_dictionary() {
            return hclass.number_of_props() as usize;
        }
        match self.heap.get(object).properties().to_address() {
            Some(addr) => self.heap.cast::<PropertyTable>(addr).len(),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RuntimeOptions;
    use crate::runtime::hclass::shape_equivalent;

    fn key(ctx: &mut Context, name: &str) -> Value {
        let handle = ctx.factory().new_from_utf8(name);
        handle.value(&ctx.heap)
    }

    #[test]
    fn test_inline_and_out_of_line_properties() {
        let mut ctx = Context::new();
        let object = ctx.factory().new_empty_js_object();
        let keys: Vec<Value> = (0..7).map(|i| key(&mut ctx, &format!("p{}", i))).collect();
        for (i, &k) in keys.iter().enumerate() {
            ctx.factory().add_property(object, k, Value::int(i as i32), PropertyFlags::DEFAULT);
        }
        ctx.collect_garbage();
        for (i, &k) in keys.iter().enumerate() {
            assert_eq!(ctx.get_own_property(object, k), Some(Value::int(i as i32)));
        }
        assert_eq!(ctx.own_property_count(object), 7);
        let body = ctx.heap.get(object);
        assert_eq!(body.inline_property(0), Value::int(0));
        let properties: &TaggedArray = ctx.heap.cast(body.properties().to_address().unwrap());
        assert_eq!(properties.len(), 4);
        assert_eq!(properties.get(2), Value::int(6));
        let missing = key(&mut ctx, "missing");
        assert_eq!(ctx.get_own_property(object, missing), None);
    }

    #[test]
    fn test_same_additions_share_a_class() {
        let mut ctx = Context::new();
        let (x, y) = (key(&mut ctx, "x"), key(&mut ctx, "y"));
        let a = ctx.factory().new_empty_js_object();
        let b = ctx.factory().new_empty_js_object();
        for object in [a, b] {
            ctx.factory().add_property(object, x, Value::int(1), PropertyFlags::DEFAULT);
            ctx.factory().add_property(object, y, Value::int(2), PropertyFlags::DEFAULT);
        }
        assert_eq!(ctx.heap.get(a).hclass(), ctx.heap.get(b).hclass());

        ctx.collect_garbage();
        let c = ctx.factory().new_empty_js_object();
        ctx.factory().add_property(c, x, Value::int(1), PropertyFlags::DEFAULT);
        ctx.factory().add_property(c, y, Value::int(2), PropertyFlags::DEFAULT);
        assert_eq!(ctx.heap.get(a).hclass(), ctx.heap.get(c).hclass());
    }

    #[test]
    fn test_branching_transitions_are_equivalent() {
        let mut ctx = Context::new();
        let (x, y, z) = (key(&mut ctx, "x"), key(&mut ctx, "y"), key(&mut ctx, "z"));
        let a = ctx.factory().new_empty_js_object();
        let b = ctx.factory().new_empty_js_object();
        ctx.factory().add_property(a, x, Value::int(1), PropertyFlags::DEFAULT);
        ctx.factory().add_property(a, y, Value::int(2), PropertyFlags::DEFAULT);
        ctx.factory().add_property(b, x, Value::int(1), PropertyFlags::DEFAULT);
        ctx.factory().add_property(b, z, Value::int(3), PropertyFlags::DEFAULT);
        assert_eq!(ctx.get_own_property(a, y), Some(Value::int(2)));
        assert_eq!(ctx.get_own_property(a, z), None);
        assert_eq!(ctx.get_own_property(b, z), Some(Value::int(3)));
        assert_eq!(ctx.get_own_property(b, y), None);

        let ha: &HClass = ctx.heap.cast(ctx.heap.get(a).hclass().to_address().unwrap());
        let hb: &HClass = ctx.heap.cast(ctx.heap.get(b).hclass().to_address().unwrap());
        assert!(!shape_equivalent(&ctx.heap, ha, hb));
        assert_ne!(ha.layout(), hb.layout());
    }

    #[test]
    fn test_attribute_flags_split_transitions() {
        let mut ctx = Context::new();
        let x = key(&mut ctx, "x");
        let a = ctx.factory().new_empty_js_object();
        let b = ctx.factory().new_empty_js_object();
        ctx.factory().add_property(a, x, Value::int(1), PropertyFlags::DEFAULT);
        ctx.factory().add_property(b, x, Value::int(1), PropertyFlags::WRITABLE);
        assert_ne!(ctx.heap.get(a).hclass(), ctx.heap.get(b).hclass());
    }

    #[test]
    fn test_dictionary_mode() {
        let options = RuntimeOptions::default().with_dictionary_threshold(8);
        let mut ctx = Context::with_options(options);
        let object = ctx.factory().new_empty_js_object();
        let keys: Vec<Value> = (0..12).map(|i| key(&mut ctx, &format!("k{}", i))).collect();
        for (i, &k) in keys.iter().enumerate() {
            ctx.factory().add_property(object, k, Value::int(i as i32), PropertyFlags::DEFAULT);
        }
        let hclass: &HClass = ctx.heap.cast(ctx.heap.get(object).hclass().to_address().unwrap());
        assert!(hclass.is_dictionary());
        assert_eq!(ctx.own_property_count(object), 12);
        for (i, &k) in keys.iter().enumerate() {
            assert_eq!(ctx.get_own_property(object, k), Some(Value::int(i as i32)));
        }
        ctx.factory().set_property(object, keys[3], Value::int(-3));
        assert_eq!(ctx.get_own_property(object, keys[3]), Some(Value::int(-3)));
    }

    #[test]
    fn test_set_property_updates_in_place() {
        let mut ctx = Context::new();
        let object = ctx.factory().new_empty_js_object();
        let names: Vec<Value> = (0..6).map(|i| key(&mut ctx, &format!("f{}", i))).collect();
        for &k in &names {
            ctx.factory().set_property(object, k, Value::int(0));
        }
        let class_before = ctx.heap.get(object).hclass();
        ctx.factory().set_property(object, names[1], Value::int(11));
        ctx.factory().set_property(object, names[5], Value::int(55));
        assert_eq!(ctx.heap.get(object).hclass(), class_before);
        assert_eq!(ctx.get_own_property(object, names[1]), Some(Value::int(11)));
        assert_eq!(ctx.get_own_property(object, names[5]), Some(Value::int(55)));
    }

    #[test]
    fn test_young_property_value_survives_collection() {
        let mut ctx = Context::new();
        let object = ctx.factory().new_empty_js_object();
        let k = key(&mut ctx, "child");
        let child = ctx.factory().new_tagged_array(2);
        let child_value = child.value(&ctx.heap);
        ctx.factory().add_property(object, k, child_value, PropertyFlags::DEFAULT);
        ctx.collect_garbage();
        assert_eq!(ctx.get_own_property(object, k), Some(child.value(&ctx.heap)));
    }

    #[test]
    fn test_elements_grow_and_track_length() {
        let mut ctx = Context::new();
        let array = ctx.factory().new_js_object_with_init(JSType::JsArray);
        ctx.factory().set_element(array, 0, Value::int(10));
        ctx.factory().set_element(array, 5, Value::int(15));
        assert_eq!(ctx.get_element(array, 0), Some(Value::int(10)));
        assert_eq!(ctx.get_element(array, 3), None);
        assert_eq!(ctx.get_element(array, 5), Some(Value::int(15)));
        assert_eq!(ctx.get_field(array, "length"), Value::int(6));
        let elements = ctx.heap.get(array).elements();
        assert_eq!(ctx.heap.value_cell(elements).map(|o| o.js_type()), Some(JSType::TaggedArray));
    }

    #[test]
    fn test_sparse_write_switches_to_number_dictionary() {
        let mut ctx = Context::new();
        let array = ctx.factory().new_js_object_with_init(JSType::JsArray);
        ctx.factory().set_element(array, 1, Value::int(1));
        ctx.factory().set_element(array, 100_000, Value::int(2));
        let elements = ctx.heap.get(array).elements();
        assert_eq!(ctx.heap.value_cell(elements).map(|o| o.js_type()), Some(JSType::NumberDictionary));
        assert_eq!(ctx.get_element(array, 1), Some(Value::int(1)));
        assert_eq!(ctx.get_element(array, 100_000), Some(Value::int(2)));
        assert_eq!(ctx.get_field(array, "length"), Value::int(100_001));
        ctx.factory().set_element(array, 7, Value::int(7));
        assert_eq!(ctx.get_element(array, 7), Some(Value::int(7)));
    }

    #[test]
    fn test_transition_cache() {
        let mut cache = TransitionCache::new(5);
        let parent = Value::int(1);
        let k = Value::int(2);
        assert_eq!(cache.get(parent, k, PropertyFlags::DEFAULT), None);
        cache.insert(parent, k, PropertyFlags::DEFAULT, Value::int(3));
        assert_eq!(cache.get(parent, k, PropertyFlags::DEFAULT), Some(Value::int(3)));
        assert_eq!(cache.get(parent, k, PropertyFlags::WRITABLE), None);
        cache.clear();
        assert_eq!(cache.get(parent, k, PropertyFlags::DEFAULT), None);
    }
}
