//! Map, Set and container objects
//!
//! Map/Set and their weak variants keep entries in a linked hash table
//! referenced from a declared field. Array-like containers keep their
//! values in the elements array and track the used length in a field.

use super::ObjectFactory;
use crate::context::Context;
use crate::error::{JsError, JsResult};
use crate::gc::{Address, Handle, HandleScope};
use crate::runtime::array::TaggedArray;
use crate::runtime::layout::PropertyAttributes;
use crate::runtime::object::{HeapObject, JSObject, JSType};
use crate::runtime::property::PropertyTable;
use crate::value::Value;

const INVALID_WEAK_MAP_KEY: &str = "Invalid value used as weak map key";
const INVALID_WEAK_SET_VALUE: &str = "Invalid value used in weak set";
const INDEX_OUT_OF_RANGE: &str = "The value of index is out of range";

impl ObjectFactory<'_> {
    pub fn new_js_map(&mut self) -> Handle<JSObject> {
        self.new_js_object_with_init(JSType::JsMap)
    }

    pub fn new_js_set(&mut self) -> Handle<JSObject> {
        self.new_js_object_with_init(JSType::JsSet)
    }

    /// Weak map; keys are held strongly for the map's lifetime
    pub fn new_js_weak_map(&mut self) -> Handle<JSObject> {
        self.new_js_object_with_init(JSType::JsWeakMap)
    }

    pub fn new_js_weak_set(&mut self) -> Handle<JSObject> {
        self.new_js_object_with_init(JSType::JsWeakSet)
    }

    /// Empty non-standard container of `kind`
    pub fn new_container(&mut self, kind: JSType) -> Handle<JSObject> {
        assert!(kind.is_container(), "{:?} is not a container kind", kind);
        self.new_js_object_with_init(kind)
    }

    /// Appends to an array list or vector
    pub fn array_list_add(&mut self, list: Handle<JSObject>, value: Value) {
        let mut scope = HandleScope::new(self.ctx);
        let value = scope.heap.new_handle::<Value>(value);
        let len = scope.array_list_len(list);
        let elements = scope.factory().ensure_capacity(list, len + 1);
        let value = value.value(&scope.heap);
        scope.array_set(elements, len, value);
        scope.set_field(list, "length", Value::number((len + 1) as f64));
    }

    /// Inserts at `index`, shifting later values right
    pub fn array_list_insert(&mut self, list: Handle<JSObject>, index: usize, value: Value) -> JsResult<()> {
        let len = self.ctx.array_list_len(list);
        if index > len {
            return Err(self.ctx.throw(JsError::Range(INDEX_OUT_OF_RANGE)));
        }
        let mut scope = HandleScope::new(self.ctx);
        let value = scope.heap.new_handle::<Value>(value);
        let elements = scope.factory().ensure_capacity(list, len + 1);
        let value = value.value(&scope.heap);
        scope.factory().insert_element_by_index(elements, value, index, len);
        scope.set_field(list, "length", Value::number((len + 1) as f64));
        Ok(())
    }

    /// Removes and returns the value at `index`
    pub fn array_list_remove_at(&mut self, list: Handle<JSObject>, index: usize) -> JsResult<Value> {
        let len = self.ctx.array_list_len(list);
        if index >= len {
            return Err(self.ctx.throw(JsError::Range(INDEX_OUT_OF_RANGE)));
        }
        let mut scope = HandleScope::new(self.ctx);
        let elements = scope.heap.get(list).elements();
        let elements: Handle<TaggedArray> = scope.heap.new_handle(elements);
        let removed = scope.heap.get(elements).get(index);
        scope.factory().remove_element_by_index(elements, index, len);
        scope.set_field(list, "length", Value::number((len - 1) as f64));
        Ok(removed)
    }

    /// Elements array of `list` with room for `needed` values, grown by
    /// half when full
    fn ensure_capacity(&mut self, list: Handle<JSObject>, needed: usize) -> Handle<TaggedArray> {
        let elements = self.ctx.heap.get(list).elements();
        let elements: Handle<TaggedArray> = self.ctx.heap.new_handle(elements);
        let capacity = self.ctx.heap.get(elements).len();
        if needed <= capacity {
            return elements;
        }
        let new_capacity = (capacity + (capacity >> 1)).max(needed);
        let grown = self.copy_array(elements, capacity, new_capacity, Value::hole());
        let grown_value = grown.value(&self.ctx.heap);
        self.ctx.set_elements(list, grown_value);
        grown
    }
}

fn backing_field(kind: JSType) -> &'static str {
    match kind {
        JSType::JsMap | JSType::JsWeakMap => "linked_map",
        JSType::JsSet | JSType::JsWeakSet => "linked_set",
        other => panic!("{:?} has no linked hash table", other),
    }
}

impl Context {
    fn backing_table(&self, collection: Handle<JSObject>) -> Address {
        let object = self.heap.get(collection);
        match object.field(backing_field(object.js_type())).to_address() {
            Some(addr) => addr,
            None => panic!("collection without a backing table"),
        }
    }

    fn is_object_value(&self, value: Value) -> bool {
        matches!(self.heap.value_cell(value), Some(HeapObject::Object(_)))
    }

    fn table_insert(&mut self, collection: Handle<JSObject>, key: Value, value: Value) {
        let table = self.backing_table(collection);
        self.heap
            .cast_mut::<PropertyTable>(table)
            .set(key, value, PropertyAttributes::default());
        self.heap.write_barrier(key);
        self.heap.write_barrier(value);
    }

    /// Map.prototype.set; weak maps accept only object keys
    pub fn map_set(&mut self, map: Handle<JSObject>, key: Value, value: Value) -> JsResult<()> {
        if self.heap.get(map).js_type() == JSType::JsWeakMap && !self.is_object_value(key) {
            return Err(self.throw(JsError::Type(INVALID_WEAK_MAP_KEY)));
        }
        self.table_insert(map, key, value);
        Ok(())
    }

    pub fn map_get(&self, map: Handle<JSObject>, key: Value) -> Option<Value> {
        self.heap.cast::<PropertyTable>(self.backing_table(map)).get_value(key)
    }

    pub fn map_has(&self, map: Handle<JSObject>, key: Value) -> bool {
        self.heap.cast::<PropertyTable>(self.backing_table(map)).has(key)
    }

    /// Removes `key`; true if it was present. Works on sets too.
    pub fn map_delete(&mut self, map: Handle<JSObject>, key: Value) -> bool {
        let table = self.backing_table(map);
        self.heap.cast_mut::<PropertyTable>(table).delete(key)
    }

    /// Set.prototype.add; weak sets accept only objects
    pub fn set_add(&mut self, set: Handle<JSObject>, value: Value) -> JsResult<()> {
        if self.heap.get(set).js_type() == JSType::JsWeakSet && !self.is_object_value(value) {
            return Err(self.throw(JsError::Type(INVALID_WEAK_SET_VALUE)));
        }
        self.table_insert(set, value, Value::undefined());
        Ok(())
    }

    pub fn set_has(&self, set: Handle<JSObject>, value: Value) -> bool {
        self.map_has(set, value)
    }

    pub fn set_delete(&mut self, set: Handle<JSObject>, value: Value) -> bool {
        self.map_delete(set, value)
    }

    /// Entry count of a Map, Set or weak variant
    pub fn collection_size(&self, collection: Handle<JSObject>) -> usize {
        self.heap.cast::<PropertyTable>(self.backing_table(collection)).len()
    }

    /// Keys of a Map or values of a Set, in insertion order
    pub fn collection_keys(&self, collection: Handle<JSObject>) -> Vec<Value> {
        self.heap
            .cast::<PropertyTable>(self.backing_table(collection))
            .keys()
            .collect()
    }

    pub fn array_list_len(&self, list: Handle<JSObject>) -> usize {
        self.get_field(list, "length").to_i32().map_or(0, |n| n.max(0) as usize)
    }

    pub fn array_list_get(&self, list: Handle<JSObject>, index: usize) -> Option<Value> {
        if index >= self.array_list_len(list) {
            return None;
        }
        let elements = self.heap.get(list).elements().to_address()?;
        self.heap.cast::<TaggedArray>(elements).try_get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_same_value_zero() {
        let mut ctx = Context::new();
        let map = ctx.factory().new_js_map();
        let name = ctx.factory().new_from_utf8("a");
        let name = name.value(&ctx.heap);
        ctx.map_set(map, Value::double(-0.0), Value::int(1)).unwrap();
        ctx.map_set(map, name, Value::int(2)).unwrap();
        ctx.map_set(map, Value::double(f64::NAN), Value::int(3)).unwrap();

        assert_eq!(ctx.map_get(map, Value::int(0)), Some(Value::int(1)));
        assert_eq!(ctx.map_get(map, Value::double(f64::NAN)), Some(Value::int(3)));
        let same = ctx.factory().new_from_utf8("a");
        assert_eq!(ctx.map_get(map, same.value(&ctx.heap)), Some(Value::int(2)));
        assert_eq!(ctx.collection_size(map), 3);

        assert!(ctx.map_delete(map, Value::int(0)));
        assert!(!ctx.map_has(map, Value::int(0)));
        assert_eq!(ctx.collection_size(map), 2);
    }

    #[test]
    fn test_map_keys_follow_moved_objects() {
        let mut ctx = Context::new();
        let map = ctx.factory().new_js_map();
        let key = ctx.factory().new_empty_js_object();
        let key_value = key.value(&ctx.heap);
        ctx.map_set(map, key_value, Value::int(5)).unwrap();
        ctx.collect_garbage();
        let moved = key.value(&ctx.heap);
        assert_ne!(moved, key_value);
        assert_eq!(ctx.map_get(map, moved), Some(Value::int(5)));
        assert_eq!(ctx.collection_keys(map), [moved]);
    }

    #[test]
    fn test_set_insertion_order() {
        let mut ctx = Context::new();
        let set = ctx.factory().new_js_set();
        for v in [3, 1, 2, 1] {
            ctx.set_add(set, Value::int(v)).unwrap();
        }
        assert_eq!(ctx.collection_keys(set), [Value::int(3), Value::int(1), Value::int(2)]);
        assert!(ctx.set_delete(set, Value::int(1)));
        assert!(!ctx.set_has(set, Value::int(1)));
        ctx.set_add(set, Value::int(1)).unwrap();
        assert_eq!(ctx.collection_keys(set), [Value::int(3), Value::int(2), Value::int(1)]);
    }

    #[test]
    fn test_weak_collections_reject_primitives() {
        let mut ctx = Context::new();
        let map = ctx.factory().new_js_weak_map();
        assert_eq!(
            ctx.map_set(map, Value::int(1), Value::int(1)),
            Err(JsError::Type(INVALID_WEAK_MAP_KEY))
        );
        assert!(ctx.clear_exception().is_some());

        let set = ctx.factory().new_js_weak_set();
        let object = ctx.factory().new_empty_js_object();
        let object = object.value(&ctx.heap);
        assert!(ctx.set_add(set, object).is_ok());
        assert!(ctx.set_add(set, Value::null()).is_err());
    }

    #[test]
    fn test_array_list() {
        let mut ctx = Context::new();
        let list = ctx.factory().new_container(JSType::JsApiArrayList);
        for i in 0..10 {
            ctx.factory().array_list_add(list, Value::int(i));
        }
        assert_eq!(ctx.array_list_len(list), 10);
        ctx.factory().array_list_insert(list, 0, Value::int(-1)).unwrap();
        assert_eq!(ctx.array_list_get(list, 0), Some(Value::int(-1)));
        assert_eq!(ctx.array_list_get(list, 10), Some(Value::int(9)));

        let removed = ctx.factory().array_list_remove_at(list, 1).unwrap();
        assert_eq!(removed, Value::int(0));
        assert_eq!(ctx.array_list_len(list), 10);
        assert_eq!(ctx.array_list_get(list, 1), Some(Value::int(1)));
        assert_eq!(ctx.array_list_get(list, 10), None);

        assert!(ctx.factory().array_list_insert(list, 42, Value::int(0)).is_err());
        assert!(ctx.factory().array_list_remove_at(list, 10).is_err());
    }

    #[test]
    #[should_panic(expected = "is not a container kind")]
    fn test_new_container_rejects_plain_kinds() {
        let mut ctx = Context::new();
        ctx.factory().new_container(JSType::JsMap);
    }
}
