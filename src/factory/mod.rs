//! Object factory
//!
//! Every heap object is created here. A `new_*` call allocates in the kind's
//! designated space, roots the result in a handle on the current scope,
//! writes every declared field to its default and then runs the kind's
//! initializer (see [`init`]). The returned handle stays valid across later
//! allocations; raw values read from it do not.
//!
//! The factory borrows the context mutably, so use one per call chain:
//! `ctx.factory().new_js_map()`.

mod arrays;
mod collections;
mod functions;
mod init;
mod properties;
mod records;

pub use properties::{key_hash, MAX_GAP};
pub use records::{CompletionType, ReactionType};
pub(crate) use properties::TransitionCache;

use crate::bigint::BigInt;
use crate::context::{instance_size, Context};
use crate::gc::{Handle, SpaceKind};
use crate::runtime::array::{ByteArray, TaggedArray, MAX_ARRAY_LENGTH};
use crate::runtime::hclass::HClass;
use crate::runtime::layout::LayoutInfo;
use crate::runtime::object::{HeapObject, JSObject, JSType, Record, Storage};
use crate::runtime::property::PropertyTable;
use crate::runtime::string::{EcmaString, JSSymbol, SymbolFlags};
use crate::value::Value;

pub struct ObjectFactory<'a> {
    ctx: &'a mut Context,
}

impl<'a> ObjectFactory<'a> {
    pub(crate) fn new(ctx: &'a mut Context) -> Self {
        ObjectFactory { ctx }
    }

    /// Allocates and roots
    fn alloc<T>(&mut self, space: SpaceKind, object: HeapObject) -> Handle<T> {
        let addr = self.ctx.allocate(space, object);
        self.ctx.heap.new_handle(Value::from_address(addr))
    }

    fn root_hclass(&self, kind: JSType) -> Value {
        self.ctx.globals.root_hclass(kind)
    }

    /// Default instance of any kind, dispatched on its storage shape
    pub fn new_heap_object(&mut self, kind: JSType) -> Handle<Value> {
        match kind.storage() {
            Storage::HClass => {
                let inline = self.ctx.options.inline_properties;
                self.new_hclass(JSType::JsObject, inline, None).as_value()
            }
            Storage::TaggedArray if kind == JSType::TaggedArray => self.new_tagged_array(0).as_value(),
            Storage::TaggedArray => self.new_tagged_array_with(kind, 0, Value::hole()).as_value(),
            Storage::Layout => self.new_layout(0).as_value(),
            Storage::Table => self.new_property_table(kind, 0).as_value(),
            Storage::String => self.new_from_ascii(b"").as_value(),
            Storage::Symbol => self.new_symbol(None).as_value(),
            Storage::BigInt => self.new_bigint(false, Vec::new()).as_value(),
            Storage::ByteArray => self.new_byte_array(0).as_value(),
            Storage::Record => self.new_record(kind).as_value(),
            Storage::Object => self.new_js_object_with_init(kind).as_value(),
        }
    }

    /// Fresh hidden class with an empty layout, in the non-movable space
    pub fn new_hclass(
        &mut self,
        kind: JSType,
        inline_properties: u32,
        prototype: Option<Handle<Value>>,
    ) -> Handle<HClass> {
        let inline = if kind.is_js_object() { inline_properties } else { 0 };
        let hclass = HClass::new(
            kind,
            instance_size(kind, inline),
            inline,
            self.ctx.globals.empty_layout,
        );
        let handle: Handle<HClass> = self.alloc(SpaceKind::NonMovable, HeapObject::HClass(Box::new(hclass)));
        if let Some(prototype) = prototype {
            let prototype = prototype.value(&self.ctx.heap);
            self.ctx.heap.get_mut(handle).set_prototype(prototype);
            self.ctx.heap.write_barrier(prototype);
        }
        tracing::trace!(?kind, inline, "hidden class created");
        handle
    }

    /// Object of `kind` using the kind's root hidden class
    pub fn new_js_object_with_init(&mut self, kind: JSType) -> Handle<JSObject> {
        let hclass = self.root_hclass(kind);
        let handle = self.new_js_object_raw(kind, hclass);
        self.initialize_heap_object(kind, handle.as_value());
        handle
    }

    /// Object shaped by `hclass`
    pub fn new_js_object(&mut self, hclass: Handle<HClass>) -> Handle<JSObject> {
        let kind = self.ctx.heap.get(hclass).js_type();
        let hclass = hclass.value(&self.ctx.heap);
        let handle = self.new_js_object_raw(kind, hclass);
        self.initialize_heap_object(kind, handle.as_value());
        handle
    }

    fn new_js_object_raw(&mut self, kind: JSType, hclass: Value) -> Handle<JSObject> {
        debug_assert!(kind.is_js_object(), "{:?} is not an object kind", kind);
        let inline = match hclass.to_address() {
            Some(addr) => self.ctx.heap.cast::<HClass>(addr).inline_properties(),
            None => 0,
        };
        let object = JSObject::with_defaults(kind, hclass, inline, self.ctx.globals.empty_array);
        self.alloc(kind.default_space(), HeapObject::Object(object))
    }

    pub fn new_empty_js_object(&mut self) -> Handle<JSObject> {
        self.new_js_object_with_init(JSType::JsObject)
    }

    /// Array whose elements are copies of `values`
    pub fn new_js_array_from_list(&mut self, values: &[Handle<Value>]) -> Handle<JSObject> {
        let elements = self.new_tagged_array(values.len());
        for (i, value) in values.iter().enumerate() {
            let value = value.value(&self.ctx.heap);
            self.ctx.array_set(elements, i, value);
        }
        self.new_js_array_with_elements(elements)
    }

    pub fn new_js_array_with_elements(&mut self, elements: Handle<TaggedArray>) -> Handle<JSObject> {
        let array = self.new_js_object_with_init(JSType::JsArray);
        let len = self.ctx.heap.get(elements).len();
        let elements = elements.value(&self.ctx.heap);
        self.ctx.set_elements(array, elements);
        self.ctx.set_field(array, "length", Value::number(len as f64));
        array
    }

    /// Internal record of `kind`
    pub fn new_record(&mut self, kind: JSType) -> Handle<Record> {
        let record = Record::with_defaults(kind, self.root_hclass(kind));
        let handle: Handle<Record> = self.alloc(kind.default_space(), HeapObject::Record(record));
        self.initialize_heap_object(kind, handle.as_value());
        handle
    }

    /// Hole-filled tagged array; zero length yields the shared empty array
    pub fn new_tagged_array(&mut self, len: usize) -> Handle<TaggedArray> {
        if len == 0 {
            let empty = self.ctx.globals.empty_array;
            return self.ctx.heap.new_handle(empty);
        }
        self.new_tagged_array_with(JSType::TaggedArray, len, Value::hole())
    }

    /// Tagged array of `kind` with every slot set to `init`, which must not
    /// be a movable object.
    pub fn new_tagged_array_with(&mut self, kind: JSType, len: usize, init: Value) -> Handle<TaggedArray> {
        self.new_tagged_array_in(SpaceKind::Young, kind, len, init)
    }

    pub fn new_tagged_array_in(
        &mut self,
        space: SpaceKind,
        kind: JSType,
        len: usize,
        init: Value,
    ) -> Handle<TaggedArray> {
        assert!(len <= MAX_ARRAY_LENGTH, "tagged array length {} out of range", len);
        debug_assert_eq!(kind.storage(), Storage::TaggedArray);
        let array = TaggedArray::new(kind, len, Value::hole());
        let handle: Handle<TaggedArray> = self.alloc(space, HeapObject::TaggedArray(array));
        if !init.is_hole() && len > 0 {
            self.ctx.heap.get_mut(handle).as_mut_slice().fill(init);
            self.ctx.heap.write_barrier(init);
        }
        handle
    }

    pub fn new_byte_array(&mut self, len: usize) -> Handle<ByteArray> {
        self.alloc(JSType::ByteArray.default_space(), HeapObject::ByteArray(ByteArray::new(len)))
    }

    pub fn new_layout(&mut self, capacity: u32) -> Handle<LayoutInfo> {
        let layout = LayoutInfo::with_capacity(capacity);
        self.alloc(JSType::LayoutInfo.default_space(), HeapObject::Layout(layout))
    }

    pub fn new_property_table(&mut self, kind: JSType, capacity: usize) -> Handle<PropertyTable> {
        let table = PropertyTable::with_capacity(kind, capacity);
        self.alloc(kind.default_space(), HeapObject::Table(table))
    }

    /// Interned string: equal contents resolve to one heap string
    pub fn new_from_utf8(&mut self, text: &str) -> Handle<EcmaString> {
        self.intern(text.as_bytes())
    }

    pub fn new_from_ascii(&mut self, bytes: &[u8]) -> Handle<EcmaString> {
        debug_assert!(bytes.is_ascii());
        self.intern(bytes)
    }

    fn intern(&mut self, bytes: &[u8]) -> Handle<EcmaString> {
        if let Some(addr) = self.ctx.string_table.lookup(bytes) {
            return self.ctx.heap.new_handle(Value::from_address(addr));
        }
        let handle: Handle<EcmaString> =
            self.alloc(JSType::String.default_space(), HeapObject::String(EcmaString::new(bytes)));
        let addr = handle.address(&self.ctx.heap);
        self.ctx.string_table.insert(bytes, addr);
        handle
    }

    pub fn new_symbol(&mut self, description: Option<Handle<EcmaString>>) -> Handle<JSSymbol> {
        self.new_symbol_with_flags(description, SymbolFlags::empty())
    }

    /// Symbol usable as a private name
    pub fn new_private_symbol(&mut self, description: Option<Handle<EcmaString>>) -> Handle<JSSymbol> {
        self.new_symbol_with_flags(description, SymbolFlags::PRIVATE)
    }

    fn new_symbol_with_flags(
        &mut self,
        description: Option<Handle<EcmaString>>,
        flags: SymbolFlags,
    ) -> Handle<JSSymbol> {
        // Strings live in the old space; the description value stays put.
        let description = description.map_or(Value::undefined(), |d| d.value(&self.ctx.heap));
        let hash = self.ctx.next_symbol_hash();
        let symbol = JSSymbol::new(description, hash, flags);
        self.alloc(JSType::Symbol.default_space(), HeapObject::Symbol(symbol))
    }

    /// BigInt from a sign and little-endian magnitude
    pub fn new_bigint(&mut self, sign: bool, magnitude: Vec<u32>) -> Handle<BigInt> {
        let bigint = BigInt::from_digits(sign, magnitude);
        self.alloc(JSType::BigInt.default_space(), HeapObject::BigInt(bigint))
    }

    /// Language-level error object carrying `message` as a property
    pub fn new_js_error(&mut self, kind: JSType, message: &str) -> Handle<JSObject> {
        debug_assert!(kind.is_error());
        let error = self.new_js_object_with_init(kind);
        let key = self.new_from_ascii(b"message");
        let message = self.new_from_utf8(message);
        let key = key.value(&self.ctx.heap);
        let message = message.value(&self.ctx.heap);
        self.add_property(error, key, message, crate::runtime::layout::PropertyFlags::DEFAULT);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::HandleScope;

    #[test]
    fn test_strings_are_interned() {
        let mut ctx = Context::new();
        let a = ctx.factory().new_from_utf8("length");
        let b = ctx.factory().new_from_ascii(b"length");
        let c = ctx.factory().new_from_utf8("lengths");
        assert_eq!(a.value(&ctx.heap), b.value(&ctx.heap));
        assert_ne!(a.value(&ctx.heap), c.value(&ctx.heap));
        assert_eq!(a.address(&ctx.heap).space(), SpaceKind::Old);
        assert_eq!(ctx.heap.get(c).len(), 7);
        let empty = ctx.factory().new_from_utf8("");
        assert_eq!(empty.value(&ctx.heap), ctx.globals.empty_string);
    }

    #[test]
    fn test_dead_strings_are_reinterned() {
        let mut ctx = Context::new();
        let before = {
            let mut scope = HandleScope::new(&mut ctx);
            let s = scope.factory().new_from_utf8("transient");
            s.value(&scope.heap)
        };
        ctx.collect_garbage();
        assert!(ctx.string_table.lookup(b"transient").is_none());
        let after = ctx.factory().new_from_utf8("transient");
        assert!(ctx.heap.is_live(after.address(&ctx.heap)));
        assert!(!ctx.heap.is_live(before.to_address().unwrap()) || before == after.value(&ctx.heap));
    }

    #[test]
    fn test_zero_length_array_is_shared() {
        let mut ctx = Context::new();
        let a = ctx.factory().new_tagged_array(0);
        let b = ctx.factory().new_tagged_array(0);
        assert_eq!(a.value(&ctx.heap), b.value(&ctx.heap));
        assert_eq!(a.address(&ctx.heap).space(), SpaceKind::ReadOnly);
        let c = ctx.factory().new_tagged_array(3);
        assert_eq!(c.address(&ctx.heap).space(), SpaceKind::Young);
        assert!(ctx.heap.get(c).iter().all(|v| v.is_hole()));
    }

    #[test]
    fn test_large_array_goes_to_huge_space() {
        let options = crate::RuntimeOptions::default().with_large_object_threshold(1024);
        let mut ctx = Context::with_options(options);
        let big = ctx.factory().new_tagged_array(512);
        assert_eq!(big.address(&ctx.heap).space(), SpaceKind::Huge);
        let filled = ctx.factory().new_tagged_array_with(JSType::TaggedArray, 4, Value::int(9));
        assert_eq!(ctx.heap.get(filled).as_slice(), &[Value::int(9); 4]);
    }

    #[test]
    fn test_hclass_prototype() {
        let mut ctx = Context::new();
        let proto = ctx.factory().new_empty_js_object();
        let hclass = ctx.factory().new_hclass(JSType::JsObject, 2, Some(proto.as_value()));
        assert_eq!(hclass.address(&ctx.heap).space(), SpaceKind::NonMovable);
        ctx.collect_garbage();
        let hclass_ref = ctx.heap.get(hclass);
        assert_eq!(hclass_ref.prototype(), proto.value(&ctx.heap));
        assert_eq!(hclass_ref.inline_properties(), 2);

        let object = ctx.factory().new_js_object(hclass);
        assert_eq!(ctx.heap.get(object).inline_count(), 2);
        assert_eq!(ctx.heap.get(object).hclass(), hclass.value(&ctx.heap));
    }

    #[test]
    fn test_symbols() {
        let mut ctx = Context::new();
        let desc = ctx.factory().new_from_utf8("tag");
        let a = ctx.factory().new_symbol(Some(desc));
        let b = ctx.factory().new_symbol(Some(desc));
        let p = ctx.factory().new_private_symbol(None);
        let (sa, sb) = (ctx.heap.get(a), ctx.heap.get(b));
        assert_eq!(sa.description(), desc.value(&ctx.heap));
        assert_ne!(sa.hash(), sb.hash());
        assert!(!sa.is_private());
        assert!(ctx.heap.get(p).is_private());
        assert!(ctx.heap.get(p).description().is_undefined());
    }

    #[test]
    fn test_array_from_list() {
        let mut ctx = Context::new();
        let one = ctx.heap.new_handle::<Value>(Value::int(1));
        let s = ctx.factory().new_from_utf8("two");
        let array = ctx.factory().new_js_array_from_list(&[one, s.as_value()]);
        ctx.collect_garbage();
        let object = ctx.heap.get(array);
        assert_eq!(object.field("length"), Value::int(2));
        let elements: &TaggedArray = ctx.heap.cast(object.elements().to_address().unwrap());
        assert_eq!(elements.as_slice(), &[Value::int(1), s.value(&ctx.heap)]);
    }

    #[test]
    fn test_bigint_is_canonical() {
        let mut ctx = Context::new();
        let zero = ctx.factory().new_bigint(true, vec![0, 0]);
        let b = ctx.heap.get(zero);
        assert!(b.is_zero());
        assert!(!b.sign());
        assert_eq!(b.len(), 0);
    }
}
