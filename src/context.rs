//! Runtime context
//!
//! The Context is the main entry point of the object model. It owns the
//! heap, the string table, the per-kind root hidden classes and the
//! transition cache, and records the pending exception. Every allocation
//! goes through [`Context::allocate`], which retries once after a
//! collection before giving up.

use std::fmt;

use tracing::{debug, error, warn};

use crate::error::JsError;
use crate::factory::{ObjectFactory, TransitionCache};
use crate::gc::{Address, CollectStats, Handle, HandleScope, Heap, SpaceKind};
use crate::options::RuntimeOptions;
use crate::runtime::array::TaggedArray;
use crate::runtime::function::NativeTable;
use crate::runtime::hclass::HClass;
use crate::runtime::layout::LayoutInfo;
use crate::runtime::object::{HeapObject, JSObject, JSType, Record, Storage};
use crate::runtime::string::{EcmaString, StringTable};
use crate::value::Value;

/// Objects created at bootstrap and kept alive for the context's lifetime
///
/// All of them live in spaces that never move, so the raw values stay valid.
#[derive(Debug)]
pub(crate) struct GlobalConstants {
    /// Root hidden class of every kind, indexed by `JSType as usize`
    root_hclasses: Vec<Value>,
    pub(crate) empty_array: Value,
    pub(crate) empty_string: Value,
    pub(crate) empty_layout: Value,
    pub(crate) global_env: Value,
}

impl GlobalConstants {
    #[inline]
    pub(crate) fn root_hclass(&self, kind: JSType) -> Value {
        self.root_hclasses[kind as usize]
    }

    fn values(&self) -> Vec<Value> {
        let mut values = self.root_hclasses.clone();
        values.extend([
            self.empty_array,
            self.empty_string,
            self.empty_layout,
            self.global_env,
        ]);
        values
    }
}

/// Runtime context
pub struct Context {
    /// The object heap
    pub(crate) heap: Heap,

    /// Interned strings, swept after each collection
    pub(crate) string_table: StringTable,

    pub(crate) globals: GlobalConstants,

    /// Recently taken hidden-class transitions
    pub(crate) transition_cache: TransitionCache,

    /// Registered native entry points
    pub(crate) natives: NativeTable,

    pub(crate) options: RuntimeOptions,

    /// Error object of the last throw, until cleared
    pending_exception: Option<Value>,

    /// Counter feeding symbol hashes
    symbol_counter: u32,
}

impl Context {
    /// Create a context with default options
    pub fn new() -> Self {
        Self::with_options(RuntimeOptions::default())
    }

    /// Create a context; bootstraps the read-only space, the root hidden
    /// classes and the global environment.
    pub fn with_options(options: RuntimeOptions) -> Self {
        let mut ctx = Context {
            heap: Heap::new(&options),
            string_table: StringTable::new(),
            globals: GlobalConstants {
                root_hclasses: Vec::new(),
                empty_array: Value::undefined(),
                empty_string: Value::undefined(),
                empty_layout: Value::undefined(),
                global_env: Value::undefined(),
            },
            transition_cache: TransitionCache::new(options.transition_cache_size),
            natives: NativeTable::default(),
            options,
            pending_exception: None,
            symbol_counter: 0,
        };
        ctx.bootstrap();
        ctx
    }

    fn bootstrap(&mut self) {
        let empty_array = TaggedArray::new(JSType::TaggedArray, 0, Value::hole());
        let empty_array = self.allocate(SpaceKind::ReadOnly, HeapObject::TaggedArray(empty_array));
        self.globals.empty_array = Value::from_address(empty_array);

        let empty_string = self.allocate(SpaceKind::ReadOnly, HeapObject::String(EcmaString::new(b"")));
        self.string_table.insert(b"", empty_string);
        self.globals.empty_string = Value::from_address(empty_string);
        self.heap.seal_read_only();

        let empty_layout = self.allocate(SpaceKind::Old, HeapObject::Layout(LayoutInfo::with_capacity(0)));
        self.globals.empty_layout = Value::from_address(empty_layout);

        self.globals.root_hclasses.reserve(JSType::ALL.len());
        for &kind in JSType::ALL {
            let hclass = root_hclass_for(kind, self.options.inline_properties, self.globals.empty_layout);
            let addr = self.allocate(SpaceKind::NonMovable, HeapObject::HClass(Box::new(hclass)));
            self.globals.root_hclasses.push(Value::from_address(addr));
        }

        let env = Record::with_defaults(JSType::GlobalEnv, self.globals.root_hclass(JSType::GlobalEnv));
        let env = self.allocate(JSType::GlobalEnv.default_space(), HeapObject::Record(env));
        self.globals.global_env = Value::from_address(env);
        debug!(kinds = JSType::ALL.len(), "context bootstrapped");
    }

    /// Object factory borrowing this context
    #[inline]
    pub fn factory(&mut self) -> ObjectFactory<'_> {
        ObjectFactory::new(self)
    }

    #[inline]
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    #[inline]
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// The global environment record
    pub fn global_env(&self) -> Value {
        self.globals.global_env
    }

    /// Places `object` in `space`, collecting once if it does not fit.
    ///
    /// `object` must only reference objects that do not move; anything it
    /// references is kept alive across the collection.
    ///
    /// # Panics
    /// Aborts the process when the space is still exhausted after the
    /// collection.
    pub(crate) fn allocate(&mut self, space: SpaceKind, object: HeapObject) -> Address {
        let size = object.size_in_bytes();
        if self.options.stress_gc {
            self.collect_keeping(&object);
        } else if !self.heap.has_room(space, size) {
            warn!(?space, size, "allocation failed, collecting");
            self.collect_keeping(&object);
        }
        match self.heap.try_allocate(space, object) {
            Ok(addr) => addr,
            Err(err) => {
                error!(%err, ?space, size, "out of memory");
                std::process::abort();
            }
        }
    }

    fn collect_keeping(&mut self, object: &HeapObject) -> CollectStats {
        let mut referenced = Vec::new();
        object.visit_values(&mut |v| {
            if v.is_strong() {
                referenced.push(v);
            }
        });
        self.collect_with_roots(&mut referenced)
    }

    /// Runs a full collection; roots are the handle stack, the global
    /// constants and the pending exception.
    pub fn collect_garbage(&mut self) -> CollectStats {
        self.collect_with_roots(&mut [])
    }

    fn collect_with_roots(&mut self, extra: &mut [Value]) -> CollectStats {
        let mut roots = self.globals.values();
        let globals_len = roots.len();
        roots.extend(self.pending_exception);
        roots.extend_from_slice(extra);

        let stats = self.heap.collect(&mut roots);

        if self.pending_exception.is_some() {
            self.pending_exception = Some(roots[globals_len]);
        }
        let extra_start = roots.len() - extra.len();
        extra.copy_from_slice(&roots[extra_start..]);
        let swept = self.string_table.sweep(&self.heap);
        self.transition_cache.clear();
        debug!(swept_strings = swept, "string table swept");
        stats
    }

    /// Records `error` as the pending exception: allocates the matching
    /// error object with a `message` property. Returns `error` so callers
    /// can write `Err(ctx.throw(..))`.
    pub fn throw(&mut self, error: JsError) -> JsError {
        let kind = match error {
            JsError::Range(_) => JSType::JsRangeError,
            JsError::Type(_) => JSType::JsTypeError,
        };
        let object = {
            let mut scope = HandleScope::new(self);
            let object = scope.factory().new_js_error(kind, error.message());
            object.value(&scope.heap)
        };
        self.pending_exception = Some(object);
        debug!(%error, "exception thrown");
        error
    }

    #[inline]
    pub fn pending_exception(&self) -> Option<Value> {
        self.pending_exception
    }

    #[inline]
    pub fn has_pending_exception(&self) -> bool {
        self.pending_exception.is_some()
    }

    /// Clears and returns the pending exception
    pub fn clear_exception(&mut self) -> Option<Value> {
        self.pending_exception.take()
    }

    /// Declared field of an object or record
    pub fn get_field<T>(&self, target: Handle<T>, name: &str) -> Value {
        match self.heap.cell(target.address(&self.heap)) {
            HeapObject::Object(object) => object.field(name),
            HeapObject::Record(record) => record.field(name),
            other => panic!("{:?} has no declared fields", other.js_type()),
        }
    }

    /// Stores a declared field through the write barrier
    pub fn set_field<T>(&mut self, target: Handle<T>, name: &str, value: Value) {
        let addr = target.address(&self.heap);
        match self.heap.cell_mut(addr) {
            HeapObject::Object(object) => object.set_field(name, value),
            HeapObject::Record(record) => record.set_field(name, value),
            other => panic!("{:?} has no declared fields", other.js_type()),
        }
        self.heap.write_barrier(value);
    }

    /// Stores an array slot through the write barrier
    pub fn array_set(&mut self, array: Handle<TaggedArray>, index: usize, value: Value) {
        self.heap.get_mut(array).set(index, value);
        self.heap.write_barrier(value);
    }

    pub(crate) fn set_elements(&mut self, object: Handle<JSObject>, elements: Value) {
        self.heap.get_mut(object).elements = elements;
        self.heap.write_barrier(elements);
    }

    pub(crate) fn set_properties(&mut self, object: Handle<JSObject>, properties: Value) {
        self.heap.get_mut(object).properties = properties;
        self.heap.write_barrier(properties);
    }

    pub(crate) fn next_symbol_hash(&mut self) -> u32 {
        self.symbol_counter = self.symbol_counter.wrapping_add(1);
        self.symbol_counter.wrapping_mul(0x9E37_79B9)
    }

    /// Get memory usage statistics
    pub fn memory_stats(&self) -> MemoryStats {
        let stats = self.heap.stats();
        let total: usize = stats.spaces.iter().map(|s| s.limit).sum();
        let heap_used = stats.total_used();
        MemoryStats {
            total,
            heap_used,
            free: total.saturating_sub(heap_used),
            objects: stats.spaces.iter().map(|s| s.objects).sum(),
            handles: stats.handles,
            interned_strings: self.string_table.len(),
            collections: stats.collections,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Instance size in bytes implied by a kind's layout, zero for kinds whose
/// size depends on their contents
pub(crate) fn instance_size(kind: JSType, inline_properties: u32) -> u32 {
    let fields = kind.fields().len();
    let size = match kind.storage() {
        Storage::Object => JSObject::HEADER_SIZE + (inline_properties as usize + fields) * 8,
        Storage::Record => 8 + fields * 8,
        _ => 0,
    };
    size as u32
}

fn root_hclass_for(kind: JSType, inline: u32, empty_layout: Value) -> HClass {
    let inline = if kind.is_js_object() { inline } else { 0 };
    HClass::new(kind, instance_size(kind, inline), inline, empty_layout)
}

/// Memory usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    /// Sum of all space limits
    pub total: usize,
    /// Bytes charged to live objects
    pub heap_used: usize,
    /// Bytes still available across spaces
    pub free: usize,
    /// Live objects
    pub objects: usize,
    /// Open handle slots
    pub handles: usize,
    pub interned_strings: usize,
    pub collections: usize,
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} objects, {} / {} bytes used, {} handles, {} interned strings, {} collections",
            self.objects,
            self.heap_used,
            self.total,
            self.handles,
            self.interned_strings,
            self.collections
        )
    }
}
