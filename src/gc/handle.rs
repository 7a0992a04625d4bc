//! Rooted handles
//!
//! A [`Handle`] names a slot on the heap's handle stack. The collector treats
//! every slot as a root and rewrites it when it moves the object, so a handle
//! stays valid across allocations. Reading the object behind a handle
//! requires `&Heap`, while anything that can allocate takes `&mut Heap` (or
//! `&mut Context`): a reference obtained through a handle therefore cannot be
//! held across an allocation. Re-derive it from the handle instead.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use super::allocator::{Address, Heap};
use crate::context::Context;
use crate::runtime::object::HeapObject;
use crate::value::Value;

/// Typed view of a [`HeapObject`] variant
pub trait HeapCast: Sized {
    const NAME: &'static str;

    fn cast(object: &HeapObject) -> Option<&Self>;

    fn cast_mut(object: &mut HeapObject) -> Option<&mut Self>;
}

/// A GC-visible reference to a value of type `T`
///
/// `Handle<Value>` is used for arbitrary tagged values.
pub struct Handle<T> {
    slot: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle(#{})", self.slot)
    }
}

impl<T> Handle<T> {
    #[inline]
    pub(crate) const fn from_slot(slot: u32) -> Self {
        Handle {
            slot,
            _marker: PhantomData,
        }
    }

    /// Current value of the slot
    #[inline]
    pub fn value(self, heap: &Heap) -> Value {
        heap.handle_value(self.slot)
    }

    /// Current address of the object; the slot must hold a strong reference.
    #[inline]
    pub fn address(self, heap: &Heap) -> Address {
        match self.value(heap).to_address() {
            Some(addr) => addr,
            None => panic!("{:?} does not hold a heap object", self),
        }
    }

    /// Reinterprets the handle; the kind is checked on dereference.
    #[inline]
    pub const fn cast<U>(self) -> Handle<U> {
        Handle::from_slot(self.slot)
    }

    #[inline]
    pub const fn as_value(self) -> Handle<Value> {
        self.cast()
    }
}

impl Heap {
    /// Roots `value` in a new handle slot
    #[inline]
    pub fn new_handle<T>(&mut self, value: Value) -> Handle<T> {
        self.handles.push(value);
        Handle::from_slot((self.handles.len() - 1) as u32)
    }

    #[inline]
    pub(crate) fn handle_value(&self, slot: u32) -> Value {
        debug_assert!(
            (slot as usize) < self.handles.len(),
            "handle #{} used after its scope closed",
            slot
        );
        self.handles[slot as usize]
    }

    /// Repoints an existing handle
    #[inline]
    pub fn set_handle<T>(&mut self, handle: Handle<T>, value: Value) {
        self.handles[handle.slot as usize] = value;
    }

    #[inline]
    pub(crate) fn handle_count(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub(crate) fn truncate_handles(&mut self, len: usize) {
        self.handles.truncate(len);
    }

    /// Typed object at `addr`; a kind mismatch is an invariant violation.
    pub fn cast<T: HeapCast>(&self, addr: Address) -> &T {
        let object = self.cell(addr);
        match T::cast(object) {
            Some(typed) => typed,
            None => panic!("{:?} is a {:?}, not a {}", addr, object.js_type(), T::NAME),
        }
    }

    pub fn cast_mut<T: HeapCast>(&mut self, addr: Address) -> &mut T {
        let object = self.cell_mut(addr);
        let js_type = object.js_type();
        match T::cast_mut(object) {
            Some(typed) => typed,
            None => panic!("{:?} is a {:?}, not a {}", addr, js_type, T::NAME),
        }
    }

    /// Object behind a handle, borrowed from the heap
    #[inline]
    pub fn get<T: HeapCast>(&self, handle: Handle<T>) -> &T {
        self.cast(handle.address(self))
    }

    #[inline]
    pub fn get_mut<T: HeapCast>(&mut self, handle: Handle<T>) -> &mut T {
        let addr = handle.address(self);
        self.cast_mut(addr)
    }
}

/// Closes every handle created through it when dropped
///
/// Derefs to the [`Context`], so it can be used wherever a context is
/// expected. Nest scopes by opening one on top of another.
pub struct HandleScope<'a> {
    ctx: &'a mut Context,
    mark: usize,
}

impl<'a> HandleScope<'a> {
    pub fn new(ctx: &'a mut Context) -> Self {
        let mark = ctx.heap.handle_count();
        HandleScope { ctx, mark }
    }

    /// Moves `handle` into the enclosing scope and closes this one.
    pub fn escape<T>(mut self, handle: Handle<T>) -> Handle<T> {
        let value = handle.value(&self.ctx.heap);
        self.ctx.heap.truncate_handles(self.mark);
        let escaped = self.ctx.heap.new_handle(value);
        self.mark = self.ctx.heap.handle_count();
        escaped
    }
}

impl Deref for HandleScope<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.ctx
    }
}

impl DerefMut for HandleScope<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.ctx
    }
}

impl Drop for HandleScope<'_> {
    fn drop(&mut self) {
        self.ctx.heap.truncate_handles(self.mark);
    }
}
