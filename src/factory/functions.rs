//! Function objects
//!
//! A function is an object of a function kind pointing at a `Method`
//! record. Native functions register their Rust entry point in the
//! context's native table and keep the index in the method.

use super::ObjectFactory;
use crate::context::Context;
use crate::error::JsResult;
use crate::gc::{Handle, HandleScope};
use crate::runtime::function::{FunctionKind, NativeEntry, NativeFn};
use crate::runtime::layout::PropertyFlags;
use crate::runtime::object::{JSObject, JSType, Record};
use crate::value::Value;

impl ObjectFactory<'_> {
    /// Method record; `native_entry` is an index into the native table or -1
    pub fn new_method(&mut self, name: &str, kind: FunctionKind, native_entry: i32, arg_count: u32) -> Handle<Record> {
        let name = self.new_from_utf8(name);
        let method = self.new_record(JSType::Method);
        let name = name.value(&self.ctx.heap);
        self.ctx.set_field(method, "name", name);
        self.ctx.set_field(method, "native_entry", Value::int(native_entry));
        self.ctx.set_field(method, "function_kind", kind.to_value());
        self.ctx.set_field(method, "expected_arguments", Value::number(f64::from(arg_count)));
        method
    }

    /// Function object of `kind` running `method`
    pub fn new_js_function(&mut self, kind: FunctionKind, method: Handle<Record>) -> Handle<JSObject> {
        let function = self.new_js_object_with_init(kind.js_type());
        let method = method.value(&self.ctx.heap);
        self.ctx.set_field(function, "method", method);
        self.ctx.set_field(function, "function_kind", kind.to_value());
        function
    }

    /// Builtin function backed by `func`, with `name` and `length`
    /// properties
    pub fn new_native_function(&mut self, name: &'static str, func: NativeFn, arg_count: u32) -> Handle<JSObject> {
        let index = self.ctx.natives.register(NativeEntry { name, func, arg_count });
        let mut scope = HandleScope::new(self.ctx);
        let method = scope.factory().new_method(name, FunctionKind::Builtin, index as i32, arg_count);
        let function = scope.factory().new_js_function(FunctionKind::Builtin, method);

        let name_key = scope.factory().new_from_ascii(b"name");
        let name_value = scope.factory().new_from_utf8(name);
        let length_key = scope.factory().new_from_ascii(b"length");
        let (name_key, name_value, length_key) = (
            name_key.value(&scope.heap),
            name_value.value(&scope.heap),
            length_key.value(&scope.heap),
        );
        let flags = PropertyFlags::CONFIGURABLE;
        scope.factory().add_property(function, name_key, name_value, flags);
        scope.factory().add_property(function, length_key, Value::number(f64::from(arg_count)), flags);
        scope.escape(function)
    }

    /// Bound function over `target` with a fixed receiver and leading
    /// arguments
    pub fn new_bound_function(
        &mut self,
        target: Handle<JSObject>,
        bound_this: Handle<Value>,
        bound_arguments: Handle<crate::runtime::array::TaggedArray>,
    ) -> Handle<JSObject> {
        let bound = self.new_js_object_with_init(JSType::JsBoundFunction);
        let heap = &self.ctx.heap;
        let (target_method, target, this, arguments) = (
            heap.get(target).field("method"),
            target.value(heap),
            bound_this.value(heap),
            bound_arguments.value(heap),
        );
        self.ctx.set_field(bound, "method", target_method);
        self.ctx.set_field(bound, "bound_target", target);
        self.ctx.set_field(bound, "bound_this", this);
        self.ctx.set_field(bound, "bound_arguments", arguments);
        bound
    }

    /// Builtin helper closure of `kind` running `method`, with a `length`
    /// property
    fn new_builtin_closure(&mut self, kind: JSType, method: Handle<Record>, length: u32) -> Handle<JSObject> {
        let function = self.new_js_object_with_init(kind);
        let method = method.value(&self.ctx.heap);
        self.ctx.set_field(function, "method", method);
        self.ctx.set_field(function, "function_kind", FunctionKind::Builtin.to_value());
        let mut scope = HandleScope::new(self.ctx);
        let key = scope.factory().new_from_ascii(b"length");
        let key = key.value(&scope.heap);
        scope
            .factory()
            .add_property(function, key, Value::number(f64::from(length)), PropertyFlags::CONFIGURABLE);
        function
    }

    /// Resolve or reject function bound to `promise`; both functions of a
    /// pair share `already_resolved`.
    pub fn new_promise_reactions_function(
        &mut self,
        method: Handle<Record>,
        promise: Handle<Value>,
        already_resolved: Handle<Value>,
    ) -> Handle<JSObject> {
        let function = self.new_builtin_closure(JSType::JsPromiseReactionsFunction, method, 1);
        let (promise, already_resolved) = (promise.value(&self.ctx.heap), already_resolved.value(&self.ctx.heap));
        self.ctx.set_field(function, "promise", promise);
        self.ctx.set_field(function, "already_resolved", already_resolved);
        function
    }

    pub fn new_promise_executor_function(&mut self, method: Handle<Record>) -> Handle<JSObject> {
        self.new_builtin_closure(JSType::JsPromiseExecutorFunction, method, 2)
    }

    /// `Promise.all` resolve-element closure; the caller fills the
    /// bookkeeping fields.
    pub fn new_promise_all_resolve_element_function(&mut self, method: Handle<Record>) -> Handle<JSObject> {
        self.new_builtin_closure(JSType::JsPromiseAllResolveElementFunction, method, 1)
    }

    pub fn new_promise_any_reject_element_function(&mut self, method: Handle<Record>) -> Handle<JSObject> {
        self.new_builtin_closure(JSType::JsPromiseAnyRejectElementFunction, method, 1)
    }

    /// `Promise.allSettled` element closure, used for both the resolve and
    /// the reject side
    pub fn new_promise_all_settled_element_function(&mut self, method: Handle<Record>) -> Handle<JSObject> {
        self.new_builtin_closure(JSType::JsPromiseAllSettledElementFunction, method, 1)
    }

    /// `then`/`catch` closure created by `Promise.prototype.finally`
    pub fn new_promise_finally_function(
        &mut self,
        method: Handle<Record>,
        on_finally: Handle<Value>,
        constructor: Handle<Value>,
    ) -> Handle<JSObject> {
        let function = self.new_builtin_closure(JSType::JsPromiseFinallyFunction, method, 1);
        let (on_finally, constructor) = (on_finally.value(&self.ctx.heap), constructor.value(&self.ctx.heap));
        self.ctx.set_field(function, "on_finally", on_finally);
        self.ctx.set_field(function, "constructor", constructor);
        function
    }

    /// Returns or throws `result` when called
    pub fn new_promise_value_thunk_function(&mut self, method: Handle<Record>, result: Handle<Value>) -> Handle<JSObject> {
        let function = self.new_builtin_closure(JSType::JsPromiseValueThunkOrThrowerFunction, method, 0);
        let result = result.value(&self.ctx.heap);
        self.ctx.set_field(function, "result", result);
        function
    }
}

impl Context {
    /// Invokes a native function object
    ///
    /// # Panics
    /// Panics if `function` was not made by
    /// [`new_native_function`](ObjectFactory::new_native_function).
    pub fn call_native(&mut self, function: Handle<JSObject>, this: Value, args: &[Value]) -> JsResult<Value> {
        let method = self.heap.get(function).field("method");
        let entry = match self.heap.value_cell(method) {
            Some(crate::runtime::object::HeapObject::Record(record)) => record.field("native_entry"),
            _ => panic!("function has no method record"),
        };
        let native = entry
            .to_i32()
            .and_then(|idx| u32::try_from(idx).ok())
            .and_then(|idx| self.natives.get(idx).copied());
        match native {
            Some(native) => (native.func)(self, this, args),
            None => panic!("function has no native entry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JsError;

    fn sum(_: &mut Context, _: Value, args: &[Value]) -> JsResult<Value> {
        Ok(Value::int(args.iter().filter_map(|v| v.to_i32()).sum()))
    }

    fn fail(ctx: &mut Context, _: Value, _: &[Value]) -> JsResult<Value> {
        Err(ctx.throw(JsError::Type("nope")))
    }

    #[test]
    fn test_native_function() {
        let mut ctx = Context::new();
        let f = ctx.factory().new_native_function("sum", sum, 2);
        ctx.collect_garbage();
        let result = ctx.call_native(f, Value::undefined(), &[Value::int(2), Value::int(40)]);
        assert_eq!(result, Ok(Value::int(42)));

        let length = ctx.factory().new_from_ascii(b"length");
        let length = length.value(&ctx.heap);
        assert_eq!(ctx.get_own_property(f, length), Some(Value::int(2)));
        let name = ctx.factory().new_from_ascii(b"name");
        let expected = ctx.factory().new_from_ascii(b"sum");
        let name = name.value(&ctx.heap);
        assert_eq!(ctx.get_own_property(f, name), Some(expected.value(&ctx.heap)));

        let hclass = ctx.heap.get(f).hclass();
        let callable = match ctx.heap.value_cell(hclass) {
            Some(crate::runtime::object::HeapObject::HClass(h)) => h.is_callable(),
            _ => false,
        };
        assert!(callable);
    }

    #[test]
    fn test_native_error_sets_pending_exception() {
        let mut ctx = Context::new();
        let f = ctx.factory().new_native_function("fail", fail, 0);
        assert_eq!(ctx.call_native(f, Value::undefined(), &[]), Err(JsError::Type("nope")));
        assert!(ctx.has_pending_exception());
    }

    #[test]
    fn test_js_function_kinds() {
        let mut ctx = Context::new();
        let method = ctx.factory().new_method("gen", FunctionKind::Generator, -1, 0);
        let f = ctx.factory().new_js_function(FunctionKind::Generator, method);
        assert_eq!(ctx.heap.get(f).js_type(), JSType::JsGeneratorFunction);
        assert_eq!(FunctionKind::from_value(ctx.get_field(f, "function_kind")), Some(FunctionKind::Generator));
        assert_eq!(ctx.get_field(f, "method"), method.value(&ctx.heap));
        assert_eq!(ctx.get_field(method, "native_entry"), Value::int(-1));
    }

    #[test]
    fn test_bound_function() {
        let mut ctx = Context::new();
        let target = ctx.factory().new_native_function("sum", sum, 2);
        let this = ctx.heap.new_handle::<Value>(Value::int(7));
        let args = ctx.factory().new_tagged_array_with(JSType::TaggedArray, 1, Value::int(1));
        let bound = ctx.factory().new_bound_function(target, this, args);
        ctx.collect_garbage();
        assert_eq!(ctx.get_field(bound, "bound_target"), target.value(&ctx.heap));
        assert_eq!(ctx.get_field(bound, "bound_this"), Value::int(7));
        assert_eq!(ctx.get_field(bound, "method"), ctx.get_field(target, "method"));
        assert_eq!(ctx.heap.get(bound).js_type(), JSType::JsBoundFunction);
    }
    #[test]
    fn test_promise_closures() {
        let mut ctx = Context::new();
        let method = ctx.factory().new_method("resolve", FunctionKind::Builtin, -1, 1);
        let promise = ctx.factory().new_js_object_with_init(JSType::JsPromise).as_value();
        let flag = ctx.factory().new_record(JSType::PropertyBox).as_value();
        let resolve = ctx.factory().new_promise_reactions_function(method, promise, flag);
        let reject = ctx.factory().new_promise_reactions_function(method, promise, flag);
        ctx.collect_garbage();
        assert_eq!(ctx.heap.get(resolve).js_type(), JSType::JsPromiseReactionsFunction);
        assert_eq!(ctx.get_field(resolve, "promise"), promise.value(&ctx.heap));
        assert_eq!(ctx.get_field(resolve, "already_resolved"), ctx.get_field(reject, "already_resolved"));
        assert_eq!(ctx.get_field(resolve, "method"), method.value(&ctx.heap));

        let length = ctx.factory().new_from_ascii(b"length");
        let length = length.value(&ctx.heap);
        assert_eq!(ctx.get_own_property(resolve, length), Some(Value::int(1)));
        let executor = ctx.factory().new_promise_executor_function(method);
        assert_eq!(ctx.get_own_property(executor, length), Some(Value::int(2)));
        assert_eq!(ctx.get_field(executor, "capability"), Value::undefined());

        let element = ctx.factory().new_promise_all_settled_element_function(method);
        assert_eq!(ctx.get_field(element, "index"), Value::int(0));
        let element = ctx.factory().new_promise_all_resolve_element_function(method);
        assert_eq!(ctx.get_field(element, "already_called"), Value::undefined());
        let element = ctx.factory().new_promise_any_reject_element_function(method);
        assert_eq!(ctx.heap.get(element).js_type(), JSType::JsPromiseAnyRejectElementFunction);

        let undefined = ctx.heap.new_handle::<Value>(Value::undefined());
        let finally = ctx.factory().new_promise_finally_function(method, promise, undefined);
        assert_eq!(ctx.get_field(finally, "on_finally"), promise.value(&ctx.heap));
        let thunk = ctx.factory().new_promise_value_thunk_function(method, promise);
        assert_eq!(ctx.get_field(thunk, "result"), promise.value(&ctx.heap));
        assert_eq!(ctx.get_own_property(thunk, length), Some(Value::int(0)));
    }
}
