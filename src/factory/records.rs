//! Internal records: promise machinery, module entries, accessors
//!
//! Heap-valued inputs are passed as handles and read back after the record
//! is allocated, so they may be young.

use super::ObjectFactory;
use crate::gc::Handle;
use crate::runtime::array::TaggedArray;
use crate::runtime::object::{JSType, Record};
use crate::value::Value;

/// Which reaction list a promise reaction belongs to
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionType {
    Fulfill = 0,
    Reject = 1,
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionType {
    Normal = 0,
    Break = 1,
    Continue = 2,
    Return = 3,
    Throw = 4,
}

impl ObjectFactory<'_> {
    /// Record of `kind` with the named fields set from handles
    fn new_record_with(&mut self, kind: JSType, fields: &[(&str, Handle<Value>)]) -> Handle<Record> {
        let record = self.new_record(kind);
        for &(name, value) in fields {
            let value = value.value(&self.ctx.heap);
            self.ctx.set_field(record, name, value);
        }
        record
    }

    pub fn new_promise_capability(
        &mut self,
        promise: Handle<Value>,
        resolve: Handle<Value>,
        reject: Handle<Value>,
    ) -> Handle<Record> {
        self.new_record_with(
            JSType::PromiseCapability,
            &[("promise", promise), ("resolve", resolve), ("reject", reject)],
        )
    }

    pub fn new_promise_reaction(
        &mut self,
        capability: Handle<Value>,
        handler: Handle<Value>,
        reaction_type: ReactionType,
    ) -> Handle<Record> {
        let reaction = self.new_record_with(
            JSType::PromiseReaction,
            &[("promise_or_capability", capability), ("handler", handler)],
        );
        self.ctx.set_field(reaction, "type", Value::int(reaction_type as i32));
        reaction
    }

    pub fn new_promise_iterator_record(&mut self, iterator: Handle<Value>, done: bool) -> Handle<Record> {
        let record = self.new_record_with(JSType::PromiseIteratorRecord, &[("iterator", iterator)]);
        self.ctx.set_field(record, "done", Value::bool(done));
        record
    }

    pub fn new_completion_record(&mut self, completion: CompletionType, value: Handle<Value>) -> Handle<Record> {
        let record = self.new_record_with(JSType::CompletionRecord, &[("value", value)]);
        self.ctx.set_field(record, "type", Value::int(completion as i32));
        record
    }

    pub fn new_pending_job(&mut self, job: Handle<Value>, arguments: Handle<TaggedArray>) -> Handle<Record> {
        self.new_record_with(JSType::PendingJob, &[("job", job), ("arguments", arguments.as_value())])
    }

    pub fn new_import_entry(
        &mut self,
        module_request: Handle<Value>,
        import_name: Handle<Value>,
        local_name: Handle<Value>,
    ) -> Handle<Record> {
        self.new_record_with(
            JSType::ImportEntry,
            &[
                ("module_request", module_request),
                ("import_name", import_name),
                ("local_name", local_name),
            ],
        )
    }

    pub fn new_local_export_entry(&mut self, export_name: Handle<Value>, local_name: Handle<Value>) -> Handle<Record> {
        self.new_record_with(
            JSType::LocalExportEntry,
            &[("export_name", export_name), ("local_name", local_name)],
        )
    }

    pub fn new_indirect_export_entry(
        &mut self,
        export_name: Handle<Value>,
        module_request: Handle<Value>,
        import_name: Handle<Value>,
    ) -> Handle<Record> {
        self.new_record_with(
            JSType::IndirectExportEntry,
            &[
                ("export_name", export_name),
                ("module_request", module_request),
                ("import_name", import_name),
            ],
        )
    }

    pub fn new_star_export_entry(&mut self, module_request: Handle<Value>) -> Handle<Record> {
        self.new_record_with(JSType::StarExportEntry, &[("module_request", module_request)])
    }

    /// Source text module with empty entry lists
    pub fn new_source_text_module(&mut self) -> Handle<Record> {
        let module = self.new_record(JSType::SourceTextModule);
        let empty = self.ctx.globals.empty_array;
        for name in [
            "requested_modules",
            "import_entries",
            "local_export_entries",
            "indirect_export_entries",
            "star_export_entries",
        ] {
            self.ctx.set_field(module, name, empty);
        }
        module
    }

    pub fn new_resolved_binding(&mut self, module: Handle<Value>, binding_name: Handle<Value>) -> Handle<Record> {
        self.new_record_with(
            JSType::ResolvedBinding,
            &[("module", module), ("binding_name", binding_name)],
        )
    }

    pub fn new_resolved_index_binding(&mut self, module: Handle<Value>, index: i32) -> Handle<Record> {
        let binding = self.new_record_with(JSType::ResolvedIndexBinding, &[("module", module)]);
        self.ctx.set_field(binding, "index", Value::int(index));
        binding
    }

    pub fn new_accessor_data(&mut self, getter: Handle<Value>, setter: Handle<Value>) -> Handle<Record> {
        self.new_record_with(JSType::AccessorData, &[("getter", getter), ("setter", setter)])
    }

    pub fn new_property_box(&mut self, value: Handle<Value>) -> Handle<Record> {
        self.new_record_with(JSType::PropertyBox, &[("value", value)])
    }

    pub fn new_program(&mut self, main_function: Handle<Value>) -> Handle<Record> {
        self.new_record_with(JSType::Program, &[("main_function", main_function)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::gc::SpaceKind;

    #[test]
    fn test_promise_records() {
        let mut ctx = Context::new();
        let promise = ctx.factory().new_js_object_with_init(JSType::JsPromise).as_value();
        let undefined = ctx.heap.new_handle::<Value>(Value::undefined());
        let capability = ctx.factory().new_promise_capability(promise, undefined, undefined);
        let reaction = ctx
            .factory()
            .new_promise_reaction(capability.as_value(), undefined, ReactionType::Reject);
        ctx.collect_garbage();
        assert_eq!(ctx.get_field(capability, "promise"), promise.value(&ctx.heap));
        assert_eq!(ctx.get_field(reaction, "promise_or_capability"), capability.value(&ctx.heap));
        assert_eq!(ctx.get_field(reaction, "type"), Value::int(1));

        let completion = ctx.factory().new_completion_record(CompletionType::Throw, promise);
        assert_eq!(ctx.get_field(completion, "type"), Value::int(4));
        let record = ctx.factory().new_promise_iterator_record(undefined, true);
        assert_eq!(ctx.get_field(record, "done"), Value::bool(true));
    }

    #[test]
    fn test_module_records() {
        let mut ctx = Context::new();
        let request = ctx.factory().new_from_utf8("./dep.js").as_value();
        let name = ctx.factory().new_from_utf8("x").as_value();
        let entry = ctx.factory().new_import_entry(request, name, name);
        assert_eq!(ctx.get_field(entry, "module_request"), request.value(&ctx.heap));
        let star = ctx.factory().new_star_export_entry(request);
        assert_eq!(ctx.get_field(star, "module_request"), request.value(&ctx.heap));

        let module = ctx.factory().new_source_text_module();
        assert_eq!(ctx.get_field(module, "import_entries"), ctx.globals.empty_array);
        assert_eq!(ctx.get_field(module, "dfs_index"), Value::int(-1));
        let binding = ctx.factory().new_resolved_index_binding(module.as_value(), 3);
        assert_eq!(ctx.get_field(binding, "index"), Value::int(3));
        assert_eq!(ctx.get_field(binding, "module"), module.value(&ctx.heap));
    }

    #[test]
    fn test_program_lives_in_old_space() {
        let mut ctx = Context::new();
        let undefined = ctx.heap.new_handle::<Value>(Value::undefined());
        let program = ctx.factory().new_program(undefined);
        assert_eq!(program.address(&ctx.heap).space(), SpaceKind::Old);
        let boxed = ctx.factory().new_property_box(program.as_value());
        assert_eq!(ctx.get_field(boxed, "value"), program.value(&ctx.heap));
    }
}
