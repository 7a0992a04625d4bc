//! Kind-specific initialization
//!
//! Declared field defaults are written when the object body is built. This
//! pass sets up whatever needs allocation or a non-default value: backing
//! stores of collections and containers, reaction queues, date offsets.

use super::ObjectFactory;
use crate::gc::Handle;
use crate::runtime::function::FunctionKind;
use crate::runtime::object::JSType;
use crate::value::Value;

/// Slots reserved by a fresh container backing array
pub(crate) const DEFAULT_CONTAINER_CAPACITY: usize = 8;

impl ObjectFactory<'_> {
    /// Runs the initializer of `kind` on a freshly allocated `object`.
    pub fn initialize_heap_object(&mut self, kind: JSType, object: Handle<Value>) {
        match kind {
            JSType::JsArray => {
                self.ctx.set_field(object, "length", Value::int(0));
            }
            JSType::JsDate => {
                self.ctx.set_field(object, "time_value", Value::double(0.0));
                self.ctx.set_field(object, "local_offset", Value::double(f64::MAX));
            }
            JSType::JsPromise => {
                self.ctx.set_field(object, "promise_state", Value::int(0));
                self.set_empty_array(object, "fulfill_reactions");
                self.set_empty_array(object, "reject_reactions");
                self.ctx.set_field(object, "is_handled", Value::bool(false));
            }
            JSType::JsArrayBuffer | JSType::JsSharedArrayBuffer => {
                let data = self.new_byte_array(0).as_value();
                self.set_from(object, "array_buffer_data", data);
                self.ctx.set_field(object, "byte_length", Value::int(0));
                let shared = kind == JSType::JsSharedArrayBuffer;
                self.ctx.set_field(object, "shared", Value::bool(shared));
            }
            JSType::JsTypedArray
            | JSType::JsInt8Array
            | JSType::JsUint8Array
            | JSType::JsUint8ClampedArray
            | JSType::JsInt16Array
            | JSType::JsUint16Array
            | JSType::JsInt32Array
            | JSType::JsUint32Array
            | JSType::JsFloat32Array
            | JSType::JsFloat64Array
            | JSType::JsBigInt64Array
            | JSType::JsBigUint64Array => {
                let name = self.new_from_ascii(kind.type_name().as_bytes()).as_value();
                self.set_from(object, "typed_array_name", name);
                self.ctx.set_field(object, "content_type", Value::int(0));
            }
            JSType::JsMap | JSType::JsWeakMap => {
                let table = self.new_property_table(JSType::LinkedHashTable, 0).as_value();
                self.set_from(object, "linked_map", table);
            }
            JSType::JsSet | JSType::JsWeakSet => {
                let table = self.new_property_table(JSType::LinkedHashTable, 0).as_value();
                self.set_from(object, "linked_set", table);
            }
            JSType::JsForinIterator => {
                self.set_empty_array(object, "visited_keys");
                self.set_empty_array(object, "remaining_keys");
            }
            JSType::JsAsyncGeneratorObject => {
                self.set_empty_array(object, "async_generator_queue");
            }
            JSType::JsGeneratorFunction => {
                self.ctx.set_field(object, "function_kind", FunctionKind::Generator.to_value());
            }
            JSType::JsAsyncFunction => {
                self.ctx.set_field(object, "function_kind", FunctionKind::Async.to_value());
            }
            JSType::JsAsyncGeneratorFunction => {
                self.ctx.set_field(object, "function_kind", FunctionKind::AsyncGenerator.to_value());
            }
            JSType::JsFunctionBase => {
                self.ctx.set_field(object, "function_kind", FunctionKind::Builtin.to_value());
            }
            JSType::MicroJobQueue => {
                self.set_empty_array(object, "promise_job_queue");
                self.set_empty_array(object, "script_job_queue");
            }
            JSType::ClassInfoExtractor => {
                for name in [
                    "non_static_keys",
                    "non_static_properties",
                    "non_static_elements",
                    "static_keys",
                    "static_properties",
                    "static_elements",
                ] {
                    self.set_empty_array(object, name);
                }
            }
            JSType::JsApiHashMap | JSType::JsApiHashSet => {
                let table = self.new_property_table(JSType::LinkedHashTable, 0).as_value();
                self.set_from(object, "table", table);
                self.ctx.set_field(object, "size", Value::int(0));
            }
            JSType::JsApiTreeMap => {
                let table = self.new_property_table(JSType::LinkedHashTable, 0).as_value();
                self.set_from(object, "tree_map", table);
            }
            JSType::JsApiTreeSet => {
                let table = self.new_property_table(JSType::LinkedHashTable, 0).as_value();
                self.set_from(object, "tree_set", table);
            }
            JSType::JsApiLightWeightMap => {
                for name in ["hashes", "keys", "values"] {
                    self.set_backing_array(object, name);
                }
            }
            JSType::JsApiLightWeightSet => {
                for name in ["hashes", "values"] {
                    self.set_backing_array(object, name);
                }
            }
            JSType::JsApiPlainArray => {
                for name in ["keys", "values"] {
                    self.set_backing_array(object, name);
                }
            }
            JSType::JsApiList => self.set_backing_array(object, "single_list"),
            JSType::JsApiLinkedList => self.set_backing_array(object, "double_list"),
            JSType::JsApiArrayList
            | JSType::JsApiVector
            | JSType::JsApiQueue
            | JSType::JsApiDeque
            | JSType::JsApiStack => {
                let elements = self.new_tagged_array(DEFAULT_CONTAINER_CAPACITY);
                let elements = elements.value(&self.ctx.heap);
                self.ctx.set_elements(object.cast(), elements);
            }

            // Declared defaults are the complete initial state.
            JSType::HClass
            | JSType::TaggedArray
            | JSType::CowTaggedArray
            | JSType::LexicalEnv
            | JSType::ConstantPool
            | JSType::LayoutInfo
            | JSType::NameDictionary
            | JSType::NumberDictionary
            | JSType::LinkedHashTable
            | JSType::String
            | JSType::Symbol
            | JSType::BigInt
            | JSType::ByteArray
            | JSType::NativePointer
            | JSType::AccessorData
            | JSType::InternalAccessor
            | JSType::PropertyBox
            | JSType::Method
            | JSType::Program
            | JSType::GlobalEnv
            | JSType::ProtoChangeMarker
            | JSType::PrototypeInfo
            | JSType::CellRecord
            | JSType::CompletionRecord
            | JSType::PendingJob
            | JSType::PromiseCapability
            | JSType::PromiseReaction
            | JSType::PromiseIteratorRecord
            | JSType::PromiseRecord
            | JSType::ResolvingFunctionsRecord
            | JSType::AsyncGeneratorRequest
            | JSType::AsyncIteratorRecord
            | JSType::GeneratorContext
            | JSType::ClassLiteral
            | JSType::LinkedNode
            | JSType::RbTreeNode
            | JSType::ImportEntry
            | JSType::LocalExportEntry
            | JSType::IndirectExportEntry
            | JSType::StarExportEntry
            | JSType::SourceTextModule
            | JSType::ResolvedBinding
            | JSType::ResolvedIndexBinding
            | JSType::TsObjectType
            | JSType::TsClassType
            | JSType::TsClassInstanceType
            | JSType::TsInterfaceType
            | JSType::TsUnionType
            | JSType::TsFunctionType
            | JSType::TsArrayType
            | JSType::TsIteratorInstanceType
            | JSType::JsObject
            | JSType::JsGlobalObject
            | JSType::JsRealm
            | JSType::JsError
            | JSType::JsEvalError
            | JSType::JsRangeError
            | JSType::JsReferenceError
            | JSType::JsTypeError
            | JSType::JsAggregateError
            | JSType::JsUriError
            | JSType::JsSyntaxError
            | JSType::JsOomError
            | JSType::JsArguments
            | JSType::JsRegExp
            | JSType::JsPrimitiveRef
            | JSType::JsProxy
            | JSType::JsWeakRef
            | JSType::JsFinalizationRegistry
            | JSType::JsDataView
            | JSType::JsIterator
            | JSType::JsAsyncIterator
            | JSType::JsMapIterator
            | JSType::JsSetIterator
            | JSType::JsArrayIterator
            | JSType::JsStringIterator
            | JSType::JsRegExpIterator
            | JSType::JsAsyncFromSyncIterator
            | JSType::JsGeneratorObject
            | JSType::JsAsyncFuncObject
            | JSType::JsModuleNamespace
            | JSType::JsCjsModule
            | JSType::JsCjsExports
            | JSType::JsCjsRequire
            | JSType::JsFunction
            | JSType::JsBoundFunction
            | JSType::JsProxyRevocFunction
            | JSType::JsPromiseReactionsFunction
            | JSType::JsPromiseExecutorFunction
            | JSType::JsPromiseAllResolveElementFunction
            | JSType::JsPromiseAnyRejectElementFunction
            | JSType::JsPromiseAllSettledElementFunction
            | JSType::JsPromiseFinallyFunction
            | JSType::JsPromiseValueThunkOrThrowerFunction
            | JSType::JsAsyncAwaitStatusFunction
            | JSType::JsAsyncGeneratorResNextRetProRstFtn
            | JSType::JsAsyncFromSyncIterUnwrapFunction
            | JSType::JsApiArrayListIterator
            | JSType::JsApiHashMapIterator
            | JSType::JsApiHashSetIterator
            | JSType::JsApiLightWeightMapIterator
            | JSType::JsApiLightWeightSetIterator
            | JSType::JsApiTreeMapIterator
            | JSType::JsApiTreeSetIterator
            | JSType::JsApiVectorIterator
            | JSType::JsApiQueueIterator
            | JSType::JsApiPlainArrayIterator
            | JSType::JsApiDequeIterator
            | JSType::JsApiStackIterator
            | JSType::JsApiListIterator
            | JSType::JsApiLinkedListIterator => {}
        }
    }

    fn set_empty_array(&mut self, object: Handle<Value>, name: &str) {
        let empty = self.ctx.globals.empty_array;
        self.ctx.set_field(object, name, empty);
    }

    fn set_backing_array(&mut self, object: Handle<Value>, name: &str) {
        let array = self.new_tagged_array(DEFAULT_CONTAINER_CAPACITY).as_value();
        self.set_from(object, name, array);
    }

    /// Stores the current value of `source` into a field
    fn set_from(&mut self, object: Handle<Value>, name: &str, source: Handle<Value>) {
        let value = source.value(&self.ctx.heap);
        self.ctx.set_field(object, name, value);
    }
}
