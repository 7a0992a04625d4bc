//! Heap object kinds
//!
//! [`JSType`] is the closed taxonomy of everything that can live on the heap.
//! Each kind declares its storage shape ([`Storage`]), its default space and,
//! for object and record kinds, an ordered list of named fields with their
//! default values. The factory, the collector and the dump printer all
//! dispatch on this enum with exhaustive matches.

use crate::gc::{HeapCast, SpaceKind};
use crate::runtime::array::{ByteArray, TaggedArray};
use crate::runtime::hclass::HClass;
use crate::runtime::layout::LayoutInfo;
use crate::runtime::property::PropertyTable;
use crate::runtime::string::{EcmaString, JSSymbol};
use crate::bigint::BigInt;
use crate::value::Value;

macro_rules! js_types {
    ($($variant:ident => $name:literal,)*) => {
        /// Kind of a heap object
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum JSType {
            $($variant,)*
        }

        impl JSType {
            /// Every kind, in declaration order
            pub const ALL: &'static [JSType] = &[$(JSType::$variant,)*];

            /// Stable name used by heap dumps
            pub const fn type_name(self) -> &'static str {
                match self {
                    $(JSType::$variant => $name,)*
                }
            }
        }
    };
}

js_types! {
    // Internal structures
    HClass => "JSHClass",
    TaggedArray => "TaggedArray",
    CowTaggedArray => "COWArray",
    LexicalEnv => "LexicalEnv",
    ConstantPool => "ConstantPool",
    LayoutInfo => "LayoutInfo",
    NameDictionary => "TaggedDictionary",
    NumberDictionary => "NumberDictionary",
    LinkedHashTable => "LinkedHashTable",
    String => "BaseString",
    Symbol => "Symbol",
    BigInt => "BigInt",
    ByteArray => "ByteArray",
    NativePointer => "NativePointer",
    AccessorData => "AccessorData",
    InternalAccessor => "InternalAccessor",
    PropertyBox => "PropertyBox",
    Method => "Method",
    Program => "program",
    GlobalEnv => "GlobalEnv",
    ProtoChangeMarker => "ProtoChangeMarker",
    PrototypeInfo => "PrototypeInfo",
    CellRecord => "CellRecord",
    CompletionRecord => "CompletionRecord",
    PendingJob => "PendingJob",
    MicroJobQueue => "MicroJobQueue",
    PromiseCapability => "PromiseCapability",
    PromiseReaction => "PromiseReaction",
    PromiseIteratorRecord => "PromiseIteratorRecord",
    PromiseRecord => "PromiseRecord",
    ResolvingFunctionsRecord => "ResolvingFunctionsRecord",
    AsyncGeneratorRequest => "AsyncGeneratorRequest",
    AsyncIteratorRecord => "AsyncIteratorRecord",
    GeneratorContext => "JSGeneratorContext",
    ClassInfoExtractor => "ClassInfoExtractor",
    ClassLiteral => "ClassLiteral",
    LinkedNode => "LinkedNode",
    RbTreeNode => "RBTreeNode",
    ImportEntry => "ImportEntry",
    LocalExportEntry => "LocalExportEntry",
    IndirectExportEntry => "IndirectExportEntry",
    StarExportEntry => "StarExportEntry",
    SourceTextModule => "SourceTextModule",
    ResolvedBinding => "ResolvedBinding",
    ResolvedIndexBinding => "ResolvedIndexBinding",
    TsObjectType => "TSObjectType",
    TsClassType => "TSClassType",
    TsClassInstanceType => "TSClassInstanceType",
    TsInterfaceType => "TSInterfaceType",
    TsUnionType => "TSUnionType",
    TsFunctionType => "TSFunctionType",
    TsArrayType => "TSArrayType",
    TsIteratorInstanceType => "TSIteratorInstanceType",

    // ECMAScript objects
    JsObject => "Object",
    JsGlobalObject => "GlobalObject",
    JsRealm => "Realm",
    JsError => "Error",
    JsEvalError => "Eval Error",
    JsRangeError => "Range Error",
    JsReferenceError => "Reference Error",
    JsTypeError => "Type Error",
    JsAggregateError => "Aggregate Error",
    JsUriError => "Uri Error",
    JsSyntaxError => "Syntax Error",
    JsOomError => "OutOfMemory Error",
    JsArray => "Array",
    JsArguments => "Arguments",
    JsDate => "Date",
    JsRegExp => "Regexp",
    JsPrimitiveRef => "Primitive",
    JsProxy => "Proxy",
    JsMap => "Map",
    JsSet => "Set",
    JsWeakMap => "WeakMap",
    JsWeakSet => "WeakSet",
    JsWeakRef => "WeakRef",
    JsFinalizationRegistry => "JSFinalizationRegistry",
    JsArrayBuffer => "ArrayBuffer",
    JsSharedArrayBuffer => "SharedArrayBuffer",
    JsDataView => "DataView",
    JsTypedArray => "Typed Array",
    JsInt8Array => "Int8 Array",
    JsUint8Array => "Uint8 Array",
    JsUint8ClampedArray => "Uint8 Clamped Array",
    JsInt16Array => "Int16 Array",
    JsUint16Array => "Uint16 Array",
    JsInt32Array => "Int32 Array",
    JsUint32Array => "Uint32 Array",
    JsFloat32Array => "Float32 Array",
    JsFloat64Array => "Float64 Array",
    JsBigInt64Array => "BigInt64 Array",
    JsBigUint64Array => "BigUint64 Array",
    JsPromise => "Promise",
    JsIterator => "Iterator",
    JsAsyncIterator => "AsyncIterator",
    JsForinIterator => "ForinInterator",
    JsMapIterator => "MapIterator",
    JsSetIterator => "SetIterator",
    JsArrayIterator => "ArrayIterator",
    JsStringIterator => "StringIterator",
    JsRegExpIterator => "RegExpIterator",
    JsAsyncFromSyncIterator => "AsyncFromSyncIterator",
    JsGeneratorObject => "JSGeneratorObject",
    JsAsyncGeneratorObject => "JSAsyncGeneratorObject",
    JsAsyncFuncObject => "AsyncFunctionObject",
    JsModuleNamespace => "ModuleNamespace",
    JsCjsModule => "CommonJSModule",
    JsCjsExports => "CommonJSExports",
    JsCjsRequire => "CommonJSRequire",

    // Functions
    JsFunctionBase => "Function Base",
    JsFunction => "Function",
    JsGeneratorFunction => "GeneratorFunction",
    JsAsyncFunction => "AsyncFunction",
    JsAsyncGeneratorFunction => "AsyncGeneratorFunction",
    JsBoundFunction => "Bound Function",
    JsProxyRevocFunction => "ProxyRevocFunction",
    JsPromiseReactionsFunction => "PromiseReactionsFunction",
    JsPromiseExecutorFunction => "PromiseExecutorFunction",
    JsPromiseAllResolveElementFunction => "PromiseAllResolveElementFunction",
    JsPromiseAnyRejectElementFunction => "PromiseAnyRejectElementFunction",
    JsPromiseAllSettledElementFunction => "PromiseAllSettledElementFunction",
    JsPromiseFinallyFunction => "PromiseFinallyFunction",
    JsPromiseValueThunkOrThrowerFunction => "PromiseValueThunkOrThrowerFunction",
    JsAsyncAwaitStatusFunction => "AsyncAwaitStatusFunction",
    JsAsyncGeneratorResNextRetProRstFtn => "AsyncGeneratorResumeNextReturnProcessorRstFtn",
    JsAsyncFromSyncIterUnwrapFunction => "AsyncFromSyncIterUnwarpFunction",

    // Non-standard containers
    JsApiArrayList => "ArrayList",
    JsApiArrayListIterator => "JSArraylistIterator",
    JsApiHashMap => "HashMap",
    JsApiHashMapIterator => "HashMapIterator",
    JsApiHashSet => "HashSet",
    JsApiHashSetIterator => "HashSetIterator",
    JsApiLightWeightMap => "LightWeightMap",
    JsApiLightWeightMapIterator => "LightWeightMapIterator",
    JsApiLightWeightSet => "LightWeightSet",
    JsApiLightWeightSetIterator => "LightWeightSetIterator",
    JsApiTreeMap => "TreeMap",
    JsApiTreeMapIterator => "TreeMapIterator",
    JsApiTreeSet => "TreeSet",
    JsApiTreeSetIterator => "TreeSetIterator",
    JsApiVector => "Vector",
    JsApiVectorIterator => "VectorIterator",
    JsApiQueue => "Queue",
    JsApiQueueIterator => "QueueIterator",
    JsApiPlainArray => "PlainArray",
    JsApiPlainArrayIterator => "PlainArrayIterator",
    JsApiDeque => "Deque",
    JsApiDequeIterator => "DequeIterator",
    JsApiStack => "Stack",
    JsApiStackIterator => "StackIterator",
    JsApiList => "List",
    JsApiListIterator => "ListIterator",
    JsApiLinkedList => "LinkedList",
    JsApiLinkedListIterator => "LinkedListIterator",
}

/// How a kind is stored on the heap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    HClass,
    TaggedArray,
    Layout,
    Table,
    String,
    Symbol,
    BigInt,
    ByteArray,
    Record,
    Object,
}

/// Default value of a declared field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldInit {
    Undefined,
    Null,
    Hole,
    False,
    True,
    Int(i32),
    Double(f64),
}

impl FieldInit {
    pub fn value(self) -> Value {
        match self {
            FieldInit::Undefined => Value::undefined(),
            FieldInit::Null => Value::null(),
            FieldInit::Hole => Value::hole(),
            FieldInit::False => Value::bool(false),
            FieldInit::True => Value::bool(true),
            FieldInit::Int(i) => Value::int(i),
            FieldInit::Double(d) => Value::double(d),
        }
    }
}

/// A named field of an object or record kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub init: FieldInit,
}

macro_rules! fields {
    ($($name:literal => $init:ident $(($arg:expr))?),* $(,)?) => {
        &[$(FieldSpec { name: $name, init: FieldInit::$init $(($arg))? },)*]
    };
}

macro_rules! function_fields {
    ($($name:literal => $init:ident $(($arg:expr))?),* $(,)?) => {
        fields![
            "method" => Undefined,
            "function_kind" => Int(0),
            "proto_or_hclass" => Hole,
            "lexical_env" => Undefined,
            "home_object" => Undefined,
            "module" => Undefined,
            $($name => $init $(($arg))?,)*
        ]
    };
}

const ITERATOR_FIELDS: &[FieldSpec] = fields![
    "iterated_object" => Undefined,
    "next_index" => Int(0),
    "iteration_kind" => Int(0),
];

const TYPED_ARRAY_FIELDS: &[FieldSpec] = fields![
    "viewed_array_buffer" => Undefined,
    "typed_array_name" => Undefined,
    "byte_length" => Int(0),
    "byte_offset" => Int(0),
    "array_length" => Int(0),
    "content_type" => Int(0),
];

const PLAIN_FUNCTION_FIELDS: &[FieldSpec] = function_fields![];

const ARRAY_BUFFER_FIELDS: &[FieldSpec] = fields![
    "array_buffer_data" => Undefined,
    "byte_length" => Int(0),
    "shared" => False,
    "detached" => False,
];

impl JSType {
    const FIRST_JS_OBJECT: JSType = JSType::JsObject;
    const FIRST_FUNCTION: JSType = JSType::JsFunctionBase;
    const LAST_FUNCTION: JSType = JSType::JsAsyncFromSyncIterUnwrapFunction;
    const FIRST_TYPED_ARRAY: JSType = JSType::JsTypedArray;
    const LAST_TYPED_ARRAY: JSType = JSType::JsBigUint64Array;
    const FIRST_ERROR: JSType = JSType::JsError;
    const LAST_ERROR: JSType = JSType::JsOomError;
    const FIRST_CONTAINER: JSType = JSType::JsApiArrayList;

    #[inline]
    const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Ordinary or exotic ECMAScript object, with properties and elements
    #[inline]
    pub const fn is_js_object(self) -> bool {
        self.ordinal() >= Self::FIRST_JS_OBJECT.ordinal()
    }

    #[inline]
    pub const fn is_function(self) -> bool {
        self.ordinal() >= Self::FIRST_FUNCTION.ordinal()
            && self.ordinal() <= Self::LAST_FUNCTION.ordinal()
    }

    #[inline]
    pub const fn is_typed_array(self) -> bool {
        self.ordinal() >= Self::FIRST_TYPED_ARRAY.ordinal()
            && self.ordinal() <= Self::LAST_TYPED_ARRAY.ordinal()
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.ordinal() >= Self::FIRST_ERROR.ordinal() && self.ordinal() <= Self::LAST_ERROR.ordinal()
    }

    /// Non-standard container or container iterator
    #[inline]
    pub const fn is_container(self) -> bool {
        self.ordinal() >= Self::FIRST_CONTAINER.ordinal()
    }

    pub const fn is_ts_type(self) -> bool {
        matches!(
            self,
            JSType::TsObjectType
                | JSType::TsClassType
                | JSType::TsClassInstanceType
                | JSType::TsInterfaceType
                | JSType::TsUnionType
                | JSType::TsFunctionType
                | JSType::TsArrayType
                | JSType::TsIteratorInstanceType
        )
    }

    pub const fn storage(self) -> Storage {
        match self {
            JSType::HClass => Storage::HClass,
            JSType::TaggedArray
            | JSType::CowTaggedArray
            | JSType::LexicalEnv
            | JSType::ConstantPool => Storage::TaggedArray,
            JSType::LayoutInfo => Storage::Layout,
            JSType::NameDictionary | JSType::NumberDictionary | JSType::LinkedHashTable => {
                Storage::Table
            }
            JSType::String => Storage::String,
            JSType::Symbol => Storage::Symbol,
            JSType::BigInt => Storage::BigInt,
            JSType::ByteArray => Storage::ByteArray,
            _ if self.is_js_object() => Storage::Object,
            _ => Storage::Record,
        }
    }

    /// Space an instance is allocated in unless the caller asks otherwise
    pub const fn default_space(self) -> SpaceKind {
        match self {
            JSType::HClass | JSType::GlobalEnv | JSType::ProtoChangeMarker => {
                SpaceKind::NonMovable
            }
            JSType::String
            | JSType::Symbol
            | JSType::Method
            | JSType::Program
            | JSType::ConstantPool
            | JSType::LayoutInfo => SpaceKind::Old,
            _ => SpaceKind::Young,
        }
    }

    /// Declared fields of an object or record kind
    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
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
            | JSType::ByteArray => &[],

            JSType::NativePointer => fields!["external_pointer" => Int(0), "delete_callback" => Undefined],
            JSType::AccessorData | JSType::InternalAccessor => {
                fields!["getter" => Undefined, "setter" => Undefined]
            }
            JSType::PropertyBox => fields!["value" => Undefined],
            JSType::Method => fields![
                "name" => Undefined,
                "native_entry" => Int(-1),
                "function_kind" => Int(0),
                "expected_arguments" => Int(0),
                "constant_pool" => Undefined,
            ],
            JSType::Program => fields!["main_function" => Undefined],
            JSType::GlobalEnv => fields![
                "global_object" => Undefined,
                "object_prototype" => Null,
                "function_prototype" => Undefined,
                "array_prototype" => Undefined,
                "error_prototype" => Undefined,
                "promise_prototype" => Undefined,
                "iterator_prototype" => Undefined,
            ],
            JSType::ProtoChangeMarker => fields!["has_changed" => False],
            JSType::PrototypeInfo => fields!["change_listener" => Undefined],
            JSType::CellRecord => fields!["weak_ref_target" => Undefined, "held_value" => Undefined],
            JSType::CompletionRecord => fields!["type" => Int(0), "value" => Undefined],
            JSType::PendingJob => fields!["job" => Undefined, "arguments" => Undefined],
            JSType::MicroJobQueue => {
                fields!["promise_job_queue" => Undefined, "script_job_queue" => Undefined]
            }
            JSType::PromiseCapability => {
                fields!["promise" => Undefined, "resolve" => Undefined, "reject" => Undefined]
            }
            JSType::PromiseReaction => fields![
                "promise_or_capability" => Undefined,
                "handler" => Undefined,
                "type" => Int(0),
            ],
            JSType::PromiseIteratorRecord => fields!["iterator" => Undefined, "done" => False],
            JSType::PromiseRecord => fields!["value" => Undefined],
            JSType::ResolvingFunctionsRecord => {
                fields!["resolve_function" => Undefined, "reject_function" => Undefined]
            }
            JSType::AsyncGeneratorRequest => {
                fields!["completion" => Undefined, "capability" => Undefined]
            }
            JSType::AsyncIteratorRecord => fields![
                "iterator" => Undefined,
                "next_method" => Undefined,
                "done" => False,
            ],
            JSType::GeneratorContext => fields![
                "register_array" => Undefined,
                "method" => Undefined,
                "this" => Undefined,
                "acc" => Undefined,
                "generator_object" => Undefined,
                "lexical_env" => Undefined,
                "nregs" => Int(0),
                "bc_offset" => Int(0),
            ],
            JSType::ClassInfoExtractor => fields![
                "constructor_method" => Undefined,
                "non_static_keys" => Undefined,
                "non_static_properties" => Undefined,
                "non_static_elements" => Undefined,
                "static_keys" => Undefined,
                "static_properties" => Undefined,
                "static_elements" => Undefined,
            ],
            JSType::ClassLiteral => fields!["array" => Undefined, "is_aot_used" => False],
            JSType::LinkedNode => fields![
                "hash" => Int(0),
                "key" => Undefined,
                "value" => Undefined,
                "next" => Null,
            ],
            JSType::RbTreeNode => fields![
                "hash" => Int(0),
                "key" => Undefined,
                "value" => Undefined,
                "left" => Null,
                "right" => Null,
                "is_red" => True,
                "count" => Int(1),
            ],
            JSType::ImportEntry => fields![
                "module_request" => Undefined,
                "import_name" => Undefined,
                "local_name" => Undefined,
            ],
            JSType::LocalExportEntry => fields!["export_name" => Undefined, "local_name" => Undefined],
            JSType::IndirectExportEntry => fields![
                "export_name" => Undefined,
                "module_request" => Undefined,
                "import_name" => Undefined,
            ],
            JSType::StarExportEntry => fields!["module_request" => Undefined],
            JSType::SourceTextModule => fields![
                "environment" => Undefined,
                "namespace" => Undefined,
                "module_filename" => Undefined,
                "module_record_name" => Undefined,
                "requested_modules" => Undefined,
                "import_entries" => Undefined,
                "local_export_entries" => Undefined,
                "indirect_export_entries" => Undefined,
                "star_export_entries" => Undefined,
                "name_dictionary" => Undefined,
                "status" => Int(0),
                "evaluation_error" => Int(-1),
                "dfs_index" => Int(-1),
                "dfs_ancestor_index" => Int(-1),
            ],
            JSType::ResolvedBinding => fields!["module" => Undefined, "binding_name" => Undefined],
            JSType::ResolvedIndexBinding => fields!["module" => Undefined, "index" => Int(0)],
            JSType::TsObjectType => {
                fields!["object_layout_info" => Undefined, "hclass" => Undefined]
            }
            JSType::TsClassType => fields![
                "instance_type" => Undefined,
                "constructor_type" => Undefined,
                "prototype_type" => Undefined,
                "name" => Undefined,
                "extension_gt" => Int(0),
                "has_linked" => False,
            ],
            JSType::TsClassInstanceType => fields!["class_gt" => Int(0)],
            JSType::TsInterfaceType => fields!["extends" => Undefined, "fields" => Undefined],
            JSType::TsUnionType => fields!["components" => Undefined],
            JSType::TsFunctionType => fields![
                "name" => Undefined,
                "parameter_types" => Undefined,
                "return_gt" => Int(0),
                "this_gt" => Int(0),
                "bit_field" => Int(0),
            ],
            JSType::TsArrayType => fields!["element_gt" => Int(0)],
            JSType::TsIteratorInstanceType => fields!["kind_gt" => Int(0), "element_gt" => Int(0)],

            JSType::JsObject
            | JSType::JsGlobalObject
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
            | JSType::JsIterator
            | JSType::JsAsyncIterator => &[],
            JSType::JsRealm => fields!["value" => Undefined, "global_env" => Undefined],
            JSType::JsArray => fields!["length" => Int(0), "track_info" => Undefined],
            JSType::JsDate => fields!["time_value" => Int(0), "local_offset" => Int(0)],
            JSType::JsRegExp => fields![
                "last_index" => Int(0),
                "byte_code_buffer" => Undefined,
                "original_source" => Undefined,
                "original_flags" => Int(0),
                "group_name" => Undefined,
                "length" => Int(0),
            ],
            JSType::JsPrimitiveRef => fields!["value" => Undefined],
            JSType::JsProxy => fields![
                "target" => Undefined,
                "handler" => Undefined,
                "method" => Undefined,
                "private_field" => Undefined,
            ],
            JSType::JsMap | JSType::JsWeakMap => fields!["linked_map" => Undefined],
            JSType::JsSet | JSType::JsWeakSet => fields!["linked_set" => Undefined],
            JSType::JsWeakRef => fields!["weak_object" => Undefined],
            JSType::JsFinalizationRegistry => fields![
                "cleanup_callback" => Undefined,
                "no_unregister" => Undefined,
                "maybe_unregister" => Undefined,
                "next" => Null,
                "prev" => Null,
            ],
            JSType::JsArrayBuffer | JSType::JsSharedArrayBuffer => ARRAY_BUFFER_FIELDS,
            JSType::JsDataView => fields![
                "data_view" => False,
                "viewed_array_buffer" => Undefined,
                "byte_length" => Int(0),
                "byte_offset" => Int(0),
            ],
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
            | JSType::JsBigUint64Array => TYPED_ARRAY_FIELDS,
            JSType::JsPromise => fields![
                "promise_state" => Int(0),
                "promise_result" => Undefined,
                "fulfill_reactions" => Undefined,
                "reject_reactions" => Undefined,
                "is_handled" => False,
            ],
            JSType::JsForinIterator => fields![
                "object" => Undefined,
                "visited_keys" => Undefined,
                "remaining_keys" => Undefined,
                "was_visited" => False,
            ],
            JSType::JsMapIterator | JSType::JsSetIterator | JSType::JsArrayIterator => {
                ITERATOR_FIELDS
            }
            JSType::JsStringIterator => {
                fields!["iterated_string" => Undefined, "next_index" => Int(0)]
            }
            JSType::JsRegExpIterator => fields![
                "iterating_reg_exp" => Undefined,
                "iterated_string" => Undefined,
                "global" => False,
                "unicode" => False,
                "done" => False,
            ],
            JSType::JsAsyncFromSyncIterator => fields!["sync_iterator_record" => Undefined],
            JSType::JsGeneratorObject => fields![
                "generator_context" => Undefined,
                "resume_result" => Undefined,
                "generator_state" => Int(0),
                "resume_mode" => Int(0),
            ],
            JSType::JsAsyncGeneratorObject => fields![
                "generator_context" => Undefined,
                "async_generator_queue" => Undefined,
                "generator_brand" => Undefined,
                "resume_result" => Undefined,
                "async_generator_state" => Int(0),
                "resume_mode" => Int(0),
            ],
            JSType::JsAsyncFuncObject => fields![
                "generator_context" => Undefined,
                "resume_result" => Undefined,
                "promise" => Undefined,
            ],
            JSType::JsModuleNamespace => fields!["module" => Undefined, "exports" => Undefined],
            JSType::JsCjsModule => fields![
                "id" => Undefined,
                "path" => Undefined,
                "exports" => Undefined,
                "filename" => Undefined,
                "status" => Int(0),
            ],
            JSType::JsCjsExports => fields!["exports" => Undefined],
            JSType::JsCjsRequire => fields!["cache" => Undefined, "parent" => Undefined],

            JSType::JsFunctionBase => fields!["method" => Undefined, "function_kind" => Int(0)],
            JSType::JsFunction
            | JSType::JsGeneratorFunction
            | JSType::JsAsyncFunction
            | JSType::JsAsyncGeneratorFunction => PLAIN_FUNCTION_FIELDS,
            JSType::JsBoundFunction => fields![
                "method" => Undefined,
                "function_kind" => Int(0),
                "bound_target" => Undefined,
                "bound_this" => Undefined,
                "bound_arguments" => Undefined,
            ],
            JSType::JsProxyRevocFunction => function_fields!["revocable_proxy" => Undefined],
            JSType::JsPromiseReactionsFunction => {
                function_fields!["promise" => Undefined, "already_resolved" => Undefined]
            }
            JSType::JsPromiseExecutorFunction => function_fields!["capability" => Undefined],
            JSType::JsPromiseAllResolveElementFunction => function_fields![
                "index" => Undefined,
                "values" => Undefined,
                "capabilities" => Undefined,
                "remaining_elements" => Undefined,
                "already_called" => Undefined,
            ],
            JSType::JsPromiseAnyRejectElementFunction => function_fields![
                "index" => Int(0),
                "errors" => Undefined,
                "capability" => Undefined,
                "remaining_elements" => Undefined,
                "already_called" => Undefined,
            ],
            JSType::JsPromiseAllSettledElementFunction => function_fields![
                "index" => Int(0),
                "values" => Undefined,
                "capability" => Undefined,
                "remaining_elements" => Undefined,
                "already_called" => Undefined,
            ],
            JSType::JsPromiseFinallyFunction => {
                function_fields!["on_finally" => Undefined, "constructor" => Undefined]
            }
            JSType::JsPromiseValueThunkOrThrowerFunction => function_fields!["result" => Undefined],
            JSType::JsAsyncAwaitStatusFunction => function_fields!["async_context" => Undefined],
            JSType::JsAsyncGeneratorResNextRetProRstFtn => {
                function_fields!["async_generator_object" => Undefined]
            }
            JSType::JsAsyncFromSyncIterUnwrapFunction => function_fields!["done" => Undefined],

            JSType::JsApiArrayList | JSType::JsApiVector => fields!["length" => Int(0)],
            JSType::JsApiHashMap | JSType::JsApiHashSet => {
                fields!["table" => Undefined, "size" => Int(0)]
            }
            JSType::JsApiLightWeightMap => fields![
                "hashes" => Undefined,
                "keys" => Undefined,
                "values" => Undefined,
                "length" => Int(0),
            ],
            JSType::JsApiLightWeightSet => fields![
                "hashes" => Undefined,
                "values" => Undefined,
                "length" => Int(0),
            ],
            JSType::JsApiTreeMap => fields!["tree_map" => Undefined],
            JSType::JsApiTreeSet => fields!["tree_set" => Undefined],
            JSType::JsApiQueue => fields!["length" => Int(0), "front" => Int(0), "tail" => Int(0)],
            JSType::JsApiPlainArray => fields![
                "keys" => Undefined,
                "values" => Undefined,
                "length" => Int(0),
            ],
            JSType::JsApiDeque => fields!["first" => Int(0), "last" => Int(0)],
            JSType::JsApiStack => fields!["top" => Int(0)],
            JSType::JsApiList => fields!["single_list" => Undefined, "length" => Int(0)],
            JSType::JsApiLinkedList => fields!["double_list" => Undefined, "length" => Int(0)],
            JSType::JsApiArrayListIterator
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
            | JSType::JsApiLinkedListIterator => ITERATOR_FIELDS,
        }
    }

    /// Position of a declared field
    pub fn field_index(self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name == name)
    }
}

fn field_slot(js_type: JSType, name: &str) -> usize {
    match js_type.field_index(name) {
        Some(index) => index,
        None => panic!("{:?} has no field `{}`", js_type, name),
    }
}

fn default_fields(js_type: JSType) -> Box<[Value]> {
    js_type.fields().iter().map(|f| f.init.value()).collect()
}

/// An ECMAScript object: hidden class, out-of-line properties, elements,
/// in-object property slots and the kind's declared fields
#[derive(Debug)]
pub struct JSObject {
    js_type: JSType,
    pub(crate) hclass: Value,
    pub(crate) properties: Value,
    pub(crate) elements: Value,
    pub(crate) inline: Box<[Value]>,
    pub(crate) fields: Box<[Value]>,
}

impl JSObject {
    /// Header words (hidden class, properties, elements) counted in sizes
    pub const HEADER_SIZE: usize = 3 * 8;

    /// An object whose every slot holds its default; `empty` is the shared
    /// empty array used for properties and elements.
    pub(crate) fn with_defaults(js_type: JSType, hclass: Value, inline: u32, empty: Value) -> Self {
        debug_assert!(js_type.is_js_object());
        JSObject {
            js_type,
            hclass,
            properties: empty,
            elements: empty,
            inline: vec![Value::undefined(); inline as usize].into_boxed_slice(),
            fields: default_fields(js_type),
        }
    }

    #[inline]
    pub fn js_type(&self) -> JSType {
        self.js_type
    }

    #[inline]
    pub fn hclass(&self) -> Value {
        self.hclass
    }

    #[inline]
    pub fn properties(&self) -> Value {
        self.properties
    }

    #[inline]
    pub fn elements(&self) -> Value {
        self.elements
    }

    #[inline]
    pub fn inline_count(&self) -> usize {
        self.inline.len()
    }

    #[inline]
    pub fn inline_property(&self, index: usize) -> Value {
        self.inline[index]
    }

    #[inline]
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Value {
        self.fields[field_slot(self.js_type, name)]
    }

    /// Raw field store; heap-level writes go through
    /// [`Context::set_field`](crate::Context::set_field) for the barrier.
    pub(crate) fn set_field(&mut self, name: &str, value: Value) {
        let slot = field_slot(self.js_type, name);
        self.fields[slot] = value;
    }
}

/// A non-object internal record: a kind and its declared fields
#[derive(Debug)]
pub struct Record {
    js_type: JSType,
    pub(crate) hclass: Value,
    pub(crate) fields: Box<[Value]>,
}

impl Record {
    pub(crate) fn with_defaults(js_type: JSType, hclass: Value) -> Self {
        debug_assert_eq!(js_type.storage(), Storage::Record);
        Record {
            js_type,
            hclass,
            fields: default_fields(js_type),
        }
    }

    #[inline]
    pub fn js_type(&self) -> JSType {
        self.js_type
    }

    #[inline]
    pub fn hclass(&self) -> Value {
        self.hclass
    }

    #[inline]
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Value {
        self.fields[field_slot(self.js_type, name)]
    }

    pub(crate) fn set_field(&mut self, name: &str, value: Value) {
        let slot = field_slot(self.js_type, name);
        self.fields[slot] = value;
    }
}

/// Everything that can occupy a heap slot
#[derive(Debug)]
pub enum HeapObject {
    HClass(Box<HClass>),
    TaggedArray(TaggedArray),
    Layout(LayoutInfo),
    Table(PropertyTable),
    String(EcmaString),
    Symbol(JSSymbol),
    BigInt(BigInt),
    ByteArray(ByteArray),
    Record(Record),
    Object(JSObject),
}

impl HeapObject {
    pub fn js_type(&self) -> JSType {
        match self {
            HeapObject::HClass(_) => JSType::HClass,
            HeapObject::TaggedArray(array) => array.kind(),
            HeapObject::Layout(_) => JSType::LayoutInfo,
            HeapObject::Table(table) => table.kind(),
            HeapObject::String(_) => JSType::String,
            HeapObject::Symbol(_) => JSType::Symbol,
            HeapObject::BigInt(_) => JSType::BigInt,
            HeapObject::ByteArray(_) => JSType::ByteArray,
            HeapObject::Record(record) => record.js_type(),
            HeapObject::Object(object) => object.js_type(),
        }
    }

    /// Bytes charged to the space at allocation time
    pub fn size_in_bytes(&self) -> usize {
        const HEADER: usize = 8;
        HEADER
            + match self {
                HeapObject::HClass(hclass) => hclass.size_in_bytes(),
                HeapObject::TaggedArray(array) => 8 + array.len() * 8,
                HeapObject::Layout(layout) => 8 + layout.capacity() as usize * 24,
                HeapObject::Table(table) => 16 + table.capacity() * 24,
                HeapObject::String(string) => 8 + string.len(),
                HeapObject::Symbol(_) => 24,
                HeapObject::BigInt(bigint) => 8 + bigint.len() * 4,
                HeapObject::ByteArray(bytes) => 8 + bytes.len(),
                HeapObject::Record(record) => 8 + record.fields.len() * 8,
                HeapObject::Object(object) => {
                    JSObject::HEADER_SIZE + (object.inline.len() + object.fields.len()) * 8
                }
            }
    }

    /// Visits every tagged slot, strong and weak
    pub fn visit_values(&self, visitor: &mut dyn FnMut(Value)) {
        match self {
            HeapObject::HClass(hclass) => hclass.visit_values(visitor),
            HeapObject::TaggedArray(array) => array.iter().for_each(|v| visitor(v)),
            HeapObject::Layout(layout) => layout.visit_values(visitor),
            HeapObject::Table(table) => table.visit_values(visitor),
            HeapObject::String(_) | HeapObject::BigInt(_) | HeapObject::ByteArray(_) => {}
            HeapObject::Symbol(symbol) => visitor(symbol.description()),
            HeapObject::Record(record) => {
                visitor(record.hclass);
                record.fields.iter().for_each(|v| visitor(*v));
            }
            HeapObject::Object(object) => {
                visitor(object.hclass);
                visitor(object.properties);
                visitor(object.elements);
                object.inline.iter().for_each(|v| visitor(*v));
                object.fields.iter().for_each(|v| visitor(*v));
            }
        }
    }

    /// Visits every tagged slot mutably, for reference updating
    pub fn visit_values_mut(&mut self, visitor: &mut dyn FnMut(&mut Value)) {
        match self {
            HeapObject::HClass(hclass) => hclass.visit_values_mut(visitor),
            HeapObject::TaggedArray(array) => array.iter_mut().for_each(|v| visitor(v)),
            HeapObject::Layout(layout) => layout.visit_values_mut(visitor),
            HeapObject::Table(table) => table.visit_values_mut(visitor),
            HeapObject::String(_) | HeapObject::BigInt(_) | HeapObject::ByteArray(_) => {}
            HeapObject::Symbol(symbol) => visitor(symbol.description_mut()),
            HeapObject::Record(record) => {
                visitor(&mut record.hclass);
                record.fields.iter_mut().for_each(|v| visitor(v));
            }
            HeapObject::Object(object) => {
                visitor(&mut object.hclass);
                visitor(&mut object.properties);
                visitor(&mut object.elements);
                object.inline.iter_mut().for_each(|v| visitor(v));
                object.fields.iter_mut().for_each(|v| visitor(v));
            }
        }
    }

    /// Drops weak references whose target is no longer live.
    pub(crate) fn clear_dead_weak(&mut self, is_live: &dyn Fn(Value) -> bool) {
        if let HeapObject::HClass(hclass) = self {
            hclass.prune_transitions(is_live);
            return;
        }
        self.visit_values_mut(&mut |v| {
            if v.is_weak() && !is_live(*v) {
                *v = Value::undefined();
            }
        });
    }

    /// Restores internal indexes keyed by addresses after objects moved.
    pub(crate) fn after_relocation(&mut self) {
        if let HeapObject::Table(table) = self {
            table.rebuild_index();
        }
    }
}

macro_rules! heap_cast {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl HeapCast for $ty {
            const NAME: &'static str = $name;

            #[inline]
            fn cast(object: &HeapObject) -> Option<&Self> {
                match object {
                    HeapObject::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            #[inline]
            fn cast_mut(object: &mut HeapObject) -> Option<&mut Self> {
                match object {
                    HeapObject::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

heap_cast!(TaggedArray, TaggedArray, "TaggedArray");
heap_cast!(LayoutInfo, Layout, "LayoutInfo");
heap_cast!(PropertyTable, Table, "PropertyTable");
heap_cast!(EcmaString, String, "EcmaString");
heap_cast!(JSSymbol, Symbol, "JSSymbol");
heap_cast!(BigInt, BigInt, "BigInt");
heap_cast!(ByteArray, ByteArray, "ByteArray");
heap_cast!(Record, Record, "Record");
heap_cast!(JSObject, Object, "JSObject");

impl HeapCast for HClass {
    const NAME: &'static str = "HClass";

    #[inline]
    fn cast(object: &HeapObject) -> Option<&Self> {
        match object {
            HeapObject::HClass(hclass) => Some(hclass),
            _ => None,
        }
    }

    #[inline]
    fn cast_mut(object: &mut HeapObject) -> Option<&mut Self> {
        match object {
            HeapObject::HClass(hclass) => Some(hclass),
            _ => None,
        }
    }
}
