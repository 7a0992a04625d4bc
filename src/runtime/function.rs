//! Function kinds and native entry points
//!
//! A function object stores its [`FunctionKind`] as an int field and points
//! at a `Method` record. Native functions are Rust `fn`s registered in the
//! context's [`NativeTable`]; the method record keeps the table index.

use crate::context::Context;
use crate::error::JsResult;
use crate::runtime::object::JSType;
use crate::value::Value;

/// Native function signature: context, receiver, arguments
pub type NativeFn = fn(ctx: &mut Context, this: Value, args: &[Value]) -> JsResult<Value>;

/// Registered native function
#[derive(Debug, Clone, Copy)]
pub struct NativeEntry {
    pub name: &'static str,
    pub func: NativeFn,
    /// Value of the function's `length`
    pub arg_count: u32,
}

/// Table of native entry points, indexed by method records
#[derive(Debug, Default)]
pub struct NativeTable {
    entries: Vec<NativeEntry>,
}

impl NativeTable {
    /// Registers `entry`, returning its index. Registering the same `fn`
    /// under the same name twice returns the first index.
    pub fn register(&mut self, entry: NativeEntry) -> u32 {
        let existing = self
            .entries
            .iter()
            .position(|e| e.name == entry.name && std::ptr::fn_addr_eq(e.func, entry.func));
        if let Some(idx) = existing {
            return idx as u32;
        }
        self.entries.push(entry);
        (self.entries.len() - 1) as u32
    }

    #[inline]
    pub fn get(&self, idx: u32) -> Option<&NativeEntry> {
        self.entries.get(idx as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

macro_rules! function_kinds {
    ($($variant:ident,)*) => {
        /// Function kind
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum FunctionKind {
            $($variant,)*
        }

        impl FunctionKind {
            pub const ALL: &'static [FunctionKind] = &[$(FunctionKind::$variant,)*];
        }
    };
}

function_kinds! {
    Normal,
    Arrow,
    Method,
    ConciseMethod,
    Getter,
    Setter,
    BaseConstructor,
    DerivedConstructor,
    ClassConstructor,
    BuiltinConstructor,
    BuiltinProxyConstructor,
    Builtin,
    Generator,
    Async,
    AsyncArrow,
    AsyncGenerator,
}

impl FunctionKind {
    /// Stored form of the kind in a function's `function_kind` field
    #[inline]
    pub const fn to_value(self) -> Value {
        Value::int(self as i32)
    }

    pub fn from_value(value: Value) -> Option<FunctionKind> {
        let idx = usize::try_from(value.to_i32()?).ok()?;
        Self::ALL.get(idx).copied()
    }

    /// Check if this function kind has its own 'this' binding
    pub const fn has_this_binding(self) -> bool {
        !matches!(self, FunctionKind::Arrow | FunctionKind::AsyncArrow)
    }

    /// Check if this function can be used with 'new'
    pub const fn is_constructor(self) -> bool {
        matches!(
            self,
            FunctionKind::Normal
                | FunctionKind::BaseConstructor
                | FunctionKind::DerivedConstructor
                | FunctionKind::ClassConstructor
                | FunctionKind::BuiltinConstructor
                | FunctionKind::BuiltinProxyConstructor
        )
    }

    /// Instances get a `prototype` object (lazily, via `proto_or_hclass`)
    pub const fn has_prototype(self) -> bool {
        self.is_constructor() || matches!(self, FunctionKind::Generator | FunctionKind::AsyncGenerator)
    }

    /// Heap kind of a function object of this kind
    pub const fn js_type(self) -> JSType {
        match self {
            FunctionKind::Generator => JSType::JsGeneratorFunction,
            FunctionKind::Async | FunctionKind::AsyncArrow => JSType::JsAsyncFunction,
            FunctionKind::AsyncGenerator => JSType::JsAsyncGeneratorFunction,
            FunctionKind::Builtin => JSType::JsFunctionBase,
            _ => JSType::JsFunction,
        }
    }
}
