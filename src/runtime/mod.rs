//! Runtime object model
//!
//! This module contains the heap representation of every object kind:
//! - Kind taxonomy and object bodies (JSType, JSObject, Record)
//! - Hidden classes and their layout tables
//! - Hashed property tables (dictionaries, linked hash tables)
//! - Tagged and byte arrays
//! - Strings, symbols and the string table
//! - Function kinds and native entry points
//! - Dump projection

pub mod array;
pub mod dump;
pub mod function;
pub mod hclass;
pub mod layout;
pub mod object;
pub mod property;
pub mod string;

pub use array::{ByteArray, TaggedArray, MAX_ARRAY_LENGTH};
pub use dump::{dump_object, format_object};
pub use function::{FunctionKind, NativeEntry, NativeFn, NativeTable};
pub use hclass::{shape_equivalent, HClass, HClassFlags};
pub use layout::{LayoutEntry, LayoutInfo, PropertyAttributes, PropertyFlags};
pub use object::{FieldInit, FieldSpec, HeapObject, JSObject, JSType, Record, Storage};
pub use property::{PropertyEntry, PropertyTable};
pub use string::{EcmaString, JSSymbol, StringTable, SymbolFlags};
