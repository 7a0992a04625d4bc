//! jsheap - the object model of an ECMAScript runtime
//!
//! Everything a bytecode engine needs underneath its interpreter:
//!
//! - NaN-boxed tagged values with weak references
//! - A garbage-collected heap split into typed spaces, with rooted handles
//! - Hidden classes, transition trees and dictionary-mode objects
//! - An object factory covering every heap kind
//! - Arbitrary-precision BigInt arithmetic
//!
//! # Example
//! ```
//! use jsheap::{bigint, Context};
//!
//! let mut ctx = Context::new();
//! let a = bigint::parse(&mut ctx, "9007199254740993", 10).unwrap();
//! let b = bigint::parse(&mut ctx, "-3", 10).unwrap();
//! let product = bigint::multiply(&mut ctx, a, b).unwrap();
//! assert_eq!(ctx.heap().get(product).to_string(), "-27021597764222979");
//! ```

// Core modules
pub mod context;
pub mod error;
pub mod options;
pub mod value;

// Garbage collector
pub mod gc;

// Heap object kinds
pub mod runtime;

// Object construction
pub mod factory;

// Arbitrary-precision integers
pub mod bigint;

// Re-export main types
pub use context::{Context, MemoryStats};
pub use error::{AllocError, ConversionError, JsError, JsResult};
pub use options::RuntimeOptions;
pub use value::Value;
