//! Error types
//!
//! Three families, matching how each failure propagates:
//! language-level exceptions ([`JsError`]) that the context also records as
//! its pending exception, allocator failures ([`AllocError`]) that the
//! context turns into a fatal abort after one collection, and interchange
//! failures ([`ConversionError`]) reported to native callers without
//! touching the pending exception.

use thiserror::Error;

use crate::gc::SpaceKind;

/// A thrown language-level error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JsError {
    #[error("RangeError: {0}")]
    Range(&'static str),
    #[error("TypeError: {0}")]
    Type(&'static str),
}

impl JsError {
    pub const fn message(self) -> &'static str {
        match self {
            JsError::Range(msg) | JsError::Type(msg) => msg,
        }
    }
}

pub type JsResult<T> = Result<T, JsError>;

/// Allocation request the heap could not satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("{space:?} space exhausted: requested {requested} bytes, {available} available")]
    SpaceExhausted {
        space: SpaceKind,
        requested: usize,
        available: usize,
    },
    #[error("read-only space is sealed")]
    ReadOnlySealed,
}

/// Native interchange failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("{0} words exceed the maximum BigInt size")]
    TooManyWords(usize),
    #[error("output buffer holds {available} words, {needed} needed")]
    BufferTooSmall { needed: usize, available: usize },
}
