//! Garbage-collected heap
//!
//! Objects live in typed spaces and are referenced by [`Address`]. The
//! collector traces from handles and explicit roots, frees what it cannot
//! reach and evacuates surviving young objects, so:
//! - Only handles and roots are guaranteed to stay valid across allocations
//! - Young objects move; everything else stays put until freed
//! - Weak references never keep their target alive

mod allocator;
mod collector;
mod handle;

pub use allocator::{Address, Heap, HeapStats, SpaceKind, SpaceStats};
pub use collector::CollectStats;
pub use handle::{Handle, HandleScope, HeapCast};

use crate::value::Value;

impl Heap {
    /// Run a full collection with `roots` in addition to the handle stack
    pub fn collect(&mut self, roots: &mut [Value]) -> CollectStats {
        collector::collect(self, roots)
    }
}
