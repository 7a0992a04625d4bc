//! Tracing collector
//!
//! A full collection runs in five phases:
//! 1. Mark: trace strong references from the roots (handles, caller roots,
//!    the write-barrier log and every read-only or snapshot object)
//! 2. Weak: clear weak slots whose target was not marked, prune dead
//!    hidden-class transitions
//! 3. Sweep: free unmarked objects in the swept spaces
//! 4. Evacuate: flip the young space; first-time survivors are copied to the
//!    new semispace, older ones are promoted to the old space
//! 5. Update: rewrite every reference to an evacuated object, then let
//!    address-keyed tables rebuild their indexes

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use super::allocator::{Address, Heap, SpaceKind};
use crate::value::Value;

type LiveSet = HashSet<Address, ahash::RandomState>;
type Forwarding = HashMap<Address, Address, ahash::RandomState>;

/// Young objects that survived this many collections move to the old space
const PROMOTION_AGE: u8 = 2;

/// Outcome of one collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub marked: usize,
    pub swept: usize,
    pub evacuated: usize,
    pub promoted: usize,
}

/// Runs a full collection. `roots` are rewritten in place if their targets
/// move.
pub fn collect(heap: &mut Heap, roots: &mut [Value]) -> CollectStats {
    let live = mark(heap, roots);
    clear_weak(heap, &live);
    let swept = sweep(heap, &live);
    let (forwarding, promoted) = evacuate(heap, &live);
    if !forwarding.is_empty() {
        update_references(heap, roots, &forwarding);
    }
    heap.barrier_log.clear();
    heap.collections += 1;

    let stats = CollectStats {
        marked: live.len(),
        swept,
        evacuated: forwarding.len(),
        promoted,
    };
    debug!(
        collection = heap.collections,
        marked = stats.marked,
        swept = stats.swept,
        evacuated = stats.evacuated,
        promoted = stats.promoted,
        "collection finished"
    );
    stats
}

fn mark(heap: &Heap, roots: &[Value]) -> LiveSet {
    let mut live = LiveSet::default();
    let mut worklist: Vec<Address> = heap
        .handles
        .iter()
        .chain(roots)
        .chain(&heap.barrier_log)
        .filter_map(|v| v.to_address())
        .collect();
    for kind in [SpaceKind::ReadOnly, SpaceKind::Snapshot] {
        worklist.extend(heap.space(kind).iter().map(|(addr, _)| addr));
    }

    while let Some(addr) = worklist.pop() {
        if !live.insert(addr) {
            continue;
        }
        let Some(object) = heap.try_cell(addr) else {
            debug_assert!(false, "root or slot points at freed {:?}", addr);
            continue;
        };
        object.visit_values(&mut |v| {
            if let Some(child) = v.to_address() {
                if !live.contains(&child) {
                    worklist.push(child);
                }
            }
        });
    }
    live
}

fn clear_weak(heap: &mut Heap, live: &LiveSet) {
    let is_live = |v: Value| v.heap_address().is_some_and(|addr| live.contains(&addr));
    for space in heap.spaces.iter_mut() {
        for cell in space.iter_mut() {
            cell.object.clear_dead_weak(&is_live);
        }
    }
}

fn sweep(heap: &mut Heap, live: &LiveSet) -> usize {
    let mut swept = 0;
    for kind in SpaceKind::ALL {
        if !kind.is_swept() || kind.is_movable() {
            continue;
        }
        let space = heap.space_mut(kind);
        let dead: Vec<usize> = space
            .iter()
            .filter(|(addr, _)| !live.contains(addr))
            .map(|(addr, _)| addr.slot())
            .collect();
        for slot in dead {
            space.remove(slot);
            swept += 1;
        }
    }
    swept
}

fn evacuate(heap: &mut Heap, live: &LiveSet) -> (Forwarding, usize) {
    let mut forwarding = Forwarding::default();
    let mut promoted = 0;
    let cells = heap.space_mut(SpaceKind::Young).flip();
    for (from, mut cell) in cells {
        if !live.contains(&from) {
            continue;
        }
        cell.age += 1;
        let to = if cell.age >= PROMOTION_AGE {
            promoted += 1;
            heap.space_mut(SpaceKind::Old).insert_survivor(cell)
        } else {
            heap.space_mut(SpaceKind::Young).insert_survivor(cell)
        };
        forwarding.insert(from, to);
    }
    (forwarding, promoted)
}

fn update_references(heap: &mut Heap, roots: &mut [Value], forwarding: &Forwarding) {
    let forward = |v: &mut Value| {
        let Some(addr) = v.heap_address() else {
            return;
        };
        if let Some(&to) = forwarding.get(&addr) {
            let moved = Value::from_address(to);
            *v = if v.is_weak() { moved.create_weak() } else { moved };
        }
    };

    for space in heap.spaces.iter_mut() {
        for cell in space.iter_mut() {
            cell.object.visit_values_mut(&mut |v| forward(v));
            cell.object.after_relocation();
        }
    }
    heap.handles.iter_mut().for_each(|v| forward(v));
    roots.iter_mut().for_each(|v| forward(v));
}
