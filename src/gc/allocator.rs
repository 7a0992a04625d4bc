//! Space allocator for the object heap
//!
//! The heap is split into spaces with different relocation and lifetime
//! guarantees:
//! ```text
//! +-------------+---------+--------------------------------------------+
//! | space       | moves?  | used for                                   |
//! +-------------+---------+--------------------------------------------+
//! | young       | yes     | default target, evacuated on collection    |
//! | old         | no      | promoted objects, strings, long-lived data |
//! | non-movable | no      | hidden classes, global-env singletons      |
//! | huge        | no      | objects above the large-object threshold   |
//! | read-only   | no      | sealed after bootstrap (empty array, "")   |
//! | snapshot    | no      | bulk-deserialized objects, never swept     |
//! +-------------+---------+--------------------------------------------+
//! ```
//!
//! Each object lives in a slot of its space. An [`Address`] packs the space
//! and the slot index into the low 48 bits so it fits the heap-pointer
//! encoding of [`Value`]: bits 40..43 hold the space, bits 3..40 the slot.

use std::fmt;

use tracing::trace;

use crate::error::AllocError;
use crate::options::RuntimeOptions;
use crate::runtime::object::HeapObject;
use crate::value::Value;

/// Allocation spaces
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpaceKind {
    Young = 1,
    Old = 2,
    NonMovable = 3,
    Huge = 4,
    ReadOnly = 5,
    Snapshot = 6,
}

impl SpaceKind {
    pub const COUNT: usize = 6;

    pub const ALL: [SpaceKind; Self::COUNT] = [
        SpaceKind::Young,
        SpaceKind::Old,
        SpaceKind::NonMovable,
        SpaceKind::Huge,
        SpaceKind::ReadOnly,
        SpaceKind::Snapshot,
    ];

    #[inline]
    const fn index(self) -> usize {
        self as usize - 1
    }

    const fn from_code(code: u64) -> Option<SpaceKind> {
        match code {
            1 => Some(SpaceKind::Young),
            2 => Some(SpaceKind::Old),
            3 => Some(SpaceKind::NonMovable),
            4 => Some(SpaceKind::Huge),
            5 => Some(SpaceKind::ReadOnly),
            6 => Some(SpaceKind::Snapshot),
            _ => None,
        }
    }

    /// Objects in this space may be relocated by a collection
    #[inline]
    pub const fn is_movable(self) -> bool {
        matches!(self, SpaceKind::Young)
    }

    /// Unreachable objects in this space are reclaimed
    #[inline]
    pub const fn is_swept(self) -> bool {
        !matches!(self, SpaceKind::ReadOnly | SpaceKind::Snapshot)
    }

    /// Regular spaces redirect oversized requests to the huge space
    #[inline]
    const fn is_regular(self) -> bool {
        matches!(self, SpaceKind::Young | SpaceKind::Old)
    }
}

/// Location of a heap object
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(u64);

impl Address {
    const SPACE_SHIFT: u32 = 40;
    const SLOT_SHIFT: u32 = 3;
    const SLOT_MASK: u64 = (1 << (Self::SPACE_SHIFT - Self::SLOT_SHIFT)) - 1;

    #[inline]
    pub const fn new(space: SpaceKind, slot: u32) -> Self {
        Address(((space as u64) << Self::SPACE_SHIFT) | ((slot as u64) << Self::SLOT_SHIFT))
    }

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Address(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn space(self) -> SpaceKind {
        match SpaceKind::from_code(self.0 >> Self::SPACE_SHIFT) {
            Some(space) => space,
            None => panic!("corrupt heap address {:#x}", self.0),
        }
    }

    #[inline]
    pub const fn slot(self) -> usize {
        ((self.0 >> Self::SLOT_SHIFT) & Self::SLOT_MASK) as usize
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match SpaceKind::from_code(self.0 >> Self::SPACE_SHIFT) {
            Some(space) => write!(f, "{:?}#{}", space, self.slot()),
            None => write!(f, "Address({:#x})", self.0),
        }
    }
}

/// An occupied slot
pub(crate) struct Cell {
    pub(crate) object: HeapObject,
    pub(crate) size: usize,
    /// Collections survived, used to promote young objects
    pub(crate) age: u8,
}

/// One allocation region
///
/// The young space alternates between two semispaces; the current one is
/// encoded in the top bit of every slot number, so an evacuated object never
/// gets its old address back.
pub(crate) struct Space {
    kind: SpaceKind,
    pub(crate) cells: Vec<Option<Cell>>,
    free: Vec<u32>,
    pub(crate) used_bytes: usize,
    limit: usize,
    semispace_bit: u32,
}

impl Space {
    const SEMISPACE_BIT: u32 = 1 << 31;

    fn new(kind: SpaceKind, limit: usize) -> Self {
        Space {
            kind,
            cells: Vec::new(),
            free: Vec::new(),
            used_bytes: 0,
            limit,
            semispace_bit: 0,
        }
    }

    #[inline]
    fn available(&self) -> usize {
        self.limit.saturating_sub(self.used_bytes)
    }

    #[inline]
    fn index_of(&self, slot: usize) -> Option<usize> {
        let slot = slot as u32;
        if slot & Self::SEMISPACE_BIT != self.semispace_bit {
            return None;
        }
        Some((slot & !Self::SEMISPACE_BIT) as usize)
    }

    #[inline]
    fn address_of(&self, index: usize) -> Address {
        Address::new(self.kind, index as u32 | self.semispace_bit)
    }

    #[inline]
    pub(crate) fn get(&self, slot: usize) -> Option<&Cell> {
        self.cells.get(self.index_of(slot)?)?.as_ref()
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut Cell> {
        let index = self.index_of(slot)?;
        self.cells.get_mut(index)?.as_mut()
    }

    fn insert(&mut self, cell: Cell) -> Address {
        self.used_bytes += cell.size;
        let index = match self.free.pop() {
            Some(index) => {
                self.cells[index as usize] = Some(cell);
                index as usize
            }
            None => {
                self.cells.push(Some(cell));
                self.cells.len() - 1
            }
        };
        self.address_of(index)
    }

    pub(crate) fn remove(&mut self, slot: usize) -> Option<Cell> {
        let index = self.index_of(slot)?;
        let cell = self.cells.get_mut(index)?.take()?;
        self.used_bytes -= cell.size;
        self.free.push(index as u32);
        Some(cell)
    }

    /// Empties the space and flips to the other semispace. Returns the old
    /// cells with their addresses.
    pub(crate) fn flip(&mut self) -> Vec<(Address, Cell)> {
        let cells = std::mem::take(&mut self.cells);
        let taken = cells
            .into_iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.map(|c| (self.address_of(index), c)))
            .collect();
        self.free.clear();
        self.used_bytes = 0;
        self.semispace_bit ^= Self::SEMISPACE_BIT;
        taken
    }

    /// Inserts a relocated cell, ignoring the limit: survivors always fit.
    pub(crate) fn insert_survivor(&mut self, cell: Cell) -> Address {
        self.insert(cell)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Address, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(index, cell)| cell.as_ref().map(|c| (self.address_of(index), c)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut().flatten()
    }

    pub(crate) fn live_objects(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Per-space usage figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceStats {
    pub used_bytes: usize,
    pub limit: usize,
    pub objects: usize,
}

/// Heap-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub spaces: [SpaceStats; SpaceKind::COUNT],
    pub handles: usize,
    pub collections: usize,
}

impl HeapStats {
    pub fn space(&self, kind: SpaceKind) -> SpaceStats {
        self.spaces[kind.index()]
    }

    pub fn total_used(&self) -> usize {
        self.spaces.iter().map(|s| s.used_bytes).sum()
    }
}

/// The object heap
///
/// Owns every space, the handle stack and the write-barrier log.
pub struct Heap {
    pub(crate) spaces: [Space; SpaceKind::COUNT],
    /// Handle slots, each one a root
    pub(crate) handles: Vec<Value>,
    /// Objects written into heap slots while marking was active
    pub(crate) barrier_log: Vec<Value>,
    marking: bool,
    read_only_sealed: bool,
    large_object_threshold: usize,
    pub(crate) collections: usize,
}

impl Heap {
    pub fn new(options: &RuntimeOptions) -> Self {
        let limit = |kind: SpaceKind| match kind {
            SpaceKind::Young => options.young_space_size,
            SpaceKind::Old => options.old_space_size,
            SpaceKind::NonMovable => options.non_movable_space_size,
            SpaceKind::Huge => options.huge_space_size,
            SpaceKind::ReadOnly => options.read_only_space_size,
            SpaceKind::Snapshot => options.snapshot_space_size,
        };
        Heap {
            spaces: SpaceKind::ALL.map(|kind| Space::new(kind, limit(kind))),
            handles: Vec::new(),
            barrier_log: Vec::new(),
            marking: false,
            read_only_sealed: false,
            large_object_threshold: options.large_object_threshold,
            collections: 0,
        }
    }

    #[inline]
    pub(crate) fn space(&self, kind: SpaceKind) -> &Space {
        &self.spaces[kind.index()]
    }

    #[inline]
    pub(crate) fn space_mut(&mut self, kind: SpaceKind) -> &mut Space {
        &mut self.spaces[kind.index()]
    }

    /// Places `object` in `space`, or in the huge space if it is larger than
    /// the large-object threshold and `space` is young or old.
    ///
    /// The caller must not have stored references to movable objects in
    /// `object`: a collection may run between building it and this call.
    pub fn try_allocate(
        &mut self,
        space: SpaceKind,
        object: HeapObject,
    ) -> Result<Address, AllocError> {
        let size = object.size_in_bytes();
        let space = self.target_space(space, size);
        if space == SpaceKind::ReadOnly && self.read_only_sealed {
            return Err(AllocError::ReadOnlySealed);
        }
        debug_assert!(
            self.references_only_pinned(&object),
            "fresh {:?} references a movable object",
            object.js_type()
        );
        let target = self.space_mut(space);
        if size > target.available() {
            return Err(AllocError::SpaceExhausted {
                space,
                requested: size,
                available: target.available(),
            });
        }
        let addr = target.insert(Cell {
            object,
            size,
            age: 0,
        });
        trace!(?addr, size, "allocated");
        Ok(addr)
    }

    /// Space a request for `size` bytes in `space` is served from
    #[inline]
    pub fn target_space(&self, space: SpaceKind, size: usize) -> SpaceKind {
        if space.is_regular() && size > self.large_object_threshold {
            SpaceKind::Huge
        } else {
            space
        }
    }

    /// Whether a request for `size` bytes in `space` would fit right now
    pub fn has_room(&self, space: SpaceKind, size: usize) -> bool {
        self.space(self.target_space(space, size)).available() >= size
    }

    fn references_only_pinned(&self, object: &HeapObject) -> bool {
        let mut pinned = true;
        object.visit_values(&mut |v| {
            if let Some(addr) = v.heap_address() {
                pinned &= !addr.space().is_movable();
            }
        });
        pinned
    }

    /// Stops further read-only allocations
    pub fn seal_read_only(&mut self) {
        self.read_only_sealed = true;
    }

    #[inline]
    pub fn is_live(&self, addr: Address) -> bool {
        self.space(addr.space()).get(addr.slot()).is_some()
    }

    /// Checks that the target of a weak reference is still alive and
    /// returns it as a strong value.
    pub fn upgrade_weak(&self, value: Value) -> Option<Value> {
        let addr = value.heap_address()?;
        if self.is_live(addr) {
            Some(value.weak_to_strong())
        } else {
            None
        }
    }

    #[inline]
    pub fn try_cell(&self, addr: Address) -> Option<&HeapObject> {
        self.space(addr.space()).get(addr.slot()).map(|cell| &cell.object)
    }

    /// Object at `addr`; a dangling address is an invariant violation.
    #[inline]
    pub fn cell(&self, addr: Address) -> &HeapObject {
        match self.try_cell(addr) {
            Some(object) => object,
            None => panic!("dangling heap address {:?}", addr),
        }
    }

    #[inline]
    pub fn cell_mut(&mut self, addr: Address) -> &mut HeapObject {
        debug_assert!(
            addr.space() != SpaceKind::ReadOnly || !self.read_only_sealed,
            "write into sealed read-only space"
        );
        match self.space_mut(addr.space()).get_mut(addr.slot()) {
            Some(cell) => &mut cell.object,
            None => panic!("dangling heap address {:?}", addr),
        }
    }

    /// Object behind a strong heap value
    #[inline]
    pub fn value_cell(&self, value: Value) -> Option<&HeapObject> {
        self.try_cell(value.to_address()?)
    }

    #[inline]
    pub fn in_young_space(&self, addr: Address) -> bool {
        addr.space() == SpaceKind::Young
    }

    /// Whether a (simulated) concurrent marking pass is running
    #[inline]
    pub fn is_marking(&self) -> bool {
        self.marking
    }

    pub fn set_marking(&mut self, marking: bool) {
        self.marking = marking;
        if !marking {
            self.barrier_log.clear();
        }
    }

    /// Records a reference stored into the heap while marking is active.
    #[inline]
    pub fn write_barrier(&mut self, value: Value) {
        if self.marking && value.is_strong() {
            self.barrier_log.push(value);
        }
    }

    pub fn stats(&self) -> HeapStats {
        let mut stats = HeapStats {
            handles: self.handles.len(),
            collections: self.collections,
            ..HeapStats::default()
        };
        for kind in SpaceKind::ALL {
            let space = self.space(kind);
            stats.spaces[kind.index()] = SpaceStats {
                used_bytes: space.used_bytes,
                limit: space.limit,
                objects: space.live_objects(),
            };
        }
        stats
    }

    /// Iterates over every live object
    pub fn iter_objects(&self) -> impl Iterator<Item = (Address, &HeapObject)> + '_ {
        self.spaces
            .iter()
            .flat_map(|space| space.iter().map(|(addr, cell)| (addr, &cell.object)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::array::TaggedArray;
    use crate::runtime::object::JSType;

    fn small_heap() -> Heap {
        let options = RuntimeOptions::default()
            .with_young_space_size(1024)
            .with_large_object_threshold(512);
        Heap::new(&options)
    }

    fn array(len: usize) -> HeapObject {
        HeapObject::TaggedArray(TaggedArray::new(JSType::TaggedArray, len, Value::hole()))
    }

    #[test]
    fn test_address_encoding() {
        let addr = Address::new(SpaceKind::NonMovable, 12345);
        assert_eq!(addr.space(), SpaceKind::NonMovable);
        assert_eq!(addr.slot(), 12345);
        assert_eq!(addr.raw() & 0x7, 0);
        assert!(Value::from_address(addr).is_heap_object());
        assert!(Address::new(SpaceKind::Young, 0).raw() > 0xFF);
    }

    #[test]
    fn test_allocate_and_read() {
        let mut heap = small_heap();
        let addr = heap.try_allocate(SpaceKind::Young, array(3)).unwrap();
        assert!(heap.is_live(addr));
        assert_eq!(addr.space(), SpaceKind::Young);
        match heap.cell(addr) {
            HeapObject::TaggedArray(a) => assert_eq!(a.len(), 3),
            _ => panic!("expected a tagged array"),
        }
        assert_eq!(heap.stats().space(SpaceKind::Young).objects, 1);
    }

    #[test]
    fn test_large_objects_go_to_huge_space() {
        let mut heap = small_heap();
        let addr = heap.try_allocate(SpaceKind::Young, array(100)).unwrap();
        assert_eq!(addr.space(), SpaceKind::Huge);
    }

    #[test]
    fn test_has_room_follows_huge_redirect() {
        let heap = small_heap();
        assert!(heap.has_room(SpaceKind::Young, 256));
        assert!(heap.has_room(SpaceKind::Young, 500));
        assert_eq!(heap.target_space(SpaceKind::Old, 600), SpaceKind::Huge);
        assert_eq!(heap.target_space(SpaceKind::NonMovable, 600), SpaceKind::NonMovable);
        assert!(heap.has_room(SpaceKind::Young, 600));
    }

    #[test]
    fn test_space_exhausted() {
        let mut heap = small_heap();
        let mut result = Ok(Address::new(SpaceKind::Young, 0));
        for _ in 0..64 {
            result = heap.try_allocate(SpaceKind::Young, array(40));
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(
            result,
            Err(AllocError::SpaceExhausted {
                space: SpaceKind::Young,
                ..
            })
        ));
    }

    #[test]
    fn test_read_only_seal() {
        let mut heap = small_heap();
        assert!(heap.try_allocate(SpaceKind::ReadOnly, array(0)).is_ok());
        heap.seal_read_only();
        assert_eq!(
            heap.try_allocate(SpaceKind::ReadOnly, array(0)),
            Err(AllocError::ReadOnlySealed)
        );
    }

    #[test]
    fn test_weak_upgrade() {
        let mut heap = small_heap();
        let addr = heap.try_allocate(SpaceKind::Old, array(1)).unwrap();
        let weak = Value::from_address(addr).create_weak();
        assert_eq!(heap.upgrade_weak(weak), Some(Value::from_address(addr)));
        heap.space_mut(SpaceKind::Old).remove(addr.slot());
        assert_eq!(heap.upgrade_weak(weak), None);
    }

    #[test]
    fn test_write_barrier_only_while_marking() {
        let mut heap = small_heap();
        let v = Value::from_address(Address::new(SpaceKind::Old, 1));
        heap.write_barrier(v);
        assert!(heap.barrier_log.is_empty());
        heap.set_marking(true);
        heap.write_barrier(v);
        heap.write_barrier(Value::int(1));
        assert_eq!(heap.barrier_log.len(), 1);
        heap.set_marking(false);
        assert!(heap.barrier_log.is_empty());
    }
}
