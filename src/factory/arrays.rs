//! Tagged array helpers
//!
//! Copies, extensions and in-place shifts over [`TaggedArray`]s. A bulk
//! slice copy is only used when the destination sits in the young space and
//! marking is off; otherwise every slot goes through the barriered store.

use super::ObjectFactory;
use crate::gc::Handle;
use crate::runtime::array::TaggedArray;
use crate::runtime::object::JSType;
use crate::value::Value;

impl ObjectFactory<'_> {
    /// Writes `values` into `dst` starting at `start`
    fn store_slots(&mut self, dst: Handle<TaggedArray>, start: usize, values: &[Value]) {
        let addr = dst.address(&self.ctx.heap);
        if self.ctx.heap.in_young_space(addr) && !self.ctx.heap.is_marking() {
            self.ctx.heap.get_mut(dst).as_mut_slice()[start..start + values.len()].copy_from_slice(values);
            return;
        }
        for (i, &value) in values.iter().enumerate() {
            self.ctx.array_set(dst, start + i, value);
        }
    }

    fn prefix(&self, src: Handle<TaggedArray>, len: usize) -> Vec<Value> {
        self.ctx.heap.get(src).as_slice()[..len].to_vec()
    }

    /// New array of `new_len` slots: the first `old_len` of `src`, then holes
    pub fn new_and_copy_tagged_array(
        &mut self,
        src: Handle<TaggedArray>,
        new_len: usize,
        old_len: usize,
    ) -> Handle<TaggedArray> {
        debug_assert!(old_len <= new_len);
        let dst = self.new_tagged_array(new_len);
        if old_len > 0 {
            let values = self.prefix(src, old_len);
            self.store_slots(dst, 0, &values);
        }
        dst
    }

    /// Copy of `old` grown to `len`, new slots set to `init`
    pub fn extend_array(&mut self, old: Handle<TaggedArray>, len: usize, init: Value) -> Handle<TaggedArray> {
        let old_len = self.ctx.heap.get(old).len();
        self.extend_prefix(old, old_len, len, init)
    }

    /// The first `old_len` slots of `old`, then `init` up to `len`
    fn extend_prefix(
        &mut self,
        old: Handle<TaggedArray>,
        old_len: usize,
        len: usize,
        init: Value,
    ) -> Handle<TaggedArray> {
        assert!(old_len <= len, "cannot extend {} slots to {}", old_len, len);
        let kind = self.ctx.heap.get(old).kind();
        let kind = if kind == JSType::CowTaggedArray { JSType::TaggedArray } else { kind };
        let dst = self.new_tagged_array_with(kind, len, init);
        let values = self.prefix(old, old_len);
        self.store_slots(dst, 0, &values);
        dst
    }

    /// Resized copy of the first `old_len` slots of `old`
    pub fn copy_array(
        &mut self,
        old: Handle<TaggedArray>,
        old_len: usize,
        new_len: usize,
        init: Value,
    ) -> Handle<TaggedArray> {
        let physical = self.ctx.heap.get(old).len();
        assert!(old_len <= physical, "copy of {} slots from an array of {}", old_len, physical);
        if new_len == 0 {
            return self.new_tagged_array(0);
        }
        if new_len > old_len {
            return self.extend_prefix(old, old_len, new_len, init);
        }
        let dst = self.new_tagged_array(new_len);
        let values = self.prefix(old, new_len);
        self.store_slots(dst, 0, &values);
        dst
    }

    /// Copy of `old[start..end]` up to its first hole; the rest stays hole
    pub fn copy_part_array(&mut self, old: Handle<TaggedArray>, start: usize, end: usize) -> Handle<TaggedArray> {
        debug_assert!(start <= end);
        let len = end - start;
        let dst = self.new_tagged_array(len);
        let values: Vec<Value> = self.ctx.heap.get(old).as_slice()[start..end]
            .iter()
            .copied()
            .take_while(|v| !v.is_hole())
            .collect();
        self.store_slots(dst, 0, &values);
        dst
    }

    /// Shifts `array[index..effective_len]` right by one and stores `value`
    /// at `index`. The caller has made room for one more slot.
    pub fn insert_element_by_index(
        &mut self,
        array: Handle<TaggedArray>,
        value: Value,
        index: usize,
        effective_len: usize,
    ) {
        let len = self.ctx.heap.get(array).len();
        assert!(index <= effective_len && effective_len < len, "no room to insert at {}", index);
        let moved = self.ctx.heap.get(array).as_slice()[index..effective_len].to_vec();
        self.store_slots(array, index + 1, &moved);
        self.ctx.array_set(array, index, value);
    }

    /// Shifts `array[index + 1..effective_len]` left by one and clears the
    /// vacated last slot.
    pub fn remove_element_by_index(&mut self, array: Handle<TaggedArray>, index: usize, effective_len: usize) {
        assert!(index < effective_len, "remove index {} out of range", index);
        let moved = self.ctx.heap.get(array).as_slice()[index + 1..effective_len].to_vec();
        self.store_slots(array, index, &moved);
        self.ctx.array_set(array, effective_len - 1, Value::hole());
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::gc::{Handle, SpaceKind};
    use crate::runtime::array::TaggedArray;
    use crate::value::Value;

    fn ints(ctx: &mut Context, values: &[i32]) -> Handle<TaggedArray> {
        let array = ctx.factory().new_tagged_array(values.len());
        for (i, &v) in values.iter().enumerate() {
            ctx.array_set(array, i, Value::int(v));
        }
        array
    }

    fn contents(ctx: &Context, array: Handle<TaggedArray>) -> Vec<Option<i32>> {
        ctx.heap.get(array).iter().map(|v| v.to_i32()).collect()
    }

    #[test]
    fn test_extend_and_copy() {
        let mut ctx = Context::new();
        let src = ints(&mut ctx, &[1, 2, 3]);
        let extended = ctx.factory().extend_array(src, 5, Value::int(0));
        assert_eq!(contents(&ctx, extended), [Some(1), Some(2), Some(3), Some(0), Some(0)]);

        let shrunk = ctx.factory().copy_array(src, 3, 2, Value::hole());
        assert_eq!(contents(&ctx, shrunk), [Some(1), Some(2)]);

        let empty = ctx.factory().copy_array(src, 3, 0, Value::hole());
        assert_eq!(empty.address(&ctx.heap).space(), SpaceKind::ReadOnly);

        let copied = ctx.factory().new_and_copy_tagged_array(src, 4, 2);
        let array = ctx.heap.get(copied);
        assert_eq!(array.get(1), Value::int(2));
        assert!(array.get(2).is_hole() && array.get(3).is_hole());
    }

    #[test]
    fn test_copy_grows_from_logical_length() {
        let mut ctx = Context::new();
        let src = ints(&mut ctx, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let copy = ctx.factory().copy_array(src, 3, 5, Value::int(0));
        assert_eq!(contents(&ctx, copy), [Some(1), Some(2), Some(3), Some(0), Some(0)]);

        let copy = ctx.factory().copy_array(src, 3, 12, Value::int(-1));
        let expected: Vec<_> = [1, 2, 3].into_iter().chain([-1; 9]).map(Some).collect();
        assert_eq!(contents(&ctx, copy), expected);
    }

    #[test]
    fn test_holes_are_preserved() {
        let mut ctx = Context::new();
        let src = ctx.factory().new_tagged_array(3);
        ctx.array_set(src, 0, Value::int(7));
        ctx.array_set(src, 2, Value::int(9));
        let copy = ctx.factory().copy_array(src, 3, 4, Value::int(1));
        let array = ctx.heap.get(copy);
        assert_eq!(array.get(0), Value::int(7));
        assert!(array.get(1).is_hole());
        assert_eq!(array.get(2), Value::int(9));
        assert_eq!(array.get(3), Value::int(1));
    }

    #[test]
    fn test_copy_part_stops_at_hole() {
        let mut ctx = Context::new();
        let src = ctx.factory().new_tagged_array(5);
        for i in [0, 1, 2, 4] {
            ctx.array_set(src, i, Value::int(i as i32));
        }
        let part = ctx.factory().copy_part_array(src, 1, 5);
        assert_eq!(contents(&ctx, part), [Some(1), Some(2), None, None]);
        assert!(ctx.heap.get(part).get(3).is_hole());
    }

    #[test]
    fn test_insert_and_remove() {
        let mut ctx = Context::new();
        let array = ints(&mut ctx, &[1, 2, 3, 0]);
        ctx.array_set(array, 3, Value::hole());
        ctx.factory().insert_element_by_index(array, Value::int(9), 1, 3);
        assert_eq!(contents(&ctx, array), [Some(1), Some(9), Some(2), Some(3)]);

        ctx.factory().remove_element_by_index(array, 0, 4);
        assert_eq!(contents(&ctx, array), [Some(9), Some(2), Some(3), None]);
        assert!(ctx.heap.get(array).get(3).is_hole());
    }

    #[test]
    fn test_barriered_path_while_marking() {
        let mut ctx = Context::new();
        let src = ints(&mut ctx, &[4, 5]);
        let inner = ctx.factory().new_tagged_array(1);
        let inner_value = inner.value(&ctx.heap);
        ctx.array_set(src, 1, inner_value);
        ctx.heap.set_marking(true);
        let copy = ctx.factory().extend_array(src, 3, Value::hole());
        ctx.heap.set_marking(false);
        assert_eq!(ctx.heap.get(copy).get(1), inner.value(&ctx.heap));
        assert_eq!(ctx.heap.get(copy).get(0), Value::int(4));
    }
}
