//! Heap object dumps
//!
//! [`dump_object`] projects any heap value into ordered `(name, value)`
//! pairs: declared fields by their field names, array slots by index. Used
//! by snapshot tooling and by the `jsheap` inspector.

use std::borrow::Cow;

use crate::gc::Heap;
use crate::runtime::object::HeapObject;
use crate::value::Value;

pub type DumpEntries = Vec<(Cow<'static, str>, Value)>;

/// Ordered field projection of `value`; empty for non-heap values and
/// freed objects
pub fn dump_object(heap: &Heap, value: Value) -> DumpEntries {
    let Some(object) = value.heap_address().and_then(|addr| heap.try_cell(addr)) else {
        return Vec::new();
    };
    let mut out = DumpEntries::new();
    let int = |n: usize| Value::number(n as f64);
    match object {
        HeapObject::HClass(hclass) => {
            out.push(("js_type".into(), Value::int(hclass.js_type() as i32)));
            out.push(("object_size".into(), int(hclass.object_size() as usize)));
            out.push(("inline_properties".into(), int(hclass.inline_properties() as usize)));
            out.push(("number_of_props".into(), int(hclass.number_of_props() as usize)));
            out.push(("layout".into(), hclass.layout()));
            out.push(("prototype".into(), hclass.prototype()));
            out.push(("flags".into(), Value::int(hclass.flags().bits() as i32)));
            out.push(("transitions".into(), int(hclass.transition_count())));
        }
        HeapObject::TaggedArray(array) => {
            out.push(("length".into(), int(array.len())));
            for (i, v) in array.iter().enumerate() {
                out.push((Cow::Owned(format!("[{}]", i)), v));
            }
        }
        HeapObject::Layout(layout) => {
            out.push(("capacity".into(), int(layout.capacity() as usize)));
            for (i, entry) in layout.entries(layout.len()).iter().enumerate() {
                out.push((Cow::Owned(format!("key[{}]", i)), entry.key));
                out.push((
                    Cow::Owned(format!("offset[{}]", i)),
                    int(entry.attributes.offset() as usize),
                ));
            }
        }
        HeapObject::Table(table) => {
            out.push(("size".into(), int(table.len())));
            for (i, entry) in table.iter().enumerate() {
                out.push((Cow::Owned(format!("key[{}]", i)), entry.key));
                out.push((Cow::Owned(format!("value[{}]", i)), entry.value));
            }
        }
        HeapObject::String(string) => {
            out.push(("length".into(), int(string.len())));
            out.push(("hash".into(), Value::number(string.hash() as f64)));
            out.push(("compressed".into(), Value::bool(string.is_ascii())));
        }
        HeapObject::Symbol(symbol) => {
            out.push(("description".into(), symbol.description()));
            out.push(("hash".into(), Value::number(symbol.hash() as f64)));
            out.push(("private".into(), Value::bool(symbol.is_private())));
        }
        HeapObject::BigInt(bigint) => {
            out.push(("sign".into(), Value::bool(bigint.sign())));
            out.push(("length".into(), int(bigint.len())));
        }
        HeapObject::ByteArray(bytes) => {
            out.push(("length".into(), int(bytes.len())));
        }
        HeapObject::Record(record) => {
            out.push(("hclass".into(), record.hclass()));
            for (spec, v) in record.js_type().fields().iter().zip(record.fields()) {
                out.push((spec.name.into(), *v));
            }
        }
        HeapObject::Object(object) => {
            out.push(("hclass".into(), object.hclass()));
            out.push(("properties".into(), object.properties()));
            out.push(("elements".into(), object.elements()));
            for (spec, v) in object.js_type().fields().iter().zip(object.fields()) {
                out.push((spec.name.into(), *v));
            }
            for i in 0..object.inline_count() {
                out.push((Cow::Owned(format!("inline[{}]", i)), object.inline_property(i)));
            }
        }
    }
    out
}

/// Human-readable dump: the kind name, then one `name: value` line per
/// entry. String values are printed with their contents.
pub fn format_object(heap: &Heap, value: Value) -> String {
    let Some(object) = value.heap_address().and_then(|addr| heap.try_cell(addr)) else {
        return format!("{}", value);
    };
    let header = format!("{} {:?}", object.js_type().type_name(), value);
    let lines = dump_object(heap, value)
        .into_iter()
        .map(|(name, v)| format!("  {}: {}", name, format_value(heap, v)));
    let mut out = std::iter::once(header).chain(lines).collect::<Vec<_>>().join("\n");
    out.push('\n');
    out
}

fn format_value(heap: &Heap, value: Value) -> String {
    match heap.value_cell(value) {
        Some(HeapObject::String(s)) => format!("{:?}", s.to_string_lossy()),
        Some(object) => format!("<{}>", object.js_type().type_name()),
        None => format!("{}", value),
    }
}
