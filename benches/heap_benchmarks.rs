use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jsheap::bigint;
use jsheap::gc::HandleScope;
use jsheap::runtime::JSType;
use jsheap::{Context, Value};

const KEYS: [&[u8]; 8] = [b"a", b"b", b"c", b"d", b"e", b"f", b"g", b"h"];

fn bench_shared_shapes(c: &mut Criterion) {
    let mut ctx = Context::new();
    let keys: Vec<_> = KEYS.iter().map(|k| ctx.factory().new_from_ascii(k)).collect();

    c.bench_function("1k objects x 8 properties", |b| {
        b.iter(|| {
            let mut scope = HandleScope::new(&mut ctx);
            for i in 0..1000 {
                let object = scope.factory().new_empty_js_object();
                for key in &keys {
                    let key = key.value(scope.heap());
                    scope.factory().add_property(object, key, Value::int(i), Default::default());
                }
            }
            black_box(scope.memory_stats())
        })
    });
}

fn bench_elements(c: &mut Criterion) {
    c.bench_function("array set_element 10k", |b| {
        b.iter(|| {
            let mut ctx = Context::new();
            let array = ctx.factory().new_js_object_with_init(JSType::JsArray);
            for i in 0..10_000 {
                ctx.factory().set_element(array, i, Value::int(i as i32));
            }
            black_box(ctx.get_element(array, 9_999))
        })
    });
}

fn bench_initialize_all_kinds(c: &mut Criterion) {
    let mut ctx = Context::new();
    c.bench_function("new_heap_object every kind", |b| {
        b.iter(|| {
            let mut scope = HandleScope::new(&mut ctx);
            for &kind in JSType::ALL {
                black_box(scope.factory().new_heap_object(kind));
            }
        })
    });
}

fn bench_map(c: &mut Criterion) {
    c.bench_function("map set 1k", |b| {
        b.iter(|| {
            let mut ctx = Context::new();
            let map = ctx.factory().new_js_map();
            for i in 0..1000 {
                let _ = ctx.map_set(map, Value::int(i), Value::int(i * 2));
            }
            black_box(ctx.collection_size(map))
        })
    });
}

fn bench_bigint(c: &mut Criterion) {
    let mut ctx = Context::new();
    let digits = "9".repeat(2000);
    let x = bigint::parse(&mut ctx, &digits, 10).unwrap();
    let y = bigint::parse(&mut ctx, "123456789abcdef0123456789abcdef", 16).unwrap();

    c.bench_function("bigint multiply 2000 digits", |b| {
        b.iter(|| {
            let mut scope = HandleScope::new(&mut ctx);
            black_box(bigint::multiply(&mut scope, x, x).unwrap());
        })
    });

    c.bench_function("bigint divide", |b| {
        b.iter(|| {
            let mut scope = HandleScope::new(&mut ctx);
            black_box(bigint::divide(&mut scope, x, y).unwrap());
        })
    });

    c.bench_function("bigint to_string radix 10", |b| {
        b.iter(|| black_box(bigint::to_string(ctx.heap().get(x), 10)))
    });
}

fn bench_collect(c: &mut Criterion) {
    c.bench_function("collect 10k young objects", |b| {
        b.iter(|| {
            let mut ctx = Context::new();
            {
                let mut scope = HandleScope::new(&mut ctx);
                for _ in 0..10_000 {
                    scope.factory().new_empty_js_object();
                }
            }
            let keep = ctx.factory().new_empty_js_object();
            black_box(keep);
            black_box(ctx.collect_garbage())
        })
    });
}

criterion_group!(
    benches,
    bench_shared_shapes,
    bench_elements,
    bench_initialize_all_kinds,
    bench_map,
    bench_bigint,
    bench_collect,
);

criterion_main!(benches);
