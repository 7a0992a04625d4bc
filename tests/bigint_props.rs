use std::cmp::Ordering;

use jsheap::bigint::{self, BigInt};
use jsheap::gc::{Handle, HandleScope};
use jsheap::runtime::{shape_equivalent, HClass, JSObject, JSType, Storage};
use jsheap::{Context, Value};
use num_bigint::{BigInt as Oracle, Sign};
use num_traits::{ToPrimitive, Zero};
use proptest::prelude::*;

fn arb_oracle() -> impl Strategy<Value = Oracle> {
    (any::<bool>(), prop::collection::vec(any::<u32>(), 0..8)).prop_map(|(negative, digits)| {
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Oracle::from_slice(sign, &digits)
    })
}

fn alloc(ctx: &mut Context, n: &Oracle) -> Handle<BigInt> {
    match bigint::parse(ctx, &n.to_str_radix(16), 16) {
        Some(handle) => handle,
        None => panic!("oracle value {} did not parse", n),
    }
}

fn read(ctx: &Context, x: Handle<BigInt>) -> Oracle {
    let (negative, digits) = {
        let value = ctx.heap().get(x);
        (value.sign(), value.digits().to_vec())
    };
    Oracle::from_slice(if negative { Sign::Minus } else { Sign::Plus }, &digits)
}

proptest! {
    #[test]
    fn arithmetic_matches_oracle(a in arb_oracle(), b in arb_oracle()) {
        let mut ctx = Context::new();
        let mut scope = HandleScope::new(&mut ctx);
        let (x, y) = (alloc(&mut scope, &a), alloc(&mut scope, &b));

        let sum = bigint::add(&mut scope, x, y).unwrap();
        prop_assert_eq!(read(&scope, sum), &a + &b);
        let difference = bigint::subtract(&mut scope, x, y).unwrap();
        prop_assert_eq!(read(&scope, difference), &a - &b);
        let product = bigint::multiply(&mut scope, x, y).unwrap();
        prop_assert_eq!(read(&scope, product), &a * &b);

        if !b.is_zero() {
            // num-bigint truncates like the language operators do
            let quotient = bigint::divide(&mut scope, x, y).unwrap();
            prop_assert_eq!(read(&scope, quotient), &a / &b);
            let remainder = bigint::remainder(&mut scope, x, y).unwrap();
            prop_assert_eq!(read(&scope, remainder), &a % &b);
        } else {
            prop_assert!(bigint::divide(&mut scope, x, y).is_err());
            prop_assert!(scope.clear_exception().is_some());
        }
    }

    #[test]
    fn division_identity(a in arb_oracle(), b in arb_oracle()) {
        prop_assume!(!b.is_zero());
        let mut ctx = Context::new();
        let (x, y) = (alloc(&mut ctx, &a), alloc(&mut ctx, &b));
        let q = bigint::divide(&mut ctx, x, y).unwrap();
        let r = bigint::remainder(&mut ctx, x, y).unwrap();
        let qb = bigint::multiply(&mut ctx, q, y).unwrap();
        let back = bigint::add(&mut ctx, qb, r).unwrap();
        prop_assert_eq!(ctx.heap().get(back), ctx.heap().get(x));
    }

    #[test]
    fn bitwise_matches_oracle(a in arb_oracle(), b in arb_oracle()) {
        let mut ctx = Context::new();
        let (x, y) = (alloc(&mut ctx, &a), alloc(&mut ctx, &b));
        let and = bigint::bitwise_and(&mut ctx, x, y).unwrap();
        prop_assert_eq!(read(&ctx, and), &a & &b);
        let or = bigint::bitwise_or(&mut ctx, x, y).unwrap();
        prop_assert_eq!(read(&ctx, or), &a | &b);
        let xor = bigint::bitwise_xor(&mut ctx, x, y).unwrap();
        prop_assert_eq!(read(&ctx, xor), &a ^ &b);
        let not = bigint::bitwise_not(&mut ctx, x).unwrap();
        prop_assert_eq!(read(&ctx, not), -&a - 1u32);
    }

    #[test]
    fn bitwise_identities(a in arb_oracle()) {
        let mut ctx = Context::new();
        let x = alloc(&mut ctx, &a);
        let not = bigint::bitwise_not(&mut ctx, x).unwrap();
        let not_not = bigint::bitwise_not(&mut ctx, not).unwrap();
        prop_assert_eq!(ctx.heap().get(not_not), ctx.heap().get(x));
        let and = bigint::bitwise_and(&mut ctx, x, x).unwrap();
        prop_assert_eq!(ctx.heap().get(and), ctx.heap().get(x));
        let or = bigint::bitwise_or(&mut ctx, x, x).unwrap();
        prop_assert_eq!(ctx.heap().get(or), ctx.heap().get(x));
        let xor = bigint::bitwise_xor(&mut ctx, x, x).unwrap();
        prop_assert!(ctx.heap().get(xor).is_zero());
    }

    #[test]
    fn shifts_match_oracle(a in arb_oracle(), count in 0u32..200) {
        let mut ctx = Context::new();
        let x = alloc(&mut ctx, &a);
        let n = bigint::uint32_to_bigint(&mut ctx, count);
        let left = bigint::left_shift(&mut ctx, x, n).unwrap();
        prop_assert_eq!(read(&ctx, left), &a << count);
        // num-bigint's >> on negatives rounds toward negative infinity
        let right = bigint::signed_right_shift(&mut ctx, x, n).unwrap();
        prop_assert_eq!(read(&ctx, right), &a >> count);
        let minus_n = bigint::unary_minus(&mut ctx, n).unwrap();
        let back = bigint::left_shift(&mut ctx, x, minus_n).unwrap();
        prop_assert_eq!(read(&ctx, back), &a >> count);
    }

    #[test]
    fn compare_is_total_and_consistent(a in arb_oracle(), b in arb_oracle()) {
        let mut ctx = Context::new();
        let (x, y) = (alloc(&mut ctx, &a), alloc(&mut ctx, &b));
        let (x, y) = (ctx.heap().get(x), ctx.heap().get(y));
        prop_assert_eq!(x.compare(y), a.cmp(&b));
        prop_assert_eq!(y.compare(x), x.compare(y).reverse());
        prop_assert_eq!(x.equal(y), x.compare(y) == Ordering::Equal);
        prop_assert_eq!(x.same_value(y), x.equal(y));
        prop_assert_eq!(x.same_value_zero(y), x.equal(y));
    }

    #[test]
    fn text_round_trips(a in arb_oracle(), radix in prop::sample::select(vec![2u32, 8, 10, 16, 36])) {
        let mut ctx = Context::new();
        let x = alloc(&mut ctx, &a);
        let text = bigint::to_string(ctx.heap().get(x), radix);
        prop_assert_eq!(&text, &a.to_str_radix(radix));
        let back = bigint::parse(&mut ctx, &text, radix).unwrap();
        prop_assert_eq!(ctx.heap().get(back), ctx.heap().get(x));
    }

    #[test]
    fn int64_lossless_iff_fits(a in arb_oracle()) {
        let mut ctx = Context::new();
        let x = alloc(&mut ctx, &a);
        let value = ctx.heap().get(x);
        let (signed, lossless) = bigint::to_int64(value);
        prop_assert_eq!(lossless, a.to_i64().is_some());
        if let Some(expected) = a.to_i64() {
            prop_assert_eq!(signed, expected);
        }
        let (unsigned, lossless) = bigint::to_uint64(value);
        prop_assert_eq!(lossless, a.to_u64().is_some());
        if let Some(expected) = a.to_u64() {
            prop_assert_eq!(unsigned, expected);
        }
    }

    #[test]
    fn words_round_trip(negative in any::<bool>(), mut words in prop::collection::vec(any::<u64>(), 1..6)) {
        if let Some(last) = words.last_mut() {
            *last |= 1;
        }
        let mut ctx = Context::new();
        let x = bigint::from_words(&mut ctx, negative, &words).unwrap();
        prop_assert_eq!(bigint::to_words(ctx.heap().get(x)), (negative, words));
    }

    #[test]
    fn transitions_are_deterministic(keys in prop::collection::vec(0usize..6, 1..10)) {
        let names = ["a", "b", "c", "d", "e", "f"];
        let mut ctx = Context::new();
        let inline = ctx.options().inline_properties;
        let (root_a, root_b) = (
            ctx.factory().new_hclass(JSType::JsObject, inline, None),
            ctx.factory().new_hclass(JSType::JsObject, inline, None),
        );
        let shared = [ctx.factory().new_empty_js_object(), ctx.factory().new_empty_js_object()];
        let separate = [ctx.factory().new_js_object(root_a), ctx.factory().new_js_object(root_b)];
        for &k in &keys {
            let key = ctx.factory().new_from_utf8(names[k]);
            let key = key.value(ctx.heap());
            for object in shared {
                ctx.factory().set_property(object, key, Value::int(k as i32));
            }
            ctx.factory().set_property(separate[0], key, Value::int(k as i32));
        }
        // The cache is flushed and the second chain starts from another root,
        // so every class on it is built afresh.
        ctx.collect_garbage();
        for &k in &keys {
            let key = ctx.factory().new_from_utf8(names[k]);
            let key = key.value(ctx.heap());
            ctx.factory().set_property(separate[1], key, Value::int(k as i32));
        }

        let heap = ctx.heap();
        let class_of = |object: Handle<JSObject>| heap.get(object).hclass().heap_address().unwrap();
        let (a, b) = (class_of(shared[0]), class_of(shared[1]));
        prop_assert_eq!(a, b);
        prop_assert!(shape_equivalent(heap, heap.cast::<HClass>(a), heap.cast::<HClass>(b)));

        let (a, b) = (class_of(separate[0]), class_of(separate[1]));
        prop_assert_ne!(a, b);
        prop_assert!(shape_equivalent(heap, heap.cast::<HClass>(a), heap.cast::<HClass>(b)));
        prop_assert!(shape_equivalent(heap, heap.cast::<HClass>(a), heap.cast::<HClass>(class_of(shared[0]))));
    }
}

#[test]
fn power_of_two_composes() {
    let mut ctx = Context::new();
    let two = bigint::int32_to_bigint(&mut ctx, 2);
    let n53 = bigint::int32_to_bigint(&mut ctx, 53);
    let n54 = bigint::int32_to_bigint(&mut ctx, 54);
    let p53 = bigint::exponentiate(&mut ctx, two, n53).unwrap();
    let p54 = bigint::exponentiate(&mut ctx, two, n54).unwrap();
    assert_eq!(ctx.heap().get(p53).to_string(), "9007199254740992");
    let sum = bigint::add(&mut ctx, p53, p54).unwrap();
    assert_eq!(ctx.heap().get(sum).to_string(), "27021597764222976");
}

#[test]
fn zero_words_are_canonical_zero() {
    let mut ctx = Context::new();
    let zero = bigint::from_words(&mut ctx, false, &[]).unwrap();
    let negative_zero = bigint::from_words(&mut ctx, true, &[0, 0]).unwrap();
    assert_eq!(ctx.heap().get(zero), &BigInt::zero());
    assert_eq!(ctx.heap().get(negative_zero), &BigInt::zero());
}

#[test]
fn every_kind_initializes_every_field() {
    let mut ctx = Context::new();
    for &kind in JSType::ALL {
        if !matches!(kind.storage(), Storage::Object | Storage::Record) {
            continue;
        }
        let object = ctx.factory().new_heap_object(kind);
        let value = object.value(ctx.heap());
        for (name, field) in jsheap::runtime::dump_object(ctx.heap(), value) {
            assert!(!field.is_hole() || name == "proto_or_hclass", "{:?}.{} left a hole", kind, name);
        }
    }
}
