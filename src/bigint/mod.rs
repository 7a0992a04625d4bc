//! Arbitrary-precision integers
//!
//! A [`BigInt`] is a sign and a little-endian magnitude of `u32` digits.
//! Values are canonical: no leading zero digits except the single-digit
//! zero, which is non-negative, so structural equality is numeric equality.
//!
//! Operators take handles and return a newly allocated result; operands are
//! never mutated. Results are limited to [`BigInt::MAX_BITS`] bits. An
//! operation that would exceed the limit, divides by zero or uses a negative
//! exponent throws: the context records the error object as its pending
//! exception and the operator returns `Err`.

pub mod convert;
mod digits;

use std::cmp::Ordering;
use std::fmt;

use crate::context::Context;
use crate::error::{JsError, JsResult};
use crate::gc::Handle;

pub use convert::{
    bigint_to_number, compare_with_number, from_words, int32_to_bigint, int64_max,
    int64_to_bigint, number_to_bigint, parse, to_int64, to_string, to_uint64, to_words,
    to_words_into, uint32_to_bigint, uint64_max, uint64_to_bigint, word_count,
};

const DIVISION_BY_ZERO: &str = "Division by zero";
const NEGATIVE_EXPONENT: &str = "Exponent must be positive";
const MAX_SIZE_EXCEEDED: &str = "Maximum BigInt size exceeded";
const NO_UNSIGNED_RIGHT_SHIFT: &str = "BigInt have no unsigned right shift, use >> instead";

/// Heap BigInt
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    sign: bool,
    digits: Box<[u32]>,
}

impl BigInt {
    pub const MAX_BITS: usize = 1 << 20;
    pub const MAX_DIGITS: usize = Self::MAX_BITS / digits::DIGIT_BITS;

    /// Canonicalizes `digits` (little-endian) and the sign of zero.
    pub fn from_digits(sign: bool, digits: Vec<u32>) -> Self {
        let digits = digits::trim(digits);
        BigInt {
            sign: sign && !digits.is_empty(),
            digits: digits.into_boxed_slice(),
        }
    }

    pub fn zero() -> Self {
        BigInt {
            sign: false,
            digits: Box::new([]),
        }
    }

    /// `true` for negative values
    #[inline]
    pub fn sign(&self) -> bool {
        self.sign
    }

    /// Number of digits; zero is the single digit `0`
    #[inline]
    pub fn len(&self) -> usize {
        self.digits.len().max(1)
    }

    /// Little-endian digits, `[0]` for zero
    #[inline]
    pub fn digits(&self) -> &[u32] {
        if self.digits.is_empty() { &[0] } else { &self.digits }
    }

    /// Significant digits only; empty for zero
    #[inline]
    pub(crate) fn magnitude(&self) -> &[u32] {
        &self.digits
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn bit_length(&self) -> usize {
        digits::bit_length(&self.digits)
    }

    pub fn compare(&self, other: &BigInt) -> Ordering {
        match (self.sign, other.sign) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => digits::compare(&self.digits, &other.digits),
            (true, true) => digits::compare(&other.digits, &self.digits),
        }
    }

    #[inline]
    pub fn equal(&self, other: &BigInt) -> bool {
        self == other
    }

    /// BigInts have no signed zero, so SameValue is numeric equality
    #[inline]
    pub fn same_value(&self, other: &BigInt) -> bool {
        self.equal(other)
    }

    #[inline]
    pub fn same_value_zero(&self, other: &BigInt) -> bool {
        self.equal(other)
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_string(self, 10))
    }
}

/// Sign and magnitude of a result, or the error to throw
type Outcome = Result<(bool, Vec<u32>), JsError>;

fn complete(ctx: &mut Context, outcome: Outcome) -> JsResult<Handle<BigInt>> {
    let outcome = outcome.and_then(|(sign, magnitude)| {
        if magnitude.len() > BigInt::MAX_DIGITS {
            Err(JsError::Range(MAX_SIZE_EXCEEDED))
        } else {
            Ok((sign, magnitude))
        }
    });
    match outcome {
        Ok((sign, magnitude)) => Ok(ctx.factory().new_bigint(sign, magnitude)),
        Err(err) => Err(ctx.throw(err)),
    }
}

fn unary(
    ctx: &mut Context,
    x: Handle<BigInt>,
    op: fn(&BigInt) -> Outcome,
) -> JsResult<Handle<BigInt>> {
    let outcome = op(ctx.heap.get(x));
    complete(ctx, outcome)
}

fn binary(
    ctx: &mut Context,
    x: Handle<BigInt>,
    y: Handle<BigInt>,
    op: fn(&BigInt, &BigInt) -> Outcome,
) -> JsResult<Handle<BigInt>> {
    let outcome = op(ctx.heap.get(x), ctx.heap.get(y));
    complete(ctx, outcome)
}

pub fn add(ctx: &mut Context, x: Handle<BigInt>, y: Handle<BigInt>) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, |a, b| Ok(eval::signed_add(a.sign, &a.digits, b.sign, &b.digits)))
}

pub fn subtract(
    ctx: &mut Context,
    x: Handle<BigInt>,
    y: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, |a, b| Ok(eval::signed_add(a.sign, &a.digits, !b.sign, &b.digits)))
}

pub fn multiply(
    ctx: &mut Context,
    x: Handle<BigInt>,
    y: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, eval::multiply)
}

/// Quotient truncated toward zero
pub fn divide(ctx: &mut Context, x: Handle<BigInt>, y: Handle<BigInt>) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, eval::divide)
}

/// Remainder with the dividend's sign
pub fn remainder(
    ctx: &mut Context,
    x: Handle<BigInt>,
    y: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, eval::remainder)
}

/// Remainder with the divisor's sign
pub fn floor_mod(
    ctx: &mut Context,
    x: Handle<BigInt>,
    y: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, eval::floor_mod)
}

pub fn exponentiate(
    ctx: &mut Context,
    base: Handle<BigInt>,
    exponent: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    binary(ctx, base, exponent, eval::exponentiate)
}

pub fn unary_minus(ctx: &mut Context, x: Handle<BigInt>) -> JsResult<Handle<BigInt>> {
    unary(ctx, x, |a| Ok((!a.sign, a.digits.to_vec())))
}

pub fn increment(ctx: &mut Context, x: Handle<BigInt>) -> JsResult<Handle<BigInt>> {
    unary(ctx, x, |a| Ok(eval::signed_add(a.sign, &a.digits, false, &[1])))
}

pub fn bitwise_not(ctx: &mut Context, x: Handle<BigInt>) -> JsResult<Handle<BigInt>> {
    unary(ctx, x, eval::bitwise_not)
}

pub fn bitwise_and(
    ctx: &mut Context,
    x: Handle<BigInt>,
    y: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, eval::bitwise_and)
}

pub fn bitwise_or(
    ctx: &mut Context,
    x: Handle<BigInt>,
    y: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, eval::bitwise_or)
}

pub fn bitwise_xor(
    ctx: &mut Context,
    x: Handle<BigInt>,
    y: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, eval::bitwise_xor)
}

/// `x << y`; a negative count shifts right
pub fn left_shift(
    ctx: &mut Context,
    x: Handle<BigInt>,
    y: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, |a, count| {
        if count.sign {
            Ok(eval::shift_right_by(a, count))
        } else {
            eval::shift_left_by(a, count)
        }
    })
}

/// `x >> y`, rounding toward negative infinity; a negative count shifts left
pub fn signed_right_shift(
    ctx: &mut Context,
    x: Handle<BigInt>,
    y: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    binary(ctx, x, y, |a, count| {
        if count.sign {
            eval::shift_left_by(a, count)
        } else {
            Ok(eval::shift_right_by(a, count))
        }
    })
}

/// Always a TypeError
pub fn unsigned_right_shift(
    ctx: &mut Context,
    _x: Handle<BigInt>,
    _y: Handle<BigInt>,
) -> JsResult<Handle<BigInt>> {
    Err(ctx.throw(JsError::Type(NO_UNSIGNED_RIGHT_SHIFT)))
}

/// `BigInt.asUintN(bits, x)`
pub fn as_uint_n(ctx: &mut Context, bits: u64, x: Handle<BigInt>) -> JsResult<Handle<BigInt>> {
    let outcome = eval::as_uint_n(bits, ctx.heap.get(x));
    complete(ctx, outcome)
}

/// `BigInt.asIntN(bits, x)`
pub fn as_int_n(ctx: &mut Context, bits: u64, x: Handle<BigInt>) -> JsResult<Handle<BigInt>> {
    let outcome = eval::as_int_n(bits, ctx.heap.get(x));
    complete(ctx, outcome)
}

/// Operators on borrowed values; allocation happens in [`complete`].
mod eval {
    use super::*;

    fn zero() -> (bool, Vec<u32>) {
        (false, Vec::new())
    }

    pub(super) fn signed_add(a_sign: bool, a: &[u32], b_sign: bool, b: &[u32]) -> (bool, Vec<u32>) {
        if a_sign == b_sign {
            return (a_sign, digits::add(a, b));
        }
        match digits::compare(a, b) {
            Ordering::Less => (b_sign, digits::sub(b, a)),
            _ => (a_sign, digits::sub(a, b)),
        }
    }

    pub(super) fn multiply(a: &BigInt, b: &BigInt) -> Outcome {
        if a.is_zero() || b.is_zero() {
            return Ok(zero());
        }
        if a.len() + b.len() > BigInt::MAX_DIGITS + 1 {
            return Err(JsError::Range(MAX_SIZE_EXCEEDED));
        }
        Ok((a.sign != b.sign, digits::multiply(&a.digits, &b.digits)))
    }

    fn div_rem(a: &BigInt, b: &BigInt) -> Result<(Vec<u32>, Vec<u32>), JsError> {
        if b.is_zero() {
            return Err(JsError::Range(DIVISION_BY_ZERO));
        }
        Ok(digits::div_rem(&a.digits, &b.digits))
    }

    pub(super) fn divide(a: &BigInt, b: &BigInt) -> Outcome {
        let (quotient, _) = div_rem(a, b)?;
        Ok((a.sign != b.sign, quotient))
    }

    pub(super) fn remainder(a: &BigInt, b: &BigInt) -> Outcome {
        let (_, rem) = div_rem(a, b)?;
        Ok((a.sign, rem))
    }

    pub(super) fn floor_mod(a: &BigInt, b: &BigInt) -> Outcome {
        let (_, rem) = div_rem(a, b)?;
        if !rem.is_empty() && a.sign != b.sign {
            return Ok((b.sign, digits::sub(&b.digits, &rem)));
        }
        Ok((a.sign, rem))
    }

    /// Rough `log2(|x|)`, exact enough to reject oversized powers early
    fn approx_log2(magnitude: &[u32]) -> f64 {
        let bits = digits::bit_length(magnitude);
        let shift = bits.saturating_sub(64);
        let top = digits::shift_right(magnitude, shift);
        let top = top.iter().rev().fold(0u64, |acc, &d| (acc << 32) | d as u64);
        shift as f64 + (top as f64).log2()
    }

    pub(super) fn exponentiate(base: &BigInt, exponent: &BigInt) -> Outcome {
        if exponent.sign {
            return Err(JsError::Range(NEGATIVE_EXPONENT));
        }
        if exponent.is_zero() {
            return Ok((false, vec![1]));
        }
        if base.is_zero() {
            return Ok(zero());
        }
        let sign = base.sign && exponent.digits[0] & 1 == 1;
        if *base.digits == [1] {
            return Ok((sign, vec![1]));
        }
        // |base| >= 2: the result has more bits than the exponent's value
        if exponent.len() > 1 || exponent.digits[0] as usize > BigInt::MAX_BITS {
            return Err(JsError::Range(MAX_SIZE_EXCEEDED));
        }
        let n = exponent.digits[0] as usize;
        if *base.digits == [2] {
            return Ok((sign, digits::power_of_two(n)));
        }
        if n as f64 * approx_log2(&base.digits) > (BigInt::MAX_BITS + 1) as f64 {
            return Err(JsError::Range(MAX_SIZE_EXCEEDED));
        }
        let mut result = vec![1u32];
        let mut square = base.digits.to_vec();
        let mut remaining = n;
        loop {
            if remaining & 1 == 1 {
                result = digits::multiply(&result, &square);
            }
            remaining >>= 1;
            if remaining == 0 {
                break;
            }
            square = digits::multiply(&square, &square);
        }
        Ok((sign, result))
    }

    /// `~x == -(x + 1)`
    pub(super) fn bitwise_not(a: &BigInt) -> Outcome {
        if a.sign {
            Ok((false, digits::sub_one(&a.digits)))
        } else {
            Ok((true, digits::add_one(&a.digits)))
        }
    }

    // Negative operands are handled through |x| - 1, their bitwise
    // complement in two's complement.

    pub(super) fn bitwise_and(a: &BigInt, b: &BigInt) -> Outcome {
        Ok(match (a.sign, b.sign) {
            (false, false) => (false, digits::and(&a.digits, &b.digits)),
            (true, true) => {
                let merged = digits::or(&digits::sub_one(&a.digits), &digits::sub_one(&b.digits));
                (true, digits::add_one(&merged))
            }
            (false, true) => (false, digits::and_not(&a.digits, &digits::sub_one(&b.digits))),
            (true, false) => (false, digits::and_not(&b.digits, &digits::sub_one(&a.digits))),
        })
    }

    pub(super) fn bitwise_or(a: &BigInt, b: &BigInt) -> Outcome {
        Ok(match (a.sign, b.sign) {
            (false, false) => (false, digits::or(&a.digits, &b.digits)),
            (true, true) => {
                let common = digits::and(&digits::sub_one(&a.digits), &digits::sub_one(&b.digits));
                (true, digits::add_one(&common))
            }
            (false, true) => {
                let rest = digits::and_not(&digits::sub_one(&b.digits), &a.digits);
                (true, digits::add_one(&rest))
            }
            (true, false) => {
                let rest = digits::and_not(&digits::sub_one(&a.digits), &b.digits);
                (true, digits::add_one(&rest))
            }
        })
    }

    pub(super) fn bitwise_xor(a: &BigInt, b: &BigInt) -> Outcome {
        Ok(match (a.sign, b.sign) {
            (false, false) => (false, digits::xor(&a.digits, &b.digits)),
            (true, true) => (
                false,
                digits::xor(&digits::sub_one(&a.digits), &digits::sub_one(&b.digits)),
            ),
            (false, true) => {
                let mixed = digits::xor(&a.digits, &digits::sub_one(&b.digits));
                (true, digits::add_one(&mixed))
            }
            (true, false) => {
                let mixed = digits::xor(&b.digits, &digits::sub_one(&a.digits));
                (true, digits::add_one(&mixed))
            }
        })
    }

    /// Shift count as a bit count, if within the size limit
    fn shift_count(count: &BigInt) -> Option<usize> {
        match *count.digits {
            [] => Some(0),
            [n] if n as usize <= BigInt::MAX_BITS => Some(n as usize),
            _ => None,
        }
    }

    /// Shifts `a` left by `|count|` bits
    pub(super) fn shift_left_by(a: &BigInt, count: &BigInt) -> Outcome {
        if a.is_zero() {
            return Ok(zero());
        }
        match shift_count(count) {
            Some(n) => Ok((a.sign, digits::shift_left(&a.digits, n))),
            None => Err(JsError::Range(MAX_SIZE_EXCEEDED)),
        }
    }

    /// Shifts `a` right by `|count|` bits, rounding toward negative infinity
    pub(super) fn shift_right_by(a: &BigInt, count: &BigInt) -> (bool, Vec<u32>) {
        let Some(n) = shift_count(count) else {
            return if a.sign { (true, vec![1]) } else { zero() };
        };
        let mut magnitude = digits::shift_right(&a.digits, n);
        if a.sign && digits::judge_round_down(&a.digits, n) {
            magnitude = digits::add_one(&magnitude);
        }
        (a.sign, magnitude)
    }

    pub(super) fn as_uint_n(bits: u64, a: &BigInt) -> Outcome {
        if bits == 0 || a.is_zero() {
            return Ok(zero());
        }
        if !a.sign {
            if a.bit_length() as u64 <= bits {
                return Ok((false, a.digits.to_vec()));
            }
            return Ok((false, digits::truncate_bits(&a.digits, bits as usize)));
        }
        // 2^bits - (|a| mod 2^bits)
        if bits > BigInt::MAX_BITS as u64 {
            return Err(JsError::Range(MAX_SIZE_EXCEEDED));
        }
        let low = digits::truncate_bits(&a.digits, bits as usize);
        if low.is_empty() {
            return Ok(zero());
        }
        Ok((false, digits::sub(&digits::power_of_two(bits as usize), &low)))
    }

    pub(super) fn as_int_n(bits: u64, a: &BigInt) -> Outcome {
        if bits == 0 || a.is_zero() {
            return Ok(zero());
        }
        if bits > BigInt::MAX_BITS as u64 {
            return Ok((a.sign, a.digits.to_vec()));
        }
        let (_, low) = as_uint_n(bits, a)?;
        if digits::bit_length(&low) as u64 == bits {
            // Top bit set: the value is low - 2^bits
            return Ok((true, digits::sub(&digits::power_of_two(bits as usize), &low)));
        }
        Ok((false, low))
    }
}
