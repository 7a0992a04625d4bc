//! BigInt conversions
//!
//! Text in any radix from 2 to 36, little-endian `u64` word arrays,
//! fixed-width integers and IEEE doubles.

use std::cmp::Ordering;

use super::digits::{self, DIGIT_BITS};
use super::BigInt;
use crate::context::Context;
use crate::error::{ConversionError, JsError, JsResult};
use crate::gc::Handle;

const NOT_AN_INTEGER: &str =
    "The number cannot be converted to a BigInt because it is not an integer";

const DIGIT_CHARS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of radix digits that fit one `u32`, and `radix` raised to it
fn chunk(radix: u32) -> (usize, u32) {
    let mut count = 1;
    let mut power = radix;
    while let Some(next) = power.checked_mul(radix) {
        power = next;
        count += 1;
    }
    (count, power)
}

/// Sign and magnitude spelled by `text`: an optional `-` followed by one or
/// more digits of `radix`. No whitespace, prefixes or separators.
pub(crate) fn parse_magnitude(text: &str, radix: u32) -> Option<(bool, Vec<u32>)> {
    if !(2..=36).contains(&radix) {
        return None;
    }
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if body.is_empty() {
        return None;
    }
    // n significant digits need at least (n - 1) * floor(log2(radix)) + 1 bits
    let significant = body.trim_start_matches('0').len();
    let floor_log2 = (u32::BITS - 1 - radix.leading_zeros()) as usize;
    if significant.saturating_sub(1) * floor_log2 >= BigInt::MAX_BITS {
        return None;
    }
    let (per_chunk, _) = chunk(radix);
    let mut magnitude = Vec::new();
    for group in body.as_bytes().chunks(per_chunk) {
        let mut value = 0u32;
        let mut scale = 1u32;
        for &b in group {
            let d = (b as char).to_digit(radix)?;
            value = value * radix + d;
            scale *= radix;
        }
        digits::mul_add_small(&mut magnitude, scale, value);
        if magnitude.len() > BigInt::MAX_DIGITS {
            return None;
        }
    }
    Some((sign, magnitude))
}

/// Parses `text` in `radix`; `None` on malformed input or a value past the
/// size limit.
pub fn parse(ctx: &mut Context, text: &str, radix: u32) -> Option<Handle<BigInt>> {
    let (sign, magnitude) = parse_magnitude(text, radix)?;
    Some(ctx.factory().new_bigint(sign, magnitude))
}

/// Textual form in `radix`: leading `-` for negatives, lowercase digits,
/// no leading zeros.
///
/// # Panics
/// Panics if `radix` is outside `2..=36`.
pub fn to_string(x: &BigInt, radix: u32) -> String {
    assert!((2..=36).contains(&radix), "radix {} out of range", radix);
    if x.is_zero() {
        return "0".to_string();
    }
    let (per_chunk, divisor) = chunk(radix);
    let mut magnitude = x.digits().to_vec();
    let mut reversed = Vec::new();
    while !magnitude.is_empty() {
        let (quotient, mut rem) = digits::div_rem_digit(&magnitude, divisor);
        magnitude = quotient;
        for _ in 0..per_chunk {
            if magnitude.is_empty() && rem == 0 {
                break;
            }
            reversed.push(DIGIT_CHARS[(rem % radix) as usize]);
            rem /= radix;
        }
    }
    if x.sign() {
        reversed.push(b'-');
    }
    reversed.iter().rev().map(|&b| b as char).collect()
}

/// Builds a BigInt from little-endian 64-bit words
pub fn from_words(
    ctx: &mut Context,
    sign: bool,
    words: &[u64],
) -> Result<Handle<BigInt>, ConversionError> {
    if words.len() > BigInt::MAX_DIGITS / 2 {
        return Err(ConversionError::TooManyWords(words.len()));
    }
    let magnitude = words
        .iter()
        .flat_map(|&w| [w as u32, (w >> DIGIT_BITS) as u32])
        .collect();
    Ok(ctx.factory().new_bigint(sign, magnitude))
}

#[inline]
pub fn word_count(x: &BigInt) -> usize {
    x.magnitude().len().div_ceil(2)
}

fn words(x: &BigInt) -> impl Iterator<Item = u64> + '_ {
    x.magnitude()
        .chunks(2)
        .map(|pair| pair[0] as u64 | (pair.get(1).copied().unwrap_or(0) as u64) << DIGIT_BITS)
}

/// Sign and little-endian words; zero has no words
pub fn to_words(x: &BigInt) -> (bool, Vec<u64>) {
    (x.sign(), words(x).collect())
}

/// Writes the words into `out`, returning the sign and the word count.
pub fn to_words_into(x: &BigInt, out: &mut [u64]) -> Result<(bool, usize), ConversionError> {
    let needed = word_count(x);
    if out.len() < needed {
        return Err(ConversionError::BufferTooSmall {
            needed,
            available: out.len(),
        });
    }
    for (slot, word) in out.iter_mut().zip(words(x)) {
        *slot = word;
    }
    Ok((x.sign(), needed))
}

#[inline]
fn low64(magnitude: &[u32]) -> u64 {
    let lo = magnitude.first().copied().unwrap_or(0) as u64;
    let hi = magnitude.get(1).copied().unwrap_or(0) as u64;
    lo | hi << DIGIT_BITS
}

/// Value modulo 2^64 as a signed integer, and whether it fit exactly
pub fn to_int64(x: &BigInt) -> (i64, bool) {
    let low = low64(x.digits());
    let value = if x.sign() { low.wrapping_neg() } else { low } as i64;
    let lossless = x.len() <= 2 && (x.is_zero() || (value < 0) == x.sign());
    (value, lossless)
}

/// Value modulo 2^64, and whether it fit exactly
pub fn to_uint64(x: &BigInt) -> (u64, bool) {
    let low = low64(x.digits());
    let value = if x.sign() { low.wrapping_neg() } else { low };
    (value, !x.sign() && x.len() <= 2)
}

fn split_u64(value: u64) -> Vec<u32> {
    vec![value as u32, (value >> DIGIT_BITS) as u32]
}

pub fn int32_to_bigint(ctx: &mut Context, value: i32) -> Handle<BigInt> {
    ctx.factory()
        .new_bigint(value < 0, vec![value.unsigned_abs()])
}

pub fn uint32_to_bigint(ctx: &mut Context, value: u32) -> Handle<BigInt> {
    ctx.factory().new_bigint(false, vec![value])
}

pub fn int64_to_bigint(ctx: &mut Context, value: i64) -> Handle<BigInt> {
    ctx.factory()
        .new_bigint(value < 0, split_u64(value.unsigned_abs()))
}

pub fn uint64_to_bigint(ctx: &mut Context, value: u64) -> Handle<BigInt> {
    ctx.factory().new_bigint(false, split_u64(value))
}

pub fn uint64_max(ctx: &mut Context) -> Handle<BigInt> {
    uint64_to_bigint(ctx, u64::MAX)
}

pub fn int64_max(ctx: &mut Context) -> Handle<BigInt> {
    int64_to_bigint(ctx, i64::MAX)
}

/// Sign and magnitude of an integral, finite double
fn integral_digits(number: f64) -> Option<(bool, Vec<u32>)> {
    if !number.is_finite() || number.trunc() != number {
        return None;
    }
    let bits = number.to_bits();
    let sign = bits >> 63 == 1;
    let exponent = ((bits >> 52) & 0x7FF) as i64;
    if exponent == 0 {
        // Zero; integral subnormals do not exist
        return Some((false, Vec::new()));
    }
    let mantissa = split_u64((bits & ((1 << 52) - 1)) | (1 << 52));
    let shift = exponent - 1075;
    let magnitude = if shift >= 0 {
        digits::shift_left(&mantissa, shift as usize)
    } else {
        digits::shift_right(&mantissa, (-shift) as usize)
    };
    Some((sign, magnitude))
}

/// `BigInt(number)`; a RangeError unless `number` is a finite integer
pub fn number_to_bigint(ctx: &mut Context, number: f64) -> JsResult<Handle<BigInt>> {
    match integral_digits(number) {
        Some((sign, magnitude)) => Ok(ctx.factory().new_bigint(sign, magnitude)),
        None => Err(ctx.throw(JsError::Range(NOT_AN_INTEGER))),
    }
}

fn pow2(exp: usize) -> f64 {
    if exp > 1023 {
        f64::INFINITY
    } else {
        f64::from_bits((exp as u64 + 1023) << 52)
    }
}

/// Nearest double, ties to even; infinite past `f64::MAX`
pub fn bigint_to_number(x: &BigInt) -> f64 {
    let magnitude = x.digits();
    let bits = digits::bit_length(magnitude);
    let value = if bits <= 64 {
        low64(magnitude) as f64
    } else {
        // Keep the top 64 bits plus a sticky bit for the rest; the u64 to
        // f64 conversion then rounds exactly once.
        let shift = bits - 64;
        let top = low64(&digits::shift_right(magnitude, shift));
        let sticky = digits::judge_round_down(magnitude, shift) as u64;
        (top | sticky) as f64 * pow2(shift)
    };
    if x.sign() { -value } else { value }
}

/// Mathematical comparison with a double; `None` when `number` is NaN
pub fn compare_with_number(x: &BigInt, number: f64) -> Option<Ordering> {
    if number.is_nan() {
        return None;
    }
    if number == f64::INFINITY {
        return Some(Ordering::Less);
    }
    if number == f64::NEG_INFINITY {
        return Some(Ordering::Greater);
    }
    let truncated = number.trunc();
    let (sign, magnitude) = integral_digits(truncated)?;
    let ordering = x.compare(&BigInt::from_digits(sign, magnitude));
    if ordering != Ordering::Equal || truncated == number {
        return Some(ordering);
    }
    Some(if number > truncated {
        Ordering::Less
    } else {
        Ordering::Greater
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(text: &str) -> BigInt {
        let (sign, magnitude) = parse_magnitude(text, 10).unwrap();
        BigInt::from_digits(sign, magnitude)
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in ["", "-", " 1", "1 ", "12a", "+1", "1_000", "0x10", "--1"] {
            assert!(parse_magnitude(text, 10).is_none(), "{:?}", text);
        }
        assert!(parse_magnitude("12", 1).is_none());
        assert!(parse_magnitude("12", 37).is_none());
        assert!(parse_magnitude("2", 2).is_none());
    }

    #[test]
    fn test_radix_round_trip() {
        let x = big("-123456789012345678901234567890");
        for radix in [2, 8, 10, 16, 36] {
            let text = to_string(&x, radix);
            let (sign, magnitude) = parse_magnitude(&text, radix).unwrap();
            assert_eq!(BigInt::from_digits(sign, magnitude), x, "radix {}", radix);
        }
        assert_eq!(to_string(&x, 10), "-123456789012345678901234567890");
        assert_eq!(to_string(&big("255"), 16), "ff");
        assert_eq!(to_string(&big("4294967296"), 16), "100000000");
        assert_eq!(to_string(&big("-0"), 10), "0");
        assert_eq!(to_string(&big("000"), 2), "0");
    }

    #[test]
    fn test_parse_size_limit() {
        let huge = "f".repeat(BigInt::MAX_BITS / 4 + 8);
        assert!(parse_magnitude(&huge, 16).is_none());
    }

    #[test]
    fn test_fixed_width() {
        assert_eq!(to_int64(&big("-9223372036854775808")), (i64::MIN, true));
        assert_eq!(to_int64(&big("9223372036854775808")), (i64::MIN, false));
        assert_eq!(to_int64(&big("18446744073709551615")), (-1, false));
        assert_eq!(to_int64(&big("0")), (0, true));
        assert_eq!(to_uint64(&big("18446744073709551615")), (u64::MAX, true));
        assert_eq!(to_uint64(&big("-1")), (u64::MAX, false));
        assert_eq!(to_uint64(&big("18446744073709551616")), (0, false));
    }

    #[test]
    fn test_words() {
        let x = BigInt::from_digits(true, vec![1, 2, 3]);
        assert_eq!(to_words(&x), (true, vec![(2 << 32) | 1, 3]));
        let mut out = [0u64; 1];
        assert_eq!(
            to_words_into(&x, &mut out),
            Err(ConversionError::BufferTooSmall { needed: 2, available: 1 })
        );
        let mut out = [0u64; 3];
        assert_eq!(to_words_into(&x, &mut out), Ok((true, 2)));
        assert_eq!(out[..2], [(2 << 32) | 1, 3]);
        assert_eq!(to_words(&BigInt::zero()), (false, vec![]));
    }

    #[test]
    fn test_to_number_rounding() {
        assert_eq!(bigint_to_number(&big("9007199254740993")), 9007199254740992.0);
        assert_eq!(bigint_to_number(&big("9007199254740995")), 9007199254740996.0);
        assert_eq!(bigint_to_number(&big("-12345")), -12345.0);
        // 2^64 + 2^11 + 1 sits above the halfway point
        assert_eq!(
            bigint_to_number(&big("18446744073709553665")),
            18446744073709555712.0
        );
        let huge = BigInt::from_digits(false, digits::power_of_two(1100));
        assert_eq!(bigint_to_number(&huge), f64::INFINITY);
    }

    #[test]
    fn test_integral_digits() {
        assert_eq!(integral_digits(0.5), None);
        assert_eq!(integral_digits(f64::NAN), None);
        assert_eq!(integral_digits(-0.0), Some((false, vec![])));
        assert_eq!(integral_digits(-3.0), Some((true, vec![3])));
        assert_eq!(integral_digits(2f64.powi(64)), Some((false, vec![0, 0, 1])));
    }

    #[test]
    fn test_compare_with_number() {
        let ten = big("10");
        assert_eq!(compare_with_number(&ten, 10.0), Some(Ordering::Equal));
        assert_eq!(compare_with_number(&ten, 10.5), Some(Ordering::Less));
        assert_eq!(compare_with_number(&ten, 9.5), Some(Ordering::Greater));
        assert_eq!(compare_with_number(&big("-10"), -10.5), Some(Ordering::Greater));
        assert_eq!(compare_with_number(&ten, f64::NAN), None);
        assert_eq!(compare_with_number(&ten, f64::INFINITY), Some(Ordering::Less));
    }
}
