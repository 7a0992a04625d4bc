//! Magnitude arithmetic on little-endian `u32` digit slices
//!
//! Inputs may carry leading zero digits; every result is trimmed.

use std::cmp::Ordering;

pub(crate) const DIGIT_BITS: usize = 32;

const BASE: u64 = 1 << DIGIT_BITS;

pub(crate) fn trim(mut digits: Vec<u32>) -> Vec<u32> {
    while digits.last() == Some(&0) {
        digits.pop();
    }
    digits
}

#[inline]
fn significant(a: &[u32]) -> &[u32] {
    let len = a.iter().rposition(|&d| d != 0).map_or(0, |i| i + 1);
    &a[..len]
}

#[inline]
fn digit(a: &[u32], index: usize) -> u32 {
    a.get(index).copied().unwrap_or(0)
}

pub(crate) fn bit_length(a: &[u32]) -> usize {
    let a = significant(a);
    match a.last() {
        Some(&top) => a.len() * DIGIT_BITS - top.leading_zeros() as usize,
        None => 0,
    }
}

pub(crate) fn compare(a: &[u32], b: &[u32]) -> Ordering {
    let (a, b) = (significant(a), significant(b));
    a.len()
        .cmp(&b.len())
        .then_with(|| a.iter().rev().cmp(b.iter().rev()))
}

pub(crate) fn add(a: &[u32], b: &[u32]) -> Vec<u32> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry = 0u64;
    for (i, &d) in long.iter().enumerate() {
        let sum = d as u64 + digit(short, i) as u64 + carry;
        out.push(sum as u32);
        carry = sum >> DIGIT_BITS;
    }
    if carry != 0 {
        out.push(carry as u32);
    }
    trim(out)
}

/// `a - b`; `a` must not be smaller than `b`
pub(crate) fn sub(a: &[u32], b: &[u32]) -> Vec<u32> {
    debug_assert!(compare(a, b) != Ordering::Less, "magnitude underflow");
    let mut out = Vec::with_capacity(a.len());
    let mut borrow = false;
    for (i, &d) in a.iter().enumerate() {
        let (v, b1) = d.overflowing_sub(digit(b, i));
        let (v, b2) = v.overflowing_sub(borrow as u32);
        out.push(v);
        borrow = b1 || b2;
    }
    trim(out)
}

#[inline]
pub(crate) fn add_one(a: &[u32]) -> Vec<u32> {
    add(a, &[1])
}

#[inline]
pub(crate) fn sub_one(a: &[u32]) -> Vec<u32> {
    sub(a, &[1])
}

/// Schoolbook product
pub(crate) fn multiply(a: &[u32], b: &[u32]) -> Vec<u32> {
    let (a, b) = (significant(a), significant(b));
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0u32; a.len() + b.len()];
    for (i, &x) in a.iter().enumerate() {
        let mut carry = 0u64;
        for (j, &y) in b.iter().enumerate() {
            let t = x as u64 * y as u64 + out[i + j] as u64 + carry;
            out[i + j] = t as u32;
            carry = t >> DIGIT_BITS;
        }
        out[i + b.len()] = carry as u32;
    }
    trim(out)
}

/// `digits = digits * mul + add`, in place
pub(crate) fn mul_add_small(digits: &mut Vec<u32>, mul: u32, add: u32) {
    let mut carry = add as u64;
    for d in digits.iter_mut() {
        let t = *d as u64 * mul as u64 + carry;
        *d = t as u32;
        carry = t >> DIGIT_BITS;
    }
    if carry != 0 {
        digits.push(carry as u32);
    }
}

pub(crate) fn div_rem_digit(a: &[u32], divisor: u32) -> (Vec<u32>, u32) {
    debug_assert!(divisor != 0);
    let mut quotient = vec![0u32; a.len()];
    let mut rem = 0u64;
    for i in (0..a.len()).rev() {
        let current = (rem << DIGIT_BITS) | a[i] as u64;
        quotient[i] = (current / divisor as u64) as u32;
        rem = current % divisor as u64;
    }
    (trim(quotient), rem as u32)
}

/// Quotient and remainder of `u / v`, truncating.
///
/// Multi-digit divisors use Knuth's Algorithm D (TAOCP vol. 2, 4.3.1).
pub(crate) fn div_rem(u: &[u32], v: &[u32]) -> (Vec<u32>, Vec<u32>) {
    let (u, v) = (significant(u), significant(v));
    assert!(!v.is_empty(), "division by a zero magnitude");
    if compare(u, v) == Ordering::Less {
        return (Vec::new(), u.to_vec());
    }
    if v.len() == 1 {
        let (q, r) = div_rem_digit(u, v[0]);
        return (q, trim(vec![r]));
    }

    let n = v.len();
    let m = u.len() - n;
    // Normalize so the divisor's top digit has its high bit set
    let shift = v[n - 1].leading_zeros();
    let v = normalize(v, shift, false);
    let mut u = normalize(u, shift, true);
    let (v_top, v_next) = (v[n - 1], v[n - 2]);

    let mut quotient = vec![0u32; m + 1];
    for j in (0..=m).rev() {
        let numerator = ((u[j + n] as u64) << DIGIT_BITS) | u[j + n - 1] as u64;
        let q = numerator / v_top as u64;
        let r = numerator % v_top as u64;
        let mut q = improve_accuracy(q, r, v_top, v_next, u[j + n - 2]);
        if special_multiply_and_sub(&mut u, &v, q, j) {
            q -= 1;
            let carry = special_add(&mut u, &v, j);
            u[j + n] = u[j + n].wrapping_add(carry);
        }
        quotient[j] = q;
    }
    u.truncate(n);
    (trim(quotient), shift_right(&u, shift as usize))
}

fn normalize(digits: &[u32], shift: u32, extend: bool) -> Vec<u32> {
    let mut out = Vec::with_capacity(digits.len() + 1);
    let mut carry = 0u32;
    for &d in digits {
        if shift == 0 {
            out.push(d);
        } else {
            out.push((d << shift) | carry);
            carry = d >> (DIGIT_BITS as u32 - shift);
        }
    }
    if extend {
        out.push(carry);
    } else {
        debug_assert_eq!(carry, 0);
    }
    out
}

/// Lowers a trial quotient digit until it exceeds the true digit by at
/// most one.
fn improve_accuracy(mut q: u64, mut r: u64, v_top: u32, v_next: u32, u_low: u32) -> u32 {
    while q >= BASE || q * v_next as u64 > ((r << DIGIT_BITS) | u_low as u64) {
        q -= 1;
        r += v_top as u64;
        if r >= BASE {
            break;
        }
    }
    q as u32
}

/// `u[pos..=pos + v.len()] -= q * v`; returns whether the result borrowed
fn special_multiply_and_sub(u: &mut [u32], v: &[u32], q: u32, pos: usize) -> bool {
    let mut carry = 0u64;
    let mut borrow = false;
    for (i, &d) in v.iter().enumerate() {
        let product = d as u64 * q as u64 + carry;
        carry = product >> DIGIT_BITS;
        let (x, b1) = u[pos + i].overflowing_sub(product as u32);
        let (x, b2) = x.overflowing_sub(borrow as u32);
        u[pos + i] = x;
        borrow = b1 || b2;
    }
    let top = pos + v.len();
    let (x, b1) = u[top].overflowing_sub(carry as u32);
    let (x, b2) = x.overflowing_sub(borrow as u32);
    u[top] = x;
    b1 || b2
}

/// `u[pos..pos + v.len()] += v`; returns the carry out
fn special_add(u: &mut [u32], v: &[u32], pos: usize) -> u32 {
    let mut carry = 0u64;
    for (i, &d) in v.iter().enumerate() {
        let sum = u[pos + i] as u64 + d as u64 + carry;
        u[pos + i] = sum as u32;
        carry = sum >> DIGIT_BITS;
    }
    carry as u32
}

pub(crate) fn shift_left(a: &[u32], bits: usize) -> Vec<u32> {
    let a = significant(a);
    if a.is_empty() {
        return Vec::new();
    }
    let (whole, part) = (bits / DIGIT_BITS, (bits % DIGIT_BITS) as u32);
    let mut out = vec![0u32; whole];
    out.reserve(a.len() + 1);
    if part == 0 {
        out.extend_from_slice(a);
    } else {
        let mut carry = 0u32;
        for &d in a {
            out.push((d << part) | carry);
            carry = d >> (DIGIT_BITS as u32 - part);
        }
        out.push(carry);
    }
    trim(out)
}

pub(crate) fn shift_right(a: &[u32], bits: usize) -> Vec<u32> {
    let (whole, part) = (bits / DIGIT_BITS, (bits % DIGIT_BITS) as u32);
    if whole >= a.len() {
        return Vec::new();
    }
    let src = &a[whole..];
    if part == 0 {
        return trim(src.to_vec());
    }
    let out = (0..src.len())
        .map(|i| (src[i] >> part) | (digit(src, i + 1) << (DIGIT_BITS as u32 - part)))
        .collect();
    trim(out)
}

/// Whether shifting `a` right by `bits` discards any set bit, i.e. whether
/// a negative value must round toward negative infinity.
pub(crate) fn judge_round_down(a: &[u32], bits: usize) -> bool {
    let (whole, part) = (bits / DIGIT_BITS, bits % DIGIT_BITS);
    if a[..whole.min(a.len())].iter().any(|&d| d != 0) {
        return true;
    }
    part != 0 && a.get(whole).is_some_and(|&d| d & ((1u32 << part) - 1) != 0)
}

/// Low `bits` bits of `a`
pub(crate) fn truncate_bits(a: &[u32], bits: usize) -> Vec<u32> {
    let (whole, part) = (bits / DIGIT_BITS, bits % DIGIT_BITS);
    let mut out: Vec<u32> = a[..whole.min(a.len())].to_vec();
    if part != 0 {
        if let Some(&d) = a.get(whole) {
            out.push(d & ((1u32 << part) - 1));
        }
    }
    trim(out)
}

/// `1 << bits`
pub(crate) fn power_of_two(bits: usize) -> Vec<u32> {
    let mut out = vec![0u32; bits / DIGIT_BITS + 1];
    out[bits / DIGIT_BITS] = 1 << (bits % DIGIT_BITS);
    out
}

pub(crate) fn and(a: &[u32], b: &[u32]) -> Vec<u32> {
    trim(a.iter().zip(b).map(|(x, y)| x & y).collect())
}

pub(crate) fn or(a: &[u32], b: &[u32]) -> Vec<u32> {
    let len = a.len().max(b.len());
    trim((0..len).map(|i| digit(a, i) | digit(b, i)).collect())
}

pub(crate) fn xor(a: &[u32], b: &[u32]) -> Vec<u32> {
    let len = a.len().max(b.len());
    trim((0..len).map(|i| digit(a, i) ^ digit(b, i)).collect())
}

/// `a & !b`
pub(crate) fn and_not(a: &[u32], b: &[u32]) -> Vec<u32> {
    trim(a.iter().enumerate().map(|(i, x)| x & !digit(b, i)).collect())
}
