//! Modular arithmetic over a prime group order

use anyhow::{anyhow, bail, Result};
use num_bigint::{BigInt, BigUint};
use num_traits::{Num, One, Zero};

/// secp256k1 curve order n in hexadecimal.
const SECP256K1_ORDER_HEX: &str =
    "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141";

/// Returns the secp256k1 curve order n.
pub fn secp256k1_order() -> BigUint {
    BigUint::from_str_radix(SECP256K1_ORDER_HEX, 16).unwrap()
}

pub enum ScalarKind {
    RorS,
    Z,
}

pub fn parse_uint_decimal_strict(s: &str, kind: ScalarKind, order: &BigUint) -> Result<BigUint> {
    if s.is_empty() {
        bail!("Empty decimal string");
    }
    if !s.chars().all(|c| c.is_ascii_digit()) {
        bail!("Invalid decimal string: only digits 0-9 allowed");
    }
    if s.len() > 1 && s.starts_with('0') {
        bail!("Invalid decimal string: no leading zeros allowed");
    }

    let value =
        BigUint::from_str_radix(s, 10).map_err(|e| anyhow!("Failed to parse decimal: {}", e))?;

    if &value >= order {
        bail!("Value >= group order n, ensure your data is already reduced");
    }

    match kind {
        ScalarKind::RorS => {
            if value.is_zero() {
                bail!("r and s values cannot be zero");
            }
        }
        ScalarKind::Z => {}
    }

    Ok(value)
}

/// Parses a group order from a hex string, tolerating a `0x` prefix.
pub fn parse_order_hex(s: &str) -> Result<BigUint> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid order: must be hexadecimal");
    }
    let order = BigUint::from_str_radix(digits, 16)
        .map_err(|e| anyhow!("Failed to parse order: {}", e))?;
    if order <= BigUint::one() {
        bail!("Order must be greater than 1");
    }
    Ok(order)
}

/// Reduces `x` into `[0, n-1]`, yielding a non-negative result for negative `x`.
pub fn mod_reduce(x: &BigInt, order: &BigUint) -> BigUint {
    let n = BigInt::from(order.clone());
    let r = ((x % &n) + &n) % &n;
    r.to_biguint().unwrap()
}

/// Computes the inverse of `a` modulo `order` via the extended Euclidean
/// algorithm.
///
/// Returns `None` when `a` is not invertible, i.e. when `gcd(a mod n, n) != 1`
/// (for prime `n` this means `a ≡ 0 mod n`).
pub fn mod_inverse(a: &BigInt, order: &BigUint) -> Option<BigUint> {
    let n = BigInt::from(order.clone());
    let a = ((a % &n) + &n) % &n;
    if a.is_zero() {
        return None;
    }

    // Invariant: old_s * a ≡ old_r (mod n) throughout.
    let (mut old_r, mut r) = (a, n);
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = old_r - &q * &r;
        old_r = r;
        r = next_r;
        let next_s = old_s - &q * &s;
        old_s = s;
        s = next_s;
    }

    if !old_r.is_one() {
        return None;
    }
    Some(mod_reduce(&old_s, order))
}

/// Renders a value as lowercase hex, zero-padded to the byte width of the order.
pub fn to_hex_string(x: &BigUint, order: &BigUint) -> String {
    let width = ((order.bits() + 7) / 8) as usize;
    let bytes = x.to_bytes_be();
    let mut padded = vec![0u8; width.saturating_sub(bytes.len())];
    padded.extend_from_slice(&bytes);
    hex::encode(padded)
}
