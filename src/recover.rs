//! Private key recovery from a pair of signatures sharing a nonce
//!
//! With two signatures `(r, s1)` over digest `h1` and `(r, s2)` over digest
//! `h2`, both produced with nonce `k` under key `d`:
//!
//! ```text
//! s1 = k⁻¹ (h1 + r·d)    s2 = k⁻¹ (h2 + r·d)    (mod n)
//! ```
//!
//! Eliminating `k` gives `d = (s2·h1 - s1·h2) / (r·(s1 - s2)) mod n`.

use crate::math::{mod_inverse, mod_reduce};
use num_bigint::{BigInt, BigUint};
use thiserror::Error;

/// Failure modes of the recovery operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecoverError {
    /// The `r` components differ, so the two signatures cannot share a nonce.
    #[error("no nonce reuse detected: signature r components differ")]
    NonceMismatch,
    /// The value that must be inverted is 0 mod n (`s1 == s2` or `r == 0`).
    #[error("non-invertible input: r*(s1 - s2) is 0 mod n")]
    NonInvertible,
}

/// Recovers the private key from two signatures produced with the same nonce.
///
/// `h1` and `h2` are the digests of the two messages as integers (values
/// larger than `order` are reduced by the final modulo, matching how ECDSA
/// treats oversized digests). The `r` components must be equal, which is the
/// observable consequence of nonce reuse; when they are not, the formula is
/// never attempted.
pub fn recover_private_key(
    h1: &BigUint,
    h2: &BigUint,
    s1: &BigUint,
    s2: &BigUint,
    r1: &BigUint,
    r2: &BigUint,
    order: &BigUint,
) -> Result<BigUint, RecoverError> {
    if r1 != r2 {
        return Err(RecoverError::NonceMismatch);
    }

    let h1 = BigInt::from(h1.clone());
    let h2 = BigInt::from(h2.clone());
    let s1 = BigInt::from(s1.clone());
    let s2 = BigInt::from(s2.clone());
    let r = BigInt::from(r1.clone());

    let inv = mod_inverse(&(&r * (&s1 - &s2)), order).ok_or(RecoverError::NonInvertible)?;

    Ok(mod_reduce(&((&s2 * &h1 - &s1 * &h2) * BigInt::from(inv)), order))
}

/// Recovers the shared nonce from the same signature pair.
///
/// `k = (h1 - h2) / (s1 - s2) mod n`. Callers are expected to have already
/// matched the `r` components.
pub fn recover_nonce(
    h1: &BigUint,
    h2: &BigUint,
    s1: &BigUint,
    s2: &BigUint,
    order: &BigUint,
) -> Result<BigUint, RecoverError> {
    let dh = BigInt::from(h1.clone()) - BigInt::from(h2.clone());
    let ds = BigInt::from(s1.clone()) - BigInt::from(s2.clone());

    let inv = mod_inverse(&ds, order).ok_or(RecoverError::NonInvertible)?;

    Ok(mod_reduce(&(dh * BigInt::from(inv)), order))
}
