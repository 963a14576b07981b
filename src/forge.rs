//! secp256k1 signing harness with a caller-chosen nonce
//!
//! Exists to manufacture vulnerable signature pairs for demonstrations and
//! tests. Signing with a fixed nonce leaks the private key, which is the
//! point; never use this for real signatures.

use anyhow::{anyhow, bail, Result};
use k256::elliptic_curve::ff::PrimeField;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{AffinePoint, NonZeroScalar, ProjectivePoint, Scalar, U256};
use num_bigint::BigUint;
use rand_core::OsRng;
use sha2::{Digest, Sha256};

/// Generates a uniformly random secp256k1 private key in `[1, n-1]`.
pub fn random_private_key() -> BigUint {
    let d = NonZeroScalar::random(&mut OsRng);
    scalar_to_uint(d.as_ref())
}

/// SHA-256 digest of a message as an unreduced 256-bit integer.
pub fn digest_message(msg: &[u8]) -> BigUint {
    BigUint::from_bytes_be(&Sha256::digest(msg))
}

/// Signs `msg` under `private_key` using the given nonce.
///
/// Returns the `(r, s)` signature components. The digest is reduced mod n
/// before entering the signature equation `s = k⁻¹(h + r·d)`.
pub fn sign_with_nonce(private_key: &BigUint, nonce: &BigUint, msg: &[u8]) -> Result<(BigUint, BigUint)> {
    let d = uint_to_scalar(private_key).ok_or_else(|| anyhow!("private key out of range"))?;
    let k = uint_to_scalar(nonce).ok_or_else(|| anyhow!("nonce out of range"))?;
    if bool::from(d.is_zero()) {
        bail!("private key cannot be zero");
    }
    if bool::from(k.is_zero()) {
        bail!("nonce cannot be zero");
    }

    let digest = Sha256::digest(msg);
    let h = <Scalar as Reduce<U256>>::reduce_bytes(&digest);

    let kg = ProjectivePoint::GENERATOR * k;
    let kg_affine = AffinePoint::from(kg);
    let kg_point = kg_affine.to_encoded_point(false);
    let x_bytes = kg_point
        .x()
        .ok_or_else(|| anyhow!("nonce point is the identity"))?;

    // r = x coordinate of k*G, reduced mod n
    let r = <Scalar as Reduce<U256>>::reduce_bytes(x_bytes);
    if bool::from(r.is_zero()) {
        bail!("degenerate nonce: r is zero");
    }

    let k_inv = Option::<Scalar>::from(k.invert()).ok_or_else(|| anyhow!("nonce not invertible"))?;
    let s = k_inv * (h + r * d);
    if bool::from(s.is_zero()) {
        bail!("degenerate signature: s is zero");
    }

    Ok((scalar_to_uint(&r), scalar_to_uint(&s)))
}

/// Compressed SEC1 public key for a private key, as lowercase hex.
pub fn public_key_hex(private_key: &BigUint) -> Result<String> {
    let d = uint_to_scalar(private_key).ok_or_else(|| anyhow!("private key out of range"))?;
    if bool::from(d.is_zero()) {
        bail!("private key cannot be zero");
    }
    let point = AffinePoint::from(ProjectivePoint::GENERATOR * d);
    Ok(hex::encode(point.to_encoded_point(true).as_bytes()))
}

fn uint_to_scalar(x: &BigUint) -> Option<Scalar> {
    let bytes = x.to_bytes_be();
    if bytes.len() > 32 {
        return None;
    }

    let mut padded = [0u8; 32];
    let offset = 32 - bytes.len();
    padded[offset..].copy_from_slice(&bytes);

    Option::<Scalar>::from(Scalar::from_repr(padded.into()))
}

fn scalar_to_uint(scalar: &Scalar) -> BigUint {
    BigUint::from_bytes_be(&scalar.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::secp256k1_order;
    use crate::recover::{recover_nonce, recover_private_key};
    use num_traits::Num;

    fn fixed_key() -> BigUint {
        BigUint::from_str_radix(
            "91225253027397101270059260515990221874496108017261222445699397644687913215777",
            10,
        )
        .unwrap()
    }

    #[test]
    fn test_reused_nonce_shares_r() {
        let d = fixed_key();
        let k = BigUint::from(1337u32);
        let (r1, s1) = sign_with_nonce(&d, &k, b"wagmi1").unwrap();
        let (r2, s2) = sign_with_nonce(&d, &k, b"wagmi2").unwrap();
        assert_eq!(r1, r2);
        assert_ne!(s1, s2);
    }

    #[test]
    fn test_recover_key_from_forged_pair() {
        let order = secp256k1_order();
        let d = fixed_key();
        let k = BigUint::from(1337u32);

        let h1 = digest_message(b"wagmi1");
        let h2 = digest_message(b"wagmi2");
        let (r1, s1) = sign_with_nonce(&d, &k, b"wagmi1").unwrap();
        let (r2, s2) = sign_with_nonce(&d, &k, b"wagmi2").unwrap();

        let recovered = recover_private_key(&h1, &h2, &s1, &s2, &r1, &r2, &order).unwrap();
        assert_eq!(recovered, d);

        let nonce = recover_nonce(&h1, &h2, &s1, &s2, &order).unwrap();
        assert_eq!(nonce, k);
    }

    #[test]
    fn test_recover_key_random_keypair() {
        let order = secp256k1_order();
        let d = random_private_key();
        let k = BigUint::from(0xdeadbeefu32);

        let h1 = digest_message(b"first message");
        let h2 = digest_message(b"second message");
        let (r1, s1) = sign_with_nonce(&d, &k, b"first message").unwrap();
        let (r2, s2) = sign_with_nonce(&d, &k, b"second message").unwrap();

        let recovered = recover_private_key(&h1, &h2, &s1, &s2, &r1, &r2, &order).unwrap();
        assert_eq!(recovered, d);
    }

    #[test]
    fn test_distinct_nonces_do_not_share_r() {
        let d = fixed_key();
        let (r1, _) = sign_with_nonce(&d, &BigUint::from(1337u32), b"wagmi1").unwrap();
        let (r2, _) = sign_with_nonce(&d, &BigUint::from(7331u32), b"wagmi2").unwrap();
        assert_ne!(r1, r2);
    }

    #[test]
    fn test_sign_rejects_zero_nonce() {
        let d = fixed_key();
        assert!(sign_with_nonce(&d, &BigUint::from(0u32), b"msg").is_err());
    }

    #[test]
    fn test_sign_rejects_out_of_range_key() {
        let result = sign_with_nonce(&secp256k1_order(), &BigUint::from(2u32), b"msg");
        assert!(result.is_err());
    }

    #[test]
    fn test_public_key_hex_compressed() {
        let pk = public_key_hex(&fixed_key()).unwrap();
        assert_eq!(pk.len(), 66);
        assert!(pk.starts_with("02") || pk.starts_with("03"));
    }

    #[test]
    fn test_random_keys_are_distinct() {
        assert_ne!(random_private_key(), random_private_key());
    }
}
