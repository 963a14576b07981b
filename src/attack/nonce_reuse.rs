//! Nonce reuse attack implementation

use super::*;
use crate::math::secp256k1_order;
use crate::recover::{recover_nonce, recover_private_key};
use crate::signature::group_by_r_and_pubkey;

pub struct NonceReuseAttack {
    order: BigUint,
}

impl NonceReuseAttack {
    pub fn new(order: BigUint) -> Self {
        Self { order }
    }

    pub fn secp256k1() -> Self {
        Self::new(secp256k1_order())
    }
}

impl Attack for NonceReuseAttack {
    fn name(&self) -> &'static str {
        "nonce-reuse"
    }

    fn min_signatures(&self) -> usize {
        2
    }

    fn detect(&self, signatures: &[Signature]) -> Vec<Vulnerability> {
        group_by_r_and_pubkey(signatures)
            .into_iter()
            .filter(|g| g.signatures.len() >= 2)
            .map(|group| Vulnerability {
                attack_type: self.name().to_string(),
                group,
            })
            .collect()
    }

    fn recover(&self, vuln: &Vulnerability) -> Option<RecoveredKey> {
        let sigs = &vuln.group.signatures;
        if sigs.len() < 2 {
            return None;
        }

        for i in 0..sigs.len() {
            for j in (i + 1)..sigs.len() {
                if let Some(key) =
                    try_recover_pair(&sigs[i], &sigs[j], &vuln.group.pubkey, &self.order)
                {
                    return Some(key);
                }
            }
        }
        None
    }
}

fn try_recover_pair(
    sig1: &Signature,
    sig2: &Signature,
    pubkey: &Option<String>,
    order: &BigUint,
) -> Option<RecoveredKey> {
    let private_key = recover_private_key(
        &sig1.z, &sig2.z, &sig1.s, &sig2.s, &sig1.r, &sig2.r, order,
    )
    .ok()?;
    let nonce = recover_nonce(&sig1.z, &sig2.z, &sig1.s, &sig2.s, order).ok()?;

    Some(RecoveredKey {
        private_key,
        nonce,
        pubkey: pubkey.clone(),
    })
}
