//! ECDSA repeated-nonce private key recovery
//!
//! When two ECDSA signatures are produced with the same random nonce `k`,
//! their shared `r` component exposes a linear relation that isolates the
//! private key. This library implements the recovery arithmetic over an
//! arbitrary prime group order, detection of reuse candidates in signature
//! sets, and a secp256k1 harness for demonstrating the attack.

pub mod attack;
pub mod forge;
pub mod math;
pub mod provider;
pub mod recover;
pub mod signature;

pub use attack::Attack;
pub use recover::{recover_nonce, recover_private_key, RecoverError};
pub use signature::{Signature, SignatureInput};
