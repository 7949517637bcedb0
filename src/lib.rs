//! Schnorr signatures over prime-order subgroups of `(Z/pZ)*`.
//!
//! The crate covers the full life of a signature:
//!
//! 1. **Group generation**: a bounded search for a safe prime `p = 2q + 1` and a
//!    generator `g` of the order-`q` subgroup, run sequentially or as a race of
//!    parallel workers ([`GroupGenerator`], [`search_parallel`]). Standardized
//!    groups are available through [`WellKnownGroup`].
//! 2. **Key generation**: a private scalar `1 < x < q` and public value
//!    `y = g^x mod p` ([`KeyPair`]).
//! 3. **Signing**: `r = (g^k mod p) mod q`, `s = (k - x*e) mod q` with a fresh
//!    nonce `k` and `e = SHA-256(message)` ([`Signer`]).
//! 4. **Verification**: `(g^s * y^e mod p) mod q = r` ([`Verifier`]).
//!
//! Signing and verification require a subgroup order of at least
//! [`MIN_SUBGROUP_BITS`] bits.
//!
//! # Example
//!
//! ```rust
//! use schnorr_modp::{generate_key_pair, sign, verify, WellKnownGroup};
//!
//! let group = WellKnownGroup::Oakley1024.group();
//! let keys = generate_key_pair(&group).unwrap();
//!
//! let signature = sign(&group, keys.private_key(), b"Hello, World!").unwrap();
//! assert!(verify(&group, keys.public_key(), b"Hello, World!", &signature).unwrap());
//! assert!(!verify(&group, keys.public_key(), b"Hello, World?", &signature).unwrap());
//! ```

/// Error types.
pub mod error;
/// Schnorr groups and their generation.
pub mod group;
/// Number-theoretic and cryptographic primitives.
pub mod primitives;
/// Keys, signing and verification.
pub mod protocol;

pub use error::Error;
pub use group::{
    search_parallel, Group, GroupGenerator, SearchConfig, SearchStrategy, WellKnownGroup,
    MIN_GROUP_BITS, MIN_SUBGROUP_BITS,
};
pub use primitives::SecureRng;
pub use protocol::{KeyPair, PrivateKey, PublicKey, Signature, Signer, SignerConfig, Verifier};

/// Result type alias for this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Generates a group with a `bit_length`-bit modulus using the default sequential search.
pub fn generate_group(bit_length: u64) -> Result<Group> {
    GroupGenerator::default().generate(bit_length)
}

/// Derives a key pair in `group` using [`SecureRng`].
pub fn generate_key_pair(group: &Group) -> Result<KeyPair> {
    KeyPair::generate(group, &mut SecureRng::new())
}

/// Signs `message` with `key` in `group` using [`SecureRng`] for the nonce.
///
/// # Errors
///
/// Returns [`Error::InsufficientSecurity`] if `q` is shorter than [`MIN_SUBGROUP_BITS`].
pub fn sign(group: &Group, key: &PrivateKey, message: &[u8]) -> Result<Signature> {
    Signer::new(group, key)?.sign(&mut SecureRng::new(), message)
}

/// Verifies `signature` over `message` for `key` in `group`.
///
/// Malformed or forged signatures yield `Ok(false)`.
///
/// # Errors
///
/// Returns [`Error::InsufficientSecurity`] if `q` is shorter than [`MIN_SUBGROUP_BITS`].
pub fn verify(group: &Group, key: &PublicKey, message: &[u8], signature: &Signature) -> Result<bool> {
    Ok(Verifier::new(group, key)?.verify(message, signature))
}
