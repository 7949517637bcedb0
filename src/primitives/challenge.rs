//! Challenge derivation from the message digest.

use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// Hash function used to derive the challenge.
pub type ChallengeHash = Sha256;

/// Width of the challenge digest in bits.
pub const CHALLENGE_BITS: u64 = 256;

/// Digests `message` and interprets the digest as a big-endian unsigned integer.
///
/// The challenge depends on the message alone. It is not reduced modulo `q` and
/// does not include the commitment `r`.
pub fn hash_to_integer(message: &[u8]) -> BigUint {
    let digest = ChallengeHash::digest(message);
    BigUint::from_bytes_be(&digest)
}
