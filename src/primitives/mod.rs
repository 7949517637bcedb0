//! Number-theoretic and cryptographic building blocks.
//!
//! - **rng**: the secure randomness source
//! - **field**: modular helpers and uniform sampling over `BigUint`
//! - **primality**: Miller-Rabin probable-prime testing
//! - **challenge**: hashing a message to the challenge integer

/// Challenge derivation from the message digest.
pub mod challenge;
/// Modular arithmetic and sampling.
pub mod field;
/// Probabilistic primality testing.
pub mod primality;
/// Cryptographically secure random number generation.
pub mod rng;

pub use challenge::{hash_to_integer, ChallengeHash, CHALLENGE_BITS};
pub use primality::{is_probable_prime, DEFAULT_PRIMALITY_ROUNDS};
pub use rng::SecureRng;
