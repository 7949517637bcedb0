/// Private and public keys.
pub mod keys;
/// Signature value.
pub mod signature;
/// Signature production.
pub mod signer;
/// Signature verification.
pub mod verifier;

pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use signature::Signature;
pub use signer::{Signer, SignerConfig};
pub use verifier::Verifier;
