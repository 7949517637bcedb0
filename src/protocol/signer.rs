use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};

use super::{PrivateKey, Signature};
use crate::primitives::field::{ct_mod_pow, mod_sub, sample_open_range, wipe};
use crate::primitives::hash_to_integer;
use crate::{Error, Group, Result};

/// Draws allowed when rejection-sampling a single nonce.
const NONCE_SAMPLE_ATTEMPTS: u64 = 128;

/// Signing configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignerConfig {
    /// Fresh nonces tried before giving up on a degenerate `r = 0` or `s = 0`.
    pub max_nonce_attempts: u64,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            max_nonce_attempts: 128,
        }
    }
}

/// Produces Schnorr signatures with one private key in one group.
///
/// # Security
///
/// - The group's subgroup order must have at least
///   [`MIN_SUBGROUP_BITS`](crate::MIN_SUBGROUP_BITS) bits
/// - Every signature uses a fresh nonce from the supplied RNG; always pass a
///   [`SecureRng`](crate::SecureRng) or another CSPRNG
/// - `g^k mod p` is computed in constant time
/// - Nonces and the intermediate `x*e` are overwritten when dropped; copies
///   made inside `num-bigint` arithmetic are not tracked
///
/// # Examples
///
/// ```rust
/// use schnorr_modp::{KeyPair, SecureRng, Signer, Verifier, WellKnownGroup};
///
/// let group = WellKnownGroup::Oakley1024.group();
/// let mut rng = SecureRng::new();
/// let keys = KeyPair::generate(&group, &mut rng).unwrap();
///
/// let signer = Signer::new(&group, keys.private_key()).unwrap();
/// let signature = signer.sign(&mut rng, b"Hello, World!").unwrap();
///
/// let verifier = Verifier::new(&group, keys.public_key()).unwrap();
/// assert!(verifier.verify(b"Hello, World!", &signature));
/// ```
pub struct Signer<'a> {
    group: &'a Group,
    key: &'a PrivateKey,
    config: SignerConfig,
}

impl<'a> Signer<'a> {
    /// Creates a signer with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientSecurity`] if `q` is too short.
    pub fn new(group: &'a Group, key: &'a PrivateKey) -> Result<Self> {
        Self::with_config(group, key, SignerConfig::default())
    }

    /// Creates a signer with a custom configuration.
    pub fn with_config(group: &'a Group, key: &'a PrivateKey, config: SignerConfig) -> Result<Self> {
        group.ensure_secure()?;
        Ok(Self { group, key, config })
    }

    /// Signs `message`.
    ///
    /// Computes `e = H(message)`, then for a fresh nonce `1 < k < q`:
    /// `r = (g^k mod p) mod q` and `s = (k - x*e) mod q`. A nonce giving
    /// `r = 0` or `s = 0` is discarded and another is drawn.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GenerationFailure`] if every nonce attempt was degenerate.
    pub fn sign<R: RngCore + CryptoRng + ?Sized>(
        &self,
        rng: &mut R,
        message: &[u8],
    ) -> Result<Signature> {
        let e = hash_to_integer(message);
        let q = self.group.q();

        for _ in 0..self.config.max_nonce_attempts {
            let (r, nonce) = self.commit(rng)?;
            if r.is_zero() {
                continue;
            }

            let s = self.respond(&nonce, &e);
            if s.is_zero() {
                continue;
            }

            return Ok(Signature::new(r, s));
        }

        Err(Error::GenerationFailure {
            what: "nonce",
            attempts: self.config.max_nonce_attempts,
        })
    }

    /// Draws a nonce `k` and its commitment `r = (g^k mod p) mod q`.
    fn commit<R: RngCore + CryptoRng + ?Sized>(&self, rng: &mut R) -> Result<(BigUint, Nonce)> {
        let q = self.group.q();
        let nonce = Nonce {
            k: sample_open_range(rng, &BigUint::one(), q, NONCE_SAMPLE_ATTEMPTS, "nonce")?,
        };
        let r = ct_mod_pow(self.group.g(), &nonce.k, self.group.p())? % q;

        Ok((r, nonce))
    }

    /// Computes `s = (k - x*e) mod q`.
    fn respond(&self, nonce: &Nonce, e: &BigUint) -> BigUint {
        let q = self.group.q();
        let mut product = self.key.scalar() * e;
        let mut xe = &product % q;
        wipe(&mut product);
        let s = mod_sub(&nonce.k, &xe, q);
        wipe(&mut xe);
        s
    }
}

/// Per-signature secret nonce, overwritten when dropped.
struct Nonce {
    k: BigUint,
}

impl Drop for Nonce {
    fn drop(&mut self) {
        wipe(&mut self.k);
    }
}
