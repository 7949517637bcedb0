//! Private and public keys and their derivation inside a group.

use std::fmt;

use num_bigint::BigUint;
use num_traits::One;
use rand_core::{CryptoRng, RngCore};

use crate::primitives::field::{ct_mod_pow, sample_open_range, wipe};
use crate::{Group, Result};

/// Draws allowed when rejection-sampling the private scalar.
const SCALAR_SAMPLE_ATTEMPTS: u64 = 128;

/// Secret signing scalar `x` with `1 < x < q`.
///
/// The scalar has no public accessor and its `Debug` output is redacted. Its
/// digits are overwritten on drop; copies made inside `num-bigint` arithmetic
/// (reallocation, temporaries) are outside that guarantee.
pub struct PrivateKey {
    x: BigUint,
}

impl PrivateKey {
    pub(crate) fn scalar(&self) -> &BigUint {
        &self.x
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        wipe(&mut self.x);
    }
}

/// Public verification value `y = g^x mod p`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    y: BigUint,
}

impl PublicKey {
    /// Wraps a public value received from elsewhere.
    ///
    /// No membership check is made; a value outside the subgroup simply fails
    /// to verify any signature.
    pub fn new(y: BigUint) -> Self {
        Self { y }
    }

    /// Returns `y`.
    pub fn y(&self) -> &BigUint {
        &self.y
    }
}

/// A private/public key pair derived inside one group.
#[derive(Debug)]
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl KeyPair {
    /// Derives a key pair in `group`.
    ///
    /// Rejection-samples `x` uniformly with `1 < x < q`, then computes
    /// `y = g^x mod p` in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GenerationFailure`](crate::Error::GenerationFailure) if no
    /// admissible scalar was drawn, which only happens for degenerate groups
    /// such as `q <= 2`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schnorr_modp::{KeyPair, SecureRng, WellKnownGroup};
    ///
    /// let group = WellKnownGroup::Oakley1024.group();
    /// let keys = KeyPair::generate(&group, &mut SecureRng::new()).unwrap();
    /// assert!(group.contains(keys.public_key().y()));
    /// ```
    pub fn generate<R: RngCore + CryptoRng + ?Sized>(group: &Group, rng: &mut R) -> Result<Self> {
        let x = sample_open_range(
            rng,
            &BigUint::one(),
            group.q(),
            SCALAR_SAMPLE_ATTEMPTS,
            "private scalar",
        )?;
        let private = PrivateKey { x };
        let y = ct_mod_pow(group.g(), &private.x, group.p())?;

        Ok(Self {
            private,
            public: PublicKey { y },
        })
    }

    /// Returns the private key, for use with a [`Signer`](crate::Signer).
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// Returns the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Splits the pair into its private and public halves.
    pub fn into_parts(self) -> (PrivateKey, PublicKey) {
        (self.private, self.public)
    }
}
