//! The Schnorr group value shared by key generation, signing and verification.

use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};

use crate::primitives::{is_probable_prime, SecureRng, CHALLENGE_BITS, DEFAULT_PRIMALITY_ROUNDS};
use crate::{Error, Result};

/// Minimum bit length of the subgroup order `q` accepted by signing and verification.
///
/// Matches the width of the challenge digest.
pub const MIN_SUBGROUP_BITS: u64 = CHALLENGE_BITS;

/// A Schnorr group: the order-`q` subgroup of `(Z/pZ)*` generated by `g`.
///
/// # Invariants
///
/// - `p` and `q` are probable primes with `p = 2q + 1`
/// - `1 < g < p - 1`
/// - `g^q mod p = 1` and `g != 1`, so `g` has order exactly `q`
///
/// A `Group` is immutable once constructed. Obtain one from
/// [`GroupGenerator`](crate::GroupGenerator), from a [`WellKnownGroup`](crate::WellKnownGroup),
/// or from validated parts via [`Group::new`].
#[derive(Clone, PartialEq, Eq)]
pub struct Group {
    p: BigUint,
    q: BigUint,
    g: BigUint,
}

impl Group {
    /// Creates a group from its parts, checking every invariant.
    ///
    /// Primality is tested with [`DEFAULT_PRIMALITY_ROUNDS`] Miller-Rabin rounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if any invariant does not hold.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use num_bigint::BigUint;
    /// use schnorr_modp::Group;
    ///
    /// let group = Group::new(23u32.into(), 11u32.into(), 4u32.into()).unwrap();
    /// assert_eq!(group.q(), &BigUint::from(11u32));
    /// ```
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self> {
        let group = Self { p, q, g };
        group.validate_with(DEFAULT_PRIMALITY_ROUNDS, &mut SecureRng::new())?;
        Ok(group)
    }

    /// Assembles a group whose invariants the caller has already established.
    pub(crate) fn from_trusted_parts(p: BigUint, q: BigUint, g: BigUint) -> Self {
        Self { p, q, g }
    }

    /// Checks every group invariant.
    ///
    /// Structural checks run first; the two primality tests run last since they
    /// dominate the cost.
    pub fn validate_with<R: RngCore + CryptoRng + ?Sized>(
        &self,
        rounds: u32,
        rng: &mut R,
    ) -> Result<()> {
        let one = BigUint::one();

        if self.q.is_zero() || self.p != (&self.q << 1u32) + &one {
            return Err(Error::InvalidParams("p must equal 2q + 1".to_string()));
        }

        if self.g <= one || self.g >= &self.p - &one {
            return Err(Error::InvalidParams(
                "generator must satisfy 1 < g < p - 1".to_string(),
            ));
        }

        if !self.g.modpow(&self.q, &self.p).is_one() {
            return Err(Error::InvalidParams(
                "generator does not lie in the order-q subgroup".to_string(),
            ));
        }

        if !is_probable_prime(&self.q, rounds, rng) {
            return Err(Error::InvalidParams(
                "subgroup order q is not prime".to_string(),
            ));
        }

        if !is_probable_prime(&self.p, rounds, rng) {
            return Err(Error::InvalidParams("modulus p is not prime".to_string()));
        }

        Ok(())
    }

    /// Returns the prime modulus `p`.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Returns the prime subgroup order `q`.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Returns the subgroup generator `g`.
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Bit length of the modulus `p`.
    pub fn bits(&self) -> u64 {
        self.p.bits()
    }

    /// Bit length of the subgroup order `q`.
    pub fn subgroup_bits(&self) -> u64 {
        self.q.bits()
    }

    /// Returns `true` if `element` is a member of the order-`q` subgroup.
    pub fn contains(&self, element: &BigUint) -> bool {
        !element.is_zero() && element < &self.p && element.modpow(&self.q, &self.p).is_one()
    }

    /// Fails unless `q` is large enough for signing and verification.
    pub(crate) fn ensure_secure(&self) -> Result<()> {
        let bits = self.subgroup_bits();
        if bits < MIN_SUBGROUP_BITS {
            return Err(Error::InsufficientSecurity {
                bits,
                required: MIN_SUBGROUP_BITS,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("bits", &self.bits())
            .field("p", &format_args!("{:x}", self.p))
            .field("q", &format_args!("{:x}", self.q))
            .field("g", &format_args!("{:x}", self.g))
            .finish()
    }
}
