use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;

/// A Schnorr signature `(r, s)`.
///
/// Signatures produced by a [`Signer`](crate::Signer) have both components in
/// `(0, q)`. Arbitrary values can be assembled with [`Signature::new`]; a
/// malformed signature is ordinary data and simply fails verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    /// Creates a signature from its components.
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    /// Returns the commitment component `r = (g^k mod p) mod q`.
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    /// Returns the response component `s = (k - x*e) mod q`.
    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Returns `true` if both components lie in the open interval `(0, q)`.
    pub fn is_well_formed(&self, q: &BigUint) -> bool {
        in_open_range(&self.r, q) && in_open_range(&self.s, q)
    }
}

fn in_open_range(value: &BigUint, q: &BigUint) -> bool {
    !value.is_zero() && value < q
}

/// Lowercase hex `r:s`.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}:{:x}", self.r, self.s)
    }
}
