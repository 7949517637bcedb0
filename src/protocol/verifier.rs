use super::{PublicKey, Signature};
use crate::primitives::field::ct_equal;
use crate::primitives::hash_to_integer;
use crate::{Group, Result};

/// Checks Schnorr signatures against one public key in one group.
///
/// Verification never fails on attacker-controlled input: malformed or forged
/// signatures yield `false`. Only a group with too short a subgroup order is
/// refused, at construction.
pub struct Verifier<'a> {
    group: &'a Group,
    key: &'a PublicKey,
}

impl<'a> Verifier<'a> {
    /// Creates a verifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientSecurity`](crate::Error::InsufficientSecurity)
    /// if `q` is too short.
    pub fn new(group: &'a Group, key: &'a PublicKey) -> Result<Self> {
        group.ensure_secure()?;
        Ok(Self { group, key })
    }

    /// Returns `true` if `signature` is valid for `message`.
    ///
    /// Rejects signatures with `r` or `s` outside `(0, q)`, then accepts iff
    /// `(g^s * y^e mod p) mod q = r` with `e = H(message)`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let e = hash_to_integer(message);
        let p = self.group.p();
        let q = self.group.q();

        if !signature.is_well_formed(q) {
            return false;
        }

        let g_s = self.group.g().modpow(signature.s(), p);
        let y_e = self.key.y().modpow(&e, p);
        let v = (g_s * y_e) % p % q;

        ct_equal(&v, signature.r())
    }
}
