//! Well-known safe-prime MODP groups.
//!
//! Both moduli are safe primes `p = 2q + 1` with `p = 7 (mod 8)`, so the
//! published generator 2 is a quadratic residue and generates the order-`q`
//! subgroup.

use num_bigint::BigUint;

use super::Group;

/// RFC 2409 section 6.2, Oakley group 2.
const OAKLEY_1024_P: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1",
    "29024E088A67CC74020BBEA63B139B22514A08798E3404DD",
    "EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245",
    "E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE65381",
    "FFFFFFFFFFFFFFFF",
);

/// RFC 3526 section 3, 2048-bit MODP group 14.
const MODP_2048_P: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1",
    "29024E088A67CC74020BBEA63B139B22514A08798E3404DD",
    "EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245",
    "E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D",
    "C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F",
    "83655D23DCA3AD961C62F356208552BB9ED529077096966D",
    "670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9",
    "DE2BCBF6955817183995497CEA956AE515D2261898FA0510",
    "15728E5A8AACAA68FFFFFFFFFFFFFFFF",
);

/// Published generator shared by both groups.
const GENERATOR: u32 = 2;

/// Standardized groups that skip the safe-prime search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WellKnownGroup {
    /// 1024-bit Oakley group 2 (RFC 2409).
    Oakley1024,
    /// 2048-bit MODP group 14 (RFC 3526).
    Modp2048,
}

impl WellKnownGroup {
    /// Returns the group name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Oakley1024 => "RFC2409-Oakley-1024",
            Self::Modp2048 => "RFC3526-MODP-2048",
        }
    }

    /// Builds the group value.
    pub fn group(&self) -> Group {
        let hex = match self {
            Self::Oakley1024 => OAKLEY_1024_P,
            Self::Modp2048 => MODP_2048_P,
        };
        let p = BigUint::parse_bytes(hex.as_bytes(), 16)
            .unwrap_or_else(|| unreachable!("published moduli are valid hex"));
        let q = &p >> 1u32;

        Group::from_trusted_parts(p, q, BigUint::from(GENERATOR))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::primitives::DEFAULT_PRIMALITY_ROUNDS;

    #[test]
    fn oakley_1024_is_valid() {
        let group = WellKnownGroup::Oakley1024.group();
        assert_eq!(group.bits(), 1024);
        assert_eq!(group.subgroup_bits(), 1023);
        group
            .validate_with(DEFAULT_PRIMALITY_ROUNDS, &mut StdRng::seed_from_u64(1))
            .unwrap();
    }

    #[test]
    fn modp_2048_is_valid() {
        let group = WellKnownGroup::Modp2048.group();
        assert_eq!(group.bits(), 2048);
        group
            .validate_with(DEFAULT_PRIMALITY_ROUNDS, &mut StdRng::seed_from_u64(2))
            .unwrap();
    }

    #[test]
    fn names_are_distinct() {
        assert_ne!(
            WellKnownGroup::Oakley1024.name(),
            WellKnownGroup::Modp2048.name()
        );
    }
}
