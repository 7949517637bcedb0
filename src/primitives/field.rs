//! Modular arithmetic and uniform sampling over `BigUint`.

use crypto_bigint::modular::{MontyForm, MontyParams};
use crypto_bigint::{Limb, Odd, Uint, U1024, U2048, U256, U3072, U4096, U512, U8192};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use tracing::trace;
use zeroize::{Zeroize, Zeroizing};

use crate::{Error, Result};

/// Largest modulus handled by the constant-time exponentiation path.
pub const CT_MODULUS_BITS: u64 = 8192;

/// Computes `(a - b) mod m` for unsigned operands.
///
/// `m` must be non-zero. The reduced copies of `a` and `b` are wiped.
pub fn mod_sub(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    let mut a = a % m;
    let mut b = b % m;
    let out = if a >= b { &a - &b } else { m - (&b - &a) };
    wipe(&mut a);
    wipe(&mut b);
    out
}

/// Computes `base^exp mod modulus` using Montgomery form.
///
/// For moduli up to [`CT_MODULUS_BITS`] bits the exponentiation runs in
/// constant time with respect to `exp`, so secret exponents may be passed.
/// Larger moduli fall back to the variable-time `BigUint::modpow`.
///
/// The modulus is treated as public: parameter setup uses `new_vartime`.
pub fn ct_mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(Error::InvalidParams("modulus cannot be zero".to_string()));
    }
    if modulus.is_even() {
        return Err(Error::InvalidParams(
            "modulus must be odd for Montgomery form".to_string(),
        ));
    }

    let base = base % modulus;
    match modulus.bits().max(exp.bits()) {
        0..=256 => monty_pow::<{ U256::LIMBS }>(&base, exp, modulus),
        257..=512 => monty_pow::<{ U512::LIMBS }>(&base, exp, modulus),
        513..=1024 => monty_pow::<{ U1024::LIMBS }>(&base, exp, modulus),
        1025..=2048 => monty_pow::<{ U2048::LIMBS }>(&base, exp, modulus),
        2049..=3072 => monty_pow::<{ U3072::LIMBS }>(&base, exp, modulus),
        3073..=4096 => monty_pow::<{ U4096::LIMBS }>(&base, exp, modulus),
        4097..=CT_MODULUS_BITS => monty_pow::<{ U8192::LIMBS }>(&base, exp, modulus),
        bits => {
            trace!(bits, "modulus exceeds constant-time width");
            Ok(base.modpow(exp, modulus))
        }
    }
}

fn monty_pow<const LIMBS: usize>(
    base: &BigUint,
    exp: &BigUint,
    modulus: &BigUint,
) -> Result<BigUint> {
    let odd_modulus: Option<Odd<Uint<LIMBS>>> = Odd::new(to_uint::<LIMBS>(modulus)).into();
    let odd_modulus = odd_modulus.ok_or_else(|| {
        Error::InvalidParams("modulus must be odd for Montgomery form".to_string())
    })?;

    let params = MontyParams::new_vartime(odd_modulus);
    let base_monty = MontyForm::new(&to_uint::<LIMBS>(base), params);
    let mut exp = to_uint::<LIMBS>(exp);
    let result = base_monty.pow(&exp).retrieve();
    exp.zeroize();

    Ok(from_uint(&result))
}

/// Left-pads the big-endian encoding of `value` to the width of `Uint<LIMBS>`.
///
/// `value` must fit in `LIMBS` limbs.
fn to_uint<const LIMBS: usize>(value: &BigUint) -> Uint<LIMBS> {
    let width = LIMBS * Limb::BYTES;
    let bytes = Zeroizing::new(value.to_bytes_be());
    let mut buf = Zeroizing::new(vec![0u8; width]);
    buf[width - bytes.len()..].copy_from_slice(&bytes);
    Uint::from_be_slice(&buf)
}

fn from_uint<const LIMBS: usize>(value: &Uint<LIMBS>) -> BigUint {
    let mut bytes = Vec::with_capacity(LIMBS * Limb::BYTES);
    for word in value.as_words() {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    BigUint::from_bytes_le(&bytes)
}

/// Samples a uniform integer in `[0, 2^bits)`.
///
/// The random bytes pass through a zeroizing buffer, so callers may use this
/// for private scalars and nonces.
pub fn sample_bits<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, bits: u64) -> BigUint {
    if bits == 0 {
        return BigUint::zero();
    }

    let len = bits.div_ceil(8) as usize;
    let mut buf = Zeroizing::new(vec![0u8; len]);
    rng.fill_bytes(&mut buf);

    let excess = (len as u64) * 8 - bits;
    buf[0] &= 0xff >> excess;

    BigUint::from_bytes_be(&buf)
}

/// Rejection-samples a uniform value `v` with `lower < v < upper`.
///
/// Each attempt draws `upper.bits()` random bits; rejected draws are wiped.
/// Fails with [`Error::GenerationFailure`] once `max_attempts` draws were
/// rejected.
pub fn sample_open_range<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    lower: &BigUint,
    upper: &BigUint,
    max_attempts: u64,
    what: &'static str,
) -> Result<BigUint> {
    let bits = upper.bits();

    for _ in 0..max_attempts {
        let mut candidate = sample_bits(rng, bits);
        if &candidate > lower && &candidate < upper {
            return Ok(candidate);
        }
        wipe(&mut candidate);
    }

    Err(Error::GenerationFailure {
        what,
        attempts: max_attempts,
    })
}

/// Overwrites the digits of a secret integer with zeros and leaves it zero.
pub(crate) fn wipe(value: &mut BigUint) {
    let words = value.bits().div_ceil(32) as usize;
    value.assign_from_slice(&vec![0u32; words]);
}

/// Compares two integers in constant time over equal-width big-endian encodings.
pub fn ct_equal(a: &BigUint, b: &BigUint) -> bool {
    let a = a.to_bytes_be();
    let b = b.to_bytes_be();
    let width = a.len().max(b.len());

    let a = left_pad(&a, width);
    let b = left_pad(&b, width);

    a.as_slice().ct_eq(b.as_slice()).into()
}

fn left_pad(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(bytes);
    out
}

#[cfg(test)]
mod tests {
    use num_traits::One;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn mod_sub_wraps_below_zero() {
        let m = BigUint::from(11u32);
        assert_eq!(
            mod_sub(&BigUint::from(7u32), &BigUint::from(24u32), &m),
            BigUint::from(5u32)
        );
        assert_eq!(
            mod_sub(&BigUint::from(9u32), &BigUint::from(4u32), &m),
            BigUint::from(5u32)
        );
        assert_eq!(
            mod_sub(&BigUint::from(3u32), &BigUint::from(14u32), &m),
            BigUint::zero()
        );
    }

    #[test]
    fn ct_mod_pow_matches_modpow() {
        let mut rng = StdRng::seed_from_u64(3);
        let oakley = crate::WellKnownGroup::Oakley1024.group();
        let modp = crate::WellKnownGroup::Modp2048.group();
        let small = BigUint::from(1_000_000_007u64);

        for modulus in [&small, oakley.p(), modp.p()] {
            for _ in 0..4 {
                let base = sample_bits(&mut rng, modulus.bits() + 8);
                let exp = sample_bits(&mut rng, modulus.bits() - 1);
                assert_eq!(
                    ct_mod_pow(&base, &exp, modulus).unwrap(),
                    base.modpow(&exp, modulus)
                );
            }
        }
    }

    #[test]
    fn ct_mod_pow_edge_exponents() {
        let p = BigUint::from(23u32);
        let g = BigUint::from(4u32);
        assert_eq!(ct_mod_pow(&g, &BigUint::zero(), &p).unwrap(), BigUint::one());
        assert_eq!(ct_mod_pow(&g, &BigUint::one(), &p).unwrap(), g);
        assert_eq!(ct_mod_pow(&g, &BigUint::from(11u32), &p).unwrap(), BigUint::one());
        assert_eq!(
            ct_mod_pow(&BigUint::zero(), &BigUint::from(5u32), &p).unwrap(),
            BigUint::zero()
        );
    }

    #[test]
    fn ct_mod_pow_wide_exponent_and_oversized_modulus() {
        let p = BigUint::from(23u32);
        let exp = (BigUint::one() << 300u32) + BigUint::from(3u32);
        assert_eq!(
            ct_mod_pow(&BigUint::from(5u32), &exp, &p).unwrap(),
            BigUint::from(5u32).modpow(&exp, &p)
        );

        let huge = (BigUint::one() << 9000u32) + BigUint::one();
        let base = BigUint::from(3u32);
        let exp = BigUint::from(65_537u32);
        assert_eq!(
            ct_mod_pow(&base, &exp, &huge).unwrap(),
            base.modpow(&exp, &huge)
        );
    }

    #[test]
    fn ct_mod_pow_rejects_even_or_zero_modulus() {
        let two = BigUint::from(2u32);
        for modulus in [BigUint::zero(), BigUint::from(24u32)] {
            assert!(matches!(
                ct_mod_pow(&two, &two, &modulus),
                Err(Error::InvalidParams(_))
            ));
        }
    }

    #[test]
    fn sample_bits_respects_width() {
        let mut rng = StdRng::seed_from_u64(7);
        for bits in [1u64, 7, 8, 9, 31, 64, 257] {
            for _ in 0..50 {
                assert!(sample_bits(&mut rng, bits).bits() <= bits);
            }
        }
        assert!(sample_bits(&mut rng, 0).is_zero());
    }

    #[test]
    fn sample_open_range_stays_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let lower = BigUint::one();
        let upper = BigUint::from(11u32);

        for _ in 0..200 {
            let v = sample_open_range(&mut rng, &lower, &upper, 128, "value").unwrap();
            assert!(v > lower && v < upper);
        }
    }

    #[test]
    fn sample_open_range_reports_exhaustion() {
        let mut rng = StdRng::seed_from_u64(1);
        let lower = BigUint::one();
        let upper = BigUint::from(2u32);

        let err = sample_open_range(&mut rng, &lower, &upper, 16, "value").unwrap_err();
        assert!(matches!(
            err,
            Error::GenerationFailure {
                what: "value",
                attempts: 16
            }
        ));
    }

    #[test]
    fn wipe_leaves_zero() {
        let mut secret = BigUint::parse_bytes(b"deadbeefcafebabe0123456789abcdef", 16).unwrap();
        wipe(&mut secret);
        assert!(secret.is_zero());
    }

    #[test]
    fn ct_equal_ignores_leading_zero_width() {
        let a = BigUint::from(0x1234u32);
        assert!(ct_equal(&a, &BigUint::from(0x1234u64)));
        assert!(!ct_equal(&a, &BigUint::from(0x12345u32)));
        assert!(ct_equal(&BigUint::zero(), &BigUint::zero()));
    }
}
