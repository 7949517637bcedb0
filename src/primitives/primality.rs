//! Probabilistic primality testing.
//!
//! `num-bigint` offers no primality test, so this module builds Miller-Rabin on
//! top of its `modpow` and uniform sampling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand_core::{CryptoRng, RngCore};

use super::field::sample_open_range;
use crate::{Error, Result};

/// Default number of Miller-Rabin rounds.
///
/// Each random-base round has a false-positive rate of at most 1/4, so 50 rounds
/// bound the error probability by 2^-100, including for inputs chosen to pass
/// the fixed base-2 round.
pub const DEFAULT_PRIMALITY_ROUNDS: u32 = 50;

/// Draws allowed when sampling one random witness.
const WITNESS_SAMPLE_ATTEMPTS: u64 = 128;

/// Upper bound (exclusive) of the small-prime table used for trial division.
const SMALL_PRIME_LIMIT: u32 = 2048;

/// Odd primes below [`SMALL_PRIME_LIMIT`].
pub fn small_primes() -> &'static [u32] {
    static PRIMES: OnceLock<Vec<u32>> = OnceLock::new();
    PRIMES.get_or_init(|| {
        let limit = SMALL_PRIME_LIMIT as usize;
        let mut composite = vec![false; limit];
        let mut primes = Vec::new();
        for n in 2..limit {
            if composite[n] {
                continue;
            }
            if n > 2 {
                primes.push(n as u32);
            }
            let mut multiple = n * n;
            while multiple < limit {
                composite[multiple] = true;
                multiple += n;
            }
        }
        primes
    })
}

/// Tests whether `n` is a probable prime.
///
/// Runs trial division by small primes, a Miller-Rabin round with base 2, then
/// `rounds` further rounds with uniform random bases in `[2, n - 2]`. The random
/// rounds alone bound the false-positive probability by `4^-rounds`.
pub fn is_probable_prime<R: RngCore + CryptoRng + ?Sized>(
    n: &BigUint,
    rounds: u32,
    rng: &mut R,
) -> bool {
    probable_prime_until(n, rounds, rng, None).unwrap_or(false)
}

/// [`is_probable_prime`] that checks `cancel` before every Miller-Rabin round.
///
/// Returns [`Error::Cancelled`] once the flag is observed raised.
pub(crate) fn probable_prime_until<R: RngCore + CryptoRng + ?Sized>(
    n: &BigUint,
    rounds: u32,
    rng: &mut R,
    cancel: Option<&AtomicBool>,
) -> Result<bool> {
    if let Some(small) = n.to_u32() {
        if small < 4 {
            return Ok(small == 2 || small == 3);
        }
    }
    if n.is_even() {
        return Ok(false);
    }

    for &p in small_primes() {
        let p_big = BigUint::from(p);
        if *n == p_big {
            return Ok(true);
        }
        if (n % p).is_zero() {
            return Ok(false);
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let s = n_minus_one
        .trailing_zeros()
        .unwrap_or_else(|| unreachable!("n - 1 is non-zero for n >= 4"));
    let d = &n_minus_one >> s;

    check_cancelled(cancel)?;
    if !miller_rabin_round(n, &n_minus_one, &d, s, &BigUint::from(2u32)) {
        return Ok(false);
    }

    for _ in 0..rounds {
        check_cancelled(cancel)?;
        let base = sample_open_range(rng, &one, &n_minus_one, WITNESS_SAMPLE_ATTEMPTS, "witness")?;
        if !miller_rabin_round(n, &n_minus_one, &d, s, &base) {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Fails with [`Error::Cancelled`] if `cancel` is raised.
pub(crate) fn check_cancelled(cancel: Option<&AtomicBool>) -> Result<()> {
    if cancel.is_some_and(|flag| flag.load(Ordering::Acquire)) {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// One Miller-Rabin witness check with `n - 1 = d * 2^s`.
fn miller_rabin_round(
    n: &BigUint,
    n_minus_one: &BigUint,
    d: &BigUint,
    s: u64,
    base: &BigUint,
) -> bool {
    let mut x = base.modpow(d, n);
    if x.is_one() || x == *n_minus_one {
        return true;
    }

    for _ in 1..s {
        x = (&x * &x) % n;
        if x == *n_minus_one {
            return true;
        }
        if x.is_one() {
            return false;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_core::impls;

    use super::*;

    /// Counts `fill_bytes` calls; each random witness takes exactly one per draw.
    struct CountingRng {
        inner: StdRng,
        fills: usize,
    }

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            impls::next_u32_via_fill(self)
        }

        fn next_u64(&mut self) -> u64 {
            impls::next_u64_via_fill(self)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.fills += 1;
            self.inner.fill_bytes(dest);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for CountingRng {}

    fn naive_is_prime(n: u64) -> bool {
        if n < 2 {
            return false;
        }
        let mut i = 2;
        while i * i <= n {
            if n % i == 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    #[test]
    fn small_prime_table() {
        let primes = small_primes();
        assert_eq!(&primes[..5], &[3, 5, 7, 11, 13]);
        assert!(primes.iter().all(|&p| naive_is_prime(p as u64)));
        assert_eq!(*primes.last().unwrap(), 2039);
    }

    #[test]
    fn agrees_with_trial_division() {
        let mut rng = StdRng::seed_from_u64(5);
        for n in 0u64..5000 {
            assert_eq!(
                is_probable_prime(&BigUint::from(n), 20, &mut rng),
                naive_is_prime(n),
                "mismatch at {n}"
            );
        }
    }

    #[test]
    fn beyond_trial_division_range() {
        let mut rng = StdRng::seed_from_u64(9);
        // 2039 * 2053 and 2053 * 2063 escape the small-prime table.
        for composite in [4_186_067u64, 4_235_339] {
            assert!(!is_probable_prime(&BigUint::from(composite), 20, &mut rng));
        }
        for prime in [4_194_301u64, 1_000_000_007, 2_305_843_009_213_693_951] {
            assert!(is_probable_prime(&BigUint::from(prime), 20, &mut rng));
        }
    }

    #[test]
    fn rejects_carmichael_numbers() {
        let mut rng = StdRng::seed_from_u64(11);
        for carmichael in [561u64, 41_041, 825_265, 321_197_185, 5_394_826_801] {
            assert!(!is_probable_prime(&BigUint::from(carmichael), 20, &mut rng));
        }
    }

    #[test]
    fn mersenne_127() {
        let mut rng = StdRng::seed_from_u64(13);
        let m127 = (BigUint::one() << 127u32) - BigUint::one();
        assert!(is_probable_prime(&m127, DEFAULT_PRIMALITY_ROUNDS, &mut rng));
        let m128 = (BigUint::one() << 128u32) - BigUint::one();
        assert!(!is_probable_prime(&m128, DEFAULT_PRIMALITY_ROUNDS, &mut rng));
    }

    #[test]
    fn every_round_draws_a_fresh_witness() {
        // 2^61 - 1: a 61-bit witness draw lands outside [2, n - 2] with
        // probability 2^-59, so each round costs one fill.
        let m61 = (BigUint::one() << 61u32) - BigUint::one();
        let mut rng = CountingRng {
            inner: StdRng::seed_from_u64(17),
            fills: 0,
        };

        assert!(is_probable_prime(&m61, DEFAULT_PRIMALITY_ROUNDS, &mut rng));
        assert_eq!(rng.fills, DEFAULT_PRIMALITY_ROUNDS as usize);
    }

    #[test]
    fn zero_rounds_keeps_base_two() {
        let mut rng = CountingRng {
            inner: StdRng::seed_from_u64(18),
            fills: 0,
        };
        // 2053 * 8209 is a strong pseudoprime to base 2 beyond the trial-division table.
        assert!(is_probable_prime(&BigUint::from(16_853_077u64), 0, &mut rng));
        assert!(!is_probable_prime(&BigUint::from(16_853_077u64), 20, &mut rng));
        let before = rng.fills;
        assert!(!is_probable_prime(&BigUint::from(4_186_067u64), 0, &mut rng));
        assert_eq!(rng.fills, before);
    }

    #[test]
    fn raised_flag_stops_before_any_round() {
        let cancel = AtomicBool::new(true);
        let m127 = (BigUint::one() << 127u32) - BigUint::one();
        let outcome = probable_prime_until(&m127, 10, &mut StdRng::seed_from_u64(19), Some(&cancel));
        assert!(matches!(outcome, Err(Error::Cancelled)));
    }

    #[test]
    fn cancellation_interrupts_long_confirmation() {
        let group = crate::WellKnownGroup::Oakley1024.group();
        let cancel = AtomicBool::new(false);

        thread::scope(|scope| {
            scope.spawn(|| {
                thread::sleep(Duration::from_millis(50));
                cancel.store(true, Ordering::Release);
            });

            // Without cancellation this confirmation would not finish.
            let started = Instant::now();
            let outcome = probable_prime_until(
                group.p(),
                u32::MAX,
                &mut StdRng::seed_from_u64(20),
                Some(&cancel),
            );
            assert!(matches!(outcome, Err(Error::Cancelled)));
            assert!(started.elapsed() < Duration::from_secs(10));
        });
    }
}
