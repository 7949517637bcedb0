//! Bounded search for Schnorr groups with a safe-prime modulus.

use std::sync::atomic::AtomicBool;

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, warn};

use super::Group;
use crate::primitives::field::{sample_bits, sample_open_range};
use crate::primitives::primality::{check_cancelled, probable_prime_until, small_primes};
use crate::primitives::{SecureRng, DEFAULT_PRIMALITY_ROUNDS};
use crate::{Error, Result};

/// Smallest modulus bit length admitting a safe prime with an odd subgroup order (`p = 7`).
pub const MIN_GROUP_BITS: u64 = 3;

/// Candidates examined from one random starting point before resampling.
const SIEVE_WINDOW: u64 = 1 << 12;

/// Draws allowed when sampling a single generator candidate `h`.
const CANDIDATE_SAMPLE_ATTEMPTS: u64 = 128;

/// How the group search is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStrategy {
    /// One search on the calling thread.
    Sequential,
    /// Independent searches racing on `workers` threads; the first result wins.
    Parallel {
        /// Number of worker threads.
        workers: usize,
    },
}

/// Group search configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Sequential or parallel execution.
    pub strategy: SearchStrategy,
    /// Miller-Rabin rounds for each primality test.
    pub primality_rounds: u32,
    /// Cap on safe-prime candidates; `None` derives it from the bit length.
    pub max_prime_attempts: Option<u64>,
    /// Cap on generator candidates.
    pub max_generator_attempts: u64,
}

impl SearchConfig {
    /// Returns the safe-prime attempt cap for `bit_length`.
    ///
    /// The derived default is `64 * bit_length^2`, several hundred times the
    /// expected number of candidates, and never below 1024.
    pub fn prime_attempt_bound(&self, bit_length: u64) -> u64 {
        self.max_prime_attempts.unwrap_or_else(|| {
            bit_length
                .saturating_mul(bit_length)
                .saturating_mul(64)
                .max(1024)
        })
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Sequential,
            primality_rounds: DEFAULT_PRIMALITY_ROUNDS,
            max_prime_attempts: None,
            max_generator_attempts: 64,
        }
    }
}

/// Searches for a Schnorr group `(p, q, g)` with `p = 2q + 1`.
///
/// The search runs in two bounded phases: a safe-prime search for `p` and `q`,
/// then a generator search that squares random elements into the order-`q`
/// subgroup.
///
/// # Examples
///
/// ```rust
/// use schnorr_modp::{GroupGenerator, SearchConfig, SearchStrategy};
///
/// let generator = GroupGenerator::new(SearchConfig {
///     strategy: SearchStrategy::Parallel { workers: 2 },
///     ..SearchConfig::default()
/// });
/// let group = generator.generate(64).unwrap();
/// assert_eq!(group.bits(), 64);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GroupGenerator {
    config: SearchConfig,
}

impl GroupGenerator {
    /// Creates a generator with the given configuration.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Returns the search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Generates a group whose modulus has exactly `bit_length` bits.
    ///
    /// Uses [`SecureRng`] and the configured [`SearchStrategy`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParams`] if `bit_length` is below [`MIN_GROUP_BITS`] or
    ///   a parallel strategy has zero workers
    /// - [`Error::GenerationFailure`] if a search phase exhausts its cap
    pub fn generate(&self, bit_length: u64) -> Result<Group> {
        match self.config.strategy {
            SearchStrategy::Sequential => self.generate_with_rng(bit_length, &mut SecureRng::new()),
            SearchStrategy::Parallel { workers } => {
                self.search_parallel_with(bit_length, workers, |_| SecureRng::new())
            }
        }
    }

    /// Generates a group sequentially, drawing randomness from `rng`.
    pub fn generate_with_rng<R: RngCore + CryptoRng + ?Sized>(
        &self,
        bit_length: u64,
        rng: &mut R,
    ) -> Result<Group> {
        check_bit_length(bit_length)?;
        self.search(bit_length, rng, None)
    }

    /// Runs both search phases, stopping early once `cancel` is raised.
    pub(crate) fn search<R: RngCore + CryptoRng + ?Sized>(
        &self,
        bit_length: u64,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Result<Group> {
        let (p, q) = self.find_safe_prime(bit_length, rng, cancel)?;
        let g = self.find_generator(&p, &q, rng, cancel)?;

        debug!(bits = bit_length, "group generated");
        Ok(Group::from_trusted_parts(p, q, g))
    }

    /// Finds probable primes `p` of `bit_length` bits and `q = (p - 1) / 2`.
    ///
    /// Candidates satisfy `p = 3 (mod 4)` so that `q` is odd. Each random start is
    /// followed by up to [`SIEVE_WINDOW`] candidates `p + 4i`, with small-prime
    /// residues of `p` updated incrementally; `p = 1 (mod l)` means `l` divides `q`.
    fn find_safe_prime<R: RngCore + CryptoRng + ?Sized>(
        &self,
        bit_length: u64,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Result<(BigUint, BigUint)> {
        let max_attempts = self.config.prime_attempt_bound(bit_length);
        let rounds = self.config.primality_rounds;
        let primes = small_primes();
        let mut attempts = 0u64;

        while attempts < max_attempts {
            check_cancelled(cancel)?;

            let mut p = random_start(rng, bit_length);
            let mut residues: Vec<u32> = primes
                .iter()
                .map(|&l| (&p % l).to_u32().unwrap_or_default())
                .collect();

            for step in 0..SIEVE_WINDOW {
                if attempts >= max_attempts {
                    break;
                }
                if step > 0 {
                    p += 4u32;
                    for (r, &l) in residues.iter_mut().zip(primes) {
                        *r = (*r + 4) % l;
                    }
                    if p.bits() != bit_length {
                        break;
                    }
                }

                attempts += 1;
                check_cancelled(cancel)?;

                if !survives_sieve(p.to_u32(), &residues, primes) {
                    continue;
                }

                let q: BigUint = &p >> 1u32;
                if probable_prime_until(&q, rounds, rng, cancel)?
                    && probable_prime_until(&p, rounds, rng, cancel)?
                {
                    debug!(bits = bit_length, attempts, "safe prime found");
                    return Ok((p, q));
                }
            }
        }

        warn!(bits = bit_length, attempts, "safe prime search exhausted");
        Err(Error::GenerationFailure {
            what: "safe prime",
            attempts,
        })
    }

    /// Finds `g = h^2 mod p` with `1 < h < p - 1`, `g != 1` and `g^q mod p = 1`.
    fn find_generator<R: RngCore + CryptoRng + ?Sized>(
        &self,
        p: &BigUint,
        q: &BigUint,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Result<BigUint> {
        let one = BigUint::one();
        let two = BigUint::from(2u32);
        let p_minus_one = p - &one;
        let max_attempts = self.config.max_generator_attempts;

        for attempt in 1..=max_attempts {
            check_cancelled(cancel)?;

            let h = sample_open_range(
                rng,
                &one,
                &p_minus_one,
                CANDIDATE_SAMPLE_ATTEMPTS,
                "generator candidate",
            )?;
            let g = h.modpow(&two, p);

            if !g.is_one() && g.modpow(q, p).is_one() {
                debug!(attempts = attempt, "generator found");
                return Ok(g);
            }
        }

        warn!(attempts = max_attempts, "generator search exhausted");
        Err(Error::GenerationFailure {
            what: "generator",
            attempts: max_attempts,
        })
    }
}

/// Rejects bit lengths that cannot hold a safe prime with an odd subgroup order.
pub(crate) fn check_bit_length(bit_length: u64) -> Result<()> {
    if bit_length < MIN_GROUP_BITS {
        return Err(Error::InvalidParams(format!(
            "bit length must be at least {MIN_GROUP_BITS}, got {bit_length}"
        )));
    }
    Ok(())
}

/// Random `bit_length`-bit integer with the top bit set and `p = 3 (mod 4)`.
fn random_start<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, bit_length: u64) -> BigUint {
    let mut p = sample_bits(rng, bit_length);
    p.set_bit(bit_length - 1, true);
    p.set_bit(1, true);
    p.set_bit(0, true);
    p
}

/// `small` is `p` itself when it fits in a `u32`, so a small prime is not
/// rejected for dividing itself.
fn survives_sieve(small: Option<u32>, residues: &[u32], primes: &[u32]) -> bool {
    residues
        .iter()
        .zip(primes)
        .all(|(&r, &l)| match r {
            0 => small == Some(l),
            1 => small == Some(2 * l + 1),
            _ => true,
        })
}
