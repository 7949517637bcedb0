//! Racing several group searches and adopting the canonical winner.
//!
//! Workers run inside a scoped task group and share nothing but a cancellation
//! flag. The caller blocks once on the result channel; the first group to
//! arrive raises the flag, losing workers stop at their next iteration, and
//! the scope joins every thread before returning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, trace};

use super::generator::check_bit_length;
use super::{Group, GroupGenerator};
use crate::primitives::SecureRng;
use crate::{Error, Result};

/// Races `workers` independent group searches using [`SecureRng`] and default settings.
///
/// # Errors
///
/// - [`Error::InvalidParams`] if `workers` is zero or `bit_length` is too small
/// - the lowest-indexed worker's error if no worker finds a group
///
/// # Examples
///
/// ```rust
/// let group = schnorr_modp::search_parallel(48, 4).unwrap();
/// assert_eq!(group.bits(), 48);
/// ```
pub fn search_parallel(bit_length: u64, workers: usize) -> Result<Group> {
    GroupGenerator::default().search_parallel_with(bit_length, workers, |_| SecureRng::new())
}

impl GroupGenerator {
    /// Races `workers` independent searches, each with the RNG returned by
    /// `make_rng(worker_index)`.
    ///
    /// The first completed group wins. Groups that completed before the
    /// cancellation reached their worker compete with it, and the one with the
    /// numerically smallest `q` is returned.
    pub fn search_parallel_with<R, F>(
        &self,
        bit_length: u64,
        workers: usize,
        make_rng: F,
    ) -> Result<Group>
    where
        R: RngCore + CryptoRng + Send,
        F: Fn(usize) -> R,
    {
        if workers == 0 {
            return Err(Error::InvalidParams(
                "parallel search needs at least one worker".to_string(),
            ));
        }
        check_bit_length(bit_length)?;

        let cancel = AtomicBool::new(false);

        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel();

            for worker in 0..workers {
                let tx = tx.clone();
                let cancel = &cancel;
                let mut rng = make_rng(worker);
                scope.spawn(move || {
                    let outcome = self.search(bit_length, &mut rng, Some(cancel));
                    // The receiver outlives every worker inside the scope.
                    let _ = tx.send((worker, outcome));
                });
            }
            drop(tx);

            let mut finished = Vec::new();
            let mut failures = Vec::new();

            for (worker, outcome) in rx.iter() {
                match outcome {
                    Ok(group) => {
                        debug!(worker, bits = bit_length, "parallel search won");
                        finished.push(group);
                        break;
                    }
                    Err(err) => failures.push((worker, err)),
                }
            }

            cancel.store(true, Ordering::Release);

            for (worker, outcome) in rx.iter() {
                match outcome {
                    Ok(group) => {
                        debug!(worker, "late group joins tie-break");
                        finished.push(group);
                    }
                    Err(Error::Cancelled) => trace!(worker, "worker cancelled"),
                    Err(err) => failures.push((worker, err)),
                }
            }

            match select_canonical(finished) {
                Some(group) => Ok(group),
                None => Err(failures
                    .into_iter()
                    .min_by_key(|(worker, _)| *worker)
                    .map(|(_, err)| err)
                    .unwrap_or(Error::Cancelled)),
            }
        })
    }
}

/// Picks the group with the numerically smallest `q`.
pub(crate) fn select_canonical(groups: Vec<Group>) -> Option<Group> {
    groups.into_iter().min_by(|a, b| a.q().cmp(b.q()))
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::group::SearchConfig;

    #[test]
    fn rejects_zero_workers() {
        let err = search_parallel(32, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
    }

    #[test]
    fn rejects_tiny_bit_length() {
        let err = search_parallel(2, 4).unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
    }

    #[test]
    fn canonical_choice_is_smallest_q() {
        let small = Group::new(23u32.into(), 11u32.into(), 4u32.into()).unwrap();
        let large = Group::new(47u32.into(), 23u32.into(), 4u32.into()).unwrap();
        let tiny = Group::new(7u32.into(), 3u32.into(), 2u32.into()).unwrap();

        let chosen = select_canonical(vec![large.clone(), small, tiny.clone()]).unwrap();
        assert_eq!(chosen, tiny);

        let chosen = select_canonical(vec![large.clone()]).unwrap();
        assert_eq!(chosen, large);

        assert!(select_canonical(Vec::new()).is_none());
    }

    #[test]
    fn single_seeded_worker_matches_sequential_search() {
        let generator = GroupGenerator::default();

        let parallel = generator
            .search_parallel_with(40, 1, |_| StdRng::seed_from_u64(2024))
            .unwrap();
        let sequential = generator
            .generate_with_rng(40, &mut StdRng::seed_from_u64(2024))
            .unwrap();

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn identical_workers_agree() {
        let generator = GroupGenerator::default();
        let expected = generator
            .generate_with_rng(40, &mut StdRng::seed_from_u64(7))
            .unwrap();

        // Every worker walks the same seeded search, so any winner is the same group.
        let group = generator
            .search_parallel_with(40, 4, |_| StdRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(group, expected);
    }

    #[test]
    fn all_workers_failing_reports_generation_failure() {
        let generator = GroupGenerator::new(SearchConfig {
            max_prime_attempts: Some(1),
            ..SearchConfig::default()
        });

        let err = generator
            .search_parallel_with(512, 3, |worker| StdRng::seed_from_u64(worker as u64))
            .unwrap_err();
        assert!(matches!(err, Error::GenerationFailure { .. }));
    }

    #[test]
    fn parallel_groups_hold_invariants() {
        let group = search_parallel(64, 4).unwrap();
        assert_eq!(group.bits(), 64);
        assert_eq!(group.p(), &((group.q() << 1u32) + BigUint::from(1u32)));
        assert!(group.g().modpow(group.q(), group.p()) == BigUint::from(1u32));
    }
}
