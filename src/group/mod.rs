//! Schnorr groups: the group value, its generator search and well-known instances.

/// Bounded sequential group search and its configuration.
pub mod generator;
/// Parallel race over independent group searches.
pub mod parallel;
/// The immutable group value.
pub mod params;
/// Standardized safe-prime groups.
pub mod rfc;

pub use generator::{GroupGenerator, SearchConfig, SearchStrategy, MIN_GROUP_BITS};
pub use parallel::search_parallel;
pub use params::{Group, MIN_SUBGROUP_BITS};
pub use rfc::WellKnownGroup;
