//! Error types for Schnorr group generation and signatures.

/// Main error types for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The subgroup order is too small for the challenge hash width.
    #[error("Insufficient security: subgroup order has {bits} bits, at least {required} required")]
    InsufficientSecurity {
        /// Bit length of `q` in the offending group.
        bits: u64,
        /// Minimum accepted bit length.
        required: u64,
    },

    /// A bounded probabilistic search ran out of attempts.
    #[error("Generation failure: no {what} found after {attempts} attempts")]
    GenerationFailure {
        /// What the search was looking for.
        what: &'static str,
        /// Number of attempts made before giving up.
        attempts: u64,
    },

    /// Invalid group parameters or search settings were provided.
    #[error("Invalid group parameters: {0}")]
    InvalidParams(String),

    /// A search observed the cancellation flag and stopped early.
    #[error("Search cancelled")]
    Cancelled,
}
