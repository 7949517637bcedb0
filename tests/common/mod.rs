//! Common test utilities shared across integration tests.

use schnorr_modp::{Group, KeyPair, SecureRng, WellKnownGroup};

/// Initialize test tracing (call once at the beginning of tests).
///
/// Only logs from this crate are shown. Subsequent calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("schnorr_modp=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// The 1024-bit Oakley group with a freshly generated key pair.
#[allow(dead_code)]
pub fn oakley_keys() -> (Group, KeyPair) {
    let group = WellKnownGroup::Oakley1024.group();
    let keys = KeyPair::generate(&group, &mut SecureRng::new()).expect("key generation");
    (group, keys)
}
