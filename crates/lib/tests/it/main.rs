/*! Integration tests for EventVault.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * Modules:
 * - translation: Tests for the record <-> domain translation layer
 * - lifecycle: Tests for event ingestion, deletion and account retirement
 * - recovery: Tests for the three key recovery channels
 * - pseudonym: Tests for secret id derivation
 * - snapshot: Tests for storage snapshots and cross-table validation
 * - ordering: Property tests for replay order
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("eventvault=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod lifecycle;
mod ordering;
mod recovery;
mod snapshot;
mod translation;
