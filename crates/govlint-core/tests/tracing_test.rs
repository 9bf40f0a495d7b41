//! Tracing setup is idempotent and tolerates bad filter directives.

use govlint_core::tracing::{init_tracing, setup::LOG_ENV_VAR};

#[test]
fn init_twice_with_invalid_filter() {
    std::env::set_var(LOG_ENV_VAR, "this is [not a filter");
    init_tracing();
    init_tracing();
    tracing::info!(target: "govlint_core", "tracing initialized");
    std::env::remove_var(LOG_ENV_VAR);
}
