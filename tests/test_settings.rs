use forkify::{open_configured_store, StoreError};
use std::env;

#[test]
fn test_invalid_environment_setting_is_config_error() {
    env::set_var("FORKIFY__RESULTS_PER_PAGE", "plenty");
    let result = open_configured_store();
    env::remove_var("FORKIFY__RESULTS_PER_PAGE");

    assert!(matches!(result, Err(StoreError::Config(_))));
}
