//! Integration tests for the `validate` command.
use rmo::cli::handle_validate_command;
use rmo::log::is_logger_initialised;
use rmo::settings::Settings;
use std::path::PathBuf;

/// Get the path to the example dataset.
fn get_data_dir() -> PathBuf {
    PathBuf::from("demos/adjusted")
}

/// An integration test for the `validate` command.
///
/// We also check that the logger is initialised after it is run.
#[test]
fn test_handle_validate_command() {
    unsafe { std::env::set_var("RMO_LOG_LEVEL", "off") };

    assert!(!is_logger_initialised());

    handle_validate_command(&get_data_dir(), Some(Settings::default())).unwrap();

    assert!(is_logger_initialised());
}
