// Unit tests for logger initialization
// Tests focus on idempotence and error handling

use crate::logger::{build_dispatch, default_log_dir, initialize};

use std::path::PathBuf;

use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: The console and tests may both reach the logger setup. If the
/// second call panicked, fern would crash the process while trying to set a global
/// logger twice.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A valid temporary directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let result1 = initialize(temp_dir.path(), "first.log");
    let result2 = initialize(temp_dir.path(), "second.log");

    // THEN: Both should return Ok (second one logs warning but doesn't error)
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(
        result2.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
}

/// **VALUE**: Verifies that an unusable log directory yields an error instead of a panic.
///
/// **WHY THIS MATTERS**: Both programs treat logger failure as non-fatal. A panic here
/// would take down the file server before it announces its address.
///
/// **BUG THIS CATCHES**: Would catch `create_dir_all` or `fern::log_file()` being unwrapped.
#[test]
fn given_invalid_log_dir_when_dispatch_built_then_returns_error() {
    // GIVEN: A path that cannot be a directory on Unix-like systems
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Building the dispatch (not installing it)
    let result = build_dispatch(&invalid_dir, "webserve.log");

    // THEN: Should return the app error variant
    let Err(err) = result else {
        panic!("Should return error for invalid log directory");
    };
    let err_string = format!("{err:?}");
    assert!(
        err_string.contains("WebServe"),
        "Error should be WebServeError::WebServe variant"
    );
}

/// **VALUE**: Verifies that building the dispatch creates the log directory and file.
///
/// **BUG THIS CATCHES**: Would catch the directory not being created before the file
/// is opened, which fails on first run.
#[test]
fn given_missing_log_dir_when_dispatch_built_then_creates_directory_and_file() {
    // GIVEN: A nested directory that doesn't exist yet
    let temp_dir = TempDir::new().unwrap();
    let log_dir = temp_dir.path().join("nested").join("logs");

    // WHEN: Building the dispatch
    let result = build_dispatch(&log_dir, "webserve.log");

    // THEN: Directory and file should exist
    assert!(result.is_ok());
    assert!(log_dir.join("webserve.log").is_file());
}

#[test]
fn given_default_log_dir_when_resolved_then_ends_with_app_logs() {
    let dir = default_log_dir();

    assert!(dir.ends_with("webserve/logs"));
}
