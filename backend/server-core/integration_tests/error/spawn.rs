use server_core::error::CoreError;
use server_core::error::spawn::SpawnError;

use common::ErrorLocation;

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;

/// **VALUE**: Verifies that `SpawnError::Spawn` includes location tracking.
///
/// **WHY THIS MATTERS**: The log records the full error. The location tells a developer
/// which spawn step failed.
///
/// **BUG THIS CATCHES**: Would catch dropping the location from the Display format.
#[test]
fn given_spawn_error_when_formatted_then_includes_location() {
    // GIVEN: A spawn error
    let err = SpawnError::Spawn {
        message: "Failed to spawn webserve-fileserver".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::NotFound, "binary not found")),
    };

    // WHEN: Formatting
    let text = err.to_string();

    // THEN: Type, message and file
    assert!(text.contains("Spawn Error"));
    assert!(text.contains("Failed to spawn webserve-fileserver"));
    assert!(text.contains("spawn.rs"));
}

/// **VALUE**: Verifies the Exited and Timeout variant formats.
///
/// **WHY THIS MATTERS**: These are the two ways a spawned child fails to come up.
///
/// **BUG THIS CATCHES**: Would catch swapped or renamed variant prefixes.
#[test]
fn given_exited_and_timeout_errors_when_formatted_then_use_their_prefixes() {
    // GIVEN: One of each
    let exited = SpawnError::Exited {
        message: "File server exited before listening".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };
    let timeout = SpawnError::Timeout {
        message: "No listening address within 5s".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN/THEN: Each carries its own prefix
    assert!(exited.to_string().starts_with("Exited Error: File server exited"));
    assert!(timeout.to_string().starts_with("Timeout Error: No listening address"));
}

/// **VALUE**: Verifies that `CoreError` forwards spawn errors transparently.
///
/// **WHY THIS MATTERS**: Callers aggregate backend failures through `CoreError`; the text
/// must not gain a second prefix.
///
/// **BUG THIS CATCHES**: Would catch replacing `#[error(transparent)]`.
#[test]
fn given_spawn_error_when_converted_to_core_error_then_display_is_unchanged() {
    // GIVEN: A spawn error and its text
    let err = SpawnError::Spawn {
        message: "permission denied".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::PermissionDenied, "permission denied")),
    };
    let expected = err.to_string();

    // WHEN: Converting
    let core: CoreError = err.into();

    // THEN: Same text, source chain intact
    assert_eq!(core.to_string(), expected);
    assert!(core.source().is_some());
}

/// **VALUE**: Verifies that `reason()` returns the message without the location.
///
/// **WHY THIS MATTERS**: The console shows `reason()` to the user; source positions
/// belong in the log only.
///
/// **BUG THIS CATCHES**: Would catch `reason()` falling back to the Display text, which
/// leaks `[file:line:col]` into the console.
#[test]
fn given_spawn_errors_when_reason_called_then_message_without_location() {
    // GIVEN: One error of each variant with a known message
    let errors = vec![
        SpawnError::Spawn {
            message: "Failed to spawn webserve-fileserver".to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(IoError::new(ErrorKind::NotFound, "binary not found")),
        },
        SpawnError::Exited {
            message: "File server exited before listening".to_string(),
            location: ErrorLocation::from(Location::caller()),
        },
        SpawnError::Parse {
            message: "Child process has no stdout".to_string(),
            location: ErrorLocation::from(Location::caller()),
        },
        SpawnError::Timeout {
            message: "No listening address within 5s".to_string(),
            location: ErrorLocation::from(Location::caller()),
        },
    ];

    // WHEN/THEN: Each reason is exactly its message
    for err in errors {
        let reason = err.reason();
        assert!(err.to_string().contains(&reason));
        assert!(!reason.contains("spawn.rs"), "Reason leaked location: {reason}");
        assert!(!reason.contains('['), "Reason leaked location: {reason}");
    }
}
