// Unit tests for app error types

use crate::error::{CommandError, WebServeError};

use server_core::error::settings::SettingsError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies that backend errors keep their message when flattened.
///
/// **WHY THIS MATTERS**: The console only prints `WebServeError`; if the core message
/// were lost, a failed start would print nothing actionable.
///
/// **BUG THIS CATCHES**: Would catch `core()` dropping the inner error's text.
#[test]
fn given_settings_error_when_converted_to_core_then_message_preserved() {
    // GIVEN: A settings validation error
    let inner = SettingsError::Validation {
        location: ErrorLocation::from(Location::caller()),
        reason: "IP address cannot be empty".to_string(),
    };

    // WHEN: Flattening into the app error
    let err = WebServeError::core(inner);

    // THEN: Display should carry the prefix and the inner reason
    let display = err.to_string();
    assert!(display.starts_with("Core Error: "));
    assert!(display.contains("IP address cannot be empty"));
    assert!(matches!(err, WebServeError::Core { .. }));
}

/// **VALUE**: Verifies that the location recorded is the caller of `core()`.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being removed, which would make
/// every flattened error point into error.rs.
#[test]
fn given_core_called_here_when_inspected_then_location_is_this_file() {
    let inner = SettingsError::Serialize {
        location: ErrorLocation::from(Location::caller()),
        reason: "boom".to_string(),
    };

    let WebServeError::Core { location, .. } = WebServeError::core(inner) else {
        panic!("Expected Core variant");
    };

    assert!(location.file.ends_with("tests/error.rs"));
}

/// **VALUE**: Pins the user-facing text of command errors.
///
/// **WHY THIS MATTERS**: These strings are what a user sees after a typo; locations
/// belong in the log, not the console.
///
/// **BUG THIS CATCHES**: Would catch the location leaking into the console text.
#[test]
fn given_command_errors_when_user_message_called_then_no_location_shown() {
    // GIVEN: One error of each kind
    let format = CommandError::Format {
        usage: "--webserver port new_port",
        location: ErrorLocation::from(Location::caller()),
    };
    let unrecognized = CommandError::Unrecognized {
        text: "foo bar".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN/THEN: Messages match the console wording exactly
    assert_eq!(
        format.user_message(),
        "Invalid command format. Use: --webserver port new_port"
    );
    assert_eq!(unrecognized.user_message(), "Command 'foo bar' not recognized");
    assert!(format.to_string().contains('['));
}
