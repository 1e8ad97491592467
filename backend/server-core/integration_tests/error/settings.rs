use server_core::error::settings::SettingsError;

use common::ErrorLocation;

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;
use std::path::PathBuf;

/// **VALUE**: Verifies that write errors name the path and the location.
///
/// **WHY THIS MATTERS**: Save failures are printed to the user; the path tells them what
/// to fix.
///
/// **BUG THIS CATCHES**: Would catch a Display format that drops the path or location.
#[test]
fn given_write_error_when_formatted_then_includes_path_and_location() {
    // GIVEN: A write error
    let err = SettingsError::Write {
        location: ErrorLocation::from(Location::caller()),
        path: PathBuf::from("/readonly/config.json"),
        source: IoError::new(ErrorKind::PermissionDenied, "permission denied"),
    };

    // WHEN: Formatting
    let text = err.to_string();

    // THEN: Type, path, cause and location
    assert!(text.contains("Settings Write Error"));
    assert!(text.contains("/readonly/config.json"));
    assert!(text.contains("permission denied"));
    assert!(text.contains("settings.rs"));
}

/// **VALUE**: Verifies the source chain for I/O-backed variants.
///
/// **WHY THIS MATTERS**: Logs walk the source chain to show the OS error.
///
/// **BUG THIS CATCHES**: Would catch removing `#[source]`.
#[test]
fn given_read_error_when_inspected_then_preserves_source() {
    // GIVEN: A read error
    let err = SettingsError::Read {
        location: ErrorLocation::from(Location::caller()),
        path: PathBuf::from("config.json"),
        source: IoError::new(ErrorKind::Other, "disk on fire"),
    };

    // WHEN/THEN: Source is kept
    let source = err.source().unwrap();
    assert!(source.to_string().contains("disk on fire"));
}
