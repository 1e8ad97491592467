use crate::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every settings, spawn and serve error carries a location. If it
/// captures the wrong position, every error message in the panel points at the wrong code.
///
/// **BUG THIS CATCHES**: Would catch if `Location::caller()` stops being propagated or the
/// line/column fields get swapped.
#[test]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN: Current caller location
    // WHEN: Creating ErrorLocation from it
    let location = ErrorLocation::from(Location::caller());

    // THEN: Should capture this file, a real line, and a column
    assert!(
        location.file.contains("error_location.rs"),
        "Should capture file path"
    );
    assert!(location.line > 0, "Should capture line number");
    assert!(location.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies the bracketed `[file:line:column]` Display format.
///
/// **WHY THIS MATTERS**: Logged errors end with this text. Tests across the workspace
/// look for the file name inside it.
///
/// **BUG THIS CATCHES**: Would catch a Display change that drops the brackets or a field.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: A hand-built location
    let location = ErrorLocation {
        file: "backend/server-core/src/controller/mod.rs",
        line: 42,
        column: 7,
    };

    // WHEN: Formatting it
    let formatted = location.to_string();

    // THEN: Should render all three parts in brackets
    assert_eq!(formatted, "[backend/server-core/src/controller/mod.rs:42:7]");
}
