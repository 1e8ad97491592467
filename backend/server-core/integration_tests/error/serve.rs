use server_core::error::serve::ServeError;

use common::ErrorLocation;

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;

/// **VALUE**: Verifies the bind error format and source chain.
///
/// **WHY THIS MATTERS**: The file server logs this before exiting; it is the only trace
/// of a port-in-use failure in the child's log.
///
/// **BUG THIS CATCHES**: Would catch a lost OS error or missing location.
#[test]
fn given_bind_error_when_formatted_then_includes_message_source_and_location() {
    // GIVEN: A bind error
    let err = ServeError::Bind {
        message: "Failed to bind 127.0.0.1:8000".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::AddrInUse, "address in use")),
    };

    // WHEN/THEN: Display and source
    let text = err.to_string();
    assert!(text.starts_with("Bind Error: Failed to bind 127.0.0.1:8000"));
    assert!(text.contains("serve.rs"));
    assert!(err.source().unwrap().to_string().contains("address in use"));
}
