use common::ErrorLocation;

use server_core::error::CoreError;

use std::panic::Location;

use thiserror::Error;

/// Errors raised by the console and program entry points.
///
/// Backend failures are flattened into [`WebServeError::Core`] with the location of
/// the call that surfaced them.
#[derive(Debug, Error)]
pub enum WebServeError {
    /// Error from this app (logger, directories, signal handling)
    #[error("WebServe Error: {message} {location}")]
    WebServe {
        message: String,
        location: ErrorLocation,
    },

    /// Error from server-core operations (settings, spawn, serve)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}

impl WebServeError {
    #[track_caller]
    pub fn core(err: impl Into<CoreError>) -> Self {
        WebServeError::Core {
            message: err.into().to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// A console line that does not map to a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Known command, wrong number of arguments
    #[error("Command Format Error: {usage} {location}")]
    Format {
        usage: &'static str,
        location: ErrorLocation,
    },

    #[error("Unrecognized Command Error: {text} {location}")]
    Unrecognized {
        text: String,
        location: ErrorLocation,
    },
}

impl CommandError {
    /// Text shown in the console; locations are for the log only.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Format { usage, .. } => format!("Invalid command format. Use: {usage}"),
            CommandError::Unrecognized { text, .. } => format!("Command '{text}' not recognized"),
        }
    }
}
