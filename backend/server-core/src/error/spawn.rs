use common::ErrorLocation;

use std::error::Error as StdError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SpawnError {
    #[error("Spawn Error: {message} {location}")]
    Spawn {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Exited Error: {message} {location}")]
    Exited {
        message: String,
        location: ErrorLocation,
    },

    #[error("Parse Error: {message} {location}")]
    Parse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },
}

impl SpawnError {
    /// The human-readable part of the error, without location.
    pub fn reason(&self) -> String {
        match self {
            Self::Spawn { message, .. }
            | Self::Exited { message, .. }
            | Self::Parse { message, .. }
            | Self::Timeout { message, .. } => message.clone(),
        }
    }
}
