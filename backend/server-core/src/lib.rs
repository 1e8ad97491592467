pub mod controller;
pub mod error;
pub mod file_server;
pub mod settings;

#[cfg(test)]
mod tests;

use std::env::consts::EXE_SUFFIX;

pub const FILE_SERVER_BINARY: &str = "webserve-fileserver";
pub const FILE_SERVER_EXECUTABLE: &str = const_format::concatcp!(FILE_SERVER_BINARY, EXE_SUFFIX);

pub const SETTINGS_FILE_NAME: &str = "config.json";
pub const DEFAULT_IP: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;

pub const SETTINGS_FLAG: &str = "--settings";
pub const ROOT_FLAG: &str = "--root";
pub const LOG_DIR_FLAG: &str = "--log-dir";

/// Printed by the file server on stdout once its listener is bound.
pub const READY_LINE_PREFIX: &str = "Serving at ";
