// Library exports for testing
// Both binaries (main.rs, fileserver.rs) import these as well

pub mod args;
pub mod command;
pub mod console;
pub mod error;
pub mod logger;

#[cfg(test)]
mod tests;
