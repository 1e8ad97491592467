//! Types shared by every WebServe crate.
//!
//! ## Architecture
//!
//! - **common** (this crate): error location tracking
//! - **server-core**: settings store, process controller, file server
//! - **webserve**: console and program entry points wiring everything together

pub mod error;

pub use error::error_location::ErrorLocation;

#[cfg(test)]
mod tests;
