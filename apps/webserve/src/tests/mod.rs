mod args;
mod error;
mod logger;
