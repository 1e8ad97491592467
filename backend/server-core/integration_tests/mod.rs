mod controller;
mod error;
mod file_server;
mod settings;
