mod controller;
mod file_server;
