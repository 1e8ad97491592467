use webserve::args::FileServerArgs;
use webserve::error::WebServeError;
use webserve::logger::{FILE_SERVER_LOG_FILE_NAME, initialize as LoggerInitialize};

use server_core::file_server::FileServer;
use server_core::settings::SettingsStore;

use common::ErrorLocation;

use std::io::{Write, stdout};
use std::panic::Location;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

fn main() -> ExitCode {
    let args = FileServerArgs::parse();

    if let Err(e) = LoggerInitialize(&args.log_dir(), FILE_SERVER_LOG_FILE_NAME) {
        eprintln!("Logging disabled: {e}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &FileServerArgs) -> Result<(), WebServeError> {
    let settings_path = args.settings_path()?;
    let root = args.serve_root()?;

    info!("Reading settings from {}", settings_path.display());
    let settings = SettingsStore::new(settings_path).load();

    let server = FileServer::bind(&settings, &root).map_err(|e| WebServeError::core(e))?;

    if let Some(addr) = server.local_addr() {
        info!("Listening on {addr} for {}", settings.address());
    }

    // The console waits for this exact line before reporting a successful start
    let mut out = stdout().lock();
    writeln!(out, "{}", server.ready_line())
        .and_then(|()| out.flush())
        .map_err(|e| WebServeError::WebServe {
            message: format!("Failed to announce listening address: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;
    drop(out);

    server.run().map_err(|e| WebServeError::core(e))
}
