use webserve::args::PanelArgs;
use webserve::console::Console;
use webserve::error::WebServeError;
use webserve::logger::{PANEL_LOG_FILE_NAME, initialize as LoggerInitialize};

use server_core::controller::ServerController;
use server_core::settings::SettingsStore;

use common::ErrorLocation;

use std::io::{BufRead, Write, stdin, stdout};
use std::panic::Location;
use std::process::{ExitCode, exit};
use std::sync::{Arc, Mutex, MutexGuard};

use clap::Parser;
use log::{error, info};

const PROMPT: &str = ">> ";
const WELCOME: &str = "WebServe console. Type 'help' for available commands.";
const ADDRESS_NOTE_PREFIX: &str = "Web server address: ";
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() -> ExitCode {
    let args = PanelArgs::parse();

    let log_dir = args.log_dir();
    if let Err(e) = LoggerInitialize(&log_dir, PANEL_LOG_FILE_NAME) {
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

fn run(args: &PanelArgs) -> Result<(), WebServeError> {
    let config = args.controller_config()?;

    let store = SettingsStore::new(config.settings_path.clone());

    info!("WebServe console starting");
    info!("Settings file: {}", store.path().display());
    info!("File server: {}", config.server_binary.display());

    let console = Arc::new(Mutex::new(Console::new(
        store,
        ServerController::new(config),
    )));

    let handler_console = Arc::clone(&console);
    ctrlc::set_handler(move || {
        info!("Interrupted, shutting down");
        if let Some(message) = lock(&handler_console).shutdown() {
            println!("{message}");
        }
        exit(INTERRUPTED_EXIT_CODE);
    })
    .map_err(|e| WebServeError::WebServe {
        message: format!("Failed to install Ctrl-C handler: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    println!("{WELCOME}");
    println!("{ADDRESS_NOTE_PREFIX}{}", lock(&console).settings().address());

    let mut input = stdin().lock();
    let mut line = String::new();

    loop {
        print!("{PROMPT}");
        stdout().flush().map_err(|e| WebServeError::WebServe {
            message: format!("Failed to write prompt: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        line.clear();
        let read = input
            .read_line(&mut line)
            .map_err(|e| WebServeError::WebServe {
                message: format!("Failed to read console input: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // EOF behaves like `exit`
        if read == 0 {
            println!();
            break;
        }

        if line.trim().is_empty() {
            continue;
        }

        let reply = lock(&console).execute_line(&line);

        if !reply.message.is_empty() {
            println!("{}", reply.message);
        }

        if reply.exit {
            info!("Exit requested");
            return Ok(());
        }
    }

    if let Some(message) = lock(&console).shutdown() {
        println!("{message}");
    }

    info!("WebServe console closed");
    Ok(())
}

/// A panic while holding the console leaves it usable; the controller state is
/// still consistent between commands.
fn lock(console: &Mutex<Console>) -> MutexGuard<'_, Console> {
    console
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
