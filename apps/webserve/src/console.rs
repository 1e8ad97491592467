//! Dispatch of parsed commands to the settings store and the server controller.
//!
//! The console owns the in-memory settings record. Changes are validated on a copy
//! and only adopted once the copy has been saved, so the record and the file the
//! file server reads never diverge.

use crate::command::{CHANGE_IP_USAGE, Command, HELP_TEXT, PORT_USAGE};

use server_core::controller::{ServerController, ServerStatus, StartOutcome, StopOutcome};
use server_core::error::settings::SettingsError;
use server_core::settings::{ServerSettings, SettingsStore};

use log::{debug, error, info};

pub const ALREADY_RUNNING_MESSAGE: &str = "Web server is already running.";
pub const STOPPED_MESSAGE: &str = "Web server stopped successfully.";
pub const NOTHING_TO_STOP_MESSAGE: &str = "No web server is running.";
const APPLY_ON_RESTART_HINT: &str = " (restart the web server to apply)";

/// Text to print for one command, and whether the console should close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
    pub exit: bool,
}

impl Reply {
    fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit: false,
        }
    }

    fn exit(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit: true,
        }
    }
}

pub struct Console {
    store: SettingsStore,
    settings: ServerSettings,
    controller: ServerController,
}

impl Console {
    /// Load the settings from `store` (defaults on any failure) and take ownership of
    /// `controller`.
    pub fn new(store: SettingsStore, controller: ServerController) -> Self {
        let settings = store.load();
        info!("Console ready, web server address {}", settings.address());

        Self {
            store,
            settings,
            controller,
        }
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn status(&mut self) -> ServerStatus {
        self.controller.status()
    }

    /// Parse and run one input line. Never fails: every problem becomes reply text.
    pub fn execute_line(&mut self, line: &str) -> Reply {
        debug!("Console input: {line}");

        match Command::parse(line) {
            Ok(command) => self.execute(command),
            Err(e) => {
                debug!("{e}");
                Reply::text(e.user_message())
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Help => Reply::text(HELP_TEXT),
            Command::Exit => Reply::exit(self.shutdown().unwrap_or_default()),
            Command::Start => Reply::text(self.start_server()),
            Command::Stop => Reply::text(self.stop_server()),
            Command::Status => Reply::text(format!("Web server status: {}", self.status())),
            Command::ShowAddress => Reply::text(format!(
                "Web server is running at {}",
                self.settings.address()
            )),
            Command::ChangeIp(raw) => Reply::text(self.change_ip(&raw)),
            Command::ChangePort(raw) => Reply::text(self.change_port(&raw)),
        }
    }

    /// Stop the server if it runs. Returns the message to show, if any.
    pub fn shutdown(&mut self) -> Option<String> {
        match self.controller.stop() {
            StopOutcome::Stopped { pid } => {
                info!("Web server (PID: {pid}) stopped on shutdown");
                Some(STOPPED_MESSAGE.to_string())
            }
            StopOutcome::NothingToStop => None,
        }
    }

    fn start_server(&mut self) -> String {
        match self.controller.start(&self.settings) {
            Ok(StartOutcome::Started { address, .. }) => {
                format!("Web server started successfully at {address}.")
            }
            Ok(StartOutcome::AlreadyRunning { .. }) => ALREADY_RUNNING_MESSAGE.to_string(),
            Err(e) => {
                error!("Error starting web server: {e}");
                format!("Error starting web server: {}", e.reason())
            }
        }
    }

    fn stop_server(&mut self) -> String {
        match self.controller.stop() {
            StopOutcome::Stopped { .. } => STOPPED_MESSAGE.to_string(),
            StopOutcome::NothingToStop => NOTHING_TO_STOP_MESSAGE.to_string(),
        }
    }

    fn change_ip(&mut self, raw: &str) -> String {
        let mut next = self.settings.clone();

        if let Err(e) = next.set_ip(raw) {
            return invalid_value(CHANGE_IP_USAGE, &e);
        }

        if let Err(message) = self.adopt(next) {
            return message;
        }

        let hint = self.restart_hint();
        format!("Web server IP address changed to {}{hint}", self.settings.ip)
    }

    fn change_port(&mut self, raw: &str) -> String {
        let mut next = self.settings.clone();

        if let Err(e) = next.set_port(raw) {
            return invalid_value(PORT_USAGE, &e);
        }

        if let Err(message) = self.adopt(next) {
            return message;
        }

        let hint = self.restart_hint();
        format!("Web server port changed to {}{hint}", self.settings.port)
    }

    /// Persist `next` and make it current; on failure the current record is kept.
    fn adopt(&mut self, next: ServerSettings) -> Result<(), String> {
        match self.store.save(&next) {
            Ok(()) => {
                self.settings = next;
                Ok(())
            }
            Err(e) => {
                error!("Failed to save settings: {e}");
                Err(format!("Failed to save settings: {}", e.reason()))
            }
        }
    }

    fn restart_hint(&mut self) -> &'static str {
        if self.controller.is_running() {
            APPLY_ON_RESTART_HINT
        } else {
            ""
        }
    }
}

fn invalid_value(usage: &str, e: &SettingsError) -> String {
    debug!("{e}");
    format!("Invalid command format. Use: {usage} ({})", e.reason())
}
