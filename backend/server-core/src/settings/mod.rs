//! Persisted bind address shared by the console and the file server.
//!
//! The record lives in a small JSON file (`{"ip": ..., "port": ...}`) that both
//! programs read at startup. Loading never fails: anything short of a valid record
//! yields [`ServerSettings::default`].

use crate::error::settings::SettingsError;
use crate::{DEFAULT_IP, DEFAULT_PORT};

use common::ErrorLocation;

use std::fs::{create_dir_all, read_to_string, remove_file, rename, write};
use std::io::ErrorKind;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

const TEMP_FILE_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_ip")]
    pub ip: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            port: default_port(),
        }
    }
}

fn default_ip() -> String {
    DEFAULT_IP.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ServerSettings {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    /// `ip:port`, as shown to the user.
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    /// Validate a record read from disk or about to be written.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Validation`] if the ip is empty or contains
    /// whitespace, or if the port is 0.
    #[track_caller]
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_ip(&self.ip)?;

        if self.port == 0 {
            return Err(SettingsError::Validation {
                location: ErrorLocation::from(Location::caller()),
                reason: "Port must be between 1 and 65535".to_string(),
            });
        }

        Ok(())
    }

    /// Replace the ip with `raw`, stripped of surrounding double quotes.
    ///
    /// The record is left untouched when `raw` is rejected.
    #[track_caller]
    pub fn set_ip(&mut self, raw: &str) -> Result<(), SettingsError> {
        let ip = raw.trim().trim_matches('"');
        check_ip(ip)?;

        debug!("Server ip changed from {} to {ip}", self.ip);
        self.ip = ip.to_string();
        Ok(())
    }

    /// Replace the port with the decimal number in `raw`.
    ///
    /// The record is left untouched when `raw` is rejected.
    #[track_caller]
    pub fn set_port(&mut self, raw: &str) -> Result<(), SettingsError> {
        let raw = raw.trim();

        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SettingsError::Validation {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid port '{raw}': expected a decimal number"),
            });
        }

        let port = match raw.parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => {
                return Err(SettingsError::Validation {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!("Invalid port '{raw}': must be between 1 and 65535"),
                });
            }
        };

        debug!("Server port changed from {} to {port}", self.port);
        self.port = port;
        Ok(())
    }
}

#[track_caller]
fn check_ip(ip: &str) -> Result<(), SettingsError> {
    if ip.is_empty() {
        return Err(SettingsError::Validation {
            location: ErrorLocation::from(Location::caller()),
            reason: "IP address cannot be empty".to_string(),
        });
    }

    if ip.chars().any(char::is_whitespace) {
        return Err(SettingsError::Validation {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("Invalid IP address '{ip}': must be a single token"),
        });
    }

    Ok(())
}

/// Reads and writes [`ServerSettings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings, falling back to defaults on any error.
    ///
    /// Failures are logged, never returned.
    pub fn load(&self) -> ServerSettings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings, using defaults: {e}");
                ServerSettings::default()
            }
        }
    }

    /// Load the settings, reporting why a present file could not be used.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file does not exist.
    /// Returns `Err(SettingsError)` if the file exists but is unreadable, corrupt or invalid.
    pub fn try_load(&self) -> Result<ServerSettings, SettingsError> {
        let contents = match read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "{} not found, using default settings",
                    self.path.display()
                );
                return Ok(ServerSettings::default());
            }
            Err(e) => {
                return Err(SettingsError::Read {
                    location: ErrorLocation::from(Location::caller()),
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let settings: ServerSettings =
            serde_json::from_str(&contents).map_err(|e| SettingsError::Parse {
                location: ErrorLocation::from(Location::caller()),
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        settings.validate()?;

        info!(
            "Settings loaded from {}: {}",
            self.path.display(),
            settings.address()
        );
        Ok(settings)
    }

    /// Overwrite the settings file with `settings`.
    ///
    /// Writes a sibling temp file and renames it over the target, creating
    /// parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if validation, serialization, directory creation,
    /// the write or the rename fails.
    pub fn save(&self, settings: &ServerSettings) -> Result<(), SettingsError> {
        settings.validate()?;

        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(dir).map_err(|e| SettingsError::Write {
                location: ErrorLocation::from(Location::caller()),
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let json =
            serde_json::to_string_pretty(settings).map_err(|e| SettingsError::Serialize {
                location: ErrorLocation::from(Location::caller()),
                reason: e.to_string(),
            })?;

        let temp_path = self.path.with_extension(TEMP_FILE_SUFFIX);

        write(&temp_path, json).map_err(|e| SettingsError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        rename(&temp_path, &self.path).map_err(|e| {
            let _ = remove_file(&temp_path);
            SettingsError::Write {
                location: ErrorLocation::from(Location::caller()),
                path: self.path.clone(),
                source: e,
            }
        })?;

        info!(
            "Settings saved to {}: {}",
            self.path.display(),
            settings.address()
        );
        Ok(())
    }
}
