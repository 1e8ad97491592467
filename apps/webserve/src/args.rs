//! Command-line arguments of the two programs.
//!
//! Flag names must match the ones the controller passes to the file server
//! (`server_core::SETTINGS_FLAG`, `ROOT_FLAG`, `LOG_DIR_FLAG`).

use crate::error::WebServeError;
use crate::logger::default_log_dir;

use server_core::SETTINGS_FILE_NAME;
use server_core::controller::{ControllerConfig, install_dir};

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "webserve",
    version,
    about = "Console for starting and stopping the WebServe static file server"
)]
pub struct PanelArgs {
    /// Settings file shared with the file server [default: config.json next to the executable]
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Directory the file server serves [default: the executable's directory]
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// File server executable [default: webserve-fileserver next to the executable]
    #[arg(long)]
    pub server_binary: Option<PathBuf>,

    /// Directory for log files of both programs
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl PanelArgs {
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }

    /// Installed defaults overridden by whatever flags were given.
    #[track_caller]
    pub fn controller_config(&self) -> Result<ControllerConfig, WebServeError> {
        let mut config = ControllerConfig::installed().map_err(|e| WebServeError::core(e))?;

        if let Some(settings) = &self.settings {
            config.settings_path = settings.clone();
        }
        if let Some(root) = &self.root {
            config.serve_root = root.clone();
        }
        if let Some(binary) = &self.server_binary {
            config.server_binary = binary.clone();
        }

        Ok(config.with_log_dir(self.log_dir()))
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "webserve-fileserver",
    version,
    about = "Static file server started by the WebServe console"
)]
pub struct FileServerArgs {
    /// Settings file holding the bind address [default: config.json next to the executable]
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Directory to serve [default: the executable's directory]
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Directory for the log file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl FileServerArgs {
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }

    #[track_caller]
    pub fn settings_path(&self) -> Result<PathBuf, WebServeError> {
        match &self.settings {
            Some(path) => Ok(path.clone()),
            None => Ok(install_dir()
                .map_err(|e| WebServeError::core(e))?
                .join(SETTINGS_FILE_NAME)),
        }
    }

    #[track_caller]
    pub fn serve_root(&self) -> Result<PathBuf, WebServeError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => install_dir().map_err(|e| WebServeError::core(e)),
        }
    }
}
