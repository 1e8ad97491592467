//! Lifecycle management for the file-server child process.
//!
//! The controller owns at most one child at a time and moves between two states:
//!
//! - **Stopped**: no child is tracked, or the tracked child has exited on its own
//! - **Running**: a child was spawned, announced its listening address, and has not exited
//!
//! Liveness is checked with a non-blocking `try_wait` before every operation, so a
//! child that crashed is treated as stopped without an explicit [`ServerController::stop`].

pub mod process;

use crate::error::spawn::SpawnError;
use crate::settings::ServerSettings;
use crate::{FILE_SERVER_EXECUTABLE, SETTINGS_FILE_NAME};

use process::{
    build_spawn_command, force_kill, request_termination, wait_for_exit, watch_stdout,
};

use common::ErrorLocation;

use std::env::current_exe;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use log::{debug, error, info, warn};

const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the file server lives and how long the controller waits on it.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub server_binary: PathBuf,
    pub settings_path: PathBuf,
    pub serve_root: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub startup_timeout: Duration,
    pub stop_timeout: Duration,
}

impl ControllerConfig {
    pub fn new(
        server_binary: impl Into<PathBuf>,
        settings_path: impl Into<PathBuf>,
        serve_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            server_binary: server_binary.into(),
            settings_path: settings_path.into(),
            serve_root: serve_root.into(),
            log_dir: None,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    /// Config for an installation where the file server, the settings file and the
    /// served files all sit next to the current executable.
    #[track_caller]
    pub fn installed() -> Result<Self, SpawnError> {
        let dir = install_dir()?;

        Ok(Self::new(
            dir.join(FILE_SERVER_EXECUTABLE),
            dir.join(SETTINGS_FILE_NAME),
            dir,
        ))
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }
}

/// Directory containing the current executable.
#[track_caller]
pub fn install_dir() -> Result<PathBuf, SpawnError> {
    let exe = current_exe().map_err(|e| SpawnError::Spawn {
        message: format!("Failed to get current executable path: {e}"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })?;

    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| SpawnError::Spawn {
            message: format!("Executable has no parent directory: {}", exe.display()),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(IoError::new(ErrorKind::NotFound, "no parent dir")),
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { pid: u32, address: String },
    AlreadyRunning { pid: u32, address: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped { pid: u32 },
    NothingToStop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    Stopped,
    Running { pid: u32, address: String },
}

impl ServerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ServerStatus::Running { .. })
    }
}

impl Display for ServerStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            ServerStatus::Stopped => write!(formatter, "STOPPED"),
            ServerStatus::Running { pid, address } => {
                write!(formatter, "RUNNING at {address} (PID: {pid})")
            }
        }
    }
}

struct ServerProcess {
    child: Child,
    pid: u32,
    address: String,
}

/// Owns the file-server child process.
pub struct ServerController {
    config: ControllerConfig,
    process: Option<ServerProcess>,
}

impl ServerController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            process: None,
        }
    }

    /// Spawn the file server and wait until it announces its listening address.
    ///
    /// The child reads its bind address from the settings file, so `settings` must
    /// already be persisted; it is used here for reporting only.
    ///
    /// # Returns
    ///
    /// * `Ok(StartOutcome::Started)` - A new child is listening
    /// * `Ok(StartOutcome::AlreadyRunning)` - A live child was already tracked; nothing was spawned
    /// * `Err(SpawnError)` - The child could not be spawned, exited early, or never became ready
    pub fn start(&mut self, settings: &ServerSettings) -> Result<StartOutcome, SpawnError> {
        self.refresh_liveness();

        if let Some(process) = &self.process {
            info!(
                "File server already running at {} (PID: {})",
                process.address, process.pid
            );
            return Ok(StartOutcome::AlreadyRunning {
                pid: process.pid,
                address: process.address.clone(),
            });
        }

        let address = settings.address();
        let binary = self.config.server_binary.display().to_string();

        info!("Starting file server {binary} for {address}");

        let mut child = build_spawn_command(&self.config)
            .spawn()
            .map_err(|e| SpawnError::Spawn {
                message: format!("Failed to spawn {binary}: {e}"),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })?;

        let pid = child.id();
        debug!("Spawned {binary} (PID: {pid})");

        let Some(stdout) = child.stdout.take() else {
            force_kill(&mut child);
            return Err(SpawnError::Parse {
                message: "Child process has no stdout".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let ready = match watch_stdout(stdout, pid) {
            Ok(ready) => ready,
            Err(e) => {
                force_kill(&mut child);
                return Err(SpawnError::Spawn {
                    message: format!("Failed to watch file server output: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                    source: Box::new(e),
                });
            }
        };

        match ready.recv_timeout(self.config.startup_timeout) {
            Ok(listening) => {
                if listening.port != settings.port {
                    warn!(
                        "File server reported port {}, expected {}",
                        listening.port, settings.port
                    );
                }

                info!(
                    "File server listening on {}:{} (PID: {pid})",
                    listening.host, listening.port
                );

                self.process = Some(ServerProcess {
                    child,
                    pid,
                    address: address.clone(),
                });

                Ok(StartOutcome::Started { pid, address })
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "File server (PID: {pid}) not ready after {:?}, killing it",
                    self.config.startup_timeout
                );
                force_kill(&mut child);

                Err(SpawnError::Timeout {
                    message: format!(
                        "File server did not report a listening address within {:?}",
                        self.config.startup_timeout
                    ),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                let status = wait_for_exit(&mut child, self.config.stop_timeout)
                    .or_else(|| force_kill(&mut child))
                    .map(|status| status.to_string())
                    .unwrap_or_else(|| String::from("unknown status"));

                error!("File server (PID: {pid}) exited before listening: {status}");

                Err(SpawnError::Exited {
                    message: format!(
                        "File server exited before listening on {address} ({status})"
                    ),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Terminate the tracked child.
    ///
    /// Sends a graceful termination request, waits up to the configured stop timeout,
    /// then kills the child if it is still alive. Calling this when nothing runs is a
    /// no-op that returns [`StopOutcome::NothingToStop`].
    pub fn stop(&mut self) -> StopOutcome {
        self.refresh_liveness();

        let Some(mut process) = self.process.take() else {
            debug!("Stop requested but no file server is running");
            return StopOutcome::NothingToStop;
        };

        let pid = process.pid;
        info!("Stopping file server (PID: {pid})");

        if !request_termination(pid) {
            warn!("Termination request for PID {pid} not delivered, killing it");
            force_kill(&mut process.child);
            return StopOutcome::Stopped { pid };
        }

        match wait_for_exit(&mut process.child, self.config.stop_timeout) {
            Some(status) => info!("File server (PID: {pid}) stopped: {status}"),
            None => {
                warn!(
                    "File server (PID: {pid}) still running after {:?}, killing it",
                    self.config.stop_timeout
                );
                force_kill(&mut process.child);
            }
        }

        StopOutcome::Stopped { pid }
    }

    pub fn status(&mut self) -> ServerStatus {
        self.refresh_liveness();

        match &self.process {
            Some(process) => ServerStatus::Running {
                pid: process.pid,
                address: process.address.clone(),
            },
            None => ServerStatus::Stopped,
        }
    }

    pub fn is_running(&mut self) -> bool {
        self.status().is_running()
    }

    /// Forget the tracked child if it has exited on its own.
    fn refresh_liveness(&mut self) {
        let Some(process) = self.process.as_mut() else {
            return;
        };

        match process.child.try_wait() {
            Ok(Some(status)) => {
                warn!(
                    "File server (PID: {}) exited on its own: {status}",
                    process.pid
                );
                self.process = None;
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to poll file server (PID: {}): {e}", process.pid),
        }
    }
}

impl Drop for ServerController {
    fn drop(&mut self) {
        if let StopOutcome::Stopped { pid } = self.stop() {
            debug!("File server (PID: {pid}) stopped on controller drop");
        }
    }
}
