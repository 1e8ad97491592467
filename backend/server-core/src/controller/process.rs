use crate::controller::ControllerConfig;
use crate::{LOG_DIR_FLAG, READY_LINE_PREFIX, ROOT_FLAG, SETTINGS_FLAG};

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::OnceLock;
use std::sync::mpsc::{Receiver, sync_channel};
use std::thread::{Builder as ThreadBuilder, sleep};
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, trace, warn};
use regex::Regex;
use sysinfo::{Pid, Process, ProcessesToUpdate, Signal, System};

const READY_URL_PATTERN: &str = r"http://(?P<host>\[[^\]\s]+\]|[^\s:/\[\]]+):(?P<port>\d+)";
const URL_CAPTURE_HOST: &str = "host";
const URL_CAPTURE_PORT: &str = "port";
const EXIT_POLL_INITIAL_INTERVAL: Duration = Duration::from_millis(25);
const EXIT_POLL_MAX_INTERVAL: Duration = Duration::from_millis(500);
const STDOUT_READER_NAME: &str = "file-server-stdout";

static READY_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_ready_regex() -> &'static Regex {
    READY_REGEX.get_or_init(|| {
        let pattern = format!("{}{READY_URL_PATTERN}", regex::escape(READY_LINE_PREFIX));
        Regex::new(&pattern).expect("valid regex pattern")
    })
}

/// Host and port announced by a readiness line, e.g. `Serving at http://127.0.0.1:8000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReadyAddress {
    pub host: String,
    pub port: u16,
}

pub(crate) fn parse_ready_line(line: &str) -> Option<ReadyAddress> {
    let caps = get_ready_regex().captures(line)?;
    let host = caps.name(URL_CAPTURE_HOST)?.as_str().to_string();
    let port = caps.name(URL_CAPTURE_PORT)?.as_str().parse::<u16>().ok()?;

    Some(ReadyAddress { host, port })
}

pub(crate) fn build_spawn_command(config: &ControllerConfig) -> Command {
    let mut cmd = Command::new(&config.server_binary);
    cmd.arg(SETTINGS_FLAG)
        .arg(&config.settings_path)
        .arg(ROOT_FLAG)
        .arg(&config.serve_root);

    if let Some(log_dir) = &config.log_dir {
        cmd.arg(LOG_DIR_FLAG).arg(log_dir);
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    cmd
}

/// Drain the child's stdout on a background thread.
///
/// The first readiness line is forwarded on the returned channel. The channel
/// disconnects without a value if stdout closes first, which means the child exited
/// (or closed stdout) before it was listening.
pub(crate) fn watch_stdout(stdout: ChildStdout, pid: u32) -> std::io::Result<Receiver<ReadyAddress>> {
    let (tx, rx) = sync_channel(1);

    ThreadBuilder::new()
        .name(format!("{STDOUT_READER_NAME}-{pid}"))
        .spawn(move || {
            let mut announced = false;

            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                trace!("File server (PID: {pid}) stdout: {line}");

                if !announced && let Some(ready) = parse_ready_line(&line) {
                    announced = true;
                    let _ = tx.send(ready);
                }
            }

            debug!("File server (PID: {pid}) closed stdout");
        })?;

    Ok(rx)
}

#[track_caller]
pub(crate) fn with_process<F, R>(pid: u32, f: F) -> Option<R>
where
    F: FnOnce(&Process) -> R,
{
    let pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    sys.process(pid).map(f)
}

/// Ask a process to terminate.
///
/// Sends SIGTERM where the platform supports it, otherwise falls back to a plain kill.
///
/// # Returns
///
/// * `true` - If the request was delivered
/// * `false` - If the process could not be found or signalled
pub(crate) fn request_termination(pid: u32) -> bool {
    with_process(pid, |p| {
        if let Some(sent) = p.kill_with(Signal::Term) {
            debug!("Sent SIGTERM to PID {pid}: success={sent}");
            sent
        } else {
            let killed = p.kill();
            debug!("Sent kill to PID {pid}: success={killed}");
            killed
        }
    })
    .unwrap_or_else(|| {
        debug!("Process {pid} not found");
        false
    })
}

/// Poll `child` with exponential backoff until it exits or `max_elapsed` passes.
///
/// Reaps the child on exit. Returns `None` if it is still running at the deadline.
pub(crate) fn wait_for_exit(child: &mut Child, max_elapsed: Duration) -> Option<ExitStatus> {
    let pid = child.id();
    let mut backoff = ExponentialBackoff {
        initial_interval: EXIT_POLL_INITIAL_INTERVAL,
        max_interval: EXIT_POLL_MAX_INTERVAL,
        max_elapsed_time: Some(max_elapsed),
        ..Default::default()
    };

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("Process {pid} exited with {status}");
                return Some(status);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to poll process {pid}: {e}");
                return None;
            }
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Process {pid} still alive, retrying after {duration:?}");
                sleep(duration);
            }
            None => {
                debug!("Process {pid} still running after {max_elapsed:?}");
                return None;
            }
        }
    }
}

/// Kill `child` outright and reap it.
pub(crate) fn force_kill(child: &mut Child) -> Option<ExitStatus> {
    let pid = child.id();

    if let Err(e) = child.kill() {
        warn!("Failed to kill process {pid}: {e}");
    }

    match child.wait() {
        Ok(status) => {
            debug!("Process {pid} killed: {status}");
            Some(status)
        }
        Err(e) => {
            warn!("Failed to reap process {pid}: {e}");
            None
        }
    }
}
