use server_core::controller::{
    ControllerConfig, ServerController, ServerStatus, StartOutcome, StopOutcome,
};
use server_core::error::spawn::SpawnError;
use server_core::settings::ServerSettings;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serial_test::serial;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tempfile::TempDir;

// ============================================================================
// Controller failure paths that need no real file server
// End-to-end lifecycle tests live in the webserve app crate, next to the binary
// ============================================================================

/// A child that never announces a listening address.
#[cfg(unix)]
const SILENT_SCRIPT: &str = "#!/bin/sh\nexec sleep 30\n";

/// A child that announces readiness and then ignores SIGTERM.
#[cfg(unix)]
const STUBBORN_SCRIPT: &str = "#!/bin/sh\ntrap '' TERM\necho 'Serving at http://127.0.0.1:8000'\nwhile true; do sleep 0.1; done\n";

fn config_for(binary: &str, dir: &TempDir) -> ControllerConfig {
    ControllerConfig::new(binary, dir.path().join("config.json"), dir.path())
        .with_startup_timeout(Duration::from_secs(2))
        .with_stop_timeout(Duration::from_secs(2))
}

/// **VALUE**: Verifies that a missing binary reports a spawn error and stays stopped.
///
/// **WHY THIS MATTERS**: A broken installation must produce a readable error, not a
/// controller that believes a server is running.
///
/// **BUG THIS CATCHES**: Would catch storing a handle before the spawn succeeds.
#[test]
#[serial]
fn given_missing_binary_when_start_called_then_returns_spawn_error_and_stays_stopped() {
    // GIVEN: A controller pointing at a binary that does not exist
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-such-fileserver");
    let mut controller = ServerController::new(config_for(missing.to_str().unwrap(), &dir));

    // WHEN: Starting
    let result = controller.start(&ServerSettings::default());

    // THEN: Spawn error, still stopped
    assert!(matches!(result, Err(SpawnError::Spawn { .. })));
    assert_eq!(controller.status(), ServerStatus::Stopped);
}

/// **VALUE**: Verifies that stopping with nothing running is an idempotent no-op.
///
/// **WHY THIS MATTERS**: The exit path always calls stop.
///
/// **BUG THIS CATCHES**: Would catch stop panicking on an empty handle.
#[test]
fn given_no_server_when_stop_called_twice_then_both_report_nothing_to_stop() {
    // GIVEN: A fresh controller
    let dir = TempDir::new().unwrap();
    let mut controller = ServerController::new(config_for("webserve-fileserver", &dir));

    // WHEN: Stopping twice
    let first = controller.stop();
    let second = controller.stop();

    // THEN: Both are no-ops
    assert_eq!(first, StopOutcome::NothingToStop);
    assert_eq!(second, StopOutcome::NothingToStop);
    assert!(!controller.is_running());
}

/// **VALUE**: Verifies that a child exiting before its readiness line is reported.
///
/// **WHY THIS MATTERS**: This is how "port already in use" shows up: the file server
/// fails to bind and exits.
///
/// **BUG THIS CATCHES**: Would catch reporting success as soon as the spawn returns, or
/// waiting for the full startup timeout.
#[cfg(unix)]
#[test]
#[serial]
fn given_child_that_exits_immediately_when_start_called_then_returns_exited_error() {
    // GIVEN: A "server" that exits at once without output
    let dir = TempDir::new().unwrap();
    let mut controller = ServerController::new(config_for("true", &dir));

    // WHEN: Starting
    let result = controller.start(&ServerSettings::default());

    // THEN: Exited error, not running
    assert!(
        matches!(result, Err(SpawnError::Exited { .. })),
        "Expected Exited, got {result:?}"
    );
    assert_eq!(controller.status(), ServerStatus::Stopped);
}

/// **VALUE**: Verifies the installed-layout defaults.
///
/// **WHY THIS MATTERS**: The file server is shipped next to the console executable and
/// serves its own installation directory.
///
/// **BUG THIS CATCHES**: Would catch defaults relative to the working directory.
#[test]
fn given_installed_layout_when_config_built_then_paths_share_exe_dir() {
    // GIVEN/WHEN: The installed config
    let config = ControllerConfig::installed().unwrap();
    let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();

    // THEN: All paths sit in the executable directory
    assert_eq!(config.serve_root, exe_dir);
    assert_eq!(config.settings_path, exe_dir.join("config.json"));
    assert!(config.server_binary.starts_with(&exe_dir));
    assert!(config.log_dir.is_none());
}

/// Write `body` as an executable script in `dir`.
#[cfg(unix)]
fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    use std::fs::{Permissions, set_permissions, write};
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join(name);
    write(&path, body).unwrap();
    set_permissions(&path, Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
fn process_exists(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).is_some()
}

/// **VALUE**: Verifies that a child which never reports readiness is killed after the
/// startup timeout.
///
/// **WHY THIS MATTERS**: A file server that hangs before binding would otherwise block
/// `start` forever and leave an orphan behind.
///
/// **BUG THIS CATCHES**: Would catch an unbounded readiness wait, returning without
/// killing the child, or tracking the hung child as running.
#[cfg(unix)]
#[test]
#[serial]
fn given_silent_child_when_start_called_then_times_out_and_stays_stopped() {
    // GIVEN: A child that sleeps without printing anything, and a short startup timeout
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "silent.sh", SILENT_SCRIPT);
    let config = ControllerConfig::new(script, dir.path().join("config.json"), dir.path())
        .with_startup_timeout(Duration::from_millis(500))
        .with_stop_timeout(Duration::from_secs(2));
    let mut controller = ServerController::new(config);

    // WHEN: Starting
    let started_at = Instant::now();
    let result = controller.start(&ServerSettings::default());
    let elapsed = started_at.elapsed();

    // THEN: Timeout error well before the child's own 30s sleep, and nothing tracked
    assert!(
        matches!(result, Err(SpawnError::Timeout { .. })),
        "Expected Timeout, got {result:?}"
    );
    assert!(elapsed >= Duration::from_millis(500), "Returned too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(10), "Returned too late: {elapsed:?}");
    assert_eq!(controller.status(), ServerStatus::Stopped);
    assert_eq!(controller.stop(), StopOutcome::NothingToStop);
}

/// **VALUE**: Verifies that a child ignoring SIGTERM is force-killed after the stop
/// timeout.
///
/// **WHY THIS MATTERS**: `exit` and Ctrl-C call stop; a child that ignores the polite
/// request must not keep the console from closing or outlive it.
///
/// **BUG THIS CATCHES**: Would catch a stop that waits forever, or one that clears the
/// handle while the child is still alive.
#[cfg(unix)]
#[test]
#[serial]
fn given_child_ignoring_sigterm_when_stop_called_then_force_killed() {
    // GIVEN: A running child that traps SIGTERM, and a short stop timeout
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "stubborn.sh", STUBBORN_SCRIPT);
    let config = ControllerConfig::new(script, dir.path().join("config.json"), dir.path())
        .with_startup_timeout(Duration::from_secs(5))
        .with_stop_timeout(Duration::from_millis(700));
    let mut controller = ServerController::new(config);
    let StartOutcome::Started { pid, .. } = controller.start(&ServerSettings::default()).unwrap()
    else {
        panic!("Stubborn child should report readiness");
    };

    // WHEN: Stopping
    let stopped_at = Instant::now();
    let outcome = controller.stop();
    let elapsed = stopped_at.elapsed();

    // THEN: Stopped within a bounded time, the process is gone, and stop is idempotent
    assert_eq!(outcome, StopOutcome::Stopped { pid });
    assert!(elapsed < Duration::from_secs(10), "Stop took too long: {elapsed:?}");
    assert!(!process_exists(pid), "Child {pid} should have been killed");
    assert_eq!(controller.status(), ServerStatus::Stopped);
    assert_eq!(controller.stop(), StopOutcome::NothingToStop);
}
