use crate::helpers::{INDEX_BODY, Workspace, eventually, free_port, http_get, port_accepts};

use server_core::controller::{ServerStatus, StartOutcome, StopOutcome};
use server_core::error::spawn::SpawnError;

use std::net::TcpListener;
use std::time::Duration;

use serial_test::serial;
use sysinfo::{Pid, ProcessesToUpdate, System};

// ============================================================================
// Start/stop against the real webserve-fileserver binary
// ============================================================================

/// **VALUE**: Verifies the full happy path: start, serve a page, stop.
///
/// **WHY THIS MATTERS**: This is the one thing the console exists to do. Start must
/// only report success once the port actually accepts connections.
///
/// **BUG THIS CATCHES**: Would catch reporting readiness before bind, the child reading
/// a different settings file, or stop leaving the port bound.
#[test]
#[serial]
fn given_saved_settings_when_started_then_serves_files_until_stopped() {
    // GIVEN: Settings on a free port
    let workspace = Workspace::new();
    let port = free_port();
    let settings = workspace.save_settings(port);
    let mut controller = workspace.controller();

    // WHEN: Starting
    let outcome = controller.start(&settings).unwrap();

    // THEN: Started at the saved address and serving the index page
    let StartOutcome::Started { pid, address } = outcome else {
        panic!("Expected Started, got {outcome:?}");
    };
    assert_eq!(address, settings.address());
    assert_eq!(
        controller.status(),
        ServerStatus::Running {
            pid,
            address: address.clone()
        }
    );

    let (status, body) = http_get(port, "/");
    assert_eq!(status, 200);
    assert_eq!(body, INDEX_BODY);

    // WHEN: Stopping
    let stopped = controller.stop();

    // THEN: Stopped, and the port no longer accepts connections
    assert_eq!(stopped, StopOutcome::Stopped { pid });
    assert_eq!(controller.status(), ServerStatus::Stopped);
    assert!(eventually(Duration::from_secs(2), || !port_accepts(port)));
}

/// **VALUE**: Verifies a second start does not spawn a second child.
///
/// **BUG THIS CATCHES**: Would catch a start that ignores the tracked child and fails
/// with "address in use" or, worse, orphans the first child.
#[test]
#[serial]
fn given_running_server_when_started_again_then_already_running_with_same_pid() {
    // GIVEN: A running server
    let workspace = Workspace::new();
    let settings = workspace.save_settings(free_port());
    let mut controller = workspace.controller();
    let StartOutcome::Started { pid, .. } = controller.start(&settings).unwrap() else {
        panic!("First start should spawn");
    };

    // WHEN: Starting again
    let second = controller.start(&settings).unwrap();

    // THEN: Same child reported
    assert_eq!(
        second,
        StartOutcome::AlreadyRunning {
            pid,
            address: settings.address()
        }
    );

    // Cleanup
    assert_eq!(controller.stop(), StopOutcome::Stopped { pid });
    assert_eq!(controller.stop(), StopOutcome::NothingToStop);
}

/// **VALUE**: Verifies a port change takes effect on the next start.
///
/// **WHY THIS MATTERS**: Settings are read by the child at startup; the console tells
/// the user to restart, so the restart must bind the new port.
///
/// **BUG THIS CATCHES**: Would catch the child reading a stale or different file.
#[test]
#[serial]
fn given_port_changed_when_restarted_then_binds_new_port() {
    // GIVEN: A server started on one port
    let workspace = Workspace::new();
    let first_port = free_port();
    let first = workspace.save_settings(first_port);
    let mut controller = workspace.controller();
    controller.start(&first).unwrap();

    // WHEN: Saving another port and restarting
    let second_port = free_port();
    let second = workspace.save_settings(second_port);
    controller.stop();
    let outcome = controller.start(&second).unwrap();

    // THEN: The new port serves, the old one doesn't
    assert!(matches!(outcome, StartOutcome::Started { .. }));
    assert_eq!(http_get(second_port, "/index.html").0, 200);
    assert!(eventually(Duration::from_secs(2), || !port_accepts(first_port)));

    controller.stop();
}

/// **VALUE**: Verifies a child killed behind the controller's back reads as stopped.
///
/// **WHY THIS MATTERS**: Without a liveness check, `start` would answer "already
/// running" forever after the server crashed.
///
/// **BUG THIS CATCHES**: Would catch status trusting the stored handle without polling.
#[test]
#[serial]
fn given_child_killed_externally_when_status_checked_then_stopped() {
    // GIVEN: A running server
    let workspace = Workspace::new();
    let settings = workspace.save_settings(free_port());
    let mut controller = workspace.controller();
    let StartOutcome::Started { pid, .. } = controller.start(&settings).unwrap() else {
        panic!("Start should spawn");
    };

    // WHEN: Killing the child directly
    let sys_pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), true);
    let killed = system.process(sys_pid).map(|p| p.kill()).unwrap_or(false);
    assert!(killed, "Test setup: child should be killable");

    // THEN: The controller notices, and stop has nothing to do
    assert!(eventually(Duration::from_secs(5), || {
        controller.status() == ServerStatus::Stopped
    }));
    assert_eq!(controller.stop(), StopOutcome::NothingToStop);
}

/// **VALUE**: Verifies a port already in use is reported as an early exit.
///
/// **WHY THIS MATTERS**: The console must not claim success when the child could not
/// bind; the user needs to pick another port.
///
/// **BUG THIS CATCHES**: Would catch start waiting for the full timeout or reporting
/// Started after the child died.
#[test]
#[serial]
fn given_port_in_use_when_started_then_exited_error_and_stopped() {
    // GIVEN: Another listener on the configured port
    let blocker = TcpListener::bind(("127.0.0.1", 0)).unwrap();
    let port = blocker.local_addr().unwrap().port();
    let workspace = Workspace::new();
    let settings = workspace.save_settings(port);
    let mut controller = workspace.controller();

    // WHEN: Starting
    let result = controller.start(&settings);

    // THEN: Exited error, nothing tracked
    assert!(
        matches!(result, Err(SpawnError::Exited { .. })),
        "Unexpected result: {result:?}"
    );
    assert_eq!(controller.status(), ServerStatus::Stopped);

    drop(blocker);
}

/// **VALUE**: Verifies dropping the controller stops the child.
///
/// **BUG THIS CATCHES**: Would catch an orphaned file server after the console exits
/// through an error path that skips `stop`.
#[test]
#[serial]
fn given_running_server_when_controller_dropped_then_port_released() {
    let workspace = Workspace::new();
    let port = free_port();
    let settings = workspace.save_settings(port);
    let mut controller = workspace.controller();
    controller.start(&settings).unwrap();
    assert!(port_accepts(port));

    drop(controller);

    assert!(eventually(Duration::from_secs(2), || !port_accepts(port)));
}
