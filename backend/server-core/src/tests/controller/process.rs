// Unit tests for controller::process private helpers
// Lifecycle tests against real children are in integration_tests/controller.rs

use crate::controller::ControllerConfig;
use crate::controller::process::{
    ReadyAddress, build_spawn_command, parse_ready_line, with_process,
};
use crate::{LOG_DIR_FLAG, ROOT_FLAG, SETTINGS_FLAG};

use std::ffi::OsStr;

/// **VALUE**: Verifies that the spawn command points at the configured binary and passes
/// the settings file and serve root.
///
/// **WHY THIS MATTERS**: The child reads its bind address from the settings file. If the
/// path is not passed, the child reads a different file than the console writes.
///
/// **BUG THIS CATCHES**: Would catch dropped or reordered flag/value pairs.
#[test]
fn given_config_when_build_spawn_command_called_then_passes_settings_and_root() {
    // GIVEN: A controller config without a log dir
    let config = ControllerConfig::new("/opt/webserve/webserve-fileserver", "/etc/ws.json", "/srv");

    // WHEN: Building the spawn command
    let cmd = build_spawn_command(&config);

    // THEN: Program and args should match the config
    assert_eq!(cmd.get_program(), OsStr::new("/opt/webserve/webserve-fileserver"));
    let args: Vec<&OsStr> = cmd.get_args().collect();
    assert_eq!(
        args,
        vec![
            OsStr::new(SETTINGS_FLAG),
            OsStr::new("/etc/ws.json"),
            OsStr::new(ROOT_FLAG),
            OsStr::new("/srv"),
        ]
    );
}

/// **VALUE**: Verifies that a configured log dir is forwarded to the child.
///
/// **WHY THIS MATTERS**: Both programs should log into the same directory so a crashed
/// child's log sits next to the console's.
///
/// **BUG THIS CATCHES**: Would catch ignoring `with_log_dir`.
#[test]
fn given_log_dir_when_build_spawn_command_called_then_appends_log_dir_flag() {
    // GIVEN: A config with a log dir
    let config = ControllerConfig::new("fs", "config.json", ".").with_log_dir("/var/log/ws");

    // WHEN: Building the spawn command
    let cmd = build_spawn_command(&config);

    // THEN: The last two args should be the log dir flag and value
    let args: Vec<&OsStr> = cmd.get_args().collect();
    assert_eq!(&args[4..], &[OsStr::new(LOG_DIR_FLAG), OsStr::new("/var/log/ws")]);
}

/// **VALUE**: Verifies that the readiness regex extracts host and port.
///
/// **WHY THIS MATTERS**: `start` only reports success after seeing this line. If the
/// regex breaks, every start times out even though the server is listening.
///
/// **BUG THIS CATCHES**: Would catch renamed capture groups or a changed prefix.
#[test]
fn given_ready_line_when_parsed_then_returns_host_and_port() {
    // GIVEN: Readiness lines for IPv4, hostname and IPv6 listeners
    let cases = vec![
        ("Serving at http://127.0.0.1:8000", "127.0.0.1", 8000),
        ("Serving at http://localhost:9090", "localhost", 9090),
        ("Serving at http://[::1]:65535", "[::1]", 65535),
    ];

    // WHEN/THEN: Each should parse
    for (line, host, port) in cases {
        assert_eq!(
            parse_ready_line(line),
            Some(ReadyAddress {
                host: host.to_string(),
                port
            }),
            "Should parse: {line}"
        );
    }
}

/// **VALUE**: Verifies that unrelated output is not mistaken for readiness.
///
/// **WHY THIS MATTERS**: A false match would mark the server RUNNING before it binds,
/// hiding a port-in-use failure.
///
/// **BUG THIS CATCHES**: Would catch a regex that drops the prefix or accepts a missing port.
#[test]
fn given_other_output_when_parsed_then_returns_none() {
    // GIVEN: Lines that are not readiness announcements
    let invalid_cases = vec![
        "",
        "http://127.0.0.1:8000",
        "Serving at http://127.0.0.1",
        "Serving at ftp://127.0.0.1:21",
        "Serving at http://127.0.0.1:99999",
        "Failed to bind 127.0.0.1:8000",
    ];

    // WHEN/THEN: None should parse
    for line in invalid_cases {
        assert!(parse_ready_line(line).is_none(), "Should not parse: {line}");
    }
}

/// **VALUE**: Verifies that `with_process()` finds the current process.
///
/// **WHY THIS MATTERS**: Graceful termination looks the child up through this helper.
/// If the lookup fails, every stop falls back to a hard kill.
///
/// **BUG THIS CATCHES**: Would catch refreshing the wrong PID set before the lookup.
#[test]
fn given_own_pid_when_with_process_called_then_executes_closure() {
    // GIVEN: Our own PID
    let our_pid = std::process::id();

    // WHEN: Looking it up
    let result = with_process(our_pid, |p| p.pid().as_u32());

    // THEN: The closure should run with our process
    assert_eq!(result, Some(our_pid));
}

/// **VALUE**: Verifies that `with_process()` returns None for PIDs that do not exist.
///
/// **WHY THIS MATTERS**: A child can exit between the liveness check and the stop.
///
/// **BUG THIS CATCHES**: Would catch a panic on a missing process.
#[test]
fn given_nonexistent_pid_when_with_process_called_then_returns_none() {
    // GIVEN: A PID that does not exist
    let fake_pid = u32::MAX;

    // WHEN/THEN: Lookup returns None
    assert!(with_process(fake_pid, |_| true).is_none());
}
