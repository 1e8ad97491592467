use crate::helpers::{Workspace, free_port, http_get};

use webserve::console::{ALREADY_RUNNING_MESSAGE, Console, NOTHING_TO_STOP_MESSAGE, STOPPED_MESSAGE};

use server_core::settings::ServerSettings;

use serial_test::serial;

// ============================================================================
// Console sessions driving the real file server
// ============================================================================

/// **VALUE**: Walks the typical session: set address, start, inspect, stop, exit.
///
/// **WHY THIS MATTERS**: This is the sequence a user types. Every reply text is part of
/// the console's contract.
///
/// **BUG THIS CATCHES**: Would catch the console starting the server with stale
/// settings or printing the wrong address.
#[test]
#[serial]
fn given_console_session_when_address_changed_and_started_then_serves_at_new_address() {
    // GIVEN: A console over a fresh workspace
    let workspace = Workspace::new();
    let port = free_port();
    let mut console = Console::new(workspace.store(), workspace.controller());

    // WHEN: Setting the address
    let ip_reply = console.execute_line("--webserver change ip \"127.0.0.1\"");
    let port_reply = console.execute_line(&format!("--webserver port {port}"));

    // THEN: Both changes confirmed
    assert_eq!(ip_reply.message, "Web server IP address changed to 127.0.0.1");
    assert_eq!(port_reply.message, format!("Web server port changed to {port}"));

    // WHEN: Starting
    let start_reply = console.execute_line("--webserver start");

    // THEN: Started at the new address, and it serves
    assert_eq!(
        start_reply.message,
        format!("Web server started successfully at 127.0.0.1:{port}.")
    );
    assert_eq!(http_get(port, "/").0, 200);
    assert!(
        console
            .execute_line("--webserver ip address")
            .message
            .contains(&port.to_string())
    );
    assert!(
        console
            .execute_line("--webserver status")
            .message
            .starts_with(&format!("Web server status: RUNNING at 127.0.0.1:{port} (PID: "))
    );

    // WHEN: Starting again, changing the port while running, then stopping
    let again = console.execute_line("--webserver start");
    let change_while_running = console.execute_line(&format!("--webserver port {}", free_port()));
    let stop_reply = console.execute_line("--webserver stop");
    let stop_again = console.execute_line("--webserver stop");

    // THEN: Duplicate start refused, restart hinted, stop confirmed once
    assert_eq!(again.message, ALREADY_RUNNING_MESSAGE);
    assert!(change_while_running.message.ends_with("(restart the web server to apply)"));
    assert_eq!(stop_reply.message, STOPPED_MESSAGE);
    assert_eq!(stop_again.message, NOTHING_TO_STOP_MESSAGE);
}

/// **VALUE**: Verifies `exit` stops a running server.
///
/// **BUG THIS CATCHES**: Would catch exit leaving the file server running after the
/// console closes.
#[test]
#[serial]
fn given_running_server_when_exit_executed_then_stopped_and_exit_requested() {
    // GIVEN: A console with a running server
    let workspace = Workspace::new();
    let port = free_port();
    workspace.save_settings(port);
    let mut console = Console::new(workspace.store(), workspace.controller());
    assert_eq!(console.settings(), &ServerSettings::new("127.0.0.1", port));
    console.execute_line("--webserver start");

    // WHEN: Exiting
    let reply = console.execute_line("exit");

    // THEN: Stop reported and the console asked to close
    assert!(reply.exit);
    assert_eq!(reply.message, STOPPED_MESSAGE);
    assert!(!console.status().is_running());
}
