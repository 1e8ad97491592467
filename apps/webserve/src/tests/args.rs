// Unit tests for command-line arguments
// The controller builds the file server's command line from server_core's flag
// constants; these tests keep the two sides in agreement.

use crate::args::{FileServerArgs, PanelArgs};

use server_core::controller::install_dir;
use server_core::{LOG_DIR_FLAG, ROOT_FLAG, SETTINGS_FILE_NAME, SETTINGS_FLAG};

use std::path::PathBuf;

use clap::Parser;

/// **VALUE**: Verifies the file server accepts exactly the flags the controller passes.
///
/// **WHY THIS MATTERS**: A renamed flag on either side makes every spawned file server
/// exit with a usage error, which the console can only report as "exited early".
///
/// **BUG THIS CATCHES**: Would catch drift between `SETTINGS_FLAG`/`ROOT_FLAG`/
/// `LOG_DIR_FLAG` and the clap field names.
#[test]
fn given_controller_flags_when_file_server_parses_them_then_values_taken() {
    // GIVEN: The command line the controller builds
    let argv = vec![
        "webserve-fileserver",
        SETTINGS_FLAG,
        "/tmp/ws/config.json",
        ROOT_FLAG,
        "/tmp/ws/site",
        LOG_DIR_FLAG,
        "/tmp/ws/logs",
    ];

    // WHEN: Parsing
    let args = FileServerArgs::try_parse_from(argv).unwrap();

    // THEN: Every value lands in its field
    assert_eq!(
        args.settings_path().unwrap(),
        PathBuf::from("/tmp/ws/config.json")
    );
    assert_eq!(args.serve_root().unwrap(), PathBuf::from("/tmp/ws/site"));
    assert_eq!(args.log_dir(), PathBuf::from("/tmp/ws/logs"));
}

/// **VALUE**: Verifies the file server falls back to the install directory.
///
/// **BUG THIS CATCHES**: Would catch the defaults pointing at the working directory,
/// which differs from where the console writes config.json.
#[test]
fn given_no_flags_when_file_server_parses_then_defaults_to_install_dir() {
    let args = FileServerArgs::try_parse_from(vec!["webserve-fileserver"]).unwrap();
    let install = install_dir().unwrap();

    assert_eq!(args.settings_path().unwrap(), install.join(SETTINGS_FILE_NAME));
    assert_eq!(args.serve_root().unwrap(), install);
}

/// **VALUE**: Verifies panel overrides replace the installed defaults.
///
/// **BUG THIS CATCHES**: Would catch an override being parsed but not applied.
#[test]
fn given_panel_overrides_when_config_built_then_overrides_applied() {
    // GIVEN: Every panel flag set
    let args = PanelArgs::try_parse_from(vec![
        "webserve",
        "--settings",
        "/tmp/ws/config.json",
        "--root",
        "/tmp/ws/site",
        "--server-binary",
        "/tmp/ws/bin/fileserver",
        "--log-dir",
        "/tmp/ws/logs",
    ])
    .unwrap();

    // WHEN: Building the controller config
    let config = args.controller_config().unwrap();

    // THEN: Overrides win
    assert_eq!(config.settings_path, PathBuf::from("/tmp/ws/config.json"));
    assert_eq!(config.serve_root, PathBuf::from("/tmp/ws/site"));
    assert_eq!(config.server_binary, PathBuf::from("/tmp/ws/bin/fileserver"));
    assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/ws/logs")));
}

#[test]
fn given_unknown_flag_when_panel_parses_then_rejected() {
    let result = PanelArgs::try_parse_from(vec!["webserve", "--port", "80"]);

    assert!(result.is_err());
}
