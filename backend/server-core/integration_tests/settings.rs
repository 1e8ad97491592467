use server_core::error::settings::SettingsError;
use server_core::settings::{ServerSettings, SettingsStore};
use server_core::{DEFAULT_IP, DEFAULT_PORT, SETTINGS_FILE_NAME};

use std::fs::{read_to_string, write};

use tempfile::TempDir;

// ============================================================================
// Public API tests for the settings store
// ============================================================================

// ----------------------------------------------------------------------------
// load() - never fails
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies that a missing settings file yields defaults without error.
///
/// **WHY THIS MATTERS**: On first launch no file exists. The console and file server must
/// both start on localhost:8000.
///
/// **BUG THIS CATCHES**: Would catch treating NotFound as a read error.
#[test]
fn given_missing_file_when_loaded_then_returns_defaults() {
    // GIVEN: A path with no file
    let dir = TempDir::new().unwrap();
    let store = SettingsStore::new(dir.path().join(SETTINGS_FILE_NAME));

    // WHEN: Loading both ways
    let loaded = store.load();
    let tried = store.try_load();

    // THEN: Both give defaults
    assert_eq!(loaded, ServerSettings::default());
    assert_eq!(tried.unwrap(), ServerSettings::default());
}

/// **VALUE**: Verifies that corrupt JSON falls back to defaults.
///
/// **WHY THIS MATTERS**: A half-written or hand-edited file must never stop the console
/// from starting.
///
/// **BUG THIS CATCHES**: Would catch `load` propagating the parse error or panicking.
#[test]
fn given_corrupt_file_when_loaded_then_returns_defaults() {
    // GIVEN: Files with invalid content
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    let store = SettingsStore::new(&path);

    for corrupt in ["{not json", "", "{\"ip\": 5}", "{\"port\": \"abc\"}", "{\"port\": 70000}"] {
        write(&path, corrupt).unwrap();

        // WHEN: Loading
        let loaded = store.load();

        // THEN: Defaults, and try_load reports a parse error
        assert_eq!(loaded.ip, DEFAULT_IP, "Should fall back for {corrupt:?}");
        assert_eq!(loaded.port, DEFAULT_PORT, "Should fall back for {corrupt:?}");
        assert!(matches!(
            store.try_load(),
            Err(SettingsError::Parse { .. })
        ));
    }
}

/// **VALUE**: Verifies that well-formed but invalid records fall back to defaults.
///
/// **WHY THIS MATTERS**: Port 0 or an empty ip would make the child bind somewhere the
/// console cannot report.
///
/// **BUG THIS CATCHES**: Would catch skipping validation on load.
#[test]
fn given_invalid_record_when_loaded_then_returns_defaults() {
    // GIVEN: A file with port 0
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    write(&path, r#"{"ip": "10.0.0.1", "port": 0}"#).unwrap();
    let store = SettingsStore::new(&path);

    // WHEN/THEN: Defaults, and try_load reports validation
    assert_eq!(store.load(), ServerSettings::default());
    assert!(matches!(
        store.try_load(),
        Err(SettingsError::Validation { .. })
    ));
}

/// **VALUE**: Verifies per-field defaults for partial files.
///
/// **WHY THIS MATTERS**: A file with only an ip is still meaningful.
///
/// **BUG THIS CATCHES**: Would catch requiring both fields.
#[test]
fn given_partial_file_when_loaded_then_fills_missing_fields() {
    // GIVEN: A file with only the ip
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    write(&path, r#"{"ip": "192.168.1.10"}"#).unwrap();

    // WHEN: Loading
    let loaded = SettingsStore::new(&path).load();

    // THEN: ip from file, default port
    assert_eq!(loaded, ServerSettings::new("192.168.1.10", DEFAULT_PORT));
}

// ----------------------------------------------------------------------------
// save() - whole-record overwrite
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies the save/load round-trip.
///
/// **WHY THIS MATTERS**: The file server reads exactly what the console saved.
///
/// **BUG THIS CATCHES**: Would catch field renames or serialization drift.
#[test]
fn given_saved_settings_when_loaded_then_returns_same_record() {
    // GIVEN: A store and a non-default record
    let dir = TempDir::new().unwrap();
    let store = SettingsStore::new(dir.path().join(SETTINGS_FILE_NAME));
    let settings = ServerSettings::new("1.2.3.4", 9090);

    // WHEN: Saving then loading
    store.save(&settings).unwrap();
    let loaded = store.load();

    // THEN: Same record
    assert_eq!(loaded, settings);
}

/// **VALUE**: Verifies the on-disk format and that saves overwrite wholesale.
///
/// **WHY THIS MATTERS**: The file is shared with another program and may be edited by hand.
///
/// **BUG THIS CATCHES**: Would catch appending, extra fields or a changed key name.
#[test]
fn given_existing_file_when_saved_then_overwrites_with_ip_and_port_object() {
    // GIVEN: A file with stale content
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    write(&path, r#"{"ip": "old", "port": 1, "stale": true}"#).unwrap();
    let store = SettingsStore::new(&path);

    // WHEN: Saving a new record
    store.save(&ServerSettings::new("localhost", 9090)).unwrap();

    // THEN: The file holds exactly the new object
    let value: serde_json::Value = serde_json::from_str(&read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value, serde_json::json!({ "ip": "localhost", "port": 9090 }));
    assert!(!dir.path().join("config.tmp").exists(), "Temp file should be renamed away");
}

/// **VALUE**: Verifies that missing parent directories are created.
///
/// **WHY THIS MATTERS**: A custom `--settings` path may point into a fresh directory.
///
/// **BUG THIS CATCHES**: Would catch writing without `create_dir_all`.
#[test]
fn given_missing_parent_dir_when_saved_then_creates_it() {
    // GIVEN: A nested path that does not exist yet
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a").join("b").join(SETTINGS_FILE_NAME);
    let store = SettingsStore::new(&path);

    // WHEN: Saving
    store.save(&ServerSettings::default()).unwrap();

    // THEN: File exists and loads
    assert!(path.exists());
    assert_eq!(store.load(), ServerSettings::default());
}

/// **VALUE**: Verifies that I/O failures surface as `SettingsError::Write`.
///
/// **WHY THIS MATTERS**: Save failures must reach the console output instead of being
/// swallowed.
///
/// **BUG THIS CATCHES**: Would catch ignoring the write result.
#[test]
fn given_unwritable_path_when_saved_then_returns_write_error() {
    // GIVEN: A path whose "parent directory" is a regular file
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file.txt");
    write(&blocker, "x").unwrap();
    let store = SettingsStore::new(blocker.join(SETTINGS_FILE_NAME));

    // WHEN: Saving
    let result = store.save(&ServerSettings::default());

    // THEN: Write error
    assert!(matches!(result, Err(SettingsError::Write { .. })));
}

/// **VALUE**: Verifies that invalid records are refused before touching the file.
///
/// **WHY THIS MATTERS**: Saving port 0 would make every later load fall back to defaults.
///
/// **BUG THIS CATCHES**: Would catch removing validation from `save`.
#[test]
fn given_invalid_record_when_saved_then_rejects_and_keeps_file() {
    // GIVEN: A saved valid record
    let dir = TempDir::new().unwrap();
    let store = SettingsStore::new(dir.path().join(SETTINGS_FILE_NAME));
    let valid = ServerSettings::new("127.0.0.1", 8080);
    store.save(&valid).unwrap();

    // WHEN: Saving an invalid one
    let result = store.save(&ServerSettings::new("127.0.0.1", 0));

    // THEN: Rejected, file unchanged
    assert!(matches!(result, Err(SettingsError::Validation { .. })));
    assert_eq!(store.load(), valid);
}
