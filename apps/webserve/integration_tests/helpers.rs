use server_core::controller::{ControllerConfig, ServerController};
use server_core::settings::{ServerSettings, SettingsStore};

use std::fs::write;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread::sleep;
use std::time::{Duration, Instant};

use tempfile::TempDir;

pub const LOOPBACK: &str = "127.0.0.1";
pub const INDEX_BODY: &str = "<h1>served</h1>";

/// A serve root with an index page, plus the paths a controller needs.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("index.html"), INDEX_BODY).unwrap();
        Self { dir }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }

    pub fn store(&self) -> SettingsStore {
        SettingsStore::new(self.settings_path())
    }

    /// Persist `127.0.0.1:<port>` so the spawned file server binds it.
    pub fn save_settings(&self, port: u16) -> ServerSettings {
        let settings = ServerSettings::new(LOOPBACK, port);
        self.store().save(&settings).unwrap();
        settings
    }

    /// Controller config pointing at the file server built alongside these tests.
    pub fn config(&self) -> ControllerConfig {
        ControllerConfig::new(
            env!("CARGO_BIN_EXE_webserve-fileserver"),
            self.settings_path(),
            self.dir.path(),
        )
        .with_log_dir(self.dir.path().join("logs"))
        .with_startup_timeout(Duration::from_secs(10))
        .with_stop_timeout(Duration::from_secs(5))
    }

    pub fn controller(&self) -> ServerController {
        ServerController::new(self.config())
    }
}

/// A loopback port that was free a moment ago.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind((LOOPBACK, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

/// `GET path` over HTTP/1.0; returns (status, body).
pub fn http_get(port: u16, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect((LOOPBACK, port)).unwrap();
    write!(stream, "GET {path} HTTP/1.0\r\nHost: localhost\r\n\r\n").unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw.as_str(), ""));
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();

    (status, body.to_string())
}

pub fn port_accepts(port: u16) -> bool {
    TcpStream::connect((LOOPBACK, port)).is_ok()
}

/// Poll `condition` every 50ms until it holds or `timeout` passes.
pub fn eventually(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(50));
    }
    condition()
}
