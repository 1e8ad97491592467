use server_core::READY_LINE_PREFIX;
use server_core::error::serve::ServeError;
use server_core::file_server::FileServer;
use server_core::settings::ServerSettings;

use std::fs::{create_dir_all, write};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{JoinHandle, spawn};

use tempfile::TempDir;

// ============================================================================
// HTTP exchanges against a FileServer bound on an ephemeral port
// ============================================================================

struct HttpReply {
    status: u16,
    head: String,
    body: String,
}

fn serve_root() -> TempDir {
    let root = TempDir::new().unwrap();
    write(root.path().join("hello.txt"), "hello world").unwrap();
    write(root.path().join("style.css"), "body {}").unwrap();
    create_dir_all(root.path().join("site")).unwrap();
    write(root.path().join("site").join("index.html"), "<h1>site</h1>").unwrap();
    root
}

/// Bind on 127.0.0.1 with an OS-assigned port and answer `requests` requests.
fn start_server(root: &TempDir, requests: usize) -> (SocketAddr, JoinHandle<()>) {
    let server = FileServer::bind(&ServerSettings::new("127.0.0.1", 0), root.path()).unwrap();
    let addr = server.local_addr().unwrap();

    let handle = spawn(move || {
        for _ in 0..requests {
            server.serve_next().unwrap();
        }
    });

    (addr, handle)
}

fn http(addr: SocketAddr, method: &str, path: &str) -> HttpReply {
    let mut stream = TcpStream::connect(addr).unwrap();
    write!(stream, "{method} {path} HTTP/1.0\r\nHost: localhost\r\n\r\n").unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw.as_str(), ""));
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();

    HttpReply {
        status,
        head: head.to_lowercase(),
        body: body.to_string(),
    }
}

/// **VALUE**: Verifies that files are served with their content and MIME type.
///
/// **WHY THIS MATTERS**: Serving files is the whole point of the child program.
///
/// **BUG THIS CATCHES**: Would catch a wrong root, a missing Content-Type or a truncated body.
#[test]
fn given_existing_files_when_requested_then_returns_200_with_mime_type() {
    // GIVEN: A server over a root with a text and a CSS file
    let root = serve_root();
    let (addr, handle) = start_server(&root, 2);

    // WHEN: Requesting both
    let text = http(addr, "GET", "/hello.txt");
    let css = http(addr, "GET", "/style.css");
    handle.join().unwrap();

    // THEN: 200 with content and type
    assert_eq!(text.status, 200);
    assert_eq!(text.body, "hello world");
    assert!(text.head.contains("content-type: text/plain"));
    assert_eq!(css.status, 200);
    assert!(css.head.contains("content-type: text/css"));
}

/// **VALUE**: Verifies 404 for missing paths and traversal attempts.
///
/// **WHY THIS MATTERS**: Standard semantics, and the root must not be escapable.
///
/// **BUG THIS CATCHES**: Would catch a 500/panic on missing files or a traversal leak.
#[test]
fn given_missing_or_escaping_path_when_requested_then_returns_404() {
    // GIVEN: A server
    let root = serve_root();
    let (addr, handle) = start_server(&root, 2);

    // WHEN: Requesting a missing file and a traversal
    let missing = http(addr, "GET", "/missing.txt");
    let escape = http(addr, "GET", "/%2e%2e/%2e%2e/etc/passwd");
    handle.join().unwrap();

    // THEN: Both 404
    assert_eq!(missing.status, 404);
    assert_eq!(escape.status, 404);
}

/// **VALUE**: Verifies directory listing, index pages and the trailing-slash redirect.
///
/// **WHY THIS MATTERS**: These are the directory semantics users see in a browser.
///
/// **BUG THIS CATCHES**: Would catch a missing Location header or a listing that omits files.
#[test]
fn given_directories_when_requested_then_lists_redirects_or_serves_index() {
    // GIVEN: A server
    let root = serve_root();
    let (addr, handle) = start_server(&root, 3);

    // WHEN: Requesting the root, a directory without slash, and with slash
    let listing = http(addr, "GET", "/");
    let redirect = http(addr, "GET", "/site");
    let index = http(addr, "GET", "/site/");
    handle.join().unwrap();

    // THEN: Listing, 301 to /site/, then index.html
    assert_eq!(listing.status, 200);
    assert!(listing.head.contains("content-type: text/html"));
    assert!(listing.body.contains("hello.txt"));
    assert!(listing.body.contains("site/"));

    assert_eq!(redirect.status, 301);
    assert!(redirect.head.contains("location: /site/"));

    assert_eq!(index.status, 200);
    assert_eq!(index.body, "<h1>site</h1>");
}

/// **VALUE**: Verifies HEAD support and rejection of other methods.
///
/// **WHY THIS MATTERS**: Static serving only understands GET and HEAD.
///
/// **BUG THIS CATCHES**: Would catch serving bodies for HEAD or accepting POST.
#[test]
fn given_head_and_post_when_requested_then_head_ok_and_post_501() {
    // GIVEN: A server
    let root = serve_root();
    let (addr, handle) = start_server(&root, 2);

    // WHEN: HEAD and POST
    let head = http(addr, "HEAD", "/hello.txt");
    let post = http(addr, "POST", "/hello.txt");
    handle.join().unwrap();

    // THEN: HEAD 200 without body, POST 501
    assert_eq!(head.status, 200);
    assert!(head.body.is_empty());
    assert_eq!(post.status, 501);
}

/// **VALUE**: Verifies the readiness line format the controller waits for.
///
/// **WHY THIS MATTERS**: The controller only marks the server RUNNING once it reads this
/// exact prefix followed by the bound URL.
///
/// **BUG THIS CATCHES**: Would catch announcing the configured port (0) instead of the
/// bound one.
#[test]
fn given_bound_server_when_ready_line_built_then_announces_bound_url() {
    // GIVEN: A bound server
    let root = serve_root();
    let server = FileServer::bind(&ServerSettings::new("127.0.0.1", 0), root.path()).unwrap();
    let addr = server.local_addr().unwrap();

    // WHEN: Building the ready line
    let line = server.ready_line();

    // THEN: Prefix plus the real address
    assert_eq!(line, format!("{READY_LINE_PREFIX}http://{addr}"));
    assert_ne!(addr.port(), 0);
}

/// **VALUE**: Verifies that an occupied port is a bind error.
///
/// **WHY THIS MATTERS**: The child must exit with an error the controller can report as
/// a failed start.
///
/// **BUG THIS CATCHES**: Would catch silently binding elsewhere.
#[test]
fn given_port_in_use_when_bound_then_returns_bind_error() {
    // GIVEN: A port held by another listener
    let holder = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = holder.local_addr().unwrap().port();
    let root = serve_root();

    // WHEN: Binding the same port
    let result = FileServer::bind(&ServerSettings::new("127.0.0.1", port), root.path());

    // THEN: Bind error
    assert!(matches!(result, Err(ServeError::Bind { .. })));
}

/// **VALUE**: Verifies that a missing serve root is reported before binding.
///
/// **WHY THIS MATTERS**: Serving a nonexistent directory would 404 every request.
///
/// **BUG THIS CATCHES**: Would catch skipping the root check.
#[test]
fn given_missing_root_when_bound_then_returns_io_error() {
    // GIVEN: A root that does not exist
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    // WHEN: Binding
    let result = FileServer::bind(&ServerSettings::new("127.0.0.1", 0), &missing);

    // THEN: Io error
    assert!(matches!(result, Err(ServeError::Io { .. })));
}
