// Unit tests for request path resolution
// Full HTTP exchanges are in integration_tests/file_server.rs

use crate::file_server::resolve::{Resolved, resolve};

use std::fs::{create_dir_all, write};

use tempfile::TempDir;

fn serve_root() -> TempDir {
    let root = TempDir::new().unwrap();
    write(root.path().join("hello.txt"), "hello").unwrap();
    write(root.path().join("with space.txt"), "spaced").unwrap();
    create_dir_all(root.path().join("docs")).unwrap();
    write(root.path().join("docs").join("index.html"), "<h1>docs</h1>").unwrap();
    create_dir_all(root.path().join("empty")).unwrap();
    root
}

/// **VALUE**: Verifies that a plain file URL resolves to that file.
///
/// **WHY THIS MATTERS**: This is the main thing the file server does.
///
/// **BUG THIS CATCHES**: Would catch a root join that drops or duplicates segments.
#[test]
fn given_existing_file_when_resolved_then_returns_file() {
    // GIVEN: A root with hello.txt
    let root = serve_root();

    // WHEN: Resolving its URL with a query string
    let resolved = resolve(root.path(), "/hello.txt?v=1");

    // THEN: Should map to the file
    assert_eq!(resolved, Resolved::File(root.path().join("hello.txt")));
}

/// **VALUE**: Verifies that percent-escapes are decoded.
///
/// **WHY THIS MATTERS**: Browsers always escape spaces; file names with spaces would
/// otherwise be unreachable.
///
/// **BUG THIS CATCHES**: Would catch joining the raw escaped segment.
#[test]
fn given_escaped_name_when_resolved_then_decodes_it() {
    // GIVEN: A root with "with space.txt"
    let root = serve_root();

    // WHEN: Resolving the escaped URL
    let resolved = resolve(root.path(), "/with%20space.txt");

    // THEN: Should map to the decoded file name
    assert_eq!(resolved, Resolved::File(root.path().join("with space.txt")));
}

/// **VALUE**: Verifies that `..` segments never escape the root.
///
/// **WHY THIS MATTERS**: The server exposes its installation directory; traversal would
/// expose the whole filesystem.
///
/// **BUG THIS CATCHES**: Would catch resolving `..` literally or only checking the raw,
/// still-escaped URL.
#[test]
fn given_parent_segments_when_resolved_then_not_found() {
    // GIVEN: A root
    let root = serve_root();

    // WHEN/THEN: Every traversal form is refused
    for url in ["/../etc/passwd", "/docs/../../x", "/%2e%2e/x", "/docs/..%2F..%2Fx"] {
        assert_eq!(resolve(root.path(), url), Resolved::NotFound, "Should refuse {url}");
    }
}

/// **VALUE**: Verifies the trailing-slash redirect for directories.
///
/// **WHY THIS MATTERS**: Relative links in a listing or index page only work when the
/// directory URL ends with a slash.
///
/// **BUG THIS CATCHES**: Would catch serving the listing at `/docs` directly or
/// losing the query string in the redirect.
#[test]
fn given_directory_without_slash_when_resolved_then_redirects() {
    // GIVEN: A root with a docs directory
    let root = serve_root();

    // WHEN/THEN: Redirect keeps the query
    assert_eq!(
        resolve(root.path(), "/docs"),
        Resolved::Redirect("/docs/".to_string())
    );
    assert_eq!(
        resolve(root.path(), "/docs?x=1"),
        Resolved::Redirect("/docs/?x=1".to_string())
    );
}

/// **VALUE**: Verifies index files win over listings.
///
/// **WHY THIS MATTERS**: Static sites rely on `index.html` being served for `/dir/`.
///
/// **BUG THIS CATCHES**: Would catch always producing a listing.
#[test]
fn given_directory_with_index_when_resolved_then_returns_index_file() {
    // GIVEN: A root whose docs directory has index.html
    let root = serve_root();

    // WHEN: Resolving the directory URL
    let resolved = resolve(root.path(), "/docs/");

    // THEN: Should serve the index
    assert_eq!(
        resolved,
        Resolved::File(root.path().join("docs").join("index.html"))
    );
}

/// **VALUE**: Verifies listings for directories without an index, including the root.
///
/// **WHY THIS MATTERS**: Directory listing is the default view of the served folder.
///
/// **BUG THIS CATCHES**: Would catch returning 404 for directories.
#[test]
fn given_directory_without_index_when_resolved_then_returns_listing() {
    // GIVEN: A root with an empty directory
    let root = serve_root();

    // WHEN/THEN: Root and nested directories list
    assert_eq!(
        resolve(root.path(), "/"),
        Resolved::Listing {
            dir: root.path().to_path_buf(),
            url_path: "/".to_string()
        }
    );
    assert_eq!(
        resolve(root.path(), "/empty/"),
        Resolved::Listing {
            dir: root.path().join("empty"),
            url_path: "/empty/".to_string()
        }
    );
}

/// **VALUE**: Verifies that missing paths are not found.
///
/// **WHY THIS MATTERS**: Standard 404 semantics.
///
/// **BUG THIS CATCHES**: Would catch falling back to a listing of the parent.
#[test]
fn given_missing_path_when_resolved_then_not_found() {
    // GIVEN: A root
    let root = serve_root();

    // WHEN/THEN: Missing file is not found
    assert_eq!(resolve(root.path(), "/nope.txt"), Resolved::NotFound);
    assert_eq!(resolve(root.path(), "/hello.txt/extra"), Resolved::NotFound);
}
