use crate::file_server::listing::{escape_html, render};

use std::fs::{create_dir_all, write};

use tempfile::TempDir;

/// **VALUE**: Verifies listing content, ordering and directory markers.
///
/// **WHY THIS MATTERS**: Users browse the served folder through this page.
///
/// **BUG THIS CATCHES**: Would catch unsorted output, missing `/` on directories or
/// unescaped links.
#[test]
fn given_directory_when_rendered_then_lists_sorted_entries_with_links() {
    // GIVEN: A directory with mixed-case files and a subdirectory
    let dir = TempDir::new().unwrap();
    write(dir.path().join("b.txt"), "b").unwrap();
    write(dir.path().join("A.txt"), "a").unwrap();
    write(dir.path().join("x y.txt"), "xy").unwrap();
    create_dir_all(dir.path().join("sub")).unwrap();

    // WHEN: Rendering the listing
    let html = render(dir.path(), "/files/").unwrap();

    // THEN: Title, entries, order and links should be present
    assert!(html.contains("<title>Directory listing for /files/</title>"));
    assert!(html.contains("<a href=\"sub/\">sub/</a>"));
    assert!(html.contains("<a href=\"x%20y.txt\">x y.txt</a>"));

    let a = html.find("A.txt").unwrap();
    let b = html.find("b.txt").unwrap();
    let sub = html.find("sub/").unwrap();
    assert!(a < b && b < sub, "Entries should be sorted case-insensitively");
}

/// **VALUE**: Verifies that HTML metacharacters are escaped.
///
/// **WHY THIS MATTERS**: File names and URL paths are attacker-controlled text placed in
/// an HTML page.
///
/// **BUG THIS CATCHES**: Would catch a missing replacement for any of the five characters.
#[test]
fn given_markup_when_escaped_then_metacharacters_replaced() {
    // GIVEN/WHEN: Escaping a string with every metacharacter
    let escaped = escape_html("<a href=\"x\">&'</a>");

    // THEN: None survive
    assert_eq!(
        escaped,
        "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;&lt;/a&gt;"
    );
}

/// **VALUE**: Verifies that a missing directory is reported as an error, not a panic.
///
/// **WHY THIS MATTERS**: A directory can disappear between resolution and rendering.
///
/// **BUG THIS CATCHES**: Would catch unwrapping `read_dir`.
#[test]
fn given_missing_directory_when_rendered_then_returns_error() {
    // GIVEN: A path that does not exist
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone");

    // WHEN/THEN: Rendering fails cleanly
    assert!(render(&missing, "/gone/").is_err());
}
