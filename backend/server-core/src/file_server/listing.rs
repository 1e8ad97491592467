use std::fmt::Write as _;
use std::fs::read_dir;
use std::io;
use std::path::Path;

/// Render an HTML index of `dir`, shown to the client as `url_path`.
///
/// Entries are sorted case-insensitively; directories end in `/` and symlinks in `@`.
pub fn render(dir: &Path, url_path: &str) -> io::Result<String> {
    let mut entries = Vec::new();

    for entry in read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type()?;

        let (display, link) = if file_type.is_symlink() {
            let target_is_dir = entry.path().is_dir();
            let link = if target_is_dir {
                format!("{}/", urlencoding::encode(&name))
            } else {
                urlencoding::encode(&name).into_owned()
            };
            (format!("{name}@"), link)
        } else if file_type.is_dir() {
            (format!("{name}/"), format!("{}/", urlencoding::encode(&name)))
        } else {
            (name.clone(), urlencoding::encode(&name).into_owned())
        };

        entries.push((name.to_lowercase(), display, link));
    }

    entries.sort();

    let title = escape_html(&format!("Directory listing for {url_path}"));
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );

    for (_, display, link) in &entries {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(link),
            escape_html(display)
        );
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());

    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }

    escaped
}
