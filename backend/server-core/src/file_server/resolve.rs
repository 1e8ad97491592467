use std::path::{Path, PathBuf};

const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// What a request URL maps to under the serve root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    Listing { dir: PathBuf, url_path: String },
    Redirect(String),
    NotFound,
}

/// Map a raw request URL (path plus optional query) onto `root`.
///
/// Percent-escapes are decoded, `.` segments dropped, and any `..` segment is
/// refused so a request never leaves `root`.
pub fn resolve(root: &Path, raw_url: &str) -> Resolved {
    let (raw_path, query) = split_url(raw_url);

    let Ok(decoded) = urlencoding::decode(raw_path) else {
        return Resolved::NotFound;
    };

    let mut path = root.to_path_buf();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Resolved::NotFound,
            s if s.contains('\\') || s.contains('\0') => return Resolved::NotFound,
            s => path.push(s),
        }
    }

    if path.is_dir() {
        if !decoded.ends_with('/') {
            let location = match query {
                Some(query) => format!("{raw_path}/?{query}"),
                None => format!("{raw_path}/"),
            };
            return Resolved::Redirect(location);
        }

        if let Some(index) = INDEX_FILES
            .iter()
            .map(|name| path.join(name))
            .find(|candidate| candidate.is_file())
        {
            return Resolved::File(index);
        }

        return Resolved::Listing {
            dir: path,
            url_path: decoded.into_owned(),
        };
    }

    if path.is_file() {
        return Resolved::File(path);
    }

    Resolved::NotFound
}

fn split_url(raw_url: &str) -> (&str, Option<&str>) {
    let without_fragment = raw_url.split('#').next().unwrap_or_default();

    match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    }
}
