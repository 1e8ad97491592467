//! Static file server run as the child process.
//!
//! Serves `GET`/`HEAD` requests from a root directory in a single blocking loop on
//! `tiny_http`: files with a MIME type guessed from their extension, an HTML listing
//! for directories without an index page, 301 for directories missing their trailing
//! slash, 404 for everything else.

pub mod listing;
pub mod resolve;

use crate::READY_LINE_PREFIX;
use crate::error::serve::ServeError;
use crate::settings::ServerSettings;

use resolve::{Resolved, resolve};

use common::ErrorLocation;

use std::fs::{File, canonicalize};
use std::io::Read;
use std::net::SocketAddr;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tiny_http::{Header, Method, Request, Response, ResponseBox, Server};

const CONTENT_TYPE_HEADER: &str = "Content-Type";
const LOCATION_HEADER: &str = "Location";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const NOT_FOUND_BODY: &str = "File not found";
const UNSUPPORTED_METHOD_BODY: &str = "Unsupported method";

pub struct FileServer {
    server: Server,
    root: PathBuf,
    url: String,
}

impl FileServer {
    /// Bind a listener at the settings' ip:port, serving files under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Io`] if `root` cannot be resolved and
    /// [`ServeError::Bind`] if the address is unusable or already taken.
    pub fn bind(settings: &ServerSettings, root: impl AsRef<Path>) -> Result<Self, ServeError> {
        let root = root.as_ref();
        let root = canonicalize(root).map_err(|e| ServeError::Io {
            message: format!("Failed to resolve serve root {}: {e}", root.display()),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        let server =
            Server::http((settings.ip.as_str(), settings.port)).map_err(|e| ServeError::Bind {
                message: format!("Failed to bind {}: {e}", settings.address()),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            })?;

        let url = match server.server_addr().to_ip() {
            Some(addr) => format!("http://{addr}"),
            None => format!("http://{}", settings.address()),
        };

        debug!("Bound {url}, serving {}", root.display());

        Ok(Self { server, root, url })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// The line announcing that the listener is bound, e.g. `Serving at http://127.0.0.1:8000`.
    pub fn ready_line(&self) -> String {
        format!("{READY_LINE_PREFIX}{}", self.url)
    }

    /// Serve requests until the process is terminated or the listener fails.
    pub fn run(&self) -> Result<(), ServeError> {
        info!("Serving {} at {}", self.root.display(), self.url);

        loop {
            self.serve_next()?;
        }
    }

    /// Block for the next request and answer it.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Io`] only if the listener itself fails; failures writing
    /// an individual response are logged.
    pub fn serve_next(&self) -> Result<(), ServeError> {
        let request = self.server.recv().map_err(|e| ServeError::Io {
            message: format!("Failed to accept request on {}: {e}", self.url),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        self.handle(request);
        Ok(())
    }

    fn handle(&self, request: Request) {
        let method = request.method().clone();
        let url = request.url().to_string();

        let (response, size) = match method {
            Method::Get | Method::Head => self.build_response(&url),
            _ => text_response(501, UNSUPPORTED_METHOD_BODY),
        };

        info!(
            "Request: {method} {url} - Status: {} - Size: {size}",
            response.status_code().0
        );

        if let Err(e) = request.respond(response) {
            warn!("Failed to send response for {method} {url}: {e}");
        }
    }

    fn build_response(&self, url: &str) -> (ResponseBox, u64) {
        match resolve(&self.root, url) {
            Resolved::File(path) => file_response(&path),
            Resolved::Listing { dir, url_path } => match listing::render(&dir, &url_path) {
                Ok(html) => {
                    let size = html.len() as u64;
                    let response = with_header(
                        Response::from_data(html.into_bytes()),
                        CONTENT_TYPE_HEADER,
                        HTML_CONTENT_TYPE,
                    );
                    (response.boxed(), size)
                }
                Err(e) => {
                    warn!("Failed to list {}: {e}", dir.display());
                    text_response(404, NOT_FOUND_BODY)
                }
            },
            Resolved::Redirect(location) => {
                let response = with_header(Response::empty(301), LOCATION_HEADER, &location);
                (response.boxed(), 0)
            }
            Resolved::NotFound => text_response(404, NOT_FOUND_BODY),
        }
    }
}

fn file_response(path: &Path) -> (ResponseBox, u64) {
    let opened = File::open(path).and_then(|file| {
        let size = file.metadata()?.len();
        Ok((file, size))
    });

    match opened {
        Ok((file, size)) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            let response =
                with_header(Response::from_file(file), CONTENT_TYPE_HEADER, mime.as_ref());
            (response.boxed(), size)
        }
        Err(e) => {
            warn!("Failed to open {}: {e}", path.display());
            text_response(404, NOT_FOUND_BODY)
        }
    }
}

fn text_response(status: u16, body: &str) -> (ResponseBox, u64) {
    let response = with_header(
        Response::from_data(body.as_bytes().to_vec()).with_status_code(status),
        CONTENT_TYPE_HEADER,
        TEXT_CONTENT_TYPE,
    );
    (response.boxed(), body.len() as u64)
}

fn with_header<R: Read>(response: Response<R>, name: &str, value: &str) -> Response<R> {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => {
            warn!("Dropping invalid {name} header value {value:?}");
            response
        }
    }
}
