//! Playlist locator resolution.

use std::path::Path;

use url::Url;

use hc_core::{Error, Result};

/// Turn user input into an absolute playlist URL.
///
/// `http`, `https` and `file` URLs are taken as-is. Anything else is treated
/// as a filesystem path, made absolute against the current directory, and
/// converted to a `file://` URL so that relative segment references resolve
/// next to it.
pub fn resolve_locator(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::invalid_locator(input, "empty locator"));
    }

    if let Ok(url) = Url::parse(input) {
        match url.scheme() {
            "http" | "https" | "file" => return Ok(url),
            // Single-letter schemes are Windows drive letters, not URLs.
            scheme if scheme.len() > 1 => {
                return Err(Error::invalid_locator(
                    input,
                    format!("unsupported scheme '{scheme}'"),
                ));
            }
            _ => {}
        }
    }

    let path = Path::new(input);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    Url::from_file_path(&absolute)
        .map_err(|()| Error::invalid_locator(input, "not an absolute file path"))
}
