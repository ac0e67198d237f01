//! Embedding image assets as `data:` URIs

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// MIME type for an image path, by lowercase extension
///
/// Unknown or missing extensions fall back to `image/png`.
pub fn mime_type_for(path: impl AsRef<Path>) -> &'static str {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "image/png",
    }
}

/// `data:{mime};base64,{payload}` for raw bytes
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Replace every `reference` in `html` with the contents of `file` as a
/// data URI
///
/// A missing or unreadable file is not an error: it is logged and the markup
/// is returned unchanged, leaving the reference in place.
pub fn embed_asset(html: &str, file: impl AsRef<Path>, reference: &str) -> String {
    let file = file.as_ref();

    let bytes = match fs::read(file) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(
                "Asset {} could not be read ({err}); document will render without it",
                file.display()
            );
            return html.to_string();
        }
    };

    let occurrences = html.matches(reference).count();
    debug!(
        "Embedding {} ({} bytes) at {occurrences} reference(s)",
        file.display(),
        bytes.len()
    );
    html.replace(reference, &data_uri(mime_type_for(file), &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for("logo.png"), "image/png");
        assert_eq!(mime_type_for("logo.JPG"), "image/jpeg");
        assert_eq!(mime_type_for("logo.jpeg"), "image/jpeg");
        assert_eq!(mime_type_for("anim.gif"), "image/gif");
        assert_eq!(mime_type_for("icon.svg"), "image/svg+xml");
        assert_eq!(mime_type_for("image.webp"), "image/png");
        assert_eq!(mime_type_for("logo"), "image/png");
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
        assert_eq!(data_uri("image/gif", b"ab"), "data:image/gif;base64,YWI=");
    }

    #[test]
    fn test_embed_asset_replaces_every_reference() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.jpg");
        fs::write(&logo, b"abc").unwrap();

        let html = "<img src=\"assets/logo.jpg\"><img src='assets/logo.jpg'>";
        assert_eq!(
            embed_asset(html, &logo, "assets/logo.jpg"),
            "<img src=\"data:image/jpeg;base64,YWJj\"><img src='data:image/jpeg;base64,YWJj'>"
        );
    }

    #[test]
    fn test_embed_missing_asset_leaves_markup() {
        let dir = tempfile::tempdir().unwrap();
        let html = "<img src='assets/logo.png'>";
        assert_eq!(
            embed_asset(html, dir.path().join("missing.png"), "assets/logo.png"),
            html
        );
    }

    #[test]
    fn test_embed_unreadable_asset_leaves_markup() {
        let dir = tempfile::tempdir().unwrap();
        let html = "<img src='assets/logo.png'>";
        // A directory cannot be read as a file
        assert_eq!(embed_asset(html, dir.path(), "assets/logo.png"), html);
    }
}
