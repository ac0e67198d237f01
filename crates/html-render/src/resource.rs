//! Inline resources referenced from markup

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Decoded contents of a `data:` URI
#[derive(Debug, Clone, PartialEq)]
pub struct DataUri {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Decode a `data:[<mime>][;base64],<payload>` URI
///
/// Returns `None` for anything else, including relative or remote paths,
/// which the renderer never fetches.
pub fn decode_data_uri(src: &str) -> Option<DataUri> {
    let rest = src.trim().strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;

    let mut params = meta.split(';');
    let mime_type = params
        .next()
        .filter(|mime| !mime.is_empty())
        .unwrap_or("text/plain")
        .to_ascii_lowercase();
    let is_base64 = params.any(|param| param.eq_ignore_ascii_case("base64"));

    let data = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact).ok()?
    } else {
        payload.as_bytes().to_vec()
    };

    Some(DataUri { mime_type, data })
}
