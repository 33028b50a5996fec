use base64::Engine as _;

use crate::foundation::error::{CanvasError, CanvasResult};

const DATA_URI_PREFIX: &str = "data:";
const DEFAULT_MEDIA_TYPE: &str = "text/plain;charset=US-ASCII";

/// Decoded `data:` URI (RFC 2397).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUri {
    /// Media type without parameters, lowercased (`image/png`).
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn is_data_uri(src: &str) -> bool {
    src.get(..DATA_URI_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(DATA_URI_PREFIX))
}

/// Parse a `data:` URI with either a base64 or percent-encoded payload.
pub fn parse(uri: &str) -> CanvasResult<DataUri> {
    if !is_data_uri(uri) {
        return Err(CanvasError::asset("uri does not start with 'data:'"));
    }
    let rest = &uri[DATA_URI_PREFIX.len()..];
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CanvasError::asset("data uri is missing ','"))?;

    let mut parts = meta.split(';');
    let media = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));
    let mime = if media.is_empty() {
        DEFAULT_MEDIA_TYPE.to_string()
    } else {
        media
    };

    let bytes = if is_base64 {
        decode_base64(payload)?
    } else {
        percent_decode(payload)?
    };
    Ok(DataUri { mime, bytes })
}

/// Encode bytes as a base64 `data:` URI.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn decode_base64(payload: &str) -> CanvasResult<Vec<u8>> {
    let cleaned: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| CanvasError::asset(format!("invalid base64 payload: {e}")))
}

/// Percent-decode without treating `+` specially.
fn percent_decode(input: &str) -> CanvasResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = bytes
            .get(i + 1..i + 3)
            .and_then(|h| std::str::from_utf8(h).ok())
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| CanvasError::asset("invalid percent-escape in data uri"))?;
        out.push(hex);
        i += 3;
    }
    Ok(out)
}
