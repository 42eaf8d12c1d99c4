use std::io::Read;

use axum::http::{header, HeaderMap};
use flate2::read::GzDecoder;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("request body exceeds {limit} bytes once decoded")]
    TooLarge { limit: u64 },
    #[error("invalid gzip body: {0}")]
    Gzip(#[from] std::io::Error),
    #[error("request body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Request body as text, inflating it first when sent with
/// `Content-Encoding: gzip`. The inflated size is held to `limit` bytes.
pub fn decode_body(headers: &HeaderMap, body: &[u8], limit: u64) -> Result<String, DecodeError> {
    if let Some(encoding) = headers.get(header::CONTENT_ENCODING) {
        if encoding.to_str().unwrap_or("").trim().eq_ignore_ascii_case("gzip") {
            let mut out = Vec::new();
            GzDecoder::new(body)
                .take(limit.saturating_add(1))
                .read_to_end(&mut out)?;
            if out.len() as u64 > limit {
                return Err(DecodeError::TooLarge { limit });
            }
            return Ok(String::from_utf8(out)?);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}
