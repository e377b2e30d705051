//! Request body preparation and Content-Length fix-up.

use bytes::{BufMut, Bytes, BytesMut};

use crate::errors::{ClientError, ClientResult};
use crate::types::{HeaderBag, RequestBody};

/// Serializes the body and makes `Content-Length` match it.
///
/// `Content-Type` is filled in for JSON and form bodies when absent.
pub(crate) fn prepare_body(
    body: Option<&RequestBody>,
    headers: &mut HeaderBag,
) -> ClientResult<Bytes> {
    let bytes = match body {
        None => Bytes::new(),
        Some(RequestBody::Bytes(bytes)) => bytes.clone(),
        Some(RequestBody::Json(value)) => {
            if !headers.contains("content-type") {
                headers.set("Content-Type", mime::APPLICATION_JSON.as_ref());
            }
            let encoded = serde_json::to_vec(value).map_err(|e| {
                ClientError::invalid_argument(format!("Invalid JSON body: {}", e))
            })?;
            Bytes::from(encoded)
        }
        Some(RequestBody::Form(fields)) => {
            if !headers.contains("content-type") {
                headers.set(
                    "Content-Type",
                    mime::APPLICATION_WWW_FORM_URLENCODED.as_ref(),
                );
            }
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            Bytes::from(encoded)
        }
    };

    fix_content_length(bytes, headers)
}

/// Sets `Content-Length` to the real body length.
///
/// A caller-supplied value is always overwritten. Chunked bodies are decoded
/// and lose their `Transfer-Encoding` header. Nothing is added for an empty
/// body without a declared length.
pub(crate) fn fix_content_length(body: Bytes, headers: &mut HeaderBag) -> ClientResult<Bytes> {
    if body.is_empty() && !headers.contains("content-length") {
        return Ok(body);
    }

    let chunked = headers
        .first_value("transfer-encoding")
        .is_some_and(|value| value.eq_ignore_ascii_case("chunked"));

    let body = if chunked {
        headers.remove("transfer-encoding");
        dechunk(&body)?
    } else {
        body
    };

    headers.set("Content-Length", &body.len().to_string());
    Ok(body)
}

/// Decodes a `Transfer-Encoding: chunked` payload.
pub(crate) fn dechunk(encoded: &[u8]) -> ClientResult<Bytes> {
    let mut decoded = BytesMut::with_capacity(encoded.len());
    let mut rest = encoded;

    loop {
        let line_end = find_crlf(rest)
            .ok_or_else(|| malformed("missing chunk size line terminator"))?;
        let size_line = std::str::from_utf8(&rest[..line_end])
            .map_err(|_| malformed("chunk size is not valid UTF-8"))?;
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| malformed(&format!("invalid chunk size \"{}\"", size_hex)))?;
        rest = &rest[line_end + 2..];

        if size == 0 {
            // Trailer section is ignored.
            return Ok(decoded.freeze());
        }

        let end = size
            .checked_add(2)
            .ok_or_else(|| malformed("chunk size is too large"))?;
        if rest.len() < end || &rest[size..end] != b"\r\n" {
            return Err(malformed("chunk data is truncated"));
        }
        decoded.put_slice(&rest[..size]);
        rest = &rest[end..];
    }
}

fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|window| window == b"\r\n")
}

fn malformed(reason: &str) -> ClientError {
    ClientError::invalid_argument(format!("Invalid chunked request body: {}", reason))
}
