//! Replaying responses recorded in HAR archives.

use base64::Engine;
use bytes::Bytes;
use http::Method;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::factory::ResponseSource;
use super::response::MockResponse;
use crate::errors::{ClientError, ClientResult};
use crate::types::RequestSnapshot;

#[derive(Debug, Deserialize)]
struct HarArchive {
    log: HarLog,
}

#[derive(Debug, Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct HarEntry {
    request: HarRequest,
    response: HarResponse,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HarRequest {
    method: String,
    url: String,
    #[serde(default)]
    post_data: Option<HarPostData>,
}

#[derive(Debug, Clone, Deserialize)]
struct HarPostData {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HarResponse {
    status: u16,
    #[serde(default)]
    status_text: String,
    #[serde(default)]
    http_version: String,
    #[serde(default)]
    headers: Vec<HarHeader>,
    #[serde(default)]
    content: HarContent,
}

#[derive(Debug, Clone, Deserialize)]
struct HarHeader {
    name: String,
    value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct HarContent {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// Responses recorded in a HAR (HTTP Archive) file.
///
/// Requests are matched on method, URL and body. The first matching entry
/// wins, so an archive can be replayed any number of times.
#[derive(Debug, Clone)]
pub struct HarReplay {
    entries: Vec<HarEntry>,
}

impl HarReplay {
    /// Parses a HAR document.
    pub fn from_json(json: &str) -> ClientResult<Self> {
        let archive: HarArchive = serde_json::from_str(json)?;
        debug!(entries = archive.log.entries.len(), "Loaded HAR archive");
        Ok(Self {
            entries: archive.log.entries,
        })
    }

    /// Reads and parses a HAR file.
    pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ClientError::invalid_argument(format!(
                "Cannot read HAR file \"{}\": {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the recorded response for a request.
    pub fn response_for(&self, method: &Method, url: &str, body: &[u8]) -> ClientResult<MockResponse> {
        let url = normalize_url(url);

        let entry = self
            .entries
            .iter()
            .find(|entry| {
                entry.request.method.eq_ignore_ascii_case(method.as_str())
                    && normalize_url(&entry.request.url) == url
                    && recorded_body(&entry.request) == body
            })
            .ok_or_else(|| {
                ClientError::transport(format!(
                    "HAR archive does not contain a response for HTTP request \"{}\" \"{}\".",
                    method, url
                ))
            })?;

        entry.response.to_mock()
    }

    /// Turns the archive into a response source for a mock client.
    pub fn into_source(self) -> ResponseSource {
        let replay = Arc::new(self);
        ResponseSource::try_callback(move |method: &Method, url: &str, request: &RequestSnapshot| {
            replay.response_for(method, url, &request.body)
        })
    }
}

impl HarResponse {
    fn to_mock(&self) -> ClientResult<MockResponse> {
        let body = match (&self.content.text, self.content.encoding.as_deref()) {
            (None, _) => Bytes::new(),
            (Some(text), Some("base64")) => base64::engine::general_purpose::STANDARD
                .decode(text)
                .map(Bytes::from)
                .map_err(|e| ClientError::Decoding {
                    message: format!("Invalid base64 content in HAR entry: {}", e),
                })?,
            (Some(text), _) => Bytes::from(text.clone()),
        };

        let version = if self.http_version.starts_with("HTTP/") {
            self.http_version.as_str()
        } else {
            "HTTP/1.1"
        };
        let status_line = format!("{} {:03} {}", version, self.status, self.status_text);

        let response = self
            .headers
            .iter()
            .filter(|header| !header.name.starts_with(':'))
            .fold(
                MockResponse::new(body).header_line(status_line.trim_end().to_string()),
                |response, header| response.header(&header.name, &header.value),
            );

        Ok(response)
    }
}

fn recorded_body(request: &HarRequest) -> &[u8] {
    request
        .post_data
        .as_ref()
        .and_then(|data| data.text.as_deref())
        .unwrap_or_default()
        .as_bytes()
}

fn normalize_url(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARCHIVE: &str = r#"{
        "log": {
            "version": "1.2",
            "entries": [
                {
                    "request": {"method": "GET", "url": "https://example.com/items?page=1"},
                    "response": {
                        "status": 200,
                        "statusText": "OK",
                        "httpVersion": "HTTP/2",
                        "headers": [
                            {"name": ":status", "value": "200"},
                            {"name": "content-type", "value": "application/json"}
                        ],
                        "content": {"text": "[1,2]"}
                    }
                },
                {
                    "request": {
                        "method": "POST",
                        "url": "https://example.com/items",
                        "postData": {"text": "{\"name\":\"a\"}"}
                    },
                    "response": {
                        "status": 201,
                        "statusText": "Created",
                        "content": {"text": "Y3JlYXRlZA==", "encoding": "base64"}
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn test_parses_entries() {
        let replay = HarReplay::from_json(ARCHIVE).unwrap();
        assert_eq!(replay.len(), 2);
        assert!(!replay.is_empty());
    }

    #[test]
    fn test_builds_status_line_and_skips_pseudo_headers() {
        let replay = HarReplay::from_json(ARCHIVE).unwrap();
        let response = replay
            .response_for(&Method::GET, "https://example.com/items?page=1", b"")
            .unwrap();

        assert_eq!(
            response.header_lines(),
            &[
                "HTTP/2 200 OK".to_string(),
                "content-type: application/json".to_string()
            ]
        );
    }

    #[test]
    fn test_matches_on_body_and_decodes_base64() {
        let replay = HarReplay::from_json(ARCHIVE).unwrap();

        let response = replay
            .response_for(&Method::POST, "https://example.com/items", br#"{"name":"a"}"#)
            .unwrap();
        assert!(matches!(
            response.body(),
            crate::mocks::Body::Fixed(bytes) if &bytes[..] == b"created"
        ));

        let error = replay
            .response_for(&Method::POST, "https://example.com/items", b"other")
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "HAR archive does not contain a response for HTTP request \"POST\" \"https://example.com/items\"."
        );
    }

    #[test]
    fn test_invalid_document() {
        let error = HarReplay::from_json("{\"log\": 1}").unwrap_err();
        assert!(matches!(error, ClientError::Decoding { .. }));
    }

    #[test]
    fn test_missing_file() {
        let error = HarReplay::from_file("/nonexistent/archive.har").unwrap_err();
        assert!(error.to_string().starts_with("Cannot read HAR file"));
    }
}
