//! Merging per-call options over client defaults.

use http::Method;

use super::body::prepare_body;
use super::resolve::resolve_url;
use crate::config::{parse_base_uri, ClientConfig};
use crate::errors::ClientResult;
use crate::types::headers::split_line;
use crate::types::{BaseUri, HeaderBag, RequestOptions, RequestSnapshot};

/// Builds the request snapshot a response is produced for.
///
/// Per-call headers come first and replace defaults of the same name.
/// `Accept: */*` is added when no Accept header is set.
pub(crate) fn prepare_request(
    config: &ClientConfig,
    method: &Method,
    url: &str,
    options: &RequestOptions,
) -> ClientResult<RequestSnapshot> {
    let base_uri = match &options.base_uri {
        BaseUri::Inherit => config.base_uri.clone(),
        BaseUri::Disabled => None,
        BaseUri::Uri(raw) => Some(parse_base_uri(raw)?),
    };

    let resolved = resolve_url(base_uri.as_ref(), url, &options.query)?;

    let mut headers = HeaderBag::from_lines(&options.headers)?;
    let overridden: Vec<String> = headers.iter().map(|(name, _)| name.to_string()).collect();
    for (name, value) in &config.headers {
        if !overridden.contains(&name.to_ascii_lowercase()) {
            let line = format!("{}: {}", name, value);
            let (name, value) = split_line(&line)?;
            headers.append(name, value);
        }
    }
    if !headers.contains("accept") {
        headers.append("Accept", "*/*");
    }

    let body = prepare_body(options.body.as_ref(), &mut headers)?;

    Ok(RequestSnapshot {
        method: method.clone(),
        url: resolved.to_string(),
        headers: headers.lines(),
        normalized_headers: headers,
        body,
        base_uri: base_uri.map(|uri| uri.to_string()),
        timeout: options.timeout.unwrap_or(config.timeout),
        max_duration: options.max_duration.or(config.max_duration),
        buffer: options.buffer.unwrap_or(config.buffer),
        user_data: options.user_data.clone().or_else(|| config.user_data.clone()),
    })
}
