//! Request URL resolution.

use url::Url;

use crate::errors::{ClientError, ClientResult};

/// Resolves a request URL against an optional base URI and appends query
/// parameters.
pub(crate) fn resolve_url(
    base: Option<&Url>,
    url: &str,
    query: &[(String, String)],
) -> ClientResult<Url> {
    let mut resolved = match Url::parse(url) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base.join(url)?,
            None => {
                return Err(ClientError::invalid_argument(
                    "Invalid URL: scheme is missing",
                ))
            }
        },
        Err(e) => return Err(e.into()),
    };

    if !query.is_empty() {
        resolved
            .query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/api/").unwrap()
    }

    #[test]
    fn test_absolute_url_ignores_base() {
        let url = resolve_url(Some(&base()), "http://other.test/x", &[]).unwrap();
        assert_eq!(url.as_str(), "http://other.test/x");
    }

    #[test]
    fn test_relative_url_joins_base() {
        let url = resolve_url(Some(&base()), "users/1", &[]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/users/1");

        let url = resolve_url(Some(&base()), "/root", &[]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/root");
    }

    #[test]
    fn test_missing_scheme_without_base() {
        let error = resolve_url(None, "/foo", &[]).unwrap_err();
        assert_eq!(error.to_string(), "Invalid URL: scheme is missing");
    }

    #[test]
    fn test_query_is_appended() {
        let query = vec![
            ("page".to_string(), "2".to_string()),
            ("q".to_string(), "a b".to_string()),
        ];
        let url = resolve_url(None, "https://example.com/search?x=1", &query).unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?x=1&page=2&q=a+b");
    }
}
