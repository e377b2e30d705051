//! Ordered header storage.
//!
//! Headers are kept as raw `Name: value` lines grouped under their lowercased
//! name. Groups stay in the order their name first appeared, and lines keep
//! the caller's casing.

use crate::errors::{ClientError, ClientResult};

/// Ordered, case-insensitive header collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderBag {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw `Name: value` lines.
    pub fn from_lines<I, S>(lines: I) -> ClientResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bag = Self::new();
        for line in lines {
            let (name, value) = split_line(line.as_ref())?;
            bag.append(name, value);
        }
        Ok(bag)
    }

    /// Appends a header, keeping existing values of the same name.
    pub fn append(&mut self, name: &str, value: &str) {
        let line = format!("{}: {}", name, value);
        let key = name.to_ascii_lowercase();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, lines)) => lines.push(line),
            None => self.entries.push((key, vec![line])),
        }
    }

    /// Sets a header, replacing existing values but keeping its position.
    pub fn set(&mut self, name: &str, value: &str) {
        let line = format!("{}: {}", name, value);
        let key = name.to_ascii_lowercase();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, lines)) => *lines = vec![line],
            None => self.entries.push((key, vec![line])),
        }
    }

    /// Removes a header. Returns the removed lines.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let key = name.to_ascii_lowercase();
        let index = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns true if the header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the raw lines for a header.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        let key = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, lines)| lines.as_slice())
    }

    /// Returns the values for a header, without the name prefix.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|lines| lines.iter().map(|line| line_value(line)).collect())
            .unwrap_or_default()
    }

    /// Returns the first value for a header.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|lines| lines.first())
            .map(|line| line_value(line))
    }

    /// Returns all raw lines, grouped by name in first-seen order.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(_, lines)| lines.iter().cloned())
            .collect()
    }

    /// Iterates over `(lowercased name, raw lines)` groups.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, lines)| (name.as_str(), lines.as_slice()))
    }

    /// Returns the `name -> values` view.
    pub fn to_map(&self) -> Vec<(String, Vec<String>)> {
        self.entries
            .iter()
            .map(|(name, lines)| {
                (
                    name.clone(),
                    lines.iter().map(|line| line_value(line).to_string()).collect(),
                )
            })
            .collect()
    }

    /// Returns the number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits a raw header line into name and value.
pub(crate) fn split_line(line: &str) -> ClientResult<(&str, &str)> {
    let (name, value) = line.split_once(':').ok_or_else(|| {
        ClientError::invalid_argument(format!("Invalid header line: \"{}\"", line))
    })?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(ClientError::invalid_argument(format!(
            "Invalid header name in line: \"{}\"",
            line
        )));
    }
    Ok((name, value.trim()))
}

fn line_value(line: &str) -> &str {
    line.split_once(':')
        .map(|(_, value)| value.trim())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_groups_by_lowercased_name() {
        let bag = HeaderBag::from_lines([
            "Set-Cookie: a=1",
            "Content-Type: text/plain",
            "set-cookie: b=2",
        ])
        .unwrap();

        assert_eq!(bag.len(), 2);
        assert_eq!(
            bag.get("SET-COOKIE").unwrap(),
            &["Set-Cookie: a=1".to_string(), "set-cookie: b=2".to_string()]
        );
        assert_eq!(bag.values("set-cookie"), vec!["a=1", "b=2"]);
        assert_eq!(
            bag.lines(),
            vec!["Set-Cookie: a=1", "set-cookie: b=2", "Content-Type: text/plain"]
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut bag = HeaderBag::new();
        bag.append("Content-Length", "4");
        bag.append("Accept", "*/*");
        bag.set("content-length", "7");

        assert_eq!(bag.lines(), vec!["content-length: 7", "Accept: */*"]);
        assert_eq!(bag.first_value("Content-Length"), Some("7"));
    }

    #[test]
    fn test_remove() {
        let mut bag = HeaderBag::from_lines(["Transfer-Encoding: chunked"]).unwrap();
        assert!(bag.remove("transfer-encoding").is_some());
        assert!(bag.is_empty());
        assert!(bag.remove("transfer-encoding").is_none());
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert!(HeaderBag::from_lines(["no colon here"]).is_err());
        assert!(HeaderBag::from_lines([": value"]).is_err());
        assert!(HeaderBag::from_lines(["Bad Name: value"]).is_err());
    }

    #[test]
    fn test_to_map_strips_names() {
        let bag = HeaderBag::from_lines(["X-Foo: one", "X-Foo: two"]).unwrap();
        assert_eq!(
            bag.to_map(),
            vec![("x-foo".to_string(), vec!["one".to_string(), "two".to_string()])]
        );
    }
}
