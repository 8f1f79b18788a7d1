//! `key=value` option maps.

use indexmap::IndexMap;
use serde::Serialize;

/// Insertion-ordered string option map attached to every node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Options(IndexMap<String, String>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated `key=value` list. See [`parse_key_value`].
    pub fn parse(source: &str) -> Self {
        parse_key_value(source)
    }

    /// Options holding only a positional `value`.
    pub fn value(value: impl Into<String>) -> Self {
        let mut options = Self::new();
        options.insert("value", value);
        options
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// First key present, in the given priority order.
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Numeric option, `None` when absent or not a non-negative integer.
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse a LaTeX-style option list such as `font-size=28pt, color={180, 95, 75}, border`.
///
/// Commas and `=` inside brace groups are literal. A bare key is a boolean
/// flag with value `"true"`, except that a trailing bare integer becomes the
/// positional `value` entry (`\空格[3]` gives `value=3`).
pub fn parse_key_value(source: &str) -> Options {
    let mut options = Options::new();
    if source.trim().is_empty() {
        return options;
    }

    let mut depth = 0i32;
    let mut key = String::new();
    let mut value = String::new();
    let mut in_value = false;

    for ch in source.chars() {
        match ch {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }

        if depth == 0 && ch == ',' {
            let k = key.trim();
            if !k.is_empty() {
                let v = if in_value { value.trim() } else { "true" };
                options.insert(k, v);
            }
            key.clear();
            value.clear();
            in_value = false;
        } else if depth == 0 && ch == '=' && !in_value {
            in_value = true;
        } else if in_value {
            value.push(ch);
        } else {
            key.push(ch);
        }
    }

    let k = key.trim();
    if !k.is_empty() {
        if in_value {
            options.insert(k, value.trim());
        } else if k.chars().all(|c| c.is_ascii_digit()) {
            options.insert("value", k);
        } else {
            options.insert(k, "true");
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(options: &Options) -> Vec<(&str, &str)> {
        options.iter().collect()
    }

    #[test]
    fn test_simple_pairs() {
        let opts = parse_key_value("font-size=28pt, n-column=8");
        assert_eq!(pairs(&opts), vec![("font-size", "28pt"), ("n-column", "8")]);
    }

    #[test]
    fn test_nested_braces_keep_commas() {
        let opts = parse_key_value("color={180, 95, 75}, x=1");
        assert_eq!(opts.get("color"), Some("{180, 95, 75}"));
        assert_eq!(opts.get("x"), Some("1"));
    }

    #[test]
    fn test_bare_flags() {
        let opts = parse_key_value("border, debug");
        assert_eq!(pairs(&opts), vec![("border", "true"), ("debug", "true")]);
    }

    #[test]
    fn test_trailing_number_is_value() {
        let opts = parse_key_value("3");
        assert_eq!(opts.get("value"), Some("3"));
        assert_eq!(opts.get_usize("value"), Some(3));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_key_value("").is_empty());
        assert!(parse_key_value("  ").is_empty());
    }

    #[test]
    fn test_value_may_contain_equals() {
        let opts = parse_key_value("a=b=c");
        assert_eq!(opts.get("a"), Some("b=c"));
    }

    #[test]
    fn test_get_any_priority() {
        let opts = parse_key_value("value=2, height=5");
        assert_eq!(opts.get_any(&["height", "value"]), Some("5"));
        assert_eq!(opts.get_any(&["missing"]), None);
    }
}
