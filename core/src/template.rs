//! URL path templates with `:name` placeholders.
//!
//! A placeholder is a `:` followed by one or more word characters
//! (`[A-Za-z0-9_]`). A colon not followed by a word character is literal.
//!
//! Templates resolve either positionally, where the i-th placeholder takes the
//! i-th value, or by name against an attribute map. Placeholders without a
//! value are left in the output untouched.

use serde_json::{Map, Value};

/// A base path such as `/users/:user/projects`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
}

/// One placeholder occurrence: byte range of the whole token and its name.
struct Token<'a> {
    start: usize,
    end: usize,
    name: &'a str,
}

impl PathTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in order of appearance, repeats included.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> + '_ {
        tokens(&self.raw).map(|token| token.name)
    }

    /// Fill placeholders left to right from `values`.
    ///
    /// Extra values are ignored; placeholders past the end of `values` stay
    /// unresolved.
    pub fn resolve_ordered(&self, values: &[Value]) -> String {
        let mut values = values.iter();
        self.substitute(|_| values.next().map(render_value))
    }

    /// Replace each placeholder whose name is a key of `values`.
    pub fn resolve_named(&self, values: &Map<String, Value>) -> String {
        self.substitute(|name| values.get(name).map(render_value))
    }

    fn substitute(&self, mut lookup: impl FnMut(&str) -> Option<String>) -> String {
        let mut out = String::with_capacity(self.raw.len());
        let mut cursor = 0;
        for token in tokens(&self.raw) {
            out.push_str(&self.raw[cursor..token.start]);
            match lookup(token.name) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&self.raw[token.start..token.end]),
            }
            cursor = token.end;
        }
        out.push_str(&self.raw[cursor..]);
        out
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for PathTemplate {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// True if `path` still contains a placeholder token.
pub fn has_placeholder(path: &str) -> bool {
    tokens(path).next().is_some()
}

/// Text used when a value is spliced into a path.
///
/// Strings are inserted verbatim, everything else as its JSON text. Nothing
/// is percent-encoded: values must already be URL-safe path segments, or the
/// transport rejects the URL.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_word(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn tokens(raw: &str) -> impl Iterator<Item = Token<'_>> + '_ {
    let bytes = raw.as_bytes();
    let mut pos = 0;
    std::iter::from_fn(move || {
        while pos < bytes.len() {
            if bytes[pos] == b':' {
                let start = pos;
                let mut end = pos + 1;
                while end < bytes.len() && is_word(bytes[end]) {
                    end += 1;
                }
                if end > start + 1 {
                    pos = end;
                    return Some(Token {
                        start,
                        end,
                        name: &raw[start + 1..end],
                    });
                }
            }
            pos += 1;
        }
        None
    })
}
