//! Document header parsing.
//!
//! Notes may open with a `---` delimited header of `key: value` lines. Only
//! flat scalars are read; nested structures and lists are skipped. Keys and
//! values may be quoted, and an unquoted value ends at a ` #` comment, as in
//! YAML. This is enough to find the sensitivity flags and the document id.

use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// Header keys that declare a document sensitive or encrypted
pub const SENSITIVITY_KEYS: &[&str] = &["is_sensitive", "sensitive", "encrypted", "is_encrypted"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    fields: BTreeMap<&'a str, &'a str>,
    body: &'a str,
}

impl<'a> Frontmatter<'a> {
    /// Split `document` into header and body.
    ///
    /// A document without a header, or with an unterminated one, is all body.
    pub fn parse(document: &'a str) -> Self {
        let no_header = Self {
            fields: BTreeMap::new(),
            body: document,
        };

        let mut lines = document.split_inclusive('\n');
        match lines.next() {
            Some(first) if first.trim_end() == DELIMITER => {}
            _ => return no_header,
        }

        let mut consumed = document.split_inclusive('\n').next().map_or(0, str::len);
        let mut fields = BTreeMap::new();

        for line in lines {
            consumed += line.len();
            let trimmed = line.trim_end();

            if trimmed == DELIMITER {
                return Self {
                    fields,
                    body: &document[consumed..],
                };
            }

            // Indented lines belong to nested values
            if trimmed.starts_with([' ', '\t', '-', '#']) {
                continue;
            }
            if let Some((key, value)) = trimmed.split_once(':') {
                fields.insert(unquote(key.trim()), scalar(value));
            }
        }

        no_header
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.fields.get(key).copied().filter(|v| !v.is_empty())
    }

    /// Truthy scalar: `true`, `yes` or `on`, any case
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| {
            v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("on")
        })
    }

    /// Whether the header promises encrypted content
    pub fn declares_sensitive(&self) -> bool {
        SENSITIVITY_KEYS.iter().any(|k| self.flag(k))
    }

    pub fn id(&self) -> Option<&'a str> {
        self.get("id")
    }

    pub fn body(&self) -> &'a str {
        self.body
    }
}

/// A value with its quotes removed, or cut at a trailing comment when unquoted
fn scalar(raw: &str) -> &str {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if let Some(end) = raw.strip_prefix(quote).and_then(|rest| rest.find(quote)) {
            return &raw[1..=end];
        }
    }
    if raw.starts_with('#') {
        return "";
    }
    match raw.find(" #").or_else(|| raw.find("\t#")) {
        Some(end) => raw[..end].trim_end(),
        None => raw,
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote)) {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_header() {
        let doc = "---\nid: 42\ntitle: \"Bank accounts\"\nis_sensitive: true\n---\n# Body\ntext\n";
        let fm = Frontmatter::parse(doc);

        assert_eq!(fm.id(), Some("42"));
        assert_eq!(fm.get("title"), Some("Bank accounts"));
        assert!(fm.declares_sensitive());
        assert_eq!(fm.body(), "# Body\ntext\n");
    }

    #[test]
    fn no_header_is_all_body() {
        let doc = "# Title\nis_sensitive: true\n";
        let fm = Frontmatter::parse(doc);

        assert!(!fm.declares_sensitive());
        assert_eq!(fm.body(), doc);
    }

    #[test]
    fn unterminated_header_is_all_body() {
        let doc = "---\nis_sensitive: true\nno closing delimiter\n";
        let fm = Frontmatter::parse(doc);
        assert!(!fm.declares_sensitive());
        assert_eq!(fm.body(), doc);
    }

    #[test]
    fn every_sensitivity_key_counts() {
        for key in SENSITIVITY_KEYS {
            let doc = format!("---\n{key}: yes\n---\nbody\n");
            assert!(Frontmatter::parse(&doc).declares_sensitive(), "{key}");
        }
    }

    #[test]
    fn false_and_missing_flags() {
        let fm = Frontmatter::parse("---\nis_sensitive: false\nencrypted: \n---\n");
        assert!(!fm.declares_sensitive());
        assert_eq!(fm.get("encrypted"), None);
    }

    #[test]
    fn nested_values_are_skipped() {
        let doc = "---\ntags:\n  - sensitive: true\n  - work\nid: 'abc'\n---\n";
        let fm = Frontmatter::parse(doc);
        assert!(!fm.declares_sensitive());
        assert_eq!(fm.id(), Some("abc"));
        assert_eq!(fm.body(), "");
    }

    #[test]
    fn trailing_comments_are_ignored() {
        let doc = "---\nid: 7 # bank\nis_sensitive: true  # private\nsensitive: #off\n---\nbody\n";
        let fm = Frontmatter::parse(doc);

        assert!(fm.flag("is_sensitive"));
        assert!(fm.declares_sensitive());
        assert_eq!(fm.id(), Some("7"));
        assert_eq!(fm.get("sensitive"), None);
    }

    #[test]
    fn quoted_keys_and_values() {
        let doc = "---\n\"is_encrypted\": 'yes' # set by sync\ntitle: \"Rent # 4\"\nurl: a#b\n---\n";
        let fm = Frontmatter::parse(doc);

        assert!(fm.flag("is_encrypted"));
        assert_eq!(fm.get("title"), Some("Rent # 4"));
        assert_eq!(fm.get("url"), Some("a#b"));
    }

    #[test]
    fn crlf_header() {
        let fm = Frontmatter::parse("---\r\nsensitive: True\r\n---\r\nbody\r\n");
        assert!(fm.declares_sensitive());
        assert_eq!(fm.body(), "body\r\n");
    }
}
