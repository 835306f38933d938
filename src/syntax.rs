//! Template syntax: marker detection, escaping, and control-tag scanning.
//!
//! The two public helpers let callers decide whether a string needs
//! rendering at all ([`has_syntax`]) and embed literal text containing
//! markers without it being interpreted ([`escape`]). The tag scanner is
//! shared by the conditional and loop processors.

use regex::Regex;
use std::sync::LazyLock;

/// The four control sequences recognized by the engine.
const MARKERS: [&str; 4] = ["{{", "}}", "{%", "%}"];

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%\s*(.*?)\s*%\}").unwrap());

static FOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^for\s+([A-Za-z_]\w*)\s+in\s+([A-Za-z_]\w*)$").unwrap()
});

/// A control tag found in a template.
#[derive(Debug, PartialEq)]
pub(crate) enum Tag<'t> {
    If(&'t str),
    Else,
    EndIf,
    For { var: &'t str, list: &'t str },
    EndFor,
    /// Unrecognized tag body; left verbatim by every stage.
    Other,
}

/// A control tag together with its byte span in the scanned template.
#[derive(Debug)]
pub(crate) struct TagMatch<'t> {
    pub start: usize,
    pub end: usize,
    pub tag: Tag<'t>,
}

/// Scans a template for `{% ... %}` tags in order of appearance.
pub(crate) fn scan(template: &str) -> Vec<TagMatch<'_>> {
    TAG_RE
        .captures_iter(template)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            let inner = caps.get(1).unwrap().as_str();
            TagMatch { start: whole.start(), end: whole.end(), tag: classify(inner) }
        })
        .collect()
}

fn classify(inner: &str) -> Tag<'_> {
    if let Some(rest) = inner.strip_prefix("if") {
        if rest.starts_with(char::is_whitespace) {
            return Tag::If(rest.trim());
        }
    }
    if let Some(caps) = FOR_RE.captures(inner) {
        // Capture spans index into `inner`, which borrows from the template.
        let var = caps.get(1).unwrap();
        let list = caps.get(2).unwrap();
        return Tag::For {
            var: &inner[var.range()],
            list: &inner[list.range()],
        };
    }
    match inner {
        "else" => Tag::Else,
        "endif" => Tag::EndIf,
        "endfor" => Tag::EndFor,
        _ => Tag::Other,
    }
}

/// Reports whether a string contains any interpolation or control-block
/// marker, ignoring escaped occurrences.
///
/// Callers use this to skip rendering entirely for plain strings.
pub fn has_syntax(text: &str) -> bool {
    let bytes = text.as_bytes();
    for marker in MARKERS {
        let mut from = 0;
        while let Some(pos) = text[from..].find(marker) {
            let at = from + pos;
            if at == 0 || bytes[at - 1] != b'\\' {
                return true;
            }
            from = at + 1;
        }
    }
    false
}

/// Escapes the four control sequences by inserting a backslash before each
/// brace, so literal text can be embedded in a template without being
/// interpreted. Undo by removing the inserted backslashes.
pub fn escape(text: &str) -> String {
    text.replace("{{", r"\{\{")
        .replace("}}", r"\}\}")
        .replace("{%", r"\{%")
        .replace("%}", r"%\}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_classifies_tags() {
        let tags = scan("{% if a %}x{% else %}y{% endif %}{% for i in xs %}{% endfor %}{% junk %}");
        assert_eq!(tags.len(), 6);
        assert_eq!(tags[0].tag, Tag::If("a"));
        assert_eq!(tags[1].tag, Tag::Else);
        assert_eq!(tags[2].tag, Tag::EndIf);
        assert_eq!(tags[3].tag, Tag::For { var: "i", list: "xs" });
        assert_eq!(tags[4].tag, Tag::EndFor);
        assert_eq!(tags[5].tag, Tag::Other);
    }

    #[test]
    fn test_has_syntax() {
        assert!(has_syntax("hello {{ name }}"));
        assert!(has_syntax("{% if a %}"));
        assert!(has_syntax("stray }} closer"));
        assert!(!has_syntax("plain text { } %"));
    }

    #[test]
    fn test_escape_removes_syntax() {
        let text = "{{ name }} and {% if a %}b{% endif %}";
        let escaped = escape(text);
        assert!(!has_syntax(&escaped));
        assert_eq!(escaped.replace('\\', ""), text);
    }
}
