//! Tag and attribute matching on raw markup substrings.
//!
//! Nothing here builds a tree: passes locate spans with regular expressions
//! and then read or write attributes on the matched start-tag text. Output
//! outside a rewritten span is byte-for-byte the input, which keeps diffs
//! of repaired fragments minimal.
//!
//! Attribute names match case-insensitively; values may be double-quoted,
//! single-quoted, unquoted, or absent (`<input disabled>`).

use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("COMMENT_RE: hardcoded regex is valid"));

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("SCRIPT_RE: hardcoded regex is valid")
});

static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("STYLE_RE: hardcoded regex is valid")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("TAG_RE: hardcoded regex is valid"));

static NBSP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&nbsp;|&#160;|&#xa0;").expect("NBSP_RE: hardcoded regex is valid")
});

static WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WS_RE: hardcoded regex is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
/// One attribute inside a start tag, with byte ranges into the tag text.
pub struct Attr<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
    /// Whole attribute, `name="value"`.
    pub span: Range<usize>,
    /// Value without quotes.
    pub value_span: Option<Range<usize>>,
    pub quote: Option<char>,
}

fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace()
}

/// Byte offset just past `<` and the tag name.
fn name_end(tag: &str) -> usize {
    let bytes = tag.as_bytes();
    let mut i = usize::from(bytes.first() == Some(&b'<'));
    while i < bytes.len() && !is_space(bytes[i]) && bytes[i] != b'/' && bytes[i] != b'>' {
        i += 1;
    }
    i
}

/// Tokenize the attributes of a start tag such as `<a href="/x" hidden>`.
///
/// Tolerant of malformed input: an unterminated quoted value runs to the
/// end of the tag.
pub fn attributes(tag: &str) -> Vec<Attr<'_>> {
    let bytes = tag.as_bytes();
    let end = if tag.ends_with('>') { bytes.len() - 1 } else { bytes.len() };
    let mut out = Vec::new();
    let mut i = name_end(tag);
    while i < end {
        while i < end && (is_space(bytes[i]) || bytes[i] == b'/') {
            i += 1;
        }
        if i >= end {
            break;
        }
        let name_start = i;
        while i < end && !is_space(bytes[i]) && bytes[i] != b'=' && bytes[i] != b'/' {
            i += 1;
        }
        if i == name_start {
            // stray '='
            i += 1;
            continue;
        }
        let name_end = i;
        let mut j = i;
        while j < end && is_space(bytes[j]) {
            j += 1;
        }
        if j < end && bytes[j] == b'=' {
            j += 1;
            while j < end && is_space(bytes[j]) {
                j += 1;
            }
            let (value_span, quote, attr_end) = if j < end && (bytes[j] == b'"' || bytes[j] == b'\'') {
                let q = bytes[j];
                let vs = j + 1;
                let mut k = vs;
                while k < end && bytes[k] != q {
                    k += 1;
                }
                let close = if k < end { k + 1 } else { k };
                (vs..k, Some(q as char), close)
            } else {
                let vs = j;
                let mut k = vs;
                while k < end && !is_space(bytes[k]) {
                    k += 1;
                }
                (vs..k, None, k)
            };
            out.push(Attr {
                name: &tag[name_start..name_end],
                value: Some(&tag[value_span.clone()]),
                span: name_start..attr_end,
                value_span: Some(value_span),
                quote,
            });
            i = attr_end;
        } else {
            out.push(Attr {
                name: &tag[name_start..name_end],
                value: None,
                span: name_start..name_end,
                value_span: None,
                quote: None,
            });
            i = name_end;
        }
    }
    out
}

fn find_attr<'a>(tag: &'a str, name: &str) -> Option<Attr<'a>> {
    attributes(tag)
        .into_iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
}

/// Value of attribute `name`, `Some("")` for a valueless attribute, `None`
/// when absent.
pub fn get_attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    find_attr(tag, name).map(|a| a.value.unwrap_or(""))
}

/// Whether attribute `name` exists with a non-blank value.
pub fn has_value(tag: &str, name: &str) -> bool {
    get_attribute(tag, name).is_some_and(|v| !v.trim().is_empty())
}

/// Escape a value for a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}

/// New attributes go right after the last existing one (or the tag name),
/// so a trailing `/` inside an unquoted value is never mistaken for a
/// self-closing marker.
fn insert_attribute(tag: &str, name: &str, value: &str) -> String {
    let at = attributes(tag)
        .last()
        .map_or_else(|| name_end(tag), |a| a.span.end);
    format!("{} {}=\"{}\"{}", &tag[..at], name, escape_attr(value), &tag[at..])
}

fn replace_value(tag: &str, attr: &Attr<'_>, value: &str) -> String {
    match (&attr.value_span, attr.quote) {
        (Some(vs), Some('\'')) => {
            format!("{}{}{}", &tag[..vs.start], value.replace('\'', "&#39;"), &tag[vs.end..])
        }
        (Some(vs), Some(_)) => format!("{}{}{}", &tag[..vs.start], escape_attr(value), &tag[vs.end..]),
        _ => format!(
            "{}{}=\"{}\"{}",
            &tag[..attr.span.start],
            attr.name,
            escape_attr(value),
            &tag[attr.span.end..]
        ),
    }
}

/// Set attribute `name` only when it is absent or blank; a non-blank value
/// is never overwritten. Returns the (possibly unchanged) tag.
pub fn set_or_fill_attribute(tag: &str, name: &str, value: &str) -> String {
    match find_attr(tag, name) {
        Some(a) if a.value.is_some_and(|v| !v.trim().is_empty()) => tag.to_string(),
        Some(a) => replace_value(tag, &a, value),
        None => insert_attribute(tag, name, value),
    }
}

/// Set attribute `name`, replacing any existing value.
pub fn write_attribute(tag: &str, name: &str, value: &str) -> String {
    match find_attr(tag, name) {
        Some(a) => replace_value(tag, &a, value),
        None => insert_attribute(tag, name, value),
    }
}

/// Remove attribute `name` together with the whitespace before it.
pub fn remove_attribute(tag: &str, name: &str) -> String {
    match find_attr(tag, name) {
        Some(a) => {
            let start = tag[..a.span.start].trim_end().len();
            format!("{}{}", &tag[..start], &tag[a.span.end..])
        }
        None => tag.to_string(),
    }
}

/// Rewrite every match of `re` in `html`. Returning `None` from `f` keeps
/// the matched text as-is.
pub fn rewrite<F>(html: &str, re: &Regex, mut f: F) -> String
where
    F: FnMut(&Captures<'_>) -> Option<String>,
{
    re.replace_all(html, |caps: &Captures<'_>| {
        f(caps).unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Text a user would see: comments, scripts, styles, and tags removed,
/// non-breaking spaces folded, whitespace collapsed.
pub fn visible_text(markup: &str) -> String {
    let s = COMMENT_RE.replace_all(markup, " ");
    let s = SCRIPT_RE.replace_all(&s, " ");
    let s = STYLE_RE.replace_all(&s, " ");
    let s = TAG_RE.replace_all(&s, " ");
    let s = NBSP_RE.replace_all(&s, " ");
    WS_RE.replace_all(&s, " ").trim().to_string()
}
