//! Detection-only checks. These passes never change the markup; every
//! issue they emit needs a human decision.
//!
//! Occurrence caps are counted per call so large documents do not flood
//! the report.

use super::links::anchors;
use super::matcher::{get_attribute, has_value, visible_text};
use super::style::{parse_declarations, styled_tags};
use super::PassOutput;
use crate::config::RepairConfig;
use crate::models::catalog::{COLOR_CONTRAST, FAKE_BUTTON, FORM_LABEL, SKIP_LINK};
use crate::models::{Issue, DOCUMENT_SNIPPET};
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

pub const COLOR_CONTRAST_CAP: usize = 5;
pub const FAKE_BUTTON_CAP: usize = 10;

static LANDMARK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(nav|header|main)\b").expect("LANDMARK_RE: hardcoded regex is valid")
});

static SKIP_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)skip|跳到|跳至|跳過|主要內容|主要内容|main content")
        .expect("SKIP_TEXT_RE: hardcoded regex is valid")
});

static CLICKABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:div|span)\b[^>]*>").expect("CLICKABLE_RE: hardcoded regex is valid")
});

static LABEL_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<label\b[^>]*>").expect("LABEL_OPEN_RE: hardcoded regex is valid"));

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<label\b[^>]*>.*?</label\s*>").expect("LABEL_RE: hardcoded regex is valid")
});

static CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(input|select|textarea)\b[^>]*>").expect("CONTROL_RE: hardcoded regex is valid")
});

fn advisory(rule: &'static str, message: &str, snippet: &str, suggestion: &str) -> Issue {
    Issue::new(rule, message, snippet)
        .review()
        .with_suggestion(suggestion)
}

fn is_skip_anchor(open: &str, inner: &str) -> bool {
    let Some(href) = get_attribute(open, "href") else {
        return false;
    };
    if !href.trim_start().starts_with('#') {
        return false;
    }
    let marked = ["class", "id"]
        .iter()
        .filter_map(|a| get_attribute(open, a))
        .any(|v| v.to_ascii_lowercase().contains("skip"));
    marked || SKIP_TEXT_RE.is_match(&visible_text(inner))
}

/// `skip-link`: documents with landmarks should offer a skip link.
pub fn skip_link_pass(html: &str, _config: &RepairConfig) -> PassOutput {
    let mut issues = Vec::new();
    let has_landmark = LANDMARK_RE.is_match(html);
    let has_skip = anchors()
        .captures_iter(html)
        .any(|c| is_skip_anchor(&c[1], &c[2]));
    if has_landmark && !has_skip {
        issues.push(advisory(
            SKIP_LINK,
            "Document has navigation landmarks but no link to skip to the main content",
            DOCUMENT_SNIPPET,
            "Add <a href=\"#main\" class=\"skip-link\">跳到主要內容</a> as the first focusable element",
        ));
    }
    PassOutput {
        html: html.to_string(),
        issues,
    }
}

/// `color-contrast`: inline text colors without a background color.
pub fn color_contrast_pass(html: &str, _config: &RepairConfig) -> PassOutput {
    let issues = styled_tags()
        .find_iter(html)
        .filter(|m| {
            let Some(style) = get_attribute(m.as_str(), "style") else {
                return false;
            };
            let decls = parse_declarations(style);
            decls.iter().any(|d| d.property.eq_ignore_ascii_case("color"))
                && !decls.iter().any(|d| {
                    d.property.eq_ignore_ascii_case("background-color")
                        || d.property.eq_ignore_ascii_case("background")
                })
        })
        .take(COLOR_CONTRAST_CAP)
        .map(|m| {
            advisory(
                COLOR_CONTRAST,
                "Text color is set without a background color; contrast cannot be guaranteed",
                m.as_str(),
                "Declare a background-color and check the pair reaches a 4.5:1 contrast ratio",
            )
        })
        .collect();
    PassOutput {
        html: html.to_string(),
        issues,
    }
}

/// `fake-button`: clickable `div`/`span` that keyboard users cannot reach.
/// Passing requires both `role="button"` and `tabindex="0"`.
pub fn fake_button_pass(html: &str, _config: &RepairConfig) -> PassOutput {
    let issues = CLICKABLE_RE
        .find_iter(html)
        .filter(|m| {
            let tag = m.as_str();
            if get_attribute(tag, "onclick").is_none() {
                return false;
            }
            let role = get_attribute(tag, "role").is_some_and(|r| r.trim().eq_ignore_ascii_case("button"));
            let focusable = get_attribute(tag, "tabindex").is_some_and(|t| t.trim() == "0");
            !(role && focusable)
        })
        .take(FAKE_BUTTON_CAP)
        .map(|m| {
            advisory(
                FAKE_BUTTON,
                "Element handles clicks but is not exposed as a keyboard-operable button",
                m.as_str(),
                "Use a <button>, or add role=\"button\", tabindex=\"0\" and a key handler",
            )
        })
        .collect();
    PassOutput {
        html: html.to_string(),
        issues,
    }
}

fn within(spans: &[Range<usize>], at: usize) -> bool {
    spans.iter().any(|r| r.contains(&at))
}

/// `form-label`: controls without a programmatic label. A control counts
/// as labelled by `aria-label`, `aria-labelledby`, a `<label for>` naming
/// its id, or an enclosing `<label>`.
pub fn form_label_pass(html: &str, _config: &RepairConfig) -> PassOutput {
    let label_for: HashSet<&str> = LABEL_OPEN_RE
        .find_iter(html)
        .filter_map(|m| get_attribute(m.as_str(), "for"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    let wrapping: Vec<Range<usize>> = LABEL_RE.find_iter(html).map(|m| m.range()).collect();

    let issues = CONTROL_RE
        .captures_iter(html)
        .filter_map(|c| {
            let m = c.get(0)?;
            let tag = m.as_str();
            if c[1].eq_ignore_ascii_case("input")
                && get_attribute(tag, "type").is_some_and(|t| t.trim().eq_ignore_ascii_case("hidden"))
            {
                return None;
            }
            let labelled = has_value(tag, "aria-label")
                || has_value(tag, "aria-labelledby")
                || get_attribute(tag, "id").is_some_and(|id| label_for.contains(id.trim()))
                || within(&wrapping, m.start());
            (!labelled).then(|| {
                advisory(
                    FORM_LABEL,
                    "Form control has no associated label",
                    tag,
                    "Add <label for=\"…\"> with the control's id, or an aria-label",
                )
            })
        })
        .collect();
    PassOutput {
        html: html.to_string(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> RepairConfig {
        RepairConfig::default()
    }

    #[test]
    fn test_skip_link_missing() {
        let out = skip_link_pass("<header><nav><a href=\"/\">Home</a></nav></header>", &cfg());
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].original_snippet, DOCUMENT_SNIPPET);
        assert!(!out.issues[0].auto_fixed);
        assert!(out.issues[0].needs_manual_review);
    }

    #[test]
    fn test_skip_link_recognized() {
        for html in [
            "<a href=\"#main\">Skip to main content</a><nav></nav>",
            "<a href=\"#c\" class=\"skip-nav\">:::</a><main></main>",
            "<a href=\"#content\">跳到主要內容</a><header></header>",
        ] {
            assert!(skip_link_pass(html, &cfg()).issues.is_empty(), "{html}");
        }
    }

    #[test]
    fn test_skip_link_not_needed_without_landmarks() {
        assert!(skip_link_pass("<p>hi</p>", &cfg()).issues.is_empty());
    }

    #[test]
    fn test_color_without_background_capped() {
        let one = r#"<span style="color:#777">x</span>"#;
        let html = one.repeat(8);
        let out = color_contrast_pass(&html, &cfg());
        assert_eq!(out.issues.len(), COLOR_CONTRAST_CAP);
        assert_eq!(out.html, html);
        let ok = r#"<p style="color:#000;background-color:#fff">x</p><p style="background-color:red">y</p>"#;
        assert!(color_contrast_pass(ok, &cfg()).issues.is_empty());
    }

    #[test]
    fn test_fake_button_rules_and_cap() {
        let html = r#"<div onclick="go()">a</div><span onclick="go()" role="button" tabindex="0">b</span><div role="button" onclick="x()">c</div><div>d</div>"#;
        let out = fake_button_pass(html, &cfg());
        assert_eq!(out.issues.len(), 2);
        let many = r#"<span onclick="f()">x</span>"#.repeat(12);
        assert_eq!(fake_button_pass(&many, &cfg()).issues.len(), FAKE_BUTTON_CAP);
    }

    #[test]
    fn test_form_labels() {
        let html = concat!(
            r#"<label for="q">Search</label><input id="q" type="text">"#,
            r#"<input type="hidden" name="t">"#,
            r#"<input type="email" aria-label="Email">"#,
            r#"<label>Age <input type="number"></label>"#,
            r#"<select name="city"></select>"#,
            r#"<textarea aria-labelledby=""></textarea>"#,
        );
        let out = form_label_pass(html, &cfg());
        let snippets: Vec<_> = out.issues.iter().map(|i| i.original_snippet.as_str()).collect();
        assert_eq!(
            snippets,
            vec![r#"<select name="city">"#, r#"<textarea aria-labelledby="">"#]
        );
        assert!(out.issues.iter().all(|i| !i.auto_fixed && i.fixed_snippet.is_none()));
    }
}
