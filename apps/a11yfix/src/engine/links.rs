//! Link semantics: accessible names, titles, and new-window disclosure.
//!
//! For each `<a href>` element, in order:
//! 1. nested images with a missing or blank `alt` get the placeholder alt
//!    (an image that names a link must itself have a name);
//! 2. the accessible name is the visible text, else the first non-blank
//!    image alt, else a non-blank `aria-label`;
//! 3. a link with no name gets placeholder text and a placeholder title;
//! 4. otherwise exactly one of the title / new-window branches applies.
//!
//! Anchors without `href` are never touched.

use super::matcher::{self, get_attribute, has_value, set_or_fill_attribute, visible_text, write_attribute};
use super::PassOutput;
use crate::config::{RepairConfig, TEXT_TOKEN};
use crate::models::catalog::{IMG_ALT, LINK_NEW_WINDOW, LINK_TEXT, LINK_TITLE};
use crate::models::Issue;
use regex::Regex;
use std::sync::LazyLock;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<a\b[^>]*>)(.*?)(</a\s*>)").expect("ANCHOR_RE: hardcoded regex is valid")
});

pub(crate) static IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("IMG_RE: hardcoded regex is valid"));

/// Wording that already discloses a new window.
const NEW_WINDOW_KEYWORDS: [&str; 4] = ["新視窗", "新窗口", "另開", "new window"];

pub(crate) fn anchors() -> &'static Regex {
    &ANCHOR_RE
}

/// A title discloses a new window through a known keyword or the configured
/// hint itself.
fn mentions_new_window(title: &str, hint: &str) -> bool {
    let lower = title.to_lowercase();
    let hint = hint.trim().to_lowercase();
    NEW_WINDOW_KEYWORDS.iter().any(|k| lower.contains(k)) || (!hint.is_empty() && lower.contains(&hint))
}

fn with_hint(hint: &str, text: &str) -> String {
    format!("{hint}：{text}")
}

fn opens_new_window(open: &str) -> bool {
    get_attribute(open, "target").is_some_and(|t| t.trim().eq_ignore_ascii_case("_blank"))
}

/// Fill blank `alt` on images inside a link body.
fn fix_nested_images(inner: &str, config: &RepairConfig, issues: &mut Vec<Issue>) -> String {
    matcher::rewrite(inner, &IMG_RE, |caps| {
        let tag = &caps[0];
        if has_value(tag, "alt") {
            return None;
        }
        let fixed = set_or_fill_attribute(tag, "alt", &config.placeholders.img_alt);
        issues.push(
            Issue::new(
                IMG_ALT,
                "Image inside a link has no alt text; the link has no other accessible name source",
                tag,
            )
            .fixed(fixed.clone())
            .review()
            .with_suggestion("Replace the placeholder with the purpose of the link"),
        );
        Some(fixed)
    })
}

/// Accessible name of a link: visible text, image alt, then `aria-label`.
pub fn accessible_name(open: &str, inner: &str) -> Option<String> {
    let text = visible_text(inner);
    if !text.is_empty() {
        return Some(text);
    }
    let from_img = IMG_RE.find_iter(inner).find_map(|m| {
        get_attribute(m.as_str(), "alt")
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
    });
    from_img.or_else(|| {
        get_attribute(open, "aria-label")
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
    })
}

fn repair_anchor(
    whole: &str,
    open: &str,
    inner: &str,
    close: &str,
    config: &RepairConfig,
    issues: &mut Vec<Issue>,
) -> Option<String> {
    get_attribute(open, "href")?;
    let ph = &config.placeholders;

    let inner = if config.is_enabled(IMG_ALT) {
        fix_nested_images(inner, config, issues)
    } else {
        inner.to_string()
    };

    let (open, inner) = match accessible_name(open, &inner) {
        None if config.is_enabled(LINK_TEXT) => {
            let body = if inner.trim().is_empty() {
                ph.link_text.clone()
            } else {
                format!("{inner}{}", ph.link_text)
            };
            let open = set_or_fill_attribute(open, "title", &ph.link_empty_title);
            let fixed = format!("{open}{body}{close}");
            issues.push(
                Issue::new(LINK_TEXT, "Link has no accessible name; placeholder text inserted", whole)
                    .fixed(fixed)
                    .review()
                    .with_suggestion("Replace the placeholder with text describing the link destination"),
            );
            (open, body)
        }
        None => (open.to_string(), inner),
        Some(name) => (title_branch(whole, open, &inner, close, &name, config, issues), inner),
    };

    let rebuilt = format!("{open}{inner}{close}");
    (rebuilt != whole).then_some(rebuilt)
}

/// Title and new-window handling for a link that has a name. At most one
/// issue is emitted.
fn title_branch(
    whole: &str,
    open: &str,
    inner: &str,
    close: &str,
    name: &str,
    config: &RepairConfig,
    issues: &mut Vec<Issue>,
) -> String {
    let ph = &config.placeholders;
    let blank = opens_new_window(open);
    let title_rule = config.is_enabled(LINK_TITLE);
    let window_rule = config.is_enabled(LINK_NEW_WINDOW);
    let title = get_attribute(open, "title")
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let (rule, message, new_open) = match title {
        None if title_rule => {
            let mut t = ph.link_title_template.replace(TEXT_TOKEN, name);
            let message = if blank && window_rule {
                t = with_hint(&ph.new_window_hint, &t);
                "Link has no title; filled from its text with a new-window notice"
            } else {
                "Link has no title; filled from its text"
            };
            (LINK_TITLE, message, set_or_fill_attribute(open, "title", &t))
        }
        None if blank && window_rule => (
            LINK_NEW_WINDOW,
            "Link opens a new window without telling the user",
            set_or_fill_attribute(open, "title", &with_hint(&ph.new_window_hint, name)),
        ),
        Some(t) if blank && window_rule && !mentions_new_window(t, &ph.new_window_hint) => (
            LINK_NEW_WINDOW,
            "Link opens a new window but its title does not say so",
            write_attribute(open, "title", &with_hint(&ph.new_window_hint, t)),
        ),
        _ => return open.to_string(),
    };
    issues.push(Issue::new(rule, message, whole).fixed(format!("{new_open}{inner}{close}")));
    new_open
}

/// Link semantics pass over every `<a>…</a>` span.
pub fn links_pass(html: &str, config: &RepairConfig) -> PassOutput {
    let mut issues = Vec::new();
    let html = matcher::rewrite(html, &ANCHOR_RE, |caps| {
        repair_anchor(&caps[0], &caps[1], &caps[2], &caps[3], config, &mut issues)
    });
    PassOutput { html, issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigInput;

    fn cfg() -> RepairConfig {
        RepairConfig::default()
    }

    fn cfg_json(s: &str) -> RepairConfig {
        RepairConfig::from_input(&ConfigInput::from_json_str(s).unwrap()).unwrap()
    }

    #[test]
    fn test_empty_link_gets_placeholders() {
        let out = links_pass(r#"<a href="/home"></a>"#, &cfg());
        assert_eq!(
            out.html,
            r#"<a href="/home" title="（請補上鏈結目的）">（請補上鏈結文字）</a>"#
        );
        assert_eq!(out.issues.len(), 1);
        let is = &out.issues[0];
        assert_eq!(is.rule_id, LINK_TEXT);
        assert!(is.auto_fixed && is.needs_manual_review);
        assert_eq!(is.fixed_snippet.as_deref(), Some(out.html.as_str()));
    }

    #[test]
    fn test_icon_link_keeps_markup_and_appends_text() {
        let out = links_pass(r#"<a href="/s"><i class="icon"></i></a>"#, &cfg());
        assert_eq!(
            out.html,
            r#"<a href="/s" title="（請補上鏈結目的）"><i class="icon"></i>（請補上鏈結文字）</a>"#
        );
    }

    #[test]
    fn test_existing_title_survives_link_text_fix() {
        let out = links_pass(r#"<a href="/s" title="Search"></a>"#, &cfg());
        assert_eq!(out.html, r#"<a href="/s" title="Search">（請補上鏈結文字）</a>"#);
    }

    #[test]
    fn test_image_link_alt_filled_and_used_as_name() {
        let out = links_pass(r#"<a href="/"><img src="logo.png"></a>"#, &cfg());
        assert_eq!(
            out.html,
            r#"<a href="/" title="（請補上圖片替代文字）"><img src="logo.png" alt="（請補上圖片替代文字）"></a>"#
        );
        let rules: Vec<_> = out.issues.iter().map(|i| i.rule_id).collect();
        assert_eq!(rules, vec![IMG_ALT, LINK_TITLE]);
        assert!(out.issues[0].needs_manual_review);
        assert!(!out.issues[1].needs_manual_review);
    }

    #[test]
    fn test_image_alt_used_as_name() {
        assert_eq!(
            accessible_name("<a href=\"/\">", r#"<img alt="" src="a"><img alt=" Home ">"#).as_deref(),
            Some("Home")
        );
        assert_eq!(
            accessible_name(r#"<a href="/" aria-label="Menu">"#, "<svg></svg>").as_deref(),
            Some("Menu")
        );
        assert_eq!(accessible_name("<a>", " <b> </b> "), None);
    }

    #[test]
    fn test_title_filled_from_template() {
        let c = cfg_json(r#"{"placeholders":{"linkTitle":"前往{text}"}}"#);
        let out = links_pass(r#"<a href="/news">最新 消息</a>"#, &c);
        assert_eq!(out.html, r#"<a href="/news" title="前往最新 消息">最新 消息</a>"#);
        assert_eq!(out.issues[0].rule_id, LINK_TITLE);
    }

    #[test]
    fn test_title_merges_new_window_hint() {
        let out = links_pass(r#"<a href="/x" target="_blank">連結</a>"#, &cfg());
        assert_eq!(
            out.html,
            r#"<a href="/x" target="_blank" title="在新視窗打開鏈結：連結">連結</a>"#
        );
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].rule_id, LINK_TITLE);
    }

    #[test]
    fn test_new_window_hint_when_title_rule_disabled() {
        let c = cfg_json(r#"{"rules":{"disabled":["link-title"]}}"#);
        let out = links_pass(r#"<a href="/x" target="_BLANK">Docs</a>"#, &c);
        assert_eq!(
            out.html,
            r#"<a href="/x" target="_BLANK" title="在新視窗打開鏈結：Docs">Docs</a>"#
        );
        assert_eq!(out.issues[0].rule_id, LINK_NEW_WINDOW);
        assert!(!out.issues[0].needs_manual_review);
    }

    #[test]
    fn test_existing_title_gets_hint_prepended() {
        let out = links_pass(r#"<a href="/x" target="_blank" title="說明">連結</a>"#, &cfg());
        assert_eq!(
            out.html,
            r#"<a href="/x" target="_blank" title="在新視窗打開鏈結：說明">連結</a>"#
        );
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].rule_id, LINK_NEW_WINDOW);
    }

    #[test]
    fn test_title_already_mentioning_new_window_untouched() {
        for html in [
            r#"<a href="/x" target="_blank" title="說明（另開視窗）">連結</a>"#,
            r#"<a href="/x" target="_blank" title="Docs (opens in New Window)">Docs</a>"#,
            r#"<a href="/x" title="Home">Home</a>"#,
        ] {
            let out = links_pass(html, &cfg());
            assert_eq!(out.html, html);
            assert!(out.issues.is_empty());
        }
    }

    #[test]
    fn test_custom_hint_not_prepended_twice() {
        let c = cfg_json(r#"{"placeholders":{"newWindowHint":"(external)"}}"#);
        for html in [
            r#"<a href="/g" target="_blank" title="Guide">Guide</a>"#,
            r#"<a href="/g" target="_blank">Guide</a>"#,
        ] {
            let first = links_pass(html, &c);
            assert!(first.html.contains(r#"title="(external)：Guide""#), "{}", first.html);
            let second = links_pass(&first.html, &c);
            assert_eq!(second.html, first.html);
            assert!(second.issues.is_empty());
        }
    }

    #[test]
    fn test_unquoted_href_with_trailing_slash_preserved() {
        let out = links_pass("<a href=/docs/>Docs</a>", &cfg());
        assert_eq!(out.html, r#"<a href=/docs/ title="Docs">Docs</a>"#);
    }

    #[test]
    fn test_anchor_without_href_untouched() {
        let html = r#"<a name="top"></a><a id="x"><img src="a.png"></a>"#;
        let out = links_pass(html, &cfg());
        assert_eq!(out.html, html);
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_all_link_rules_disabled_is_noop() {
        let c = cfg_json(r#"{"rules":{"enabled":["th-scope"]}}"#);
        let html = r#"<a href="/"></a><a href="/x" target="_blank">x</a>"#;
        let out = links_pass(html, &c);
        assert_eq!(out.html, html);
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_second_run_is_stable() {
        let html = r#"<a href="/"></a> <a href="/x" target="_blank">連結</a> <a href="/"><img src="a"></a>"#;
        let first = links_pass(html, &cfg());
        let second = links_pass(&first.html, &cfg());
        assert_eq!(second.html, first.html);
        assert!(second.issues.is_empty());
    }
}
