//! Non-text content outside links: `<img>` alternatives and `<iframe>`
//! titles. Both fixes insert placeholders and are flagged for review.

use super::links::IMG_RE;
use super::matcher::{self, get_attribute, has_value, set_or_fill_attribute};
use super::PassOutput;
use crate::config::RepairConfig;
use crate::models::catalog::{IFRAME_TITLE, IMG_ALT};
use crate::models::Issue;
use regex::Regex;
use std::sync::LazyLock;

static IFRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<iframe\b[^>]*>").expect("IFRAME_RE: hardcoded regex is valid"));

/// `img-alt`: add a placeholder `alt` to images that have none. An
/// explicit `alt=""` marks a decorative image and is kept.
pub fn img_alt_pass(html: &str, config: &RepairConfig) -> PassOutput {
    let mut issues = Vec::new();
    let html = matcher::rewrite(html, &IMG_RE, |caps| {
        let tag = &caps[0];
        if get_attribute(tag, "alt").is_some() {
            return None;
        }
        let fixed = set_or_fill_attribute(tag, "alt", &config.placeholders.img_alt);
        issues.push(
            Issue::new(IMG_ALT, "Image has no alt attribute", tag)
                .fixed(fixed.clone())
                .review()
                .with_suggestion("Describe the image, or use alt=\"\" if it is purely decorative"),
        );
        Some(fixed)
    });
    PassOutput { html, issues }
}

/// `iframe-title`: add a placeholder `title` to frames without one.
pub fn iframe_title_pass(html: &str, config: &RepairConfig) -> PassOutput {
    let mut issues = Vec::new();
    let html = matcher::rewrite(html, &IFRAME_RE, |caps| {
        let tag = &caps[0];
        if has_value(tag, "title") {
            return None;
        }
        let fixed = set_or_fill_attribute(tag, "title", &config.placeholders.iframe_title);
        issues.push(
            Issue::new(IFRAME_TITLE, "Inline frame has no title", tag)
                .fixed(fixed.clone())
                .review()
                .with_suggestion("Replace the placeholder with a short description of the frame content"),
        );
        Some(fixed)
    });
    PassOutput { html, issues }
}
