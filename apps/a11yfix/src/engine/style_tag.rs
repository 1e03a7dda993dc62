//! Relative font sizes inside embedded `<style>` blocks.
//!
//! Only `font-size` values are converted here; width removal and padding
//! compaction apply to inline styles only since selectors in a block may
//! cascade anywhere.

use super::matcher;
use super::style::convert_lengths;
use super::PassOutput;
use crate::config::RepairConfig;
use crate::models::catalog::CSS_STYLE_TAG;
use crate::models::Issue;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static STYLE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<style\b[^>]*>)(.*?)(</style\s*>)").expect("STYLE_BLOCK_RE: hardcoded regex is valid")
});

static FONT_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(font-size\s*:\s*)([^;}]+)").expect("FONT_SIZE_RE: hardcoded regex is valid")
});

/// Convert `font-size` lengths in a stylesheet body. `None` when unchanged.
pub fn convert_font_sizes(css: &str, config: &RepairConfig) -> Option<String> {
    let mut changed = false;
    let out = FONT_SIZE_RE.replace_all(css, |caps: &Captures<'_>| {
        match convert_lengths(&caps[2], config.base_px, config.base_pt) {
            Some(v) => {
                changed = true;
                format!("{}{}", &caps[1], v)
            }
            None => caps[0].to_string(),
        }
    });
    changed.then(|| out.into_owned())
}

/// `css-style-tag`: one issue per `<style>` block that changed.
pub fn style_tags_pass(html: &str, config: &RepairConfig) -> PassOutput {
    let mut issues = Vec::new();
    let html = matcher::rewrite(html, &STYLE_BLOCK_RE, |caps| {
        let css = convert_font_sizes(&caps[2], config)?;
        let fixed = format!("{}{}{}", &caps[1], css, &caps[3]);
        issues.push(
            Issue::new(
                CSS_STYLE_TAG,
                "Style block sets font sizes in absolute units; converted to em",
                &caps[0],
            )
            .fixed(fixed.clone()),
        );
        Some(fixed)
    });
    PassOutput { html, issues }
}
