//! Inline style normalization.
//!
//! A style value is decomposed into ordered declarations, absolute lengths
//! (`px`, `pt`) and `rem` are converted to `em`, `width` is optionally
//! dropped, and four equal `padding-*` longhands collapse into a single
//! `padding`. Declaration order is preserved; the collapsed `padding` takes
//! the slot of the first longhand encountered.
//!
//! Conventions: `1em = basePx px = basePt pt`, and `rem` maps 1:1 to `em`.

use super::matcher::{self, get_attribute, remove_attribute, write_attribute};
use super::PassOutput;
use crate::config::RepairConfig;
use crate::models::catalog::CSS_RELATIVE_UNITS;
use crate::models::Issue;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|[^\w.#-])(-?(?:\d+(?:\.\d+)?|\.\d+))(px|pt|rem)\b")
        .expect("LENGTH_RE: hardcoded regex is valid")
});

static PLAIN_LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?(?:\d+(?:\.\d+)?|\.\d+))([a-z%]*)$").expect("PLAIN_LENGTH_RE: hardcoded regex is valid")
});

static STYLED_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<[a-z][a-z0-9-]*\b[^>]*\bstyle\s*=[^>]*>").expect("STYLED_TAG_RE: hardcoded regex is valid")
});

const PADDING_SIDES: [&str; 4] = ["padding-top", "padding-right", "padding-bottom", "padding-left"];

#[derive(Debug, Clone, PartialEq, Eq)]
/// One `property: value` pair. `value` is `None` for a segment without `:`.
pub struct Declaration {
    pub property: String,
    pub value: Option<String>,
}

impl Declaration {
    fn is(&self, name: &str) -> bool {
        self.property.eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOutcome {
    pub style: String,
    pub changed: bool,
}

/// Split a style attribute value into trimmed declarations, in source order.
pub fn parse_declarations(style: &str) -> Vec<Declaration> {
    style
        .split(';')
        .map(str::trim)
        .filter(|seg| !seg.is_empty())
        .map(|seg| match seg.split_once(':') {
            Some((p, v)) => Declaration {
                property: p.trim().to_string(),
                value: Some(v.trim().to_string()),
            },
            None => Declaration {
                property: seg.to_string(),
                value: None,
            },
        })
        .collect()
}

fn serialize(decls: &[Declaration]) -> String {
    decls
        .iter()
        .map(|d| match &d.value {
            Some(v) => format!("{}:{}", d.property, v),
            None => d.property.clone(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Round to four decimals and drop trailing zeros.
pub fn format_number(v: f64) -> String {
    let s = format!("{:.4}", (v * 10000.0).round() / 10000.0);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Convert a single length to `em`. Returns `None` for units this engine
/// does not convert.
pub fn to_em(value: f64, unit: &str, base_px: f64, base_pt: f64) -> Option<String> {
    let em = match unit.to_ascii_lowercase().as_str() {
        "px" => value / base_px,
        "pt" => value / base_pt,
        "rem" => value,
        _ => return None,
    };
    if !em.is_finite() {
        return None;
    }
    Some(format!("{}em", format_number(em)))
}

/// Convert every `px`/`pt`/`rem` length inside a declaration value.
/// Returns `None` when nothing changed. Values containing `url(` are left
/// alone so resource paths are never touched.
pub fn convert_lengths(value: &str, base_px: f64, base_pt: f64) -> Option<String> {
    if value.to_ascii_lowercase().contains("url(") {
        return None;
    }
    let mut changed = false;
    let out = LENGTH_RE.replace_all(value, |caps: &Captures<'_>| {
        let parsed = caps[2].parse::<f64>().ok().filter(|n| n.is_finite());
        match parsed.and_then(|n| to_em(n, &caps[3], base_px, base_pt)) {
            Some(em) => {
                changed = true;
                format!("{}{}", &caps[1], em)
            }
            None => caps[0].to_string(),
        }
    });
    changed.then(|| out.into_owned())
}

fn parse_length(value: &str) -> Option<(f64, String)> {
    let v = value.trim().to_ascii_lowercase();
    let caps = PLAIN_LENGTH_RE.captures(&v)?;
    let n = caps[1].parse::<f64>().ok()?;
    Some((n, caps[2].to_string()))
}

fn same_length(a: &str, b: &str) -> bool {
    match (parse_length(a), parse_length(b)) {
        (Some((x, ux)), Some((y, uy))) => x == y && (ux == uy || x == 0.0),
        _ => false,
    }
}

/// Collapse four equal `padding-*` longhands. Returns true when collapsed.
fn compact_padding(decls: &mut Vec<Declaration>) -> bool {
    let last_value = |side: &str| {
        decls
            .iter()
            .rev()
            .find(|d| d.is(side))
            .and_then(|d| d.value.clone())
    };
    let values: Vec<Option<String>> = PADDING_SIDES.iter().map(|s| last_value(s)).collect();
    let Some(first) = values[0].clone() else {
        return false;
    };
    if !values.iter().all(|v| v.as_deref().is_some_and(|v| same_length(v, &first))) {
        return false;
    }
    let is_side = |d: &Declaration| PADDING_SIDES.iter().any(|s| d.is(s));
    let Some(slot) = decls.iter().position(is_side) else {
        return false;
    };
    let value = decls[slot].value.clone().unwrap_or(first);
    let mut out = Vec::with_capacity(decls.len() - 3);
    for (i, d) in decls.drain(..).enumerate() {
        if i == slot {
            out.push(Declaration {
                property: "padding".to_string(),
                value: Some(value.clone()),
            });
        } else if !is_side(&d) {
            out.push(d);
        }
    }
    *decls = out;
    true
}

/// Normalize an inline style value per `config`. Callers own issue creation.
pub fn normalize_style(style: &str, config: &RepairConfig) -> StyleOutcome {
    let mut changed = false;
    let mut decls = Vec::new();
    for mut d in parse_declarations(style) {
        if config.remove_width && d.is("width") {
            changed = true;
            continue;
        }
        if let Some(v) = d.value.as_deref() {
            if let Some(nv) = convert_lengths(v, config.base_px, config.base_pt) {
                d.value = Some(nv);
                changed = true;
            }
        }
        decls.push(d);
    }
    if compact_padding(&mut decls) {
        changed = true;
    }
    if !changed {
        return StyleOutcome {
            style: style.to_string(),
            changed,
        };
    }
    StyleOutcome {
        style: serialize(&decls),
        changed,
    }
}

/// Apply [`normalize_style`] to the `style` attribute of a start tag.
/// Returns `None` when the tag has no style or nothing changed. An emptied
/// style drops the attribute.
pub fn normalize_tag_style(tag: &str, config: &RepairConfig) -> Option<String> {
    let style = get_attribute(tag, "style")?;
    let outcome = normalize_style(style, config);
    if !outcome.changed {
        return None;
    }
    if outcome.style.is_empty() {
        Some(remove_attribute(tag, "style"))
    } else {
        Some(write_attribute(tag, "style", &outcome.style))
    }
}

/// Every start tag carrying an inline style.
pub(crate) fn styled_tags() -> &'static Regex {
    &STYLED_TAG_RE
}

/// `css-relative-units`: normalize every inline style in place.
pub fn inline_styles_pass(html: &str, config: &RepairConfig) -> PassOutput {
    let mut issues = Vec::new();
    let html = matcher::rewrite(html, &STYLED_TAG_RE, |caps| {
        let tag = &caps[0];
        let fixed = normalize_tag_style(tag, config)?;
        issues.push(
            Issue::new(
                CSS_RELATIVE_UNITS,
                "Inline style uses absolute units or a fixed width; converted to relative units",
                tag,
            )
            .fixed(fixed.clone()),
        );
        Some(fixed)
    });
    PassOutput { html, issues }
}
