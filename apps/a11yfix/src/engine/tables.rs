//! Table semantics: row headers and header-cell scope.

use super::matcher::{self, get_attribute, has_value, set_or_fill_attribute, visible_text};
use super::style::normalize_tag_style;
use super::PassOutput;
use crate::config::RepairConfig;
use crate::models::catalog::{TABLE_ROW_HEADER, TH_SCOPE};
use crate::models::Issue;
use regex::Regex;
use std::sync::LazyLock;

static TR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>.*?</tr\s*>").expect("TR_RE: hardcoded regex is valid"));

static TD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<td\b[^>]*>)(.*?)(</td\s*>)").expect("TD_RE: hardcoded regex is valid")
});

static TH_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<th\b[^>]*>").expect("TH_OPEN_RE: hardcoded regex is valid"));

/// Turn a `<td …>` start tag into `<th scope="row" …>`, normalizing its
/// inline style on the way.
fn promote_open_tag(open: &str, config: &RepairConfig) -> String {
    // `<td` is ASCII, so byte 3 is a char boundary
    let rest = &open[3..];
    let th = if get_attribute(open, "scope").is_some() {
        set_or_fill_attribute(&format!("<th{rest}"), "scope", "row")
    } else {
        format!("<th scope=\"row\"{rest}")
    };
    normalize_tag_style(&th, config).unwrap_or(th)
}

fn promote_row(row: &str, config: &RepairConfig, issues: &mut Vec<Issue>) -> Option<String> {
    if TH_OPEN_RE.is_match(row) {
        return None;
    }
    let caps = TD_RE
        .captures_iter(row)
        .find(|c| !visible_text(&c[2]).is_empty())?;
    let cell = caps.get(0)?;
    let new_cell = format!("{}{}</th>", promote_open_tag(&caps[1], config), &caps[2]);
    issues.push(
        Issue::new(
            TABLE_ROW_HEADER,
            "Data row has no header cell; first non-empty cell promoted to a row header",
            cell.as_str(),
        )
        .fixed(new_cell.clone()),
    );
    Some(format!("{}{}{}", &row[..cell.start()], new_cell, &row[cell.end()..]))
}

/// `table-row-header`: in each row without header cells, promote the first
/// data cell with visible text. Rows whose cells are all empty are skipped.
pub fn row_headers_pass(html: &str, config: &RepairConfig) -> PassOutput {
    let mut issues = Vec::new();
    let html = matcher::rewrite(html, &TR_RE, |caps| promote_row(&caps[0], config, &mut issues));
    PassOutput { html, issues }
}

/// `th-scope`: every header cell without a scope defaults to `scope="col"`.
pub fn th_scope_pass(html: &str, _config: &RepairConfig) -> PassOutput {
    let mut issues = Vec::new();
    let html = matcher::rewrite(html, &TH_OPEN_RE, |caps| {
        let tag = &caps[0];
        if has_value(tag, "scope") {
            return None;
        }
        let fixed = set_or_fill_attribute(tag, "scope", "col");
        issues.push(
            Issue::new(TH_SCOPE, "Header cell has no scope; defaulted to column", tag)
                .fixed(fixed.clone())
                .with_suggestion("Use scope=\"row\" if this cell heads a row"),
        );
        Some(fixed)
    });
    PassOutput { html, issues }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> RepairConfig {
        RepairConfig::default()
    }

    #[test]
    fn test_th_scope_defaults_to_col() {
        let out = th_scope_pass("<th>Name</th>", &cfg());
        assert_eq!(out.html, r#"<th scope="col">Name</th>"#);
        assert_eq!(out.issues.len(), 1);
        assert!(!out.issues[0].needs_manual_review);
        assert!(out.issues[0].auto_fixed);
    }

    #[test]
    fn test_th_scope_keeps_existing_and_ignores_thead() {
        let html = r#"<thead><tr><th scope="row">A</th></tr></thead>"#;
        let out = th_scope_pass(html, &cfg());
        assert_eq!(out.html, html);
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_first_non_empty_cell_promoted() {
        let html = "<tr><td>&nbsp;</td><td class=\"n\">Alice</td><td>30</td></tr>";
        let out = row_headers_pass(html, &cfg());
        assert_eq!(
            out.html,
            "<tr><td>&nbsp;</td><th scope=\"row\" class=\"n\">Alice</th><td>30</td></tr>"
        );
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].original_snippet, "<td class=\"n\">Alice</td>");
        assert!(!out.issues[0].needs_manual_review);
    }

    #[test]
    fn test_promoted_cell_style_normalized() {
        let html = r#"<tr><td style="width:120px;font-size:18px">Total</td></tr>"#;
        let out = row_headers_pass(html, &cfg());
        assert_eq!(
            out.html,
            r#"<tr><th scope="row" style="font-size:1.125em">Total</th></tr>"#
        );
    }

    #[test]
    fn test_rows_with_headers_or_no_text_unchanged() {
        let html = "<tr><th>H</th><td>x</td></tr><tr><td></td><td><img src=\"i.png\"></td></tr>";
        let out = row_headers_pass(html, &cfg());
        assert_eq!(out.html, html);
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_row_header_then_scope_pass_leaves_row_scope() {
        let first = row_headers_pass("<tr><td>A</td></tr>", &cfg());
        let second = th_scope_pass(&first.html, &cfg());
        assert_eq!(second.html, r#"<tr><th scope="row">A</th></tr>"#);
        assert!(second.issues.is_empty());
    }
}
