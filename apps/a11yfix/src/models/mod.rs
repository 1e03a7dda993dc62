//! Shared data models: the rule catalog, issues, and repair results.

pub mod catalog;

use catalog::Level;
use serde::Serialize;

/// Snippet recorded by document-level issues; never located in the source.
pub const DOCUMENT_SNIPPET: &str = "(document)";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// A single detected defect, optionally fixed.
///
/// `auto_fixed` implies `fixed_snippet` is present; use [`Issue::fixed`] to
/// set both together. Location fields stay `None` until the location
/// resolver back-fills them from the pristine input.
pub struct Issue {
    pub rule_id: &'static str,
    pub wcag_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_code: Option<&'static str>,
    pub level: Level,
    pub message: String,
    pub original_snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_snippet: Option<String>,
    pub auto_fixed: bool,
    pub needs_manual_review: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub start_offset: Option<usize>,
    pub end_offset: Option<usize>,
}

impl Issue {
    /// New unfixed issue for `rule_id`, with codes copied from the catalog.
    pub fn new(rule_id: &'static str, message: impl Into<String>, snippet: impl Into<String>) -> Self {
        let rule = catalog::find(rule_id);
        Issue {
            rule_id,
            wcag_code: rule.map(|r| r.wcag_code).unwrap_or(""),
            local_code: rule.and_then(|r| r.local_code),
            level: rule.map(|r| r.level).unwrap_or(Level::A),
            message: message.into(),
            original_snippet: snippet.into(),
            fixed_snippet: None,
            auto_fixed: false,
            needs_manual_review: false,
            suggestion: None,
            line: None,
            column: None,
            start_offset: None,
            end_offset: None,
        }
    }

    /// Mark as auto-fixed with the replacement markup.
    pub fn fixed(mut self, snippet: impl Into<String>) -> Self {
        self.fixed_snippet = Some(snippet.into());
        self.auto_fixed = true;
        self
    }

    /// Flag for human review.
    pub fn review(mut self) -> Self {
        self.needs_manual_review = true;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_located(&self) -> bool {
        self.line.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Aggregated counts for a repair run.
pub struct Summary {
    pub total_issues: usize,
    pub auto_fixed: usize,
    pub needs_manual_review: usize,
}

impl Summary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        Summary {
            total_issues: issues.len(),
            auto_fixed: issues.iter().filter(|i| i.auto_fixed).count(),
            needs_manual_review: issues.iter().filter(|i| i.needs_manual_review).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Terminal result of a single `repair` call.
pub struct RepairResult {
    pub original_html: String,
    pub repaired_html: String,
    pub issues: Vec<Issue>,
    pub summary: Summary,
}

impl RepairResult {
    pub fn changed(&self) -> bool {
        self.original_html != self.repaired_html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_copies_catalog_codes() {
        let is = Issue::new(catalog::TH_SCOPE, "m", "<th>");
        assert_eq!(is.wcag_code, "1.3.1");
        assert_eq!(is.local_code, Some("HM1131101C"));
        assert!(!is.auto_fixed);
        assert!(!is.is_located());
    }

    #[test]
    fn test_fixed_sets_snippet_and_flag() {
        let is = Issue::new(catalog::IMG_ALT, "m", "<img>").fixed("<img alt=\"x\">").review();
        assert!(is.auto_fixed);
        assert_eq!(is.fixed_snippet.as_deref(), Some("<img alt=\"x\">"));
        assert!(is.needs_manual_review);
    }

    #[test]
    fn test_summary_counts() {
        let issues = vec![
            Issue::new(catalog::IMG_ALT, "a", "x").fixed("y").review(),
            Issue::new(catalog::TH_SCOPE, "b", "x").fixed("y"),
            Issue::new(catalog::FORM_LABEL, "c", "x").review(),
        ];
        let s = Summary::from_issues(&issues);
        assert_eq!(
            s,
            Summary {
                total_issues: 3,
                auto_fixed: 2,
                needs_manual_review: 2
            }
        );
    }

    #[test]
    fn test_issue_json_shape() {
        let is = Issue::new(catalog::SKIP_LINK, "m", DOCUMENT_SNIPPET).review();
        let v = serde_json::to_value(&is).unwrap();
        assert_eq!(v["ruleId"], "skip-link");
        assert_eq!(v["needsManualReview"], true);
        assert!(v["line"].is_null());
        assert!(v.get("fixedSnippet").is_none());
    }
}
