//! Post-hoc source locations for issues.
//!
//! Each unlocated issue is matched against the pristine input by the first
//! verbatim occurrence of its original snippet. Lines and columns are
//! 1-based; columns count characters, offsets count bytes. Snippets that no
//! longer appear verbatim (e.g. produced from text an earlier pass already
//! rewrote) stay unlocated.
//!
//! Identical snippets all resolve to the first occurrence.

use crate::models::{Issue, DOCUMENT_SNIPPET};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

/// Locate the first occurrence of `snippet` in `source`.
pub fn locate(source: &str, snippet: &str) -> Option<Location> {
    if snippet.is_empty() || snippet == DOCUMENT_SNIPPET {
        return None;
    }
    let start = source.find(snippet)?;
    let before = &source[..start];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = source[line_start..start].chars().count() + 1;
    Some(Location {
        line,
        column,
        start,
        end: start + snippet.len(),
    })
}

/// Fill location fields of every issue not yet located.
pub fn resolve_locations(original: &str, issues: &mut [Issue]) {
    for issue in issues.iter_mut().filter(|i| !i.is_located()) {
        if let Some(loc) = locate(original, &issue.original_snippet) {
            issue.line = Some(loc.line);
            issue.column = Some(loc.column);
            issue.start_offset = Some(loc.start);
            issue.end_offset = Some(loc.end);
        }
    }
}
