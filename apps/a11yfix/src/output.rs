//! Output rendering for the `repair` and `rules` commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form carries the
//! full issue records plus a top-level summary.

use crate::error::Error;
use crate::models::catalog::RULES;
use crate::models::{Issue, RepairResult};
use crate::runner::FileReport;
use crate::utils::{error_prefix, use_colors};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn paint(color: bool, s: &str, f: fn(&str) -> String) -> String {
    if color {
        f(s)
    } else {
        s.to_string()
    }
}

fn issue_line(file: &str, is: &Issue, color: bool) -> String {
    let (icon, tag) = match (is.auto_fixed, is.needs_manual_review) {
        (true, false) => (
            paint(color, "✔", |s| s.green().to_string()),
            paint(color, "⟦fixed⟧", |s| s.green().bold().to_string()),
        ),
        (true, true) => (
            paint(color, "▲", |s| s.yellow().to_string()),
            paint(color, "⟦review⟧", |s| s.yellow().bold().to_string()),
        ),
        _ => (
            paint(color, "◆", |s| s.blue().to_string()),
            paint(color, "⟦advice⟧", |s| s.blue().bold().to_string()),
        ),
    };
    let at = match (is.line, is.column) {
        (Some(l), Some(c)) => format!("{file}:{l}:{c}"),
        _ => file.to_string(),
    };
    let at = paint(color, &at, |s| s.bold().to_string());
    let mut line = format!("{} {} {} ❲{}❳ — {}", icon, tag, at, is.rule_id, is.message);
    if let Some(s) = &is.suggestion {
        line.push_str(&format!("\n    {} {}", paint(color, "hint:", |s| s.bright_black().to_string()), s));
    }
    line
}

fn print_errors(errors: &[Error]) {
    for e in errors {
        eprintln!("{} {}", error_prefix(), e);
    }
}

/// Print per-file repair reports. With `write`, changed files are listed as
/// written; otherwise `diff` adds a line diff per changed file.
pub fn print_repair(reports: &[FileReport], output: &str, write: bool, diff: bool, errors: &[Error]) {
    match output {
        "json" => {
            let out = compose_repair_json(reports, write, diff);
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        _ => {
            let color = use_colors(output);
            for r in reports {
                for is in &r.result.issues {
                    println!("{}", issue_line(&r.file, is, color));
                }
                if r.wrote {
                    println!("{} {}", paint(color, "✏️  repaired:", |s| s.green().bold().to_string()), r.file);
                } else if diff && r.changed() {
                    if let Some(d) = build_line_diff(&r.result.original_html, &r.result.repaired_html) {
                        println!("{} {}\n{}", paint(color, "---", |s| s.cyan().bold().to_string()), r.file, d);
                    }
                } else if !r.changed() && r.result.issues.is_empty() {
                    println!("{} {}", paint(color, "no issues:", |s| s.bright_black().to_string()), r.file);
                }
            }
            let summary = format!(
                "— Summary — files={} changed={} issues={} fixed={} review={}",
                reports.len(),
                reports.iter().filter(|r| r.changed()).count(),
                reports.iter().map(|r| r.result.summary.total_issues).sum::<usize>(),
                reports.iter().map(|r| r.result.summary.auto_fixed).sum::<usize>(),
                reports.iter().map(|r| r.result.summary.needs_manual_review).sum::<usize>(),
            );
            println!("{}", paint(color, &summary, |s| s.bold().to_string()));
        }
    }
    print_errors(errors);
}

/// Print the result of repairing stdin. Human mode writes the repaired
/// markup to stdout and the issues to stderr so the output can be piped.
pub fn print_single(res: &RepairResult, output: &str) {
    match output {
        "json" => println!("{}", serde_json::to_string_pretty(res).unwrap_or_default()),
        _ => {
            let color = use_colors(output);
            for is in &res.issues {
                eprintln!("{}", issue_line("<stdin>", is, color));
            }
            print!("{}", res.repaired_html);
        }
    }
}

/// Print the rule catalog.
pub fn print_rules(output: &str) {
    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&compose_rules_json()).unwrap_or_default()),
        _ => {
            let color = use_colors(output);
            for r in RULES {
                let fix = if r.can_auto_fix { "auto-fix" } else { "advisory" };
                println!(
                    "{:<20} WCAG {:<6} {:<3} {:<10} {:<9} {}",
                    paint(color, r.id, |s| s.bold().to_string()),
                    r.wcag_code,
                    r.level.as_str(),
                    r.local_code.unwrap_or("-"),
                    fix,
                    r.title
                );
            }
        }
    }
}

/// Line-oriented diff for repaired markup. Repairs rewrite within lines, so
/// when line counts match only the differing lines are shown; otherwise
/// both versions are printed in full.
pub fn build_line_diff(old: &str, new: &str) -> Option<String> {
    if old == new {
        return None;
    }
    let (ol, nl): (Vec<&str>, Vec<&str>) = (old.lines().collect(), new.lines().collect());
    let mut out = String::new();
    if ol.len() == nl.len() {
        for (i, (a, b)) in ol.iter().zip(nl.iter()).enumerate() {
            if a != b {
                out.push_str(&format!("@@ line {} @@\n-{}\n+{}\n", i + 1, a, b));
            }
        }
    } else {
        out.push_str("+++ new\n");
        out.push_str(new);
        out.push_str("\n--- old\n");
        out.push_str(old);
        out.push('\n');
    }
    Some(out.trim_end().to_string())
}

/// Compose repair JSON object (pure) for testing/snapshot purposes.
pub fn compose_repair_json(reports: &[FileReport], write: bool, diff: bool) -> JsonVal {
    let items: Vec<_> = reports
        .iter()
        .map(|r| {
            json!({
                "file": r.file,
                "changed": r.changed(),
                "wrote": r.wrote,
                "issues": r.result.issues,
                "summary": r.result.summary,
                "repairedHtml": if !write && r.changed() { Some(&r.result.repaired_html) } else { None },
                "diff": if diff && !write { build_line_diff(&r.result.original_html, &r.result.repaired_html) } else { None },
            })
        })
        .collect();
    let summary = json!({
        "files": reports.len(),
        "changed": reports.iter().filter(|r| r.changed()).count(),
        "wrote": reports.iter().filter(|r| r.wrote).count(),
        "totalIssues": reports.iter().map(|r| r.result.summary.total_issues).sum::<usize>(),
        "autoFixed": reports.iter().map(|r| r.result.summary.auto_fixed).sum::<usize>(),
        "needsManualReview": reports.iter().map(|r| r.result.summary.needs_manual_review).sum::<usize>(),
    });
    json!({"results": items, "summary": summary})
}

/// Compose the rule catalog as JSON (pure).
pub fn compose_rules_json() -> JsonVal {
    json!({ "rules": RULES })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepairConfig;
    use crate::engine::repair;

    fn report(file: &str, html: &str, wrote: bool) -> FileReport {
        FileReport {
            file: file.into(),
            result: repair(html, &RepairConfig::default()),
            wrote,
        }
    }

    #[test]
    fn test_compose_repair_json_preview_and_diff() {
        let reports = vec![report("a.html", "<th>x</th>", false), report("b.html", "<p>ok</p>", false)];
        let out = compose_repair_json(&reports, false, true);
        assert_eq!(out["summary"]["files"], 2);
        assert_eq!(out["summary"]["changed"], 1);
        assert_eq!(out["summary"]["wrote"], 0);
        assert_eq!(out["summary"]["autoFixed"], 1);
        assert_eq!(out["results"][0]["issues"][0]["ruleId"], "th-scope");
        assert_eq!(out["results"][0]["issues"][0]["wcagCode"], "1.3.1");
        assert!(out["results"][0]["repairedHtml"].is_string());
        assert!(out["results"][0]["diff"].is_string());
        assert!(out["results"][1]["repairedHtml"].is_null());
        assert!(out["results"][1]["diff"].is_null());
    }

    #[test]
    fn test_compose_repair_json_write_omits_preview() {
        let reports = vec![report("a.html", "<th>x</th>", true)];
        let out = compose_repair_json(&reports, true, true);
        assert_eq!(out["summary"]["wrote"], 1);
        assert!(out["results"][0]["repairedHtml"].is_null());
        assert!(out["results"][0]["diff"].is_null());
    }

    #[test]
    fn test_line_diff_shows_only_changed_lines() {
        let d = build_line_diff("<p>\n<th>x</th>\n</p>", "<p>\n<th scope=\"col\">x</th>\n</p>").unwrap();
        assert_eq!(d, "@@ line 2 @@\n-<th>x</th>\n+<th scope=\"col\">x</th>");
        assert!(build_line_diff("same", "same").is_none());
    }

    #[test]
    fn test_issue_line_plain() {
        let res = repair("<th>x</th>", &RepairConfig::default());
        let line = issue_line("t.html", &res.issues[0], false);
        assert!(line.starts_with("✔ ⟦fixed⟧ t.html:1:1 ❲th-scope❳ — "));
        assert!(line.contains("hint: Use scope=\"row\""));
    }

    #[test]
    fn test_compose_rules_json_lists_catalog() {
        let out = compose_rules_json();
        assert_eq!(out["rules"].as_array().map(|a| a.len()), Some(RULES.len()));
        assert_eq!(out["rules"][0]["id"], "img-alt");
    }
}
