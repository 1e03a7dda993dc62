//! Rule-based repair engine.
//!
//! The input string flows through a fixed, ordered list of passes. Each pass
//! is a function `(text, config) -> (text', issues)`; the pipeline threads
//! the text from one pass to the next and appends every pass's issues to
//! the ledger. A pass whose rules are all disabled is skipped.
//!
//! After the last pass, issue locations are back-filled against the
//! pristine input and the result is aggregated. `repair` never fails:
//! markup a pass cannot match is left unchanged.

pub mod advisory;
pub mod images;
pub mod links;
pub mod location;
pub mod matcher;
pub mod style;
pub mod style_tag;
pub mod tables;

use crate::config::{ConfigInput, RepairConfig};
use crate::error::ConfigError;
use crate::models::catalog::*;
use crate::models::{Issue, RepairResult, Summary};
use tracing::{debug, trace};

/// Output of a single pass.
pub struct PassOutput {
    pub html: String,
    pub issues: Vec<Issue>,
}

type PassFn = fn(&str, &RepairConfig) -> PassOutput;

struct Pass {
    name: &'static str,
    rules: &'static [&'static str],
    run: PassFn,
}

static PIPELINE: &[Pass] = &[
    Pass {
        name: "links",
        rules: &[LINK_TEXT, LINK_TITLE, LINK_NEW_WINDOW, IMG_ALT],
        run: links::links_pass,
    },
    Pass {
        name: "img-alt",
        rules: &[IMG_ALT],
        run: images::img_alt_pass,
    },
    Pass {
        name: "iframe-title",
        rules: &[IFRAME_TITLE],
        run: images::iframe_title_pass,
    },
    Pass {
        name: "inline-styles",
        rules: &[CSS_RELATIVE_UNITS],
        run: style::inline_styles_pass,
    },
    Pass {
        name: "row-headers",
        rules: &[TABLE_ROW_HEADER],
        run: tables::row_headers_pass,
    },
    Pass {
        name: "th-scope",
        rules: &[TH_SCOPE],
        run: tables::th_scope_pass,
    },
    Pass {
        name: "style-tags",
        rules: &[CSS_STYLE_TAG],
        run: style_tag::style_tags_pass,
    },
    Pass {
        name: "skip-link",
        rules: &[SKIP_LINK],
        run: advisory::skip_link_pass,
    },
    Pass {
        name: "color-contrast",
        rules: &[COLOR_CONTRAST],
        run: advisory::color_contrast_pass,
    },
    Pass {
        name: "fake-button",
        rules: &[FAKE_BUTTON],
        run: advisory::fake_button_pass,
    },
    Pass {
        name: "form-label",
        rules: &[FORM_LABEL],
        run: advisory::form_label_pass,
    },
];

/// Repair an HTML fragment.
pub fn repair(html: &str, config: &RepairConfig) -> RepairResult {
    let (repaired, mut issues) = PIPELINE.iter().fold(
        (html.to_string(), Vec::new()),
        |(text, mut ledger), pass| {
            if !config.any_enabled(pass.rules) {
                trace!(pass = pass.name, "skipped, rules disabled");
                return (text, ledger);
            }
            let out = (pass.run)(&text, config);
            debug!(pass = pass.name, issues = out.issues.len(), "pass complete");
            ledger.extend(out.issues);
            (out.html, ledger)
        },
    );
    location::resolve_locations(html, &mut issues);
    let summary = Summary::from_issues(&issues);
    RepairResult {
        original_html: html.to_string(),
        repaired_html: repaired,
        issues,
        summary,
    }
}

/// Repair with optional caller overrides, resolving them first.
pub fn repair_with(html: &str, input: Option<&ConfigInput>) -> Result<RepairResult, ConfigError> {
    let config = match input {
        Some(i) => RepairConfig::from_input(i)?,
        None => RepairConfig::default(),
    };
    Ok(repair(html, &config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> RepairResult {
        repair(html, &RepairConfig::default())
    }

    fn rules_of(res: &RepairResult) -> Vec<&'static str> {
        res.issues.iter().map(|i| i.rule_id).collect()
    }

    #[test]
    fn test_scenario_a_image_alt() {
        let res = run(r#"<img src="logo.png">"#);
        assert_eq!(res.repaired_html, r#"<img src="logo.png" alt="（請補上圖片替代文字）">"#);
        assert_eq!(rules_of(&res), vec![IMG_ALT]);
        assert!(res.issues[0].auto_fixed && res.issues[0].needs_manual_review);
        assert_eq!(res.issues[0].line, Some(1));
        assert_eq!(res.issues[0].column, Some(1));
    }

    #[test]
    fn test_scenario_b_empty_link() {
        let res = run(r#"<a href="/home"></a>"#);
        assert_eq!(
            res.repaired_html,
            r#"<a href="/home" title="（請補上鏈結目的）">（請補上鏈結文字）</a>"#
        );
        assert_eq!(rules_of(&res), vec![LINK_TEXT]);
        assert!(res.issues[0].needs_manual_review);
    }

    #[test]
    fn test_scenario_c_inline_style() {
        let res = run(r#"<p style="font-size:16px;width:200px">x</p>"#);
        assert_eq!(res.repaired_html, r#"<p style="font-size:1em">x</p>"#);
        assert_eq!(rules_of(&res), vec![CSS_RELATIVE_UNITS]);
    }

    #[test]
    fn test_scenario_d_th_scope() {
        let res = run("<th>Name</th>");
        assert_eq!(res.repaired_html, r#"<th scope="col">Name</th>"#);
        assert_eq!(rules_of(&res), vec![TH_SCOPE]);
        assert!(!res.issues[0].needs_manual_review);
    }

    #[test]
    fn test_scenario_e_new_window_title() {
        let res = run(r#"<a href="/x" target="_blank" title="說明">連結</a>"#);
        assert_eq!(
            res.repaired_html,
            r#"<a href="/x" target="_blank" title="在新視窗打開鏈結：說明">連結</a>"#
        );
        assert_eq!(rules_of(&res), vec![LINK_NEW_WINDOW]);
    }

    const PAGE: &str = r#"<header><nav><a href="/"><img src="logo.png"></a></nav></header>
<main>
  <style>.t { font-size: 18px }</style>
  <p style="color:#333;padding-top:8px;padding-right:8px;padding-bottom:8px;padding-left:8px">Intro</p>
  <a href="/doc.pdf" target="_blank">年報</a>
  <iframe src="map.html"></iframe>
  <table>
    <tr><th>Name</th><th>Age</th></tr>
    <tr><td style="width:80px">Alice</td><td>30</td></tr>
  </table>
  <div onclick="go()">Go</div>
  <input type="text" name="q">
</main>"#;

    #[test]
    fn test_full_page_pipeline() {
        let res = run(PAGE);
        let rules = rules_of(&res);
        assert_eq!(
            rules,
            vec![
                IMG_ALT,
                LINK_TITLE,
                LINK_TITLE,
                IFRAME_TITLE,
                CSS_RELATIVE_UNITS,
                CSS_RELATIVE_UNITS,
                TABLE_ROW_HEADER,
                TH_SCOPE,
                TH_SCOPE,
                CSS_STYLE_TAG,
                SKIP_LINK,
                COLOR_CONTRAST,
                FAKE_BUTTON,
                FORM_LABEL,
            ]
        );
        assert!(res.repaired_html.contains(r#"<p style="color:#333;padding:0.5em">Intro</p>"#));
        assert!(res.repaired_html.contains(r#"<th scope="row">Alice</th>"#));
        assert!(res.repaired_html.contains(".t { font-size: 1.125em }"));
        assert!(res
            .repaired_html
            .contains(r#"title="在新視窗打開鏈結：年報">年報</a>"#));
        assert_eq!(res.summary.total_issues, rules.len());
        assert_eq!(res.summary.auto_fixed, 10);
        assert_eq!(res.summary.needs_manual_review, 6);
        // every auto-fixed issue carries its replacement
        assert!(res.issues.iter().all(|i| !i.auto_fixed || i.fixed_snippet.is_some()));
    }

    #[test]
    fn test_locations_point_into_original() {
        let res = run(PAGE);
        let iframe = res.issues.iter().find(|i| i.rule_id == IFRAME_TITLE).unwrap();
        assert_eq!(iframe.line, Some(6));
        assert_eq!(iframe.column, Some(3));
        let (s, e) = (iframe.start_offset.unwrap(), iframe.end_offset.unwrap());
        assert_eq!(&PAGE[s..e], r#"<iframe src="map.html">"#);
        let skip = res.issues.iter().find(|i| i.rule_id == SKIP_LINK).unwrap();
        assert!(skip.line.is_none());
    }

    #[test]
    fn test_determinism() {
        assert_eq!(run(PAGE), run(PAGE));
    }

    #[test]
    fn test_second_run_fixes_nothing_new() {
        let first = run(PAGE);
        let second = run(&first.repaired_html);
        assert!(second.summary.auto_fixed <= first.summary.auto_fixed);
        assert!(second.issues.iter().all(|i| !i.auto_fixed));
        assert_eq!(second.repaired_html, first.repaired_html);
    }

    #[test]
    fn test_malformed_input_does_not_fail() {
        for html in ["", "<", "<a href", "<table><tr><td>x", "<img src=\"a\" alt=\"", "</a></tr>", "<<>>"] {
            let res = run(html);
            assert_eq!(res.original_html, html);
        }
    }

    #[test]
    fn test_disabled_rules_skip_passes() {
        let input = ConfigInput::from_json_str(r#"{"rules":{"enabled":["th-scope"]}}"#).unwrap();
        let res = repair_with(r#"<img src="a"><th>x</th><a href="/"></a>"#, Some(&input)).unwrap();
        assert_eq!(rules_of(&res), vec![TH_SCOPE]);
        assert_eq!(res.repaired_html, r#"<img src="a"><th scope="col">x</th><a href="/"></a>"#);
    }

    #[test]
    fn test_repair_with_rejects_bad_base() {
        let input = ConfigInput::from_json_str(r#"{"basePx":-1}"#).unwrap();
        assert!(repair_with("<p></p>", Some(&input)).is_err());
        assert!(repair_with("<p></p>", None).is_ok());
    }

    #[test]
    fn test_clean_fragment_has_no_issues() {
        let html = r#"<p>Hello <a href="/a" title="About">About</a></p>"#;
        let res = run(html);
        assert!(res.issues.is_empty());
        assert!(!res.changed());
    }
}
