//! Static rule catalog: identifiers, WCAG success criteria, local code set
//! identifiers, conformance level, and auto-fix capability.
//!
//! The table is process-wide and never mutated. Passes look rules up by id
//! when they emit issues so every issue carries the same regulatory codes
//! as the catalog listing.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// WCAG conformance level.
pub enum Level {
    A,
    AA,
    AAA,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::A => "A",
            Level::AA => "AA",
            Level::AAA => "AAA",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// A single catalog entry.
pub struct Rule {
    pub id: &'static str,
    pub wcag_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_code: Option<&'static str>,
    pub level: Level,
    pub title: &'static str,
    pub can_auto_fix: bool,
}

pub const IMG_ALT: &str = "img-alt";
pub const LINK_TEXT: &str = "link-text";
pub const LINK_TITLE: &str = "link-title";
pub const LINK_NEW_WINDOW: &str = "link-new-window";
pub const IFRAME_TITLE: &str = "iframe-title";
pub const CSS_RELATIVE_UNITS: &str = "css-relative-units";
pub const CSS_STYLE_TAG: &str = "css-style-tag";
pub const TABLE_ROW_HEADER: &str = "table-row-header";
pub const TH_SCOPE: &str = "th-scope";
pub const SKIP_LINK: &str = "skip-link";
pub const COLOR_CONTRAST: &str = "color-contrast";
pub const FAKE_BUTTON: &str = "fake-button";
pub const FORM_LABEL: &str = "form-label";

pub static RULES: &[Rule] = &[
    Rule {
        id: IMG_ALT,
        wcag_code: "1.1.1",
        local_code: Some("HM1110100C"),
        level: Level::A,
        title: "Images must have a text alternative",
        can_auto_fix: true,
    },
    Rule {
        id: LINK_TEXT,
        wcag_code: "2.4.4",
        local_code: Some("HM1244100C"),
        level: Level::A,
        title: "Links must have an accessible name",
        can_auto_fix: true,
    },
    Rule {
        id: LINK_TITLE,
        wcag_code: "2.4.4",
        local_code: Some("HM1244101C"),
        level: Level::A,
        title: "Links should describe their purpose in a title",
        can_auto_fix: true,
    },
    Rule {
        id: LINK_NEW_WINDOW,
        wcag_code: "3.2.5",
        local_code: Some("HM3325100C"),
        level: Level::AAA,
        title: "Links opening a new window must say so",
        can_auto_fix: true,
    },
    Rule {
        id: IFRAME_TITLE,
        wcag_code: "4.1.2",
        local_code: Some("HM4412100C"),
        level: Level::A,
        title: "Inline frames must have a title",
        can_auto_fix: true,
    },
    Rule {
        id: CSS_RELATIVE_UNITS,
        wcag_code: "1.4.4",
        local_code: Some("CS1144100C"),
        level: Level::AA,
        title: "Inline styles should use relative units",
        can_auto_fix: true,
    },
    Rule {
        id: CSS_STYLE_TAG,
        wcag_code: "1.4.4",
        local_code: Some("CS1144101C"),
        level: Level::AA,
        title: "Style blocks should use relative font sizes",
        can_auto_fix: true,
    },
    Rule {
        id: TABLE_ROW_HEADER,
        wcag_code: "1.3.1",
        local_code: Some("HM1131100C"),
        level: Level::A,
        title: "Data table rows should have a header cell",
        can_auto_fix: true,
    },
    Rule {
        id: TH_SCOPE,
        wcag_code: "1.3.1",
        local_code: Some("HM1131101C"),
        level: Level::A,
        title: "Header cells must declare a scope",
        can_auto_fix: true,
    },
    Rule {
        id: SKIP_LINK,
        wcag_code: "2.4.1",
        local_code: Some("HM1241100C"),
        level: Level::A,
        title: "Pages with navigation should offer a skip link",
        can_auto_fix: false,
    },
    Rule {
        id: COLOR_CONTRAST,
        wcag_code: "1.4.3",
        local_code: Some("CS1143100C"),
        level: Level::AA,
        title: "Foreground colors should declare a background color",
        can_auto_fix: false,
    },
    Rule {
        id: FAKE_BUTTON,
        wcag_code: "2.1.1",
        local_code: Some("HM1211100C"),
        level: Level::A,
        title: "Clickable elements must be keyboard operable",
        can_auto_fix: false,
    },
    Rule {
        id: FORM_LABEL,
        wcag_code: "1.3.1",
        local_code: Some("HM1131200C"),
        level: Level::A,
        title: "Form controls must have a label",
        can_auto_fix: false,
    },
];

/// Look up a rule by id.
pub fn find(id: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.id == id)
}

/// Whether `id` names a catalog rule.
pub fn is_known(id: &str) -> bool {
    find(id).is_some()
}
