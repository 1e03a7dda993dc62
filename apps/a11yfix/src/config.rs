//! Configuration: engine settings and project config discovery.
//!
//! The engine consumes an immutable [`RepairConfig`] resolved once from a
//! [`ConfigInput`] (caller overrides; unknown keys ignored). The binary
//! additionally discovers `a11yfix.toml|yaml|yml` from the repository root
//! (or closest ancestor) and merges it with CLI flags into an [`Effective`].
//!
//! Defaults:
//! - `basePx`: 16, `basePt`: 12, `removeWidth`: true
//! - all catalog rules enabled
//! - `output`: `human`; `write|diff|check`: false
//! - `include`: `**/*.html`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use crate::models::catalog;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_BASE_PX: f64 = 16.0;
pub const DEFAULT_BASE_PT: f64 = 12.0;
pub const DEFAULT_INCLUDE: &str = "**/*.html";

/// Token replaced by the accessible name in `placeholders.linkTitle`.
pub const TEXT_TOKEN: &str = "{text}";

const CONFIG_FILES: [&str; 3] = ["a11yfix.toml", "a11yfix.yaml", "a11yfix.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
/// Caller-supplied engine overrides. Every field is optional.
pub struct ConfigInput {
    #[serde(default)]
    pub rules: Option<RulesInput>,
    pub base_px: Option<f64>,
    pub base_pt: Option<f64>,
    pub remove_width: Option<bool>,
    #[serde(default)]
    pub placeholders: Option<PlaceholdersInput>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[rules]` section: explicit allow-list or deny-list of rule ids.
pub struct RulesInput {
    pub enabled: Option<Vec<String>>,
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholdersInput {
    pub link_text: Option<String>,
    pub link_empty_title: Option<String>,
    pub link_title: Option<String>,
    pub img_alt: Option<String>,
    pub iframe_title: Option<String>,
    pub new_window_hint: Option<String>,
}

impl ConfigInput {
    /// Parse a serialized (JSON) configuration object.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Layer `over` on top of `self`; set fields in `over` win, disabled
    /// lists accumulate.
    pub fn overlay(mut self, over: ConfigInput) -> Self {
        if let Some(r) = over.rules {
            let mut rules = self.rules.take().unwrap_or_default();
            if r.enabled.is_some() {
                rules.enabled = r.enabled;
            }
            rules.disabled.extend(r.disabled);
            self.rules = Some(rules);
        }
        self.base_px = over.base_px.or(self.base_px);
        self.base_pt = over.base_pt.or(self.base_pt);
        self.remove_width = over.remove_width.or(self.remove_width);
        if let Some(p) = over.placeholders {
            let mut ph = self.placeholders.take().unwrap_or_default();
            ph.link_text = p.link_text.or(ph.link_text);
            ph.link_empty_title = p.link_empty_title.or(ph.link_empty_title);
            ph.link_title = p.link_title.or(ph.link_title);
            ph.img_alt = p.img_alt.or(ph.img_alt);
            ph.iframe_title = p.iframe_title.or(ph.iframe_title);
            ph.new_window_hint = p.new_window_hint.or(ph.new_window_hint);
            self.placeholders = Some(ph);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Placeholder texts inserted by auto-fixes that need human review.
pub struct Placeholders {
    pub link_text: String,
    pub link_empty_title: String,
    /// Template for filled link titles; `{text}` becomes the accessible name.
    pub link_title_template: String,
    pub img_alt: String,
    pub iframe_title: String,
    pub new_window_hint: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Placeholders {
            link_text: "（請補上鏈結文字）".to_string(),
            link_empty_title: "（請補上鏈結目的）".to_string(),
            link_title_template: TEXT_TOKEN.to_string(),
            img_alt: "（請補上圖片替代文字）".to_string(),
            iframe_title: "（請補上框架標題）".to_string(),
            new_window_hint: "在新視窗打開鏈結".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Effective engine configuration. Built once per call, read-only after.
pub struct RepairConfig {
    enabled: Option<BTreeSet<String>>,
    disabled: BTreeSet<String>,
    pub base_px: f64,
    pub base_pt: f64,
    pub remove_width: bool,
    pub placeholders: Placeholders,
}

impl Default for RepairConfig {
    fn default() -> Self {
        RepairConfig {
            enabled: None,
            disabled: BTreeSet::new(),
            base_px: DEFAULT_BASE_PX,
            base_pt: DEFAULT_BASE_PT,
            remove_width: true,
            placeholders: Placeholders::default(),
        }
    }
}

impl RepairConfig {
    /// Resolve caller overrides onto defaults.
    ///
    /// Base sizes must be finite and positive. Unknown rule ids are kept
    /// (they simply never match a pass) but logged.
    pub fn from_input(input: &ConfigInput) -> Result<Self, ConfigError> {
        let mut cfg = RepairConfig::default();
        if let Some(rules) = input.rules.as_ref() {
            for id in rules.enabled.iter().flatten().chain(rules.disabled.iter()) {
                if !catalog::is_known(id) {
                    warn!(rule = %id, "ignoring unknown rule id");
                }
            }
            cfg.enabled = rules.enabled.as_ref().map(|v| v.iter().cloned().collect());
            cfg.disabled = rules.disabled.iter().cloned().collect();
        }
        if let Some(px) = input.base_px {
            cfg.base_px = positive("basePx", px)?;
        }
        if let Some(pt) = input.base_pt {
            cfg.base_pt = positive("basePt", pt)?;
        }
        if let Some(rw) = input.remove_width {
            cfg.remove_width = rw;
        }
        if let Some(p) = input.placeholders.as_ref() {
            let ph = &mut cfg.placeholders;
            let pick = |slot: &mut String, v: &Option<String>| {
                if let Some(v) = v {
                    *slot = v.clone();
                }
            };
            pick(&mut ph.link_text, &p.link_text);
            pick(&mut ph.link_empty_title, &p.link_empty_title);
            pick(&mut ph.link_title_template, &p.link_title);
            pick(&mut ph.img_alt, &p.img_alt);
            pick(&mut ph.iframe_title, &p.iframe_title);
            pick(&mut ph.new_window_hint, &p.new_window_hint);
        }
        Ok(cfg)
    }

    /// An explicit enabled-set runs exactly those ids; otherwise everything
    /// not disabled runs.
    pub fn is_enabled(&self, id: &str) -> bool {
        match &self.enabled {
            Some(set) => set.contains(id),
            None => !self.disabled.contains(id),
        }
    }

    pub fn any_enabled(&self, ids: &[&str]) -> bool {
        ids.iter().any(|id| self.is_enabled(id))
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidBase { name, value })
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[repair]` section controlling the CLI runner.
pub struct RunCfg {
    pub write: Option<bool>,
    pub diff: Option<bool>,
    pub check: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `a11yfix.toml|yaml`.
///
/// Engine keys (`basePx`, `[rules]`, `[placeholders]`, ...) sit at the top
/// level next to the runner keys.
pub struct ProjectConfig {
    pub include: Option<Vec<String>>,
    pub output: Option<String>,
    #[serde(default)]
    pub repair: Option<RunCfg>,
    #[serde(flatten)]
    pub engine: ConfigInput,
}

#[derive(Debug, Default, Clone)]
/// Values supplied on the command line. `None` means "not given".
pub struct Overrides {
    pub repo_root: Option<String>,
    pub config: Option<String>,
    pub output: Option<String>,
    pub write: Option<bool>,
    pub diff: Option<bool>,
    pub check: Option<bool>,
    pub engine: ConfigInput,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_found: bool,
    pub include: Vec<String>,
    pub output: String,
    pub write: bool,
    pub diff: bool,
    pub check: bool,
    pub repair: RepairConfig,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when an `a11yfix.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `ProjectConfig` from the first config file present in `root`.
pub fn load_config(root: &Path) -> Result<Option<ProjectConfig>, ConfigError> {
    for name in CONFIG_FILES {
        let p = root.join(name);
        if p.is_file() {
            return load_config_file(&p).map(Some);
        }
    }
    Ok(None)
}

/// Parse a config file, choosing the format by extension
/// (`.json`, `.yaml|.yml`, anything else as TOML).
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::from_str(&s)?),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        _ => toml::from_str(&s).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: Overrides) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let file_cfg = match cli.config.as_deref() {
        Some(p) => Some(load_config_file(&repo_root.join(p))?),
        None => load_config(&repo_root)?,
    };
    let config_found = file_cfg.is_some();
    let cfg = file_cfg.unwrap_or_default();

    let include = cfg
        .include
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| vec![DEFAULT_INCLUDE.to_string()]);

    let output = cli
        .output
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let write = cli
        .write
        .or_else(|| cfg.repair.as_ref().and_then(|r| r.write))
        .unwrap_or(false);
    let diff = cli
        .diff
        .or_else(|| cfg.repair.as_ref().and_then(|r| r.diff))
        .unwrap_or(false);
    let check = cli
        .check
        .or_else(|| cfg.repair.as_ref().and_then(|r| r.check))
        .unwrap_or(false);

    let repair = RepairConfig::from_input(&cfg.engine.overlay(cli.engine))?;

    Ok(Effective {
        repo_root,
        config_found,
        include,
        output,
        write,
        diff,
        check,
        repair,
    })
}
