//! a11yfix core library.
//!
//! Repairs common accessibility defects in standalone HTML/CSS fragments
//! (WCAG 2.1 plus local code set identifiers), offline and statelessly.
//! Every defect is either fixed deterministically or reported for human
//! review; ambiguous markup is never rewritten speculatively.
//!
//! High-level modules:
//! - `engine`: the repair passes and the `repair(html, config)` entry point.
//! - `models`: rule catalog, issues, and repair results.
//! - `config`: engine configuration and `a11yfix.toml` discovery.
//! - `runner`: repairs files matched by glob patterns.
//! - `output`: human/JSON printers.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `utils`: supporting helpers.
//! - `error`: boundary-layer errors.
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod output;
pub mod runner;
pub mod utils;

pub use config::{ConfigInput, RepairConfig};
pub use engine::{repair, repair_with};
pub use models::{Issue, RepairResult, Summary};
