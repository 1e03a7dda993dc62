//! Batch repair of HTML files matched by glob patterns.
//!
//! Targets are expanded relative to the repository root, repaired in
//! parallel, and returned sorted by display path so output stays
//! deterministic. Failures on one file never stop the others; they are
//! collected next to the reports.

use crate::config::RepairConfig;
use crate::engine;
use crate::error::Error;
use crate::models::RepairResult;
use crate::utils::display_path;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of repairing one file.
#[derive(Debug)]
pub struct FileReport {
    /// Path relative to the repository root.
    pub file: String,
    pub result: RepairResult,
    pub wrote: bool,
}

impl FileReport {
    pub fn changed(&self) -> bool {
        self.result.changed()
    }
}

/// Expand `patterns` under `root`. Literal paths are accepted as patterns
/// too. Duplicates are removed and only regular files are kept.
pub fn collect_targets(root: &Path, patterns: &[String]) -> (Vec<PathBuf>, Vec<Error>) {
    let mut targets = BTreeSet::new();
    let mut errors = Vec::new();
    for pat in patterns {
        let abs = root.join(pat).to_string_lossy().to_string();
        match glob::glob(&abs) {
            Ok(paths) => {
                for entry in paths {
                    match entry {
                        Ok(p) if p.is_file() => {
                            targets.insert(p);
                        }
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "skipping unreadable glob entry"),
                    }
                }
            }
            Err(source) => errors.push(Error::Pattern {
                pattern: pat.clone(),
                source,
            }),
        }
    }
    (targets.into_iter().collect(), errors)
}

fn repair_file(root: &Path, path: &Path, config: &RepairConfig, write: bool) -> Result<FileReport, Error> {
    let html = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let result = engine::repair(&html, config);
    let wrote = write && result.changed();
    if wrote {
        fs::write(path, &result.repaired_html).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let file = display_path(path, root);
    debug!(file = %file, issues = result.issues.len(), wrote, "repaired");
    Ok(FileReport { file, result, wrote })
}

/// Repair every file matched by `patterns`. When `write` is true, changed
/// files are rewritten in place.
pub fn run_repair(
    root: &Path,
    patterns: &[String],
    config: &RepairConfig,
    write: bool,
) -> (Vec<FileReport>, Vec<Error>) {
    let (targets, mut errors) = collect_targets(root, patterns);
    let outcomes: Vec<Result<FileReport, Error>> = targets
        .par_iter()
        .map(|path| repair_file(root, path, config, write))
        .collect();

    let mut reports = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(r) => reports.push(r),
            Err(e) => {
                warn!(error = %e, "file skipped");
                errors.push(e);
            }
        }
    }
    reports.sort_by(|a, b| a.file.cmp(&b.file));
    (reports, errors)
}
