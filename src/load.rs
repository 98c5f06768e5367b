//! Loading of JSONL stat dumps from a tree of worker-count directories.
//!
//! Layout on disk:
//! <root>/<nlambdas>/**/output-*.jsonl
//! where <nlambdas> is a purely numeric directory name giving the number of
//! parallel workers used for that configuration.

use crate::schema::StatsRecord;
use anyhow::Context;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A stats record tagged with where the loader found it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRecord {
    /// Worker count, from the numeric directory name.
    pub nlambdas: u64,
    /// Index of the source file within its worker-count directory.
    pub nrun: usize,
    /// False only for the reducer line (the last line of a file) when
    /// map-reduce mode is on.
    pub is_worker: bool,
    pub stats: StatsRecord,
}

/// Flat dataset accumulated over every discovered file.
pub type Dataset = Vec<TaggedRecord>;

/// Load every `output-*.jsonl` file under numeric-named directories below
/// `root` into one dataset.
///
/// Directories whose name appears in `forbidden` are skipped even when
/// numeric (failed runs, stale dumps). With `map_reduce` on, the last line
/// of each file is the reducer and gets `is_worker = false`.
///
/// Directories and files are visited in sorted path order, so `nrun`
/// assignment is stable across invocations.
pub fn load_dataset(
    root: &Path,
    forbidden: &BTreeSet<String>,
    map_reduce: bool,
) -> anyhow::Result<Dataset> {
    let output_re = Regex::new(r"^output-.*\.jsonl$")?;

    let dirs = numeric_candidate_dirs(root)?;

    let mut full: Dataset = Vec::new();
    for dir in &dirs {
        let name = match dir.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if forbidden.contains(name) {
            continue;
        }
        let nlambdas: u64 = name.parse().with_context(|| {
            format!("worker-count directory name out of range: {}", dir.display())
        })?;

        let files = output_files(dir, &output_re)?;

        for (nrun, fpath) in files.iter().enumerate() {
            full.extend(load_file(fpath, nlambdas, nrun, map_reduce)?);
        }
    }

    Ok(full)
}

/// Parse one output file into tagged records.
///
/// The per-file sequence is built first and the reducer flip applied to its
/// last element, so an empty file contributes nothing and can never touch a
/// record from an earlier file.
fn load_file(
    path: &Path,
    nlambdas: u64,
    nrun: usize,
    map_reduce: bool,
) -> anyhow::Result<Vec<TaggedRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read output file {}", path.display()))?;

    let mut records = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let stats: StatsRecord = serde_json::from_str(line)
            .with_context(|| format!("bad stats record at {}:{}", path.display(), lineno + 1))?;
        records.push(TaggedRecord {
            nlambdas,
            nrun,
            is_worker: true,
            stats,
        });
    }

    if map_reduce {
        if let Some(last) = records.last_mut() {
            last.is_worker = false;
        }
    }

    Ok(records)
}

/// All directories below `root` (any depth), sorted by path. Numeric-name
/// filtering happens at the caller so forbidden names can be reported
/// against the worker-count check in one place.
fn numeric_candidate_dirs(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("walk {}", root.display()))?;
        if entry.depth() > 0 && entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn output_files(dir: &Path, name_re: &Regex) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|n| name_re.is_match(n))
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
