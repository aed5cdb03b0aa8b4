// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Snapshot aggregation.
//!
//! The external profiler leaves one JSON file per run under
//! `<results folder>/<sanitized url>/data/`, named after the run's epoch
//! millisecond timestamp (`1396015563123.json`). This module turns such a
//! directory into a [`Page`]: the most recent usable snapshot supplies the
//! page's current metrics, and every usable snapshot adds one
//! [`TimingSample`] to its history.
//!
//! Two kinds of outcome are kept apart:
//!
//! - fatal errors ([`Error`]): the data directory cannot be listed, a file
//!   cannot be read or is not JSON. They abort the whole run.
//! - skips ([`Skip`]): a file is not named like a snapshot, or predates the
//!   `metrics` format. These are ignored silently.
//!
//! A metric's `average` is only used when it is a JSON number, both for the
//! page's current metrics and for the history.

use crate::error::{Error, Result};
use crate::options::DevperfOptions;
use crate::page::{Page, ResultsDocument, TimingSample, RESERVED_PAGE_FIELDS};
use crate::sanitize::sanitize_folder_name;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Length of the timestamp prefix of a snapshot file name.
pub const TIMESTAMP_LEN: usize = 13;

/// Extension following the timestamp in a snapshot file name.
pub const SNAPSHOT_EXTENSION: &str = ".json";

/// Name of the per-page directory holding snapshots.
pub const DATA_DIR: &str = "data";

/// Metrics copied into every [`TimingSample`].
pub const TIMING_METRICS: [&str; 4] = [
    "timeToFirstByte",
    "onDOMReadyTime",
    "windowOnLoadTime",
    "httpTrafficCompleted",
];

/// A directory entry considered for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    /// File name within the data directory.
    pub name: String,
    /// Leading integer of the name, if it starts with digits.
    pub timestamp: Option<u64>,
}

impl SnapshotFile {
    /// Describe a file name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let timestamp = leading_integer(&name);
        Self { name, timestamp }
    }

    /// The 13-character timestamp prefix, if the name is a snapshot name.
    ///
    /// A name qualifies when the first `.json` in it starts right after the
    /// first 13 characters.
    pub fn timestamp_prefix(&self) -> Option<&str> {
        let idx = self.name.find(SNAPSHOT_EXTENSION)?;
        let prefix = &self.name[..idx];
        (prefix.chars().count() == TIMESTAMP_LEN).then_some(prefix)
    }
}

fn leading_integer(name: &str) -> Option<u64> {
    let end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    name[..end].parse().ok()
}

/// Most recent first; names without a leading integer sort last.
pub fn compare_recent_first(a: &SnapshotFile, b: &SnapshotFile) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| b.name.cmp(&a.name))
}

/// Why a file did not contribute to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// The name is not `<13 characters>.json`.
    NotASnapshot,
    /// The file holds no non-empty `metrics` object.
    LegacyFormat,
}

/// A usable snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The 13-character timestamp prefix of the file name.
    pub timestamp: String,
    /// Metric statistics by name (`average`, `median`, ...).
    pub metrics: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Average of a metric, if the metric exists and has a numeric one.
    pub fn average(&self, name: &str) -> Option<&Number> {
        match self.metrics.get(name)?.get("average")? {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    fn timing(&self, name: &'static str, path: &Path) -> Result<Option<Number>> {
        if !self.metrics.contains_key(name) {
            return Err(Error::MissingTimingMetric {
                path: path.to_path_buf(),
                metric: name,
            });
        }
        Ok(self.average(name).cloned())
    }

    /// Build the history sample for this snapshot.
    ///
    /// Fails if one of [`TIMING_METRICS`] is absent from the snapshot.
    pub fn timing_sample(&self, path: &Path) -> Result<TimingSample> {
        let [ttfb, dom_ready, on_load, traffic] = TIMING_METRICS;
        Ok(TimingSample {
            timestamp: self.timestamp.clone(),
            time_to_first_byte: self.timing(ttfb, path)?,
            on_dom_ready_time: self.timing(dom_ready, path)?,
            window_on_load_time: self.timing(on_load, path)?,
            http_traffic_completed: self.timing(traffic, path)?,
        })
    }
}

/// Result of reading one directory entry.
#[derive(Debug, Clone)]
pub enum SnapshotOutcome {
    /// The file is a usable snapshot.
    Snapshot(Snapshot),
    /// The file is ignored.
    Skipped(Skip),
}

/// Read one entry of a data directory.
///
/// Any JSON document is accepted. Documents that are not objects, or whose
/// `metrics` is absent, `null`, empty or not an object, are legacy files.
pub fn read_snapshot(dir: &Path, file: &SnapshotFile) -> Result<SnapshotOutcome> {
    let Some(timestamp) = file.timestamp_prefix() else {
        return Ok(SnapshotOutcome::Skipped(Skip::NotASnapshot));
    };

    let path = dir.join(&file.name);
    let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let mut document: Value =
        serde_json::from_str(&content).map_err(|e| Error::json(&path, e))?;

    match document.get_mut("metrics").map(Value::take) {
        Some(Value::Object(metrics)) if !metrics.is_empty() => {
            Ok(SnapshotOutcome::Snapshot(Snapshot {
                timestamp: timestamp.to_string(),
                metrics: metrics.into_iter().collect(),
            }))
        }
        _ => Ok(SnapshotOutcome::Skipped(Skip::LegacyFormat)),
    }
}

/// List a data directory, most recent snapshot first.
pub fn list_snapshots(dir: &Path) -> Result<Vec<SnapshotFile>> {
    let entries = fs::read_dir(dir).map_err(|source| Error::DataDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::DataDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        files.push(SnapshotFile::new(entry.file_name().to_string_lossy()));
    }
    files.sort_by(compare_recent_first);
    Ok(files)
}

/// Directory holding the snapshots of `url`.
pub fn page_data_dir(results_folder: &Path, url: &str) -> PathBuf {
    results_folder
        .join(sanitize_folder_name(url))
        .join(DATA_DIR)
}

/// Builds [`Page`]s from snapshot directories.
#[derive(Debug, Clone)]
pub struct SnapshotAggregator {
    results_folder: PathBuf,
}

impl SnapshotAggregator {
    /// Create an aggregator reading under `results_folder`.
    pub fn new(results_folder: impl Into<PathBuf>) -> Self {
        Self {
            results_folder: results_folder.into(),
        }
    }

    /// The folder snapshots are read from.
    pub fn results_folder(&self) -> &Path {
        &self.results_folder
    }

    /// Aggregate the snapshots of one URL.
    pub fn aggregate_page(&self, url: &str) -> Result<Page> {
        let folder_name = sanitize_folder_name(url);
        let mut page = Page::new(url, &folder_name);

        let dir = page_data_dir(&self.results_folder, url);
        info!(dir = %dir.display(), "Looking for result files in {}", dir.display());

        let mut current_taken = false;
        for file in list_snapshots(&dir)? {
            let snapshot = match read_snapshot(&dir, &file)? {
                SnapshotOutcome::Snapshot(snapshot) => snapshot,
                SnapshotOutcome::Skipped(reason) => {
                    debug!(file = %file.name, ?reason, "Skipping file");
                    continue;
                }
            };

            if !current_taken {
                copy_current_metrics(&mut page, &snapshot);
                current_taken = true;
            }

            let sample = snapshot.timing_sample(&dir.join(&file.name))?;
            page.timings_history.push(sample);
        }

        debug!(
            url,
            samples = page.timings_history.len(),
            "Aggregated page"
        );
        Ok(page)
    }

    /// Aggregate every URL, in order. The first error aborts the run.
    pub fn aggregate<'a>(&self, urls: impl IntoIterator<Item = &'a str>) -> Result<ResultsDocument> {
        let pages = urls
            .into_iter()
            .map(|url| self.aggregate_page(url))
            .collect::<Result<Vec<_>>>()?;
        Ok(ResultsDocument { pages })
    }
}

fn copy_current_metrics(page: &mut Page, snapshot: &Snapshot) {
    for name in snapshot.metrics.keys() {
        if RESERVED_PAGE_FIELDS.contains(&name.as_str()) {
            debug!(metric = %name, "Metric name clashes with a page field, not copied");
            continue;
        }
        match snapshot.average(name) {
            Some(average) => {
                page.metrics.insert(name.clone(), Value::Number(average.clone()));
            }
            None => debug!(metric = %name, "Metric has no numeric average, not copied"),
        }
    }
}

/// Aggregate every configured URL of `options`.
pub fn aggregate_pages(options: &DevperfOptions) -> Result<ResultsDocument> {
    SnapshotAggregator::new(&options.results_folder)
        .aggregate(options.urls.iter().map(String::as_str))
}
