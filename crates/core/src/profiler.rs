// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Jobs handed to the external profiler.
//!
//! devperf does not drive a browser. It describes, per configured URL, where
//! the profiler must write its report and snapshots, and with which run count
//! and timeout, so that the snapshots land where
//! [`crate::snapshot::SnapshotAggregator`] looks for them.

use crate::options::DevperfOptions;
use crate::sanitize::sanitize_folder_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Options forwarded to the profiler itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilerRunOptions {
    /// Per-run timeout, in seconds.
    pub timeout: u64,
}

/// One profiler job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilerJob {
    /// Folder the profiler writes its report (and `data/`) into, with a
    /// trailing slash.
    pub index_path: String,
    /// URL to profile.
    pub url: String,
    /// Runs to average over.
    pub number_of_runs: u32,
    /// Profiler options.
    pub options: ProfilerRunOptions,
}

/// Build the jobs for every configured URL, keyed by folder name.
///
/// URLs sharing a folder name collapse into one job (the last one wins) and
/// a warning is logged, since their snapshots would be mixed on disk.
pub fn plan_jobs(options: &DevperfOptions) -> BTreeMap<String, ProfilerJob> {
    let results_folder = options.results_folder.to_string_lossy();
    let results_folder = results_folder.trim_end_matches('/');

    let mut jobs = BTreeMap::new();
    for url in &options.urls {
        let folder_name = sanitize_folder_name(url);
        let job = ProfilerJob {
            index_path: format!("{}/{}/", results_folder, folder_name),
            url: url.clone(),
            number_of_runs: options.number_of_runs,
            options: ProfilerRunOptions {
                timeout: options.timeout,
            },
        };
        if let Some(previous) = jobs.insert(folder_name.clone(), job) {
            warn!(
                folder = %folder_name,
                first = %previous.url,
                second = %url,
                "Two URLs share the same results folder"
            );
        }
    }
    jobs
}

/// Folder names used by more than one configured URL.
pub fn folder_collisions(urls: &[String]) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for url in urls {
        *seen.entry(sanitize_folder_name(url)).or_default() += 1;
    }
    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name)
        .collect()
}
