// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Aggregated page results.
//!
//! These types are serialized as `results.json` and embedded in the HTML
//! dashboard, so their field names follow the front-end's camelCase names.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Field names of [`Page`] that metrics may not overwrite.
pub const RESERVED_PAGE_FIELDS: [&str; 3] = ["url", "timingsHistory", "gruntPhantomasReport"];

/// Key timings of one snapshot, kept in a page's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingSample {
    /// The 13-character epoch-millisecond prefix of the snapshot file name.
    pub timestamp: String,
    /// Average time to first byte, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub time_to_first_byte: Option<Number>,
    /// Average `DOMContentLoaded` time.
    #[serde(rename = "onDOMReadyTime", skip_serializing_if = "Option::is_none", default)]
    pub on_dom_ready_time: Option<Number>,
    /// Average `window.onload` time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub window_on_load_time: Option<Number>,
    /// Average time until the last HTTP response completed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub http_traffic_completed: Option<Number>,
}

/// Aggregated results for one configured URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// The configured URL.
    pub url: String,
    /// One sample per usable snapshot, most recent first.
    pub timings_history: Vec<TimingSample>,
    /// Relative path to the profiler's own report for this page.
    pub grunt_phantomas_report: String,
    /// Metric averages of the most recent usable snapshot.
    #[serde(flatten)]
    pub metrics: BTreeMap<String, Value>,
}

impl Page {
    /// Create a page with no history and no current metrics.
    pub fn new(url: impl Into<String>, folder_name: &str) -> Self {
        Self {
            url: url.into(),
            timings_history: Vec::new(),
            grunt_phantomas_report: format!("{}/index.html", folder_name),
            metrics: BTreeMap::new(),
        }
    }

    /// Current value of a metric as a float, if present and numeric.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(Value::as_f64)
    }

    /// The most recent history sample.
    pub fn latest_sample(&self) -> Option<&TimingSample> {
        self.timings_history.first()
    }
}

/// The aggregate document written as `results.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    /// Pages in configuration order.
    pub pages: Vec<Page>,
}
