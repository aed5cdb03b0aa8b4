// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! I/O operations for report artifacts.
//!
//! This module reads and writes the JSON documents of a report and copies
//! the static front-end assets next to them.

use crate::{ReportError, Result};
use devperf_core::{DevperfOptions, ResultsDocument};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

/// Aggregated results file name.
pub const RESULTS_FILE: &str = "results.json";

/// Effective options file name.
pub const SETTINGS_FILE: &str = "settings.json";

/// Dashboard file name.
pub const INDEX_FILE: &str = "index.html";

/// Assets directory, in both the front bundle and the output.
pub const ASSETS_DIR: &str = "assets";

/// Assets copied from the front bundle into every report.
pub const FRONT_ASSETS: [&str; 6] = [
    "main.js",
    "main.css",
    "interlace.png",
    "handlebars-v1.3.0.js",
    "jquery-2.1.0.min.js",
    "highcharts.js",
];

/// Serialize with a 4-space indent.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    // serde_json only emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Ensure the output directory and its assets directory exist.
pub fn ensure_output_dirs(output_dir: &Path) -> Result<()> {
    let assets = output_dir.join(ASSETS_DIR);
    fs::create_dir_all(&assets).map_err(|e| ReportError::io(&assets, e))
}

/// Write a file, attaching the path to any error.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    fs::write(path, contents).map_err(|e| ReportError::io(path, e))
}

/// Write the results document as `results.json`-style JSON.
pub fn write_results_json(results: &ResultsDocument, path: impl AsRef<Path>) -> Result<()> {
    write_file(path.as_ref(), to_pretty_json(results)?)
}

/// Write the effective options as `settings.json`-style JSON.
pub fn write_settings_json(options: &DevperfOptions, path: impl AsRef<Path>) -> Result<()> {
    write_file(path.as_ref(), to_pretty_json(options)?)
}

/// Copy [`FRONT_ASSETS`] from `<front_dir>/assets` to `<output_dir>/assets`.
///
/// Returns the copied files. A missing asset is an error.
pub fn copy_assets(front_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_output_dirs(output_dir)?;

    let source_dir = front_dir.join(ASSETS_DIR);
    let target_dir = output_dir.join(ASSETS_DIR);

    let mut copied = Vec::with_capacity(FRONT_ASSETS.len());
    for name in FRONT_ASSETS {
        let source = source_dir.join(name);
        let target = target_dir.join(name);
        fs::copy(&source, &target).map_err(|e| ReportError::io(&source, e))?;
        copied.push(target);
    }
    Ok(copied)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Read a results document back.
pub fn read_results_json(path: impl AsRef<Path>) -> Result<ResultsDocument> {
    read_json(path.as_ref())
}

/// Read effective options back.
pub fn read_settings_json(path: impl AsRef<Path>) -> Result<DevperfOptions> {
    read_json(path.as_ref())
}
