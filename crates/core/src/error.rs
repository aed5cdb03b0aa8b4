// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for snapshot aggregation and option loading.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading options or aggregating snapshots.
///
/// Every variant is fatal for the run that produced it. Snapshot files that
/// are merely in a legacy format are not errors, see
/// [`crate::snapshot::Skip`].
#[derive(Debug, Error)]
pub enum Error {
    /// The per-page `data` directory is missing or unreadable.
    #[error("cannot read snapshot directory {}: {source}", path.display())]
    DataDirectory {
        /// Directory that was listed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A snapshot (or the bundled defaults) is not valid JSON.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A snapshot carries metrics but not one of the timings kept in history.
    #[error("snapshot {} has no `{metric}` metric", path.display())]
    MissingTimingMetric {
        /// Snapshot file.
        path: PathBuf,
        /// Name of the missing metric.
        metric: &'static str,
    },

    /// Options could not be loaded from file or environment.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for devperf core operations.
pub type Result<T> = std::result::Result<T, Error>;
