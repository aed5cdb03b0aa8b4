// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Report generation for devperf.
//!
//! This crate writes the artifacts of a devperf run into the results folder:
//! the aggregated `results.json`, the effective `settings.json`, a copy of
//! the front-end assets and an `index.html` dashboard embedding both JSON
//! documents.
//!
//! # Quick Start
//!
//! ```no_run
//! use devperf_core::{DevperfOptions, ResultsDocument};
//! use devperf_report::ReportEmitter;
//!
//! let options = DevperfOptions::default();
//! let results = ResultsDocument::default();
//!
//! let report = ReportEmitter::new(&options.results_folder, "front").emit(&results, &options)?;
//! println!("Dashboard at {}", report.index_path.display());
//! # Ok::<(), devperf_report::ReportError>(())
//! ```
//!
//! # Modules
//!
//! - [`emitter`] - Ordered emission of every artifact
//! - [`io`] - Reading and writing artifacts
//! - [`html`] - Dashboard template filling
//! - [`markdown`] - Markdown summaries for the terminal
//! - [`opener`] - Opening the dashboard in a browser

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod emitter;
pub mod html;
pub mod io;
pub mod markdown;
pub mod opener;

pub use emitter::{EmittedReport, ReportEmitter};
pub use opener::{Opener, SystemOpener};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while writing or reading report artifacts.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A file or directory could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A document could not be serialized or parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
