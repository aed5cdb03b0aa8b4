// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core of devperf: turns the snapshots left by a browser performance
//! profiler into per-page time series.
//!
//! # Quick Start
//!
//! ```no_run
//! use devperf_core::options::DevperfOptions;
//! use devperf_core::snapshot::aggregate_pages;
//! use devperf_core::warning::default_rules;
//!
//! let mut options = DevperfOptions::default();
//! options.merge_default_warnings(&default_rules()?);
//!
//! let results = aggregate_pages(&options)?;
//! for page in &results.pages {
//!     println!("{}: {} samples", page.url, page.timings_history.len());
//! }
//! # Ok::<(), devperf_core::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`sanitize`] - URL to folder name mapping
//! - [`warning`] - Warning rules and their merge with the bundled defaults
//! - [`snapshot`] - Snapshot directory aggregation
//! - [`page`] - The aggregated results document
//! - [`options`] - Layered options loading
//! - [`profiler`] - Jobs for the external profiler

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod options;
pub mod page;
pub mod profiler;
pub mod sanitize;
pub mod snapshot;
pub mod warning;

pub use error::{Error, Result};
pub use options::DevperfOptions;
pub use page::{Page, ResultsDocument, TimingSample};
pub use sanitize::sanitize_folder_name;
pub use snapshot::SnapshotAggregator;
pub use warning::WarningRule;
