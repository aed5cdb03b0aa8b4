// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Report emission.
//!
//! [`ReportEmitter::emit`] produces, in order: `results.json`,
//! `settings.json`, the copied `assets/`, then `index.html`, and finally
//! opens the dashboard when the options ask for it. Any filesystem error
//! stops the emission where it happened; files already written stay.

use crate::html::render_index;
use crate::io::{self, INDEX_FILE, RESULTS_FILE, SETTINGS_FILE};
use crate::opener::{Opener, SystemOpener};
use crate::{ReportError, Result};
use devperf_core::{DevperfOptions, ResultsDocument};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Files produced by one emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedReport {
    /// `results.json`.
    pub results_path: PathBuf,
    /// `settings.json`.
    pub settings_path: PathBuf,
    /// `index.html`.
    pub index_path: PathBuf,
    /// Copied assets.
    pub assets: Vec<PathBuf>,
    /// Whether the dashboard was handed to the opener successfully.
    pub opened: bool,
}

/// Writes a report into an output directory from a front bundle.
pub struct ReportEmitter {
    output_dir: PathBuf,
    front_dir: PathBuf,
    opener: Box<dyn Opener>,
}

impl std::fmt::Debug for ReportEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEmitter")
            .field("output_dir", &self.output_dir)
            .field("front_dir", &self.front_dir)
            .finish_non_exhaustive()
    }
}

impl ReportEmitter {
    /// Emit into `output_dir` using the `index.html` and `assets/` of
    /// `front_dir`.
    pub fn new(output_dir: impl Into<PathBuf>, front_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            front_dir: front_dir.into(),
            opener: Box::new(SystemOpener),
        }
    }

    /// Use another opener for `openResults`.
    pub fn with_opener(mut self, opener: impl Opener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    /// The output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The front bundle directory.
    pub fn front_dir(&self) -> &Path {
        &self.front_dir
    }

    /// Write the report for `results` and `options`.
    pub fn emit(&self, results: &ResultsDocument, options: &DevperfOptions) -> Result<EmittedReport> {
        fs::create_dir_all(&self.output_dir).map_err(|e| ReportError::io(&self.output_dir, e))?;

        let results_json = io::to_pretty_json(results)?;
        let settings_json = io::to_pretty_json(options)?;

        let results_path = self.output_dir.join(RESULTS_FILE);
        io::write_file(&results_path, &results_json)?;
        info!(path = %results_path.display(), "File \"{}\" created.", results_path.display());

        let settings_path = self.output_dir.join(SETTINGS_FILE);
        io::write_file(&settings_path, &settings_json)?;
        info!(path = %settings_path.display(), "File \"{}\" created.", settings_path.display());

        let assets = io::copy_assets(&self.front_dir, &self.output_dir)?;
        info!(count = assets.len(), "Assets copied.");

        let template_path = self.front_dir.join(INDEX_FILE);
        let template =
            fs::read_to_string(&template_path).map_err(|e| ReportError::io(&template_path, e))?;
        let index_path = self.output_dir.join(INDEX_FILE);
        io::write_file(&index_path, render_index(&template, &results_json, &settings_json))?;
        info!(path = %index_path.display(), "Report written");

        let opened = options.open_results && self.open(&index_path);

        Ok(EmittedReport {
            results_path,
            settings_path,
            index_path,
            assets,
            opened,
        })
    }

    fn open(&self, index_path: &Path) -> bool {
        match self.opener.open(index_path) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, path = %index_path.display(), "Unable to open the report");
                false
            }
        }
    }
}
