// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! devperf options.
//!
//! Options are layered: built-in defaults, then an optional options file
//! (TOML, JSON or YAML, picked by extension), then `DEVPERF_*` environment
//! variables. Callers apply their own overrides (command-line flags) on the
//! resulting [`DevperfOptions`].
//!
//! The file and environment use snake_case keys (`results_folder`); the
//! effective options are written to `settings.json` with the dashboard's
//! camelCase names (`resultsFolder`).
//!
//! # Example
//!
//! ```no_run
//! use devperf_core::options::OptionsLoader;
//!
//! let options = OptionsLoader::new()
//!     .with_file("devperf.toml")
//!     .load()?
//!     .resolve();
//! println!("{} urls", options.urls.len());
//! # Ok::<(), devperf_core::Error>(())
//! ```

use crate::error::Result;
use crate::warning::{merge_warnings, WarningRule};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Prefix of the environment variables read by [`OptionsLoader`].
pub const ENV_PREFIX: &str = "DEVPERF";

/// URL profiled when none is configured.
pub const DEFAULT_URL: &str = "http://www.google.fr";

/// Default number of profiler runs per URL.
pub const DEFAULT_NUMBER_OF_RUNS: u32 = 5;

/// Default profiler timeout, in seconds.
pub const DEFAULT_TIMEOUT: u64 = 120;

/// Default results folder.
pub const DEFAULT_RESULTS_FOLDER: &str = "./devperf";

/// Effective options of a run, as persisted in `settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevperfOptions {
    /// URLs to aggregate, in report order.
    pub urls: Vec<String>,
    /// Warning rules shown by the dashboard.
    pub warnings: Vec<WarningRule>,
    /// Profiler runs per URL.
    pub number_of_runs: u32,
    /// Profiler timeout, in seconds.
    pub timeout: u64,
    /// Open the generated report in a browser.
    pub open_results: bool,
    /// Folder holding snapshots and receiving the report.
    pub results_folder: PathBuf,
}

impl Default for DevperfOptions {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_URL.to_string()],
            warnings: Vec::new(),
            number_of_runs: DEFAULT_NUMBER_OF_RUNS,
            timeout: DEFAULT_TIMEOUT,
            open_results: false,
            results_folder: PathBuf::from(DEFAULT_RESULTS_FOLDER),
        }
    }
}

impl DevperfOptions {
    /// Complete `warnings` with `defaults`.
    ///
    /// Returns the variables of user rules that were misconfigured.
    pub fn merge_default_warnings(&mut self, defaults: &[WarningRule]) -> Vec<String> {
        let merged = merge_warnings(defaults, std::mem::take(&mut self.warnings));
        self.warnings = merged.rules;
        merged.misconfigured
    }
}

/// Options as found in a file or the environment. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptionsFile {
    /// URLs to aggregate.
    pub urls: Option<Vec<String>>,
    /// User warning rules.
    pub warnings: Option<Vec<WarningRule>>,
    /// Profiler runs per URL.
    pub number_of_runs: Option<u32>,
    /// Profiler timeout, in seconds.
    pub timeout: Option<u64>,
    /// Open the generated report in a browser.
    pub open_results: Option<bool>,
    /// Folder holding snapshots and receiving the report.
    pub results_folder: Option<PathBuf>,
}

impl OptionsFile {
    /// Fill unset keys from [`DevperfOptions::default`].
    pub fn resolve(self) -> DevperfOptions {
        let defaults = DevperfOptions::default();
        DevperfOptions {
            urls: self.urls.unwrap_or(defaults.urls),
            warnings: self.warnings.unwrap_or(defaults.warnings),
            number_of_runs: self.number_of_runs.unwrap_or(defaults.number_of_runs),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            open_results: self.open_results.unwrap_or(defaults.open_results),
            results_folder: self.results_folder.unwrap_or(defaults.results_folder),
        }
    }
}

/// Loads [`OptionsFile`] from a file and the environment.
#[derive(Debug, Clone)]
pub struct OptionsLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl Default for OptionsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsLoader {
    /// Loader reading `DEVPERF_*` variables and no file.
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Read this options file; it must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Read environment variables with this prefix instead of `DEVPERF`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load the layered options.
    pub fn load(&self) -> Result<OptionsFile> {
        let mut builder = Config::builder();
        if let Some(path) = &self.file {
            debug!(path = %path.display(), "Loading options file");
            builder = builder.add_source(File::from(path.as_path()));
        }
        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("urls"),
        );

        let options = builder.build()?.try_deserialize()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn loader() -> OptionsLoader {
        OptionsLoader::new().with_env_prefix("DEVPERF_OPTIONS_TEST_UNSET")
    }

    #[test]
    fn test_defaults() {
        let options = OptionsFile::default().resolve();
        assert_eq!(options.urls, vec!["http://www.google.fr".to_string()]);
        assert!(options.warnings.is_empty());
        assert_eq!(options.number_of_runs, 5);
        assert_eq!(options.timeout, 120);
        assert!(!options.open_results);
        assert_eq!(options.results_folder, PathBuf::from("./devperf"));
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devperf.toml");
        fs::write(
            &path,
            r#"
urls = ["http://a.com", "http://b.com"]
number_of_runs = 3
results_folder = "out"

[[warnings]]
variable = "requests"
limit = 10
"#,
        )
        .unwrap();

        let options = loader().with_file(&path).load().unwrap().resolve();
        assert_eq!(options.urls.len(), 2);
        assert_eq!(options.number_of_runs, 3);
        assert_eq!(options.timeout, 120);
        assert_eq!(options.results_folder, PathBuf::from("out"));
        assert_eq!(options.warnings[0].variable, "requests");
        assert_eq!(options.warnings[0].limit, Some(serde_json::Number::from(10)));
        assert!(options.warnings[0].message.is_none());
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devperf.json");
        fs::write(&path, r#"{ "open_results": true, "timeout": 30 }"#).unwrap();

        let options = loader().with_file(&path).load().unwrap().resolve();
        assert!(options.open_results);
        assert_eq!(options.timeout, 30);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = loader().with_file(dir.path().join("nope.toml")).load();
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("DEVPERF_OPTIONS_TEST_ENV_TIMEOUT", "45");
        std::env::set_var("DEVPERF_OPTIONS_TEST_ENV_URLS", "http://a.com,http://b.com");

        let options = OptionsLoader::new()
            .with_env_prefix("DEVPERF_OPTIONS_TEST_ENV")
            .load()
            .unwrap()
            .resolve();

        assert_eq!(options.timeout, 45);
        assert_eq!(options.urls, vec!["http://a.com", "http://b.com"]);
    }

    #[test]
    fn test_example_file_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../devperf.example.toml");
        let mut options = loader().with_file(path).load().unwrap().resolve();
        assert_eq!(options.urls.len(), 2);

        let defaults = crate::warning::default_rules().unwrap();
        assert!(options.merge_default_warnings(&defaults).is_empty());
        assert_eq!(options.warnings[0].variable, "requests");
        assert!(options.warnings[0].message.is_some());
        assert_eq!(options.warnings[1].limit, Some(serde_json::Number::from(600)));
    }

    #[test]
    fn test_settings_use_camel_case() {
        let value = serde_json::to_value(DevperfOptions::default()).unwrap();
        assert_eq!(value["numberOfRuns"], 5);
        assert_eq!(value["openResults"], false);
        assert_eq!(value["resultsFolder"], "./devperf");
    }

    #[test]
    fn test_merge_default_warnings() {
        let mut options = DevperfOptions {
            warnings: vec![WarningRule::bare("a")],
            ..DevperfOptions::default()
        };
        let misconfigured = options
            .merge_default_warnings(&[WarningRule::new("a", "M", 1), WarningRule::new("b", "N", 2)]);
        assert_eq!(misconfigured, vec!["a".to_string()]);
        assert_eq!(options.warnings.len(), 2);
    }
}
