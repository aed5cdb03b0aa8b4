// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI for devperf.
//!
//! This crate provides the `devperf` command: it aggregates the snapshots a
//! profiler left in the results folder and writes the HTML dashboard next to
//! them.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use devperf_core::options::OptionsLoader;
use devperf_core::profiler::{folder_collisions, plan_jobs};
use devperf_core::snapshot::aggregate_pages;
use devperf_core::warning::default_rules;
use devperf_core::DevperfOptions;
use devperf_report::io::{self, INDEX_FILE, RESULTS_FILE, SETTINGS_FILE};
use devperf_report::markdown;
use devperf_report::{EmittedReport, ReportEmitter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Front bundle of the source tree this binary was built from.
pub const SOURCE_FRONT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../front");

/// Name of a front bundle installed next to the executable.
pub const FRONT_DIR_NAME: &str = "front";

/// Front bundle used when none is given on the command line.
///
/// A `front/` directory holding an `index.html` next to `exe` is preferred,
/// otherwise [`SOURCE_FRONT_DIR`] is used.
pub fn default_front_dir(exe: Option<&Path>) -> PathBuf {
    exe.and_then(Path::parent)
        .map(|dir| dir.join(FRONT_DIR_NAME))
        .filter(|dir| dir.join(INDEX_FILE).is_file())
        .unwrap_or_else(|| PathBuf::from(SOURCE_FRONT_DIR))
}

/// devperf CLI.
#[derive(Parser, Debug)]
#[command(name = "devperf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Options file (TOML, JSON or YAML).
    #[arg(short, long, global = true, env = "DEVPERF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate the profiler snapshots and write the dashboard.
    ///
    /// Writes into the results folder:
    /// - results.json - Aggregated pages
    /// - settings.json - Effective options
    /// - assets/ - Front-end assets
    /// - index.html - Dashboard
    Run {
        /// URL to report on (repeatable, replaces configured URLs).
        #[arg(short, long = "url")]
        urls: Vec<String>,

        /// Results folder override.
        #[arg(short, long)]
        results_folder: Option<PathBuf>,

        /// Front bundle holding index.html and assets/ [default: front/ next
        /// to the executable, else the source tree devperf was built from].
        #[arg(long, env = "DEVPERF_FRONT_DIR")]
        front_dir: Option<PathBuf>,

        /// Open the dashboard once written.
        #[arg(short, long)]
        open: bool,
    },

    /// Print the jobs to hand to the profiler, as JSON.
    Plan,

    /// Print a markdown summary of an existing report.
    Summary {
        /// Results folder override.
        #[arg(short, long)]
        results_folder: Option<PathBuf>,

        /// Include the full timing history of every page.
        #[arg(long)]
        history: bool,
    },

    /// Show the effective options and report location.
    Status {
        /// Show detailed status information.
        #[arg(short, long)]
        detailed: bool,
    },
}

/// Command-line overrides applied on top of loaded options.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replaces the configured URLs when not empty.
    pub urls: Vec<String>,
    /// Replaces the results folder.
    pub results_folder: Option<PathBuf>,
    /// Forces `openResults` on.
    pub open: bool,
}

/// Load options from `config` and the environment, then apply `overrides`.
pub fn load_options(config: Option<&Path>, overrides: Overrides) -> Result<DevperfOptions> {
    let mut loader = OptionsLoader::new();
    if let Some(path) = config {
        loader = loader.with_file(path);
    }
    let mut options = loader.load().context("failed to load options")?.resolve();

    if !overrides.urls.is_empty() {
        options.urls = overrides.urls;
    }
    if let Some(folder) = overrides.results_folder {
        options.results_folder = folder;
    }
    options.open_results |= overrides.open;
    Ok(options)
}

/// Merge warnings, aggregate every URL and emit the report.
pub fn generate(mut options: DevperfOptions, emitter: &ReportEmitter) -> Result<EmittedReport> {
    let defaults = default_rules().context("bundled warning defaults are invalid")?;
    let misconfigured = options.merge_default_warnings(&defaults);
    if !misconfigured.is_empty() {
        warn!(count = misconfigured.len(), "Some warnings were ignored");
    }

    for folder in folder_collisions(&options.urls) {
        warn!(folder = %folder, "Several URLs share a results folder, their snapshots are mixed");
    }

    let results = aggregate_pages(&options).context("failed to aggregate snapshots")?;
    let report = emitter
        .emit(&results, &options)
        .context("failed to write the report")?;
    Ok(report)
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        "warn,devperf=debug"
    } else {
        "warn,devperf=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI with the process arguments.
pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(cli)
}

/// Run a parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            urls,
            results_folder,
            front_dir,
            open,
        } => {
            let options = load_options(
                config,
                Overrides {
                    urls,
                    results_folder,
                    open,
                },
            )?;
            let front_dir = front_dir
                .unwrap_or_else(|| default_front_dir(std::env::current_exe().ok().as_deref()));
            debug!(front_dir = %front_dir.display(), "Using front bundle");
            let emitter = ReportEmitter::new(&options.results_folder, front_dir);
            let report = generate(options, &emitter)?;

            info!(path = %report.index_path.display(), "Dashboard ready");
            println!("Report written to {}", report.index_path.display());
            Ok(())
        }
        Commands::Plan => {
            let options = load_options(config, Overrides::default())?;
            let jobs = plan_jobs(&options);
            println!("{}", io::to_pretty_json(&jobs)?);
            Ok(())
        }
        Commands::Summary {
            results_folder,
            history,
        } => {
            let options = load_options(
                config,
                Overrides {
                    results_folder,
                    ..Overrides::default()
                },
            )?;
            let folder = &options.results_folder;
            let results = io::read_results_json(folder.join(RESULTS_FILE))
                .with_context(|| format!("no report in {}, run `devperf run` first", folder.display()))?;
            let settings = io::read_settings_json(folder.join(SETTINGS_FILE))?;

            print!("{}", markdown::generate_summary(&results, &settings.warnings));
            if history {
                for page in &results.pages {
                    println!();
                    print!("{}", markdown::generate_history(page));
                }
            }
            Ok(())
        }
        Commands::Status { detailed } => {
            let options = load_options(config, Overrides::default())?;
            let folder = &options.results_folder;
            let index = folder.join(INDEX_FILE);

            println!("{}", "devperf".bold());
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Results folder: {}", folder.display());
            println!("URLs: {}", options.urls.len());
            if index.exists() {
                println!("Report: {}", index.display().to_string().green());
            } else {
                println!("Report: {}", "not generated yet".yellow());
            }

            if detailed {
                println!("\nPages:");
                for (folder_name, job) in plan_jobs(&options) {
                    println!("  - {} -> {}", job.url, folder_name);
                }
                println!("\nOutput files:");
                for name in [RESULTS_FILE, SETTINGS_FILE, INDEX_FILE, io::ASSETS_DIR] {
                    println!("  - {}", folder.join(name).display());
                }
            }
            Ok(())
        }
    }
}
