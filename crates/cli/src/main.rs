// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! devperf CLI entry point.

fn main() {
    if let Err(e) = devperf_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
