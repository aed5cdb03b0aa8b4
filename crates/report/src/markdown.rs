// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Markdown output generation for aggregated results.
//!
//! A terminal-friendly counterpart of the HTML dashboard: the latest key
//! timings per page and the warnings they trigger.

use chrono::{DateTime, Utc};
use devperf_core::page::TimingSample;
use devperf_core::warning::evaluate_page;
use devperf_core::{Page, ResultsDocument, WarningRule};
use serde_json::Number;
use std::fmt::Write;

/// Render a snapshot timestamp (epoch milliseconds) as a UTC date.
///
/// Falls back to the raw string when it is not a valid timestamp.
pub fn format_timestamp(timestamp: &str) -> String {
    timestamp
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn cell(value: Option<&Number>) -> String {
    value.map_or_else(|| "-".to_string(), Number::to_string)
}

fn sample_cells(sample: &TimingSample) -> [String; 4] {
    [
        cell(sample.time_to_first_byte.as_ref()),
        cell(sample.on_dom_ready_time.as_ref()),
        cell(sample.window_on_load_time.as_ref()),
        cell(sample.http_traffic_completed.as_ref()),
    ]
}

/// Generate a markdown summary of the latest timings of every page.
pub fn generate_summary(results: &ResultsDocument, warnings: &[WarningRule]) -> String {
    let mut output = String::new();

    writeln!(output, "# Performance Summary").unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "| URL | Last run | TTFB | DOM ready | Load | Traffic done | Runs | Warnings |"
    )
    .unwrap();
    writeln!(
        output,
        "|-----|----------|------|-----------|------|--------------|------|----------|"
    )
    .unwrap();

    for page in &results.pages {
        let (last_run, cells) = match page.latest_sample() {
            Some(sample) => (format_timestamp(&sample.timestamp), sample_cells(sample)),
            None => ("never".to_string(), std::array::from_fn(|_| "-".to_string())),
        };
        let [ttfb, dom_ready, load, traffic] = cells;
        writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} | {} | {} |",
            page.url,
            last_run,
            ttfb,
            dom_ready,
            load,
            traffic,
            page.timings_history.len(),
            evaluate_page(page, warnings).len()
        )
        .unwrap();
    }

    let flagged: Vec<&Page> = results
        .pages
        .iter()
        .filter(|page| !evaluate_page(page, warnings).is_empty())
        .collect();
    if !flagged.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "## Warnings").unwrap();
        for page in flagged {
            writeln!(output).unwrap();
            writeln!(output, "### {}", page.url).unwrap();
            writeln!(output).unwrap();
            for triggered in evaluate_page(page, warnings) {
                writeln!(
                    output,
                    "- **{}** = {} (limit {}): {}",
                    triggered.rule.variable,
                    triggered.value,
                    cell(triggered.rule.limit.as_ref()),
                    triggered.rule.message.as_deref().unwrap_or("")
                )
                .unwrap();
            }
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "---").unwrap();
    writeln!(output, "Total pages: {}", results.pages.len()).unwrap();

    output
}

/// Generate the full timing history of one page.
pub fn generate_history(page: &Page) -> String {
    let mut output = String::new();

    writeln!(output, "## {}", page.url).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "| Run | TTFB | DOM ready | Load | Traffic done |").unwrap();
    writeln!(output, "|-----|------|-----------|------|--------------|").unwrap();
    for sample in &page.timings_history {
        let [ttfb, dom_ready, load, traffic] = sample_cells(sample);
        writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            format_timestamp(&sample.timestamp),
            ttfb,
            dom_ready,
            load,
            traffic
        )
        .unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> Page {
        let mut page = Page::new("http://a.com", "httpacom");
        page.metrics.insert("requests".to_string(), json!(120));
        page.timings_history.push(TimingSample {
            timestamp: "1396015563123".to_string(),
            time_to_first_byte: Some(Number::from(250)),
            on_dom_ready_time: Some(Number::from(900)),
            window_on_load_time: None,
            http_traffic_completed: Some(Number::from(2100)),
        });
        page
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("1396015563123"), "2014-03-28 14:06:03 UTC");
        assert_eq!(format_timestamp("latest"), "latest");
    }

    #[test]
    fn test_summary_lists_pages_and_warnings() {
        let results = ResultsDocument {
            pages: vec![page(), Page::new("http://b.com", "httpbcom")],
        };
        let rules = vec![WarningRule::new("requests", "Too many requests", 100)];
        let summary = generate_summary(&results, &rules);

        assert!(summary.contains(
            "| http://a.com | 2014-03-28 14:06:03 UTC | 250 | 900 | - | 2100 | 1 | 1 |"
        ));
        assert!(summary.contains("| http://b.com | never | - | - | - | - | 0 | 0 |"));
        assert!(summary.contains("- **requests** = 120 (limit 100): Too many requests"));
        assert!(summary.contains("Total pages: 2"));
    }

    #[test]
    fn test_summary_without_warnings_has_no_section() {
        let results = ResultsDocument { pages: vec![page()] };
        let summary = generate_summary(&results, &[]);
        assert!(!summary.contains("## Warnings"));
    }

    #[test]
    fn test_history() {
        let history = generate_history(&page());
        assert!(history.starts_with("## http://a.com"));
        assert!(history.contains("| 2014-03-28 14:06:03 UTC | 250 | 900 | - | 2100 |"));
    }
}
