// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Warning rules: thresholds the dashboard uses to flag poor metric values.
//!
//! Rules come from two places: the defaults bundled with devperf
//! (`settings/desktop.json`) and the user's options. [`merge_warnings`]
//! combines them so that every default variable ends up represented once.
//!
//! # Known quirk
//!
//! When a user rule matches a default, at most one missing field is filled
//! from the default per pass: the message if it is missing, otherwise the
//! limit. A rule missing both is treated as misconfigured and neutralised
//! instead of being completed.

use crate::error::{Error, Result};
use crate::page::Page;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::path::Path;
use tracing::{debug, warn};

/// Bundled default rules, as shipped.
pub const DEFAULT_RULES_JSON: &str = include_str!("../settings/desktop.json");

/// Message given to rules that had to be neutralised.
pub const IGNORED_MESSAGE: &str = "Ignored";

/// Limit given to rules that had to be neutralised. Never triggers.
pub const IGNORED_LIMIT: i64 = -1;

/// A threshold on one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningRule {
    /// Metric name the rule applies to.
    pub variable: String,
    /// Message shown when the limit is exceeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Highest acceptable value, kept as written (`100` stays `100`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Number>,
}

impl WarningRule {
    /// Create a fully specified rule.
    pub fn new(
        variable: impl Into<String>,
        message: impl Into<String>,
        limit: impl Into<Number>,
    ) -> Self {
        Self {
            variable: variable.into(),
            message: Some(message.into()),
            limit: Some(limit.into()),
        }
    }

    /// Create a rule that only names its variable.
    pub fn bare(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            message: None,
            limit: None,
        }
    }

    /// Whether `value` exceeds this rule's limit.
    ///
    /// Rules without a limit, or with a negative one, never trigger.
    pub fn is_triggered(&self, value: f64) -> bool {
        match self.limit.as_ref().and_then(Number::as_f64) {
            Some(limit) if limit >= 0.0 => value > limit,
            _ => false,
        }
    }

    fn neutralise(&mut self) {
        self.limit = Some(Number::from(IGNORED_LIMIT));
        self.message = Some(IGNORED_MESSAGE.to_string());
    }
}

/// Outcome of [`merge_warnings`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarningMerge {
    /// User rules in their declared order, followed by unmatched defaults.
    pub rules: Vec<WarningRule>,
    /// Variables of user rules that were neutralised.
    pub misconfigured: Vec<String>,
}

/// Parse the defaults bundled with devperf.
pub fn default_rules() -> Result<Vec<WarningRule>> {
    parse_rules(DEFAULT_RULES_JSON, Path::new("settings/desktop.json"))
}

fn parse_rules(content: &str, origin: &Path) -> Result<Vec<WarningRule>> {
    serde_json::from_str(content).map_err(|e| Error::json(origin, e))
}

/// Merge user rules with defaults.
///
/// For each default, every user rule with the same variable is completed
/// from it (see the module docs for the exact branching). Defaults no user
/// rule mentions are appended unchanged, in their declared order.
pub fn merge_warnings(defaults: &[WarningRule], user: Vec<WarningRule>) -> WarningMerge {
    let mut rules = user;
    let mut misconfigured = Vec::new();
    let mut appended = Vec::new();

    for default in defaults {
        let mut found = false;

        for rule in rules.iter_mut().filter(|r| r.variable == default.variable) {
            found = true;
            if rule.message.is_none() && rule.limit.is_none() {
                warn!(
                    variable = %rule.variable,
                    "Warning {} is misconfigured, it has been ignored.",
                    rule.variable
                );
                rule.neutralise();
                misconfigured.push(rule.variable.clone());
            } else if rule.message.is_none() {
                rule.message = default.message.clone();
            } else if rule.limit.is_none() {
                rule.limit = default.limit.clone();
            }
        }

        if !found {
            debug!(variable = %default.variable, "Using default warning");
            appended.push(default.clone());
        }
    }

    rules.extend(appended);
    WarningMerge {
        rules,
        misconfigured,
    }
}

/// A rule a page's current metrics exceed.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredWarning<'a> {
    /// The rule that fired.
    pub rule: &'a WarningRule,
    /// The page's current value for the rule's variable.
    pub value: f64,
}

/// Rules whose limit the page's current metrics exceed, in rule order.
pub fn evaluate_page<'a>(page: &Page, rules: &'a [WarningRule]) -> Vec<TriggeredWarning<'a>> {
    rules
        .iter()
        .filter_map(|rule| {
            let value = page.metric(&rule.variable)?;
            rule.is_triggered(value)
                .then_some(TriggeredWarning { rule, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn defaults() -> Vec<WarningRule> {
        vec![
            WarningRule::new("a", "M", 1),
            WarningRule::new("b", "N", 2),
        ]
    }

    #[test]
    fn test_bundled_defaults_parse() {
        let rules = default_rules().unwrap();
        assert!(!rules.is_empty());
        assert!(rules
            .iter()
            .all(|r| r.message.is_some() && r.limit.is_some()));
        assert!(rules.iter().any(|r| r.variable == "timeToFirstByte"));
    }

    #[test]
    fn test_no_user_rules_yields_defaults() {
        let defaults = vec![WarningRule::new("a", "M", 1)];
        let merged = merge_warnings(&defaults, Vec::new());
        assert_eq!(merged.rules, defaults);
        assert!(merged.misconfigured.is_empty());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_bare_user_rule_is_neutralised() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let merged = tracing::subscriber::with_default(subscriber, || {
            merge_warnings(&defaults(), vec![WarningRule::bare("a")])
        });

        assert_eq!(merged.misconfigured, vec!["a".to_string()]);
        let a = &merged.rules[0];
        assert_eq!(a.variable, "a");
        assert_eq!(a.limit, Some(Number::from(-1)));
        assert_eq!(a.message.as_deref(), Some("Ignored"));
        assert_eq!(merged.rules[1], WarningRule::new("b", "N", 2));

        let output = logs.contents();
        assert!(output.contains("WARN"));
        assert!(output.contains("Warning a is misconfigured, it has been ignored."));
    }

    #[test]
    fn test_complete_rules_log_no_warning() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            merge_warnings(&defaults(), vec![WarningRule::new("a", "mine", 3)])
        });
        assert!(!logs.contents().contains("WARN"));
    }

    #[test]
    fn test_limit_keeps_its_literal() {
        let rule = WarningRule::new("requests", "too many", 100);
        assert_eq!(
            serde_json::to_string(&rule).unwrap(),
            r#"{"variable":"requests","message":"too many","limit":100}"#
        );

        let parsed: WarningRule =
            serde_json::from_str(r#"{"variable":"requests","limit":2.5}"#).unwrap();
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"{"variable":"requests","limit":2.5}"#
        );
        assert!(parsed.is_triggered(3.0));
        assert!(!parsed.is_triggered(2.5));
    }

    #[test]
    fn test_missing_message_is_filled() {
        let user = vec![WarningRule {
            variable: "b".to_string(),
            message: None,
            limit: Some(Number::from(10)),
        }];
        let merged = merge_warnings(&defaults(), user);

        assert_eq!(merged.rules[0], WarningRule::new("b", "N", 10));
        assert_eq!(merged.rules[1], WarningRule::new("a", "M", 1));
        assert_eq!(merged.rules.len(), 2);
    }

    #[test]
    fn test_missing_limit_is_filled() {
        let user = vec![WarningRule {
            variable: "a".to_string(),
            message: Some("custom".to_string()),
            limit: None,
        }];
        let merged = merge_warnings(&defaults(), user);
        assert_eq!(merged.rules[0], WarningRule::new("a", "custom", 1));
    }

    #[test]
    fn test_user_order_kept_and_unknown_variables_untouched() {
        let user = vec![
            WarningRule::new("custom", "mine", 5),
            WarningRule::new("b", "override", 0),
        ];
        let merged = merge_warnings(&defaults(), user);
        let variables: Vec<_> = merged.rules.iter().map(|r| r.variable.as_str()).collect();
        assert_eq!(variables, vec!["custom", "b", "a"]);
        assert_eq!(merged.rules[1], WarningRule::new("b", "override", 0));
    }

    #[test]
    fn test_rule_serialization_omits_missing_fields() {
        let value = serde_json::to_value(WarningRule::bare("x")).unwrap();
        assert_eq!(value, json!({ "variable": "x" }));
    }

    #[test]
    fn test_is_triggered() {
        let rule = WarningRule::new("requests", "too many", 10);
        assert!(rule.is_triggered(11.0));
        assert!(!rule.is_triggered(10.0));

        let mut ignored = rule.clone();
        ignored.neutralise();
        assert!(!ignored.is_triggered(1_000.0));
        assert!(!WarningRule::bare("requests").is_triggered(1_000.0));
    }

    #[test]
    fn test_evaluate_page() {
        let mut page = Page::new("http://a.com", "httpacom");
        page.metrics.insert("a".to_string(), json!(3));
        page.metrics.insert("b".to_string(), json!(1));

        let rules = defaults();
        let triggered = evaluate_page(&page, &rules);
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].rule.variable, "a");
        assert_eq!(triggered[0].value, 3.0);
    }
}
