// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dashboard rendering.
//!
//! The dashboard is a static page from the front bundle. Its inline script
//! holds two comment markers that are replaced with the results and the
//! settings as JavaScript variables, so the page works from `file://`
//! without any request.

use tracing::warn;

/// Marker replaced with `var results = ...`.
pub const RESULTS_PLACEHOLDER: &str = "/*%%RESULTS%%*/";

/// Marker replaced with `var settings = ...`.
pub const SETTINGS_PLACEHOLDER: &str = "/*%%SETTINGS%%*/";

/// Escape a JSON document for inclusion in an inline `<script>`.
///
/// `</` becomes `<\/`, which JSON reads back as the same string.
pub fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Fill the first occurrence of each marker of `template`.
///
/// Markers are located in the template itself, so JSON that happens to
/// contain a marker is never substituted. A missing marker is logged and
/// left out.
pub fn render_index(template: &str, results_json: &str, settings_json: &str) -> String {
    let mut replacements = Vec::with_capacity(2);
    for (marker, declaration) in [
        (RESULTS_PLACEHOLDER, format!("var results = {}", script_safe_json(results_json))),
        (SETTINGS_PLACEHOLDER, format!("var settings = {}", script_safe_json(settings_json))),
    ] {
        match template.find(marker) {
            Some(start) => replacements.push((start, marker.len(), declaration)),
            None => warn!(marker, "Placeholder not found in template"),
        }
    }
    replacements.sort_by_key(|(start, _, _)| *start);

    let mut html = String::with_capacity(
        template.len() + replacements.iter().map(|(_, _, d)| d.len()).sum::<usize>(),
    );
    let mut cursor = 0;
    for (start, len, declaration) in replacements {
        html.push_str(&template[cursor..start]);
        html.push_str(&declaration);
        cursor = start + len;
    }
    html.push_str(&template[cursor..]);
    html
}

/// Extract the JSON assigned to `var <name> = ` by [`render_index`].
///
/// Reads up to the end of the JSON value, so it works whatever follows the
/// declaration.
pub fn extract_embedded(html: &str, name: &str) -> Option<serde_json::Value> {
    let prefix = format!("var {} = ", name);
    let start = html.find(&prefix)? + prefix.len();
    let mut stream =
        serde_json::Deserializer::from_str(&html[start..]).into_iter::<serde_json::Value>();
    stream.next()?.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEMPLATE: &str = "<script>\n/*%%RESULTS%%*/;\n/*%%SETTINGS%%*/;\n</script>";

    #[test]
    fn test_render_replaces_markers() {
        let html = render_index(TEMPLATE, "{\"pages\": []}", "{\"timeout\": 1}");
        assert_eq!(
            html,
            "<script>\nvar results = {\"pages\": []};\nvar settings = {\"timeout\": 1};\n</script>"
        );
    }

    #[test]
    fn test_marker_inside_json_is_not_substituted() {
        let results = json!({ "pages": [{ "url": "http://a.com/#/*%%SETTINGS%%*/" }] });
        let settings = json!({ "timeout": 1 });
        let html = render_index(TEMPLATE, &results.to_string(), &settings.to_string());

        assert_eq!(extract_embedded(&html, "results"), Some(results));
        assert_eq!(extract_embedded(&html, "settings"), Some(settings));
    }

    #[test]
    fn test_script_end_tag_is_escaped() {
        let results = json!({ "pages": [{ "url": "http://a.com/</script>" }] });
        let html = render_index(TEMPLATE, &results.to_string(), "{}");

        assert_eq!(html.matches("</script>").count(), 1);
        assert_eq!(extract_embedded(&html, "results"), Some(results));
    }

    #[test]
    fn test_missing_marker_left_alone() {
        let html = render_index("<p>static</p>", "{}", "{}");
        assert_eq!(html, "<p>static</p>");
        assert!(extract_embedded(&html, "results").is_none());
    }

    #[test]
    fn test_shipped_template_has_both_markers() {
        let template = include_str!("../../../front/index.html");
        assert!(template.contains(RESULTS_PLACEHOLDER));
        assert!(template.contains(SETTINGS_PLACEHOLDER));
    }

    #[test]
    fn test_only_first_marker_replaced() {
        let template = "/*%%RESULTS%%*/ /*%%RESULTS%%*/ /*%%SETTINGS%%*/";
        let html = render_index(template, "1", "2");
        assert_eq!(html, "var results = 1 /*%%RESULTS%%*/ var settings = 2");
    }
}
