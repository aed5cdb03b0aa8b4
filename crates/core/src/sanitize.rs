// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! URL to folder name mapping.

/// Longest folder name produced by [`sanitize_folder_name`], in characters.
pub const MAX_FOLDER_NAME_LEN: usize = 50;

const STRIPPED: &[char] = &['/', '.', '?', ':', '-', '&', '%', '='];

/// Map a URL to the folder name its profiler results live under.
///
/// Strips `/ . ? : - & % =` and keeps at most [`MAX_FOLDER_NAME_LEN`]
/// characters. Nothing else is escaped, and two URLs may map to the same name.
pub fn sanitize_folder_name(url: &str) -> String {
    url.chars()
        .filter(|c| !STRIPPED.contains(c))
        .take(MAX_FOLDER_NAME_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_separators() {
        assert_eq!(sanitize_folder_name("http://a.com/x?y=1"), "httpacomxy1");
        assert_eq!(
            sanitize_folder_name("https://my-site.org/a&b%20c"),
            "httpsmysiteorgab20c"
        );
    }

    #[test]
    fn test_is_idempotent() {
        let once = sanitize_folder_name("http://www.google.fr/?q=devperf");
        assert_eq!(sanitize_folder_name(&once), once);
    }

    #[test]
    fn test_truncates_long_names() {
        let url = format!("http://example.com/{}", "a".repeat(80));
        let name = sanitize_folder_name(&url);
        assert_eq!(name.chars().count(), MAX_FOLDER_NAME_LEN);
        assert!(name.starts_with("httpexamplecom"));
        assert_eq!(sanitize_folder_name(&name), name);
    }

    #[test]
    fn test_keeps_other_characters() {
        assert_eq!(sanitize_folder_name("http://a.b/c d#e"), "httpabc d#e");
    }
}
