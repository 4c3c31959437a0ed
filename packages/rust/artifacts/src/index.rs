//! Index document generation.
//!
//! Produces the human-readable Markdown index linking every published
//! artifact in both encodings. Sorting by name happens here — it is a
//! presentation concern, not a pipeline ordering guarantee.

use chrono::{DateTime, Utc};
use linkmill_shared::ArtifactMeta;

/// Generate the Markdown index document.
///
/// When `repository` is set (`owner/repo`), links are absolute raw
/// GitHub URLs against the `main` branch; otherwise they are relative
/// paths into the output tree.
pub fn generate_index(
    repository: Option<&str>,
    artifacts: &[ArtifactMeta],
    timestamp: DateTime<Utc>,
) -> String {
    let mut content = String::from("# Processed Links Collection\n\n");
    content.push_str(&format!(
        "Last updated: `{}`\n\n",
        timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    content.push_str(
        "This repository contains automatically processed lists from various sources.\n\n",
    );

    content.push_str("| File Name | Normal Format (Raw) | Base64 Format (Raw) |\n");
    content.push_str("|-----------|-----------------------|-----------------------|\n");

    if artifacts.is_empty() {
        content.push_str("| *No files processed* | | |\n");
        return content;
    }

    let mut sorted: Vec<&ArtifactMeta> = artifacts.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    for meta in sorted {
        let normal_link = locator(repository, &meta.raw_path);
        let base64_link = locator(repository, &meta.encoded_path);
        content.push_str(&format!(
            "| `{}` | [Link]({normal_link}) | [Link]({base64_link}) |\n",
            meta.name
        ));
    }

    content
}

/// Build the link target for one output path.
fn locator(repository: Option<&str>, path: &str) -> String {
    match repository {
        Some(repo) => format!("https://raw.githubusercontent.com/{repo}/main/{path}"),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta(name: &str) -> ArtifactMeta {
        ArtifactMeta {
            name: name.into(),
            raw_path: format!("normal/{name}.txt"),
            encoded_path: format!("base64/{name}.b64"),
            sha256: "0".repeat(64),
            size_bytes: 1,
            source_count: 1,
            line_count: 1,
        }
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn index_has_header_and_timestamp() {
        let index = generate_index(None, &[], ts());
        assert!(index.starts_with("# Processed Links Collection"));
        assert!(index.contains("Last updated: `2025-06-01 12:00:00 UTC`"));
    }

    #[test]
    fn empty_list_gets_placeholder_row() {
        let index = generate_index(None, &[], ts());
        assert!(index.contains("| *No files processed* | | |"));
    }

    #[test]
    fn rows_are_sorted_by_name() {
        let artifacts = vec![meta("zeta"), meta("alpha"), meta("mid")];
        let index = generate_index(None, &artifacts, ts());

        let alpha = index.find("`alpha`").unwrap();
        let mid = index.find("`mid`").unwrap();
        let zeta = index.find("`zeta`").unwrap();
        assert!(alpha < mid && mid < zeta);
    }

    #[test]
    fn repository_makes_links_absolute() {
        let artifacts = vec![meta("list")];
        let index = generate_index(Some("acme/lists"), &artifacts, ts());
        assert!(index.contains(
            "https://raw.githubusercontent.com/acme/lists/main/normal/list.txt"
        ));
        assert!(index.contains(
            "https://raw.githubusercontent.com/acme/lists/main/base64/list.b64"
        ));
    }

    #[test]
    fn no_repository_makes_links_relative() {
        let artifacts = vec![meta("list")];
        let index = generate_index(None, &artifacts, ts());
        assert!(index.contains("[Link](normal/list.txt)"));
        assert!(index.contains("[Link](base64/list.b64)"));
        assert!(!index.contains("raw.githubusercontent.com"));
    }
}
