//! Line-oriented parser for the jobs format.

use linkmill_shared::JobRecord;
use tracing::warn;

/// Parse job-definition content into records, in file order.
///
/// Skipped lines (no comma, empty halves, invalid output names) are
/// reported with `warn!` and dropped; parsing itself never fails.
pub fn parse_jobs(content: &str) -> Vec<JobRecord> {
    let mut jobs = Vec::new();

    for (lineno, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();

        // Blank lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Exactly one comma separates the source list from the output name.
        let parts: Vec<&str> = line.split(',').collect();
        let &[sources_part, name_part] = parts.as_slice() else {
            warn!(line = lineno + 1, content = %line, "skipping malformed line (need exactly one comma)");
            continue;
        };

        let output_name = name_part.trim();
        if let Err(reason) = validate_output_name(output_name) {
            warn!(line = lineno + 1, name = %output_name, %reason, "skipping line with invalid output name");
            continue;
        }

        let sources: Vec<String> = sources_part
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if sources.is_empty() {
            warn!(line = lineno + 1, name = %output_name, "skipping line with no sources");
            continue;
        }

        jobs.push(JobRecord {
            sources,
            output_name: output_name.to_string(),
        });
    }

    jobs
}

/// The output name becomes a file stem verbatim, so it must be non-empty
/// and must not walk the filesystem.
fn validate_output_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty");
    }
    if name.contains('/') || name.contains('\\') {
        return Err("contains path separator");
    }
    if name.contains("..") {
        return Err("contains parent traversal");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_source_line() {
        let jobs = parse_jobs("https://example.com/list.txt,mylist\n");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].sources, vec!["https://example.com/list.txt"]);
        assert_eq!(jobs[0].output_name, "mylist");
    }

    #[test]
    fn parses_multi_source_line_in_order() {
        let jobs = parse_jobs("https://a.example/x|aGVsbG8=|literal text,combined\n");
        assert_eq!(jobs.len(), 1);
        assert_eq!(
            jobs[0].sources,
            vec!["https://a.example/x", "aGVsbG8=", "literal text"]
        );
        assert_eq!(jobs[0].output_name, "combined");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let content = "\n# header comment\n\nhttps://a.example,one\n   \n# tail\n";
        let jobs = parse_jobs(content);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output_name, "one");
    }

    #[test]
    fn skips_line_without_comma() {
        let jobs = parse_jobs("https://a.example/no-output-name\nhttps://b.example,ok\n");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output_name, "ok");
    }

    #[test]
    fn skips_line_with_extra_commas() {
        let jobs = parse_jobs("https://a.example,name,with,commas\nhttps://b.example,ok\n");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output_name, "ok");
    }

    #[test]
    fn preserves_file_order() {
        let content = "s1,b\ns2,a\ns3,c\n";
        let jobs = parse_jobs(content);
        let names: Vec<_> = jobs.iter().map(|j| j.output_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn drops_empty_source_specs() {
        let jobs = parse_jobs("https://a.example||  |https://b.example,pair\n");
        assert_eq!(jobs[0].sources.len(), 2);
    }

    #[test]
    fn rejects_path_traversal_names() {
        let content = "s1,../etc/passwd\ns2,sub/dir\ns3,fine\n";
        let jobs = parse_jobs(content);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output_name, "fine");
    }

    #[test]
    fn rejects_empty_output_name() {
        let jobs = parse_jobs("https://a.example,   \n");
        assert!(jobs.is_empty());
    }
}
