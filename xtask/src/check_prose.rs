//! Prose linter for source comments and markdown.
//!
//! Walks the given paths (respecting `.gitignore`), looks at Rust comments
//! and markdown lines, and reports phrases that read as filler or
//! justification rather than information.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use regex::Regex;
use serde::Serialize;

/// Output format for the prose check results.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format '{}'. Use: text or json", s)),
        }
    }
}

/// Configuration for the prose check command.
#[derive(Debug)]
pub struct CheckProseConfig {
    /// Paths to check (files or directories)
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub verbose: bool,
}

/// One offending line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub path: PathBuf,
    pub line: usize,
    pub pattern: &'static str,
    pub suggestion: &'static str,
    pub text: String,
}

struct Rule {
    name: &'static str,
    regex: Regex,
    suggestion: &'static str,
}

fn rules() -> Result<Vec<Rule>> {
    let table: [(&str, &str, &str); 6] = [
        ("em-dash", "\u{2014}", "use a colon, comma or a new sentence"),
        (
            "justification",
            r"(?i)\b(by design|best practices?|cheap insurance|defensive(ly)?)\b",
            "state the constraint, not why it is good",
        ),
        (
            "filler",
            r"(?i)\b(seamless(ly)?|robust|leverag(e|es|ing)|delve|utiliz(e|es|ing))\b",
            "use a plain word",
        ),
        (
            "hedging",
            r"(?i)\b(it is worth noting|it should be noted|needless to say)\b",
            "drop the preamble",
        ),
        (
            "self-reference",
            r"(?i)\b(this (module|function) (is responsible for|aims to))\b",
            "say what it does",
        ),
        (
            "stacked emphasis",
            r"(?i)\b(very|really|extremely) (important|critical|crucial)\b",
            "drop the intensifier",
        ),
    ];
    table
        .into_iter()
        .map(|(name, pattern, suggestion)| {
            Ok(Rule {
                name,
                regex: Regex::new(pattern).with_context(|| format!("bad rule {name}"))?,
                suggestion,
            })
        })
        .collect()
}

/// The prose part of a line: comment text for Rust, the whole line for
/// markdown, nothing for other files.
fn prose_of<'a>(path: &Path, line: &'a str) -> Option<&'a str> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("md") => Some(line),
        Some("rs") => line.find("//").map(|i| &line[i..]),
        _ => None,
    }
}

/// Check one file's content.
pub fn check_content(path: &Path, content: &str, rules: &[Rule]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let Some(prose) = prose_of(path, line) else {
            continue;
        };
        for rule in rules {
            if rule.regex.is_match(prose) {
                findings.push(Finding {
                    path: path.to_path_buf(),
                    line: index + 1,
                    pattern: rule.name,
                    suggestion: rule.suggestion,
                    text: line.trim().to_string(),
                });
            }
        }
    }
    findings
}

/// Run the prose linter with the given configuration.
pub fn run(config: CheckProseConfig) -> Result<()> {
    let rules = rules()?;
    let mut findings = Vec::new();
    let mut files = 0usize;

    for root in &config.paths {
        for entry in WalkBuilder::new(root).build() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) || prose_of(path, "").is_none() {
                continue;
            }
            if path.components().any(|c| c.as_os_str() == "examples") {
                continue;
            }
            files += 1;
            if config.verbose {
                println!("  checking {}", path.display());
            }
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            findings.extend(check_content(path, &content, &rules));
        }
    }

    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&findings)?),
        OutputFormat::Text => {
            for finding in &findings {
                println!(
                    "{}:{}: {} ({})\n    {}",
                    finding.path.display(),
                    finding.line,
                    finding.pattern,
                    finding.suggestion,
                    finding.text
                );
            }
            println!("Checked {} file(s), {} finding(s)", files, findings.len());
        }
    }

    if !findings.is_empty() {
        bail!("prose check found {} issue(s)", findings.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_code_outside_comments_is_ignored() {
        let rules = rules().unwrap();
        let content = "let robust = 1;\n// a robust parser\n";
        let findings = check_content(Path::new("lib.rs"), content, &rules);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
        assert_eq!(findings[0].pattern, "filler");
    }

    #[test]
    fn test_em_dash_in_markdown() {
        let rules = rules().unwrap();
        let findings = check_content(Path::new("README.md"), "one \u{2014} two", &rules);
        assert_eq!(findings[0].pattern, "em-dash");
    }

    #[test]
    fn test_clean_comment() {
        let rules = rules().unwrap();
        let content = "/// Placements are renumbered 1..N in document order.\n";
        assert!(check_content(Path::new("doc.rs"), content, &rules).is_empty());
    }

    #[test]
    fn test_other_files_are_skipped() {
        let rules = rules().unwrap();
        assert!(check_content(Path::new("data.xml"), "robust", &rules).is_empty());
    }
}
