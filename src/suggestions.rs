//! # Error Suggestions
//!
//! Helper functions that turn the fatal conditions of the command line tool
//! into messages saying what went wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use classpkg::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Store not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::store_not_found(path));
//! ```

use std::path::Path;

/// The class store file does not exist.
///
/// Includes hints about:
/// - Installing a package, which creates the store
/// - Using the --store flag
/// - Using the CLASSPKG_STORE environment variable
pub fn store_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Class store not found: {path}\n\n\
         hint: Run 'classpkg install <PACKAGE>' to create a store\n\
         hint: Use --store to point at an existing store file\n\
         hint: Set the CLASSPKG_STORE environment variable",
        path = path.display()
    )
}

/// The configuration file named with --config does not exist.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a .classpkg.yaml file in the working directory\n\
         hint: Use --config to specify a different path\n\
         hint: Set the CLASSPKG_CONFIG environment variable",
        path = path.display()
    )
}

/// No package folder matched a glob pattern.
pub fn no_packages(pattern: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "No package folders match: {pattern}\n\n\
         hint: A package folder contains a package.xml manifest\n\
         hint: Quote the pattern so the shell does not expand it"
    )
}

/// No file matched the pattern given to `extract`.
pub fn no_archives(pattern: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "No package archives match: {pattern}\n\n\
         hint: Binary packages have the .ezpkg extension\n\
         hint: Quote the pattern so the shell does not expand it"
    )
}

/// A glob pattern does not parse.
///
/// Includes hints about glob syntax.
pub fn invalid_glob(pattern: &str, error: &glob::PatternError) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid glob pattern: {pattern}\n\
         error: {error}\n\n\
         hint: Use * for single path component, ** for recursive matching\n\
         hint: Use [abc] for character classes, [!abc] to negate"
    )
}

/// A class identifier is not installed. Suggests a close match among
/// `installed`.
pub fn class_not_found(identifier: &str, installed: &[&str]) -> anyhow::Error {
    let did_you_mean = find_similar(identifier, installed)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Class not found: {identifier}{did_you_mean}\n\n\
         hint: Run 'classpkg diff <REPOSITORY>' to list classes that are not installed"
    )
}

/// A content object id is not in the store.
pub fn object_not_found(object_id: u64) -> anyhow::Error {
    anyhow::anyhow!("Content object not found: {object_id}")
}

/// A class definition file does not exist.
pub fn definition_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Class definition not found: {path}\n\n\
         hint: Definitions live in <package>/ezcontentclass/class-<identifier>.xml\n\
         hint: Run 'classpkg extract' first to unpack a binary package",
        path = path.display()
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
