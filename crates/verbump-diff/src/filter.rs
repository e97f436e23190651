//! Ignore-pattern filtering of unified diff text

use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Paths that never affect the published API surface.
const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Lockfiles
    r"(^|/)Cargo\.lock$",
    r"(^|/)package-lock\.json$",
    r"(^|/)yarn\.lock$",
    r"(^|/)pnpm-lock\.yaml$",
    // Generated and build output
    r"(^|/)(dist|build|target|out)/",
    r"\.generated\.",
    // Images
    r"\.(png|jpe?g|gif|svg|ico|webp)$",
    // Documentation
    r"\.md$",
    // YAML configuration
    r"\.ya?ml$",
    // Test files and directories
    r"(^|/)(tests?|__tests__|__snapshots__)/",
    r"\.(test|spec)\.[cm]?[jt]sx?$",
    r"_test\.[a-z]+$",
    // Vendored worktrees
    r"(^|/)(vendor|node_modules)/",
];

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Invalid ignore pattern `{pattern}`: {source}")]
    Invalid {
        pattern: String,
        source: regex::Error,
    },
}

/// Compiled ignore-pattern set used to decide which file sections survive.
#[derive(Debug)]
pub struct IgnoreRules {
    patterns: Vec<Regex>,
}

impl IgnoreRules {
    /// The built-in pattern set.
    pub fn new() -> Self {
        Self::with_extra::<&str>(&[]).expect("built-in patterns compile")
    }

    /// The built-in pattern set extended with user-supplied patterns.
    pub fn with_extra<S: AsRef<str>>(extra: &[S]) -> Result<Self, PatternError> {
        let mut patterns = Vec::with_capacity(DEFAULT_IGNORE_PATTERNS.len() + extra.len());
        for pattern in DEFAULT_IGNORE_PATTERNS
            .iter()
            .copied()
            .chain(extra.iter().map(|s| s.as_ref()))
        {
            let compiled = Regex::new(pattern).map_err(|source| PatternError::Invalid {
                pattern: pattern.to_string(),
                source,
            })?;
            patterns.push(compiled);
        }
        Ok(Self { patterns })
    }

    /// The first pattern matching `path`, if any.
    pub fn matched(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|re| re.is_match(path))
            .map(|re| re.as_str())
    }
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove file sections for ignored paths from a unified diff.
///
/// Walks the diff line by line, tracking the current file from
/// `diff --git a/<old> b/<new>` header lines. A content line is kept iff
/// the file it belongs to matches no ignore pattern; header lines are
/// emitted only for kept files. The output is a strict subsequence of the
/// input lines, so filtering an already-filtered diff is a no-op.
pub fn filter_diff(diff: &str, rules: &IgnoreRules) -> String {
    // Same header shape the section parser keys on.
    let header_re = Regex::new(r"^diff --git a/(.*?) b/(.*?)$").expect("static regex");

    let mut result = String::new();
    // Lines before the first file header pass through untouched.
    let mut include_current = true;

    for line in diff.lines() {
        if let Some(captures) = header_re.captures(line) {
            // The b/ side names the file after the change; fall back to the
            // a/ side for deletions.
            let path = captures
                .get(2)
                .filter(|m| !m.as_str().is_empty())
                .or_else(|| captures.get(1))
                .map_or("", |m| m.as_str());

            match rules.matched(path) {
                Some(pattern) => {
                    debug!(path, pattern, "skipping ignored file");
                    include_current = false;
                }
                None => {
                    debug!(path, "keeping file");
                    include_current = true;
                }
            }
        }

        if include_current {
            result.push_str(line);
            result.push('\n');
        }
    }

    result
}
