//! Package patterns.
//!
//! Patterns select packages by id:
//! - `example.com/app/api` matches exactly that package
//! - `...` is a wildcard matching any string, including `/`
//! - `example.com/app/...` also matches `example.com/app` itself
//! - a leading `./` (or a bare `.`) is relative to the root module
//! - `std` matches the standard library: every id whose first path element
//!   has no `.`
//!
//! Patterns compile into a [`globset::GlobSet`]; literal text is escaped so
//! ids containing glob metacharacters match verbatim.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{SymdexError, SymdexResult};

/// Wildcard token of the pattern syntax.
pub const WILDCARD: &str = "...";

/// Pattern naming the standard library.
pub const STD: &str = "std";

/// Compiled set of package patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<String>,
    set: GlobSet,
    stdlib: bool,
}

impl PatternSet {
    /// Compile `patterns`. `root` is the path of the root module used to
    /// expand relative patterns; without it `./` is simply dropped.
    pub fn new<S: AsRef<str>>(patterns: &[S], root: Option<&str>) -> SymdexResult<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut originals = Vec::with_capacity(patterns.len());
        let mut stdlib = false;
        for pattern in patterns {
            let pattern = pattern.as_ref();
            originals.push(pattern.to_string());
            if pattern == STD {
                stdlib = true;
                continue;
            }
            for glob in expand(pattern, root) {
                let glob = Glob::new(&glob).map_err(|e| SymdexError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
                builder.add(glob);
            }
        }
        let set = builder.build().map_err(|e| SymdexError::InvalidPattern {
            pattern: originals.join(" "),
            reason: e.to_string(),
        })?;
        Ok(PatternSet {
            patterns: originals,
            set,
            stdlib,
        })
    }

    /// Returns true if any pattern matches `id`.
    pub fn is_match(&self, id: &str) -> bool {
        (self.stdlib && is_std_package(id)) || self.set.is_match(id)
    }

    /// The patterns as given.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Standard library ids have no domain in their first path element.
fn is_std_package(id: &str) -> bool {
    id.split('/')
        .next()
        .is_some_and(|first| !first.is_empty() && !first.contains('.'))
}

/// Expand one pattern into the globs it stands for.
fn expand(pattern: &str, root: Option<&str>) -> Vec<String> {
    let absolute = absolutize(pattern, root);
    let mut globs = vec![to_glob(&absolute)];
    if let Some(prefix) = absolute.strip_suffix("/...") {
        if !prefix.is_empty() {
            globs.push(to_glob(prefix));
        }
    }
    globs
}

fn absolutize(pattern: &str, root: Option<&str>) -> String {
    let relative = if pattern == "." {
        Some("")
    } else {
        pattern.strip_prefix("./")
    };
    match (relative, root) {
        (Some(""), Some(root)) => root.to_string(),
        (Some(rest), Some(root)) => format!("{root}/{rest}"),
        (Some(rest), None) => rest.to_string(),
        (None, _) => pattern.to_string(),
    }
}

fn to_glob(pattern: &str) -> String {
    pattern
        .split(WILDCARD)
        .map(globset::escape)
        .collect::<Vec<_>>()
        .join("*")
}

// ============================================================================
// Tests
// ============================================================================
