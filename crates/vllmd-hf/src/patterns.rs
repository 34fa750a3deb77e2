//! Glob-style allow-pattern matching for snapshot downloads.
//!
//! Patterns follow the hub convention: `*` matches any run of characters
//! (including `/`), `?` matches one character, everything else is literal.
//! An empty pattern list allows every file.

use regex::Regex;

use vllmd_core::HubError;

/// A compiled set of allow patterns.
#[derive(Debug)]
pub struct PatternSet {
    matchers: Vec<Regex>,
}

impl PatternSet {
    /// Compile a list of normalized glob patterns.
    pub fn compile(patterns: &[String]) -> Result<Self, HubError> {
        let matchers = patterns
            .iter()
            .map(|p| {
                Regex::new(&glob_to_regex(p))
                    .map_err(|e| HubError::InvalidResponse(format!("bad allow pattern '{p}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    /// Whether `name` passes the filter.
    pub fn allows(&self, name: &str) -> bool {
        self.matchers.is_empty() || self.matchers.iter().any(|m| m.is_match(name))
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}
