use std::fmt::Display;

use compact_str::CompactString;

/// Substrings of dependency names known to break installs.
pub const DEFAULT_PATTERNS: [&str; 2] = ["rowsncolumns", "problematic-package"];

/// Lowercase substrings matched case-insensitively against dependency names.
#[derive(Debug, Clone, PartialEq)]
pub struct Denylist {
    patterns: Vec<CompactString>,
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERNS)
    }
}

impl Denylist {
    /// Blank patterns are dropped, the rest are trimmed and lowercased.
    pub fn new<I, S>(patterns: I) -> Self where I: IntoIterator<Item = S>, S: AsRef<str> {
        let mut normalized: Vec<CompactString> = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue
            }

            let pattern = CompactString::from(pattern.to_lowercase());
            if !normalized.contains(&pattern) {
                normalized.push(pattern);
            }
        }

        Self { patterns: normalized }
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();

        self.patterns.iter().any(|p| name.contains(p.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[CompactString] {
        &self.patterns
    }
}

impl Display for Denylist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, pattern) in self.patterns().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(pattern)?;
        }

        Ok(())
    }
}
