//! Case- and space-insensitive name patterns with SQL-style `%` wildcards.

use regex::Regex;

/// Strip all whitespace and fold to lowercase before comparison. Both the
/// stored name and the query pattern go through this, so
/// `"San Francisco"` and `"sanfrancisco"` compare equal.
pub(crate) fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A compiled locality name pattern.
///
/// `%` matches any character sequence; without it the comparison is exact
/// after normalization.
#[derive(Debug, Clone)]
pub enum NamePattern {
    Exact(String),
    Like(Regex),
}

impl NamePattern {
    pub fn new(pattern: &str) -> Self {
        let normalized = normalize(pattern);
        if !normalized.contains('%') {
            return NamePattern::Exact(normalized);
        }
        let mut expression = String::from("^");
        for (i, literal) in normalized.split('%').enumerate() {
            if i > 0 {
                expression.push_str(".*");
            }
            expression.push_str(&regex::escape(literal));
        }
        expression.push('$');
        // All literal parts are escaped, so the expression is always valid.
        let regex = Regex::new(&expression).expect("escaped pattern compiles");
        NamePattern::Like(regex)
    }

    pub fn matches(&self, name: &str) -> bool {
        let normalized = normalize(name);
        match self {
            NamePattern::Exact(pattern) => normalized == *pattern,
            NamePattern::Like(regex) => regex.is_match(&normalized),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, NamePattern::Like(_))
    }
}
