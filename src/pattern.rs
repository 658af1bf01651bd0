// WHY: Compiled search term shared by cell search and boundary localization

use regex_automata::{meta::Regex, util::syntax};

use crate::error::{ProbeError, Result};

/// Regular expression tested against extracted store values
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a case-sensitive pattern
    ///
    /// # Errors
    /// `InvalidArgument` when `source` is not a valid regular expression.
    pub fn new(source: &str) -> Result<Self> {
        Self::build(source, false)
    }

    /// Compile a pattern that ignores letter case
    ///
    /// # Errors
    /// `InvalidArgument` when `source` is not a valid regular expression.
    pub fn case_insensitive(source: &str) -> Result<Self> {
        Self::build(source, true)
    }

    fn build(source: &str, case_insensitive: bool) -> Result<Self> {
        let regex = Regex::builder()
            .syntax(syntax::Config::new().case_insensitive(case_insensitive))
            .build(source)
            .map_err(|e| ProbeError::InvalidArgument(format!("pattern {source:?}: {e}")))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/", self.source)
    }
}
