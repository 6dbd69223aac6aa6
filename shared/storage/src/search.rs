//! Free-text matching used by post search

use regex::{Regex, RegexBuilder};

/// Case-insensitive pattern built from a user's search input
///
/// The input is compiled as a regular expression. Input that is not a valid expression
/// (an unbalanced `(` for example) is matched as a literal substring instead.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    regex: Regex,
}

impl SearchPattern {
    /// Compiles `input` into a search pattern
    ///
    /// # Errors
    ///
    /// Returns `regex::Error` if even the escaped literal exceeds the regex size limits
    pub fn new(input: &str) -> Result<Self, regex::Error> {
        let regex = match Self::compile(input) {
            Ok(regex) => regex,
            Err(_) => Self::compile(&regex::escape(input))?,
        };

        Ok(Self { regex })
    }

    fn compile(pattern: &str) -> Result<Regex, regex::Error> {
        RegexBuilder::new(pattern).case_insensitive(true).build()
    }

    /// Whether `text` contains a match
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}
