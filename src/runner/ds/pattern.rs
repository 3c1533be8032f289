//! Compiled text-matching rule with a JS-like `/source/flags` identity.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::runner::ds::error::GraphError;

const SUPPORTED_FLAGS: &str = "gimsuy";

pub struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
    pub last_index: usize,
}

impl Pattern {
    pub fn new(source: &str, flags: &str) -> Result<Self, GraphError> {
        if let Some(flag) = flags.chars().find(|c| !SUPPORTED_FLAGS.contains(*c)) {
            return Err(GraphError::InvalidPattern {
                pattern: source.to_string(),
                message: format!("unsupported flag '{}'", flag),
            });
        }
        let regex = RegexBuilder::new(source)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()
            .map_err(|e| GraphError::InvalidPattern {
                pattern: source.to_string(),
                message: e.to_string(),
            })?;
        Ok(Pattern {
            source: source.to_string(),
            flags: flags.to_string(),
            regex,
            last_index: 0,
        })
    }

    /// Rebuilds the pattern from its source and flags and carries the
    /// cursor over explicitly.
    pub fn reconstruct(&self) -> Pattern {
        Pattern {
            source: self.source.clone(),
            flags: self.flags.clone(),
            regex: self.regex.clone(),
            last_index: self.last_index,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_global(&self) -> bool {
        self.flags.contains('g') || self.flags.contains('y')
    }

    /// Matches against `text`. Global and sticky patterns start at
    /// `last_index` and advance it; a miss resets it to zero.
    pub fn test(&mut self, text: &str) -> bool {
        if !self.is_global() {
            return self.regex.is_match(text);
        }
        if self.last_index > text.len() || !text.is_char_boundary(self.last_index) {
            self.last_index = 0;
            return false;
        }
        let found = match self.regex.find_at(text, self.last_index) {
            Some(m) if self.flags.contains('y') && m.start() != self.last_index => None,
            other => other,
        };
        match found {
            Some(m) => {
                self.last_index = m.end();
                true
            }
            None => {
                self.last_index = 0;
                false
            }
        }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}
