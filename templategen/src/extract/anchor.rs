//! Bounded-delimiter extraction.

use std::fmt;

use crate::error::TemplategenError;
use crate::source::lexical::{find_token, skip_whitespace};

/// A begin marker, an optional constraint on what follows it, and the end
/// marker that closes the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    begin: &'static str,
    lead: Option<&'static str>,
    end: &'static str,
}

impl Anchor {
    /// Anchor spanning `begin` through the nearest following `end`.
    #[must_use]
    pub const fn new(begin: &'static str, end: &'static str) -> Self {
        Self {
            begin,
            lead: None,
            end,
        }
    }

    /// Only accept `begin` occurrences whose next token starts with `lead`.
    #[must_use]
    pub const fn followed_by(self, lead: &'static str) -> Self {
        Self {
            lead: Some(lead),
            ..self
        }
    }

    /// Finds the fragment in `text`, begin and end markers included.
    ///
    /// # Errors
    ///
    /// Returns [`TemplategenError::Extraction`] naming `artifact` and this
    /// anchor when no accepted begin marker exists, or when no end marker
    /// follows it.
    pub fn extract<'t>(&self, artifact: &str, text: &'t str) -> Result<&'t str, TemplategenError> {
        let start = self
            .find_begin(text)
            .ok_or_else(|| TemplategenError::extraction(artifact, format!("begin of {self}")))?;
        let after_begin = start + self.begin.len();
        let end = text
            .get(after_begin..)
            .and_then(|tail| tail.find(self.end))
            .map(|offset| after_begin + offset + self.end.len())
            .ok_or_else(|| TemplategenError::extraction(artifact, format!("end of {self}")))?;
        text.get(start..end)
            .filter(|fragment| !fragment.trim().is_empty())
            .ok_or_else(|| TemplategenError::extraction(artifact, self.to_string()))
    }

    fn find_begin(&self, text: &str) -> Option<usize> {
        let mut from = 0;
        while let Some(start) = find_token(text, self.begin, from) {
            let after = start + self.begin.len();
            let accepted = self.lead.is_none_or(|lead| {
                text.get(skip_whitespace(text, after)..)
                    .is_some_and(|rest| rest.starts_with(lead))
            });
            if accepted {
                return Some(start);
            }
            from = after;
        }
        None
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lead {
            Some(lead) => write!(f, "`{} {lead}` .. `{}`", self.begin, self.end),
            None => write!(f, "`{}` .. `{}`", self.begin, self.end),
        }
    }
}
