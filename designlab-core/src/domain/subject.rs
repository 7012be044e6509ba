//! Subject identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one experiment subject.
///
/// The recorded form is `"<name> (ID <n>)"`; the trailing integer keys the
/// external identity spreadsheet used by the compensation export. Arbitrary
/// strings are accepted — only the compensation path requires the full form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the participant integer out of `"<name> (ID <n>)"`.
    pub fn numeric_id(&self) -> Option<u64> {
        let (_, tail) = self.0.rsplit_once(" (ID ")?;
        tail.strip_suffix(')')?.parse().ok()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
