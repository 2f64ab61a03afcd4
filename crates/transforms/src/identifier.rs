//! Names for individual mutations.

use serde::{Deserialize, Serialize};
use stackmut_core::Location;
use std::fmt;

/// One candidate mutation: where it is, which mutator makes it and what it changes.
///
/// Identifiers are plain values; equal fields mean the same mutation, so an identifier
/// produced by one traversal selects the same site in any later traversal of the same
/// unchanged method.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MutationIdentifier {
    pub location: Location,
    /// Position of the instruction in the original stream, labels and line markers
    /// included.
    pub index: usize,
    /// Global id of the mutator.
    pub mutator: String,
    pub description: String,
}

impl MutationIdentifier {
    pub fn new(
        location: Location,
        index: usize,
        mutator: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            location,
            index,
            mutator: mutator.into(),
            description: description.into(),
        }
    }

    /// Whether the mutation lives in `location`.
    pub fn is_in(&self, location: &Location) -> bool {
        &self.location == location
    }
}

impl fmt::Display for MutationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @{} [{}] {}",
            self.location, self.index, self.mutator, self.description
        )
    }
}
