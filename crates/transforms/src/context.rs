//! Per-traversal registration and selection of mutations.

use crate::identifier::MutationIdentifier;
use stackmut_core::Location;

/// Collects the candidates found while one method (or, switching locations, one class) is
/// walked, and decides which of them is materialized.
///
/// Without a target every candidate is reported as selected; that mode is only used for
/// enumeration, where the rewritten stream is thrown away. With a target exactly the
/// identifier equal to it is selected.
#[derive(Debug, Clone)]
pub struct MutationContext {
    location: Location,
    target: Option<MutationIdentifier>,
    candidates: Vec<MutationIdentifier>,
}

impl MutationContext {
    /// Enumeration context for `location`.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            target: None,
            candidates: Vec::new(),
        }
    }

    /// Context that materializes only `target`.
    pub fn targeting(location: Location, target: MutationIdentifier) -> Self {
        Self {
            location,
            target: Some(target),
            candidates: Vec::new(),
        }
    }

    /// Switches the method subsequent registrations belong to.
    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn target(&self) -> Option<&MutationIdentifier> {
        self.target.as_ref()
    }

    /// Records a candidate at `index` of the current method and returns its identifier.
    ///
    /// Duplicates are recorded again.
    pub fn register(
        &mut self,
        mutator: &str,
        index: usize,
        description: &str,
    ) -> MutationIdentifier {
        let id = MutationIdentifier::new(self.location.clone(), index, mutator, description);
        tracing::trace!("registered {}", id);
        self.candidates.push(id.clone());
        id
    }

    pub fn should_mutate(&self, id: &MutationIdentifier) -> bool {
        match &self.target {
            None => true,
            Some(target) => target == id,
        }
    }

    /// Candidates in registration order.
    pub fn candidates(&self) -> &[MutationIdentifier] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<MutationIdentifier> {
        self.candidates
    }
}
