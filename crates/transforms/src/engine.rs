//! Driver tying the catalog, the mutation context and the pipeline together.
//!
//! Enumeration walks the original method once per enabled mutator and keeps only the
//! candidates; application walks it once with the single mutator named by the target.
//! Neither ever changes the input.

use crate::catalog::{Group, Mutator};
use crate::context::MutationContext;
use crate::identifier::MutationIdentifier;
use crate::pipeline::Pipeline;
use crate::{EngineConfig, Result};
use serde::{Deserialize, Serialize};
use stackmut_core::coverage::{self, CoverageDatabase};
use stackmut_core::{Instruction, Method};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Report entry for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationDetails {
    pub id: MutationIdentifier,
    /// Source line of the mutated instruction, if the method carries line markers.
    pub line: Option<u32>,
    /// Display name of the mutator.
    pub mutator: String,
    pub group: Group,
}

/// Mutation engine over a fixed set of mutators.
#[derive(Debug, Clone)]
pub struct MutationEngine {
    mutators: Vec<Mutator>,
    skip_uncovered: bool,
}

impl Default for MutationEngine {
    fn default() -> Self {
        Self::new(Mutator::ALL.to_vec())
    }
}

impl MutationEngine {
    pub fn new(mutators: Vec<Mutator>) -> Self {
        Self {
            mutators,
            skip_uncovered: true,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            mutators: config.resolve()?,
            skip_uncovered: config.skip_uncovered,
        })
    }

    pub fn mutators(&self) -> &[Mutator] {
        &self.mutators
    }

    /// Every candidate in `method`, in mutator order and then instruction order.
    pub fn enumerate(&self, method: &Method) -> Vec<MutationIdentifier> {
        self.enumerate_skipping(method, &BTreeSet::new())
    }

    /// Like [`enumerate`](Self::enumerate), but instructions at the indices in `skip` are
    /// never offered to a mutator. Indices of the remaining instructions do not shift.
    pub fn enumerate_skipping(
        &self,
        method: &Method,
        skip: &BTreeSet<usize>,
    ) -> Vec<MutationIdentifier> {
        let mut ctx = MutationContext::new(method.location.clone());
        for mutator in &self.mutators {
            // The rewritten stream of an enumeration pass is discarded.
            let _ = Pipeline::new()
                .stage(mutator)
                .skipping(skip)
                .run(&method.instructions, &mut ctx);
        }
        let candidates = ctx.into_candidates();
        info!(
            "{}: {} candidates from {} mutators ({} instructions skipped)",
            method.location,
            candidates.len(),
            self.mutators.len(),
            skip.len()
        );
        candidates
    }

    /// Enumerates while leaving out instructions on lines no test executes, unless the
    /// engine was configured not to.
    pub fn enumerate_covered(
        &self,
        method: &Method,
        coverage: &dyn CoverageDatabase,
    ) -> Vec<MutationIdentifier> {
        if !self.skip_uncovered {
            return self.enumerate(method);
        }
        let skip = coverage::uncovered_indices(method, coverage);
        self.enumerate_skipping(method, &skip)
    }

    /// Materializes `target` in `method`.
    ///
    /// Targets of another method, of a disabled mutator or of a site that does not exist
    /// yield the unchanged instructions.
    pub fn apply(&self, method: &Method, target: &MutationIdentifier) -> Vec<Instruction> {
        let Some(mutator) = self.mutator_for(method, target) else {
            debug!("{} does not apply to {}", target, method.location);
            return method.instructions.clone();
        };

        let mut ctx = MutationContext::targeting(method.location.clone(), target.clone());
        let mutated = Pipeline::new()
            .stage(&mutator)
            .run(&method.instructions, &mut ctx);
        if !ctx.candidates().contains(target) {
            debug!("{} is not a candidate of {}", target, method.location);
        }
        mutated
    }

    /// Report details for `id`, if it is a candidate of an enabled mutator in `method`.
    pub fn details(&self, method: &Method, id: &MutationIdentifier) -> Option<MutationDetails> {
        let mutator = self.mutator_for(method, id)?;
        let mut ctx = MutationContext::new(method.location.clone());
        let _ = Pipeline::new()
            .stage(&mutator)
            .run(&method.instructions, &mut ctx);
        if !ctx.candidates().contains(id) {
            debug!("{} is not a candidate of {}", id, method.location);
            return None;
        }
        Some(MutationDetails {
            id: id.clone(),
            line: method.line_at(id.index),
            mutator: mutator.name().to_string(),
            group: mutator.group(),
        })
    }

    /// Every candidate paired with its mutated instruction stream.
    pub fn mutants(&self, method: &Method) -> Vec<(MutationIdentifier, Vec<Instruction>)> {
        self.enumerate(method)
            .into_iter()
            .map(|id| {
                let mutated = self.apply(method, &id);
                (id, mutated)
            })
            .collect()
    }

    fn mutator_for(&self, method: &Method, id: &MutationIdentifier) -> Option<Mutator> {
        if !id.is_in(&method.location) {
            return None;
        }
        self.mutators
            .iter()
            .copied()
            .find(|mutator| mutator.global_id() == id.mutator)
    }
}

/// Enumerates `method` with the whole catalog.
pub fn enumerate(method: &Method) -> Vec<MutationIdentifier> {
    MutationEngine::default().enumerate(method)
}

/// Applies `target` to `method` with the whole catalog enabled.
pub fn apply(method: &Method, target: &MutationIdentifier) -> Vec<Instruction> {
    MutationEngine::default().apply(method, target)
}
