use crate::context::MutationContext;
use stackmut_core::Instruction;
use std::collections::BTreeSet;
use tracing::debug;

/// One rewriting step of a [`Pipeline`].
///
/// A stage sees every instruction exactly once, in program order, together with the index
/// the instruction had in the original stream, and writes whatever should take its place
/// to the [`Emitter`].
pub trait Stage: Send + Sync {
    /// Returns the stage's name for logging and identification.
    fn name(&self) -> &'static str;

    fn visit(
        &self,
        index: usize,
        instruction: &Instruction,
        ctx: &mut MutationContext,
        out: &mut Emitter,
    );
}

/// Output buffer of a stage. Everything emitted inherits the origin index of the
/// instruction being visited.
#[derive(Debug, Default)]
pub struct Emitter {
    origin: usize,
    emitted: Vec<(usize, Instruction)>,
}

impl Emitter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            origin: 0,
            emitted: Vec::with_capacity(capacity),
        }
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.emitted.push((self.origin, instruction));
    }

    /// Passes the visited instruction through unchanged.
    pub fn forward(&mut self, instruction: &Instruction) {
        self.emit(instruction.clone());
    }
}

/// Chain of stages run over one method body.
///
/// Instructions whose original index is in the skip set are passed through every stage
/// without being shown to it.
pub struct Pipeline<'a> {
    stages: Vec<&'a dyn Stage>,
    skip: Option<&'a BTreeSet<usize>>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            skip: None,
        }
    }

    pub fn stage(mut self, stage: &'a dyn Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn skipping(mut self, skip: &'a BTreeSet<usize>) -> Self {
        self.skip = Some(skip);
        self
    }

    fn is_skipped(&self, index: usize) -> bool {
        self.skip.is_some_and(|skip| skip.contains(&index))
    }

    /// Runs all stages and returns the final stream.
    pub fn run(&self, instructions: &[Instruction], ctx: &mut MutationContext) -> Vec<Instruction> {
        let mut current: Vec<(usize, Instruction)> =
            instructions.iter().cloned().enumerate().collect();

        for stage in &self.stages {
            let before = ctx.candidates().len();
            let mut out = Emitter::with_capacity(current.len());
            for (origin, instruction) in &current {
                out.origin = *origin;
                if self.is_skipped(*origin) {
                    out.forward(instruction);
                } else {
                    stage.visit(*origin, instruction, ctx, &mut out);
                }
            }
            debug!(
                "{:>24}: {} candidates, {} -> {} instructions",
                stage.name(),
                ctx.candidates().len() - before,
                current.len(),
                out.emitted.len()
            );
            current = out.emitted;
        }

        current.into_iter().map(|(_, instruction)| instruction).collect()
    }
}

impl Default for Pipeline<'_> {
    fn default() -> Self {
        Self::new()
    }
}
