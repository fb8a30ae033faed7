//! Incremental course session: visit-by-visit generation over one context.

use crate::context::{GenerationContext, SequenceError, SequenceOptions};
use crate::goals::ResolvedGoals;
use crate::trajectory::{CourseWalker, TrajectoryConfig};
use crate::visit::VisitState;

/// High-level wrapper binding a context and options to a running course.
///
/// Equivalent to `generate_sequence`, but lets a caller pull visits one at
/// a time, inspect goals mid-course, and stop early. Two sessions built
/// from the same inputs emit identical visits.
#[derive(Debug)]
pub struct CourseSession {
    walker: CourseWalker,
    tx_count: u16,
    emitted: Vec<VisitState>,
}

impl CourseSession {
    /// Build a session with default generation parameters.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError` for invalid context or options.
    pub fn new(ctx: &GenerationContext, opts: &SequenceOptions) -> Result<Self, SequenceError> {
        Self::with_config(ctx, opts, &TrajectoryConfig::default())
    }

    /// Build a session with explicit generation parameters.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError` for invalid context or options.
    pub fn with_config(
        ctx: &GenerationContext,
        opts: &SequenceOptions,
        cfg: &TrajectoryConfig,
    ) -> Result<Self, SequenceError> {
        Ok(Self {
            walker: CourseWalker::new(ctx, opts, cfg)?,
            tx_count: opts.tx_count,
            emitted: Vec::with_capacity(usize::from(opts.tx_count)),
        })
    }

    /// Resolved pain targets for this course.
    #[must_use]
    pub const fn goals(&self) -> &ResolvedGoals {
        self.walker.goals()
    }

    /// Visits emitted so far.
    #[must_use]
    pub fn visits(&self) -> &[VisitState] {
        &self.emitted
    }

    /// Whether every planned visit has been emitted.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.walker.emitted() >= self.tx_count
    }

    /// Total random draws consumed so far, for determinism instrumentation.
    #[must_use]
    pub fn total_draws(&self) -> u64 {
        self.walker.total_draws()
    }

    /// Produce the next visit, or `None` once the course is complete.
    pub fn next_visit(&mut self) -> Option<VisitState> {
        let visit = self.walker.next_visit()?;
        self.emitted.push(visit.clone());
        Some(visit)
    }

    /// Run the remainder of the course and return every emitted visit.
    #[must_use]
    pub fn run_to_completion(mut self) -> Vec<VisitState> {
        while self.next_visit().is_some() {}
        self.emitted
    }
}
