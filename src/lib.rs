//! Coursegen Treatment-Course Engine
//!
//! Deterministic generation of internally consistent therapy treatment
//! courses. Given a patient's initial assessment and a visit count, the
//! engine emits one state per visit whose pain, tightness, tenderness,
//! spasm, strength, frequency, symptom percentage, and narrative
//! classification evolve plausibly and never contradict each other.
//! Identical seed and context always reproduce the identical course.

pub mod context;
pub mod diversity;
pub mod extract;
pub mod goals;
pub mod grid;
pub mod ladder;
pub mod narrative;
pub mod rng;
pub mod session;
pub mod spasm;
pub mod summary;
pub mod trajectory;
pub mod visit;

// Re-export commonly used types
pub use context::{
    BodyPart, Chronicity, ContextError, GenerationContext, GoalReference, Laterality,
    SequenceError, SequenceOptions, TonguePulse,
};
pub use extract::{ExtractedContext, ExtractedVisit, extract_context, extract_visit};
pub use goals::{ResolvedGoals, resolve_goals};
pub use grid::{Snapped, snap_percent, snap_to_grid};
pub use ladder::{
    AssociatedSeverity, PainFrequency, SeverityLevel, StrengthGrade, TightnessGrade,
};
pub use session::CourseSession;
pub use spasm::{SpasmInput, compute_spasm};
pub use summary::CourseSummary;
pub use trajectory::{
    TrajectoryConfig, TrajectoryConfigError, generate_sequence, generate_sequence_with,
};
pub use visit::{
    ObjectiveFactors, SideProgress, SoaAssessment, SoaChain, SoaObjective, SoaSubjective,
    SymptomChange, Trend, VisitState,
};
