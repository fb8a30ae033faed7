//! Generation inputs: patient context, sequence options, and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ladder::AssociatedSeverity;
use crate::visit::VisitState;

/// Treated body region. Drives spasm modifiers and narrative phrasing only;
/// the numeric trajectory is body-part agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Neck,
    Shoulder,
    UpperBack,
    LowerBack,
    Hip,
    Knee,
    Elbow,
    Wrist,
    Ankle,
    Hand,
    Foot,
}

impl BodyPart {
    /// Small articular regions grade spasm one tier down.
    #[must_use]
    pub const fn is_small_joint(self) -> bool {
        matches!(
            self,
            Self::Knee | Self::Elbow | Self::Wrist | Self::Ankle | Self::Hand | Self::Foot
        )
    }

    /// Large muscle groups hold spasm at least level with tenderness when
    /// tightness is high.
    #[must_use]
    pub const fn is_large_muscle_group(self) -> bool {
        matches!(
            self,
            Self::Neck | Self::Shoulder | Self::UpperBack | Self::LowerBack | Self::Hip
        )
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Neck => "cervical",
            Self::Shoulder => "shoulder",
            Self::UpperBack => "upper back",
            Self::LowerBack => "lower back",
            Self::Hip => "hip",
            Self::Knee => "knee",
            Self::Elbow => "elbow",
            Self::Wrist => "wrist",
            Self::Ankle => "ankle",
            Self::Hand => "hand",
            Self::Foot => "foot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Laterality {
    Left,
    #[default]
    Right,
    Bilateral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Chronicity {
    Acute,
    SubAcute,
    #[default]
    Chronic,
}

impl Chronicity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Acute => "acute",
            Self::SubAcute => "sub-acute",
            Self::Chronic => "chronic",
        }
    }
}

/// Pain targets carried over from a prior initial-evaluation record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GoalReference {
    #[serde(default)]
    pub short_term_pain: Option<f64>,
    #[serde(default)]
    pub long_term_pain: Option<f64>,
}

/// Tongue and pulse findings from the initial evaluation, copied verbatim
/// onto every visit of the course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TonguePulse {
    pub tongue: String,
    pub pulse: String,
}

impl Default for TonguePulse {
    fn default() -> Self {
        Self {
            tongue: String::from("pale with thin white coating"),
            pulse: String::from("wiry"),
        }
    }
}

/// Immutable per-run input describing the patient's initial assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub body_part: BodyPart,
    #[serde(default)]
    pub laterality: Laterality,
    #[serde(default)]
    pub chronicity: Chronicity,
    pub pain_current: f64,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub prior_eval: Option<GoalReference>,
    #[serde(default)]
    pub allow_negative_events: bool,
    #[serde(default)]
    pub disable_chronic_caps: bool,
    /// Associated symptom name ("radiating pain", "stiffness", ...). Never
    /// feeds the numeric trajectory.
    #[serde(default)]
    pub associated_symptom: Option<String>,
    /// Severity of the associated symptom at intake.
    #[serde(default = "default_associated_intake")]
    pub associated_intake: AssociatedSeverity,
    /// TCM local pattern label, narrative only.
    #[serde(default)]
    pub local_pattern: Option<String>,
    /// TCM systemic pattern label, narrative only.
    #[serde(default)]
    pub systemic_pattern: Option<String>,
    #[serde(default)]
    pub tongue_pulse: TonguePulse,
}

const fn default_associated_intake() -> AssociatedSeverity {
    AssociatedSeverity::Moderate
}

impl GenerationContext {
    /// Minimal context from the four fields every assessment carries.
    #[must_use]
    pub fn new(
        body_part: BodyPart,
        laterality: Laterality,
        chronicity: Chronicity,
        pain_current: f64,
    ) -> Self {
        Self {
            body_part,
            laterality,
            chronicity,
            pain_current,
            age: None,
            prior_eval: None,
            allow_negative_events: false,
            disable_chronic_caps: false,
            associated_symptom: None,
            associated_intake: default_associated_intake(),
            local_pattern: None,
            systemic_pattern: None,
            tongue_pulse: TonguePulse::default(),
        }
    }

    /// Fail-fast input validation; out-of-range values are never clamped.
    ///
    /// # Errors
    ///
    /// Returns `ContextError` when pain is non-finite or outside 0..=10, or
    /// when the stated age is implausible.
    pub fn validate(&self) -> Result<(), ContextError> {
        if !self.pain_current.is_finite() {
            return Err(ContextError::PainNotFinite);
        }
        if !(0.0..=10.0).contains(&self.pain_current) {
            return Err(ContextError::PainOutOfRange {
                value: self.pain_current,
            });
        }
        if let Some(age) = self.age
            && !(1..=120).contains(&age)
        {
            return Err(ContextError::AgeOutOfRange { value: age });
        }
        if let Some(goals) = &self.prior_eval {
            for target in [goals.short_term_pain, goals.long_term_pain].into_iter().flatten() {
                if !target.is_finite() || !(0.0..=10.0).contains(&target) {
                    return Err(ContextError::GoalOutOfRange { value: target });
                }
            }
        }
        Ok(())
    }
}

/// Options controlling one `generate_sequence` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceOptions {
    /// Number of visits to produce.
    pub tx_count: u16,
    pub seed: u64,
    /// First visit index for a resumed course; defaults to 1.
    #[serde(default)]
    pub start_visit_index: Option<u16>,
    /// Last emitted visit of the course being resumed.
    #[serde(default)]
    pub initial_state: Option<VisitState>,
}

impl SequenceOptions {
    #[must_use]
    pub const fn new(tx_count: u16, seed: u64) -> Self {
        Self {
            tx_count,
            seed,
            start_visit_index: None,
            initial_state: None,
        }
    }

    /// # Errors
    ///
    /// Returns `SequenceError` when the visit count is zero or a resume
    /// offset is malformed.
    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.tx_count == 0 {
            return Err(SequenceError::EmptyCourse);
        }
        if let Some(start) = self.start_visit_index {
            if start == 0 {
                return Err(SequenceError::StartIndexZero);
            }
            if let Some(initial) = &self.initial_state
                && initial.visit_index >= start
            {
                return Err(SequenceError::StartIndexBehindState {
                    start,
                    state_index: initial.visit_index,
                });
            }
        }
        Ok(())
    }
}

/// Validation failures on the patient context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContextError {
    #[error("pain score must be finite")]
    PainNotFinite,
    #[error("pain score must be between 0 and 10 (got {value:.2})")]
    PainOutOfRange { value: f64 },
    #[error("goal pain target must be between 0 and 10 (got {value:.2})")]
    GoalOutOfRange { value: f64 },
    #[error("age must be between 1 and 120 (got {value})")]
    AgeOutOfRange { value: u8 },
}

/// Validation failures on the sequence options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SequenceError {
    #[error("visit count must be at least 1")]
    EmptyCourse,
    #[error("start visit index must be at least 1")]
    StartIndexZero,
    #[error("start visit index {start} must follow the supplied state's index {state_index}")]
    StartIndexBehindState { start: u16, state_index: u16 },
    #[error(transparent)]
    Context(#[from] ContextError),
}
