//! Per-visit state records emitted by the trajectory generator.

use serde::{Deserialize, Serialize};

use crate::context::TonguePulse;
use crate::grid::Snapped;
use crate::ladder::{
    AssociatedSeverity, PainFrequency, SeverityLevel, StrengthGrade, TightnessGrade,
};

/// Direction of an objective finding relative to the previous visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improved,
    #[default]
    Unchanged,
    Worsened,
}

/// Subjective narrative classification of the visit-over-visit change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SymptomChange {
    #[default]
    Similar,
    #[serde(rename = "improvement-of-symptoms")]
    Improvement,
    Exacerbate,
    CameBack,
}

impl SymptomChange {
    /// Exacerbations and recurrences are the gated negative classifications.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        matches!(self, Self::Exacerbate | Self::CameBack)
    }
}

/// Subjective change flags for the SOA chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SoaSubjective {
    pub pain_changed: bool,
    pub adl_changed: bool,
    pub frequency_changed: bool,
}

/// Objective finding trends for the SOA chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SoaObjective {
    pub tightness: Trend,
    pub tenderness: Trend,
    pub spasm: Trend,
    pub rom: Trend,
    pub strength: Trend,
}

impl SoaObjective {
    /// Count of findings that improved this visit.
    #[must_use]
    pub fn improved_count(&self) -> u8 {
        [
            self.tightness,
            self.tenderness,
            self.spasm,
            self.rom,
            self.strength,
        ]
        .into_iter()
        .filter(|trend| *trend == Trend::Improved)
        .count() as u8
    }

    /// True when any finding regressed this visit.
    #[must_use]
    pub fn any_worsened(&self) -> bool {
        [
            self.tightness,
            self.tenderness,
            self.spasm,
            self.rom,
            self.strength,
        ]
        .into_iter()
        .any(|trend| trend == Trend::Worsened)
    }
}

/// Assessment narrative strings; must never contradict the trend enums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SoaAssessment {
    pub present: String,
    pub patient_change: String,
    pub what_changed: String,
    pub physical_change: String,
}

/// Subjective/objective/assessment chain attached to each visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SoaChain {
    pub subjective: SoaSubjective,
    pub objective: SoaObjective,
    pub assessment: SoaAssessment,
}

/// Per-visit noise inputs. These gate which reason phrases are eligible on
/// a visit; they never feed back into the numeric trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveFactors {
    /// Days since the previous session.
    pub session_gap_days: u8,
    pub sleep: f64,
    pub workload: f64,
    pub weather: f64,
    pub adherence: f64,
}

impl Default for ObjectiveFactors {
    fn default() -> Self {
        Self {
            session_gap_days: 3,
            sleep: 0.5,
            workload: 0.5,
            weather: 0.5,
            adherence: 0.5,
        }
    }
}

/// Independent recovery scalars per side for bilateral presentations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideProgress {
    pub left: f64,
    pub right: f64,
}

impl SideProgress {
    /// The side lagging behind; aggregate indicators track this one.
    #[must_use]
    pub fn worse(&self) -> f64 {
        self.left.min(self.right)
    }
}

/// One visit of a generated course. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitState {
    /// 1-based position in the course.
    pub visit_index: u16,
    /// Recovery phase scalar, monotone non-decreasing across the course.
    pub progress: f64,
    pub pain_scale_current: f64,
    /// Pain snapped to the 0.5 display grid.
    pub pain_snapped: Snapped,
    pub severity_level: SeverityLevel,
    pub tightness_grading: TightnessGrade,
    /// Palpation tenderness 0..=4.
    pub tenderness_grading: u8,
    /// Spasm grade 0..=4.
    pub spasm_grading: u8,
    pub strength_grade: StrengthGrade,
    pub pain_frequency: PainFrequency,
    /// Remaining symptom burden as a 5-step percentage string.
    pub symptom_scale: Snapped,
    pub associated_symptom: AssociatedSeverity,
    pub symptom_change: SymptomChange,
    pub reason: String,
    pub reason_connector: String,
    pub soa_chain: SoaChain,
    pub objective_factors: ObjectiveFactors,
    /// Present only for bilateral presentations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_progress: Option<SideProgress>,
    /// Inherited unchanged from the initial evaluation.
    pub tongue_pulse: TonguePulse,
}
