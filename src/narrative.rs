//! Narrative consistency layer.
//!
//! Classifies the visit-over-visit change from the numeric deltas, selects
//! a non-repetitive reason phrase, and fills the assessment strings so the
//! prose can never contradict the underlying trends. This layer only labels
//! already-computed deltas; on missing inputs it degrades to the neutral
//! classification instead of failing.

use rand::Rng;
use smallvec::SmallVec;

use crate::context::GenerationContext;
use crate::diversity::ShuffleBag;
use crate::visit::{SoaObjective, SymptomChange, Trend, VisitState};

/// Pain drop below which the subjective pain flag stays off.
const PAIN_CHANGE_THRESHOLD: f64 = 0.25;
/// Multi-dimensional score threshold separating "similar" from improvement.
const IMPROVEMENT_SCORE_THRESHOLD: f64 = 0.25;
/// Weight of one improved objective finding in the change score.
const OBJECTIVE_WEIGHT: f64 = 0.3;
/// Progress step treated as a visible range-of-motion gain.
const ROM_STEP_THRESHOLD: f64 = 0.04;

const NEUTRAL_REASON: &str = "no significant change in routine";

/// Precondition a reason phrase places on the visit's objective factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FactorGate {
    Any,
    GoodSleep,
    PoorSleep,
    LowWorkload,
    HighWorkload,
    WeatherShift,
    GoodAdherence,
    PoorAdherence,
    ShortGap,
    LongGap,
}

impl FactorGate {
    fn eligible(self, visit: &VisitState) -> bool {
        let factors = &visit.objective_factors;
        match self {
            Self::Any => true,
            Self::GoodSleep => factors.sleep > 0.6,
            Self::PoorSleep => factors.sleep < 0.4,
            Self::LowWorkload => factors.workload < 0.4,
            Self::HighWorkload => factors.workload > 0.6,
            Self::WeatherShift => factors.weather > 0.6,
            Self::GoodAdherence => factors.adherence > 0.7,
            Self::PoorAdherence => factors.adherence < 0.4,
            Self::ShortGap => factors.session_gap_days <= 3,
            Self::LongGap => factors.session_gap_days >= 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reason {
    text: &'static str,
    gate: FactorGate,
}

const fn reason(text: &'static str, gate: FactorGate) -> Reason {
    Reason { text, gate }
}

const IMPROVEMENT_REASONS: [Reason; 10] = [
    reason("consistent response to treatment", FactorGate::Any),
    reason(
        "good adherence to the home exercise program",
        FactorGate::GoodAdherence,
    ),
    reason("improved sleep quality this week", FactorGate::GoodSleep),
    reason("a lighter workload between visits", FactorGate::LowWorkload),
    reason(
        "regular attendance of scheduled sessions",
        FactorGate::ShortGap,
    ),
    reason("the cumulative effect of consecutive treatments", FactorGate::Any),
    reason("better pacing of daily activities", FactorGate::Any),
    reason("improved body mechanics during daily tasks", FactorGate::Any),
    reason("a gradual return of activity tolerance", FactorGate::Any),
    reason("a favorable response to the current protocol", FactorGate::Any),
];

const SIMILAR_REASONS: [Reason; 8] = [
    reason("symptoms holding steady between sessions", FactorGate::Any),
    reason("poor sleep this week", FactorGate::PoorSleep),
    reason("an increased workload between visits", FactorGate::HighWorkload),
    reason("a change in the weather this week", FactorGate::WeatherShift),
    reason("a longer gap between sessions", FactorGate::LongGap),
    reason("sustained daily demands at home", FactorGate::Any),
    reason("the plateau phase of the recovery curve", FactorGate::Any),
    reason("residual stiffness from daily activities", FactorGate::Any),
];

const NEGATIVE_REASONS: [Reason; 4] = [
    reason("overexertion at work", FactorGate::HighWorkload),
    reason("re-aggravation during daily activities", FactorGate::Any),
    reason("missed home exercises this week", FactorGate::PoorAdherence),
    reason("cold and damp weather exposure", FactorGate::WeatherShift),
];

const CONNECTORS: [&str; 4] = ["due to", "secondary to", "attributed to", "in the setting of"];

/// Stateful narrative annotator for one course.
#[derive(Debug, Clone)]
pub struct NarrativeEngine {
    improvement: ShuffleBag<Reason>,
    similar: ShuffleBag<Reason>,
    negative: ShuffleBag<Reason>,
    connectors: ShuffleBag<&'static str>,
    improvement_seen: bool,
}

impl Default for NarrativeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrativeEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            improvement: ShuffleBag::new(IMPROVEMENT_REASONS.to_vec()),
            similar: ShuffleBag::new(SIMILAR_REASONS.to_vec()),
            negative: ShuffleBag::new(NEGATIVE_REASONS.to_vec()),
            connectors: ShuffleBag::new(CONNECTORS.to_vec()),
            improvement_seen: false,
        }
    }

    /// Whether any visit so far classified as an improvement.
    #[must_use]
    pub const fn improvement_seen(&self) -> bool {
        self.improvement_seen
    }

    /// Fill `symptom_change`, `reason`, `reason_connector`, and the SOA
    /// chain of `visit` from its delta against `prev`.
    ///
    /// `baseline_pain` stands in for the previous pain on the first visit
    /// of a fresh course. `negative_event` marks the visit as a gated
    /// exacerbation/recurrence.
    pub fn annotate<R: Rng + ?Sized>(
        &mut self,
        visit: &mut VisitState,
        prev: Option<&VisitState>,
        ctx: &GenerationContext,
        baseline_pain: f64,
        negative_event: bool,
        rng: &mut R,
    ) {
        let prev_pain = prev.map_or(baseline_pain, |state| state.pain_scale_current);
        let pain_delta = prev_pain - visit.pain_scale_current;

        visit.soa_chain.objective = objective_trends(visit, prev, negative_event);
        let objective = visit.soa_chain.objective;

        let classification = classify(pain_delta, &objective, negative_event, self.improvement_seen);
        if classification == SymptomChange::Improvement {
            self.improvement_seen = true;
        }
        visit.symptom_change = classification;

        let frequency_changed = prev
            .is_some_and(|state| visit.pain_frequency.tier() > state.pain_frequency.tier());
        visit.soa_chain.subjective.pain_changed = pain_delta > PAIN_CHANGE_THRESHOLD;
        visit.soa_chain.subjective.frequency_changed = frequency_changed;
        visit.soa_chain.subjective.adl_changed =
            objective.strength == Trend::Improved || objective.rom == Trend::Improved;

        let pool = match classification {
            SymptomChange::Improvement => &mut self.improvement,
            SymptomChange::Similar => &mut self.similar,
            SymptomChange::Exacerbate | SymptomChange::CameBack => &mut self.negative,
        };
        let picked = pool.draw_where(rng, |candidate| candidate.gate.eligible(visit));
        visit.reason = picked
            .map_or_else(|| String::from(NEUTRAL_REASON), |r| String::from(r.text));
        visit.reason_connector =
            String::from(self.connectors.draw_or(rng, CONNECTORS[0]));

        let subjective = visit.soa_chain.subjective;
        visit.soa_chain.assessment.present = present_line(visit, ctx);
        visit.soa_chain.assessment.patient_change = patient_change_line(classification);
        visit.soa_chain.assessment.what_changed = what_changed_line(&subjective, classification);
        visit.soa_chain.assessment.physical_change = physical_change_line(&objective);
    }
}

/// Multi-dimensional change classification. Never "similar" when the
/// weighted pain delta plus objective movement clearly shifted, and never
/// an improvement claim when nothing moved.
fn classify(
    pain_delta: f64,
    objective: &SoaObjective,
    negative_event: bool,
    improvement_seen: bool,
) -> SymptomChange {
    if negative_event {
        return if improvement_seen {
            SymptomChange::CameBack
        } else {
            SymptomChange::Exacerbate
        };
    }
    let score = pain_delta + OBJECTIVE_WEIGHT * f64::from(objective.improved_count());
    if score >= IMPROVEMENT_SCORE_THRESHOLD {
        SymptomChange::Improvement
    } else {
        SymptomChange::Similar
    }
}

fn trend_of(prev_tier: u8, current_tier: u8, improving_down: bool) -> Trend {
    let improved = if improving_down {
        current_tier < prev_tier
    } else {
        current_tier > prev_tier
    };
    let worsened = if improving_down {
        current_tier > prev_tier
    } else {
        current_tier < prev_tier
    };
    if improved {
        Trend::Improved
    } else if worsened {
        Trend::Worsened
    } else {
        Trend::Unchanged
    }
}

fn objective_trends(
    visit: &VisitState,
    prev: Option<&VisitState>,
    negative_event: bool,
) -> SoaObjective {
    let Some(prev) = prev else {
        return SoaObjective::default();
    };
    let rom = if negative_event {
        Trend::Worsened
    } else if visit.progress - prev.progress > ROM_STEP_THRESHOLD {
        Trend::Improved
    } else {
        Trend::Unchanged
    };
    SoaObjective {
        tightness: trend_of(prev.tightness_grading.tier(), visit.tightness_grading.tier(), true),
        tenderness: trend_of(prev.tenderness_grading, visit.tenderness_grading, true),
        spasm: trend_of(prev.spasm_grading, visit.spasm_grading, true),
        rom,
        strength: trend_of(
            prev.strength_grade.tier(),
            visit.strength_grade.tier(),
            false,
        ),
    }
}

fn present_line(visit: &VisitState, ctx: &GenerationContext) -> String {
    format!(
        "{} {} {} pain, rated {}/10, {} in frequency",
        ctx.chronicity.label(),
        visit.severity_level.label(),
        ctx.body_part.label(),
        visit.pain_snapped.label,
        visit.pain_frequency.label(),
    )
}

fn patient_change_line(classification: SymptomChange) -> String {
    let line = match classification {
        SymptomChange::Similar => "Patient reports symptoms are about the same as the last visit",
        SymptomChange::Improvement => "Patient reports improvement of symptoms since the last visit",
        SymptomChange::Exacerbate => "Patient reports a temporary exacerbation of symptoms",
        SymptomChange::CameBack => "Patient reports symptoms came back after a period of relief",
    };
    String::from(line)
}

/// Narrate every dimension that improved this visit. Frequency improvement,
/// when present, is always mentioned.
fn what_changed_line(
    subjective: &crate::visit::SoaSubjective,
    classification: SymptomChange,
) -> String {
    if classification.is_negative() {
        return String::from("temporary flare of symptoms");
    }
    let mut parts: SmallVec<[&str; 3]> = SmallVec::new();
    if subjective.pain_changed {
        parts.push("pain level");
    }
    if subjective.adl_changed {
        parts.push("tolerance of daily activities");
    }
    if subjective.frequency_changed {
        parts.push("symptom frequency");
    }
    if parts.is_empty() {
        return String::from("overall status essentially unchanged");
    }
    let mut line = String::from("improved ");
    for (position, part) in parts.iter().enumerate() {
        if position > 0 {
            line.push_str(" and ");
        }
        line.push_str(part);
    }
    line
}

fn physical_change_line(objective: &SoaObjective) -> String {
    let mut phrases: SmallVec<[&str; 5]> = SmallVec::new();
    if objective.tightness == Trend::Improved {
        phrases.push("decreased muscle tightness");
    }
    if objective.tenderness == Trend::Improved {
        phrases.push("reduced tenderness to palpation");
    }
    if objective.spasm == Trend::Improved {
        phrases.push("reduced muscle spasm");
    }
    if objective.rom == Trend::Improved {
        phrases.push("improved range of motion");
    }
    if objective.strength == Trend::Improved {
        phrases.push("improved strength");
    }
    if phrases.is_empty() {
        if objective.any_worsened() {
            return String::from("increased guarding and muscle reactivity");
        }
        return String::from("objective findings stable");
    }
    phrases.join("; ")
}
