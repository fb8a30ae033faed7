//! Best-effort reverse extraction of state from rendered visit text.
//!
//! An explicitly approximate adapter for resuming a course when only the
//! previously rendered prose survives. Regex inference over free text:
//! never fails, fills gaps with conservative defaults, and its outputs
//! should be treated as low-confidence hints rather than a round-trip of
//! the original state.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::context::{BodyPart, Chronicity, Laterality};
use crate::grid::{snap_percent, snap_to_grid};
use crate::ladder::{
    frequency_for, severity_for, strength_intake_tier, tenderness_for, tightness_for,
    AssociatedSeverity, PainFrequency, StrengthGrade, TightnessGrade,
};
use crate::spasm::{compute_spasm, SpasmInput};
use crate::visit::{ObjectiveFactors, SoaChain, SymptomChange, VisitState};

fn pain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:pain|rated)\D{0,24}?(\d+(?:\.\d+)?)\s*(?:/|out of)\s*10")
            .expect("pain pattern compiles")
    })
}

fn visit_index_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)visit\s*#?\s*(\d{1,3})").expect("visit pattern compiles"))
}

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,3})\s*%").expect("percent pattern compiles"))
}

fn tightness_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(minimal|mild|moderate|severe)\s+(?:muscle\s+)?tightness")
            .expect("tightness pattern compiles")
    })
}

fn frequency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(constant|frequent|occasional|intermittent)\b")
            .expect("frequency pattern compiles")
    })
}

/// Fields recovered from rendered text. Every field is optional; the
/// `fields_found` count is the only confidence signal offered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractedVisit {
    pub visit_index: Option<u16>,
    pub pain: Option<f64>,
    pub symptom_percent: Option<f64>,
    pub tightness: Option<TightnessGrade>,
    pub frequency: Option<PainFrequency>,
    pub fields_found: u8,
}

/// Context hints recovered from rendered text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractedContext {
    pub body_part: Option<BodyPart>,
    pub laterality: Option<Laterality>,
    pub chronicity: Option<Chronicity>,
    pub pain: Option<f64>,
}

/// Pull an approximate visit state out of rendered prose. Never fails.
#[must_use]
pub fn extract_visit(text: &str) -> ExtractedVisit {
    let mut found = 0u8;

    let visit_index = visit_index_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .filter(|index| *index >= 1);
    let pain = pain_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| (0.0..=10.0).contains(value));
    let symptom_percent = percent_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| (0.0..=100.0).contains(value));
    let tightness = tightness_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| match m.as_str().to_ascii_lowercase().as_str() {
            "severe" => TightnessGrade::Severe,
            "moderate" => TightnessGrade::Moderate,
            "mild" => TightnessGrade::Mild,
            _ => TightnessGrade::Minimal,
        });
    let frequency = frequency_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| match m.as_str().to_ascii_lowercase().as_str() {
            "constant" => PainFrequency::Constant,
            "frequent" => PainFrequency::Frequent,
            "occasional" => PainFrequency::Occasional,
            _ => PainFrequency::Intermittent,
        });

    for present in [
        visit_index.is_some(),
        pain.is_some(),
        symptom_percent.is_some(),
        tightness.is_some(),
        frequency.is_some(),
    ] {
        if present {
            found += 1;
        }
    }

    ExtractedVisit {
        visit_index,
        pain,
        symptom_percent,
        tightness,
        frequency,
        fields_found: found,
    }
}

/// Pull approximate context hints out of rendered prose. Never fails.
#[must_use]
pub fn extract_context(text: &str) -> ExtractedContext {
    let lowered = text.to_ascii_lowercase();
    let body_part = [
        ("cervical", BodyPart::Neck),
        ("neck", BodyPart::Neck),
        ("shoulder", BodyPart::Shoulder),
        ("upper back", BodyPart::UpperBack),
        ("lower back", BodyPart::LowerBack),
        ("lumbar", BodyPart::LowerBack),
        ("hip", BodyPart::Hip),
        ("knee", BodyPart::Knee),
        ("elbow", BodyPart::Elbow),
        ("wrist", BodyPart::Wrist),
        ("ankle", BodyPart::Ankle),
        ("hand", BodyPart::Hand),
        ("foot", BodyPart::Foot),
    ]
    .into_iter()
    .find(|(needle, _)| lowered.contains(needle))
    .map(|(_, part)| part);

    let laterality = if lowered.contains("bilateral") {
        Some(Laterality::Bilateral)
    } else if lowered.contains("left") {
        Some(Laterality::Left)
    } else if lowered.contains("right") {
        Some(Laterality::Right)
    } else {
        None
    };

    let chronicity = if lowered.contains("sub-acute") || lowered.contains("subacute") {
        Some(Chronicity::SubAcute)
    } else if lowered.contains("acute") {
        Some(Chronicity::Acute)
    } else if lowered.contains("chronic") {
        Some(Chronicity::Chronic)
    } else {
        None
    };

    ExtractedContext {
        body_part,
        laterality,
        chronicity,
        pain: extract_visit(text).pain,
    }
}

impl ExtractedVisit {
    /// Build a conservative initial state for course resumption.
    ///
    /// Missing fields default to a mid-course, moderate presentation; the
    /// result is a plausible anchor for `initial_state`, not a faithful
    /// reconstruction.
    #[must_use]
    pub fn into_initial_state(self) -> VisitState {
        let pain = self.pain.unwrap_or(5.0);
        // Symptom percentage is the least noisy progress proxy available.
        let progress = self
            .symptom_percent
            .map_or(0.3, |pct| ((90.0 - pct) / 85.0).clamp(0.0, 1.0));
        let tightness = self.tightness.unwrap_or_else(|| tightness_for(pain, false));
        let tenderness = tenderness_for(pain);
        let frequency = self.frequency.unwrap_or_else(|| frequency_for(pain, progress));
        let snapped = snap_to_grid(pain, 0.5);

        VisitState {
            visit_index: self.visit_index.unwrap_or(1),
            progress,
            pain_scale_current: pain,
            severity_level: severity_for(snapped.value),
            pain_snapped: snapped,
            tightness_grading: tightness,
            tenderness_grading: tenderness,
            spasm_grading: compute_spasm(&SpasmInput::new(tightness, tenderness)),
            strength_grade: StrengthGrade::from_tier(strength_intake_tier(pain)),
            pain_frequency: frequency,
            symptom_scale: snap_percent(self.symptom_percent.unwrap_or(60.0)),
            associated_symptom: AssociatedSeverity::Moderate,
            symptom_change: SymptomChange::Similar,
            reason: String::new(),
            reason_connector: String::new(),
            soa_chain: SoaChain::default(),
            objective_factors: ObjectiveFactors::default(),
            side_progress: None,
            tongue_pulse: crate::context::TonguePulse::default(),
        }
    }
}
