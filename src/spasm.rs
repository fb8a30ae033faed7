//! Spasm grading model: a pure mapping from tightness and tenderness.

use serde::{Deserialize, Serialize};

use crate::context::{BodyPart, Chronicity};
use crate::grid::round_f64_to_u8;
use crate::ladder::TightnessGrade;

const SPASM_MAX: u8 = 4;
const ELDERLY_AGE: u8 = 70;

/// Inputs to the spasm model. Only tightness and tenderness are required;
/// the modifiers are applied when their context is present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpasmInput {
    pub tightness: TightnessGrade,
    /// Palpation tenderness grade 0..=4.
    pub tenderness: u8,
    #[serde(default)]
    pub chronicity: Option<Chronicity>,
    #[serde(default)]
    pub body_part: Option<BodyPart>,
    #[serde(default)]
    pub age: Option<u8>,
}

impl SpasmInput {
    #[must_use]
    pub const fn new(tightness: TightnessGrade, tenderness: u8) -> Self {
        Self {
            tightness,
            tenderness,
            chronicity: None,
            body_part: None,
            age: None,
        }
    }
}

/// Grade muscle spasm 0..=4 from tightness and tenderness.
///
/// Base grade is the rounded mean of the tightness tier and the tenderness
/// grade. Acute presentations add a tier, small joints drop one, large
/// muscle groups never grade below tenderness while tightness is high, and
/// patients past 70 drop one.
#[must_use]
pub fn compute_spasm(input: &SpasmInput) -> u8 {
    let tenderness = input.tenderness.min(SPASM_MAX);
    let mean = (f64::from(input.tightness.tier()) + f64::from(tenderness)) / 2.0;
    let mut grade = i32::from(round_f64_to_u8(mean));

    if matches!(input.chronicity, Some(Chronicity::Acute)) {
        grade += 1;
    }
    if input.body_part.is_some_and(BodyPart::is_small_joint) {
        grade -= 1;
    }
    if input.body_part.is_some_and(BodyPart::is_large_muscle_group)
        && input.tightness >= TightnessGrade::Moderate
    {
        grade = grade.max(i32::from(tenderness));
    }
    if input.age.is_some_and(|age| age > ELDERLY_AGE) {
        grade -= 1;
    }

    u8::try_from(grade.clamp(0, i32::from(SPASM_MAX))).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severe_tightness_full_tenderness_grades_four() {
        let input = SpasmInput::new(TightnessGrade::Severe, 4);
        assert_eq!(compute_spasm(&input), 4);
    }

    #[test]
    fn mild_tightness_low_tenderness_grades_one() {
        let input = SpasmInput::new(TightnessGrade::Mild, 1);
        assert_eq!(compute_spasm(&input), 1);
    }

    #[test]
    fn acute_presentation_adds_a_tier() {
        let input = SpasmInput {
            chronicity: Some(Chronicity::Acute),
            ..SpasmInput::new(TightnessGrade::Mild, 1)
        };
        assert_eq!(compute_spasm(&input), 2);
    }

    #[test]
    fn small_joints_drop_a_tier() {
        let input = SpasmInput {
            body_part: Some(BodyPart::Wrist),
            ..SpasmInput::new(TightnessGrade::Moderate, 2)
        };
        assert_eq!(compute_spasm(&input), 1);
    }

    #[test]
    fn large_groups_hold_spasm_at_tenderness_when_tight() {
        let input = SpasmInput {
            body_part: Some(BodyPart::LowerBack),
            ..SpasmInput::new(TightnessGrade::Moderate, 4)
        };
        assert_eq!(compute_spasm(&input), 4);
    }

    #[test]
    fn elderly_patients_drop_a_tier() {
        let input = SpasmInput {
            age: Some(78),
            ..SpasmInput::new(TightnessGrade::Severe, 4)
        };
        assert_eq!(compute_spasm(&input), 3);
    }

    #[test]
    fn result_is_clamped_to_grade_range() {
        let input = SpasmInput {
            chronicity: Some(Chronicity::Acute),
            ..SpasmInput::new(TightnessGrade::Severe, 4)
        };
        assert_eq!(compute_spasm(&input), 4);

        let input = SpasmInput {
            body_part: Some(BodyPart::Foot),
            age: Some(80),
            ..SpasmInput::new(TightnessGrade::Minimal, 0)
        };
        assert_eq!(compute_spasm(&input), 0);
    }
}
