//! Goal resolution: pain targets and the chronic progress dampener.

use serde::{Deserialize, Serialize};

use crate::context::{Chronicity, GenerationContext};
use crate::grid::snap_to_grid;

/// Recovery fraction ratio for the fallback long-term target.
const FALLBACK_RATIO: f64 = 0.25;
/// Chronic presentations recover less completely.
const FALLBACK_RATIO_CHRONIC: f64 = 0.55;
/// Progress-curve shaping multiplier for chronic presentations.
const CHRONIC_DAMPENER: f64 = 0.65;
/// Fallback targets never drop below this floor.
const TARGET_FLOOR: f64 = 2.0;

/// Resolved course targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGoals {
    /// Pain target expected around the course midpoint.
    pub short_term_pain: f64,
    /// Pain target expected by the final visit.
    pub long_term_pain: f64,
    /// Progress-curve multiplier; 1.0 means undampened.
    pub chronic_dampener: f64,
}

impl ResolvedGoals {
    /// Whether the progress curve is dampened at all.
    #[must_use]
    pub fn is_dampened(&self) -> bool {
        self.chronic_dampener < 1.0
    }
}

/// Derive short-term and long-term pain targets for a course.
///
/// Explicit targets from a prior initial evaluation win. Otherwise the
/// long-term fallback is `ceil(max(2, pain * ratio))` with the ratio
/// dampened for chronic patients unless `disable_chronic_caps` is set,
/// and the short-term target is the grid-snapped midpoint. Targets never
/// exceed the presenting pain.
#[must_use]
pub fn resolve_goals(ctx: &GenerationContext) -> ResolvedGoals {
    let dampened = matches!(ctx.chronicity, Chronicity::Chronic) && !ctx.disable_chronic_caps;
    let ratio = if dampened {
        FALLBACK_RATIO_CHRONIC
    } else {
        FALLBACK_RATIO
    };

    let explicit_long = ctx.prior_eval.as_ref().and_then(|goals| goals.long_term_pain);
    let explicit_short = ctx.prior_eval.as_ref().and_then(|goals| goals.short_term_pain);

    let long_term = explicit_long
        .unwrap_or_else(|| (ctx.pain_current * ratio).max(TARGET_FLOOR).ceil())
        .min(ctx.pain_current);
    let short_term = explicit_short
        .unwrap_or_else(|| snap_to_grid(f64::midpoint(ctx.pain_current, long_term), 0.5).value)
        .min(ctx.pain_current);

    ResolvedGoals {
        short_term_pain: short_term,
        long_term_pain: long_term,
        chronic_dampener: if dampened { CHRONIC_DAMPENER } else { 1.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BodyPart, GoalReference, Laterality};

    fn context(chronicity: Chronicity, pain: f64) -> GenerationContext {
        GenerationContext::new(BodyPart::Shoulder, Laterality::Right, chronicity, pain)
    }

    #[test]
    fn chronic_fallback_is_dampened() {
        let goals = resolve_goals(&context(Chronicity::Chronic, 8.0));
        assert!((goals.long_term_pain - 5.0).abs() < f64::EPSILON);
        assert!((goals.short_term_pain - 6.5).abs() < f64::EPSILON);
        assert!(goals.is_dampened());
    }

    #[test]
    fn sub_acute_fallback_recovers_further() {
        let goals = resolve_goals(&context(Chronicity::SubAcute, 8.0));
        assert!((goals.long_term_pain - 2.0).abs() < f64::EPSILON);
        assert!(!goals.is_dampened());
    }

    #[test]
    fn disabled_caps_drop_the_dampener() {
        let mut ctx = context(Chronicity::Chronic, 8.0);
        ctx.disable_chronic_caps = true;
        let goals = resolve_goals(&ctx);
        assert!((goals.long_term_pain - 2.0).abs() < f64::EPSILON);
        assert!(!goals.is_dampened());
    }

    #[test]
    fn explicit_goals_win_over_fallbacks() {
        let mut ctx = context(Chronicity::Chronic, 8.0);
        ctx.prior_eval = Some(GoalReference {
            short_term_pain: Some(6.0),
            long_term_pain: Some(3.0),
        });
        let goals = resolve_goals(&ctx);
        assert!((goals.long_term_pain - 3.0).abs() < f64::EPSILON);
        assert!((goals.short_term_pain - 6.0).abs() < f64::EPSILON);
        // Dampener is chronicity-driven even with explicit targets.
        assert!(goals.is_dampened());
    }

    #[test]
    fn targets_never_exceed_presenting_pain() {
        let goals = resolve_goals(&context(Chronicity::Chronic, 2.0));
        assert!(goals.long_term_pain <= 2.0);
        assert!(goals.short_term_pain <= 2.0);
    }
}
