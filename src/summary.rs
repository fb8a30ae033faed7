//! End-of-course aggregates derived from an emitted visit sequence.

use serde::{Deserialize, Serialize};

use crate::goals::ResolvedGoals;
use crate::visit::VisitState;

/// Aggregate view of a finished course. Derived purely from the emitted
/// sequence; computing it never mutates or regenerates anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CourseSummary {
    pub visit_count: u16,
    pub initial_pain: f64,
    pub final_pain: f64,
    pub pain_drop: f64,
    /// Tightness tiers improved from first to last visit.
    pub tightness_tiers_improved: u8,
    /// Strength tiers gained from first to last visit.
    pub strength_tiers_gained: u8,
    /// Frequency tiers improved from first to last visit.
    pub frequency_tiers_improved: u8,
    pub negative_events: u16,
    /// Visits classified as "similar".
    pub plateau_visits: u16,
    pub long_term_goal_met: bool,
}

impl CourseSummary {
    /// Summarize a course against its resolved goals. An empty course
    /// yields the default (all-zero) summary.
    #[must_use]
    pub fn from_course(course: &[VisitState], goals: &ResolvedGoals) -> Self {
        let (Some(first), Some(last)) = (course.first(), course.last()) else {
            return Self::default();
        };

        let negative_events = course
            .iter()
            .filter(|visit| visit.symptom_change.is_negative())
            .count();
        let plateau_visits = course
            .iter()
            .filter(|visit| visit.symptom_change == crate::visit::SymptomChange::Similar)
            .count();

        Self {
            visit_count: u16::try_from(course.len()).unwrap_or(u16::MAX),
            initial_pain: first.pain_scale_current,
            final_pain: last.pain_scale_current,
            pain_drop: first.pain_scale_current - last.pain_scale_current,
            tightness_tiers_improved: first
                .tightness_grading
                .tier()
                .saturating_sub(last.tightness_grading.tier()),
            strength_tiers_gained: last
                .strength_grade
                .tier()
                .saturating_sub(first.strength_grade.tier()),
            frequency_tiers_improved: last
                .pain_frequency
                .tier()
                .saturating_sub(first.pain_frequency.tier()),
            negative_events: u16::try_from(negative_events).unwrap_or(u16::MAX),
            plateau_visits: u16::try_from(plateau_visits).unwrap_or(u16::MAX),
            long_term_goal_met: last.pain_scale_current <= goals.long_term_pain + 0.5,
        }
    }
}
