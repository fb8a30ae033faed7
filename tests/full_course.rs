//! End-to-end scenarios over complete generated courses.

use coursegen::{
    BodyPart, Chronicity, CourseSummary, GenerationContext, Laterality, SequenceOptions,
    StrengthGrade, generate_sequence, resolve_goals,
};

fn chronic_shoulder() -> GenerationContext {
    GenerationContext::new(BodyPart::Shoulder, Laterality::Right, Chronicity::Chronic, 8.0)
}

#[test]
fn twenty_visit_chronic_shoulder_course() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ctx = chronic_shoulder();
    let course = generate_sequence(&ctx, &SequenceOptions::new(20, 42)).unwrap();

    assert_eq!(course.len(), 20);
    for (offset, visit) in course.iter().enumerate() {
        assert_eq!(usize::from(visit.visit_index), offset + 1);
        assert!(visit.pain_scale_current.is_finite());
        assert!((0.0..=10.0).contains(&visit.pain_scale_current));
        assert!((0.0..=1.0).contains(&visit.progress));
        assert!(visit.tenderness_grading <= 4);
        assert!(visit.spasm_grading <= 4);
        assert!(!visit.reason.is_empty());
        assert!(!visit.soa_chain.assessment.present.is_empty());
        assert_eq!(visit.tongue_pulse, ctx.tongue_pulse);
    }

    // Mid-course must already sit below intake, and the tail below mid.
    let mid_pain = course[11].pain_scale_current;
    let final_pain = course[19].pain_scale_current;
    assert!(mid_pain <= course[0].pain_scale_current);
    assert!(final_pain <= mid_pain + 0.01);
}

#[test]
fn chronic_course_converges_above_the_dampened_floor() {
    let ctx = chronic_shoulder();
    let goals = resolve_goals(&ctx);
    let course = generate_sequence(&ctx, &SequenceOptions::new(20, 42)).unwrap();
    let final_pain = course.last().unwrap().pain_scale_current;

    assert!((goals.long_term_pain - 5.0).abs() < f64::EPSILON);
    assert!(final_pain >= 4.0, "chronic course overshot its floor: {final_pain:.2}");
    assert!(final_pain <= goals.long_term_pain + 0.5);
}

#[test]
fn disabling_chronic_caps_reaches_strictly_lower_pain() {
    let capped_ctx = chronic_shoulder();
    let mut uncapped_ctx = chronic_shoulder();
    uncapped_ctx.disable_chronic_caps = true;

    let opts = SequenceOptions::new(20, 42);
    let capped = generate_sequence(&capped_ctx, &opts).unwrap();
    let uncapped = generate_sequence(&uncapped_ctx, &opts).unwrap();

    let capped_final = capped.last().unwrap().pain_scale_current;
    let uncapped_final = uncapped.last().unwrap().pain_scale_current;
    assert!(
        uncapped_final < capped_final,
        "uncapped {uncapped_final:.2} should undercut capped {capped_final:.2}"
    );
    assert!(uncapped_final <= 2.5);
}

#[test]
fn single_visit_course_is_complete_and_consistent() {
    let ctx = chronic_shoulder();
    let course = generate_sequence(&ctx, &SequenceOptions::new(1, 7)).unwrap();

    assert_eq!(course.len(), 1);
    let only = &course[0];
    assert_eq!(only.visit_index, 1);
    assert!((only.progress - 1.0).abs() < 1e-9);
    assert!(!only.reason.is_empty());
    assert!(!only.symptom_change.is_negative());
}

#[test]
fn bilateral_courses_carry_divergent_side_progress() {
    let mut ctx = chronic_shoulder();
    ctx.laterality = Laterality::Bilateral;
    let course = generate_sequence(&ctx, &SequenceOptions::new(12, 42)).unwrap();

    let mut diverged = false;
    for visit in &course {
        let sides = visit.side_progress.expect("bilateral visits carry sides");
        assert!(sides.worse() <= sides.left.max(sides.right) + 1e-9);
        if (sides.left - sides.right).abs() > 1e-6 {
            diverged = true;
        }
    }
    assert!(diverged, "bilateral sides never diverged");
}

#[test]
fn summary_of_a_long_course_shows_broad_recovery() {
    let ctx = chronic_shoulder();
    let goals = resolve_goals(&ctx);
    let course = generate_sequence(&ctx, &SequenceOptions::new(20, 42)).unwrap();
    let summary = CourseSummary::from_course(&course, &goals);

    assert_eq!(summary.visit_count, 20);
    assert!(summary.pain_drop >= 2.0);
    assert!(summary.long_term_goal_met);
    assert!(summary.strength_tiers_gained >= 3);
    assert_eq!(course.last().unwrap().strength_grade, StrengthGrade::Normal);
}

#[test]
fn unilateral_courses_omit_side_progress() {
    let ctx = chronic_shoulder();
    let course = generate_sequence(&ctx, &SequenceOptions::new(5, 3)).unwrap();
    assert!(course.iter().all(|visit| visit.side_progress.is_none()));
}
