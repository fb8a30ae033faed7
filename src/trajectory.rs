//! Core visit trajectory generator.
//!
//! A course is a pure fold over visit index: each step advances a monotone
//! `progress` scalar along a goal-seeking S-curve, derives pain from the
//! interpolated position plus bounded noise, and maps the ordinal ladders
//! off pain and progress under monotonicity, ceiling/floor, and
//! plateau-breaking rules. No visit can mutate an earlier one.

use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{GenerationContext, Laterality, SequenceError, SequenceOptions};
use crate::goals::{ResolvedGoals, resolve_goals};
use crate::grid::{Snapped, snap_percent, snap_to_grid, u16_to_f64};
use crate::ladder::{
    associated_for, frequency_for, severity_for, strength_for, strength_intake_tier,
    tenderness_for, tightness_for, AssociatedSeverity, PainFrequency, StrengthGrade,
    TightnessGrade,
};
use crate::narrative::NarrativeEngine;
use crate::rng::StreamBundle;
use crate::spasm::{compute_spasm, SpasmInput};
use crate::visit::{ObjectiveFactors, SideProgress, SoaChain, SymptomChange, VisitState};

/// Pain display grid step.
const PAIN_GRID_STEP: f64 = 0.5;
/// Pain may land this far below the long-term target before the floor.
const TARGET_UNDERSHOOT: f64 = 0.25;
/// Smallest pain bump a negative event produces.
const NEGATIVE_BUMP_MIN: f64 = 0.05;
/// Symptom percentage at intake.
const SYMPTOM_SCALE_INTAKE: f64 = 90.0;
/// Symptom percentage floor at full recovery.
const SYMPTOM_SCALE_FLOOR: f64 = 5.0;
/// Magnitude of the per-visit progress jitter.
const PROGRESS_JITTER: f64 = 0.01;
/// Fraction of the progress span at which the short-term target anchors.
const SHORT_TERM_POSITION: f64 = 0.5;
/// Largest per-visit divergence between bilateral sides.
const SIDE_LAG_MAX: f64 = 0.12;
/// Chance a visit past the release point relaxes the ordinal floor.
const RELAX_CHANCE: f64 = 0.35;

/// Tunable generation parameters. Defaults reproduce the documented
/// contract; `validate` rejects configurations that would break it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryConfig {
    /// Bounded pain noise cap per visit.
    #[serde(default = "TrajectoryConfig::default_noise_cap")]
    pub noise_cap: f64,
    /// Consecutive identical pain labels tolerated before a forced step.
    #[serde(default = "TrajectoryConfig::default_plateau_tolerance")]
    pub plateau_tolerance: u8,
    /// Plateau tolerance under a dampened (chronic) curve.
    #[serde(default = "TrajectoryConfig::default_plateau_tolerance_chronic")]
    pub plateau_tolerance_chronic: u8,
    /// Per-visit probability of a negative event when enabled.
    #[serde(default = "TrajectoryConfig::default_negative_event_prob")]
    pub negative_event_prob: f64,
    /// Hard ceiling on the negative-event rate across a course.
    #[serde(default = "TrajectoryConfig::default_negative_event_cap")]
    pub negative_event_cap: f64,
    /// Cumulative progress past which ordinal floors may relax.
    #[serde(default = "TrajectoryConfig::default_soft_bound_release")]
    pub soft_bound_release: f64,
    /// Most core dimensions allowed to step on a single visit.
    #[serde(default = "TrajectoryConfig::default_max_dimension_steps")]
    pub max_dimension_steps: u8,
}

impl TrajectoryConfig {
    const fn default_noise_cap() -> f64 {
        0.15
    }

    const fn default_plateau_tolerance() -> u8 {
        2
    }

    const fn default_plateau_tolerance_chronic() -> u8 {
        3
    }

    const fn default_negative_event_prob() -> f64 {
        0.08
    }

    const fn default_negative_event_cap() -> f64 {
        0.10
    }

    const fn default_soft_bound_release() -> f64 {
        0.6
    }

    const fn default_max_dimension_steps() -> u8 {
        3
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `TrajectoryConfigError` when any field violates the
    /// documented bounds.
    pub fn validate(&self) -> Result<(), TrajectoryConfigError> {
        if !(0.01..=0.15).contains(&self.noise_cap) {
            return Err(TrajectoryConfigError::RangeViolation {
                field: "noise_cap",
                min: 0.01,
                max: 0.15,
                value: self.noise_cap,
            });
        }
        if !(0.0..=0.5).contains(&self.negative_event_prob) {
            return Err(TrajectoryConfigError::RangeViolation {
                field: "negative_event_prob",
                min: 0.0,
                max: 0.5,
                value: self.negative_event_prob,
            });
        }
        if !(0.0..=0.10).contains(&self.negative_event_cap) {
            return Err(TrajectoryConfigError::RangeViolation {
                field: "negative_event_cap",
                min: 0.0,
                max: 0.10,
                value: self.negative_event_cap,
            });
        }
        if !(0.3..=1.0).contains(&self.soft_bound_release) {
            return Err(TrajectoryConfigError::RangeViolation {
                field: "soft_bound_release",
                min: 0.3,
                max: 1.0,
                value: self.soft_bound_release,
            });
        }
        if self.plateau_tolerance == 0 || self.plateau_tolerance_chronic == 0 {
            return Err(TrajectoryConfigError::ZeroTolerance);
        }
        if self.max_dimension_steps == 0 {
            return Err(TrajectoryConfigError::ZeroDimensionCap);
        }
        Ok(())
    }
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            noise_cap: Self::default_noise_cap(),
            plateau_tolerance: Self::default_plateau_tolerance(),
            plateau_tolerance_chronic: Self::default_plateau_tolerance_chronic(),
            negative_event_prob: Self::default_negative_event_prob(),
            negative_event_cap: Self::default_negative_event_cap(),
            soft_bound_release: Self::default_soft_bound_release(),
            max_dimension_steps: Self::default_max_dimension_steps(),
        }
    }
}

/// Generation-parameter validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryConfigError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("plateau tolerances must be at least 1")]
    ZeroTolerance,
    #[error("dimension step cap must be at least 1")]
    ZeroDimensionCap,
}

/// Generate a full course in one pass with default parameters.
///
/// # Errors
///
/// Returns `SequenceError` for invalid context or options; missing optional
/// data (goals, initial state) is resolved via documented fallbacks instead.
pub fn generate_sequence(
    ctx: &GenerationContext,
    opts: &SequenceOptions,
) -> Result<Vec<VisitState>, SequenceError> {
    generate_sequence_with(ctx, opts, &TrajectoryConfig::default())
}

/// Generate a full course with explicit parameters.
///
/// # Errors
///
/// Returns `SequenceError` for invalid context or options.
pub fn generate_sequence_with(
    ctx: &GenerationContext,
    opts: &SequenceOptions,
    cfg: &TrajectoryConfig,
) -> Result<Vec<VisitState>, SequenceError> {
    let mut walker = CourseWalker::new(ctx, opts, cfg)?;
    let mut course = Vec::with_capacity(usize::from(opts.tx_count));
    while let Some(visit) = walker.next_visit() {
        course.push(visit);
    }
    Ok(course)
}

/// Stateful fold over visit indices for one course.
///
/// Owns the random streams and the narrative engine; emitted states are
/// immutable and only the running "previous visit" is kept for deltas.
#[derive(Debug)]
pub(crate) struct CourseWalker {
    ctx: GenerationContext,
    cfg: TrajectoryConfig,
    goals: ResolvedGoals,
    streams: StreamBundle,
    narrative: NarrativeEngine,
    tx_count: u16,
    start_index: u16,
    emitted: u16,
    prev: Option<VisitState>,
    entry_progress: f64,
    start_pain: f64,
    baseline_pain: f64,
    pain_floor: f64,
    strength_intake: u8,
    tightness_intake: u8,
    last_pain_label: String,
    plateau_run: u8,
    negative_count: u16,
    max_negatives: u16,
    tightness_bounce_pre: Option<u8>,
    worse_side_is_left: bool,
}

impl CourseWalker {
    pub(crate) fn new(
        ctx: &GenerationContext,
        opts: &SequenceOptions,
        cfg: &TrajectoryConfig,
    ) -> Result<Self, SequenceError> {
        ctx.validate()?;
        opts.validate()?;

        let goals = resolve_goals(ctx);
        let streams = StreamBundle::from_user_seed(opts.seed);
        let prev = opts.initial_state.clone();
        let entry_progress = prev.as_ref().map_or(0.0, |state| state.progress);
        let start_pain = prev
            .as_ref()
            .map_or(ctx.pain_current, |state| state.pain_scale_current);
        let pain_floor = (goals.long_term_pain - TARGET_UNDERSHOOT).max(0.0);
        let last_pain_label = prev
            .as_ref()
            .map_or_else(String::new, |state| state.pain_snapped.label.clone());
        let max_negatives = negative_budget(cfg.negative_event_cap, opts.tx_count);
        let worse_side_is_left = matches!(ctx.laterality, Laterality::Bilateral)
            && streams.side().gen_range(0.0..1.0) < 0.5;

        debug!(
            "course start: visits={} seed={} long_target={:.1} dampener={:.2}",
            opts.tx_count, opts.seed, goals.long_term_pain, goals.chronic_dampener
        );

        Ok(Self {
            ctx: ctx.clone(),
            cfg: *cfg,
            goals,
            streams,
            narrative: NarrativeEngine::new(),
            tx_count: opts.tx_count,
            start_index: opts.start_visit_index.unwrap_or(1),
            emitted: 0,
            prev,
            entry_progress,
            start_pain,
            baseline_pain: start_pain,
            pain_floor,
            strength_intake: strength_intake_tier(start_pain),
            tightness_intake: tightness_for(start_pain, false).tier(),
            last_pain_label,
            plateau_run: 0,
            negative_count: 0,
            max_negatives,
            tightness_bounce_pre: None,
            worse_side_is_left,
        })
    }

    pub(crate) const fn goals(&self) -> &ResolvedGoals {
        &self.goals
    }

    pub(crate) const fn emitted(&self) -> u16 {
        self.emitted
    }

    pub(crate) fn total_draws(&self) -> u64 {
        self.streams.total_draws()
    }

    /// Produce the next visit, or `None` once the course is complete.
    pub(crate) fn next_visit(&mut self) -> Option<VisitState> {
        if self.emitted >= self.tx_count {
            return None;
        }
        let step = self.emitted;
        let visit_index = self.start_index.saturating_add(step);

        let progress = self.advance_progress(step);
        let (pain, negative_event) = self.advance_pain(progress, visit_index);
        let snapped = self.apply_plateau_breaker(pain, negative_event);
        let pain = snapped.value.min(pain).max(0.0);

        let mut visit = self.derive_indicators(visit_index, progress, pain, negative_event);
        visit.severity_level = severity_for(snapped.value);
        visit.pain_snapped = snapped;
        visit.objective_factors = self.draw_factors();
        visit.side_progress = self.advance_sides(progress);

        {
            let mut narrative_rng = self.streams.narrative();
            self.narrative.annotate(
                &mut visit,
                self.prev.as_ref(),
                &self.ctx,
                self.baseline_pain,
                negative_event,
                &mut *narrative_rng,
            );
        }

        trace!(
            "visit {}: progress={:.3} pain={:.2} change={:?}",
            visit.visit_index, visit.progress, visit.pain_scale_current, visit.symptom_change
        );

        self.emitted += 1;
        self.prev = Some(visit.clone());
        Some(visit)
    }

    /// Goal-seeking S-curve step, dampened for chronic presentations and
    /// monotone by construction.
    fn advance_progress(&mut self, step: u16) -> f64 {
        let frac = u16_to_f64(step + 1) / u16_to_f64(self.tx_count);
        let shaped = smoothstep(frac);
        let gamma = 1.0 / self.goals.chronic_dampener;
        let base = self.entry_progress + (1.0 - self.entry_progress) * shaped.powf(gamma);

        let jitter = self.streams.noise().gen_range(-PROGRESS_JITTER..PROGRESS_JITTER);
        let target = if step + 1 == self.tx_count {
            base
        } else {
            base + jitter
        };
        let prev_progress = self.prev.as_ref().map_or(self.entry_progress, |state| state.progress);
        target.clamp(prev_progress, 1.0)
    }

    /// Interpolated pain plus bounded noise, clamped monotone unless this
    /// visit is a gated negative event.
    ///
    /// The descent is piecewise: start pain to the short-term target over
    /// the first half of the progress span, then short to long over the
    /// second, so the short-term goal is approximately met mid-course.
    fn advance_pain(&mut self, progress: f64, visit_index: u16) -> (f64, bool) {
        // Resumed courses interpolate over the remaining progress span.
        let span = 1.0 - self.entry_progress;
        let position = if span > f64::EPSILON {
            ((progress - self.entry_progress) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let long = self.goals.long_term_pain;
        // A resumed course may already sit below the short-term target.
        let short = self
            .goals
            .short_term_pain
            .min(self.start_pain)
            .max(long.min(self.start_pain));
        let raw = if position <= SHORT_TERM_POSITION {
            let local = position / SHORT_TERM_POSITION;
            self.start_pain + (short - self.start_pain) * local
        } else {
            let local = (position - SHORT_TERM_POSITION) / (1.0 - SHORT_TERM_POSITION);
            short + (long - short) * local
        };
        let noise = self
            .streams
            .noise()
            .gen_range(-self.cfg.noise_cap..self.cfg.noise_cap);
        let prev_pain = self.prev.as_ref().map(|state| state.pain_scale_current);

        let negative_eligible = self.ctx.allow_negative_events
            && visit_index > 1
            && self.prev.is_some()
            && self.negative_count < self.max_negatives;
        if negative_eligible {
            let roll: f64 = self.streams.event().gen_range(0.0..1.0);
            if roll < self.cfg.negative_event_prob {
                let span = (self.cfg.noise_cap - NEGATIVE_BUMP_MIN).max(0.0);
                let bump: f64 = NEGATIVE_BUMP_MIN + self.streams.event().gen_range(0.0..1.0) * span;
                let base = prev_pain.unwrap_or(raw);
                self.negative_count += 1;
                debug!("negative event at visit {visit_index} (bump {bump:.2})");
                return ((base + bump).min(10.0), true);
            }
        }

        let mut pain = raw + noise;
        if let Some(prev_pain) = prev_pain {
            pain = pain.min(prev_pain);
        }
        (pain.clamp(self.pain_floor, 10.0), false)
    }

    /// Force a small decrement when the display label has sat still too
    /// long. Dampened curves tolerate a longer plateau.
    fn apply_plateau_breaker(&mut self, pain: f64, negative_event: bool) -> Snapped {
        let mut snapped = snap_to_grid(pain, PAIN_GRID_STEP);
        let tolerance = if self.goals.is_dampened() {
            self.cfg.plateau_tolerance_chronic
        } else {
            self.cfg.plateau_tolerance
        };

        if snapped.label == self.last_pain_label {
            self.plateau_run += 1;
        } else {
            self.plateau_run = 0;
        }

        if self.plateau_run >= tolerance && !negative_event {
            let forced = (snapped.value - PAIN_GRID_STEP).max(self.pain_floor);
            snapped = snap_to_grid(forced, PAIN_GRID_STEP);
            self.plateau_run = 0;
        }
        self.last_pain_label.clone_from(&snapped.label);
        snapped
    }

    /// Map pain and progress onto the ordinal ladders under monotonicity,
    /// bounce, and simultaneous-step rules.
    fn derive_indicators(
        &mut self,
        visit_index: u16,
        progress: f64,
        pain: f64,
        negative_event: bool,
    ) -> VisitState {
        let relaxed = progress > self.cfg.soft_bound_release
            && self.streams.event().gen_range(0.0..1.0) < RELAX_CHANCE;

        let tight_target = tightness_for(pain, relaxed).tier();
        let tender_target = tenderness_for(pain);
        let freq_target = frequency_for(pain, progress).tier();
        let strength_target = strength_for(self.strength_intake, progress).tier();
        let assoc_target = associated_for(self.ctx.associated_intake, progress).tier();

        let is_final = self.emitted + 1 == self.tx_count;

        let (tightness, tenderness, frequency, strength, associated) = match &self.prev {
            None => (
                tight_target,
                tender_target,
                freq_target,
                strength_target,
                assoc_target,
            ),
            Some(prev) => {
                let prev_tight = prev.tightness_grading.tier();
                let prev_tender = prev.tenderness_grading;
                let prev_freq = prev.pain_frequency.tier();
                let prev_strength = prev.strength_grade.tier();
                let prev_assoc = prev.associated_symptom.tier();

                let mut tightness = if negative_event {
                    // Bounce one tier, never past the intake severity.
                    let bounced = prev_tight.saturating_add(1).min(self.tightness_intake).min(3);
                    if bounced > prev_tight {
                        self.tightness_bounce_pre = Some(prev_tight);
                    }
                    bounced
                } else {
                    step_down(prev_tight, tight_target, is_final)
                };
                if !negative_event && let Some(pre) = self.tightness_bounce_pre.take() {
                    tightness = tightness.min(pre);
                }

                let tenderness = if negative_event {
                    prev_tender
                } else {
                    step_down(prev_tender, tender_target, is_final)
                };
                let frequency = if negative_event {
                    prev_freq
                } else {
                    step_up(prev_freq, freq_target, is_final)
                };
                let strength = if negative_event {
                    prev_strength
                } else {
                    step_up(prev_strength, strength_target, is_final)
                };
                let associated = if negative_event {
                    prev_assoc
                } else {
                    step_down(prev_assoc, assoc_target, is_final)
                };

                self.cap_simultaneous_steps(
                    prev, tightness, tenderness, frequency, strength, associated, is_final,
                )
            }
        };

        let spasm_raw = compute_spasm(&SpasmInput {
            tightness: TightnessGrade::from_tier(tightness),
            tenderness,
            chronicity: Some(self.ctx.chronicity),
            body_part: Some(self.ctx.body_part),
            age: self.ctx.age,
        });
        let spasm = match &self.prev {
            None => spasm_raw,
            Some(prev) => {
                let ceiling = if negative_event {
                    prev.spasm_grading.saturating_add(1).min(4)
                } else {
                    prev.spasm_grading
                };
                spasm_raw.min(ceiling)
            }
        };

        let scale_value = (1.0 - progress) * (SYMPTOM_SCALE_INTAKE - SYMPTOM_SCALE_FLOOR)
            + SYMPTOM_SCALE_FLOOR;

        VisitState {
            visit_index,
            progress,
            pain_scale_current: pain,
            pain_snapped: snap_to_grid(pain, PAIN_GRID_STEP),
            severity_level: severity_for(pain),
            tightness_grading: TightnessGrade::from_tier(tightness),
            tenderness_grading: tenderness,
            spasm_grading: spasm,
            strength_grade: StrengthGrade::from_tier(strength),
            pain_frequency: PainFrequency::from_tier(frequency),
            symptom_scale: snap_percent(scale_value),
            associated_symptom: AssociatedSeverity::from_tier(associated),
            symptom_change: SymptomChange::Similar,
            reason: String::new(),
            reason_connector: String::new(),
            soa_chain: SoaChain::default(),
            objective_factors: ObjectiveFactors::default(),
            side_progress: None,
            tongue_pulse: self.ctx.tongue_pulse.clone(),
        }
    }

    /// Keep at most `max_dimension_steps` core dimensions moving on one
    /// visit; excess movement is deferred to later visits. The final visit
    /// is exempt: there is nowhere left to defer to, and full convergence
    /// takes precedence over the cap.
    #[allow(clippy::too_many_arguments)]
    fn cap_simultaneous_steps(
        &self,
        prev: &VisitState,
        tightness: u8,
        tenderness: u8,
        frequency: u8,
        strength: u8,
        associated: u8,
        is_final: bool,
    ) -> (u8, u8, u8, u8, u8) {
        if is_final {
            return (tightness, tenderness, frequency, strength, associated);
        }
        let mut tightness = tightness;
        let mut tenderness = tenderness;
        let mut frequency = frequency;
        let mut strength = strength;
        let mut associated = associated;

        let mut stepped = u8::from(tightness != prev.tightness_grading.tier())
            + u8::from(tenderness != prev.tenderness_grading)
            + u8::from(frequency != prev.pain_frequency.tier())
            + u8::from(strength != prev.strength_grade.tier())
            + u8::from(associated != prev.associated_symptom.tier());

        // Defer in reverse priority: associated symptom first, strength,
        // then tenderness. Pain-coupled tightness and the frequency ladder
        // keep their movement.
        if stepped > self.cfg.max_dimension_steps && associated != prev.associated_symptom.tier() {
            associated = prev.associated_symptom.tier();
            stepped -= 1;
        }
        if stepped > self.cfg.max_dimension_steps && strength != prev.strength_grade.tier() {
            strength = prev.strength_grade.tier();
            stepped -= 1;
        }
        if stepped > self.cfg.max_dimension_steps && tenderness != prev.tenderness_grading {
            tenderness = prev.tenderness_grading;
        }

        (tightness, tenderness, frequency, strength, associated)
    }

    /// Per-visit noise inputs; narrative seasoning only.
    fn draw_factors(&mut self) -> ObjectiveFactors {
        let mut rng = self.streams.factors();
        let session_gap_days = if self.prev.is_some() {
            rng.gen_range(1..=7)
        } else {
            0
        };
        ObjectiveFactors {
            session_gap_days,
            sleep: rng.gen_range(0.0..1.0),
            workload: rng.gen_range(0.0..1.0),
            weather: rng.gen_range(0.0..1.0),
            adherence: rng.gen_range(0.0..1.0),
        }
    }

    /// Bilateral side scalars: the worse side tracks the aggregate
    /// progress, the better side leads it by an independent margin.
    fn advance_sides(&mut self, progress: f64) -> Option<SideProgress> {
        if !matches!(self.ctx.laterality, Laterality::Bilateral) {
            return None;
        }
        let lag: f64 = self.streams.side().gen_range(0.0..SIDE_LAG_MAX);
        let prev_better = self.prev.as_ref().and_then(|state| {
            state.side_progress.map(|sides| sides.left.max(sides.right))
        });
        let better = (progress + lag)
            .min(1.0)
            .max(prev_better.unwrap_or(0.0));
        let sides = if self.worse_side_is_left {
            SideProgress {
                left: progress,
                right: better,
            }
        } else {
            SideProgress {
                left: better,
                right: progress,
            }
        };
        Some(sides)
    }
}

fn smoothstep(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Improvement-paced descent: at most one tier per visit, never below the
/// target, full convergence on the final visit.
fn step_down(prev: u8, target: u8, is_final: bool) -> u8 {
    if target >= prev {
        // No worsening outside explicit bounces.
        return prev;
    }
    if is_final {
        target
    } else {
        prev - 1
    }
}

/// Improvement-paced climb, mirror of `step_down`.
fn step_up(prev: u8, target: u8, is_final: bool) -> u8 {
    if target <= prev {
        return prev;
    }
    if is_final {
        target
    } else {
        prev + 1
    }
}

fn negative_budget(cap: f64, tx_count: u16) -> u16 {
    let budget = (cap * u16_to_f64(tx_count)).floor();
    u16::try_from(crate::grid::round_f64_to_i32(budget).max(0)).unwrap_or(0)
}
