//! Ordinal grade ladders and their pain/progress mappings.
//!
//! Each narrative indicator lives on a small ordered ladder instead of a
//! continuous score. Tier 0 is always the mildest rung, so "improvement"
//! is a decreasing tier everywhere except strength, which climbs.

use serde::{Deserialize, Serialize};

use crate::grid::round_f64_to_u8;

/// Muscle tightness ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TightnessGrade {
    Minimal,
    Mild,
    Moderate,
    Severe,
}

impl TightnessGrade {
    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Minimal => 0,
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
        }
    }

    #[must_use]
    pub const fn from_tier(tier: u8) -> Self {
        match tier {
            0 => Self::Minimal,
            1 => Self::Mild,
            2 => Self::Moderate,
            _ => Self::Severe,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

/// Pain frequency ladder; `Constant` is worst, `Intermittent` best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainFrequency {
    Constant,
    Frequent,
    Occasional,
    Intermittent,
}

impl PainFrequency {
    /// Improvement tier: 0 = constant, 3 = intermittent.
    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Constant => 0,
            Self::Frequent => 1,
            Self::Occasional => 2,
            Self::Intermittent => 3,
        }
    }

    #[must_use]
    pub const fn from_tier(tier: u8) -> Self {
        match tier {
            0 => Self::Constant,
            1 => Self::Frequent,
            2 => Self::Occasional,
            _ => Self::Intermittent,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Frequent => "frequent",
            Self::Occasional => "occasional",
            Self::Intermittent => "intermittent",
        }
    }
}

/// Manual muscle testing ladder, 3/5 through 5/5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthGrade {
    Fair,
    FairPlus,
    GoodMinus,
    Good,
    GoodPlus,
    NormalMinus,
    Normal,
}

impl StrengthGrade {
    pub const TOP_TIER: u8 = 6;

    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Fair => 0,
            Self::FairPlus => 1,
            Self::GoodMinus => 2,
            Self::Good => 3,
            Self::GoodPlus => 4,
            Self::NormalMinus => 5,
            Self::Normal => 6,
        }
    }

    #[must_use]
    pub const fn from_tier(tier: u8) -> Self {
        match tier {
            0 => Self::Fair,
            1 => Self::FairPlus,
            2 => Self::GoodMinus,
            3 => Self::Good,
            4 => Self::GoodPlus,
            5 => Self::NormalMinus,
            _ => Self::Normal,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fair => "3/5",
            Self::FairPlus => "3+/5",
            Self::GoodMinus => "4-/5",
            Self::Good => "4/5",
            Self::GoodPlus => "4+/5",
            Self::NormalMinus => "5-/5",
            Self::Normal => "5/5",
        }
    }
}

/// Overall presentation severity derived from the snapped pain score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Minimal,
    Mild,
    Moderate,
    Severe,
}

impl SeverityLevel {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

/// Severity ladder for the associated symptom carried from the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociatedSeverity {
    Resolved,
    Mild,
    Moderate,
    Severe,
}

impl AssociatedSeverity {
    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Resolved => 0,
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
        }
    }

    #[must_use]
    pub const fn from_tier(tier: u8) -> Self {
        match tier {
            0 => Self::Resolved,
            1 => Self::Mild,
            2 => Self::Moderate,
            _ => Self::Severe,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

/// Map pain to a raw tightness tier. The soft ceiling/floor is explicit:
/// pain >= 8 never lands on the mildest rung, pain < 5 never on the most
/// severe. `relaxed` lifts the floor once cumulative progress justifies it.
#[must_use]
pub fn tightness_for(pain: f64, relaxed: bool) -> TightnessGrade {
    let mut tier: u8 = if pain >= 7.5 {
        3
    } else if pain >= 5.5 {
        2
    } else if pain >= 3.0 {
        1
    } else {
        0
    };
    if relaxed {
        tier = tier.saturating_sub(1);
    }
    if pain >= 8.0 && tier == 0 {
        tier = 1;
    }
    if pain < 5.0 && tier == 3 {
        tier = 2;
    }
    TightnessGrade::from_tier(tier)
}

/// Map pain to a palpation tenderness grade 0..=4.
#[must_use]
pub fn tenderness_for(pain: f64) -> u8 {
    round_f64_to_u8(pain / 2.0).min(4)
}

/// Map pain and progress to a frequency tier (improvement-only ordering is
/// enforced by the caller against the previous visit).
#[must_use]
pub fn frequency_for(pain: f64, progress: f64) -> PainFrequency {
    if pain >= 7.0 {
        return PainFrequency::Constant;
    }
    let tier: u8 = if progress >= 0.75 {
        3
    } else if progress >= 0.5 {
        2
    } else if progress >= 0.25 {
        1
    } else {
        0
    };
    PainFrequency::from_tier(tier)
}

/// Strength tier at intake, from the presenting pain score.
#[must_use]
pub fn strength_intake_tier(pain: f64) -> u8 {
    if pain >= 7.0 {
        0
    } else if pain >= 5.0 {
        1
    } else if pain >= 3.0 {
        2
    } else {
        3
    }
}

/// Strength tier for a visit, climbing from the intake tier with progress.
#[must_use]
pub fn strength_for(intake_tier: u8, progress: f64) -> StrengthGrade {
    let span = f64::from(StrengthGrade::TOP_TIER.saturating_sub(intake_tier));
    let climbed = round_f64_to_u8(progress.clamp(0.0, 1.0) * span);
    StrengthGrade::from_tier(intake_tier.saturating_add(climbed).min(StrengthGrade::TOP_TIER))
}

/// Presentation severity from the snapped pain score.
#[must_use]
pub fn severity_for(pain: f64) -> SeverityLevel {
    if pain >= 7.0 {
        SeverityLevel::Severe
    } else if pain >= 4.0 {
        SeverityLevel::Moderate
    } else if pain >= 2.0 {
        SeverityLevel::Mild
    } else {
        SeverityLevel::Minimal
    }
}

/// Associated-symptom severity from intake severity and progress.
#[must_use]
pub fn associated_for(intake: AssociatedSeverity, progress: f64) -> AssociatedSeverity {
    let drop: u8 = if progress >= 0.85 {
        3
    } else if progress >= 0.55 {
        2
    } else if progress >= 0.3 {
        1
    } else {
        0
    };
    AssociatedSeverity::from_tier(intake.tier().saturating_sub(drop))
}
