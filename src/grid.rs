//! Grid snapping and numeric conversion helpers.

use num_traits::cast::cast;
use serde::{Deserialize, Serialize};

/// A continuous value snapped to a discretization grid, with its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapped {
    pub value: f64,
    pub label: String,
}

/// Snap a value to the nearest multiple of `step` and format its label.
///
/// Labels drop trailing fraction when the snapped value is whole, so a
/// 0.5-step grid yields "6.5" and "7" rather than "7.0". Non-finite input
/// and non-positive steps snap to zero.
#[must_use]
pub fn snap_to_grid(value: f64, step: f64) -> Snapped {
    if !value.is_finite() || step <= 0.0 || !step.is_finite() {
        return Snapped {
            value: 0.0,
            label: String::from("0"),
        };
    }
    let snapped = (value / step).round() * step;
    // Re-round to kill accumulated binary noise on clean grids.
    let snapped = (snapped * 1_000.0).round() / 1_000.0;
    Snapped {
        value: snapped,
        label: format_grid_label(snapped),
    }
}

fn format_grid_label(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", round_f64_to_i32(value))
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Snap a percentage to the 5-point grid and render it as "NN%".
#[must_use]
pub fn snap_percent(value: f64) -> Snapped {
    let snapped = snap_to_grid(value.clamp(0.0, 100.0), 5.0);
    Snapped {
        label: format!("{}%", snapped.label),
        value: snapped.value,
    }
}

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Round a f64 and clamp it to 0..=u8::MAX, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_u8(value: f64) -> u8 {
    let rounded = round_f64_to_i32(value);
    u8::try_from(rounded.clamp(0, i32::from(u8::MAX))).unwrap_or(0)
}

/// Convert a u16 to f64 without a lossy `as` cast at call sites.
#[must_use]
pub fn u16_to_f64(value: u16) -> f64 {
    f64::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pain_grid_snaps_to_half_steps() {
        assert_eq!(snap_to_grid(6.74, 0.5).value, 6.5);
        assert_eq!(snap_to_grid(6.76, 0.5).label, "7");
        assert_eq!(snap_to_grid(6.5, 0.5).label, "6.5");
        assert_eq!(snap_to_grid(0.12, 0.5).label, "0");
    }

    #[test]
    fn non_finite_and_bad_steps_snap_to_zero() {
        assert_eq!(snap_to_grid(f64::NAN, 0.5).label, "0");
        assert_eq!(snap_to_grid(3.0, 0.0).value, 0.0);
        assert_eq!(snap_to_grid(3.0, f64::INFINITY).value, 0.0);
    }

    #[test]
    fn percent_grid_formats_with_suffix() {
        assert_eq!(snap_percent(82.0).label, "80%");
        assert_eq!(snap_percent(82.6).label, "85%");
        assert_eq!(snap_percent(140.0).value, 100.0);
    }

    #[test]
    fn rounders_clamp_ranges() {
        assert_eq!(round_f64_to_i32(1.6), 2);
        assert_eq!(round_f64_to_i32(f64::NAN), 0);
        assert_eq!(round_f64_to_u8(300.0), 255);
        assert_eq!(round_f64_to_u8(-4.0), 0);
    }
}
