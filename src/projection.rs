//! Nonlinear mapping between physical distance and horizontal screen position.
//!
//! Positions are percentages of the viewport width. Finite distances land in
//! `[15, 95]`; `98` is reserved for infinity.

use crate::optics::DofResult;

/// Distance at which the visualisation stops spreading markers out
pub const MAX_VIEW_DISTANCE_MM: f64 = 50_000.0;
/// Exponent of the concave power curve
pub const CURVE_EXPONENT: f64 = 0.6;
/// Position of a zero distance
pub const LEFT_MARGIN: f64 = 15.0;
/// Width of the finite range
pub const SPAN: f64 = 80.0;
/// Position of an infinite distance
pub const INFINITY_FRACTION: f64 = 98.0;

/// Maps a distance to its screen position.
///
/// Distances beyond [`MAX_VIEW_DISTANCE_MM`] saturate at `95`, not at the
/// infinity position.
pub fn distance_to_screen_fraction(distance_mm: f64) -> f64 {
    if distance_mm == f64::INFINITY {
        return INFINITY_FRACTION;
    }
    let normalized = distance_mm.min(MAX_VIEW_DISTANCE_MM) / MAX_VIEW_DISTANCE_MM;
    LEFT_MARGIN + normalized.powf(CURVE_EXPONENT) * SPAN
}

/// Inverse of [`distance_to_screen_fraction`], used to interpret drag positions.
///
/// Anything at or right of the infinity position reads as infinity; anything
/// left of the margin reads as zero.
pub fn screen_fraction_to_distance(fraction: f64) -> f64 {
    if fraction >= INFINITY_FRACTION {
        return f64::INFINITY;
    }
    let normalized = ((fraction - LEFT_MARGIN) / SPAN).clamp(0.0, 1.0);
    normalized.powf(1.0 / CURVE_EXPONENT) * MAX_VIEW_DISTANCE_MM
}

/// Terminal column whose centre is closest to `fraction` percent of `width`.
pub fn fraction_to_column(fraction: f64, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let column = (fraction / 100.0 * width as f64).floor();
    column.clamp(0.0, (width - 1) as f64) as u16
}

/// Screen position of the centre of `column`.
pub fn column_to_fraction(column: u16, width: u16) -> f64 {
    if width == 0 {
        return 0.0;
    }
    (column as f64 + 0.5) / width as f64 * 100.0
}

/// Screen positions of the four markers drawn over the scene
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerPositions {
    pub subject: f64,
    pub near: f64,
    pub far: f64,
    pub hyperfocal: f64,
}

impl MarkerPositions {
    pub fn new(subject_distance_mm: f64, result: &DofResult) -> Self {
        MarkerPositions {
            subject: distance_to_screen_fraction(subject_distance_mm),
            near: distance_to_screen_fraction(result.near_limit_mm),
            far: distance_to_screen_fraction(result.far_limit_mm),
            hyperfocal: distance_to_screen_fraction(result.hyperfocal_mm),
        }
    }

    /// Width of the sharp-zone overlay
    pub fn zone_width(&self) -> f64 {
        self.far - self.near
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::{compute_dof, LensState};

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_round_trip_below_cutoff() {
        for distance in [0.0, 1000.0, 25000.0, 49999.0] {
            let back = screen_fraction_to_distance(distance_to_screen_fraction(distance));
            assert!(close(back, distance, 1e-6), "{} came back as {}", distance, back);
        }
    }

    #[test]
    fn test_infinity_positions() {
        assert_eq!(distance_to_screen_fraction(f64::INFINITY), 98.0);
        assert_eq!(screen_fraction_to_distance(98.0), f64::INFINITY);
        assert_eq!(screen_fraction_to_distance(99.5), f64::INFINITY);
        assert!(screen_fraction_to_distance(97.9).is_finite());
    }

    #[test]
    fn test_margin_clamps_to_zero() {
        assert_eq!(distance_to_screen_fraction(0.0), 15.0);
        assert_eq!(screen_fraction_to_distance(15.0), 0.0);
        assert_eq!(screen_fraction_to_distance(3.0), 0.0);
        assert_eq!(screen_fraction_to_distance(-40.0), 0.0);
    }

    #[test]
    fn test_saturates_above_cutoff() {
        let at_cutoff = distance_to_screen_fraction(MAX_VIEW_DISTANCE_MM);
        assert!(close(at_cutoff, 95.0, 1e-9));
        assert_eq!(distance_to_screen_fraction(80_000.0), at_cutoff);
        assert_eq!(distance_to_screen_fraction(1.0e12), at_cutoff);
        assert!(at_cutoff < INFINITY_FRACTION);
        // Lossy round trip: everything past the cutoff comes back as the cutoff.
        assert!(close(
            screen_fraction_to_distance(distance_to_screen_fraction(80_000.0)),
            MAX_VIEW_DISTANCE_MM,
            1e-6
        ));
    }

    #[test]
    fn test_forward_map_is_monotonic() {
        let mut previous = distance_to_screen_fraction(0.0);
        for step in 1..=500 {
            let fraction = distance_to_screen_fraction(step as f64 * 100.0);
            assert!(fraction >= previous);
            previous = fraction;
        }
    }

    #[test]
    fn test_near_field_is_expanded() {
        let first_meter = distance_to_screen_fraction(1000.0) - distance_to_screen_fraction(0.0);
        let last_meter =
            distance_to_screen_fraction(50_000.0) - distance_to_screen_fraction(49_000.0);
        assert!(first_meter > last_meter * 5.0);
    }

    #[test]
    fn test_columns() {
        assert_eq!(fraction_to_column(0.0, 100), 0);
        assert_eq!(fraction_to_column(50.0, 100), 50);
        assert_eq!(fraction_to_column(100.0, 100), 99);
        assert_eq!(fraction_to_column(50.0, 0), 0);
        assert!(close(column_to_fraction(49, 100), 49.5, 1e-9));
        assert_eq!(fraction_to_column(column_to_fraction(37, 80), 80), 37);
    }

    #[test]
    fn test_marker_positions() {
        let lens = LensState::new(50.0, 2.8, 5000.0, 0.03);
        let result = compute_dof(&lens);
        let markers = MarkerPositions::new(lens.subject_distance_mm, &result);
        assert!(markers.near < markers.subject);
        assert!(markers.subject < markers.far);
        assert!(markers.far < markers.hyperfocal);
        assert!(markers.zone_width() > 0.0);

        let lens = LensState::new(50.0, 2.8, 30000.0, 0.03);
        let markers = MarkerPositions::new(lens.subject_distance_mm, &compute_dof(&lens));
        assert_eq!(markers.far, INFINITY_FRACTION);
    }
}
