//! Pointer dragging of the focus and hyperfocal markers.

use crate::optics::{snap_f_number, F_STOPS};
use crate::projection::{
    column_to_fraction, fraction_to_column, screen_fraction_to_distance, MarkerPositions,
};
use crate::state::AppState;

/// How many columns away from a marker a press still grabs it
pub const GRAB_TOLERANCE: u16 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragTarget {
    Focus,
    Hyperfocal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragTarget),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }

    /// Handles a pointer press, capturing the closest marker within reach.
    pub fn press(
        &mut self,
        column: u16,
        width: u16,
        markers: &MarkerPositions,
    ) -> Option<DragTarget> {
        let focus = fraction_to_column(markers.subject, width).abs_diff(column);
        let hyper = fraction_to_column(markers.hyperfocal, width).abs_diff(column);

        let target = if focus <= GRAB_TOLERANCE && focus <= hyper {
            Some(DragTarget::Focus)
        } else if hyper <= GRAB_TOLERANCE {
            Some(DragTarget::Hyperfocal)
        } else {
            None
        };

        if let Some(target) = target {
            log::debug!("Grabbed {:?} marker at column {}", target, column);
            *self = DragState::Dragging(target);
        }
        target
    }

    /// Applies a pointer move to the field behind the captured marker.
    /// Returns whether anything changed.
    pub fn drag_to(&self, column: u16, width: u16, state: &mut AppState) -> bool {
        let DragState::Dragging(target) = *self else {
            return false;
        };
        let distance_mm = screen_fraction_to_distance(column_to_fraction(column, width));
        match target {
            DragTarget::Focus => {
                let before = state.subject_distance_mm;
                if distance_mm == f64::INFINITY {
                    state.focus_at_infinity();
                } else {
                    state.set_subject_distance(distance_mm);
                }
                before != state.subject_distance_mm
            }
            DragTarget::Hyperfocal => {
                let before = state.f_number;
                state.f_number = aperture_for_hyperfocal(
                    distance_mm,
                    state.focal_length_mm,
                    state.circle_of_confusion_mm(),
                );
                before != state.f_number
            }
        }
    }

    /// Handles pointer release or the pointer leaving the view
    pub fn release(&mut self) {
        if let DragState::Dragging(target) = *self {
            log::debug!("Released {:?} marker", target);
        }
        *self = DragState::Idle;
    }
}

/// Preset stop whose hyperfocal distance is closest to `hyperfocal_mm`.
///
/// Solves `H = f^2 / (N * c) + f` for `N`. An infinite target picks the widest
/// stop; a target at or inside the focal length picks the narrowest.
pub fn aperture_for_hyperfocal(hyperfocal_mm: f64, focal_length_mm: f64, coc_mm: f64) -> f64 {
    if !hyperfocal_mm.is_finite() {
        return F_STOPS[0];
    }
    if hyperfocal_mm <= focal_length_mm {
        return F_STOPS[F_STOPS.len() - 1];
    }
    snap_f_number(focal_length_mm * focal_length_mm / ((hyperfocal_mm - focal_length_mm) * coc_mm))
}
