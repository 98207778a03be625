//! Thin-lens depth-of-field calculations.
//!
//! All distances are in millimetres. The functions here are total: they never
//! fail and may return `f64::INFINITY` for limits that lie at infinity.

/// Aperture stops the interactive controls snap to.
pub const F_STOPS: [f64; 17] = [
    0.7, 0.8, 1.0, 1.2, 1.4, 1.8, 2.0, 2.8, 4.0, 5.6, 8.0, 11.0, 16.0, 22.0, 32.0, 45.0, 64.0,
];

/// Closest focus distance as a multiple of the focal length.
pub const MIN_FOCUS_FOCAL_MULTIPLE: f64 = 10.0;

/// Lens parameters a result is derived from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LensState {
    pub focal_length_mm: f64,
    pub f_number: f64,
    pub subject_distance_mm: f64,
    pub circle_of_confusion_mm: f64,
}

impl LensState {
    pub fn new(
        focal_length_mm: f64,
        f_number: f64,
        subject_distance_mm: f64,
        circle_of_confusion_mm: f64,
    ) -> Self {
        LensState {
            focal_length_mm,
            f_number,
            subject_distance_mm,
            circle_of_confusion_mm,
        }
    }

    /// Returns a copy with the subject distance raised to the minimum focus distance.
    pub fn clamped(self) -> Self {
        LensState {
            subject_distance_mm: self
                .subject_distance_mm
                .max(min_subject_distance_mm(self.focal_length_mm)),
            ..self
        }
    }
}

/// Depth-of-field figures for one `LensState`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DofResult {
    pub hyperfocal_mm: f64,
    pub near_limit_mm: f64,
    /// `f64::INFINITY` once the subject is at or beyond the hyperfocal distance
    pub far_limit_mm: f64,
    pub total_dof_mm: f64,
    /// Share of the sharp zone in front of the subject, `None` when far is infinite
    pub front_fraction: Option<f64>,
    /// Share of the sharp zone behind the subject, `None` when far is infinite
    pub behind_fraction: Option<f64>,
}

impl DofResult {
    pub fn is_far_infinite(&self) -> bool {
        self.far_limit_mm == f64::INFINITY
    }

    /// Whether a point at `distance_mm` lies inside the acceptably sharp zone.
    /// Both limits count as sharp.
    pub fn is_in_focus(&self, distance_mm: f64) -> bool {
        distance_mm >= self.near_limit_mm
            && (self.is_far_infinite() || distance_mm <= self.far_limit_mm)
    }
}

/// Minimum subject distance for a focal length.
pub fn min_subject_distance_mm(focal_length_mm: f64) -> f64 {
    // The floor is f*10/1000 metres, converted back to millimetres.
    (focal_length_mm * MIN_FOCUS_FOCAL_MULTIPLE / 1000.0) * 1000.0
}

/// Hyperfocal distance `f^2 / (N * c) + f`.
pub fn hyperfocal_mm(focal_length_mm: f64, f_number: f64, circle_of_confusion_mm: f64) -> f64 {
    (focal_length_mm * focal_length_mm) / (f_number * circle_of_confusion_mm) + focal_length_mm
}

/// Computes near/far limits and their distribution around the subject.
///
/// Callers are expected to pass a clamped state (see [`LensState::clamped`]).
/// The near-limit denominator `H + s - 2f` is not guarded: inputs that drive
/// it to zero yield an infinite near limit instead of an error.
pub fn compute_dof(lens: &LensState) -> DofResult {
    let f = lens.focal_length_mm;
    let s = lens.subject_distance_mm;
    let h = hyperfocal_mm(f, lens.f_number, lens.circle_of_confusion_mm);

    // An overflowed hyperfocal distance takes the limits as H goes to infinity.
    let near = if h.is_finite() {
        (s * (h - f)) / (h + s - 2.0 * f)
    } else {
        s
    };
    let far = if s < h && h.is_finite() {
        (s * (h - f)) / (h - s)
    } else {
        f64::INFINITY
    };

    if far == f64::INFINITY {
        return DofResult {
            hyperfocal_mm: h,
            near_limit_mm: near,
            far_limit_mm: far,
            total_dof_mm: f64::INFINITY,
            front_fraction: None,
            behind_fraction: None,
        };
    }

    let dof = far - near;
    DofResult {
        hyperfocal_mm: h,
        near_limit_mm: near,
        far_limit_mm: far,
        total_dof_mm: dof,
        front_fraction: Some((s - near) / dof),
        behind_fraction: Some((far - s) / dof),
    }
}

/// Snaps an arbitrary f-number to the nearest preset stop.
pub fn snap_f_number(f_number: f64) -> f64 {
    F_STOPS[nearest_stop_index(f_number)]
}

/// Moves `steps` stops away from the preset closest to `f_number`, saturating at both ends.
pub fn step_f_number(f_number: f64, steps: i32) -> f64 {
    let index = nearest_stop_index(f_number) as i32 + steps;
    F_STOPS[index.clamp(0, F_STOPS.len() as i32 - 1) as usize]
}

fn nearest_stop_index(f_number: f64) -> usize {
    let mut best = 0;
    for (index, stop) in F_STOPS.iter().enumerate() {
        if (stop - f_number).abs() < (F_STOPS[best] - f_number).abs() {
            best = index;
        }
    }
    best
}
