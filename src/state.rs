use clap::ValueEnum;

use crate::optics::{self, hyperfocal_mm, min_subject_distance_mm, LensState};
use crate::sensor::Sensor;
use crate::settings::Settings;

/// Farthest subject distance the controls can reach
pub const MAX_SUBJECT_DISTANCE_MM: f64 = 100_000.0;
/// Step applied by the distance keys
pub const DISTANCE_STEP_MM: f64 = 100.0;
pub const MIN_FOCAL_LENGTH_MM: f64 = 1.0;
pub const MAX_FOCAL_LENGTH_MM: f64 = 2000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "DARK MODE",
            Theme::Light => "LIGHT MODE",
        }
    }
}

/// Application state
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    /// Focal length in millimetres
    pub focal_length_mm: f64,
    /// Aperture as an f-number
    pub f_number: f64,
    /// Subject distance in millimetres
    pub subject_distance_mm: f64,
    /// Selected sensor format
    pub sensor: Sensor,
    /// Circle of confusion overriding the sensor format
    pub coc_override_mm: Option<f64>,
    pub theme: Theme,
    /// Enable debug mode
    pub debug: bool,
    /// Scenery animation paused
    pub paused: bool,
    /// Values restored by a reset
    initial: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let lens = settings.lens_state();
        AppState {
            focal_length_mm: lens.focal_length_mm,
            f_number: lens.f_number,
            subject_distance_mm: lens.subject_distance_mm,
            sensor: settings.sensor,
            coc_override_mm: settings.coc_override_mm,
            theme: settings.theme,
            debug: false,
            paused: false,
            initial: settings,
        }
    }

    pub fn circle_of_confusion_mm(&self) -> f64 {
        self.coc_override_mm
            .unwrap_or_else(|| self.sensor.circle_of_confusion_mm())
    }

    /// Current lens values, with the subject distance clamped to the minimum focus distance.
    pub fn lens(&self) -> LensState {
        LensState::new(
            self.focal_length_mm,
            self.f_number,
            self.subject_distance_mm,
            self.circle_of_confusion_mm(),
        )
        .clamped()
    }

    /// Sets the subject distance within `[minimum focus, MAX_SUBJECT_DISTANCE_MM]`.
    pub fn set_subject_distance(&mut self, distance_mm: f64) {
        let floor = min_subject_distance_mm(self.focal_length_mm);
        self.subject_distance_mm = distance_mm.min(MAX_SUBJECT_DISTANCE_MM).max(floor);
    }

    /// Focuses far enough that the far limit is infinite, even when the
    /// hyperfocal distance lies beyond `MAX_SUBJECT_DISTANCE_MM`.
    pub fn focus_at_infinity(&mut self) {
        let hyperfocal = hyperfocal_mm(
            self.focal_length_mm,
            self.f_number,
            self.circle_of_confusion_mm(),
        );
        self.subject_distance_mm = MAX_SUBJECT_DISTANCE_MM.max(hyperfocal);
    }

    pub fn set_focal_length(&mut self, focal_length_mm: f64) {
        self.focal_length_mm = focal_length_mm.clamp(MIN_FOCAL_LENGTH_MM, MAX_FOCAL_LENGTH_MM);
        // Keep the stored distance above the new minimum focus distance
        self.set_subject_distance(self.subject_distance_mm);
    }

    pub fn step_aperture(&mut self, steps: i32) {
        self.f_number = optics::step_f_number(self.f_number, steps);
    }

    pub fn cycle_sensor(&mut self) {
        self.sensor = self.sensor.next();
        self.coc_override_mm = None;
    }

    /// Restores the values the application started with
    pub fn reset(&mut self) {
        let theme = self.theme;
        *self = AppState::new(self.initial);
        self.theme = theme;
    }
}
