//! Human readable and JSON renditions of a result.

use std::fmt;

use serde::Serialize;

use crate::optics::{DofResult, LensState};

pub const INFINITY_LABEL: &str = "∞";
pub const NOT_APPLICABLE_LABEL: &str = "N/A";

/// Formats millimetres as metres with two decimals, or `∞`.
pub fn format_metres(distance_mm: f64) -> String {
    if distance_mm == f64::INFINITY {
        INFINITY_LABEL.to_string()
    } else {
        format!("{:.2}m", distance_mm / 1000.0)
    }
}

/// Formats a fraction as a whole percentage, or `N/A`.
pub fn format_percent(fraction: Option<f64>) -> String {
    match fraction {
        Some(fraction) => format!("{:.0}%", fraction * 100.0),
        None => NOT_APPLICABLE_LABEL.to_string(),
    }
}

/// One labelled figure shown under the scene
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub label: &'static str,
    pub value: String,
}

/// The six result cards in display order
pub fn cards(result: &DofResult) -> Vec<Card> {
    vec![
        Card {
            label: "Hyperfocal",
            value: format_metres(result.hyperfocal_mm),
        },
        Card {
            label: "Total DOF",
            value: format_metres(result.total_dof_mm),
        },
        Card {
            label: "Near Limit",
            value: format_metres(result.near_limit_mm),
        },
        Card {
            label: "Far Limit",
            value: format_metres(result.far_limit_mm),
        },
        Card {
            label: "Front %",
            value: format_percent(result.front_fraction),
        },
        Card {
            label: "Behind %",
            value: format_percent(result.behind_fraction),
        },
    ]
}

/// Machine readable result. Infinite distances are written as `null`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub focal_length_mm: f64,
    pub f_number: f64,
    pub subject_distance_mm: f64,
    pub circle_of_confusion_mm: f64,
    pub hyperfocal_mm: f64,
    pub near_limit_mm: Option<f64>,
    pub far_limit_mm: Option<f64>,
    pub total_dof_mm: Option<f64>,
    pub front_fraction: Option<f64>,
    pub behind_fraction: Option<f64>,
}

impl Report {
    pub fn new(lens: &LensState, result: &DofResult) -> Self {
        Report {
            focal_length_mm: lens.focal_length_mm,
            f_number: lens.f_number,
            subject_distance_mm: lens.subject_distance_mm,
            circle_of_confusion_mm: lens.circle_of_confusion_mm,
            hyperfocal_mm: result.hyperfocal_mm,
            near_limit_mm: finite(result.near_limit_mm),
            far_limit_mm: finite(result.far_limit_mm),
            total_dof_mm: finite(result.total_dof_mm),
            front_fraction: result.front_fraction,
            behind_fraction: result.behind_fraction,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Plain text summary for `--print`
pub struct TextReport<'a> {
    pub lens: &'a LensState,
    pub result: &'a DofResult,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}mm  f/{:.1}  {:.2}m  CoC {:.3}mm",
            self.lens.focal_length_mm,
            self.lens.f_number,
            self.lens.subject_distance_mm / 1000.0,
            self.lens.circle_of_confusion_mm
        )?;
        for card in cards(self.result) {
            writeln!(f, "{:<12}{}", card.label, card.value)?;
        }
        Ok(())
    }
}
