//! Depth-of-field calculator with a live terminal scene.
//!
//! The optics core lives in [`optics`] and [`projection`]; everything else
//! feeds it values and draws what it returns.

pub mod app;
pub mod drag;
pub mod error;
pub mod graphics;
pub mod math;
pub mod optics;
pub mod projection;
pub mod report;
pub mod scene;
pub mod scheduler;
pub mod sensor;
pub mod settings;
pub mod state;
pub mod widget;

pub use error::{Error, Result};
pub use optics::{compute_dof, DofResult, LensState};
pub use projection::{distance_to_screen_fraction, screen_fraction_to_distance};
