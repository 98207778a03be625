//! Decorative scenery whose sharpness follows the depth of field.
//!
//! Horizontal positions here are percentages of the view width and advance a
//! little every frame. Each element carries a physical distance which decides
//! how blurred it is drawn.

use rand::Rng;

use crate::optics::DofResult;
use crate::projection::MAX_VIEW_DISTANCE_MM;

pub const CLOUD_COUNT: usize = 5;
pub const BIRD_COUNT: usize = 6;
pub const TREE_COUNT: usize = 40;
/// Clouds are always drawn at this blur
pub const CLOUD_BLUR: f64 = 12.0;
/// Elements leaving the right edge re-enter here
const WRAP_FROM: f64 = 110.0;
const WRAP_TO: f64 = -10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Cloud {
    pub distance_mm: f64,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bird {
    pub distance_mm: f64,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub wing_phase: f64,
    pub flap_speed: f64,
}

impl Bird {
    /// Vertical bob in percent of the view height
    pub fn bob(&self) -> f64 {
        (self.wing_phase * 0.5).sin() * 2.0
    }

    /// Whether the wings are currently above the body
    pub fn wings_up(&self) -> bool {
        self.wing_phase.sin() < 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tree {
    pub distance_mm: f64,
}

impl Tree {
    /// Height relative to the nearest tree, in `(0.3, 1.0]`
    pub fn relative_height(&self) -> f64 {
        (30.0 + (1.0 - self.distance_mm / MAX_VIEW_DISTANCE_MM) * 70.0) / 100.0
    }

    /// Width relative to the nearest tree, in `(0.3, 1.0]`
    pub fn relative_width(&self) -> f64 {
        (15.0 + (1.0 - self.distance_mm / MAX_VIEW_DISTANCE_MM) * 35.0) / 50.0
    }

    /// Fades with distance
    pub fn opacity(&self) -> f64 {
        1.0 - self.distance_mm / 60_000.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub clouds: Vec<Cloud>,
    pub birds: Vec<Bird>,
    pub trees: Vec<Tree>,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_rng(&mut rand::rng())
    }

    /// Lays the scenery out with the given random source
    pub fn with_rng<R: Rng>(rng: &mut R) -> Self {
        let clouds = (0..CLOUD_COUNT)
            .map(|_| Cloud {
                distance_mm: rng.random_range(10_000.0..50_000.0),
                x: rng.random_range(0.0..110.0),
                y: rng.random_range(15.0..45.0),
                speed: rng.random_range(0.005..0.02),
                width: rng.random_range(40.0..80.0),
            })
            .collect();
        let birds = (0..BIRD_COUNT)
            .map(|_| Bird {
                distance_mm: rng.random_range(500.0..15_500.0),
                x: rng.random_range(0.0..100.0),
                y: rng.random_range(25.0..65.0),
                speed: rng.random_range(0.03..0.1),
                wing_phase: rng.random_range(0.0..std::f64::consts::TAU),
                flap_speed: rng.random_range(0.1..0.2),
            })
            .collect();
        let trees = (0..TREE_COUNT)
            .map(|i| Tree {
                distance_mm: i as f64 / TREE_COUNT as f64 * MAX_VIEW_DISTANCE_MM,
            })
            .collect();
        Scene {
            clouds,
            birds,
            trees,
        }
    }

    /// Moves clouds and birds one frame along
    pub fn advance(&mut self) {
        for cloud in &mut self.clouds {
            cloud.x = wrap(cloud.x + cloud.speed);
        }
        for bird in &mut self.birds {
            bird.x = wrap(bird.x + bird.speed);
            bird.wing_phase += bird.flap_speed;
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

fn wrap(x: f64) -> f64 {
    if x > WRAP_FROM {
        WRAP_TO
    } else {
        x
    }
}

/// Blur of a bird at `distance_mm`
pub fn bird_blur(distance_mm: f64, dof: &DofResult) -> f64 {
    blur(distance_mm, dof, (400.0, 6.0), (1000.0, 8.0))
}

/// Blur of a tree at `distance_mm`
pub fn tree_blur(distance_mm: f64, dof: &DofResult) -> f64 {
    blur(distance_mm, dof, (200.0, 8.0), (600.0, 8.0))
}

/// Blur grows linearly with the distance outside the sharp zone, up to a cap.
/// `front` and `behind` are `(millimetres per unit of blur, cap)`.
fn blur(distance_mm: f64, dof: &DofResult, front: (f64, f64), behind: (f64, f64)) -> f64 {
    if distance_mm < dof.near_limit_mm {
        ((dof.near_limit_mm - distance_mm) / front.0).min(front.1)
    } else if distance_mm > dof.far_limit_mm && !dof.is_far_infinite() {
        ((distance_mm - dof.far_limit_mm) / behind.0).min(behind.1)
    } else {
        0.0
    }
}
