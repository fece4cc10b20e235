//! Pointer direction to slot index.
//!
//! Both strategies reject points inside the dead zone and share the same
//! tie-break: a sector's lower bound is inclusive, its upper bound exclusive.

use crate::config::{SelectionKind, WheelConfig};
use crate::geometry::{Point, angle_degrees};

pub mod angle;
pub mod grid;

pub use angle::AngleSelection;
pub use grid::{Compass, GridSelection};

/// Everything a strategy needs for one hit test.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub center: Point,
    pub input: Point,
    pub dead_zone_radius: f64,
    pub slot_count: usize,
    pub slot_angles: Option<&'a [f64]>,
}

impl<'a> SelectionContext<'a> {
    pub fn new(config: &'a WheelConfig, center: Point, input: Point) -> Self {
        Self {
            center,
            input,
            dead_zone_radius: config.dead_zone_radius,
            slot_count: config.slot_count,
            slot_angles: config.slot_angles.as_deref(),
        }
    }

    pub fn in_dead_zone(&self) -> bool {
        self.center.distance_to(self.input) < self.dead_zone_radius
    }

    /// Direction of the input in degrees `[0, 360)`, `y` taken as given.
    pub fn angle(&self) -> f64 {
        let d = self.input.offset_from(self.center);
        angle_degrees(d.x, d.y)
    }
}

pub trait SelectionStrategy {
    /// `None` inside the dead zone or when no sector claims the direction.
    fn select(&self, ctx: &SelectionContext<'_>) -> Option<usize>;
}

impl<S: SelectionStrategy + ?Sized> SelectionStrategy for Box<S> {
    fn select(&self, ctx: &SelectionContext<'_>) -> Option<usize> {
        (**self).select(ctx)
    }
}

pub fn strategy_for(kind: SelectionKind) -> Box<dyn SelectionStrategy> {
    match kind {
        SelectionKind::Angle => Box::new(AngleSelection),
        SelectionKind::Grid => Box::new(GridSelection),
    }
}

/// Sector test with wraparound. `lower > upper` means the sector crosses 0.
pub(crate) fn in_sector(angle: f64, lower: f64, upper: f64) -> bool {
    if lower > upper {
        angle >= lower || angle < upper
    } else {
        angle >= lower && angle < upper
    }
}
