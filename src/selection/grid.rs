use super::{SelectionContext, SelectionStrategy, in_sector};
use crate::geometry::angle_degrees;
use serde::Serialize;
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};

/// The eight outer cells of a 3x3 grid, named by compass direction.
///
/// Slot indices follow the grid layout the wheel was designed around;
/// index 8 is the center cell and is never produced by pointer direction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Compass {
    #[strum(serialize = "East", serialize = "e")]
    East,
    #[strum(serialize = "SouthEast", serialize = "se")]
    SouthEast,
    #[strum(serialize = "South", serialize = "s")]
    South,
    #[strum(serialize = "SouthWest", serialize = "sw")]
    SouthWest,
    #[strum(serialize = "West", serialize = "w")]
    West,
    #[strum(serialize = "NorthWest", serialize = "nw")]
    NorthWest,
    #[strum(serialize = "North", serialize = "n")]
    North,
    #[strum(serialize = "NorthEast", serialize = "ne")]
    NorthEast,
}

impl Compass {
    pub const CENTER_SLOT: usize = 8;
    pub const SECTOR_WIDTH: f64 = 45.0;

    pub fn slot_index(self) -> usize {
        match self {
            Self::West => 0,
            Self::East => 1,
            Self::North => 2,
            Self::South => 3,
            Self::SouthWest => 4,
            Self::SouthEast => 5,
            Self::NorthEast => 6,
            Self::NorthWest => 7,
        }
    }

    pub fn from_slot(index: usize) -> Option<Self> {
        Self::iter().find(|c| c.slot_index() == index)
    }

    /// Nominal direction in the y-flipped frame: east 0, south 90.
    pub fn center_angle(self) -> f64 {
        self as usize as f64 * Self::SECTOR_WIDTH
    }

    /// Sector bounds, lower inclusive, upper exclusive.
    pub fn bounds(self) -> (f64, f64) {
        let half = Self::SECTOR_WIDTH / 2.0;
        let lower = (self.center_angle() - half).rem_euclid(360.0);
        (lower, self.center_angle() + half)
    }

    /// Every angle in `[0, 360)` belongs to exactly one direction.
    pub fn from_angle(angle: f64) -> Self {
        Self::iter()
            .find(|c| {
                let (lower, upper) = c.bounds();
                in_sector(angle, lower, upper)
            })
            .unwrap_or(Self::East)
    }
}

/// Fixed eight 45 degree sectors with boundaries at odd multiples of 22.5.
///
/// Input `y` is flipped before the angle is taken, so on a y-up screen
/// 90 degrees points down ("south").
#[derive(Debug, Clone, Copy, Default)]
pub struct GridSelection;

impl GridSelection {
    pub const SLOT_COUNT: usize = 9;

    pub fn index_for_angle(angle: f64) -> usize {
        Compass::from_angle(angle).slot_index()
    }
}

impl SelectionStrategy for GridSelection {
    fn select(&self, ctx: &SelectionContext<'_>) -> Option<usize> {
        if ctx.slot_count != Self::SLOT_COUNT {
            log::warn!(
                "[GridSelection] slot count should be {}, got {}",
                Self::SLOT_COUNT,
                ctx.slot_count
            );
        }
        if ctx.in_dead_zone() {
            return None;
        }
        let d = ctx.input.offset_from(ctx.center);
        let index = Self::index_for_angle(angle_degrees(d.x, -d.y));
        // smaller layouts simply have no cell in that direction
        (index < ctx.slot_count).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn ctx(input: Point) -> SelectionContext<'static> {
        SelectionContext {
            center: Point::default(),
            input,
            dead_zone_radius: 20.0,
            slot_count: 9,
            slot_angles: None,
        }
    }

    #[test]
    fn test_reference_table() {
        let table = [
            (0.0, 1),
            (22.4, 1),
            (22.5, 5),
            (67.4, 5),
            (67.5, 3),
            (90.0, 3),
            (112.5, 4),
            (157.5, 0),
            (180.0, 0),
            (202.5, 7),
            (247.5, 2),
            (270.0, 2),
            (292.5, 6),
            (337.4, 6),
            (337.5, 1),
            (359.9, 1),
        ];
        for (angle, slot) in table {
            assert_eq!(GridSelection::index_for_angle(angle), slot, "{angle}");
        }
    }

    #[test]
    fn test_points_with_y_flip() {
        assert_eq!(GridSelection.select(&ctx(Point::new(50.0, 0.0))), Some(1));
        assert_eq!(GridSelection.select(&ctx(Point::new(0.0, -50.0))), Some(3));
        assert_eq!(GridSelection.select(&ctx(Point::new(0.0, 50.0))), Some(2));
        assert_eq!(GridSelection.select(&ctx(Point::new(-50.0, 0.0))), Some(0));
        assert_eq!(GridSelection.select(&ctx(Point::new(-50.0, 50.0))), Some(7));
    }

    #[test]
    fn test_center_never_selected() {
        for deg in 0..360 {
            let r = (deg as f64).to_radians();
            let hit = GridSelection.select(&ctx(Point::new(30.0 * r.cos(), 30.0 * r.sin())));
            assert!(matches!(hit, Some(i) if i != Compass::CENTER_SLOT), "{deg}");
        }
        assert_eq!(GridSelection.select(&ctx(Point::new(5.0, 5.0))), None);
    }

    #[test]
    fn test_compass_round_trip() {
        for c in Compass::iter() {
            assert_eq!(Compass::from_slot(c.slot_index()), Some(c));
            assert_eq!(Compass::from_angle(c.center_angle()), c);
        }
        assert_eq!(Compass::from_slot(Compass::CENTER_SLOT), None);
    }

    #[test]
    fn test_compass_parsing() {
        assert_eq!("ne".parse::<Compass>().unwrap(), Compass::NorthEast);
        assert_eq!("SOUTH".parse::<Compass>().unwrap(), Compass::South);
        let c: Compass = serde_json::from_str("\"sw\"").unwrap();
        assert_eq!(c, Compass::SouthWest);
    }
}
