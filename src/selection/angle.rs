use super::{SelectionContext, SelectionStrategy, in_sector};
use crate::geometry::normalize_degrees;

/// `slot_count` sectors. Slot `i` is centered on `i * 360 / slot_count`
/// degrees, or on `slot_angles[i]` when custom angles are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngleSelection;

impl AngleSelection {
    /// Uniform sectors, computed directly so that adjacent sectors never
    /// leave a floating point gap.
    pub fn uniform_index(angle: f64, slot_count: usize) -> Option<usize> {
        if slot_count == 0 {
            return None;
        }
        let step = 360.0 / slot_count as f64;
        let shifted = normalize_degrees(angle + step / 2.0);
        Some(((shifted / step).floor() as usize) % slot_count)
    }

    /// Custom centers, each spanning one uniform step. The first sector that
    /// contains the angle wins; gaps between sparse angles select nothing.
    pub fn custom_index(angle: f64, slot_angles: &[f64]) -> Option<usize> {
        if slot_angles.is_empty() {
            return None;
        }
        let half = 180.0 / slot_angles.len() as f64;
        slot_angles.iter().position(|&center| {
            let lower = normalize_degrees(center - half);
            let upper = normalize_degrees(center + half);
            in_sector(angle, lower, upper)
        })
    }
}

impl SelectionStrategy for AngleSelection {
    fn select(&self, ctx: &SelectionContext<'_>) -> Option<usize> {
        if ctx.in_dead_zone() {
            return None;
        }
        let angle = ctx.angle();
        match ctx.slot_angles {
            Some(angles) if angles.len() == ctx.slot_count => Self::custom_index(angle, angles),
            _ => Self::uniform_index(angle, ctx.slot_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn ctx_at(angle_deg: f64, slot_count: usize) -> SelectionContext<'static> {
        let r = angle_deg.to_radians();
        SelectionContext {
            center: Point::new(50.0, 50.0),
            input: Point::new(50.0 + 100.0 * r.cos(), 50.0 + 100.0 * r.sin()),
            dead_zone_radius: 10.0,
            slot_count,
            slot_angles: None,
        }
    }

    #[test]
    fn test_uniform_eight() {
        let expected = [
            (0.0, 0),
            (22.4, 0),
            (45.0, 1),
            (90.0, 2),
            (180.0, 4),
            (270.0, 6),
            (337.6, 0),
            (359.0, 0),
        ];
        for (angle, slot) in expected {
            assert_eq!(AngleSelection.select(&ctx_at(angle, 8)), Some(slot), "{angle}");
        }
    }

    #[test]
    fn test_uniform_boundary_goes_to_upper_sector() {
        assert_eq!(AngleSelection::uniform_index(22.5, 8), Some(1));
        assert_eq!(AngleSelection::uniform_index(337.5, 8), Some(0));
        assert_eq!(AngleSelection::uniform_index(60.0, 3), Some(1));
    }

    #[test]
    fn test_dead_zone() {
        let mut ctx = ctx_at(45.0, 8);
        ctx.input = Point::new(55.0, 55.0);
        assert_eq!(AngleSelection.select(&ctx), None);
    }

    #[test]
    fn test_custom_angles() {
        let angles = [90.0, 210.0, 330.0];
        assert_eq!(AngleSelection::custom_index(90.0, &angles), Some(0));
        assert_eq!(AngleSelection::custom_index(30.0, &angles), Some(0));
        assert_eq!(AngleSelection::custom_index(0.0, &angles), Some(2));
        assert_eq!(AngleSelection::custom_index(150.0, &angles), Some(1));

        let mut ctx = ctx_at(200.0, 3);
        ctx.slot_angles = Some(&[90.0, 210.0, 330.0]);
        assert_eq!(AngleSelection.select(&ctx), Some(1));
    }

    #[test]
    fn test_sparse_custom_angles_leave_gaps() {
        // three slots clustered in one quadrant, each 120 degrees wide
        let angles = [0.0, 10.0, 20.0];
        assert_eq!(AngleSelection::custom_index(5.0, &angles), Some(0));
        assert_eq!(AngleSelection::custom_index(90.0, &angles), None);
    }
}
