//! Circle-vs-wall and circle-vs-circle detection and positional correction.

use crate::entity::{Body, EntityKind, Wall};
use crate::geometry::overlaps;

/// The wall `body` touches or crosses, if any. At most one wall is reported,
/// checked right, left, bottom, then top.
#[must_use]
pub fn wall_contact(body: &Body, width: f32, height: f32) -> Option<Wall> {
    let Body { pose, radius, .. } = body;
    if pose.x() + radius >= width {
        Some(Wall::Right)
    } else if pose.x() - radius <= 0.0 {
        Some(Wall::Left)
    } else if pose.y() + radius >= height {
        Some(Wall::Bottom)
    } else if pose.y() - radius <= 0.0 {
        Some(Wall::Top)
    } else {
        None
    }
}

/// Snap `body` back inside the arena, `radius + margin` away from `wall`.
pub fn adjust_wall_overlap(body: &mut Body, wall: Wall, width: f32, height: f32, margin: f32) {
    let clearance = body.radius + margin;
    let (x, y) = (body.pose.x(), body.pose.y());
    match wall {
        Wall::Right => body.pose.set_position(width - clearance, y),
        Wall::Left => body.pose.set_position(clearance, y),
        Wall::Bottom => body.pose.set_position(x, height - clearance),
        Wall::Top => body.pose.set_position(x, clearance),
    }
}

#[must_use]
pub fn is_colliding(a: &Body, b: &Body) -> bool {
    overlaps(a.pose.position, a.radius, b.pose.position, b.radius)
}

/// Whether an overlap between `mover` and `other` is physically corrected.
/// Robots only push off robots and lights only off lights; food is walked through.
#[must_use]
pub const fn resolves_overlap(mover: EntityKind, other: EntityKind) -> bool {
    matches!(
        (mover, other),
        (EntityKind::Robot, EntityKind::Robot) | (EntityKind::Light, EntityKind::Light)
    )
}

/// Push `mover` away from `other` along the line between their centers until
/// they are `margin` apart. Coincident centers are separated along +x.
pub fn adjust_entity_overlap(mover: &mut Body, other: &Body, margin: f32) {
    let dx = mover.pose.x() - other.pose.x();
    let dy = mover.pose.y() - other.pose.y();
    let distance = (dx * dx + dy * dy).sqrt();
    let (ux, uy) = if distance > f32::EPSILON {
        (dx / distance, dy / distance)
    } else {
        (1.0, 0.0)
    };
    let push = mover.radius + other.radius - distance + margin;
    if push <= 0.0 {
        return;
    }
    mover
        .pose
        .set_position(mover.pose.x() + ux * push, mover.pose.y() + uy * push);
}

/// Robot-to-food proximity test: centers within both radii plus `margin`.
#[must_use]
pub fn within_feeding_range(robot: &Body, food: &Body, margin: f32) -> bool {
    robot.pose.position.distance(food.pose.position) <= robot.radius + food.radius + margin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Pose;

    const W: f32 = 1_024.0;
    const H: f32 = 768.0;

    fn body(x: f32, y: f32, radius: f32) -> Body {
        Body {
            pose: Pose::new(x, y, 0.0),
            radius,
            color: [0, 0, 0],
        }
    }

    #[test]
    fn wall_classification_order() {
        assert_eq!(wall_contact(&body(W - 10.0, 300.0, 10.0), W, H), Some(Wall::Right));
        assert_eq!(wall_contact(&body(10.0, 300.0, 10.0), W, H), Some(Wall::Left));
        assert_eq!(wall_contact(&body(300.0, H - 5.0, 10.0), W, H), Some(Wall::Bottom));
        assert_eq!(wall_contact(&body(300.0, 2.0, 10.0), W, H), Some(Wall::Top));
        // Corner: right wins over bottom.
        assert_eq!(wall_contact(&body(W, H, 10.0), W, H), Some(Wall::Right));
        assert_eq!(wall_contact(&body(300.0, 300.0, 10.0), W, H), None);
    }

    #[test]
    fn wall_adjustment_clears_contact() {
        for (x, y, wall) in [
            (W, 300.0, Wall::Right),
            (-4.0, 300.0, Wall::Left),
            (300.0, H + 3.0, Wall::Bottom),
            (300.0, 0.0, Wall::Top),
        ] {
            let mut b = body(x, y, 12.0);
            assert_eq!(wall_contact(&b, W, H), Some(wall));
            adjust_wall_overlap(&mut b, wall, W, H, 5.0);
            assert_eq!(wall_contact(&b, W, H), None, "{wall:?}");
        }
        let mut b = body(W - 10.0, 300.0, 10.0);
        adjust_wall_overlap(&mut b, Wall::Right, W, H, 5.0);
        assert_eq!(b.pose.x(), W - 15.0);
        assert_eq!(b.pose.y(), 300.0);
    }

    #[test]
    fn entity_adjustment_terminates_overlap() {
        let other = body(100.0, 100.0, 10.0);
        for (x, y) in [(105.0, 100.0), (100.0, 112.0), (93.0, 95.0), (100.0, 100.0)] {
            let mut mover = body(x, y, 10.0);
            assert!(is_colliding(&mover, &other));
            adjust_entity_overlap(&mut mover, &other, 5.0);
            assert!(!is_colliding(&mover, &other), "from ({x}, {y})");
            let gap = mover.pose.position.distance(other.pose.position);
            assert!((gap - 25.0).abs() < 1e-3);
        }
        let mut mover = body(100.0, 100.0, 10.0);
        adjust_entity_overlap(&mut mover, &other, 5.0);
        assert_eq!(mover.pose.y(), 100.0);
        assert!(mover.pose.x() > 100.0);
    }

    #[test]
    fn overlap_gating_by_kind() {
        assert!(resolves_overlap(EntityKind::Robot, EntityKind::Robot));
        assert!(resolves_overlap(EntityKind::Light, EntityKind::Light));
        assert!(!resolves_overlap(EntityKind::Robot, EntityKind::Light));
        assert!(!resolves_overlap(EntityKind::Robot, EntityKind::Food));
        assert!(!resolves_overlap(EntityKind::Light, EntityKind::Robot));
        assert!(!resolves_overlap(EntityKind::Food, EntityKind::Food));
    }

    #[test]
    fn feeding_range_includes_margin() {
        let food = body(200.0, 200.0, 20.0);
        assert!(within_feeding_range(&body(235.0, 200.0, 10.0), &food, 5.0));
        assert!(!within_feeding_range(&body(235.5, 200.0, 10.0), &food, 5.0));
    }
}
