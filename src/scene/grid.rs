//! Helper grid layout and wall/floor stamping.
//!
//! The grids are non-selectable picking occluders outlining the default
//! floor plan: two floor panels and four wall panels. Walls and floors are
//! real entities stamped onto the matching grid slots.

use crate::scene::{Aabb, Transform};
use glam::Vec3;

pub const WALL_COLOR: [f32; 3] = [0.965, 0.690, 0.573];
pub const FLOOR_COLOR: [f32; 3] = [0.918, 0.867, 0.792];

/// Half-extent of one grid panel before its 2x scale.
const GRID_HALF: f32 = 5.0;
/// Half-extent of a stamped wall/floor panel.
const PANEL_HALF: f32 = 10.0;

/// Non-selectable helper geometry attached to the scene for picking only.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperPanel {
    pub name: String,
    pub transform: Transform,
    pub bounds: Aabb,
}

impl HelperPanel {
    pub fn is_wall_slot(&self) -> bool {
        self.name.contains("wall")
    }

    pub fn is_floor_slot(&self) -> bool {
        self.name.contains("floor")
    }
}

/// Grid geometry lies in the local XZ plane, near-zero thickness in Y.
fn grid_bounds() -> Aabb {
    Aabb::new(
        Vec3::new(-GRID_HALF, -0.01, -GRID_HALF),
        Vec3::new(GRID_HALF, 0.01, GRID_HALF),
    )
}

/// Stamped panels lie in the local XY plane, near-zero thickness in Z.
pub fn panel_bounds() -> Aabb {
    Aabb::new(
        Vec3::new(-PANEL_HALF, -PANEL_HALF, -0.01),
        Vec3::new(PANEL_HALF, PANEL_HALF, 0.01),
    )
}

fn grid_panel(name: &str, build: impl FnOnce(&mut Transform)) -> HelperPanel {
    let mut transform = Transform {
        scale: Vec3::splat(2.0),
        ..Transform::default()
    };
    build(&mut transform);
    HelperPanel {
        name: name.to_string(),
        transform,
        bounds: grid_bounds(),
    }
}

/// The default two-room floor plan: an L of floor grids with walls along the
/// back and sides. Rotations and translations compose in local space, in the
/// order the plan was authored.
pub fn floor_plan() -> Vec<HelperPanel> {
    let quarter = std::f32::consts::FRAC_PI_2;
    vec![
        grid_panel("floorgrid", |_| {}),
        grid_panel("wallgrid", |t| {
            t.rotate_local(Vec3::X, quarter);
            t.translate_local(Vec3::Z, -10.0);
            t.translate_local(Vec3::Y, -10.0);
        }),
        grid_panel("wallgrid", |t| {
            t.rotate_local(Vec3::X, quarter);
            t.rotate_local(Vec3::Z, quarter);
            t.translate_local(Vec3::Z, -10.0);
            t.translate_local(Vec3::Y, -30.0);
        }),
        grid_panel("wallgrid", |t| {
            t.rotate_local(Vec3::X, quarter);
            t.rotate_local(Vec3::Z, quarter);
            t.translate_local(Vec3::Z, -10.0);
            t.translate_local(Vec3::Y, 10.0);
        }),
        grid_panel("floorgrid", |t| {
            t.translate_local(Vec3::X, 20.0);
        }),
        grid_panel("wallgrid", |t| {
            t.rotate_local(Vec3::X, quarter);
            t.translate_local(Vec3::X, 20.0);
            t.translate_local(Vec3::Z, -10.0);
            t.translate_local(Vec3::Y, -10.0);
        }),
    ]
}

/// Placement for a panel stamped onto a grid slot: the slot's position and
/// orientation with an extra quarter turn to face into the room.
pub fn stamp_transform(slot: &HelperPanel) -> Transform {
    let mut transform = Transform {
        position: slot.transform.position,
        rotation: slot.transform.rotation,
        scale: Vec3::ONE,
    };
    transform.rotate_local(Vec3::X, std::f32::consts::FRAC_PI_2);
    transform
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_plan_has_expected_slot_mix() {
        let panels = floor_plan();
        assert_eq!(panels.len(), 6);
        assert_eq!(panels.iter().filter(|p| p.is_floor_slot()).count(), 2);
        assert_eq!(panels.iter().filter(|p| p.is_wall_slot()).count(), 4);
    }

    #[test]
    fn all_panels_are_helper_named() {
        for panel in floor_plan() {
            assert!(panel.name.contains("grid"));
        }
    }

    #[test]
    fn second_floor_grid_sits_beside_first() {
        let panels = floor_plan();
        let second_floor = &panels[4];
        assert!((second_floor.transform.position.x - 20.0).abs() < 1e-4);
    }

    #[test]
    fn stamp_keeps_slot_position() {
        let panels = floor_plan();
        let wall = panels.iter().find(|p| p.is_wall_slot()).unwrap();
        let stamped = stamp_transform(wall);
        assert_eq!(stamped.position, wall.transform.position);
        assert_eq!(stamped.scale, Vec3::ONE);
    }
}
