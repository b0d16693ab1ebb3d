//! Direct manipulation of the selected entity: drag moves, rotation steps,
//! and slider-driven scaling with automatic re-grounding.
//!
//! All edits happen in the entity's local frame, so a rotated entity drags
//! along its own axes. Scale edits are absolute against the scale captured at
//! insertion time, never compounded against the current scale.

use crate::render::pick::{intersect_entity, Ray};
use crate::scene::{Axis, EntityRegistry};
use glam::{Vec2, Vec3};

/// Local-space distance applied per drag increment.
pub const MOVE_STEP: f32 = 0.05;
/// One rotation step in radians (a single degree).
pub const ROTATE_STEP: f32 = std::f32::consts::PI / 180.0;

/// Whether vertical pointer motion raises the entity or pushes it in depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveMode {
    /// Vertical pointer motion translates along local Z (into the scene).
    #[default]
    Horizontal,
    /// Vertical pointer motion translates along local Y.
    Vertical,
}

/// Which scale components a slider edit rewrites. The untouched components
/// keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleAxis {
    X,
    Y,
    Z,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    /// Pointer went down on the selection; no motion applied yet.
    Acquired { start: Vec2 },
    Dragging { start: Vec2 },
}

/// Edits the selected entity in place. Owns the gesture state machine but not
/// the selection itself; callers pass the selected name in.
#[derive(Debug, Clone)]
pub struct TransformManipulator {
    pub move_mode: MoveMode,
    pub scale_axis: ScaleAxis,
    pub rotate_axis: Axis,
    state: DragState,
}

impl Default for TransformManipulator {
    fn default() -> Self {
        Self {
            move_mode: MoveMode::default(),
            scale_axis: ScaleAxis::default(),
            rotate_axis: Axis::Y,
            state: DragState::Idle,
        }
    }
}

impl TransformManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Arm a drag gesture. Only the currently selected entity can be dragged,
    /// so a pointer-down on anything else leaves the gesture idle.
    pub fn begin_drag(&mut self, hit: &str, selection: Option<&str>, pointer: Vec2) -> bool {
        if selection == Some(hit) {
            self.state = DragState::Acquired { start: pointer };
            true
        } else {
            self.state = DragState::Idle;
            false
        }
    }

    /// Apply one move increment for a pointer position. In vertical mode all
    /// motion raises or lowers the entity; in horizontal mode the dominant
    /// axis of the delta from the gesture start picks depth or lateral, with
    /// ties counting as depth. Pointer coordinates are normalized device
    /// coordinates (+Y up), the same space picking uses, so the axis choice
    /// is not skewed by the viewport aspect.
    pub fn drag_to(&mut self, pointer: Vec2, selection: Option<&str>, registry: &mut EntityRegistry) {
        let start = match self.state {
            DragState::Acquired { start } | DragState::Dragging { start } => start,
            DragState::Idle => return,
        };
        let Some(entity) = selection.and_then(|name| registry.lookup_mut(name)) else {
            self.state = DragState::Idle;
            return;
        };

        let delta = pointer - start;
        if delta == Vec2::ZERO {
            return;
        }
        self.state = DragState::Dragging { start };

        match self.move_mode {
            MoveMode::Vertical => {
                if delta.y != 0.0 {
                    let amount = if delta.y > 0.0 { MOVE_STEP } else { -MOVE_STEP };
                    entity.transform.translate_local(Vec3::Y, amount);
                }
            }
            MoveMode::Horizontal => {
                if delta.y.abs() >= delta.x.abs() {
                    // Dragging toward the top of the view pushes away.
                    let amount = if delta.y > 0.0 { -MOVE_STEP } else { MOVE_STEP };
                    entity.transform.translate_local(Vec3::Z, amount);
                } else {
                    let amount = if delta.x < 0.0 { -MOVE_STEP } else { MOVE_STEP };
                    entity.transform.translate_local(Vec3::X, amount);
                }
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.state = DragState::Idle;
    }

    /// Drop any gesture in progress (selection changed or was deleted).
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    /// Rotate the selection one degree about its local rotate axis.
    /// `direction` is +1 or -1; other magnitudes still rotate one step in
    /// their sign's direction.
    pub fn rotate_step(
        &self,
        selection: Option<&str>,
        registry: &mut EntityRegistry,
        direction: i32,
    ) {
        if direction == 0 {
            return;
        }
        let Some(entity) = selection.and_then(|name| registry.lookup_mut(name)) else {
            return;
        };
        let angle = ROTATE_STEP * direction.signum() as f32;
        entity.transform.rotate_local(self.rotate_axis.unit(), angle);
    }

    /// Wheel input: scrolling up (negative delta) rotates one way, down the
    /// other. A zero delta does nothing.
    pub fn rotate_wheel(&self, selection: Option<&str>, registry: &mut EntityRegistry, delta_y: f32) {
        if delta_y == 0.0 {
            return;
        }
        let direction = if delta_y < 0.0 { -1 } else { 1 };
        self.rotate_step(selection, registry, direction);
    }

    /// Rewrite the selection's scale to `factor` times its insertion-time
    /// scale on the chosen components, then re-seat it on whatever is below.
    pub fn apply_scale(
        &self,
        selection: Option<&str>,
        registry: &mut EntityRegistry,
        factor: f32,
    ) {
        let Some(name) = selection else {
            return;
        };
        let Some(entity) = registry.lookup_mut(name) else {
            return;
        };

        let baseline = entity.original_scale;
        let mut scale = entity.transform.scale;
        match self.scale_axis {
            ScaleAxis::X => scale.x = baseline.x * factor,
            ScaleAxis::Y => scale.y = baseline.y * factor,
            ScaleAxis::Z => scale.z = baseline.z * factor,
            ScaleAxis::All => scale = baseline * factor,
        }
        entity.transform.scale = scale;

        reground(name, registry);
    }
}

/// Re-seat an entity after a scale change: probe straight down from the
/// bottom of its world box, and only when nothing else lies below, drop it so
/// the box bottom lands on the ground plane.
fn reground(name: &str, registry: &mut EntityRegistry) {
    let Some(bounds) = registry.lookup(name).and_then(|e| e.world_bounds()) else {
        return;
    };
    let center = bounds.center();
    let probe = Ray {
        origin: Vec3::new(center.x, bounds.min.y, center.z),
        direction: Vec3::NEG_Y,
    };

    let blocked = registry
        .iter()
        .filter(|other| other.name != name)
        .any(|other| intersect_entity(&probe, other).is_some());
    if blocked {
        return;
    }

    if let Some(entity) = registry.lookup_mut(name) {
        entity.transform.position.y -= bounds.min.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{unit_box, Entity, EntityKind, MeshPart, Transform};

    fn registry_with(name: &str) -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        registry.insert(box_entity(name), name);
        registry
    }

    fn box_entity(name: &str) -> Entity {
        Entity::new(
            name,
            EntityKind::SingleMesh {
                part: MeshPart {
                    name: name.to_string(),
                    local_bounds: unit_box(),
                },
            },
            Transform::default(),
        )
    }

    #[test]
    fn drag_requires_hit_to_match_selection() {
        let mut manipulator = TransformManipulator::new();
        assert!(!manipulator.begin_drag("desk", Some("chair"), Vec2::ZERO));
        assert!(manipulator.begin_drag("chair", Some("chair"), Vec2::ZERO));
        assert!(!manipulator.begin_drag("chair", None, Vec2::ZERO));
    }

    #[test]
    fn horizontal_drag_up_pushes_into_depth() {
        let mut registry = registry_with("desk");
        let mut manipulator = TransformManipulator::new();
        manipulator.begin_drag("desk", Some("desk"), Vec2::ZERO);
        manipulator.drag_to(Vec2::new(0.01, 0.4), Some("desk"), &mut registry);
        let entity = registry.lookup("desk").unwrap();
        assert!((entity.transform.position.z + MOVE_STEP).abs() < 1e-6);
    }

    #[test]
    fn vertical_mode_raises_instead() {
        let mut registry = registry_with("desk");
        let mut manipulator = TransformManipulator::new();
        manipulator.move_mode = MoveMode::Vertical;
        manipulator.begin_drag("desk", Some("desk"), Vec2::ZERO);
        manipulator.drag_to(Vec2::new(0.0, 0.4), Some("desk"), &mut registry);
        let entity = registry.lookup("desk").unwrap();
        assert!((entity.transform.position.y - MOVE_STEP).abs() < 1e-6);
        assert_eq!(entity.transform.position.z, 0.0);
    }

    #[test]
    fn lateral_drag_moves_along_local_x() {
        let mut registry = registry_with("desk");
        // Yaw the entity so local X no longer matches world X.
        registry.lookup_mut("desk").unwrap().transform.rotation.y = std::f32::consts::FRAC_PI_2;
        let mut manipulator = TransformManipulator::new();
        manipulator.begin_drag("desk", Some("desk"), Vec2::ZERO);
        manipulator.drag_to(Vec2::new(0.3, 0.02), Some("desk"), &mut registry);
        let entity = registry.lookup("desk").unwrap();
        assert!(entity.transform.position.x.abs() < 1e-6);
        assert!((entity.transform.position.z + MOVE_STEP).abs() < 1e-6);
    }

    #[test]
    fn vertical_mode_captures_lateral_motion_too() {
        let mut registry = registry_with("desk");
        let mut manipulator = TransformManipulator::new();
        manipulator.move_mode = MoveMode::Vertical;
        manipulator.begin_drag("desk", Some("desk"), Vec2::ZERO);
        manipulator.drag_to(Vec2::new(0.4, -0.05), Some("desk"), &mut registry);
        let entity = registry.lookup("desk").unwrap();
        assert_eq!(entity.transform.position.x, 0.0);
        assert!((entity.transform.position.y + MOVE_STEP).abs() < 1e-6);
    }

    #[test]
    fn pointer_up_returns_to_idle() {
        let mut registry = registry_with("desk");
        let mut manipulator = TransformManipulator::new();
        manipulator.begin_drag("desk", Some("desk"), Vec2::ZERO);
        manipulator.drag_to(Vec2::new(0.0, 0.2), Some("desk"), &mut registry);
        assert!(manipulator.is_dragging());
        manipulator.end_drag();
        assert!(!manipulator.is_dragging());
        let before = registry.lookup("desk").unwrap().transform.position;
        manipulator.drag_to(Vec2::new(0.0, 0.4), Some("desk"), &mut registry);
        assert_eq!(registry.lookup("desk").unwrap().transform.position, before);
    }

    #[test]
    fn drag_without_begin_is_inert() {
        let mut registry = registry_with("desk");
        let mut manipulator = TransformManipulator::new();
        manipulator.drag_to(Vec2::new(0.5, 0.5), Some("desk"), &mut registry);
        assert_eq!(registry.lookup("desk").unwrap().transform.position, Vec3::ZERO);
    }

    #[test]
    fn wheel_direction_maps_to_rotation_sign() {
        let mut registry = registry_with("lamp");
        let manipulator = TransformManipulator::new();
        manipulator.rotate_wheel(Some("lamp"), &mut registry, -120.0);
        assert!((registry.lookup("lamp").unwrap().transform.rotation.y + ROTATE_STEP).abs() < 1e-6);
        manipulator.rotate_wheel(Some("lamp"), &mut registry, 120.0);
        manipulator.rotate_wheel(Some("lamp"), &mut registry, 120.0);
        assert!((registry.lookup("lamp").unwrap().transform.rotation.y - ROTATE_STEP).abs() < 1e-5);
    }

    #[test]
    fn scale_is_absolute_against_original() {
        let mut registry = registry_with("table");
        let manipulator = TransformManipulator::new();
        manipulator.apply_scale(Some("table"), &mut registry, 2.0);
        manipulator.apply_scale(Some("table"), &mut registry, 2.0);
        // Two applications of x2 still give x2, not x4.
        assert_eq!(registry.lookup("table").unwrap().transform.scale, Vec3::splat(2.0));
    }

    #[test]
    fn single_axis_scale_keeps_other_components() {
        let mut registry = registry_with("table");
        let mut manipulator = TransformManipulator::new();
        manipulator.scale_axis = ScaleAxis::All;
        manipulator.apply_scale(Some("table"), &mut registry, 3.0);
        manipulator.scale_axis = ScaleAxis::Y;
        manipulator.apply_scale(Some("table"), &mut registry, 1.5);
        let scale = registry.lookup("table").unwrap().transform.scale;
        assert_eq!(scale.x, 3.0);
        assert_eq!(scale.y, 1.5);
        assert_eq!(scale.z, 3.0);
    }

    #[test]
    fn scaled_entity_drops_back_to_ground() {
        let mut registry = registry_with("crate");
        registry.lookup_mut("crate").unwrap().transform.position.y = 4.0;
        let manipulator = TransformManipulator::new();
        manipulator.apply_scale(Some("crate"), &mut registry, 1.0);
        let entity = registry.lookup("crate").unwrap();
        let bounds = entity.world_bounds().unwrap();
        assert!(bounds.min.y.abs() < 1e-5);
    }

    #[test]
    fn reground_skips_when_something_is_below() {
        let mut registry = EntityRegistry::new();
        registry.insert(box_entity("shelf"), "shelf");
        let mut lamp = box_entity("lamp");
        lamp.transform.position.y = 3.0;
        registry.insert(lamp, "lamp");
        let manipulator = TransformManipulator::new();
        manipulator.apply_scale(Some("lamp"), &mut registry, 1.0);
        // The shelf sits underneath, so the lamp keeps its height.
        assert_eq!(registry.lookup("lamp").unwrap().transform.position.y, 3.0);
    }
}
