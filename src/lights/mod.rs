//! Fixed rig of directional lights.
//!
//! Each light records the position it was constructed with and applies a
//! replaceable per-axis offset on top, so a slider can always compute an
//! absolute position as baseline + offset without drift across edits.

use crate::scene::Axis;
use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Position assigned at rig construction. Never mutated afterwards.
    pub baseline_position: Vec3,
    /// Per-axis runtime offset; setting an axis replaces its component.
    pub runtime_offset: Vec3,
    pub rotation: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
    pub enabled: bool,
    /// Debug helper gizmo for this light, independent of `enabled`.
    pub helper_visible: bool,
}

impl Light {
    pub fn directional(baseline_position: Vec3) -> Self {
        Self {
            baseline_position,
            runtime_offset: Vec3::ZERO,
            rotation: Vec3::ZERO,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            enabled: true,
            helper_visible: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.baseline_position + self.runtime_offset
    }

    /// Replace (not add to) the offset on one axis.
    pub fn set_offset(&mut self, axis: Axis, amount: f32) {
        match axis {
            Axis::X => self.runtime_offset.x = amount,
            Axis::Y => self.runtime_offset.y = amount,
            Axis::Z => self.runtime_offset.z = amount,
        }
    }
}

/// The scene's set of directional lights. Rebuilt wholesale on project load;
/// no incremental light editing survives an import.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    lights: Vec<Light>,
    helpers_visible: bool,
}

impl Default for LightRig {
    /// The five-light default arrangement: one overhead, four flanking.
    fn default() -> Self {
        let baselines = [
            Vec3::new(0.0, 80.0, 0.0),
            Vec3::new(0.0, 50.0, 20.0),
            Vec3::new(0.0, 50.0, -20.0),
            Vec3::new(20.0, 50.0, 0.0),
            Vec3::new(-20.0, 50.0, 0.0),
        ];
        Self {
            lights: baselines.into_iter().map(Light::directional).collect(),
            helpers_visible: false,
        }
    }
}

impl LightRig {
    pub fn from_lights(lights: Vec<Light>) -> Self {
        Self {
            lights,
            helpers_visible: false,
        }
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.lights.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn helpers_visible(&self) -> bool {
        self.helpers_visible
    }

    /// Toggle the rig's debug gizmos. Only enabled lights show theirs.
    pub fn set_helpers_visible(&mut self, visible: bool) {
        self.helpers_visible = visible;
        for light in &mut self.lights {
            light.helper_visible = visible && light.enabled;
        }
    }
}
