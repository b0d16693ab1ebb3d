//! Scene data model: transforms, placed entities, and the name registry.
//!
//! The registry is the single source of truth for "what is placed". The
//! rendering engine mirrors it but is never authoritative; everything the
//! serializer exports and the manipulator edits lives here.

pub mod grid;
pub mod serialization;

use crate::poster::PosterState;
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::collections::HashMap;

/// World axis selector shared by light offsets and rotation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Axis-aligned box in whatever space its points live in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb.min = aabb.min.min(p);
            aabb.max = aabb.max.max(p);
        }
        Some(aabb)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// The box transformed into another space, re-aligned to the axes.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self::from_points(self.corners().map(|c| matrix.transform_point3(c))).unwrap_or(*self)
    }
}

/// Position / Euler rotation (radians, XYZ order) / scale, the editable unit
/// the manipulator works on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }

    /// Translate along one of the entity's own axes, so a rotated entity
    /// moves in its rotated frame rather than along world axes.
    pub fn translate_local(&mut self, axis: Vec3, amount: f32) {
        self.position += self.rotation_quat() * (axis * amount);
    }

    /// Compose a local-axis rotation with the current orientation.
    pub fn rotate_local(&mut self, axis: Vec3, angle: f32) {
        let composed = self.rotation_quat() * Quat::from_axis_angle(axis, angle);
        let (x, y, z) = composed.to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
    }
}

/// One rigid pickable sub-part as delivered by the asset loader.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    pub name: String,
    pub local_bounds: Aabb,
}

/// A single playback handle for one animation clip, independently pausable.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackHandle {
    pub clip: String,
    pub paused: bool,
    pub time: f32,
}

impl PlaybackHandle {
    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            clip: clip.into(),
            paused: false,
            time: 0.0,
        }
    }
}

/// Kind tag plus kind-specific payload; dispatch on placement behavior is
/// explicit rather than inferred from names.
#[derive(Debug, Clone)]
pub enum EntityKind {
    SingleMesh {
        part: MeshPart,
    },
    Group {
        parts: Vec<MeshPart>,
        /// Sub-part name -> playback handles for that part's clips.
        animations: HashMap<String, Vec<PlaybackHandle>>,
    },
    Poster {
        state: PosterState,
        part: MeshPart,
    },
    Wall {
        part: MeshPart,
    },
    Floor {
        part: MeshPart,
    },
}

/// A placed, selectable thing in the scene.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique registry key. Assigned by [`EntityRegistry::insert`].
    pub name: String,
    /// Human-readable source name (asset base name); not unique.
    pub display_name: String,
    pub kind: EntityKind,
    pub transform: Transform,
    /// Scale at insertion time; the baseline for relative scale edits.
    pub original_scale: Vec3,
    /// Single tint shared by all sub-parts (groups keep one uniform color).
    pub color: Option<[f32; 3]>,
    pub helper_axes_visible: bool,
}

impl Entity {
    pub fn new(display_name: impl Into<String>, kind: EntityKind, transform: Transform) -> Self {
        let display_name = display_name.into();
        Self {
            name: display_name.clone(),
            display_name,
            kind,
            original_scale: transform.scale,
            transform,
            color: None,
            helper_axes_visible: false,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, EntityKind::Group { .. })
    }

    pub fn is_poster(&self) -> bool {
        matches!(self.kind, EntityKind::Poster { .. })
    }

    pub fn parts(&self) -> &[MeshPart] {
        match &self.kind {
            EntityKind::SingleMesh { part }
            | EntityKind::Poster { part, .. }
            | EntityKind::Wall { part }
            | EntityKind::Floor { part } => std::slice::from_ref(part),
            EntityKind::Group { parts, .. } => parts,
        }
    }

    /// World-space bounds over all sub-parts, or None for degenerate entities.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let matrix = self.transform.matrix();
        let mut bounds: Option<Aabb> = None;
        for part in self.parts() {
            let world = part.local_bounds.transformed(&matrix);
            bounds = Some(match bounds {
                Some(acc) => Aabb::new(acc.min.min(world.min), acc.max.max(world.max)),
                None => world,
            });
        }
        bounds
    }
}

struct RegistryEntry {
    entity: Entity,
    /// Last suffix handed out for collisions on this base name. Monotone,
    /// never reset, so freed suffixes are not reused.
    counter: u32,
}

/// The authoritative name -> entity map.
#[derive(Default)]
pub struct EntityRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entity` under `base_name`, suffixing with the base entry's
    /// collision counter when the name is taken. Returns the final key.
    pub fn insert(&mut self, mut entity: Entity, base_name: &str) -> String {
        let final_name = if let Some(mut counter) = self.entries.get(base_name).map(|e| e.counter)
        {
            let candidate = loop {
                counter += 1;
                let candidate = format!("{}{}", base_name, counter);
                if !self.entries.contains_key(&candidate) {
                    break candidate;
                }
            };
            if let Some(entry) = self.entries.get_mut(base_name) {
                entry.counter = counter;
            }
            candidate
        } else {
            base_name.to_string()
        };
        entity.name = final_name.clone();
        self.entries
            .insert(final_name.clone(), RegistryEntry { entity, counter: 0 });
        final_name
    }

    /// No-op when the name is absent.
    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub fn lookup(&self, name: &str) -> Option<&Entity> {
        self.entries.get(name).map(|entry| &entry.entity)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entries.get_mut(name).map(|entry| &mut entry.entity)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values().map(|entry| &entry.entity)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entries.values_mut().map(|entry| &mut entry.entity)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

/// A one-unit cube centered on the origin, used where an entity needs
/// stand-in geometry.
pub fn unit_box() -> Aabb {
    Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))
}
