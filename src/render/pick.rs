//! Ray picking.
//!
//! A pointer position becomes a world ray (see [`crate::render::camera`]),
//! the ray is tested against every sub-part of every registered entity plus
//! the non-selectable helper grids, and the nearest selectable hit wins.
//! Sub-parts of a group always resolve to the group, never the part.

use crate::render::camera::CameraController;
use crate::scene::grid::HelperPanel;
use crate::scene::{Aabb, Entity, EntityRegistry};
use glam::{Mat4, Vec2, Vec3};
use std::time::{Duration, Instant};

/// Wireframe-flash feedback window after a successful pick.
pub const FLASH_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    /// Registry key of the picked entity (the group when a sub-part was hit).
    pub entity: String,
    /// Name of the sub-part the ray actually struck.
    pub part: String,
    pub distance: f32,
}

/// Names that mark non-selectable helper geometry.
fn is_helper_name(name: &str) -> bool {
    name.contains("grid") || name.contains("axes")
}

/// Slab test against an axis-aligned box. Returns the nearest non-negative
/// hit parameter along the ray.
pub fn ray_aabb(origin: Vec3, direction: Vec3, bounds: &Aabb) -> Option<f32> {
    let mut tmin = f32::NEG_INFINITY;
    let mut tmax = f32::INFINITY;

    for i in 0..3 {
        let dir_i = direction[i];
        let origin_i = origin[i];
        if dir_i.abs() < 1e-8 {
            if origin_i < bounds.min[i] || origin_i > bounds.max[i] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir_i;
        let mut t1 = (bounds.min[i] - origin_i) * inv;
        let mut t2 = (bounds.max[i] - origin_i) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        tmin = tmin.max(t1);
        tmax = tmax.min(t2);
        if tmin > tmax {
            return None;
        }
    }

    if tmax < 0.0 {
        None
    } else if tmin >= 0.0 {
        Some(tmin)
    } else {
        Some(tmax)
    }
}

/// Intersect a world ray with a box given in a local frame. The ray is taken
/// into local space so rotated boxes are tested exactly, and the result is
/// the world-space distance to the hit.
pub fn ray_aabb_world(ray: &Ray, world_from_local: &Mat4, bounds: &Aabb) -> Option<f32> {
    let local_from_world = world_from_local.inverse();
    if !local_from_world.is_finite() {
        return None;
    }
    let local_origin = local_from_world.transform_point3(ray.origin);
    let local_dir = local_from_world
        .transform_vector3(ray.direction)
        .normalize_or_zero();
    if local_dir == Vec3::ZERO {
        return None;
    }
    let t = ray_aabb(local_origin, local_dir, bounds)?;
    let world_hit = world_from_local.transform_point3(local_origin + local_dir * t);
    Some(world_hit.distance(ray.origin))
}

/// Nearest hit parameter of a world ray against any sub-part of one entity.
pub fn intersect_entity(ray: &Ray, entity: &Entity) -> Option<f32> {
    let matrix = entity.transform.matrix();
    let mut best: Option<f32> = None;
    for part in entity.parts() {
        if let Some(t) = ray_aabb_world(ray, &matrix, &part.local_bounds) {
            if best.map(|b| t < b).unwrap_or(true) {
                best = Some(t);
            }
        }
    }
    best
}

struct Candidate {
    distance: f32,
    entity: Option<String>,
    part: String,
}

/// Resolve a pointer position to the topmost selectable entity.
///
/// Helper geometry (grids, helper axes) is intersected but skipped, so a
/// grid in front of an entity does not block selecting it, while an entity
/// in front of a grid still wins on distance.
pub fn pick(
    camera: &CameraController,
    pointer_ndc: Vec2,
    aspect: f32,
    registry: &EntityRegistry,
    helpers: &[HelperPanel],
) -> Option<PickHit> {
    let ray = camera.screen_ray(pointer_ndc, aspect);
    let mut candidates: Vec<Candidate> = Vec::new();

    for entity in registry.iter() {
        let matrix = entity.transform.matrix();
        for part in entity.parts() {
            if let Some(distance) = ray_aabb_world(&ray, &matrix, &part.local_bounds) {
                candidates.push(Candidate {
                    distance,
                    entity: Some(entity.name.clone()),
                    part: part.name.clone(),
                });
            }
        }
    }
    for helper in helpers {
        let matrix = helper.transform.matrix();
        if let Some(distance) = ray_aabb_world(&ray, &matrix, &helper.bounds) {
            candidates.push(Candidate {
                distance,
                entity: None,
                part: helper.name.clone(),
            });
        }
    }

    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    for candidate in candidates {
        if is_helper_name(&candidate.part) {
            continue;
        }
        let Some(entity) = candidate.entity else {
            continue;
        };
        return Some(PickHit {
            entity,
            part: candidate.part,
            distance: candidate.distance,
        });
    }
    None
}

/// One-shot cosmetic feedback: the picked material renders as wireframe until
/// the window elapses. Never awaited by manipulation logic.
#[derive(Debug, Clone)]
pub struct FlashFeedback {
    pub entity: String,
    expires_at: Instant,
}

impl FlashFeedback {
    pub fn schedule(entity: impl Into<String>, now: Instant) -> Self {
        Self {
            entity: entity.into(),
            expires_at: now + FLASH_DURATION,
        }
    }

    pub fn active(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}
