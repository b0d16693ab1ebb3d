//! The designer session: one value owning the registry, selection, light
//! rig, camera, gesture state, and the asynchronous load queue.
//!
//! Pointer input arrives in window pixels; the session converts to
//! normalized device coordinates itself using the current viewport.

use crate::assets::{AssetError, EntityTree, LoadQueue, LoadTicket, ModelCatalog, PlacementParams};
use crate::lights::{Light, LightRig};
use crate::manipulate::TransformManipulator;
use crate::poster::{PosterImage, PosterState, DEFAULT_POSTER_IMAGE};
use crate::render::camera::CameraController;
use crate::render::pick::{self, FlashFeedback};
use crate::scene::grid::{self, HelperPanel, FLOOR_COLOR, WALL_COLOR};
use crate::scene::serialization::{self, EntityRecord, ProjectError, ProjectRecord};
use crate::scene::{
    Aabb, Axis, Entity, EntityKind, EntityRegistry, MeshPart, PlaybackHandle, Transform,
};
use glam::{Vec2, Vec3};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Poster quad dimensions (width x height) in scene units.
const POSTER_WIDTH: f32 = 10.0;
const POSTER_HEIGHT: f32 = 13.0;

pub struct Session {
    pub registry: EntityRegistry,
    pub rig: LightRig,
    pub manipulator: TransformManipulator,
    pub camera: CameraController,
    pub loads: LoadQueue,
    catalog: ModelCatalog,
    helpers: Vec<HelperPanel>,
    selection: Option<String>,
    flash: Option<FlashFeedback>,
    walls_added: bool,
    floors_added: bool,
    viewport: Vec2,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            registry: EntityRegistry::new(),
            rig: LightRig::default(),
            manipulator: TransformManipulator::new(),
            camera: CameraController::room_overview(),
            loads: LoadQueue::new(),
            catalog: ModelCatalog::default(),
            helpers: grid::floor_plan(),
            selection: None,
            flash: None,
            walls_added: false,
            floors_added: false,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn helpers(&self) -> &[HelperPanel] {
        &self.helpers
    }

    pub fn flash_active(&self, now: Instant) -> bool {
        self.flash.as_ref().map(|f| f.active(now)).unwrap_or(false)
    }

    fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    fn to_ndc(&self, pixel: Vec2) -> Vec2 {
        Vec2::new(
            (pixel.x / self.viewport.x) * 2.0 - 1.0,
            -((pixel.y / self.viewport.y) * 2.0 - 1.0),
        )
    }

    /// Pointer press. A press on the current selection arms a drag; a press
    /// on anything else re-selects (or deselects on empty space).
    pub fn pointer_down(&mut self, pixel: Vec2, now: Instant) {
        let ndc = self.to_ndc(pixel);
        let hit = pick::pick(&self.camera, ndc, self.aspect(), &self.registry, &self.helpers);

        match hit {
            Some(hit) => {
                if self.selection.as_deref() == Some(hit.entity.as_str()) {
                    let selection = self.selection.clone();
                    self.manipulator
                        .begin_drag(&hit.entity, selection.as_deref(), ndc);
                } else {
                    log::info!("selected '{}' (part '{}')", hit.entity, hit.part);
                    self.selection = Some(hit.entity.clone());
                    self.manipulator.reset();
                }
                // Every successful pick flashes, re-picks included.
                self.flash = Some(FlashFeedback::schedule(hit.entity, now));
            }
            // A miss leaves the current selection alone.
            None => self.manipulator.reset(),
        }
    }

    pub fn pointer_move(&mut self, pixel: Vec2) {
        let ndc = self.to_ndc(pixel);
        let selection = self.selection.clone();
        self.manipulator
            .drag_to(ndc, selection.as_deref(), &mut self.registry);
    }

    pub fn pointer_up(&mut self) {
        self.manipulator.end_drag();
    }

    pub fn rotate_step(&mut self, direction: i32) {
        let selection = self.selection.clone();
        self.manipulator
            .rotate_step(selection.as_deref(), &mut self.registry, direction);
    }

    pub fn rotate_wheel(&mut self, delta_y: f32) {
        let selection = self.selection.clone();
        self.manipulator
            .rotate_wheel(selection.as_deref(), &mut self.registry, delta_y);
    }

    pub fn set_scale(&mut self, factor: f32) {
        let selection = self.selection.clone();
        self.manipulator
            .apply_scale(selection.as_deref(), &mut self.registry, factor);
    }

    /// Tint the selection. Groups take one uniform color across all parts.
    pub fn set_color(&mut self, color: [f32; 3]) {
        let Some(name) = self.selection.clone() else {
            return;
        };
        if let Some(entity) = self.registry.lookup_mut(&name) {
            entity.color = Some(color);
        }
    }

    /// Remove an entity by name. The name must match the current selection;
    /// anything else is refused so a stale delete request cannot take out an
    /// entity the user is no longer looking at.
    pub fn delete_entity(&mut self, name: &str) {
        if self.selection.as_deref() != Some(name) {
            log::warn!("refusing to delete '{}': not the current selection", name);
            return;
        }
        self.registry.remove(name);
        self.selection = None;
        self.manipulator.reset();
        log::info!("deleted '{}'", name);
    }

    pub fn toggle_helper_axes(&mut self) {
        let Some(name) = self.selection.clone() else {
            return;
        };
        if let Some(entity) = self.registry.lookup_mut(&name) {
            entity.helper_axes_visible = !entity.helper_axes_visible;
        }
    }

    pub fn toggle_light_helpers(&mut self) {
        let visible = !self.rig.helpers_visible();
        self.rig.set_helpers_visible(visible);
    }

    pub fn set_light_offset(&mut self, index: usize, axis: Axis, amount: f32) {
        if let Some(light) = self.rig.light_mut(index) {
            light.set_offset(axis, amount);
        }
    }

    /// Place a poster with the default image and select it.
    pub fn add_poster(&mut self) -> String {
        let poster = poster_entity(
            PosterImage::Static(DEFAULT_POSTER_IMAGE.to_string()),
            Transform::default(),
        );
        let name = self.registry.insert(poster, "poster");
        self.selection = Some(name.clone());
        self.manipulator.reset();
        log::info!("added poster '{}'", name);
        name
    }

    /// Replace the selected poster's image. No-op on non-poster selections.
    pub fn set_poster_image(&mut self, image: PosterImage) {
        let Some(name) = self.selection.clone() else {
            return;
        };
        if let Some(entity) = self.registry.lookup_mut(&name) {
            if let EntityKind::Poster { state, .. } = &mut entity.kind {
                state.image = image;
                state.needs_frame_update = true;
            }
        }
    }

    /// Stamp wall panels onto every wall grid slot. Idempotent.
    pub fn add_walls(&mut self) {
        if self.walls_added {
            return;
        }
        self.walls_added = true;
        let slots: Vec<Transform> = self
            .helpers
            .iter()
            .filter(|panel| panel.is_wall_slot())
            .map(grid::stamp_transform)
            .collect();
        for transform in slots {
            let mut wall = Entity::new(
                "wall",
                EntityKind::Wall {
                    part: MeshPart {
                        name: "wall".to_string(),
                        local_bounds: grid::panel_bounds(),
                    },
                },
                transform,
            );
            wall.color = Some(WALL_COLOR);
            self.registry.insert(wall, "wall");
        }
        log::info!("stamped wall panels");
    }

    /// Stamp floor panels onto every floor grid slot. Idempotent.
    pub fn add_floors(&mut self) {
        if self.floors_added {
            return;
        }
        self.floors_added = true;
        let slots: Vec<Transform> = self
            .helpers
            .iter()
            .filter(|panel| panel.is_floor_slot())
            .map(grid::stamp_transform)
            .collect();
        for transform in slots {
            let mut floor = Entity::new(
                "floor",
                EntityKind::Floor {
                    part: MeshPart {
                        name: "floor".to_string(),
                        local_bounds: grid::panel_bounds(),
                    },
                },
                transform,
            );
            floor.color = Some(FLOOR_COLOR);
            self.registry.insert(floor, "floor");
        }
        log::info!("stamped floor panels");
    }

    /// File a load request for a catalog model. Unknown names are refused.
    pub fn request_model(&mut self, model: &str, params: PlacementParams) -> Option<LoadTicket> {
        if !self.catalog.is_known(model) {
            log::warn!("unknown model '{}', request dropped", model);
            return None;
        }
        Some(self.loads.request(model, params))
    }

    /// Fold finished loads into the scene. Successful loads become entities
    /// (selected as they arrive); failures are logged and dropped.
    pub fn pump_loads(&mut self) {
        for (request, result) in self.loads.drain_completed() {
            match result {
                Ok(tree) => {
                    let entity = entity_from_tree(tree, &request.params);
                    let name = self.registry.insert(entity, &request.model);
                    log::info!("placed '{}' from load ticket {}", name, request.ticket);
                    self.selection = Some(name);
                    self.manipulator.reset();
                }
                Err(err) => {
                    log::warn!("load of '{}' failed: {}", request.model, err);
                }
            }
        }
    }

    /// Advance per-frame state: playback clocks, animated poster refresh
    /// flags, and the selection flash.
    pub fn tick(&mut self, dt: f32, now: Instant) {
        for entity in self.registry.iter_mut() {
            match &mut entity.kind {
                EntityKind::Group { animations, .. } => {
                    for handle in animations.values_mut().flatten() {
                        if !handle.paused {
                            handle.time += dt;
                        }
                    }
                }
                EntityKind::Poster { state, .. } => {
                    state.needs_frame_update = state.image.is_animated();
                }
                _ => {}
            }
        }
        if let Some(flash) = &self.flash {
            if !flash.active(now) {
                self.flash = None;
            }
        }
    }

    pub fn export_records(&self) -> Vec<ProjectRecord> {
        serialization::export_records(&self.registry, &self.rig)
    }

    pub fn save_project(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        serialization::save_records_to_file(&self.export_records(), path)
    }

    /// Load a project file. Read and parse errors abort before any session
    /// state is touched.
    pub fn load_project(&mut self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let records = serialization::load_records_from_file(path)?;
        self.import_records(records);
        Ok(())
    }

    /// Replace the whole scene with a parsed project document. The previous
    /// registry, selection, gesture, rig, and in-flight loads are discarded.
    pub fn import_records(&mut self, records: Vec<ProjectRecord>) {
        self.registry.clear();
        self.selection = None;
        self.manipulator.reset();
        self.loads.clear();
        self.flash = None;
        self.walls_added = false;
        self.floors_added = false;

        let mut lights: Vec<Light> = Vec::new();
        for record in records {
            match record {
                ProjectRecord::Light(light) => {
                    lights.push(Light {
                        baseline_position: light.position.into(),
                        runtime_offset: Vec3::ZERO,
                        rotation: light.rotation.into(),
                        color: light.color.into(),
                        intensity: light.intensity,
                        enabled: light.enabled,
                        helper_visible: false,
                    });
                }
                ProjectRecord::Entity(entity) => self.import_entity(entity),
            }
        }
        self.rig = if lights.is_empty() {
            LightRig::default()
        } else {
            LightRig::from_lights(lights)
        };
    }

    fn import_entity(&mut self, record: EntityRecord) {
        let base = base_name(&record.name);
        let transform = record_transform(&record);
        let color = record.color.map(Into::into);

        if base == "poster" {
            let image = match record.image {
                Some(payload) => poster_image_from_payload(payload),
                None => PosterImage::Static(DEFAULT_POSTER_IMAGE.to_string()),
            };
            let mut poster = poster_entity(image, transform);
            poster.color = color;
            self.registry.insert(poster, "poster");
            return;
        }

        if base == "wall" || base == "floor" {
            let part = MeshPart {
                name: base.to_string(),
                local_bounds: grid::panel_bounds(),
            };
            let kind = if base == "wall" {
                self.walls_added = true;
                EntityKind::Wall { part }
            } else {
                self.floors_added = true;
                EntityKind::Floor { part }
            };
            let mut panel = Entity::new(base, kind, transform);
            panel.color = color.or(Some(if base == "wall" {
                WALL_COLOR
            } else {
                FLOOR_COLOR
            }));
            self.registry.insert(panel, base);
            return;
        }

        if let Some(model) = catalog_base(&self.catalog, &record.name) {
            let params = PlacementParams {
                position: Some(transform.position),
                rotation: Some(transform.rotation),
                scale: Some(transform.scale),
                color,
            };
            self.loads.request(model, params);
        } else {
            log::warn!("skipping unknown entity record '{}'", record.name);
        }
    }
}

/// Resolve a registry key back to its catalog model. Longest match wins, so
/// a collision-suffixed "window12" resolves to "window1", not "window2"'s
/// neighbor.
fn catalog_base(catalog: &ModelCatalog, name: &str) -> Option<&'static str> {
    catalog
        .names()
        .iter()
        .filter(|model| {
            name.strip_prefix(**model)
                .map(|rest| rest.chars().all(|c| c.is_ascii_digit()))
                .unwrap_or(false)
        })
        .max_by_key(|model| model.len())
        .copied()
}

/// Build a placed entity out of a loaded tree plus placement parameters. The
/// scale recorded here becomes the entity's baseline for later scale edits.
fn entity_from_tree(tree: EntityTree, params: &PlacementParams) -> Entity {
    let transform = Transform {
        position: params.position.unwrap_or(Vec3::ZERO),
        rotation: params.rotation.unwrap_or(Vec3::ZERO),
        scale: params.scale.unwrap_or(Vec3::ONE),
    };

    let single = tree.parts.len() == 1 && tree.animations.is_empty();
    let kind = if single {
        let mut parts = tree.parts;
        EntityKind::SingleMesh {
            part: parts.remove(0),
        }
    } else {
        let animations: HashMap<String, Vec<PlaybackHandle>> = tree
            .animations
            .into_iter()
            .map(|(part, clips)| {
                let handles = clips.into_iter().map(PlaybackHandle::new).collect();
                (part, handles)
            })
            .collect();
        EntityKind::Group {
            parts: tree.parts,
            animations,
        }
    };

    let mut entity = Entity::new(tree.display_name, kind, transform);
    entity.color = params.color;
    entity
}

fn poster_entity(image: PosterImage, transform: Transform) -> Entity {
    Entity::new(
        "poster",
        EntityKind::Poster {
            state: PosterState::new(image),
            part: MeshPart {
                name: "poster".to_string(),
                local_bounds: Aabb::new(
                    Vec3::new(-POSTER_WIDTH / 2.0, -POSTER_HEIGHT / 2.0, -0.01),
                    Vec3::new(POSTER_WIDTH / 2.0, POSTER_HEIGHT / 2.0, 0.01),
                ),
            },
        },
        transform,
    )
}

/// Animated payloads are exported as encoded GIF data URIs; anything else in
/// the `image` field is a static reference.
fn poster_image_from_payload(payload: String) -> PosterImage {
    if payload.starts_with("data:image/gif") {
        PosterImage::Animated { data: payload }
    } else {
        PosterImage::Static(payload)
    }
}

/// Registry keys are a base name plus an optional numeric collision suffix.
fn base_name(name: &str) -> &str {
    name.trim_end_matches(|c: char| c.is_ascii_digit())
}

fn record_transform(record: &EntityRecord) -> Transform {
    Transform {
        position: record.position.into(),
        rotation: record.rotation.into(),
        scale: record.scale.into(),
    }
}
