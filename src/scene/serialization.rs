//! Project save/load.
//!
//! A project document is a single JSON array mixing light records and entity
//! records. Light records carry a `type` tag; entity records are identified
//! by their `name`. Lights are exported first so an importing session can
//! rebuild the rig before any entity placement resolves.

use crate::lights::{Light, LightRig};
use crate::scene::{EntityKind, EntityRegistry};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("project parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VecRecord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for VecRecord {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<VecRecord> for Vec3 {
    fn from(r: VecRecord) -> Self {
        Vec3::new(r.x, r.y, r.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRecord {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl From<[f32; 3]> for ColorRecord {
    fn from(c: [f32; 3]) -> Self {
        Self {
            r: c[0],
            g: c[1],
            b: c[2],
        }
    }
}

impl From<ColorRecord> for [f32; 3] {
    fn from(r: ColorRecord) -> Self {
        [r.r, r.g, r.b]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRecord {
    /// Always "DirectionalLight" for now; kept as data for forward
    /// compatibility with other light types.
    #[serde(rename = "type")]
    pub kind: String,
    pub color: ColorRecord,
    pub position: VecRecord,
    pub rotation: VecRecord,
    pub intensity: f32,
    #[serde(default = "default_enabled", skip_serializing_if = "is_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn is_enabled(enabled: &bool) -> bool {
    *enabled
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub position: VecRecord,
    pub rotation: VecRecord,
    pub scale: VecRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorRecord>,
    /// Poster payload: a static image path or an encoded animated image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One line of a project document. Untagged: a record with a `type` field is
/// a light, anything else must shape up as an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectRecord {
    Light(LightRecord),
    Entity(EntityRecord),
}

/// Snapshot the rig and registry as a project document, lights first.
pub fn export_records(registry: &EntityRegistry, rig: &LightRig) -> Vec<ProjectRecord> {
    let mut records: Vec<ProjectRecord> = rig
        .lights()
        .iter()
        .map(|light| ProjectRecord::Light(light_record(light)))
        .collect();

    let mut names = registry.names();
    names.sort_unstable();
    for name in names {
        let Some(entity) = registry.lookup(name) else {
            continue;
        };
        let image = match &entity.kind {
            EntityKind::Poster { state, .. } => Some(state.image.export_payload().to_string()),
            _ => None,
        };
        // Records carry the source model name, not the collision-suffixed
        // registry key, so a document stays importable anywhere.
        records.push(ProjectRecord::Entity(EntityRecord {
            name: entity.display_name.clone(),
            position: entity.transform.position.into(),
            rotation: entity.transform.rotation.into(),
            scale: entity.transform.scale.into(),
            color: entity.color.map(ColorRecord::from),
            image,
        }));
    }
    records
}

fn light_record(light: &Light) -> LightRecord {
    LightRecord {
        kind: "DirectionalLight".to_string(),
        color: light.color.into(),
        position: light.position().into(),
        rotation: light.rotation.into(),
        intensity: light.intensity,
        enabled: light.enabled,
    }
}

pub fn records_to_json(records: &[ProjectRecord]) -> Result<String, ProjectError> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn records_from_json(json: &str) -> Result<Vec<ProjectRecord>, ProjectError> {
    Ok(serde_json::from_str(json)?)
}

pub fn save_records_to_file(
    records: &[ProjectRecord],
    path: impl AsRef<Path>,
) -> Result<(), ProjectError> {
    let path = path.as_ref();
    fs::write(path, records_to_json(records)?)?;
    log::info!("saved project: {} ({} records)", path.display(), records.len());
    Ok(())
}

pub fn load_records_from_file(path: impl AsRef<Path>) -> Result<Vec<ProjectRecord>, ProjectError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let records = records_from_json(&text)?;
    log::info!(
        "loaded project: {} ({} records)",
        path.display(),
        records.len()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poster::PosterImage;
    use crate::scene::{unit_box, Entity, EntityKind, MeshPart, Transform};

    fn sample_registry() -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        let mut desk = Entity::new(
            "desk",
            EntityKind::SingleMesh {
                part: MeshPart {
                    name: "desk".to_string(),
                    local_bounds: unit_box(),
                },
            },
            Transform::default(),
        );
        desk.transform.position = Vec3::new(1.0, 0.0, -2.0);
        desk.color = Some([0.2, 0.4, 0.6]);
        registry.insert(desk, "desk");
        registry
    }

    #[test]
    fn export_puts_lights_before_entities() {
        let registry = sample_registry();
        let rig = LightRig::default();
        let records = export_records(&registry, &rig);
        assert_eq!(records.len(), rig.len() + 1);
        assert!(matches!(records[0], ProjectRecord::Light(_)));
        assert!(matches!(records[records.len() - 1], ProjectRecord::Entity(_)));
    }

    #[test]
    fn records_round_trip_through_json() {
        let registry = sample_registry();
        let rig = LightRig::default();
        let records = export_records(&registry, &rig);
        let json = records_to_json(&records).unwrap();
        let parsed = records_from_json(&json).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn export_writes_display_names_not_registry_keys() {
        let mut registry = EntityRegistry::new();
        for _ in 0..2 {
            registry.insert(
                Entity::new(
                    "desk",
                    EntityKind::SingleMesh {
                        part: MeshPart {
                            name: "desk".to_string(),
                            local_bounds: unit_box(),
                        },
                    },
                    Transform::default(),
                ),
                "desk",
            );
        }
        let records = export_records(&registry, &LightRig::default());
        let names: Vec<&str> = records
            .iter()
            .filter_map(|r| match r {
                ProjectRecord::Entity(e) => Some(e.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["desk", "desk"]);
    }

    #[test]
    fn light_records_carry_the_type_tag() {
        let rig = LightRig::default();
        let records = export_records(&EntityRegistry::new(), &rig);
        let json = records_to_json(&records).unwrap();
        assert!(json.contains("\"type\": \"DirectionalLight\""));
    }

    #[test]
    fn entity_without_color_omits_the_field() {
        let mut registry = EntityRegistry::new();
        registry.insert(
            Entity::new(
                "chair",
                EntityKind::SingleMesh {
                    part: MeshPart {
                        name: "chair".to_string(),
                        local_bounds: unit_box(),
                    },
                },
                Transform::default(),
            ),
            "chair",
        );
        let json = records_to_json(&export_records(&registry, &LightRig::default())).unwrap();
        let entity_part = json.split("chair").nth(1).unwrap();
        assert!(!entity_part.contains("color"));
    }

    #[test]
    fn poster_record_keeps_its_image_payload() {
        let mut registry = EntityRegistry::new();
        let poster = Entity::new(
            "poster",
            EntityKind::Poster {
                state: crate::poster::PosterState::new(PosterImage::Static(
                    "examples/cat2.png".to_string(),
                )),
                part: MeshPart {
                    name: "poster".to_string(),
                    local_bounds: unit_box(),
                },
            },
            Transform::default(),
        );
        registry.insert(poster, "poster");
        let records = export_records(&registry, &LightRig::default());
        let entity = records
            .iter()
            .find_map(|r| match r {
                ProjectRecord::Entity(e) => Some(e),
                _ => None,
            })
            .unwrap();
        assert_eq!(entity.image.as_deref(), Some("examples/cat2.png"));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let result = records_from_json("[{\"name\": 42}]");
        assert!(matches!(result, Err(ProjectError::Json(_))));
    }

    #[test]
    fn untagged_records_resolve_by_shape() {
        let json = r#"[
            {"type": "DirectionalLight",
             "color": {"r": 1.0, "g": 1.0, "b": 1.0},
             "position": {"x": 0.0, "y": 80.0, "z": 0.0},
             "rotation": {"x": 0.0, "y": 0.0, "z": 0.0},
             "intensity": 1.0},
            {"name": "desk",
             "position": {"x": 0.0, "y": 0.0, "z": 0.0},
             "rotation": {"x": 0.0, "y": 0.0, "z": 0.0},
             "scale": {"x": 1.0, "y": 1.0, "z": 1.0}}
        ]"#;
        let records = records_from_json(json).unwrap();
        assert!(matches!(records[0], ProjectRecord::Light(_)));
        assert!(matches!(records[1], ProjectRecord::Entity(_)));
    }
}
