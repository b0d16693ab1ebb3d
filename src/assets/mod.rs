//! Asset loading contract.
//!
//! The model decoder itself is a black box owned by the host: the session
//! files a load request and gets a ticket back immediately; the host
//! completes tickets with an [`EntityTree`] (or an error) at any later tick,
//! in any order. Insertions stay collision-safe regardless of completion
//! order, so nothing here sequences requests.

use crate::scene::{Aabb, MeshPart};
use glam::Vec3;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("no loadable asset named '{name}'")]
    UnknownModel { name: String },
    #[error("failed to decode asset '{name}': {reason}")]
    Decode { name: String, reason: String },
}

/// What the asset loader hands back: a flat list of rigid sub-parts plus
/// the clip names attached to each animated sub-part.
#[derive(Debug, Clone)]
pub struct EntityTree {
    pub display_name: String,
    pub parts: Vec<MeshPart>,
    /// Sub-part name -> animation clip names for that part.
    pub animations: HashMap<String, Vec<String>>,
}

/// Placement recorded in a project document or chosen at insert time.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementParams {
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
    pub scale: Option<Vec3>,
    pub color: Option<[f32; 3]>,
}

/// The fixed set of loadable model identifiers. Import silently skips
/// records whose name is not in here (and is not a poster).
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    names: Vec<&'static str>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            names: vec![
                // furniture
                "desk",
                "chair",
                "closet",
                "bookshelf",
                "bed",
                "dresser",
                "table",
                "beanbag-chair",
                // electronics
                "laptop",
                "computer",
                "computer-monitor",
                "television",
                // lighting
                "lamp",
                "desklamp",
                // accessories
                "fishtank",
                "bear-plush",
                "vending-machine",
                "wastebasket",
                // misc
                "window1",
                "window2",
            ],
        }
    }
}

impl ModelCatalog {
    pub fn is_known(&self, name: &str) -> bool {
        self.names.contains(&name)
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

pub type LoadTicket = u64;

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub model: String,
    pub params: PlacementParams,
}

/// Outstanding asynchronous loads. `request` returns at once; the host calls
/// `complete` whenever its decoder finishes, and the session drains finished
/// loads on its next pump.
#[derive(Default)]
pub struct LoadQueue {
    next_ticket: LoadTicket,
    pending: HashMap<LoadTicket, LoadRequest>,
    completed: Vec<(LoadRequest, Result<EntityTree, AssetError>)>,
}

impl LoadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, model: impl Into<String>, params: PlacementParams) -> LoadTicket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let request = LoadRequest {
            ticket,
            model: model.into(),
            params,
        };
        log::info!("load requested: '{}' (ticket {})", request.model, ticket);
        self.pending.insert(ticket, request);
        ticket
    }

    pub fn pending(&self) -> impl Iterator<Item = &LoadRequest> {
        self.pending.values()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Resolve one ticket. Unknown tickets are ignored (a queue cleared by a
    /// project import may still receive stale completions).
    pub fn complete(&mut self, ticket: LoadTicket, result: Result<EntityTree, AssetError>) {
        if let Some(request) = self.pending.remove(&ticket) {
            self.completed.push((request, result));
        } else {
            log::warn!("completion for unknown load ticket {}", ticket);
        }
    }

    pub fn drain_completed(&mut self) -> Vec<(LoadRequest, Result<EntityTree, AssetError>)> {
        std::mem::take(&mut self.completed)
    }

    /// Forget all in-flight and finished loads (project teardown).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.completed.clear();
    }
}

/// Stand-in tree for hosts without a real decoder: one unit-cube part named
/// after the model. Useful for the demo binary and tests.
pub fn placeholder_tree(name: &str) -> EntityTree {
    EntityTree {
        display_name: name.to_string(),
        parts: vec![MeshPart {
            name: name.to_string(),
            local_bounds: Aabb::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 1.0, 0.5)),
        }],
        animations: HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_knows_furniture_but_not_arbitrary_names() {
        let catalog = ModelCatalog::default();
        assert!(catalog.is_known("desk"));
        assert!(catalog.is_known("vending-machine"));
        assert!(!catalog.is_known("poster"));
        assert!(!catalog.is_known("spaceship"));
    }

    #[test]
    fn tickets_are_unique_and_drain_in_completion_order() {
        let mut queue = LoadQueue::new();
        let a = queue.request("desk", PlacementParams::default());
        let b = queue.request("chair", PlacementParams::default());
        assert_ne!(a, b);
        assert_eq!(queue.pending_count(), 2);

        // Complete out of request order.
        queue.complete(b, Ok(placeholder_tree("chair")));
        queue.complete(a, Ok(placeholder_tree("desk")));

        let done = queue.drain_completed();
        assert_eq!(done.len(), 2);
        assert_eq!(done[0].0.model, "chair");
        assert_eq!(done[1].0.model, "desk");
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut queue = LoadQueue::new();
        let ticket = queue.request("bed", PlacementParams::default());
        queue.clear();
        queue.complete(ticket, Ok(placeholder_tree("bed")));
        assert!(queue.drain_completed().is_empty());
    }
}
