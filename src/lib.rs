//! Scene-entity core for an interactive room designer.
//!
//! Everything authoritative lives in [`session::Session`]: the entity
//! registry, the selection, the light rig, and the pending asset loads. The
//! rendering engine and the asset decoder sit behind narrow seams (the
//! session mirrors state out, the loader feeds entity trees in), so this
//! crate holds the full editing semantics without owning a window.

pub mod assets;
pub mod lights;
pub mod manipulate;
pub mod poster;
pub mod render;
pub mod scene;
pub mod session;

pub use session::Session;
