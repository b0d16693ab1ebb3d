//! Headless demo: furnish a room, save the project, and load it back.

use glam::Vec2;
use roomviz::assets::{placeholder_tree, PlacementParams};
use roomviz::scene::serialization::ProjectError;
use roomviz::Session;
use std::time::Instant;

fn main() -> Result<(), ProjectError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut session = Session::new();
    session.set_viewport(1280.0, 720.0);

    session.add_floors();
    session.add_walls();
    session.add_poster();

    // Stand in for the real asset decoder: complete every request with a
    // placeholder box.
    for model in ["desk", "chair", "lamp", "bookshelf"] {
        if let Some(ticket) = session.request_model(model, PlacementParams::default()) {
            session.loads.complete(ticket, Ok(placeholder_tree(model)));
        }
    }
    session.pump_loads();

    // Nudge the last-placed entity around a little.
    session.rotate_wheel(-120.0);
    session.set_scale(1.5);
    session.pointer_move(Vec2::new(640.0, 360.0));
    session.tick(1.0 / 60.0, Instant::now());

    let path = std::env::temp_dir().join("roomviz-demo-project.json");
    session.save_project(&path)?;

    let mut restored = Session::new();
    restored.load_project(&path)?;
    restored.pump_loads();

    log::info!(
        "scene round trip: {} entities saved, {} restored, {} loads pending",
        session.registry.len(),
        restored.registry.len(),
        restored.loads.pending_count()
    );
    Ok(())
}
