use anyhow::{Context, Result};
use simgrip::engine::testing::StubEngine;
use simgrip::episode::Episode;
use simgrip::events::TracingSink;
use simgrip::session::{Session, DEFAULT_SIM_DT};
use simgrip::utils::logging::init_logging;
use simgrip::MoveAction;
use tracing::info;

/// Scripted walkthrough against the in-memory engine: load an episode, walk
/// toward the object, grab it, carry it, put it down. Useful as a smoke run
/// and as a usage sketch for embedding the session behind a real engine.
fn main() -> Result<()> {
    init_logging();
    info!("simgrip {}", simgrip::VERSION);

    let config = simgrip::config::load_config().unwrap_or_default();
    let episode = match std::env::args().nth(1) {
        Some(path) => {
            Episode::from_json_file(&path).with_context(|| format!("loading episode {path}"))?
        }
        None => Episode::from_json(DEMO_EPISODE).expect("built-in episode parses"),
    };

    let mut session = Session::new(StubEngine::new(), config, Box::new(TracingSink));
    session.set_episode(Some(episode))?;

    for action in [
        MoveAction::MoveForward,
        MoveAction::MoveForward,
        MoveAction::TurnLeft,
        MoveAction::TurnRight,
    ] {
        let outcome = session.step(action);
        info!(%action, ?outcome, "step");
        session.step_world(DEFAULT_SIM_DT);
    }

    let grabbed = session.grab_release();
    info!(?grabbed, "grab attempt");
    let released = session.grab_release();
    info!(?released, "release attempt");

    let goal = session.distance_to_goal();
    info!(distance = goal.distance, angle = goal.angle, "goal displacement");

    let states = session.object_states();
    println!("{}", serde_json::to_string_pretty(&states)?);
    Ok(())
}

const DEMO_EPISODE: &str = r#"{
    "startState": { "position": [0.0, 0.0, 0.0], "rotation": [0.0, 0.0, 0.0, 1.0] },
    "goal": { "position": [2.0, 0.0, -6.0] },
    "objects": [
        { "originHandle": "cube", "position": [0.0, 1.4, -1.2] }
    ]
}"#;
