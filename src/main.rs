//! Orbit Quest entry point
//!
//! Without a camera the binary replays a scripted marker session against the
//! simulation and prints the HUD through the log. Pass a JSON config path to
//! use a custom level set.
//!
//! ```text
//! RUST_LOG=info orbit-quest [config.json]
//! ```

use glam::Vec3;

use orbit_quest::consts::FRAME_DT;
use orbit_quest::presentation::{LogPresenter, present};
use orbit_quest::sim::{GameState, tick};
use orbit_quest::tracking::TrackingFrame;
use orbit_quest::{GameConfig, orbit_offset};

/// One scripted phase: which cards are on the table and for how long
struct Scene {
    seconds: f32,
    cards: Vec<(&'static str, Vec3)>,
}

const SUN: Vec3 = Vec3::ZERO;

fn script() -> Vec<Scene> {
    vec![
        Scene {
            seconds: 1.0,
            cards: vec![],
        },
        Scene {
            seconds: 2.0,
            cards: vec![("Sun", SUN)],
        },
        Scene {
            seconds: 2.0,
            cards: vec![("Sun", SUN), ("EarthCard", Vec3::new(0.3, 0.0, 0.1))],
        },
        Scene {
            seconds: 2.0,
            cards: vec![
                ("Sun", SUN),
                ("EarthCard", Vec3::new(0.3, 0.0, 0.1)),
                ("InfoCard", Vec3::new(0.35, 0.0, 0.2)),
            ],
        },
        Scene {
            seconds: 2.0,
            cards: vec![
                ("Sun", SUN),
                ("MarsCard", Vec3::new(-0.3, 0.0, 0.1)),
                ("InfoCard", Vec3::new(-0.25, 0.0, 0.15)),
            ],
        },
        Scene {
            seconds: 1.0,
            cards: vec![
                ("Sun", SUN),
                ("EarthCard", Vec3::new(0.3, 0.0, 0.1)),
                ("AsteroidCard", Vec3::new(0.5, 0.0, 0.1)),
            ],
        },
        Scene {
            seconds: 3.0,
            cards: vec![
                ("Sun", SUN),
                ("EarthCard", Vec3::new(0.3, 0.0, 0.1)),
                ("AsteroidCard", Vec3::new(0.34, 0.0, 0.1)),
            ],
        },
    ]
}

fn load_config() -> Result<GameConfig, orbit_quest::ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => GameConfig::load(path),
        None => {
            log::info!("No config given, using the built-in solar system");
            Ok(GameConfig::default())
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Orbit Quest (native) starting...");

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };

    let mut state = GameState::new(&config);
    let mut presenter = LogPresenter::new();
    let mut frame = TrackingFrame::new();

    for scene in script() {
        frame.clear();
        for (card, position) in &scene.cards {
            frame.track(card, *position);
        }

        let has_sun = scene.cards.iter().any(|(card, _)| *card == "Sun");
        let frames = (scene.seconds / FRAME_DT).round() as u32;
        for i in 0..frames {
            // sun card drifts so planets visibly follow it
            if has_sun {
                frame.track("Sun", SUN + orbit_offset(0.01, i as f32 * FRAME_DT));
            }
            tick(&mut state, &frame, FRAME_DT);
            present(&mut state, &mut presenter);
        }
    }

    let snapshot = state.engine.snapshot();
    println!(
        "Session over: level {} ({:?}), score {}, {} planets in orbit",
        snapshot.level_index + 1,
        snapshot.phase,
        snapshot.score,
        state.registry.count()
    );
}
