//! Per-frame simulation tick
//!
//! Components run in dependency order: origin visibility and orbits, level
//! starter, spawn triggers, proximity links, info markers, then the objective
//! engine consumes this tick's events and advances its timer.

use super::state::{GameEvent, GameState};
use crate::tracking::{Edge, TrackingProvider};

/// Advance the game by one frame of `dt` seconds
///
/// Events accumulate on the state until the host drains them, either through
/// `presentation::present` or `GameState::drain_events`. Hosts must drain once
/// per frame; a visible link alone adds an event every tick.
pub fn tick(state: &mut GameState, tracking: &impl TrackingProvider, dt: f32) {
    state.time_ticks += 1;
    let first_event = state.events.len();

    // Origin visibility drives every orbiting entity
    let origin = tracking.position(state.registry.origin());
    match state.registry.observe_origin(origin) {
        Edge::Rising => state.events.push(GameEvent::EntitiesVisible { visible: true }),
        Edge::Falling => state.events.push(GameEvent::EntitiesVisible { visible: false }),
        Edge::Steady => {}
    }
    state.registry.advance_orbits(dt);

    // Start the level first; same-frame spawns count as level progress
    if let Some(starter) = &mut state.starter {
        starter.update(tracking, &mut state.engine);
    }

    for spawner in &mut state.spawners {
        spawner.update(tracking, &mut state.registry, &mut state.events);
    }

    for link in &mut state.links {
        link.update(tracking, &mut state.registry, dt, &mut state.events);
    }

    for reveal in &mut state.reveals {
        reveal.update(tracking, &state.info, &mut state.events);
    }

    for event in &state.events[first_event..] {
        match event {
            GameEvent::Spawned { identity, .. } => {
                let identity = identity.as_ref().map(|id| id.as_str()).unwrap_or("");
                state.engine.register_spawn(identity);
            }
            GameEvent::InfoViewed { identity } => state.engine.register_info(identity.as_str()),
            GameEvent::Destroyed { identity, .. } => state.engine.register_destroy(identity.as_str()),
            _ => {}
        }
    }

    state.engine.tick(dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdentityKey;
    use crate::settings::GameConfig;
    use crate::sim::{
        Companion, EnginePhase, InfoEntry, InfoRevealConfig, Level, LinkConfig, Objective,
        ObjectiveKind, SpawnerConfig,
    };
    use crate::tracking::TrackingFrame;
    use glam::Vec3;

    const DT: f32 = 0.1;

    fn key(s: &str) -> IdentityKey {
        IdentityKey::new(s).unwrap()
    }

    fn config(levels: Vec<Level>) -> GameConfig {
        GameConfig {
            seed: 42,
            origin_marker: key("Sun"),
            start_marker: Some(key("Sun")),
            levels,
            spawners: vec![
                SpawnerConfig::new(key("EarthCard"), "EarthPrefab").with_identity(key("Earth")),
                SpawnerConfig::new(key("MarsCard"), "MarsPrefab").with_identity(key("Mars")),
            ],
            links: vec![
                LinkConfig::new(key("EarthCard"), key("AsteroidCard")).with_target(key("Earth")),
            ],
            info_reveals: vec![InfoRevealConfig {
                marker: key("InfoCard"),
                companions: vec![Companion {
                    marker: key("MarsCard"),
                    identity: key("Mars"),
                }],
                pick_nearest: true,
            }],
            info_entries: vec![InfoEntry {
                identity: key("Mars"),
                title: "Mars".to_string(),
                description: "The red planet.".to_string(),
            }],
        }
    }

    #[test]
    fn test_spawn_event_reaches_engine() {
        let level = Level::new(
            "Spawn",
            60.0,
            vec![Objective::specific(ObjectiveKind::SpawnSpecific, "Earth").with_rewards(10, 50)],
        )
        .with_bonus(0);
        let mut state = GameState::new(&config(vec![level]));

        let frame = TrackingFrame::new()
            .with("Sun", Vec3::ZERO)
            .with("EarthCard", Vec3::new(0.5, 0.0, 0.0));
        tick(&mut state, &frame, DT);

        assert_eq!(state.registry.count(), 1);
        assert!(state.registry.lookup_by_name("Earth").is_some());
        assert_eq!(state.engine.score(), 60);
        assert_eq!(state.engine.phase(), EnginePhase::AllLevelsDone);
    }

    #[test]
    fn test_planet_without_sun_does_not_spawn() {
        let mut state = GameState::new(&config(vec![Level::new(
            "Spawn",
            60.0,
            vec![Objective::new(ObjectiveKind::SpawnAny, 1)],
        )]));
        let frame = TrackingFrame::new().with("EarthCard", Vec3::ZERO);
        tick(&mut state, &frame, DT);
        assert_eq!(state.registry.count(), 0);
        assert_eq!(state.engine.phase(), EnginePhase::Idle);
    }

    #[test]
    fn test_asteroid_destroys_earth() {
        let level = Level::new(
            "Impact",
            60.0,
            vec![
                Objective::specific(ObjectiveKind::SpawnSpecific, "Earth"),
                Objective::specific(ObjectiveKind::DestroySpecific, "Earth"),
            ],
        );
        let mut state = GameState::new(&config(vec![level]));

        let spawn = TrackingFrame::new()
            .with("Sun", Vec3::ZERO)
            .with("EarthCard", Vec3::new(0.5, 0.0, 0.0));
        tick(&mut state, &spawn, DT);
        assert_eq!(state.engine.objective_states()[0].progress, 1);

        let far = spawn.clone().with("AsteroidCard", Vec3::new(0.7, 0.0, 0.0));
        tick(&mut state, &far, DT);
        assert_eq!(state.registry.count(), 1);

        let close = spawn.clone().with("AsteroidCard", Vec3::new(0.55, 0.0, 0.0));
        tick(&mut state, &close, DT);
        assert_eq!(state.registry.count(), 0);
        assert_eq!(state.engine.phase(), EnginePhase::AllLevelsDone);

        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Destroyed { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::EntitiesVisible { visible: true })));
    }

    #[test]
    fn test_info_event_counts_once() {
        let level = Level::new(
            "Info",
            60.0,
            vec![
                Objective::new(ObjectiveKind::ViewInfoAny, 3),
                Objective::new(ObjectiveKind::DestroyAny, 1),
            ],
        );
        let mut state = GameState::new(&config(vec![level]));
        let frame = TrackingFrame::new()
            .with("Sun", Vec3::ZERO)
            .with("InfoCard", Vec3::ZERO)
            .with("MarsCard", Vec3::X);

        for _ in 0..5 {
            tick(&mut state, &frame, DT);
        }
        assert_eq!(state.engine.objective_states()[0].progress, 1);
    }

    #[test]
    fn test_origin_loss_hides_planets() {
        let mut state = GameState::new(&GameConfig::default());
        let frame = TrackingFrame::new()
            .with("Sun", Vec3::ZERO)
            .with("EarthCard", Vec3::X);
        tick(&mut state, &frame, DT);
        let (id, _) = state.registry.iter().next().unwrap();

        tick(&mut state, &TrackingFrame::new(), DT);
        assert!(!state.registry.get(id).unwrap().active);
        assert!(state
            .pending_events()
            .iter()
            .any(|e| matches!(e, GameEvent::EntitiesVisible { visible: false })));
    }

    #[test]
    fn test_timer_restarts_level() {
        let level = Level::new("Short", 1.0, vec![Objective::new(ObjectiveKind::DestroyAny, 1)]);
        let mut state = GameState::new(&config(vec![level]));
        let sun = TrackingFrame::new().with("Sun", Vec3::ZERO);
        for _ in 0..15 {
            tick(&mut state, &sun, DT);
        }
        assert_eq!(state.engine.phase(), EnginePhase::Running);
        assert_eq!(state.engine.level_index(), 0);
        assert!(state.engine.remaining_time() > 0.0);
    }

    #[test]
    fn test_drained_queue_only_holds_current_frame() {
        let mut state = GameState::new(&GameConfig::default());
        let frame = TrackingFrame::new()
            .with("EarthCard", Vec3::ZERO)
            .with("AsteroidCard", Vec3::new(0.3, 0.0, 0.0));

        for _ in 0..3 {
            tick(&mut state, &frame, DT);
        }
        assert_eq!(state.pending_events().len(), 3);

        state.drain_events();
        for _ in 0..100 {
            tick(&mut state, &frame, DT);
            let events = state.drain_events();
            assert_eq!(events.len(), 1);
            assert!(matches!(events[0], GameEvent::LinkUpdated { .. }));
        }
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_same_seed_same_orbits() {
        let frame = TrackingFrame::new()
            .with("Sun", Vec3::ZERO)
            .with("EarthCard", Vec3::X)
            .with("MarsCard", Vec3::Z);
        let mut a = GameState::new(&GameConfig::default());
        let mut b = GameState::new(&GameConfig::default());
        for _ in 0..10 {
            tick(&mut a, &frame, DT);
            tick(&mut b, &frame, DT);
        }
        let pa: Vec<Vec3> = a.registry.iter().map(|(_, e)| e.position).collect();
        let pb: Vec<Vec3> = b.registry.iter().map(|(_, e)| e.position).collect();
        assert_eq!(pa, pb);
        assert_eq!(a.time_ticks, 10);
    }
}
