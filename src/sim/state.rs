//! Game state and simulation events
//!
//! `GameState` is the single root context: it owns the objective engine, the
//! entity registry and every marker-driven component. Nothing is global.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::info::{InfoDatabase, InfoReveal};
use super::objectives::ObjectiveEngine;
use super::proximity::ProximityLink;
use super::registry::{EntityId, EntityRegistry};
use super::spawner::SpawnTrigger;
use crate::IdentityKey;
use crate::settings::GameConfig;
use crate::tracking::TrackingProvider;

/// Things that happened during a tick
///
/// Spawn / info / destroy events feed the objective engine; the rest are for
/// the renderer and HUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A planet entered orbit; the renderer instantiates `descriptor` at `position`
    Spawned {
        entity: EntityId,
        descriptor: String,
        identity: Option<IdentityKey>,
        position: Vec3,
    },
    InfoViewed {
        identity: IdentityKey,
    },
    /// An orbiting planet was removed by a proximity link
    Destroyed {
        entity: EntityId,
        identity: IdentityKey,
    },
    /// Fire-and-forget explosion effect (and sound)
    Explosion {
        position: Vec3,
    },
    /// Orbiting planets shown/hidden with the origin marker
    EntitiesVisible {
        visible: bool,
    },
    /// Marker model shown/hidden by a proximity link
    MarkerVisuals {
        marker: IdentityKey,
        visible: bool,
    },
    LinkUpdated {
        link: usize,
        from: Vec3,
        to: Vec3,
        distance: f32,
        label: String,
    },
    LinkHidden {
        link: usize,
    },
    InfoShown {
        panel: usize,
        title: String,
        body: String,
    },
    InfoHidden {
        panel: usize,
    },
}

/// Starts the current level the first time its marker is seen
#[derive(Debug, Clone)]
pub struct LevelStarter {
    marker: IdentityKey,
    started: bool,
}

impl LevelStarter {
    pub fn new(marker: IdentityKey) -> Self {
        Self {
            marker,
            started: false,
        }
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn update(&mut self, tracking: &impl TrackingProvider, engine: &mut ObjectiveEngine) {
        if self.started || !tracking.is_tracked(&self.marker) {
            return;
        }
        self.started = true;
        log::info!("{} seen, starting level", self.marker);
        engine.start_current_level();
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub engine: ObjectiveEngine,
    pub registry: EntityRegistry,
    pub spawners: Vec<SpawnTrigger>,
    pub links: Vec<ProximityLink>,
    pub reveals: Vec<InfoReveal>,
    pub info: InfoDatabase,
    pub starter: Option<LevelStarter>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events not yet handed to the presentation sink; grows until drained
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Build every component from configuration
    pub fn new(config: &GameConfig) -> Self {
        let mut engine = ObjectiveEngine::new();
        engine.load_levels(config.levels.clone());

        Self {
            engine,
            registry: EntityRegistry::new(config.origin_marker.clone(), config.seed),
            spawners: config.spawners.iter().cloned().map(SpawnTrigger::new).collect(),
            links: config
                .links
                .iter()
                .cloned()
                .enumerate()
                .map(|(i, link)| ProximityLink::new(i, link))
                .collect(),
            reveals: config
                .info_reveals
                .iter()
                .cloned()
                .enumerate()
                .map(|(i, reveal)| InfoReveal::new(i, reveal))
                .collect(),
            info: InfoDatabase::new(config.info_entries.iter().cloned()),
            starter: Some(LevelStarter::new(config.start_marker().clone())),
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::TrackingFrame;

    #[test]
    fn test_new_from_default_config() {
        let config = GameConfig::default();
        let state = GameState::new(&config);
        assert_eq!(state.spawners.len(), config.spawners.len());
        assert_eq!(state.links.len(), config.links.len());
        assert_eq!(state.engine.level_count(), config.levels.len());
        assert_eq!(state.registry.count(), 0);
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_starter_defaults_to_origin_marker() {
        let config = GameConfig::from_json(
            r#"{
                "origin_marker": "Star",
                "levels": [ { "objectives": [ { "kind": "SpawnAny" } ] } ]
            }"#,
        )
        .unwrap();
        let mut state = GameState::new(&config);
        let star = TrackingFrame::new().with("Star", Vec3::ZERO);
        state
            .starter
            .as_mut()
            .unwrap()
            .update(&star, &mut state.engine);
        assert_eq!(state.engine.phase(), crate::sim::EnginePhase::Running);
    }

    #[test]
    fn test_level_starter_fires_once() {
        let mut engine = ObjectiveEngine::new();
        engine.load_levels(GameConfig::default().levels);
        let mut starter = LevelStarter::new(IdentityKey::new("Sun").unwrap());

        starter.update(&TrackingFrame::new(), &mut engine);
        assert!(!starter.started());

        let sun = TrackingFrame::new().with("sun", Vec3::ZERO);
        starter.update(&sun, &mut engine);
        assert!(starter.started());
        assert_eq!(engine.drain_messages().len(), 1);

        starter.update(&TrackingFrame::new(), &mut engine);
        starter.update(&sun, &mut engine);
        assert!(engine.drain_messages().is_empty());
    }
}
