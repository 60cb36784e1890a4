//! Planet spawner markers
//!
//! Showing a planet card makes its planet appear in orbit around the origin.

use serde::{Deserialize, Serialize};

use super::registry::{EntityId, EntityRegistry};
use super::state::GameEvent;
use crate::IdentityKey;
use crate::consts::*;
use crate::tracking::{Edge, MarkerEdge, TrackingProvider};

fn default_orbit_radius() -> f32 {
    ORBIT_RADIUS
}

fn default_orbit_speed() -> f32 {
    ORBIT_SPEED_DEG
}

fn default_single_shot() -> bool {
    true
}

/// Configuration of one spawner marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnerConfig {
    pub marker: IdentityKey,
    /// Prefab the renderer instantiates
    pub descriptor: String,
    /// Planet identity registered for the spawned entity
    #[serde(default)]
    pub identity: Option<IdentityKey>,
    #[serde(default = "default_orbit_radius")]
    pub orbit_radius: f32,
    /// Degrees per second
    #[serde(default = "default_orbit_speed")]
    pub orbit_speed_deg: f32,
    /// Spawn at most once per session
    #[serde(default = "default_single_shot")]
    pub single_shot: bool,
}

impl SpawnerConfig {
    pub fn new(marker: IdentityKey, descriptor: &str) -> Self {
        Self {
            marker,
            descriptor: descriptor.to_string(),
            identity: None,
            orbit_radius: ORBIT_RADIUS,
            orbit_speed_deg: ORBIT_SPEED_DEG,
            single_shot: true,
        }
    }

    pub fn with_identity(mut self, identity: IdentityKey) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_orbit(mut self, radius: f32, speed_deg: f32) -> Self {
        self.orbit_radius = radius;
        self.orbit_speed_deg = speed_deg;
        self
    }
}

/// Edge-triggered spawner
#[derive(Debug, Clone)]
pub struct SpawnTrigger {
    config: SpawnerConfig,
    edge: MarkerEdge,
    has_spawned: bool,
}

impl SpawnTrigger {
    pub fn new(config: SpawnerConfig) -> Self {
        Self {
            config,
            edge: MarkerEdge::default(),
            has_spawned: false,
        }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn has_spawned(&self) -> bool {
        self.has_spawned
    }

    /// Spawn on the rising edge of the marker
    pub fn update(
        &mut self,
        tracking: &impl TrackingProvider,
        registry: &mut EntityRegistry,
        events: &mut Vec<GameEvent>,
    ) -> Option<EntityId> {
        if self.edge.update(tracking.is_tracked(&self.config.marker)) != Edge::Rising {
            return None;
        }
        if self.config.single_shot && self.has_spawned {
            return None;
        }

        let config = &self.config;
        let Some(entity) = registry.spawn(&config.descriptor, config.orbit_radius, config.orbit_speed_deg)
        else {
            log::debug!(
                "{} appeared but {} is not tracked, no spawn",
                config.marker,
                registry.origin()
            );
            return None;
        };
        self.has_spawned = true;

        if let Some(identity) = &config.identity {
            registry.register_name(identity.as_str(), entity);
        }
        let position = registry.get(entity).map(|e| e.position).unwrap_or_default();
        log::info!(
            "{} spawned {} in orbit",
            config.marker,
            config.identity.as_ref().map(IdentityKey::as_str).unwrap_or(&config.descriptor)
        );
        events.push(GameEvent::Spawned {
            entity,
            descriptor: config.descriptor.clone(),
            identity: config.identity.clone(),
            position,
        });
        Some(entity)
    }
}
