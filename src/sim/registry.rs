//! Entities orbiting the tracking origin
//!
//! The registry owns every spawned entity. Handles are generational, so a
//! handle kept after `unregister` simply stops resolving. Entities are only
//! visible while the origin marker is tracked.

use std::collections::HashMap;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use super::orbit::OrbitMotion;
use crate::IdentityKey;
use crate::tracking::{Edge, MarkerEdge};

new_key_type! {
    /// Stable handle for a spawned entity
    pub struct EntityId;
}

/// An entity orbiting the origin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnedEntity {
    /// What the renderer should instantiate (prefab name)
    pub descriptor: String,
    /// Identity registered for this entity, if any
    pub identity: Option<IdentityKey>,
    pub orbit: OrbitMotion,
    pub position: Vec3,
    /// Mirrors origin visibility
    pub active: bool,
}

/// Owner of all orbiting entities and the identity index
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    origin: IdentityKey,
    origin_edge: MarkerEdge,
    origin_position: Vec3,
    entities: SlotMap<EntityId, SpawnedEntity>,
    names: HashMap<IdentityKey, EntityId>,
    rng: Pcg32,
}

impl EntityRegistry {
    /// Create a registry anchored to `origin`, with a seeded angle source
    pub fn new(origin: IdentityKey, seed: u64) -> Self {
        Self {
            origin,
            origin_edge: MarkerEdge::default(),
            origin_position: Vec3::ZERO,
            entities: SlotMap::with_key(),
            names: HashMap::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn origin(&self) -> &IdentityKey {
        &self.origin
    }

    pub fn origin_tracked(&self) -> bool {
        self.origin_edge.is_tracked
    }

    pub fn origin_position(&self) -> Vec3 {
        self.origin_position
    }

    /// Record this tick's origin pose. On a visibility change every entity's
    /// active flag follows the origin; the edge is returned.
    pub fn observe_origin(&mut self, pose: Option<Vec3>) -> Edge {
        if let Some(position) = pose {
            self.origin_position = position;
        }
        let edge = self.origin_edge.update(pose.is_some());
        if edge != Edge::Steady {
            let active = edge == Edge::Rising;
            for entity in self.entities.values_mut() {
                entity.active = active;
            }
            log::debug!(
                "Origin {} {}, {} entities {}",
                self.origin,
                if active { "appeared" } else { "lost" },
                self.entities.len(),
                if active { "shown" } else { "hidden" }
            );
        }
        edge
    }

    /// Spawn an entity on a random point of its orbit.
    ///
    /// Returns `None` while the origin is not tracked.
    pub fn spawn(&mut self, descriptor: &str, orbit_radius: f32, speed_deg: f32) -> Option<EntityId> {
        if !self.origin_tracked() {
            log::debug!("Origin {} not tracked, cannot spawn {}", self.origin, descriptor);
            return None;
        }

        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let orbit = OrbitMotion::new(orbit_radius, angle, speed_deg);
        let position = orbit.position(self.origin_position);
        let id = self.entities.insert(SpawnedEntity {
            descriptor: descriptor.to_string(),
            identity: None,
            orbit,
            position,
            active: true,
        });
        log::debug!("Spawned {} at angle {:.2} ({} live)", descriptor, angle, self.entities.len());
        Some(id)
    }

    /// Bind an identity to a live entity; the last registration wins and the
    /// previous holder loses the identity
    pub fn register_name(&mut self, identity: &str, entity: EntityId) {
        let Some(key) = IdentityKey::new(identity) else {
            return;
        };
        if !self.entities.contains_key(entity) {
            return;
        }
        let previous = self.names.insert(key.clone(), entity);
        if let Some(old) = previous
            .filter(|id| *id != entity)
            .and_then(|id| self.entities.get_mut(id))
        {
            if old.identity.as_ref() == Some(&key) {
                old.identity = None;
            }
        }
        if let Some(spawned) = self.entities.get_mut(entity) {
            spawned.identity = Some(key);
        }
    }

    pub fn lookup_by_name(&self, identity: &str) -> Option<EntityId> {
        let key = IdentityKey::new(identity)?;
        self.names.get(&key).copied()
    }

    /// Remove an entity and every name pointing at it. Stale handles are a no-op.
    pub fn unregister(&mut self, entity: EntityId) -> Option<SpawnedEntity> {
        let removed = self.entities.remove(entity)?;
        self.names.retain(|_, id| *id != entity);
        log::debug!("Removed {} ({} live)", removed.descriptor, self.entities.len());
        Some(removed)
    }

    /// Move every active entity along its orbit around the current origin
    pub fn advance_orbits(&mut self, dt: f32) {
        let center = self.origin_position;
        for entity in self.entities.values_mut().filter(|e| e.active) {
            entity.position = entity.orbit.advance(center, dt);
        }
    }

    pub fn get(&self, entity: EntityId) -> Option<&SpawnedEntity> {
        self.entities.get(entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn count(&self) -> usize {
        self.entities.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &SpawnedEntity)> {
        self.entities.iter()
    }
}
