//! Game configuration
//!
//! Loaded from a JSON file by the host. The default configuration is a small
//! solar system: Sun origin, three planet cards, an asteroid card and an
//! information card.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::IdentityKey;
use crate::sim::{
    Companion, InfoEntry, InfoRevealConfig, Level, LinkConfig, Objective, ObjectiveKind,
    SpawnerConfig,
};

/// Configuration problems found while loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no levels configured")]
    NoLevels,
    #[error("level {level} objective {objective}: {kind:?} needs a target identity")]
    MissingTarget {
        level: usize,
        objective: usize,
        kind: ObjectiveKind,
    },
    #[error("level {level} objective {objective}: target count must be at least 1")]
    ZeroTargetCount { level: usize, objective: usize },
    #[error("spawner {index}: orbit radius must be positive")]
    InvalidOrbit { index: usize },
    #[error("link {index}: {reason}")]
    InvalidLink { index: usize, reason: &'static str },
}

const DEFAULT_SEED: u64 = 0x5EED_0F_5A7E;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_origin_marker() -> IdentityKey {
    IdentityKey::named("Sun")
}

/// Everything needed to build a `GameState`
///
/// Sections missing from a JSON file are empty; only `Default` builds the
/// solar system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seed for orbital start angles
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Marker every planet orbits
    #[serde(default = "default_origin_marker")]
    pub origin_marker: IdentityKey,
    /// Marker whose first sighting starts the first level (origin marker if unset)
    #[serde(default)]
    pub start_marker: Option<IdentityKey>,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub spawners: Vec<SpawnerConfig>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
    #[serde(default)]
    pub info_reveals: Vec<InfoRevealConfig>,
    #[serde(default)]
    pub info_entries: Vec<InfoEntry>,
}

const PLANETS: [(&str, &str, f32, f32); 3] = [
    ("Earth", "EarthCard", 0.25, 20.0),
    ("Mars", "MarsCard", 0.35, 15.0),
    ("Jupiter", "JupiterCard", 0.5, 8.0),
];

impl Default for GameConfig {
    fn default() -> Self {
        let sun = default_origin_marker();

        let spawners = PLANETS
            .iter()
            .map(|&(planet, card, radius, speed)| {
                SpawnerConfig::new(IdentityKey::named(card), &format!("{planet}Prefab"))
                    .with_identity(IdentityKey::named(planet))
                    .with_orbit(radius, speed)
            })
            .collect();

        let companions = PLANETS
            .iter()
            .map(|&(planet, card, _, _)| Companion {
                marker: IdentityKey::named(card),
                identity: IdentityKey::named(planet),
            })
            .collect();

        let levels = vec![
            Level::new(
                "First contact",
                60.0,
                vec![
                    Objective::new(ObjectiveKind::SpawnAny, 1),
                    Objective::new(ObjectiveKind::ViewInfoAny, 1),
                ],
            ),
            Level::new(
                "The red planet",
                90.0,
                vec![
                    Objective::specific(ObjectiveKind::SpawnSpecific, "Mars"),
                    Objective::specific(ObjectiveKind::ViewInfoSpecific, "Mars"),
                    Objective::new(ObjectiveKind::SpawnAny, 2),
                ],
            ),
            Level::new(
                "Impact",
                90.0,
                vec![Objective::specific(ObjectiveKind::DestroySpecific, "Earth").with_rewards(20, 100)],
            )
            .with_bonus(200),
        ];

        Self {
            seed: DEFAULT_SEED,
            origin_marker: sun.clone(),
            start_marker: Some(sun),
            levels,
            spawners,
            links: vec![
                LinkConfig::new(IdentityKey::named("EarthCard"), IdentityKey::named("AsteroidCard"))
                    .with_target(IdentityKey::named("Earth")),
            ],
            info_reveals: vec![InfoRevealConfig {
                marker: IdentityKey::named("InfoCard"),
                companions,
                pick_nearest: true,
            }],
            info_entries: vec![
                InfoEntry {
                    identity: IdentityKey::named("Earth"),
                    title: "Earth".to_string(),
                    description: "Third planet from the Sun and the only one known to host life."
                        .to_string(),
                },
                InfoEntry {
                    identity: IdentityKey::named("Mars"),
                    title: "Mars".to_string(),
                    description: "The red planet. Its colour comes from iron oxide dust.".to_string(),
                },
                InfoEntry {
                    identity: IdentityKey::named("Jupiter"),
                    title: "Jupiter".to_string(),
                    description: "The largest planet, a gas giant with a storm bigger than Earth."
                        .to_string(),
                },
            ],
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Marker the level starter waits for
    pub fn start_marker(&self) -> &IdentityKey {
        self.start_marker.as_ref().unwrap_or(&self.origin_marker)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations that would leave objectives or links inert
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }

        for (level, config) in self.levels.iter().enumerate() {
            for (objective, o) in config.objectives.iter().enumerate() {
                if o.is_inert() {
                    return Err(ConfigError::MissingTarget {
                        level,
                        objective,
                        kind: o.kind,
                    });
                }
                if o.target_count == 0 {
                    return Err(ConfigError::ZeroTargetCount { level, objective });
                }
            }
        }

        for (index, spawner) in self.spawners.iter().enumerate() {
            if spawner.orbit_radius <= 0.0 {
                return Err(ConfigError::InvalidOrbit { index });
            }
        }

        for (index, link) in self.links.iter().enumerate() {
            let reason = if link.marker_a == link.marker_b {
                Some("markers must differ")
            } else if link.explosion_distance <= 0.0 {
                Some("explosion distance must be positive")
            } else if link.rearm_factor < 1.0 {
                Some("rearm factor must be at least 1")
            } else if link.respawn_delay < 0.0 {
                Some("respawn delay must not be negative")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidLink { index, reason });
            }
        }

        Ok(())
    }
}
