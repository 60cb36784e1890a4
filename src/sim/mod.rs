//! Tick-driven simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Host-supplied frame step and tracking frame only
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod info;
pub mod objectives;
pub mod orbit;
pub mod proximity;
pub mod registry;
pub mod spawner;
pub mod state;
pub mod tick;

pub use info::{Companion, InfoDatabase, InfoEntry, InfoReveal, InfoRevealConfig};
pub use objectives::{
    ActionKind, EnginePhase, EngineSnapshot, GlobalStats, Level, Objective, ObjectiveEngine,
    ObjectiveKind, ObjectiveSnapshot, ObjectiveState,
};
pub use orbit::OrbitMotion;
pub use proximity::{LinkConfig, LinkState, LinkStep, ProximityLink};
pub use registry::{EntityId, EntityRegistry, SpawnedEntity};
pub use spawner::{SpawnTrigger, SpawnerConfig};
pub use state::{GameEvent, GameState, LevelStarter};
pub use tick::tick;
