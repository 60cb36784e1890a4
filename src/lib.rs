//! Orbit Quest - a marker-driven AR mini-game core
//!
//! Core modules:
//! - `sim`: Tick-driven game logic (levels, objectives, orbiting entities, proximity links)
//! - `tracking`: Marker tracking signal and edge detection
//! - `presentation`: HUD formatting and the presentation sink seam
//! - `settings`: Data-driven game configuration

pub mod identity;
pub mod presentation;
pub mod settings;
pub mod sim;
pub mod tracking;

pub use identity::IdentityKey;
pub use settings::{ConfigError, GameConfig};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Default host frame step (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Proximity link defaults (metres in AR space)
    pub const EXPLOSION_DISTANCE: f32 = 0.07;
    pub const REARM_FACTOR: f32 = 1.3;
    pub const RESPAWN_DELAY: f32 = 2.0;
    pub const EXPLOSION_HEIGHT_OFFSET: f32 = 0.1;

    /// Orbit defaults
    pub const ORBIT_RADIUS: f32 = 0.25;
    pub const ORBIT_SPEED_DEG: f32 = 20.0;
    pub const SELF_SPIN_DEG: f32 = 30.0;

    /// Level defaults
    pub const LEVEL_DURATION: f32 = 60.0;
    pub const POINTS_PER_PROGRESS: u32 = 10;
    pub const BONUS_ON_COMPLETE: u32 = 50;
    pub const BONUS_ON_LEVEL_COMPLETE: u32 = 100;
}

/// Normalized angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // tiny negative inputs round up to exactly TAU
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Offset on the horizontal (XZ) plane for an orbit of radius `r` at angle `theta`
#[inline]
pub fn orbit_offset(r: f32, theta: f32) -> Vec3 {
    Vec3::new(r * theta.cos(), 0.0, r * theta.sin())
}
