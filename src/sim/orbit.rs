//! Circular orbit around a (possibly moving) origin
//!
//! Orbits lie on the horizontal XZ plane of the origin marker. Angles are in
//! radians; speeds are configured in degrees per second.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::SELF_SPIN_DEG;
use crate::{orbit_offset, wrap_angle};

/// Orbit state of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitMotion {
    /// Distance from the origin
    pub radius: f32,
    /// Current angle (radians, [0, 2π))
    pub angle: f32,
    /// Orbital speed (degrees per second)
    pub speed_deg: f32,
    /// Rotation about the entity's own vertical axis (radians, [0, 2π))
    pub spin: f32,
    /// Self rotation speed (degrees per second)
    pub spin_speed_deg: f32,
}

impl OrbitMotion {
    pub fn new(radius: f32, start_angle: f32, speed_deg: f32) -> Self {
        Self {
            radius,
            angle: wrap_angle(start_angle),
            speed_deg,
            spin: 0.0,
            spin_speed_deg: SELF_SPIN_DEG,
        }
    }

    /// Position for the current angle around `center`
    #[inline]
    pub fn position(&self, center: Vec3) -> Vec3 {
        center + orbit_offset(self.radius, self.angle)
    }

    /// Advance the orbit by `dt` seconds and return the new position
    pub fn advance(&mut self, center: Vec3, dt: f32) -> Vec3 {
        self.angle = wrap_angle(self.angle + self.speed_deg.to_radians() * dt);
        if self.spin_speed_deg != 0.0 {
            self.spin = wrap_angle(self.spin + self.spin_speed_deg.to_radians() * dt);
        }
        self.position(center)
    }
}
