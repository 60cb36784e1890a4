//! Marker tracking signal
//!
//! The pose tracker is external. Each tick the host hands the simulation a
//! `TrackingProvider` describing which markers are currently observed and
//! where they are.

use std::collections::HashMap;

use glam::Vec3;

use crate::IdentityKey;

/// Per-tick view of the marker tracker
pub trait TrackingProvider {
    /// World position of the marker if it is currently observed
    fn position(&self, marker: &IdentityKey) -> Option<Vec3>;

    /// Whether the marker is currently observed
    fn is_tracked(&self, marker: &IdentityKey) -> bool {
        self.position(marker).is_some()
    }
}

/// Snapshot of tracked markers for a single tick
#[derive(Debug, Clone, Default)]
pub struct TrackingFrame {
    poses: HashMap<IdentityKey, Vec3>,
}

impl TrackingFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a marker as tracked at the given position (empty names are ignored)
    pub fn track(&mut self, marker: &str, position: Vec3) -> &mut Self {
        if let Some(key) = IdentityKey::new(marker) {
            self.poses.insert(key, position);
        }
        self
    }

    /// Builder form of `track`
    pub fn with(mut self, marker: &str, position: Vec3) -> Self {
        self.track(marker, position);
        self
    }

    /// Mark a marker as lost
    pub fn lose(&mut self, marker: &str) -> &mut Self {
        if let Some(key) = IdentityKey::new(marker) {
            self.poses.remove(&key);
        }
        self
    }

    pub fn clear(&mut self) {
        self.poses.clear();
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

impl TrackingProvider for TrackingFrame {
    fn position(&self, marker: &IdentityKey) -> Option<Vec3> {
        self.poses.get(marker).copied()
    }
}

/// Visibility transition observed between two ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Untracked → tracked
    Rising,
    /// Tracked → untracked
    Falling,
    /// No change
    Steady,
}

/// `{was_tracked, is_tracked}` pair for a single marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerEdge {
    pub was_tracked: bool,
    pub is_tracked: bool,
}

impl MarkerEdge {
    /// Feed this tick's observation and report the transition
    pub fn update(&mut self, tracked: bool) -> Edge {
        self.was_tracked = self.is_tracked;
        self.is_tracked = tracked;
        self.edge()
    }

    /// Transition recorded by the last `update`
    pub fn edge(&self) -> Edge {
        match (self.was_tracked, self.is_tracked) {
            (false, true) => Edge::Rising,
            (true, false) => Edge::Falling,
            _ => Edge::Steady,
        }
    }
}
