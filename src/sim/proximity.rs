//! Proximity link between two tracked markers
//!
//! When the two markers come closer than the explosion distance the link
//! fires once: both markers are hidden for a respawn delay and the configured
//! target planet is removed from the orbit. A new explosion requires the
//! markers to separate beyond `explosion_distance * rearm_factor` first (or
//! one of them to drop out of tracking).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::registry::EntityRegistry;
use super::state::GameEvent;
use crate::IdentityKey;
use crate::consts::*;
use crate::presentation::distance_label;
use crate::tracking::TrackingProvider;

fn default_explosion_distance() -> f32 {
    EXPLOSION_DISTANCE
}

fn default_rearm_factor() -> f32 {
    REARM_FACTOR
}

fn default_respawn_delay() -> f32 {
    RESPAWN_DELAY
}

fn default_height_offset() -> f32 {
    EXPLOSION_HEIGHT_OFFSET
}

/// Configuration of one monitored pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub marker_a: IdentityKey,
    pub marker_b: IdentityKey,
    /// Orbiting planet removed when the link fires
    #[serde(default)]
    pub target: Option<IdentityKey>,
    #[serde(default = "default_explosion_distance")]
    pub explosion_distance: f32,
    #[serde(default = "default_rearm_factor")]
    pub rearm_factor: f32,
    /// Seconds both markers stay hidden after an explosion
    #[serde(default = "default_respawn_delay")]
    pub respawn_delay: f32,
    /// Explosions are raised this far above the contact point
    #[serde(default = "default_height_offset")]
    pub height_offset: f32,
}

impl LinkConfig {
    pub fn new(marker_a: IdentityKey, marker_b: IdentityKey) -> Self {
        Self {
            marker_a,
            marker_b,
            target: None,
            explosion_distance: EXPLOSION_DISTANCE,
            rearm_factor: REARM_FACTOR,
            respawn_delay: RESPAWN_DELAY,
            height_offset: EXPLOSION_HEIGHT_OFFSET,
        }
    }

    pub fn with_target(mut self, target: IdentityKey) -> Self {
        self.target = Some(target);
        self
    }

    /// Distance beyond which a disarmed link arms again
    pub fn rearm_distance(&self) -> f32 {
        self.explosion_distance * self.rearm_factor
    }
}

/// Link state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LinkState {
    Normal,
    /// Markers hidden; back to Normal when the countdown expires
    Exploded { respawn_in: f32 },
}

/// Outcome of one link step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkStep {
    /// A partner is not tracked
    Hidden,
    /// Both tracked, no explosion; link line shown
    Shown { distance: f32 },
    /// Explosion triggered this step
    Fired,
    /// Counting down after an explosion
    Cooling,
    /// Countdown expired, markers shown again
    Respawned,
}

/// Hysteresis-gated proximity trigger for one pair of markers
#[derive(Debug, Clone)]
pub struct ProximityLink {
    index: usize,
    config: LinkConfig,
    state: LinkState,
    armed: bool,
    line_shown: bool,
}

impl ProximityLink {
    pub fn new(index: usize, config: LinkConfig) -> Self {
        Self {
            index,
            config,
            state: LinkState::Normal,
            armed: true,
            line_shown: false,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Advance the state machine. `distance` is `None` when either partner is
    /// untracked.
    pub fn step(&mut self, distance: Option<f32>, dt: f32) -> LinkStep {
        if let LinkState::Exploded { respawn_in } = self.state {
            let left = respawn_in - dt;
            if left <= 0.0 {
                self.state = LinkState::Normal;
                return LinkStep::Respawned;
            }
            self.state = LinkState::Exploded { respawn_in: left };
            return LinkStep::Cooling;
        }

        let Some(distance) = distance else {
            self.armed = true;
            return LinkStep::Hidden;
        };

        if self.armed && distance < self.config.explosion_distance {
            self.state = LinkState::Exploded {
                respawn_in: self.config.respawn_delay,
            };
            self.armed = false;
            return LinkStep::Fired;
        }

        if !self.armed && distance > self.config.rearm_distance() {
            self.armed = true;
        }
        LinkStep::Shown { distance }
    }

    /// Run one tick against live tracking; may remove the target planet from
    /// the registry.
    pub fn update(
        &mut self,
        tracking: &impl TrackingProvider,
        registry: &mut EntityRegistry,
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) -> LinkStep {
        let pos_a = tracking.position(&self.config.marker_a);
        let pos_b = tracking.position(&self.config.marker_b);
        let distance = match (pos_a, pos_b) {
            (Some(a), Some(b)) => Some(a.distance(b)),
            _ => None,
        };

        let step = self.step(distance, dt);
        match step {
            LinkStep::Hidden | LinkStep::Cooling => self.hide_line(events),
            LinkStep::Shown { distance } => {
                if let (Some(from), Some(to)) = (pos_a, pos_b) {
                    self.line_shown = true;
                    events.push(GameEvent::LinkUpdated {
                        link: self.index,
                        from,
                        to,
                        distance,
                        label: distance_label(distance),
                    });
                }
            }
            LinkStep::Fired => {
                if let (Some(a), Some(b)) = (pos_a, pos_b) {
                    self.explode(a, b, registry, events);
                }
            }
            LinkStep::Respawned => {
                log::debug!("Link {} respawned markers", self.index);
                self.set_markers_visible(true, events);
            }
        }
        step
    }

    fn explode(&mut self, a: Vec3, b: Vec3, registry: &mut EntityRegistry, events: &mut Vec<GameEvent>) {
        let lift = Vec3::Y * self.config.height_offset;
        log::info!(
            "Link {}: {} and {} collided ({:.3} m)",
            self.index,
            self.config.marker_a,
            self.config.marker_b,
            a.distance(b)
        );

        self.hide_line(events);
        self.set_markers_visible(false, events);
        events.push(GameEvent::Explosion {
            position: (a + b) * 0.5 + lift,
        });

        let Some(target) = &self.config.target else {
            return;
        };
        let Some(entity) = registry.lookup_by_name(target.as_str()) else {
            log::debug!("Link {}: {} is not orbiting, nothing to destroy", self.index, target);
            return;
        };
        if let Some(removed) = registry.unregister(entity) {
            events.push(GameEvent::Explosion {
                position: removed.position + lift,
            });
            events.push(GameEvent::Destroyed {
                entity,
                identity: target.clone(),
            });
        }
    }

    fn hide_line(&mut self, events: &mut Vec<GameEvent>) {
        if self.line_shown {
            self.line_shown = false;
            events.push(GameEvent::LinkHidden { link: self.index });
        }
    }

    fn set_markers_visible(&self, visible: bool, events: &mut Vec<GameEvent>) {
        for marker in [&self.config.marker_a, &self.config.marker_b] {
            events.push(GameEvent::MarkerVisuals {
                marker: marker.clone(),
                visible,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::TrackingFrame;

    fn key(s: &str) -> IdentityKey {
        IdentityKey::new(s).unwrap()
    }

    fn link() -> ProximityLink {
        ProximityLink::new(0, LinkConfig::new(key("EarthCard"), key("AsteroidCard")))
    }

    #[test]
    fn test_single_explosion_for_close_sequence() {
        let mut link = link();
        let distances = [0.10, 0.065, 0.065, 0.10, 0.065];
        let fired = distances
            .iter()
            .map(|d| link.step(Some(*d), 0.1))
            .filter(|s| *s == LinkStep::Fired)
            .count();
        assert_eq!(fired, 1);
        assert!(!link.armed());
        assert!(matches!(link.state(), LinkState::Exploded { .. }));
    }

    #[test]
    fn test_dead_zone_requires_separation() {
        let mut config = LinkConfig::new(key("A"), key("B"));
        config.respawn_delay = 0.05;
        let mut link = ProximityLink::new(0, config);

        assert_eq!(link.step(Some(0.06), 0.1), LinkStep::Fired);
        assert_eq!(link.step(Some(0.06), 0.1), LinkStep::Respawned);
        // inside the dead zone: stays disarmed
        assert_eq!(link.step(Some(0.06), 0.1), LinkStep::Shown { distance: 0.06 });
        assert_eq!(link.step(Some(0.08), 0.1), LinkStep::Shown { distance: 0.08 });
        assert_eq!(link.step(Some(0.065), 0.1), LinkStep::Shown { distance: 0.065 });
        assert!(!link.armed());

        // beyond 0.091 arms again
        link.step(Some(0.10), 0.1);
        assert!(link.armed());
        assert_eq!(link.step(Some(0.065), 0.1), LinkStep::Fired);
    }

    #[test]
    fn test_losing_tracking_rearms() {
        let mut config = LinkConfig::new(key("A"), key("B"));
        config.respawn_delay = 0.0;
        let mut link = ProximityLink::new(0, config);

        assert_eq!(link.step(Some(0.01), 0.1), LinkStep::Fired);
        assert_eq!(link.step(Some(0.01), 0.1), LinkStep::Respawned);
        assert_eq!(link.step(Some(0.01), 0.1), LinkStep::Shown { distance: 0.01 });
        assert_eq!(link.step(None, 0.1), LinkStep::Hidden);
        assert!(link.armed());
        assert_eq!(link.step(Some(0.01), 0.1), LinkStep::Fired);
    }

    #[test]
    fn test_respawn_countdown() {
        let mut link = link();
        link.step(Some(0.01), 0.1);
        let mut cooling = 0;
        loop {
            match link.step(Some(0.5), 0.5) {
                LinkStep::Cooling => cooling += 1,
                LinkStep::Respawned => break,
                other => panic!("unexpected step {other:?}"),
            }
        }
        // 2.0s delay at 0.5s steps: three cooling steps, respawn on the fourth
        assert_eq!(cooling, 3);
        assert_eq!(link.state(), LinkState::Normal);
    }

    fn sun_registry() -> EntityRegistry {
        let mut registry = EntityRegistry::new(key("Sun"), 1);
        registry.observe_origin(Some(Vec3::ZERO));
        registry
    }

    #[test]
    fn test_fire_removes_target_planet() {
        let mut registry = sun_registry();
        let earth = registry.spawn("EarthPrefab", 0.25, 20.0).unwrap();
        registry.register_name("Earth", earth);

        let mut link = ProximityLink::new(
            2,
            LinkConfig::new(key("EarthCard"), key("AsteroidCard")).with_target(key("Earth")),
        );
        let frame = TrackingFrame::new()
            .with("EarthCard", Vec3::new(0.0, 0.0, 0.0))
            .with("AsteroidCard", Vec3::new(0.05, 0.0, 0.0));
        let mut events = Vec::new();

        assert_eq!(link.update(&frame, &mut registry, 0.1, &mut events), LinkStep::Fired);
        assert_eq!(registry.count(), 0);
        assert_eq!(registry.lookup_by_name("Earth"), None);

        let explosions: Vec<Vec3> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Explosion { position } => Some(*position),
                _ => None,
            })
            .collect();
        assert_eq!(explosions.len(), 2);
        assert!((explosions[0] - Vec3::new(0.025, 0.1, 0.0)).length() < 1e-5);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Destroyed { identity, .. } if identity.as_str() == "Earth"
        )));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::MarkerVisuals { visible: false, .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_fire_without_orbiting_target_emits_no_destroy() {
        let mut registry = sun_registry();
        let mut link = ProximityLink::new(
            0,
            LinkConfig::new(key("EarthCard"), key("AsteroidCard")).with_target(key("Earth")),
        );
        let frame = TrackingFrame::new()
            .with("EarthCard", Vec3::ZERO)
            .with("AsteroidCard", Vec3::new(0.0, 0.0, 0.01));
        let mut events = Vec::new();

        assert_eq!(link.update(&frame, &mut registry, 0.1, &mut events), LinkStep::Fired);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Destroyed { .. })));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::Explosion { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_line_shown_then_hidden_once() {
        let mut registry = sun_registry();
        let mut link = link();
        let mut events = Vec::new();
        let far = TrackingFrame::new()
            .with("EarthCard", Vec3::ZERO)
            .with("AsteroidCard", Vec3::new(0.2, 0.0, 0.0));

        link.update(&far, &mut registry, 0.1, &mut events);
        assert!(matches!(
            &events[0],
            GameEvent::LinkUpdated { label, .. } if label == "20.0 cm"
        ));

        let lost = TrackingFrame::new().with("EarthCard", Vec3::ZERO);
        events.clear();
        link.update(&lost, &mut registry, 0.1, &mut events);
        link.update(&lost, &mut registry, 0.1, &mut events);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::LinkHidden { link: 0 }));
    }
}
