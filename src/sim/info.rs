//! Information marker
//!
//! Holding the info card next to planet cards opens the fact sheet of the
//! nearest visible planet. Each newly selected planet counts once as "info
//! viewed".

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::GameEvent;
use crate::IdentityKey;
use crate::tracking::TrackingProvider;

const FALLBACK_TITLE: &str = "Information";
const NO_PLANET_TEXT: &str = "Show a planet card together with the Information target.";

/// Fact sheet for one planet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoEntry {
    pub identity: IdentityKey,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Case-insensitive lookup of fact sheets
#[derive(Debug, Clone, Default)]
pub struct InfoDatabase {
    entries: HashMap<IdentityKey, InfoEntry>,
}

impl InfoDatabase {
    /// Build from a list; later duplicates replace earlier ones
    pub fn new(entries: impl IntoIterator<Item = InfoEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.identity.clone(), entry))
                .collect(),
        }
    }

    pub fn get(&self, identity: &IdentityKey) -> Option<&InfoEntry> {
        self.entries.get(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A planet card the info marker can read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Companion {
    pub marker: IdentityKey,
    pub identity: IdentityKey,
}

fn default_pick_nearest() -> bool {
    true
}

/// Configuration of one info marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoRevealConfig {
    pub marker: IdentityKey,
    #[serde(default)]
    pub companions: Vec<Companion>,
    /// With several planets visible, pick the one closest to the info card
    #[serde(default = "default_pick_nearest")]
    pub pick_nearest: bool,
}

/// Info marker state
#[derive(Debug, Clone)]
pub struct InfoReveal {
    index: usize,
    config: InfoRevealConfig,
    last_scored: Option<IdentityKey>,
    shown: Option<(String, String)>,
}

impl InfoReveal {
    pub fn new(index: usize, config: InfoRevealConfig) -> Self {
        Self {
            index,
            config,
            last_scored: None,
            shown: None,
        }
    }

    pub fn config(&self) -> &InfoRevealConfig {
        &self.config
    }

    pub fn last_scored(&self) -> Option<&IdentityKey> {
        self.last_scored.as_ref()
    }

    /// Pick the tracked companion to describe
    pub fn select(&self, tracking: &impl TrackingProvider, origin: Vec3) -> Option<&Companion> {
        let mut tracked = self
            .config
            .companions
            .iter()
            .filter_map(|c| tracking.position(&c.marker).map(|p| (c, p)));

        if !self.config.pick_nearest {
            return tracked.next().map(|(c, _)| c);
        }

        let mut best: Option<(&Companion, f32)> = None;
        for (companion, position) in tracked {
            let d = origin.distance(position);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((companion, d));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Returns the identity newly reported as viewed, if any
    pub fn update(
        &mut self,
        tracking: &impl TrackingProvider,
        database: &InfoDatabase,
        events: &mut Vec<GameEvent>,
    ) -> Option<IdentityKey> {
        let Some(origin) = tracking.position(&self.config.marker) else {
            if self.shown.take().is_some() {
                events.push(GameEvent::InfoHidden { panel: self.index });
            }
            self.last_scored = None;
            return None;
        };

        let selected = self.select(tracking, origin).map(|c| c.identity.clone());
        let content = match &selected {
            None => (FALLBACK_TITLE.to_string(), NO_PLANET_TEXT.to_string()),
            Some(identity) => match database.get(identity) {
                Some(entry) => (entry.title.clone(), entry.description.clone()),
                None => (
                    FALLBACK_TITLE.to_string(),
                    format!("No fact sheet found for ID: {}", identity),
                ),
            },
        };
        if self.shown.as_ref() != Some(&content) {
            events.push(GameEvent::InfoShown {
                panel: self.index,
                title: content.0.clone(),
                body: content.1.clone(),
            });
            self.shown = Some(content);
        }

        let identity = selected?;
        if self.last_scored.as_ref() == Some(&identity) {
            return None;
        }
        log::info!("Info viewed: {}", identity);
        self.last_scored = Some(identity.clone());
        events.push(GameEvent::InfoViewed {
            identity: identity.clone(),
        });
        Some(identity)
    }
}
