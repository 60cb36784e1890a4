//! Level and objective progression
//!
//! The engine walks an ordered list of timed levels. Each level holds scored
//! objectives that advance on spawn / info / destroy actions. Actions are also
//! recorded in session-wide `GlobalStats`, which seed the objective state every
//! time a level is (re)entered.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::IdentityKey;
use crate::consts::*;
use crate::presentation::StatusMessage;

/// Action family an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Spawn,
    Info,
    Destroy,
}

/// What an objective asks the player to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveKind {
    SpawnAny,
    SpawnSpecific,
    ViewInfoAny,
    ViewInfoSpecific,
    DestroyAny,
    DestroySpecific,
}

impl ObjectiveKind {
    pub fn action(self) -> ActionKind {
        match self {
            ObjectiveKind::SpawnAny | ObjectiveKind::SpawnSpecific => ActionKind::Spawn,
            ObjectiveKind::ViewInfoAny | ObjectiveKind::ViewInfoSpecific => ActionKind::Info,
            ObjectiveKind::DestroyAny | ObjectiveKind::DestroySpecific => ActionKind::Destroy,
        }
    }

    /// Specific kinds target a single identity
    pub fn is_specific(self) -> bool {
        matches!(
            self,
            ObjectiveKind::SpawnSpecific
                | ObjectiveKind::ViewInfoSpecific
                | ObjectiveKind::DestroySpecific
        )
    }
}

fn default_target_count() -> u32 {
    1
}

fn default_points() -> u32 {
    POINTS_PER_PROGRESS
}

fn default_objective_bonus() -> u32 {
    BONUS_ON_COMPLETE
}

/// A single scorable goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    pub kind: ObjectiveKind,
    /// Required for the Specific kinds
    #[serde(default)]
    pub target: Option<IdentityKey>,
    #[serde(default = "default_target_count")]
    pub target_count: u32,
    /// Points for every step of progress
    #[serde(default = "default_points")]
    pub points_per_progress: u32,
    /// Bonus when the objective completes
    #[serde(default = "default_objective_bonus")]
    pub bonus_on_complete: u32,
}

impl Objective {
    pub fn new(kind: ObjectiveKind, target_count: u32) -> Self {
        Self {
            kind,
            target: None,
            target_count,
            points_per_progress: POINTS_PER_PROGRESS,
            bonus_on_complete: BONUS_ON_COMPLETE,
        }
    }

    /// Specific objective for one identity
    pub fn specific(kind: ObjectiveKind, target: &str) -> Self {
        Self {
            target: IdentityKey::new(target),
            ..Self::new(kind, 1)
        }
    }

    pub fn with_rewards(mut self, points_per_progress: u32, bonus_on_complete: u32) -> Self {
        self.points_per_progress = points_per_progress;
        self.bonus_on_complete = bonus_on_complete;
        self
    }

    /// Specific objective without a target identity; it can never match
    pub fn is_inert(&self) -> bool {
        self.kind.is_specific() && self.target.is_none()
    }

    /// Whether an action on `identity` advances this objective
    pub fn matches(&self, action: ActionKind, identity: &str) -> bool {
        if self.kind.action() != action {
            return false;
        }
        if !self.kind.is_specific() {
            return true;
        }
        self.target.as_ref().is_some_and(|t| t.matches(identity))
    }

    /// HUD label
    pub fn label(&self) -> String {
        let target = self.target.as_ref().map(IdentityKey::as_str).unwrap_or("?");
        match self.kind {
            ObjectiveKind::SpawnAny => "Make planets appear".to_string(),
            ObjectiveKind::SpawnSpecific => format!("Make {target} appear"),
            ObjectiveKind::ViewInfoAny => "Read planet info".to_string(),
            ObjectiveKind::ViewInfoSpecific => format!("Read info on {target}"),
            ObjectiveKind::DestroyAny => "Destroy planets (asteroid)".to_string(),
            ObjectiveKind::DestroySpecific => format!("Destroy {target}"),
        }
    }
}

fn default_level_name() -> String {
    "Level".to_string()
}

fn default_duration() -> f32 {
    LEVEL_DURATION
}

fn default_level_bonus() -> u32 {
    BONUS_ON_LEVEL_COMPLETE
}

/// A timed level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    #[serde(default = "default_level_name")]
    pub name: String,
    /// Seconds allowed before the level restarts
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default = "default_level_bonus")]
    pub bonus_on_level_complete: u32,
}

impl Level {
    pub fn new(name: &str, duration: f32, objectives: Vec<Objective>) -> Self {
        Self {
            name: name.to_string(),
            duration,
            objectives,
            bonus_on_level_complete: BONUS_ON_LEVEL_COMPLETE,
        }
    }

    pub fn with_bonus(mut self, bonus_on_level_complete: u32) -> Self {
        self.bonus_on_level_complete = bonus_on_level_complete;
        self
    }
}

/// Progress of one objective in the current level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveState {
    pub progress: u32,
    pub completed: bool,
}

/// Session-wide record of distinct identities per action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalStats {
    spawned: HashSet<IdentityKey>,
    info_viewed: HashSet<IdentityKey>,
    destroyed: HashSet<IdentityKey>,
    total_spawned: u32,
    total_info_viewed: u32,
    total_destroyed: u32,
}

impl GlobalStats {
    /// Record an action; returns true only the first time an identity is seen
    pub fn record(&mut self, action: ActionKind, identity: &str) -> bool {
        let Some(key) = IdentityKey::new(identity) else {
            return false;
        };
        let (set, total) = match action {
            ActionKind::Spawn => (&mut self.spawned, &mut self.total_spawned),
            ActionKind::Info => (&mut self.info_viewed, &mut self.total_info_viewed),
            ActionKind::Destroy => (&mut self.destroyed, &mut self.total_destroyed),
        };
        if !set.insert(key) {
            return false;
        }
        *total += 1;
        true
    }

    /// Cumulative count used by the Any objectives
    pub fn total(&self, action: ActionKind) -> u32 {
        match action {
            ActionKind::Spawn => self.total_spawned,
            ActionKind::Info => self.total_info_viewed,
            ActionKind::Destroy => self.total_destroyed,
        }
    }

    pub fn contains(&self, action: ActionKind, identity: &IdentityKey) -> bool {
        self.set(action).contains(identity)
    }

    pub fn distinct(&self, action: ActionKind) -> usize {
        self.set(action).len()
    }

    fn set(&self, action: ActionKind) -> &HashSet<IdentityKey> {
        match action {
            ActionKind::Spawn => &self.spawned,
            ActionKind::Info => &self.info_viewed,
            ActionKind::Destroy => &self.destroyed,
        }
    }

    /// Progress an objective would have if its level started now
    fn seed_progress(&self, objective: &Objective) -> u32 {
        let action = objective.kind.action();
        let progress = if objective.kind.is_specific() {
            match &objective.target {
                Some(target) if self.contains(action, target) => 1,
                _ => 0,
            }
        } else {
            self.total(action)
        };
        progress.min(objective.target_count)
    }
}

/// Engine progression phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    /// Configured but not running (initial state, or stopped)
    Idle,
    /// Level timer counting down
    Running,
    /// Every level has been completed
    AllLevelsDone,
}

/// HUD view of one objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSnapshot {
    pub label: String,
    pub progress: u32,
    pub target: u32,
    pub completed: bool,
}

/// Read-only view of the engine for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub level_index: usize,
    pub level_name: String,
    pub phase: EnginePhase,
    pub score: u64,
    pub remaining_time: f32,
    pub objectives: Vec<ObjectiveSnapshot>,
}

/// Level/objective state machine
#[derive(Debug, Clone)]
pub struct ObjectiveEngine {
    levels: Vec<Level>,
    level_index: usize,
    phase: EnginePhase,
    time_left: f32,
    objectives: Vec<ObjectiveState>,
    stats: GlobalStats,
    score: u64,
    /// Status messages not yet handed to the presentation sink
    messages: Vec<StatusMessage>,
}

impl Default for ObjectiveEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectiveEngine {
    pub fn new() -> Self {
        Self {
            levels: Vec::new(),
            level_index: 0,
            phase: EnginePhase::Idle,
            time_left: 0.0,
            objectives: Vec::new(),
            stats: GlobalStats::default(),
            score: 0,
            messages: Vec::new(),
        }
    }

    /// Replace the level list and rewind to the first level (Idle)
    pub fn load_levels(&mut self, levels: Vec<Level>) {
        for (li, level) in levels.iter().enumerate() {
            for (oi, objective) in level.objectives.iter().enumerate() {
                if objective.is_inert() {
                    log::warn!(
                        "Level {} ({}) objective {}: {:?} has no target identity and will never match",
                        li,
                        level.name,
                        oi,
                        objective.kind
                    );
                }
                if objective.target_count == 0 {
                    log::warn!(
                        "Level {} ({}) objective {}: target count is 0, objective starts completed",
                        li,
                        level.name,
                        oi
                    );
                }
            }
        }

        self.levels = levels;
        self.level_index = 0;
        self.phase = EnginePhase::Idle;
        match self.levels.first() {
            Some(level) => {
                self.time_left = level.duration;
                self.sync_from_stats();
            }
            None => {
                self.time_left = 0.0;
                self.objectives.clear();
            }
        }
        log::info!("Loaded {} levels", self.levels.len());
    }

    /// Start (or restart) the current level with a full timer
    pub fn start_current_level(&mut self) {
        if self.levels.is_empty() || self.phase == EnginePhase::AllLevelsDone {
            return;
        }
        self.enter_level(self.level_index);
    }

    /// Freeze the timer; actions still feed the global stats
    pub fn stop_level(&mut self) {
        if self.phase != EnginePhase::Running {
            return;
        }
        self.phase = EnginePhase::Idle;
        self.messages.push(StatusMessage::Paused);
    }

    /// Advance the level timer; restarts the level on timeout
    pub fn tick(&mut self, dt: f32) {
        if self.phase != EnginePhase::Running {
            return;
        }
        self.time_left -= dt;
        if self.time_left > 0.0 {
            return;
        }

        let index = self.level_index;
        let name = self.levels[index].name.clone();
        log::info!("Level {} ({}) timed out, restarting", index, name);
        self.messages.push(StatusMessage::LevelFailed { index, name });
        self.enter_level(index);
    }

    pub fn register_spawn(&mut self, identity: &str) {
        self.register(ActionKind::Spawn, identity);
    }

    pub fn register_info(&mut self, identity: &str) {
        self.register(ActionKind::Info, identity);
    }

    pub fn register_destroy(&mut self, identity: &str) {
        self.register(ActionKind::Destroy, identity);
    }

    /// Record an action in the global stats, then advance at most one objective
    pub fn register(&mut self, action: ActionKind, identity: &str) {
        if self.stats.record(action, identity) {
            log::debug!(
                "{:?} '{}' recorded ({} distinct)",
                action,
                identity,
                self.stats.distinct(action)
            );
        }
        self.advance_objective(action, identity);
    }

    fn advance_objective(&mut self, action: ActionKind, identity: &str) {
        if self.phase != EnginePhase::Running {
            return;
        }
        let Some(level) = self.levels.get(self.level_index) else {
            return;
        };

        let hit = level
            .objectives
            .iter()
            .zip(&self.objectives)
            .position(|(objective, state)| !state.completed && objective.matches(action, identity));
        let Some(i) = hit else {
            return;
        };

        let objective = &level.objectives[i];
        let state = &mut self.objectives[i];
        state.progress = (state.progress + 1).min(objective.target_count);
        self.score += u64::from(objective.points_per_progress);

        if state.progress >= objective.target_count {
            state.completed = true;
            self.score += u64::from(objective.bonus_on_complete);
            let label = objective.label();
            log::info!("Objective complete: {}", label);
            self.messages.push(StatusMessage::ObjectiveCompleted { label });
        }

        if self.all_completed() {
            if let Some(next) = self.finish_level() {
                self.enter_level(next);
            }
        }
    }

    /// Enter a level: resync, full timer, Running. Levels that start fully
    /// satisfied complete on entry and hand over to the next one.
    fn enter_level(&mut self, index: usize) {
        let mut index = index;
        loop {
            self.level_index = index;
            let level = &self.levels[index];
            self.time_left = level.duration;
            let name = level.name.clone();
            self.sync_from_stats();
            self.phase = EnginePhase::Running;
            log::info!("Level {} ({}) started, {:.0}s", index, name, self.time_left);
            self.messages.push(StatusMessage::LevelStarted { index, name });

            if !self.all_completed() {
                return;
            }
            match self.finish_level() {
                Some(next) => index = next,
                None => return,
            }
        }
    }

    /// Award the level bonus and pick the next level, if any
    fn finish_level(&mut self) -> Option<usize> {
        let index = self.level_index;
        let level = &self.levels[index];
        self.score += u64::from(level.bonus_on_level_complete);
        self.phase = EnginePhase::Idle;
        log::info!("Level {} ({}) complete, score {}", index, level.name, self.score);
        self.messages.push(StatusMessage::LevelCompleted {
            index,
            name: level.name.clone(),
        });

        let next = index + 1;
        if next < self.levels.len() {
            return Some(next);
        }
        self.phase = EnginePhase::AllLevelsDone;
        log::info!("All {} levels complete, final score {}", self.levels.len(), self.score);
        self.messages.push(StatusMessage::AllLevelsCompleted { score: self.score });
        None
    }

    fn all_completed(&self) -> bool {
        self.objectives.iter().all(|s| s.completed)
    }

    /// Recompute the current level's objective states from the global stats
    fn sync_from_stats(&mut self) {
        let level = &self.levels[self.level_index];
        self.objectives = level
            .objectives
            .iter()
            .map(|objective| {
                let progress = self.stats.seed_progress(objective);
                ObjectiveState {
                    progress,
                    completed: progress >= objective.target_count,
                }
            })
            .collect();
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let level = self.levels.get(self.level_index);
        let objectives = level
            .map(|level| {
                level
                    .objectives
                    .iter()
                    .zip(&self.objectives)
                    .map(|(objective, state)| ObjectiveSnapshot {
                        label: objective.label(),
                        progress: state.progress,
                        target: objective.target_count,
                        completed: state.completed,
                    })
                    .collect()
            })
            .unwrap_or_default();

        EngineSnapshot {
            level_index: self.level_index,
            level_name: level.map(|l| l.name.clone()).unwrap_or_default(),
            phase: self.phase,
            score: self.score,
            remaining_time: self.time_left,
            objectives,
        }
    }

    /// Take the status messages produced since the last drain
    pub fn drain_messages(&mut self) -> Vec<StatusMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn remaining_time(&self) -> f32 {
        self.time_left
    }

    pub fn objective_states(&self) -> &[ObjectiveState] {
        &self.objectives
    }

    pub fn stats(&self) -> &GlobalStats {
        &self.stats
    }
}
