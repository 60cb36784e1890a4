//! Presentation seam
//!
//! The simulation never draws anything. After each tick the host forwards the
//! engine snapshot, status messages and visual events to a `PresentationSink`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::{EngineSnapshot, GameEvent, GameState};

/// Short status line shown on the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatusMessage {
    LevelStarted { index: usize, name: String },
    LevelCompleted { index: usize, name: String },
    /// Timer ran out; the same level restarts
    LevelFailed { index: usize, name: String },
    AllLevelsCompleted { score: u64 },
    ObjectiveCompleted { label: String },
    Paused,
    Text(String),
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::LevelStarted { index, name } => {
                write!(f, "Level {} - {}: GO!", index + 1, name)
            }
            StatusMessage::LevelCompleted { index, .. } => {
                write!(f, "Level {} complete!", index + 1)
            }
            StatusMessage::LevelFailed { .. } => write!(f, "Time's up... level restarted."),
            StatusMessage::AllLevelsCompleted { score } => {
                write!(f, "GG! All levels complete. Final score: {}", score)
            }
            StatusMessage::ObjectiveCompleted { label } => {
                write!(f, "Objective complete: {}", label)
            }
            StatusMessage::Paused => write!(f, "Paused"),
            StatusMessage::Text(text) => f.write_str(text),
        }
    }
}

/// Receiver for everything the HUD and renderer need
pub trait PresentationSink {
    fn show_snapshot(&mut self, snapshot: &EngineSnapshot);

    fn show_message(&mut self, message: &StatusMessage);

    /// Visual events (spawns, explosions, link line, info panel)
    fn handle_event(&mut self, _event: &GameEvent) {}
}

/// Hand everything produced since the last call to the sink: visual events,
/// then status messages, then the current snapshot
pub fn present(state: &mut GameState, sink: &mut impl PresentationSink) {
    for event in state.drain_events() {
        sink.handle_event(&event);
    }
    for message in state.engine.drain_messages() {
        sink.show_message(&message);
    }
    sink.show_snapshot(&state.engine.snapshot());
}

/// Countdown as `MM:SS`, rounding up and clamping at zero
pub fn format_timer(seconds: f32) -> String {
    let total = seconds.max(0.0).ceil() as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// One line per objective: `label : progress/target [OK]`
pub fn objectives_text(snapshot: &EngineSnapshot) -> String {
    snapshot
        .objectives
        .iter()
        .map(|o| {
            let done = if o.completed { " [OK]" } else { "" };
            format!("{} : {}/{}{}", o.label, o.progress, o.target, done)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Distance label shown on a proximity link (metres in, centimetres out)
pub fn distance_label(distance: f32) -> String {
    format!("{:.1} cm", distance * 100.0)
}

/// Sink that writes HUD changes to the log
#[derive(Debug, Default)]
pub struct LogPresenter {
    last_hud: String,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationSink for LogPresenter {
    fn show_snapshot(&mut self, snapshot: &EngineSnapshot) {
        let hud = format!(
            "Level {} | Score: {} | {}\n{}",
            snapshot.level_index + 1,
            snapshot.score,
            format_timer(snapshot.remaining_time),
            objectives_text(snapshot)
        );
        // Timer ticks every frame; only log when something else changed
        let key = format!("{}|{}|{}", snapshot.level_index, snapshot.score, objectives_text(snapshot));
        if key != self.last_hud {
            log::info!("{}", hud);
            self.last_hud = key;
        }
    }

    fn show_message(&mut self, message: &StatusMessage) {
        log::info!("[HUD] {}", message);
    }

    fn handle_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::LinkUpdated { .. } => log::trace!("{:?}", event),
            _ => log::debug!("{:?}", event),
        }
    }
}

/// Sink that keeps everything it receives (replays, tests)
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub snapshots: Vec<EngineSnapshot>,
    pub messages: Vec<StatusMessage>,
    pub events: Vec<GameEvent>,
}

impl PresentationSink for RecordingPresenter {
    fn show_snapshot(&mut self, snapshot: &EngineSnapshot) {
        self.snapshots.push(snapshot.clone());
    }

    fn show_message(&mut self, message: &StatusMessage) {
        self.messages.push(message.clone());
    }

    fn handle_event(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::{EnginePhase, ObjectiveSnapshot, tick};
    use crate::tracking::TrackingFrame;
    use glam::Vec3;

    #[test]
    fn test_format_timer() {
        assert_eq!(format_timer(0.0), "00:00");
        assert_eq!(format_timer(-3.0), "00:00");
        assert_eq!(format_timer(59.2), "01:00");
        assert_eq!(format_timer(125.0), "02:05");
    }

    #[test]
    fn test_objectives_text() {
        let snapshot = EngineSnapshot {
            level_index: 0,
            level_name: "One".to_string(),
            phase: EnginePhase::Running,
            score: 0,
            remaining_time: 60.0,
            objectives: vec![
                ObjectiveSnapshot {
                    label: "Make Earth appear".to_string(),
                    progress: 1,
                    target: 1,
                    completed: true,
                },
                ObjectiveSnapshot {
                    label: "Read planet info".to_string(),
                    progress: 0,
                    target: 2,
                    completed: false,
                },
            ],
        };
        assert_eq!(
            objectives_text(&snapshot),
            "Make Earth appear : 1/1 [OK]\nRead planet info : 0/2"
        );
    }

    #[test]
    fn test_distance_label() {
        assert_eq!(distance_label(0.065), "6.5 cm");
        assert_eq!(distance_label(0.1), "10.0 cm");
    }

    #[test]
    fn test_status_message_text() {
        let msg = StatusMessage::LevelStarted {
            index: 0,
            name: "Inner planets".to_string(),
        };
        assert_eq!(msg.to_string(), "Level 1 - Inner planets: GO!");
        assert_eq!(StatusMessage::Text("hi".into()).to_string(), "hi");
    }

    #[test]
    fn test_present_drains_state() {
        let mut state = GameState::new(&GameConfig::default());
        let frame = TrackingFrame::new()
            .with("Sun", Vec3::ZERO)
            .with("EarthCard", Vec3::X);
        tick(&mut state, &frame, 0.1);

        let mut sink = RecordingPresenter::default();
        present(&mut state, &mut sink);
        assert!(sink
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Spawned { .. })));
        assert!(matches!(
            sink.messages.first(),
            Some(StatusMessage::LevelStarted { index: 0, .. })
        ));
        assert_eq!(sink.snapshots.len(), 1);
        assert_eq!(sink.snapshots[0].objectives[0].progress, 1);

        // nothing left to forward
        let messages = sink.messages.len();
        present(&mut state, &mut sink);
        assert_eq!(sink.messages.len(), messages);
        assert_eq!(sink.snapshots.len(), 2);
    }
}
