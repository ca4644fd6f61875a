#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure gesture system translating pointer input into swipe commands.
//!
//! The tracker follows the pointer while a drag is in progress and emits a
//! single [`Command::CommitSwipe`] when the release displacement crosses the
//! commit threshold. After emitting it holds in a committing phase until the
//! session confirms the stack mutation, so a queued command can never be
//! duplicated by further input.

use cardfall_core::{Command, Event, SwipeDirection};

const DEFAULT_THRESHOLD_RATIO: f32 = 0.25;

/// Fraction of the commit threshold at which the card visibly leans.
const SOFT_LEAN_FACTOR: f32 = 0.4;

/// Configuration parameters required to construct the gesture system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    threshold_ratio: f32,
}

impl Config {
    /// Creates a new configuration using the provided commit threshold ratio,
    /// expressed as a fraction of the viewport width.
    #[must_use]
    pub const fn new(threshold_ratio: f32) -> Self {
        Self { threshold_ratio }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_RATIO)
    }
}

/// Raw pointer input sample forwarded by the presentation adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    /// Pointer pressed at the provided viewport coordinates.
    Down {
        /// Horizontal viewport coordinate of the press.
        x: f32,
        /// Vertical viewport coordinate of the press.
        y: f32,
    },
    /// Pointer moved to the provided viewport coordinates.
    Move {
        /// Horizontal viewport coordinate of the sample.
        x: f32,
        /// Vertical viewport coordinate of the sample.
        y: f32,
    },
    /// Pointer released.
    Up,
}

/// Phase of the gesture state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    /// No drag is in progress.
    Idle,
    /// Pointer is down and the front card follows it.
    Dragging,
    /// A swipe command was emitted and awaits stack confirmation.
    Committing,
}

/// Pure system that turns pointer samples into swipe commands.
#[derive(Debug)]
pub struct GestureTracker {
    threshold_ratio: f32,
    phase: GesturePhase,
    origin_x: f32,
    current_x: f32,
}

impl GestureTracker {
    /// Creates a new tracker using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            threshold_ratio: config.threshold_ratio,
            phase: GesturePhase::Idle,
            origin_x: 0.0,
            current_x: 0.0,
        }
    }

    /// Consumes session events and pointer samples to emit swipe commands.
    ///
    /// `front_present` gates new drags; a drag can only begin while the
    /// stack holds a card to move.
    pub fn handle(
        &mut self,
        events: &[Event],
        inputs: &[PointerInput],
        viewport_width: f32,
        front_present: bool,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if matches!(event, Event::StackChanged { .. }) && self.phase == GesturePhase::Committing
            {
                self.reset();
            }
        }

        for input in inputs {
            match *input {
                PointerInput::Down { x, .. } => {
                    if self.phase == GesturePhase::Idle && front_present {
                        self.phase = GesturePhase::Dragging;
                        self.origin_x = x;
                        self.current_x = x;
                    }
                }
                PointerInput::Move { x, .. } => {
                    if self.phase == GesturePhase::Dragging {
                        self.current_x = x;
                    }
                }
                PointerInput::Up => {
                    if self.phase != GesturePhase::Dragging {
                        continue;
                    }
                    let displacement = self.current_x - self.origin_x;
                    if displacement.abs() > self.commit_threshold(viewport_width) {
                        let direction = if displacement > 0.0 {
                            SwipeDirection::Right
                        } else {
                            SwipeDirection::Left
                        };
                        out.push(Command::CommitSwipe { direction });
                        self.phase = GesturePhase::Committing;
                    } else {
                        self.reset();
                    }
                }
            }
        }
    }

    /// Current phase of the gesture state machine.
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Horizontal displacement of the drag in progress, zero otherwise.
    #[must_use]
    pub fn displacement(&self) -> f32 {
        match self.phase {
            GesturePhase::Idle => 0.0,
            GesturePhase::Dragging | GesturePhase::Committing => self.current_x - self.origin_x,
        }
    }

    /// Direction the dragged card visibly leans toward, if any.
    #[must_use]
    pub fn lean(&self, viewport_width: f32) -> Option<SwipeDirection> {
        if self.phase != GesturePhase::Dragging {
            return None;
        }
        let displacement = self.current_x - self.origin_x;
        if displacement.abs() <= self.commit_threshold(viewport_width) * SOFT_LEAN_FACTOR {
            return None;
        }
        Some(if displacement > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        })
    }

    fn commit_threshold(&self, viewport_width: f32) -> f32 {
        viewport_width * self.threshold_ratio
    }

    fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
        self.origin_x = 0.0;
        self.current_x = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, GesturePhase, GestureTracker, PointerInput};
    use cardfall_core::{Command, Event, SwipeDirection};

    const VIEWPORT: f32 = 1_000.0;

    fn drag(tracker: &mut GestureTracker, to_x: f32, out: &mut Vec<Command>) {
        let inputs = [
            PointerInput::Down { x: 500.0, y: 400.0 },
            PointerInput::Move { x: to_x, y: 400.0 },
            PointerInput::Up,
        ];
        tracker.handle(&[], &inputs, VIEWPORT, true, out);
    }

    #[test]
    fn displacement_below_threshold_snaps_back() {
        let mut tracker = GestureTracker::new(Config::default());
        let mut out = Vec::new();
        drag(&mut tracker, 740.0, &mut out);
        assert!(out.is_empty());
        assert_eq!(tracker.phase(), GesturePhase::Idle);
    }

    #[test]
    fn displacement_exactly_at_threshold_snaps_back() {
        let mut tracker = GestureTracker::new(Config::default());
        let mut out = Vec::new();
        drag(&mut tracker, 750.0, &mut out);
        assert!(out.is_empty());
        assert_eq!(tracker.phase(), GesturePhase::Idle);
    }

    #[test]
    fn displacement_past_threshold_commits_right() {
        let mut tracker = GestureTracker::new(Config::default());
        let mut out = Vec::new();
        drag(&mut tracker, 760.0, &mut out);
        assert_eq!(
            out,
            vec![Command::CommitSwipe {
                direction: SwipeDirection::Right,
            }]
        );
        assert_eq!(tracker.phase(), GesturePhase::Committing);
    }

    #[test]
    fn displacement_past_threshold_commits_left() {
        let mut tracker = GestureTracker::new(Config::default());
        let mut out = Vec::new();
        drag(&mut tracker, 240.0, &mut out);
        assert_eq!(
            out,
            vec![Command::CommitSwipe {
                direction: SwipeDirection::Left,
            }]
        );
    }

    #[test]
    fn committing_phase_ignores_further_input_until_confirmation() {
        let mut tracker = GestureTracker::new(Config::default());
        let mut out = Vec::new();
        drag(&mut tracker, 800.0, &mut out);
        drag(&mut tracker, 800.0, &mut out);
        assert_eq!(out.len(), 1, "queued command must not duplicate");

        tracker.handle(
            &[Event::StackChanged { cards: Vec::new() }],
            &[],
            VIEWPORT,
            true,
            &mut out,
        );
        assert_eq!(tracker.phase(), GesturePhase::Idle);

        drag(&mut tracker, 800.0, &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn drags_cannot_begin_without_a_front_card() {
        let mut tracker = GestureTracker::new(Config::default());
        let mut out = Vec::new();
        tracker.handle(
            &[],
            &[PointerInput::Down { x: 500.0, y: 400.0 }],
            VIEWPORT,
            false,
            &mut out,
        );
        assert_eq!(tracker.phase(), GesturePhase::Idle);
    }

    #[test]
    fn lean_tracks_soft_threshold_and_direction() {
        let mut tracker = GestureTracker::new(Config::default());
        let mut out = Vec::new();
        tracker.handle(
            &[],
            &[
                PointerInput::Down { x: 500.0, y: 400.0 },
                PointerInput::Move { x: 590.0, y: 400.0 },
            ],
            VIEWPORT,
            true,
            &mut out,
        );
        // 90 points is below the 100-point soft threshold.
        assert_eq!(tracker.lean(VIEWPORT), None);

        tracker.handle(
            &[],
            &[PointerInput::Move { x: 390.0, y: 400.0 }],
            VIEWPORT,
            true,
            &mut out,
        );
        assert_eq!(tracker.lean(VIEWPORT), Some(SwipeDirection::Left));
        assert_eq!(tracker.displacement(), -110.0);
    }
}
