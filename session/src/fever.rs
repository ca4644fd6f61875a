//! Fever gauge, countdown, and decorative overlay bookkeeping.

use std::time::Duration;

use cardfall_core::{FeverConfig, FeverPhase, ImageKey};
use tracing::warn;

use crate::rng::SplitMix64;

/// Result of feeding one committed right swipe into the gauge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GaugeOutcome {
    /// Swipe ignored because the bonus mode is already running.
    Ignored,
    /// Gauge advanced without reaching its maximum.
    Charged,
    /// Gauge reached its maximum and the bonus mode should begin.
    Ready,
    /// Gauge reached its maximum with an empty liked pool and was reset.
    ResetEmptyPool,
}

/// State backing the fever bonus mode.
///
/// Both logical timers (the countdown deadline and the overlay spawn
/// accumulator) are plain session-clock arithmetic, so [`FeverState::end`]
/// cancels them atomically.
#[derive(Clone, Debug)]
pub(crate) struct FeverState {
    config: FeverConfig,
    phase: FeverPhase,
    gauge: u32,
    active_until: Duration,
    overlay_accumulator: Duration,
    active_overlays: u32,
}

impl FeverState {
    pub(crate) fn new(config: FeverConfig) -> Self {
        Self {
            config,
            phase: FeverPhase::Idle,
            gauge: 0,
            active_until: Duration::ZERO,
            overlay_accumulator: Duration::ZERO,
            active_overlays: 0,
        }
    }

    pub(crate) fn phase(&self) -> FeverPhase {
        self.phase
    }

    pub(crate) fn is_active(&self) -> bool {
        self.phase == FeverPhase::Active
    }

    pub(crate) fn active_overlays(&self) -> u32 {
        self.active_overlays
    }

    /// Charge percentage derived from the gauge value.
    pub(crate) fn gauge_percent(&self) -> f32 {
        let ratio = self.gauge as f32 / self.config.max_gauge.get() as f32;
        ratio.min(1.0) * 100.0
    }

    /// Remaining-time percentage while the bonus mode is running.
    pub(crate) fn remaining_percent(&self, clock: Duration) -> f32 {
        if self.config.duration.is_zero() || clock >= self.active_until {
            return 0.0;
        }
        let left = self.active_until - clock;
        (left.as_secs_f32() / self.config.duration.as_secs_f32()) * 100.0
    }

    /// Feeds one committed right swipe into the gauge.
    ///
    /// `liked_len` is the liked-pool size after the swiped card was
    /// appended; an empty pool at the activation edge resets the gauge
    /// instead of starting the bonus mode.
    pub(crate) fn advance_gauge(&mut self, liked_len: usize) -> GaugeOutcome {
        if self.phase == FeverPhase::Active {
            return GaugeOutcome::Ignored;
        }

        self.gauge = self.gauge.saturating_add(1);
        if self.gauge >= self.config.max_gauge.get() {
            if liked_len == 0 {
                warn!("gauge filled with an empty liked pool; resetting gauge");
                self.gauge = 0;
                self.phase = FeverPhase::Idle;
                return GaugeOutcome::ResetEmptyPool;
            }
            return GaugeOutcome::Ready;
        }

        self.phase = FeverPhase::Charging;
        GaugeOutcome::Charged
    }

    /// Activates the bonus mode at the provided session clock.
    pub(crate) fn begin(&mut self, clock: Duration) {
        if self.config.stickers.is_empty() {
            warn!("no overlay stickers configured; fever will spawn no overlays");
        }
        self.phase = FeverPhase::Active;
        self.gauge = self.config.max_gauge.get();
        self.active_until = clock.saturating_add(self.config.duration);
        self.overlay_accumulator = Duration::ZERO;
        self.active_overlays = 0;
    }

    /// Reports whether the countdown elapsed at the provided clock.
    pub(crate) fn expired(&self, clock: Duration) -> bool {
        self.phase == FeverPhase::Active && clock >= self.active_until
    }

    /// Ends the bonus mode, cancelling both timers and clearing overlays.
    pub(crate) fn end(&mut self) {
        self.phase = FeverPhase::Idle;
        self.gauge = 0;
        self.active_until = Duration::ZERO;
        self.overlay_accumulator = Duration::ZERO;
        self.active_overlays = 0;
    }

    /// Advances the overlay accumulator, yielding stickers to spawn.
    ///
    /// One spawn attempt fires per elapsed interval; attempts above the
    /// concurrent cap are dropped rather than queued.
    pub(crate) fn spawn_overlays(&mut self, dt: Duration, rng: &mut SplitMix64) -> Vec<ImageKey> {
        if self.phase != FeverPhase::Active
            || self.config.stickers.is_empty()
            || self.config.sticker_interval.is_zero()
        {
            return Vec::new();
        }

        self.overlay_accumulator = self.overlay_accumulator.saturating_add(dt);
        let mut spawned = Vec::new();
        while self.overlay_accumulator >= self.config.sticker_interval {
            self.overlay_accumulator -= self.config.sticker_interval;
            if self.active_overlays < self.config.max_overlays {
                let sticker = self.config.stickers[rng.next_index(self.config.stickers.len())].clone();
                self.active_overlays += 1;
                spawned.push(sticker);
            }
        }
        spawned
    }

    /// Releases one overlay slot after its animation finished.
    pub(crate) fn expire_overlay(&mut self) {
        self.active_overlays = self.active_overlays.saturating_sub(1);
    }
}
