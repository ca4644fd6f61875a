#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative swipe-deck session state for Cardfall.
//!
//! The session owns the catalog, the liked-item store, the card stack, and
//! the fever state machine. Adapters mutate it exclusively through [`apply`]
//! and observe it through the emitted [`Event`] stream plus the read-only
//! [`query`] functions. All randomness flows through one seeded stream, so a
//! replayed command sequence reproduces the session exactly.

mod catalog;
mod fever;
mod rng;
mod selection;

use std::{collections::VecDeque, time::Duration};

use cardfall_core::{
    Card, CatalogError, Command, Event, FeverConfig, LikedEntry, SelectionPolicy, SwipeDirection,
};
use tracing::warn;

use crate::catalog::{CaptionTable, Catalog, LikedStore};
use crate::fever::{FeverState, GaugeOutcome};
use crate::rng::SplitMix64;
use crate::selection::{HistoryKey, SelectionHistory};

const DEFAULT_STACK_CAPACITY: usize = 4;
const DEFAULT_RNG_SEED: u64 = 0x6c62_272e_07bb_0142;

/// Startup parameters for a session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Number of cards the stack holds when fully populated.
    pub stack_capacity: usize,
    /// Seed of the random stream backing all selections.
    pub rng_seed: u64,
    /// Parameters governing the fever bonus mode.
    pub fever: FeverConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
            rng_seed: DEFAULT_RNG_SEED,
            fever: FeverConfig::default(),
        }
    }
}

/// Represents the authoritative Cardfall session state.
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    captions: CaptionTable,
    liked: LikedStore,
    history: SelectionHistory,
    stack: VecDeque<Card>,
    policy: SelectionPolicy,
    fever: FeverState,
    clock: Duration,
    rng: SplitMix64,
    capacity: usize,
}

impl Session {
    /// Creates a new session ready to receive a catalog.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            catalog: Catalog::empty(),
            captions: CaptionTable::default(),
            liked: LikedStore::default(),
            history: SelectionHistory::default(),
            stack: VecDeque::new(),
            policy: SelectionPolicy::Normal,
            fever: FeverState::new(config.fever),
            clock: Duration::ZERO,
            rng: SplitMix64::new(config.rng_seed),
            capacity: config.stack_capacity.max(1),
        }
    }

    fn stack_cards(&self) -> Vec<Card> {
        self.stack.iter().cloned().collect()
    }

    /// Clears the stack and refills it to capacity under the current policy.
    ///
    /// Only the front card is drawn authoritatively; the cards behind it are
    /// previews and record no history until promoted.
    fn rebuild_stack(&mut self) {
        self.stack.clear();
        for index in 0..self.capacity {
            let preview = index != 0;
            let Some(card) = selection::select_next(
                &self.catalog,
                &self.captions,
                &self.liked,
                &mut self.history,
                &mut self.rng,
                self.policy,
                preview,
            ) else {
                break;
            };
            self.stack.push_back(card);
        }
    }

    /// Turns the preview card behind a consumed front card authoritative.
    fn promote_front(&mut self) {
        let policy = self.policy;
        let catalog_len = self.catalog.len();
        if let Some(front) = self.stack.front_mut() {
            if front.preview {
                front.preview = false;
                if policy == SelectionPolicy::Normal {
                    self.history.record(
                        HistoryKey {
                            member: front.member.clone(),
                            image: front.image.clone(),
                        },
                        catalog_len,
                    );
                }
            }
        }
    }

    fn append_preview(&mut self) {
        if self.stack.len() >= self.capacity {
            return;
        }
        if let Some(card) = selection::select_next(
            &self.catalog,
            &self.captions,
            &self.liked,
            &mut self.history,
            &mut self.rng,
            self.policy,
            true,
        ) {
            self.stack.push_back(card);
        }
    }

    fn clock_ms(&self) -> u64 {
        u64::try_from(self.clock.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureCatalog { config } => {
            session.catalog = Catalog::from_config(config);
            out_events.push(Event::CatalogConfigured {
                members: session.catalog.len(),
            });

            if session.fever.is_active() {
                out_events.push(Event::OverlaysCleared);
                out_events.push(Event::FeverEnded);
            }
            session.fever.end();
            out_events.push(Event::GaugeUpdated {
                percent: session.fever.gauge_percent(),
            });

            session.policy = SelectionPolicy::Normal;
            session.history.clear();
            session.rebuild_stack();
            out_events.push(Event::StackChanged {
                cards: session.stack_cards(),
            });
        }
        Command::ConfigureCaptions { captions } => {
            session.captions.install(captions);
        }
        Command::SeedLikedEntries { entries } => {
            session.liked.seed(entries);
        }
        Command::ApplyWeightSettings { settings } => {
            let ids: Vec<_> = session
                .catalog
                .members()
                .iter()
                .map(|member| member.id.clone())
                .collect();
            let default = i64::from(session.catalog.default_weight());

            for id in ids {
                let requested = settings.get(&id).unwrap_or(default);
                match session.catalog.set_weight(&id, requested) {
                    Ok(weight) => out_events.push(Event::WeightChanged { member: id, weight }),
                    Err(reason) => {
                        warn!(member = id.as_str(), %reason, "weight setting rejected");
                        out_events.push(Event::WeightRejected { member: id, reason });
                    }
                }
            }

            for (member, _) in settings.iter() {
                if session.catalog.member(member).is_none() {
                    warn!(
                        member = member.as_str(),
                        "weight setting names a member absent from the catalog"
                    );
                    out_events.push(Event::WeightRejected {
                        member: member.clone(),
                        reason: CatalogError::UnknownMember {
                            member: member.clone(),
                        },
                    });
                }
            }
        }
        Command::SetMemberWeight { member, weight } => {
            match session.catalog.set_weight(&member, weight) {
                Ok(weight) => out_events.push(Event::WeightChanged { member, weight }),
                Err(reason) => {
                    warn!(member = member.as_str(), %reason, "weight change rejected");
                    out_events.push(Event::WeightRejected { member, reason });
                }
            }
        }
        Command::ResetStack { policy } => {
            session.policy = policy;
            session.history.clear();
            session.rebuild_stack();
            out_events.push(Event::StackChanged {
                cards: session.stack_cards(),
            });
        }
        Command::CommitSwipe { direction } => {
            let Some(card) = session.stack.pop_front() else {
                warn!("swipe committed against an empty stack; ignoring");
                return;
            };
            out_events.push(Event::CardCommitted {
                card: card.clone(),
                direction,
            });

            let mut start_fever = false;
            if direction == SwipeDirection::Right && !session.fever.is_active() {
                let _ = session.liked.insert(LikedEntry {
                    member: card.member.clone(),
                    image: card.image.clone(),
                    liked_at_ms: session.clock_ms(),
                });
                match session.fever.advance_gauge(session.liked.len()) {
                    GaugeOutcome::Ready => start_fever = true,
                    GaugeOutcome::Charged | GaugeOutcome::ResetEmptyPool => {
                        out_events.push(Event::GaugeUpdated {
                            percent: session.fever.gauge_percent(),
                        });
                    }
                    GaugeOutcome::Ignored => {}
                }
            }

            if start_fever {
                session.fever.begin(session.clock);
                session.policy = SelectionPolicy::Bonus;
                session.history.clear();
                session.rebuild_stack();

                if session.stack.is_empty() {
                    // Nothing selectable even after fallbacks; abort the
                    // bonus mode before it starts.
                    warn!("bonus stack came up empty; aborting fever activation");
                    session.fever.end();
                    session.policy = SelectionPolicy::Normal;
                    out_events.push(Event::GaugeUpdated {
                        percent: session.fever.gauge_percent(),
                    });
                } else {
                    out_events.push(Event::GaugeUpdated {
                        percent: session.fever.gauge_percent(),
                    });
                    out_events.push(Event::FeverStarted);
                }
            } else {
                session.promote_front();
                session.append_preview();
            }

            out_events.push(Event::StackChanged {
                cards: session.stack_cards(),
            });
        }
        Command::ExpireOverlay => {
            session.fever.expire_overlay();
        }
        Command::Tick { dt } => {
            session.clock = session.clock.saturating_add(dt);
            if !session.fever.is_active() {
                return;
            }

            if session.fever.expired(session.clock) {
                session.fever.end();
                out_events.push(Event::OverlaysCleared);
                out_events.push(Event::FeverEnded);
                out_events.push(Event::GaugeUpdated {
                    percent: session.fever.gauge_percent(),
                });

                session.policy = SelectionPolicy::Normal;
                session.history.clear();
                session.rebuild_stack();
                out_events.push(Event::StackChanged {
                    cards: session.stack_cards(),
                });
                return;
            }

            for sticker in session.fever.spawn_overlays(dt, &mut session.rng) {
                out_events.push(Event::OverlaySpawned { sticker });
            }
            out_events.push(Event::GaugeUpdated {
                percent: session.fever.remaining_percent(session.clock),
            });
        }
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::time::Duration;

    use super::Session;
    use cardfall_core::{
        Card, FeverPhase, ImageKey, LikedEntry, MemberColor, MemberId, SelectionPolicy,
    };

    /// Cards currently in the stack, front first.
    #[must_use]
    pub fn stack(session: &Session) -> Vec<Card> {
        session.stack_cards()
    }

    /// Front card of the stack, if one is present.
    #[must_use]
    pub fn active_card(session: &Session) -> Option<&Card> {
        session.stack.front()
    }

    /// Current phase of the fever state machine.
    #[must_use]
    pub fn fever_phase(session: &Session) -> FeverPhase {
        session.fever.phase()
    }

    /// Gauge percentage for presentation.
    ///
    /// Reports the charge level while idle or charging and the remaining-time
    /// level while the bonus mode is active.
    #[must_use]
    pub fn gauge_percent(session: &Session) -> f32 {
        if session.fever.is_active() {
            session.fever.remaining_percent(session.clock)
        } else {
            session.fever.gauge_percent()
        }
    }

    /// Number of decorative overlays currently on screen.
    #[must_use]
    pub fn active_overlays(session: &Session) -> u32 {
        session.fever.active_overlays()
    }

    /// Selection policy the stack currently draws from.
    #[must_use]
    pub fn selection_policy(session: &Session) -> SelectionPolicy {
        session.policy
    }

    /// Session clock advanced by applied ticks.
    #[must_use]
    pub fn clock(session: &Session) -> Duration {
        session.clock
    }

    /// Liked entries in insertion order.
    #[must_use]
    pub fn liked_entries(session: &Session) -> &[LikedEntry] {
        session.liked.entries()
    }

    /// Number of images currently held in the duplicate-avoidance history.
    #[must_use]
    pub fn history_len(session: &Session) -> usize {
        session.history.len()
    }

    /// Recently shown images in oldest-first order.
    #[must_use]
    pub fn recent_images(session: &Session) -> Vec<(MemberId, ImageKey)> {
        session
            .history
            .keys()
            .map(|key| (key.member.clone(), key.image.clone()))
            .collect()
    }

    /// Captures a read-only view of the configured catalog members.
    #[must_use]
    pub fn member_view(session: &Session) -> Vec<MemberSnapshot> {
        session
            .catalog
            .members()
            .iter()
            .map(|member| MemberSnapshot {
                id: member.id.clone(),
                display_name: member.display_name.clone(),
                color: member.color,
                weight: member.weight,
            })
            .collect()
    }

    /// Immutable representation of a catalog member used for queries.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct MemberSnapshot {
        /// Stable identifier of the member.
        pub id: MemberId,
        /// Human-readable display name.
        pub display_name: String,
        /// Accent color used by the presentation layer.
        pub color: MemberColor,
        /// Selection weight currently in effect.
        pub weight: u32,
    }
}
