#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cardfall engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the session executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values for
//! systems and presentation layers to react to deterministically. Systems
//! consume event streams, query immutable snapshots, and respond exclusively
//! with new command batches.

use std::{collections::BTreeMap, num::NonZeroU32, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Well-known image key substituted when a collection is missing or empty.
pub const PLACEHOLDER_IMAGE: &str = "images/placeholder.png";

/// File extension appended when deriving image keys from a collection.
pub const IMAGE_EXTENSION: &str = ".jpg";

/// Stable identifier assigned to a catalog member.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Creates a new member identifier from the provided string value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Retrieves the textual representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque key addressing a single image inside a member's collection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageKey(String);

impl ImageKey {
    /// Creates a new image key from the provided string value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derives the key for the image at `ordinal` (1-based) under `base_path`.
    #[must_use]
    pub fn derived(base_path: &str, ordinal: u32) -> Self {
        Self(format!("{base_path}{ordinal}{IMAGE_EXTENSION}"))
    }

    /// Retrieves the textual representation of the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Name identifying one of a member's image collections.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionName(String);

impl CollectionName {
    /// Creates a new collection name from the provided string value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Retrieves the textual representation of the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Accent color associated with a catalog member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl MemberColor {
    /// Creates a new member color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Direction in which the front card was swiped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Card rejected by dragging it off the left edge.
    Left,
    /// Card liked by dragging it off the right edge.
    Right,
}

/// Policy governing how the next card candidate is selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionPolicy {
    /// Weighted-random selection over the whole catalog.
    Normal,
    /// Selection restricted to the previously liked pool.
    Bonus,
}

/// Phase of the fever state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeverPhase {
    /// Gauge is empty and no bonus mode is running.
    Idle,
    /// Gauge holds at least one right swipe but has not reached its maximum.
    Charging,
    /// Time-boxed bonus mode is running and the gauge is pinned to maximum.
    Active,
}

/// Immutable selection result handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    /// Identifier of the member the card belongs to.
    pub member: MemberId,
    /// Display name of the member, carried for presentation.
    pub display_name: String,
    /// Accent color of the member, carried for presentation.
    pub color: MemberColor,
    /// Image shown on the card.
    pub image: ImageKey,
    /// Caption accompanying the image.
    pub caption: String,
    /// Zero-based position of the image within its collection.
    pub position: u32,
    /// Total number of images in the collection the card was drawn from.
    pub collection_len: u32,
    /// Marks hint cards that are non-authoritative for history purposes.
    pub preview: bool,
}

/// Entry of the liked-item store produced by a committed right swipe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedEntry {
    /// Member the liked image belongs to.
    pub member: MemberId,
    /// Image that was liked; entries are deduplicated by this key.
    pub image: ImageKey,
    /// Session clock timestamp of the like, in milliseconds.
    pub liked_at_ms: u64,
}

/// Caption supplied by the external flavor-text collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionLine {
    /// Member the caption belongs to.
    pub member: MemberId,
    /// Caption text shown alongside the member's images.
    pub text: String,
}

/// Describes a single named image collection owned by a member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Name under which the collection is addressed.
    pub name: CollectionName,
    /// Base path prepended when deriving image keys.
    pub base_path: String,
    /// Number of addressable images, keyed `1..=image_count`.
    pub image_count: u32,
}

/// Configuration describing a single catalog member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberConfig {
    /// Stable identifier of the member.
    pub id: MemberId,
    /// Human-readable display name.
    pub display_name: String,
    /// Accent color used by the presentation layer.
    pub color: MemberColor,
    /// Initial selection weight; the catalog default applies when absent.
    pub initial_weight: Option<u32>,
    /// Image collections owned by the member.
    pub collections: Vec<CollectionConfig>,
}

/// Configuration installing the complete catalog of selectable members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Members available for selection, in stable presentation order.
    pub members: Vec<MemberConfig>,
    /// Weight assigned to members without an explicit initial weight.
    pub default_weight: u32,
    /// Collection that normal-mode selection draws images from.
    pub selection_collection: CollectionName,
}

/// User-provided selection weight mapping persisted between sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightSettings {
    weights: BTreeMap<MemberId, i64>,
}

impl WeightSettings {
    /// Creates an empty weight mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the weight requested for the provided member.
    pub fn set(&mut self, member: MemberId, weight: i64) {
        let _ = self.weights.insert(member, weight);
    }

    /// Retrieves the requested weight for the member, if one was recorded.
    #[must_use]
    pub fn get(&self, member: &MemberId) -> Option<i64> {
        self.weights.get(member).copied()
    }

    /// Iterates over the recorded weights in stable identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, i64)> {
        self.weights.iter().map(|(member, weight)| (member, *weight))
    }
}

/// Parameters governing the fever bonus mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeverConfig {
    /// Number of right swipes required to fill the gauge.
    pub max_gauge: NonZeroU32,
    /// Duration of the bonus mode once activated.
    pub duration: Duration,
    /// Interval between decorative overlay spawn attempts while active.
    pub sticker_interval: Duration,
    /// Maximum number of decorative overlays shown concurrently.
    pub max_overlays: u32,
    /// Decorative overlay images spawned while the bonus mode is active.
    pub stickers: Vec<ImageKey>,
}

impl Default for FeverConfig {
    fn default() -> Self {
        Self {
            max_gauge: NonZeroU32::new(10).expect("default gauge maximum"),
            duration: Duration::from_secs(60),
            sticker_interval: Duration::from_millis(500),
            max_overlays: 5,
            stickers: Vec::new(),
        }
    }
}

/// Reasons a weight mutation request may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The requested weight is negative; weights must be zero or positive.
    #[error("selection weight {weight} is negative")]
    InvalidWeight {
        /// Weight value carried by the rejected request.
        weight: i64,
    },
    /// No member with the provided identifier exists in the catalog.
    #[error("unknown member {member:?}")]
    UnknownMember {
        /// Identifier carried by the rejected request.
        member: MemberId,
    },
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs the catalog of selectable members, resetting derived state.
    ConfigureCatalog {
        /// Catalog contents and selection defaults.
        config: CatalogConfig,
    },
    /// Installs the caption table supplied by the flavor-text collaborator.
    ConfigureCaptions {
        /// Captions keyed by member identifier.
        captions: Vec<CaptionLine>,
    },
    /// Reloads the liked-item store from the persistence collaborator.
    SeedLikedEntries {
        /// Entries to install; duplicates by image key are dropped.
        entries: Vec<LikedEntry>,
    },
    /// Applies a bulk weight mapping loaded from user settings.
    ApplyWeightSettings {
        /// Requested weights; members absent from the mapping receive the
        /// catalog default weight.
        settings: WeightSettings,
    },
    /// Updates the selection weight of a single member.
    SetMemberWeight {
        /// Member whose weight should change.
        member: MemberId,
        /// Requested weight; negative values are rejected.
        weight: i64,
    },
    /// Clears history and rebuilds the card stack under the given policy.
    ResetStack {
        /// Selection policy the rebuilt stack should draw from.
        policy: SelectionPolicy,
    },
    /// Consumes the front card following a committed swipe gesture.
    CommitSwipe {
        /// Direction the front card was swiped.
        direction: SwipeDirection,
    },
    /// Signals that one decorative overlay finished its animation.
    ExpireOverlay,
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a catalog was installed.
    CatalogConfigured {
        /// Number of members now available for selection.
        members: usize,
    },
    /// Confirms that a member's selection weight changed.
    WeightChanged {
        /// Member whose weight was updated.
        member: MemberId,
        /// Weight now in effect for the member.
        weight: u32,
    },
    /// Reports that a weight mutation request was rejected.
    WeightRejected {
        /// Member carried by the rejected request.
        member: MemberId,
        /// Specific reason the request failed.
        reason: CatalogError,
    },
    /// Announces the full ordered stack after any stack mutation.
    ///
    /// An empty card list is the terminal "no cards" state; only a stack
    /// reset can clear it.
    StackChanged {
        /// Cards now in the stack, front first.
        cards: Vec<Card>,
    },
    /// Confirms that the front card was consumed by a swipe.
    CardCommitted {
        /// Card that was removed from the front of the stack.
        card: Card,
        /// Direction the card was swiped.
        direction: SwipeDirection,
    },
    /// Reports the fever gauge level for presentation.
    ///
    /// Carries the charge percentage while idle or charging and the
    /// remaining-time percentage while the bonus mode is active.
    GaugeUpdated {
        /// Gauge fill level in the range `0.0..=100.0`.
        percent: f32,
    },
    /// Announces that the fever bonus mode began.
    FeverStarted,
    /// Announces that the fever bonus mode ended.
    FeverEnded,
    /// Announces that a decorative overlay spawned.
    OverlaySpawned {
        /// Overlay image chosen for the spawn.
        sticker: ImageKey,
    },
    /// Announces that all decorative overlays were cleared.
    OverlaysCleared,
}
