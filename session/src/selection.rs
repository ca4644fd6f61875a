//! Card selection engine and the recently-shown history.

use std::collections::{HashSet, VecDeque};

use cardfall_core::{Card, ImageKey, MemberId, SelectionPolicy, PLACEHOLDER_IMAGE};
use tracing::warn;

use crate::catalog::{CaptionTable, Catalog, LikedStore, Member};
use crate::rng::SplitMix64;

const HISTORY_BOUND_FACTOR: usize = 3;
const EMPTY_CATALOG_HISTORY_BOUND: usize = 10;

/// Key identifying one shown image for duplicate avoidance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct HistoryKey {
    pub(crate) member: MemberId,
    pub(crate) image: ImageKey,
}

/// Bounded FIFO set of recently shown images, cleared on mode transitions.
#[derive(Clone, Debug, Default)]
pub(crate) struct SelectionHistory {
    order: VecDeque<HistoryKey>,
    seen: HashSet<HistoryKey>,
}

impl SelectionHistory {
    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn contains(&self, key: &HistoryKey) -> bool {
        self.seen.contains(key)
    }

    /// Oldest-first iterator over the recorded keys.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &HistoryKey> {
        self.order.iter()
    }

    /// Records the key, evicting the oldest entry once the bound is exceeded.
    pub(crate) fn record(&mut self, key: HistoryKey, catalog_len: usize) {
        if !self.seen.insert(key.clone()) {
            return;
        }
        self.order.push_back(key);
        if self.order.len() > history_bound(catalog_len) {
            if let Some(oldest) = self.order.pop_front() {
                let _ = self.seen.remove(&oldest);
            }
        }
    }
}

fn history_bound(catalog_len: usize) -> usize {
    if catalog_len == 0 {
        EMPTY_CATALOG_HISTORY_BOUND
    } else {
        catalog_len * HISTORY_BOUND_FACTOR
    }
}

/// Produces the next card candidate under the requested policy.
///
/// Returns `None` only when the catalog holds no members at all; every other
/// shortfall recovers locally (placeholder images, bonus-policy fallbacks).
pub(crate) fn select_next(
    catalog: &Catalog,
    captions: &CaptionTable,
    liked: &LikedStore,
    history: &mut SelectionHistory,
    rng: &mut SplitMix64,
    policy: SelectionPolicy,
    preview: bool,
) -> Option<Card> {
    match policy {
        SelectionPolicy::Normal => select_normal(catalog, captions, history, rng, preview),
        SelectionPolicy::Bonus => select_bonus(catalog, captions, liked, history, rng, preview),
    }
}

fn select_bonus(
    catalog: &Catalog,
    captions: &CaptionTable,
    liked: &LikedStore,
    history: &mut SelectionHistory,
    rng: &mut SplitMix64,
    preview: bool,
) -> Option<Card> {
    if liked.is_empty() {
        warn!("bonus policy requested with an empty liked pool; falling back to normal selection");
        return select_normal(catalog, captions, history, rng, preview);
    }

    let entry = liked.get(rng.next_index(liked.len()))?;
    let Some(member) = catalog.member(&entry.member) else {
        warn!(
            member = entry.member.as_str(),
            "liked entry references a member absent from the catalog; falling back"
        );
        return select_normal(catalog, captions, history, rng, preview);
    };

    // Bonus draws are never filtered against history; repeats are the point.
    let caption = captions.random_caption(&member.id, &member.display_name, rng);
    Some(Card {
        member: member.id.clone(),
        display_name: member.display_name.clone(),
        color: member.color,
        image: entry.image.clone(),
        caption,
        position: 0,
        collection_len: 1,
        preview,
    })
}

fn select_normal(
    catalog: &Catalog,
    captions: &CaptionTable,
    history: &mut SelectionHistory,
    rng: &mut SplitMix64,
    preview: bool,
) -> Option<Card> {
    if catalog.is_empty() {
        warn!("no members available for selection");
        return None;
    }

    let member = pick_weighted(catalog, rng);
    let keys = catalog.selection_keys(member);

    if keys.len() == 1 && keys[0].as_str() == PLACEHOLDER_IMAGE {
        let caption = captions.random_caption(&member.id, &member.display_name, rng);
        return Some(Card {
            member: member.id.clone(),
            display_name: member.display_name.clone(),
            color: member.color,
            image: keys[0].clone(),
            caption,
            position: 0,
            collection_len: 0,
            preview,
        });
    }

    let len = keys.len();
    let mut index = rng.next_index(len);
    if !history_covers(history, member, &keys) {
        // Bounded retry: once the history covers the whole collection the
        // first draw is accepted, so the loop always terminates.
        let max_attempts = len * 2;
        let mut attempts = 1;
        while attempts < max_attempts
            && history.contains(&HistoryKey {
                member: member.id.clone(),
                image: keys[index].clone(),
            })
        {
            index = rng.next_index(len);
            attempts += 1;
        }
    }

    let image = keys[index].clone();
    if !preview {
        history.record(
            HistoryKey {
                member: member.id.clone(),
                image: image.clone(),
            },
            catalog.len(),
        );
    }

    let caption = captions.random_caption(&member.id, &member.display_name, rng);
    Some(Card {
        member: member.id.clone(),
        display_name: member.display_name.clone(),
        color: member.color,
        image,
        caption,
        position: index as u32,
        collection_len: len as u32,
        preview,
    })
}

fn pick_weighted<'a>(catalog: &'a Catalog, rng: &mut SplitMix64) -> &'a Member {
    let total: u64 = catalog
        .members()
        .iter()
        .map(|member| u64::from(member.weight))
        .sum();

    if total == 0 {
        warn!("all selection weights are zero; drawing uniformly over the catalog");
        return &catalog.members()[rng.next_index(catalog.len())];
    }

    let mut draw = rng.next_u64() % total;
    for member in catalog.members() {
        let weight = u64::from(member.weight);
        if draw < weight {
            return member;
        }
        draw -= weight;
    }

    catalog
        .members()
        .last()
        .expect("weighted draw over a non-empty catalog")
}

fn history_covers(history: &SelectionHistory, member: &Member, keys: &[ImageKey]) -> bool {
    keys.iter().all(|key| {
        history.contains(&HistoryKey {
            member: member.id.clone(),
            image: key.clone(),
        })
    })
}
