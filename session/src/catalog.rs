//! Authoritative catalog, caption table, and liked-item store.

use std::collections::{HashMap, HashSet};

use cardfall_core::{
    CaptionLine, CatalogConfig, CatalogError, CollectionName, ImageKey, LikedEntry, MemberColor,
    MemberId, PLACEHOLDER_IMAGE,
};
use tracing::warn;

use crate::rng::SplitMix64;

#[derive(Clone, Debug)]
struct Collection {
    name: CollectionName,
    base_path: String,
    image_count: u32,
}

/// Selectable catalog member with a mutable selection weight.
#[derive(Clone, Debug)]
pub(crate) struct Member {
    pub(crate) id: MemberId,
    pub(crate) display_name: String,
    pub(crate) color: MemberColor,
    pub(crate) weight: u32,
    collections: Vec<Collection>,
}

impl Member {
    fn collection(&self, name: &CollectionName) -> Option<&Collection> {
        self.collections
            .iter()
            .find(|collection| collection.name == *name)
    }
}

/// Registry of members created from configuration at startup.
#[derive(Clone, Debug)]
pub(crate) struct Catalog {
    members: Vec<Member>,
    default_weight: u32,
    selection_collection: CollectionName,
}

impl Catalog {
    pub(crate) fn empty() -> Self {
        Self {
            members: Vec::new(),
            default_weight: 1,
            selection_collection: CollectionName::new("standard"),
        }
    }

    pub(crate) fn from_config(config: CatalogConfig) -> Self {
        if config.members.is_empty() {
            warn!("catalog configured without members; selection will yield no cards");
        }
        let default_weight = config.default_weight;
        let members = config
            .members
            .into_iter()
            .map(|member| Member {
                weight: member.initial_weight.unwrap_or(default_weight),
                id: member.id,
                display_name: member.display_name,
                color: member.color,
                collections: member
                    .collections
                    .into_iter()
                    .map(|collection| Collection {
                        name: collection.name,
                        base_path: collection.base_path,
                        image_count: collection.image_count,
                    })
                    .collect(),
            })
            .collect();
        Self {
            members,
            default_weight,
            selection_collection: config.selection_collection,
        }
    }

    pub(crate) fn members(&self) -> &[Member] {
        &self.members
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id == *id)
    }

    pub(crate) fn default_weight(&self) -> u32 {
        self.default_weight
    }

    /// Updates a member's weight, returning the value now in effect.
    pub(crate) fn set_weight(&mut self, id: &MemberId, weight: i64) -> Result<u32, CatalogError> {
        if weight < 0 {
            return Err(CatalogError::InvalidWeight { weight });
        }
        let member = self
            .members
            .iter_mut()
            .find(|member| member.id == *id)
            .ok_or_else(|| CatalogError::UnknownMember { member: id.clone() })?;
        member.weight = u32::try_from(weight).unwrap_or(u32::MAX);
        Ok(member.weight)
    }

    /// Ordered image keys of the member's selection collection.
    ///
    /// Never returns an empty sequence: a missing or empty collection is
    /// substituted with the single placeholder key and logged as a warning.
    pub(crate) fn selection_keys(&self, member: &Member) -> Vec<ImageKey> {
        match member.collection(&self.selection_collection) {
            Some(collection) if collection.image_count > 0 => (1..=collection.image_count)
                .map(|ordinal| ImageKey::derived(&collection.base_path, ordinal))
                .collect(),
            Some(_) => {
                warn!(
                    member = member.id.as_str(),
                    collection = self.selection_collection.as_str(),
                    "collection has no images; substituting placeholder"
                );
                vec![ImageKey::new(PLACEHOLDER_IMAGE)]
            }
            None => {
                warn!(
                    member = member.id.as_str(),
                    collection = self.selection_collection.as_str(),
                    "collection missing; substituting placeholder"
                );
                vec![ImageKey::new(PLACEHOLDER_IMAGE)]
            }
        }
    }
}

/// Captions keyed by member, installed from the flavor-text collaborator.
#[derive(Clone, Debug, Default)]
pub(crate) struct CaptionTable {
    by_member: HashMap<MemberId, Vec<String>>,
}

impl CaptionTable {
    pub(crate) fn install(&mut self, captions: Vec<CaptionLine>) {
        self.by_member.clear();
        for line in captions {
            self.by_member.entry(line.member).or_default().push(line.text);
        }
    }

    /// Draws a random caption for the member, falling back deterministically.
    pub(crate) fn random_caption(
        &self,
        member: &MemberId,
        display_name: &str,
        rng: &mut SplitMix64,
    ) -> String {
        match self.by_member.get(member) {
            Some(lines) if !lines.is_empty() => lines[rng.next_index(lines.len())].clone(),
            _ => format!("{display_name} has nothing to say yet."),
        }
    }
}

/// Append-only log of liked cards, deduplicated by image key.
#[derive(Clone, Debug, Default)]
pub(crate) struct LikedStore {
    entries: Vec<LikedEntry>,
    seen: HashSet<ImageKey>,
}

impl LikedStore {
    pub(crate) fn seed(&mut self, entries: Vec<LikedEntry>) {
        self.entries.clear();
        self.seen.clear();
        for entry in entries {
            let _ = self.insert(entry);
        }
    }

    /// Appends the entry unless its image was already liked.
    pub(crate) fn insert(&mut self, entry: LikedEntry) -> bool {
        if !self.seen.insert(entry.image.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub(crate) fn entries(&self) -> &[LikedEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&LikedEntry> {
        self.entries.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, CaptionTable, LikedStore};
    use crate::rng::SplitMix64;
    use cardfall_core::{
        CaptionLine, CatalogConfig, CatalogError, CollectionConfig, CollectionName, ImageKey,
        LikedEntry, MemberColor, MemberConfig, MemberId, PLACEHOLDER_IMAGE,
    };

    fn config_with_counts(counts: &[u32]) -> CatalogConfig {
        CatalogConfig {
            members: counts
                .iter()
                .enumerate()
                .map(|(index, count)| MemberConfig {
                    id: MemberId::new(format!("member-{index}")),
                    display_name: format!("Member {index}"),
                    color: MemberColor::from_rgb(0x20, 0x40, 0x60),
                    initial_weight: None,
                    collections: vec![CollectionConfig {
                        name: CollectionName::new("standard"),
                        base_path: format!("images/member-{index}/standard/"),
                        image_count: *count,
                    }],
                })
                .collect(),
            default_weight: 1,
            selection_collection: CollectionName::new("standard"),
        }
    }

    #[test]
    fn empty_collection_substitutes_placeholder() {
        let catalog = Catalog::from_config(config_with_counts(&[0]));
        let member = &catalog.members()[0];
        let keys = catalog.selection_keys(member);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].as_str(), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn selection_keys_follow_base_path_and_ordinals() {
        let catalog = Catalog::from_config(config_with_counts(&[3]));
        let member = &catalog.members()[0];
        let keys = catalog.selection_keys(member);
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0].as_str(), "images/member-0/standard/1.jpg");
        assert_eq!(keys[2].as_str(), "images/member-0/standard/3.jpg");
    }

    #[test]
    fn negative_weight_is_rejected_without_mutation() {
        let mut catalog = Catalog::from_config(config_with_counts(&[1]));
        let id = catalog.members()[0].id.clone();
        let result = catalog.set_weight(&id, -2);
        assert_eq!(result, Err(CatalogError::InvalidWeight { weight: -2 }));
        assert_eq!(catalog.members()[0].weight, 1);
    }

    #[test]
    fn unknown_member_weight_is_rejected() {
        let mut catalog = Catalog::from_config(config_with_counts(&[1]));
        let ghost = MemberId::new("ghost");
        let result = catalog.set_weight(&ghost, 3);
        assert_eq!(result, Err(CatalogError::UnknownMember { member: ghost }));
    }

    #[test]
    fn liked_store_deduplicates_by_image() {
        let mut store = LikedStore::default();
        let entry = LikedEntry {
            member: MemberId::new("aki"),
            image: ImageKey::new("images/aki/standard/1.jpg"),
            liked_at_ms: 100,
        };
        assert!(store.insert(entry.clone()));
        assert!(!store.insert(LikedEntry {
            liked_at_ms: 900,
            ..entry
        }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries()[0].liked_at_ms, 100);
    }

    #[test]
    fn caption_fallback_names_the_member() {
        let table = CaptionTable::default();
        let mut rng = SplitMix64::new(11);
        let caption = table.random_caption(&MemberId::new("aki"), "Aki", &mut rng);
        assert_eq!(caption, "Aki has nothing to say yet.");
    }

    #[test]
    fn installed_captions_are_drawn_for_their_member() {
        let mut table = CaptionTable::default();
        table.install(vec![CaptionLine {
            member: MemberId::new("aki"),
            text: "Hello!".to_owned(),
        }]);
        let mut rng = SplitMix64::new(11);
        let caption = table.random_caption(&MemberId::new("aki"), "Aki", &mut rng);
        assert_eq!(caption, "Hello!");
    }
}
