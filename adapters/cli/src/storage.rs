//! JSON persistence for catalog, weight, and liked-item documents.

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use cardfall_core::{CatalogConfig, LikedEntry, WeightSettings};
use serde::{Deserialize, Serialize};

const LIKED_DOCUMENT_VERSION: u32 = 1;

/// Versioned on-disk wrapper around the liked-entry list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct LikedDocument {
    version: u32,
    entries: Vec<LikedEntry>,
}

/// Loads a catalog description from the provided JSON file.
pub(crate) fn load_catalog(path: &Path) -> Result<CatalogConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading catalog file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing catalog file {}", path.display()))
}

/// Loads persisted weight settings from the provided JSON file.
pub(crate) fn load_weights(path: &Path) -> Result<WeightSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading weight settings {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing weight settings {}", path.display()))
}

/// Loads previously liked entries from the provided JSON file.
pub(crate) fn load_liked(path: &Path) -> Result<Vec<LikedEntry>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading liked entries {}", path.display()))?;
    let document: LikedDocument = serde_json::from_str(&contents)
        .with_context(|| format!("parsing liked entries {}", path.display()))?;
    ensure!(
        document.version == LIKED_DOCUMENT_VERSION,
        "unsupported liked document version {} in {}",
        document.version,
        path.display(),
    );
    Ok(document.entries)
}

/// Persists the effective weight settings to the provided JSON file.
pub(crate) fn save_weights(path: &Path, settings: &WeightSettings) -> Result<()> {
    let contents =
        serde_json::to_string_pretty(settings).context("serialising weight settings")?;
    fs::write(path, contents)
        .with_context(|| format!("writing weight settings {}", path.display()))
}

/// Persists liked entries to the provided JSON file.
pub(crate) fn save_liked(path: &Path, entries: &[LikedEntry]) -> Result<()> {
    let document = LikedDocument {
        version: LIKED_DOCUMENT_VERSION,
        entries: entries.to_vec(),
    };
    let contents =
        serde_json::to_string_pretty(&document).context("serialising liked entries")?;
    fs::write(path, contents)
        .with_context(|| format!("writing liked entries {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{load_liked, save_liked, LikedDocument};
    use cardfall_core::{ImageKey, LikedEntry, MemberId};
    use std::{env, fs, path::PathBuf, process};

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("cardfall-{name}-{}.json", process::id()))
    }

    fn entries() -> Vec<LikedEntry> {
        vec![LikedEntry {
            member: MemberId::new("aki"),
            image: ImageKey::new("images/aki/standard/4.jpg"),
            liked_at_ms: 2_250,
        }]
    }

    #[test]
    fn liked_entries_survive_a_save_and_load_cycle() {
        let path = temp_path("liked");
        save_liked(&path, &entries()).expect("save");
        let restored = load_liked(&path).expect("load");
        fs::remove_file(&path).expect("cleanup");

        assert_eq!(restored, entries());
    }

    #[test]
    fn liked_documents_with_a_foreign_version_are_rejected() {
        let path = temp_path("liked-version");
        let document = LikedDocument {
            version: 99,
            entries: entries(),
        };
        fs::write(&path, serde_json::to_string(&document).expect("serialise")).expect("write");

        let result = load_liked(&path);
        fs::remove_file(&path).expect("cleanup");

        let message = result.expect_err("version must be rejected").to_string();
        assert!(message.contains("version 99"), "got: {message}");
    }
}
