//! Durable resolution state: the output map (the deliverable) and a flat
//! composite-key cache that remembers every resolution independently of output
//! resets. Both are plain JSON artifacts; partial results from interrupted
//! runs are loaded back and extended, never overwritten wholesale.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Persisted outcome of one successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub id: i64,
    pub slug: Option<String>,
    #[serde(rename = "coverImageId")]
    pub cover_image_id: Option<String>,
}

/// platform -> (title -> record), insertion-ordered.
pub type OutputMap = IndexMap<String, IndexMap<String, ResolvedRecord>>;

/// `platform:::title` -> record.
pub type CacheMap = IndexMap<String, ResolvedRecord>;

pub fn cache_key(platform: &str, title: &str) -> String {
    format!("{platform}:::{title}")
}

/// Repository seam between the orchestrator and the storage format. The
/// orchestrator only ever asks these four questions; tests run against the
/// in-memory implementation.
pub trait ResolutionStore {
    /// Is this entry already in the output map?
    fn contains_output(&self, platform: &str, title: &str) -> bool;

    /// Copy a previously cached record into the output map, if one exists.
    /// Returns whether anything was promoted.
    fn promote_cached(&mut self, platform: &str, title: &str) -> bool;

    /// Record a fresh resolution in both the output map and the cache.
    fn insert(&mut self, platform: &str, title: &str, record: ResolvedRecord);

    /// Persist both maps. Called once, at end of run.
    fn flush(&mut self) -> Result<()>;
}

/// The production store: two JSON files loaded up front and flushed at end of
/// run.
pub struct JsonFileStore {
    output_path: PathBuf,
    cache_path: PathBuf,
    output: OutputMap,
    cache: CacheMap,
}

impl JsonFileStore {
    pub fn load(output_path: &Path, cache_path: &Path) -> Result<Self> {
        let output: OutputMap = read_json_or_default(output_path)?;
        let cache: CacheMap = read_json_or_default(cache_path)?;
        info!(
            target = "store",
            output_platforms = output.len(),
            cached = cache.len(),
            "resolution store loaded"
        );
        Ok(Self {
            output_path: output_path.to_path_buf(),
            cache_path: cache_path.to_path_buf(),
            output,
            cache,
        })
    }

    pub fn output(&self) -> &OutputMap {
        &self.output
    }

    pub fn cache(&self) -> &CacheMap {
        &self.cache
    }
}

fn read_json_or_default<T>(path: &Path) -> Result<T>
where
    T: Default + DeserializeOwned,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value)?;
    fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
}

fn output_contains(output: &OutputMap, platform: &str, title: &str) -> bool {
    output
        .get(platform)
        .is_some_and(|titles| titles.contains_key(title))
}

fn promote(output: &mut OutputMap, cache: &CacheMap, platform: &str, title: &str) -> bool {
    let Some(record) = cache.get(&cache_key(platform, title)).cloned() else {
        return false;
    };
    output
        .entry(platform.to_string())
        .or_default()
        .insert(title.to_string(), record);
    true
}

fn record_resolution(
    output: &mut OutputMap,
    cache: &mut CacheMap,
    platform: &str,
    title: &str,
    record: ResolvedRecord,
) {
    cache.insert(cache_key(platform, title), record.clone());
    output
        .entry(platform.to_string())
        .or_default()
        .insert(title.to_string(), record);
}

impl ResolutionStore for JsonFileStore {
    fn contains_output(&self, platform: &str, title: &str) -> bool {
        output_contains(&self.output, platform, title)
    }

    fn promote_cached(&mut self, platform: &str, title: &str) -> bool {
        promote(&mut self.output, &self.cache, platform, title)
    }

    fn insert(&mut self, platform: &str, title: &str, record: ResolvedRecord) {
        record_resolution(&mut self.output, &mut self.cache, platform, title, record);
    }

    fn flush(&mut self) -> Result<()> {
        write_json(&self.output_path, &self.output)?;
        write_json(&self.cache_path, &self.cache)?;
        info!(
            target = "store",
            output = %self.output_path.display(),
            cache = %self.cache_path.display(),
            "resolution store flushed"
        );
        Ok(())
    }
}

/// In-memory store for tests; flush is a no-op.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub output: OutputMap,
    pub cache: CacheMap,
}

impl ResolutionStore for MemoryStore {
    fn contains_output(&self, platform: &str, title: &str) -> bool {
        output_contains(&self.output, platform, title)
    }

    fn promote_cached(&mut self, platform: &str, title: &str) -> bool {
        promote(&mut self.output, &self.cache, platform, title)
    }

    fn insert(&mut self, platform: &str, title: &str, record: ResolvedRecord) {
        record_resolution(&mut self.output, &mut self.cache, platform, title, record);
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> ResolvedRecord {
        ResolvedRecord {
            id,
            slug: Some(format!("slug-{id}")),
            cover_image_id: None,
        }
    }

    #[test]
    fn record_serializes_with_wire_field_names() {
        let rec = ResolvedRecord {
            id: 1,
            slug: None,
            cover_image_id: Some("abc".into()),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "slug": null, "coverImageId": "abc"})
        );
    }

    #[test]
    fn insert_writes_both_maps() {
        let mut store = MemoryStore::default();
        store.insert("NES", "Metroid", record(1));
        assert!(store.contains_output("NES", "Metroid"));
        assert_eq!(store.cache.get("NES:::Metroid"), Some(&record(1)));
    }

    #[test]
    fn promote_copies_cache_into_output() {
        let mut store = MemoryStore::default();
        store.cache.insert(cache_key("NES", "Metroid"), record(7));
        assert!(!store.contains_output("NES", "Metroid"));
        assert!(store.promote_cached("NES", "Metroid"));
        assert_eq!(store.output["NES"]["Metroid"], record(7));
        assert!(!store.promote_cached("NES", "Contra"));
    }

    #[test]
    fn same_title_on_two_platforms_is_two_entries() {
        let mut store = MemoryStore::default();
        store.insert("NES", "Tetris", record(1));
        store.insert("Game Boy", "Tetris", record(2));
        assert_eq!(store.output["NES"]["Tetris"].id, 1);
        assert_eq!(store.output["Game Boy"]["Tetris"].id, 2);
        assert_eq!(store.cache.len(), 2);
    }

    #[test]
    fn file_store_round_trips_and_extends() {
        let dir = std::env::temp_dir().join(format!("igdb-map-store-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let output_path = dir.join("igdb-map.json");
        let cache_path = dir.join(".igdb-cache.json");
        let _ = fs::remove_file(&output_path);
        let _ = fs::remove_file(&cache_path);

        let mut store = JsonFileStore::load(&output_path, &cache_path).unwrap();
        store.insert("SNES", "Chrono Trigger", record(3));
        store.flush().unwrap();

        let mut reloaded = JsonFileStore::load(&output_path, &cache_path).unwrap();
        assert!(reloaded.contains_output("SNES", "Chrono Trigger"));
        assert_eq!(
            reloaded.cache().get("SNES:::Chrono Trigger"),
            Some(&record(3))
        );

        // A later run extends the artifacts instead of replacing them.
        reloaded.insert("SNES", "Earthbound", record(4));
        reloaded.flush().unwrap();
        let last = JsonFileStore::load(&output_path, &cache_path).unwrap();
        assert!(last.contains_output("SNES", "Chrono Trigger"));
        assert!(last.contains_output("SNES", "Earthbound"));

        let _ = fs::remove_dir_all(&dir);
    }
}
