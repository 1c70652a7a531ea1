//! The resolution pipeline: walks every catalog entry in order, skips what is
//! already known, queries IGDB with a cleaned-title fallback, scores the
//! candidates and records the winner.

pub mod score;

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::igdb::client::{GameSearch, IgdbCandidate};
use crate::normalization::platform::canonical_platform;
use crate::normalization::title::strip_noise;
use crate::store::{ResolutionStore, ResolvedRecord};
use crate::util::env::env_parse;

const DEFAULT_PACING_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Courtesy throttle after each successful resolution, distinct from the
    /// client's retry backoff. Keeps the steady state near 2 requests/sec.
    pub pacing: Duration,
    /// Re-query entries even when the output map or cache already has them.
    pub force: bool,
    /// Cap on the number of entries queried this run; resume semantics make
    /// repeated capped runs converge.
    pub limit: Option<usize>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
            force: false,
            limit: None,
        }
    }
}

impl ResolverOptions {
    pub fn from_env() -> Self {
        Self {
            pacing: Duration::from_millis(env_parse("IGDB_PACING_MS", DEFAULT_PACING_MS)),
            ..Self::default()
        }
    }
}

/// Per-run totals, reported once at completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub resolved: usize,
    pub skipped_output: usize,
    pub skipped_cache: usize,
    pub unresolved: usize,
}

/// Resolves every entry in the catalog, strictly sequentially, then flushes
/// the store once. Per-entry failures degrade to warnings; only the final
/// flush can fail.
pub async fn resolve_catalog<S, R>(
    search: &S,
    store: &mut R,
    catalog: &Catalog,
    options: &ResolverOptions,
) -> Result<RunSummary>
where
    S: GameSearch,
    R: ResolutionStore,
{
    let mut summary = RunSummary::default();
    let mut queried = 0usize;

    'catalog: for (platform, titles) in catalog {
        let igdb_platform = canonical_platform(platform);

        for title in titles {
            if !options.force {
                if store.contains_output(platform, title) {
                    summary.skipped_output += 1;
                    continue;
                }
                if store.promote_cached(platform, title) {
                    summary.skipped_cache += 1;
                    continue;
                }
            }

            if let Some(limit) = options.limit {
                if queried >= limit {
                    info!(target = "resolver", limit, "query budget reached, stopping early");
                    break 'catalog;
                }
            }
            queried += 1;

            let mut candidates = search_or_empty(search, title).await;

            // One fallback with the cleaned title, only when the primary came
            // back empty and cleaning actually changed something. The fallback
            // replaces the primary result; the two pools are never merged.
            if candidates.is_empty() {
                let cleaned = strip_noise(title);
                if cleaned != *title {
                    candidates = search_or_empty(search, &cleaned).await;
                }
            }

            if candidates.is_empty() {
                warn!(target = "resolver", platform = %platform, title = %title, "no IGDB match");
                summary.unresolved += 1;
                continue;
            }

            let Some(best) = score::select_best(&candidates, title, igdb_platform) else {
                warn!(target = "resolver", platform = %platform, title = %title, "no best candidate");
                summary.unresolved += 1;
                continue;
            };

            let record = ResolvedRecord {
                id: best.id,
                slug: best.slug.clone(),
                cover_image_id: best.cover.as_ref().and_then(|c| c.image_id.clone()),
            };
            store.insert(platform, title, record);
            summary.resolved += 1;

            sleep(options.pacing).await;
        }
    }

    store.flush()?;
    info!(
        target = "resolver",
        resolved = summary.resolved,
        skipped_output = summary.skipped_output,
        skipped_cache = summary.skipped_cache,
        unresolved = summary.unresolved,
        "resolution run complete"
    );
    Ok(summary)
}

async fn search_or_empty<S: GameSearch>(search: &S, title: &str) -> Vec<IgdbCandidate> {
    match search.search(title).await {
        Ok(candidates) => candidates,
        Err(err) => {
            warn!(target = "resolver", title = %title, error = %err, "search failed");
            Vec::new()
        }
    }
}
