//! Input catalog: platform name -> ordered list of titles to resolve.

use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use tracing::info;

/// The full set of local entries for one run. Platform and title order is
/// preserved so repeated runs walk the catalog the same way.
pub type Catalog = IndexMap<String, Vec<String>>;

/// Loads the catalog artifact. A missing file is a fatal precondition: the run
/// aborts before any credential or search request is made.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        bail!("missing input catalog {}", path.display());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    let catalog: Catalog = serde_json::from_str(&raw)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    let entries: usize = catalog.values().map(|titles| titles.len()).sum();
    info!(
        target = "catalog",
        platforms = catalog.len(),
        entries,
        path = %path.display(),
        "catalog loaded"
    );
    Ok(catalog)
}
