//! Asset Catalog
//!
//! The universe of known assets, loaded once from the provider and
//! read-only afterwards. Serves the case-insensitive prefix search
//! behind search-as-you-type.

use bellafi_core::{AssetRecord, BellafiError, MarketDataProvider};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Maximum number of matches returned by [`AssetCatalog::search`]
pub const MAX_SUGGESTIONS: usize = 10;

/// Catalog record with its search keys lowercased up front
#[derive(Debug, Clone)]
struct CatalogEntry {
    record: AssetRecord,
    id_key: String,
    name_key: String,
}

impl CatalogEntry {
    fn new(record: AssetRecord) -> Self {
        Self {
            id_key: record.id.to_lowercase(),
            name_key: record.name.to_lowercase(),
            record,
        }
    }

    fn matches(&self, query: &str) -> bool {
        self.id_key.starts_with(query) || self.name_key.starts_with(query)
    }
}

/// Load-once asset catalog
///
/// Until a load succeeds every search returns no matches. A failed load
/// leaves the catalog empty and may be retried.
#[derive(Debug, Default)]
pub struct AssetCatalog {
    entries: OnceCell<Vec<CatalogEntry>>,
}

impl AssetCatalog {
    /// Create an empty, not yet loaded catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog that is already loaded with the given records
    pub fn from_records(records: Vec<AssetRecord>) -> Self {
        let entries = OnceCell::new_with(Some(
            records.into_iter().map(CatalogEntry::new).collect(),
        ));
        Self { entries }
    }

    /// Fetch the catalog from the provider
    ///
    /// Returns the number of records loaded. Concurrent callers share a
    /// single fetch; once loaded, further calls fail with `AlreadyLoaded`.
    pub async fn load(&self, provider: &dyn MarketDataProvider) -> Result<usize, CatalogError> {
        if self.entries.initialized() {
            return Err(CatalogError::AlreadyLoaded);
        }

        let entries = self
            .entries
            .get_or_try_init(|| async {
                debug!("Loading asset catalog");
                let records = provider.list_assets().await?;
                Ok::<_, BellafiError>(records.into_iter().map(CatalogEntry::new).collect::<Vec<_>>())
            })
            .await
            .map_err(CatalogError::Load)?;

        info!("Asset catalog loaded with {} records", entries.len());
        Ok(entries.len())
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.initialized()
    }

    /// Number of records (zero before loading)
    pub fn len(&self) -> usize {
        self.entries.get().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a record by its exact id
    pub fn get(&self, id: &str) -> Option<&AssetRecord> {
        self.entries
            .get()?
            .iter()
            .find(|e| e.record.id == id)
            .map(|e| &e.record)
    }

    /// Prefix search over ids and names
    ///
    /// Case-insensitive; a record matches when its id or its name starts
    /// with the query. Results keep catalog order and are capped at
    /// [`MAX_SUGGESTIONS`]. An empty query matches nothing.
    pub fn search(&self, query: &str) -> Vec<AssetRecord> {
        if query.is_empty() {
            return Vec::new();
        }

        let Some(entries) = self.entries.get() else {
            return Vec::new();
        };

        let query = query.to_lowercase();
        entries
            .iter()
            .filter(|e| e.matches(&query))
            .take(MAX_SUGGESTIONS)
            .map(|e| e.record.clone())
            .collect()
    }
}

/// Errors from catalog loading
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to load asset catalog: {0}")]
    Load(#[from] BellafiError),

    #[error("Asset catalog is already loaded")]
    AlreadyLoaded,
}
