use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use keydate_catalog::MarketIndex;
use tokio::sync::RwLock;

use crate::error::StoreError;

struct Cached {
    modified: Option<SystemTime>,
    index: Arc<MarketIndex>,
}

/// Market index read from disk and cached until the file's modification time
/// changes. Each reload replaces the cached index as a whole.
pub struct MarketIndexRepository {
    path: Option<PathBuf>,
    cache: RwLock<Option<Cached>>,
}

impl MarketIndexRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cache: RwLock::new(None),
        }
    }

    /// A repository serving a fixed index, never touching the filesystem.
    pub fn fixed(index: MarketIndex) -> Self {
        Self {
            path: None,
            cache: RwLock::new(Some(Cached { modified: None, index: Arc::new(index) })),
        }
    }

    /// No repository configured at all.
    pub fn empty() -> Self {
        Self {
            path: None,
            cache: RwLock::new(None),
        }
    }

    /// The current index, or `None` when the file does not exist.
    pub async fn current(&self) -> Result<Option<Arc<MarketIndex>>, StoreError> {
        let Some(path) = &self.path else {
            return Ok(self.cache.read().await.as_ref().map(|c| c.index.clone()));
        };

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        let modified = metadata.modified().ok();

        if let Some(cached) = self.cache.read().await.as_ref() {
            if modified.is_some() && cached.modified == modified {
                return Ok(Some(cached.index.clone()));
            }
        }

        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        let index = MarketIndex::from_json(&source).map_err(|source| StoreError::Market {
            path: path.clone(),
            source,
        })?;
        let index = Arc::new(index);

        tracing::info!(
            path = %path.display(),
            categories = index.categories.len(),
            "Loaded market index"
        );

        *self.cache.write().await = Some(Cached { modified, index: index.clone() });
        Ok(Some(index))
    }
}
