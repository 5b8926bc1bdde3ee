//! Process-lifetime asset cache with single-flight loading.
//!
//! Each locator owns a slot. Concurrent misses on the same slot wait for the
//! one in-flight fetch instead of starting their own. A failed fetch leaves
//! the slot empty so the next `load` tries again.
//!
//! Nothing is ever evicted; the working set of emotes and badges in one
//! channel is small compared to a session.

use super::fetch::AssetFetcher;
use crate::models::asset::AssetHandle;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<AssetHandle>>;

#[derive(Clone)]
pub struct AssetCache {
    fetcher: Arc<dyn AssetFetcher>,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl AssetCache {
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            fetcher,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn load(&self, locator: &str) -> Result<AssetHandle, eyre::Report> {
        let slot = self.slot(locator);

        let handle = slot
            .get_or_try_init(|| async {
                tracing::debug!("Asset cache miss: {}", locator);
                let asset = self.fetcher.fetch(locator).await?;
                tracing::debug!(
                    "Cached {} ({} bytes, {})",
                    locator,
                    asset.byte_len,
                    asset.content_type
                );
                Ok::<_, eyre::Report>(Arc::new(asset))
            })
            .await?;

        Ok(handle.clone())
    }

    /// Number of locators with a loaded asset.
    pub fn len(&self) -> usize {
        self.slots.lock().values().filter(|s| s.initialized()).count()
    }

    fn slot(&self, locator: &str) -> Slot {
        let mut slots = self.slots.lock();
        slots
            .entry(locator.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}
