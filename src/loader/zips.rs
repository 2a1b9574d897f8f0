//! Zip code to coordinate lookups

use crate::error::Result;
use crate::models::ZipRecord;
use crate::state::PropertyStore;
use std::sync::Arc;

/// Zip geocodes persisted as `zip:<zip>` → `"lon lat"`
#[derive(Clone)]
pub struct ZipGeocodeTable {
    store: Arc<dyn PropertyStore>,
}

impl ZipGeocodeTable {
    pub fn new(store: Arc<dyn PropertyStore>) -> Self {
        Self { store }
    }

    /// Write every row, one store write each; later duplicates win
    pub async fn load<I>(&self, rows: I) -> Result<u64>
    where
        I: IntoIterator<Item = Result<ZipRecord>>,
        I::IntoIter: Send,
    {
        let mut written = 0u64;
        for row in rows {
            let record = row?;
            self.store
                .put_zip(&record.zip, &record.point().to_string())
                .await?;
            written += 1;
        }

        tracing::info!(zips = written, "Zip geocodes loaded");
        Ok(written)
    }

    /// The stored `"lon lat"` string, if the zip is known
    pub async fn lookup(&self, zip: &str) -> Result<Option<String>> {
        self.store.get_zip(zip).await
    }
}
