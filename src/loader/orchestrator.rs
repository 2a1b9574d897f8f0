//! One-shot catalog load sequencing

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::loader::catalog::PropertyCatalogLoader;
use crate::loader::source::DataSource;
use crate::loader::zips::ZipGeocodeTable;
use crate::search::{recreate_index, IndexSchema};
use crate::state::PropertyStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Counts from a completed load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub zips: u64,
    pub properties: u64,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The readiness flag was already set; nothing was touched
    AlreadyComplete,
    Loaded(LoadSummary),
}

/// Runs schema creation, zip load and catalog load, then sets the readiness flag
pub struct LoadOrchestrator {
    store: Arc<dyn PropertyStore>,
    source: Arc<dyn DataSource>,
    schema: IndexSchema,
    config: LoaderConfig,
}

impl LoadOrchestrator {
    pub fn new(
        store: Arc<dyn PropertyStore>,
        source: Arc<dyn DataSource>,
        schema: IndexSchema,
        config: LoaderConfig,
    ) -> Self {
        Self {
            store,
            source,
            schema,
            config,
        }
    }

    /// Load everything, or nothing observable: the flag is only set after
    /// every step has succeeded
    pub async fn run(&self) -> Result<LoadOutcome> {
        if self
            .with_retry("check_ready", || self.store.is_load_complete())
            .await?
        {
            tracing::info!("Catalog already loaded, skipping load");
            return Ok(LoadOutcome::AlreadyComplete);
        }

        let started = Instant::now();
        tracing::info!("Data load started");

        let store = self.store.as_ref();
        let schema = &self.schema;
        self.with_retry("create_index", || recreate_index(store, schema))
            .await?;

        let zips = self.with_retry("load_zips", || self.load_zips()).await?;
        let properties = self
            .with_retry("load_properties", || self.load_properties())
            .await?;

        self.with_retry("mark_ready", || self.store.mark_load_complete())
            .await?;

        let summary = LoadSummary {
            zips,
            properties,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            zips = summary.zips,
            properties = summary.properties,
            elapsed_ms = summary.elapsed_ms,
            "Data load complete"
        );

        Ok(LoadOutcome::Loaded(summary))
    }

    /// Run the load on a background task; failures are logged and returned
    /// through the handle
    pub fn spawn(self: Arc<Self>) -> JoinHandle<Result<LoadOutcome>> {
        tokio::spawn(async move {
            let result = self.run().await;
            if let Err(ref e) = result {
                tracing::error!(
                    error = %e,
                    "Data load failed; catalog stays unavailable until restart"
                );
            }
            result
        })
    }

    async fn load_zips(&self) -> Result<u64> {
        let rows = self.source.zip_rows()?;
        ZipGeocodeTable::new(self.store.clone()).load(rows).await
    }

    async fn load_properties(&self) -> Result<u64> {
        let rows = self.source.address_rows()?;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        PropertyCatalogLoader::new(
            self.store.clone(),
            self.config.max_properties,
            self.config.state.clone(),
        )
        .load(rows, &mut rng)
        .await
    }

    /// Retry retryable failures with exponential backoff
    async fn with_retry<T, F, Fut>(&self, step: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_retries = self.config.max_retries;
        let mut attempts = 0u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempts < max_retries => {
                    attempts += 1;
                    let delay = backoff_delay_ms(self.config.retry_backoff_ms, attempts);
                    tracing::warn!(
                        step,
                        attempt = attempts.saturating_add(1),
                        delay_ms = delay,
                        error = %e,
                        "Retrying load step"
                    );
                    sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    tracing::error!(
                        step,
                        attempts = attempts.saturating_add(1),
                        error = %e,
                        "Load step failed"
                    );
                    return Err(e);
                }
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`, saturating
fn backoff_delay_ms(base_ms: u64, attempt: u32) -> u64 {
    base_ms.saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::loader::source::{AddressRow, RowIter};
    use crate::models::ZipRecord;
    use crate::state::InMemoryStore;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedSource {
        zips: Vec<(&'static str, f64, f64)>,
        addresses: usize,
    }

    impl DataSource for FixedSource {
        fn zip_rows(&self) -> Result<RowIter<ZipRecord>> {
            let rows: Vec<Result<ZipRecord>> = self
                .zips
                .iter()
                .map(|(zip, latitude, longitude)| {
                    Ok(ZipRecord {
                        zip: zip.to_string(),
                        latitude: *latitude,
                        longitude: *longitude,
                    })
                })
                .collect();
            Ok(Box::new(rows.into_iter()))
        }

        fn address_rows(&self) -> Result<RowIter<AddressRow>> {
            let rows: Vec<Result<AddressRow>> = (0..self.addresses)
                .map(|n| {
                    Ok(AddressRow {
                        longitude: "-104.9987".to_string(),
                        latitude: "39.7521".to_string(),
                        number: n.to_string(),
                        street: "Wazee St".to_string(),
                        unit: String::new(),
                        city: "Denver".to_string(),
                        postcode: "80202".to_string(),
                    })
                })
                .collect();
            Ok(Box::new(rows.into_iter()))
        }
    }

    struct BrokenSource;

    impl DataSource for BrokenSource {
        fn zip_rows(&self) -> Result<RowIter<ZipRecord>> {
            Ok(Box::new(std::iter::empty()))
        }

        fn address_rows(&self) -> Result<RowIter<AddressRow>> {
            Err(AppError::DataSource("co.csv unreadable".to_string()))
        }
    }

    fn config(max_properties: u64) -> LoaderConfig {
        LoaderConfig {
            max_properties,
            retry_backoff_ms: 1,
            seed: Some(7),
            ..Default::default()
        }
    }

    fn orchestrator(store: Arc<InMemoryStore>, source: Arc<dyn DataSource>) -> LoadOrchestrator {
        LoadOrchestrator::new(
            store,
            source,
            IndexSchema::property_index("propIdx"),
            config(10),
        )
    }

    fn fixed_source() -> Arc<dyn DataSource> {
        Arc::new(FixedSource {
            zips: vec![("80202", 39.7527, -104.9993), ("80203", 39.7313, -104.9827)],
            addresses: 4,
        })
    }

    #[tokio::test]
    async fn test_run_loads_everything_and_sets_flag() {
        let store = Arc::new(InMemoryStore::new());
        let outcome = orchestrator(store.clone(), fixed_source()).run().await.unwrap();

        match outcome {
            LoadOutcome::Loaded(summary) => {
                assert_eq!(summary.zips, 2);
                assert_eq!(summary.properties, 4);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(store.has_index("propIdx"));
        assert!(store.is_load_complete().await.unwrap());
    }

    #[tokio::test]
    async fn test_second_run_is_a_noop() {
        let store = Arc::new(InMemoryStore::new());
        let first = orchestrator(store.clone(), fixed_source());
        first.run().await.unwrap();

        let bigger = Arc::new(FixedSource {
            zips: vec![],
            addresses: 9,
        });
        let outcome = orchestrator(store.clone(), bigger).run().await.unwrap();

        assert_eq!(outcome, LoadOutcome::AlreadyComplete);
        assert_eq!(store.property_count(), 4);
    }

    #[tokio::test]
    async fn test_failed_step_leaves_flag_unset() {
        let store = Arc::new(InMemoryStore::new());
        let result = orchestrator(store.clone(), Arc::new(BrokenSource)).run().await;

        assert!(result.is_err());
        assert!(!store.is_load_complete().await.unwrap());
    }

    #[tokio::test]
    async fn test_spawned_load_reports_through_handle() {
        let store = Arc::new(InMemoryStore::new());
        let handle = Arc::new(orchestrator(store.clone(), fixed_source())).spawn();

        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, LoadOutcome::Loaded(_)));
        assert!(store.is_load_complete().await.unwrap());
    }

    #[tokio::test]
    async fn test_retry_recovers_from_store_errors() {
        let store = Arc::new(InMemoryStore::new());
        let orchestrator = orchestrator(store, fixed_source());
        let calls = AtomicU32::new(0);

        let value = orchestrator
            .with_retry("flaky", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(AppError::Store("connection reset".to_string()))
                } else {
                    Ok(42)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let store = Arc::new(InMemoryStore::new());
        let orchestrator = orchestrator(store, fixed_source());
        let calls = AtomicU32::new(0);

        let result: Result<()> = orchestrator
            .with_retry("down", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Store("connection refused".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay_ms(500, 1), 500);
        assert_eq!(backoff_delay_ms(500, 2), 1000);
        assert_eq!(backoff_delay_ms(500, 4), 4000);
    }

    #[test]
    fn test_backoff_saturates_instead_of_overflowing() {
        assert_eq!(backoff_delay_ms(500, 80), u64::MAX);
        assert_eq!(backoff_delay_ms(u64::MAX, 2), u64::MAX);
        assert_eq!(backoff_delay_ms(2, 64), u64::MAX);
    }

    #[tokio::test]
    async fn test_non_retryable_errors_fail_fast() {
        let store = Arc::new(InMemoryStore::new());
        let orchestrator = orchestrator(store, fixed_source());
        let calls = AtomicU32::new(0);

        let result: Result<()> = orchestrator
            .with_retry("parse", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::DataSource("bad row".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
