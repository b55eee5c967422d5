use metrics::counter;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::inline::inline_catalog;
use crate::render::RenderHookSlot;
use crate::slot::{Generation, ProblemsSlot};
use crate::source::CatalogSource;

/// How a loader obtains its catalog. A deployment picks one.
#[derive(Clone)]
pub enum LoadMode {
    /// Asynchronous retrieval from a catalog resource.
    Remote(Arc<dyn CatalogSource>),
    /// The catalog embedded in the binary.
    Inline,
}

/// What a single load did. Failures are already logged when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { count: usize, rendered: bool },
    Failed,
    /// A newer load started on the same slot before this one resolved.
    Superseded,
}

impl LoadOutcome {
    fn label(&self) -> &'static str {
        match self {
            LoadOutcome::Loaded { .. } => "loaded",
            LoadOutcome::Failed => "failed",
            LoadOutcome::Superseded => "superseded",
        }
    }
}

/// Publishes the problem catalog into a [`ProblemsSlot`].
///
/// Loading never propagates an error: there is no caller waiting on it, so
/// transport and payload failures end in a `tracing` error event and the
/// slot keeps what it had.
pub struct CatalogLoader {
    slot: ProblemsSlot,
    mode: LoadMode,
    hooks: RenderHookSlot,
}

impl CatalogLoader {
    pub fn remote(slot: ProblemsSlot, source: Arc<dyn CatalogSource>, hooks: RenderHookSlot) -> Self {
        Self {
            slot,
            mode: LoadMode::Remote(source),
            hooks,
        }
    }

    /// Inline loads never call the render hook.
    pub fn inline(slot: ProblemsSlot) -> Self {
        Self {
            slot,
            mode: LoadMode::Inline,
            hooks: RenderHookSlot::new(),
        }
    }

    pub fn slot(&self) -> &ProblemsSlot {
        &self.slot
    }

    pub fn hooks(&self) -> &RenderHookSlot {
        &self.hooks
    }

    pub async fn load(&self) -> LoadOutcome {
        match &self.mode {
            LoadMode::Inline => self.load_inline(),
            LoadMode::Remote(source) => {
                let generation = self.slot.begin_empty_load();
                self.resolve(source.as_ref(), generation).await
            }
        }
    }

    /// Fires the load on the tokio runtime.
    ///
    /// The slot is already initialized when this returns: empty for a remote
    /// load, fully populated for an inline one.
    pub fn spawn(self) -> JoinHandle<LoadOutcome> {
        match self.mode.clone() {
            LoadMode::Inline => {
                let outcome = self.load_inline();
                tokio::spawn(async move { outcome })
            }
            LoadMode::Remote(source) => {
                let generation = self.slot.begin_empty_load();
                tokio::spawn(async move { self.resolve(source.as_ref(), generation).await })
            }
        }
    }

    fn load_inline(&self) -> LoadOutcome {
        let generation = self.slot.begin_load();
        let catalog = inline_catalog();
        let count = catalog.len();
        let outcome = if self.slot.publish(generation, catalog) {
            info!("Published {} inline problem records", count);
            LoadOutcome::Loaded { count, rendered: false }
        } else {
            LoadOutcome::Superseded
        };
        record_outcome(&outcome);
        outcome
    }

    #[instrument(skip(self, source), fields(source = %source.name()))]
    async fn resolve(&self, source: &dyn CatalogSource, generation: Generation) -> LoadOutcome {
        debug!("Fetching catalog");
        let outcome = match source.fetch_catalog().await {
            Ok(records) => {
                let count = records.len();
                let catalog = Arc::new(records);
                if self.slot.publish(generation, Arc::clone(&catalog)) {
                    info!("Published {} problem records", count);
                    let rendered = self.hooks.invoke(&catalog);
                    if !rendered {
                        debug!("No render hook defined");
                    }
                    LoadOutcome::Loaded { count, rendered }
                } else {
                    warn!("Catalog load superseded by a newer load, result discarded");
                    LoadOutcome::Superseded
                }
            }
            Err(e) => {
                error!(error = %e, "Catalog load failed");
                LoadOutcome::Failed
            }
        };
        record_outcome(&outcome);
        outcome
    }
}

fn record_outcome(outcome: &LoadOutcome) {
    counter!("catalog_loads_total", "outcome" => outcome.label()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CatalogError, Result};
    use crate::types::{Catalog, ProblemRecord};
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn example_record() -> ProblemRecord {
        ProblemRecord {
            id: "a1".into(),
            title: "T1".into(),
            brand: "X".into(),
            model: "Y".into(),
            symptoms: vec!["s1".into()],
            error_codes: vec![],
            source_url: "http://e".into(),
            source: "t".into(),
            date_added: None,
        }
    }

    struct StaticSource(Catalog);

    #[async_trait::async_trait]
    impl CatalogSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch_catalog(&self) -> Result<Catalog> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl CatalogSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch_catalog(&self) -> Result<Catalog> {
            Err(CatalogError::Shape("expected an array, found an object".into()))
        }
    }

    /// Resolves only after `release` is notified.
    struct GatedSource {
        release: Arc<Notify>,
        catalog: Catalog,
    }

    #[async_trait::async_trait]
    impl CatalogSource for GatedSource {
        fn name(&self) -> &str {
            "gated"
        }

        async fn fetch_catalog(&self) -> Result<Catalog> {
            self.release.notified().await;
            Ok(self.catalog.clone())
        }
    }

    fn counting_hooks() -> (RenderHookSlot, Arc<AtomicUsize>, Arc<Mutex<Vec<Catalog>>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (c, s) = (calls.clone(), seen.clone());
        let hooks = RenderHookSlot::with_hook(move |records| {
            c.fetch_add(1, Ordering::SeqCst);
            s.lock().unwrap().push(records);
        });
        (hooks, calls, seen)
    }

    #[tokio::test]
    async fn test_remote_load_publishes_and_renders_once() {
        let (hooks, calls, seen) = counting_hooks();
        let slot = ProblemsSlot::new();
        let loader = CatalogLoader::remote(slot.clone(), Arc::new(StaticSource(vec![example_record()])), hooks);

        let outcome = loader.load().await;

        assert_eq!(outcome, LoadOutcome::Loaded { count: 1, rendered: true });
        assert_eq!(slot.snapshot().as_slice(), &[example_record()]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(seen.lock().unwrap()[0], vec![example_record()]);
    }

    #[tokio::test]
    async fn test_remote_load_without_hook_still_publishes() {
        let slot = ProblemsSlot::new();
        let loader = CatalogLoader::remote(
            slot.clone(),
            Arc::new(StaticSource(vec![example_record()])),
            RenderHookSlot::new(),
        );

        let outcome = loader.load().await;

        assert_eq!(outcome, LoadOutcome::Loaded { count: 1, rendered: false });
        assert_eq!(slot.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_slot_empty_and_skips_hook() {
        let (hooks, calls, _) = counting_hooks();
        let slot = ProblemsSlot::new();
        let loader = CatalogLoader::remote(slot.clone(), Arc::new(FailingSource), hooks);

        assert_eq!(loader.load().await, LoadOutcome::Failed);
        assert!(slot.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_slot_is_empty_until_spawned_load_resolves() {
        let release = Arc::new(Notify::new());
        let slot = ProblemsSlot::new();
        let source = GatedSource {
            release: release.clone(),
            catalog: vec![example_record()],
        };
        let handle = CatalogLoader::remote(slot.clone(), Arc::new(source), RenderHookSlot::new()).spawn();

        tokio::task::yield_now().await;
        assert!(slot.is_empty());

        release.notify_one();
        let outcome = handle.await.unwrap();

        assert_eq!(outcome, LoadOutcome::Loaded { count: 1, rendered: false });
        assert_eq!(slot.len(), 1);
    }

    #[tokio::test]
    async fn test_hook_set_after_spawn_is_used_at_resolution() {
        let release = Arc::new(Notify::new());
        let hooks = RenderHookSlot::new();
        let source = GatedSource {
            release: release.clone(),
            catalog: vec![example_record()],
        };
        let handle = CatalogLoader::remote(ProblemsSlot::new(), Arc::new(source), hooks.clone()).spawn();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        hooks.set(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        release.notify_one();

        assert!(matches!(handle.await.unwrap(), LoadOutcome::Loaded { rendered: true, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_older_load_resolving_last_is_discarded() {
        let (hooks, calls, _) = counting_hooks();
        let slot = ProblemsSlot::new();
        let release_old = Arc::new(Notify::new());

        let mut stale = example_record();
        stale.id = "stale".into();
        let old = CatalogLoader::remote(
            slot.clone(),
            Arc::new(GatedSource {
                release: release_old.clone(),
                catalog: vec![stale],
            }),
            hooks.clone(),
        )
        .spawn();

        let fresh = CatalogLoader::remote(slot.clone(), Arc::new(StaticSource(vec![example_record()])), hooks);
        assert!(matches!(fresh.load().await, LoadOutcome::Loaded { .. }));

        release_old.notify_one();
        assert_eq!(old.await.unwrap(), LoadOutcome::Superseded);

        assert_eq!(slot.snapshot()[0].id, "a1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn load_counts(snapshotter: &Snapshotter) -> Vec<(String, u64)> {
        let mut counts: Vec<_> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, ..)| key.key().name() == "catalog_loads_total")
            .filter_map(|(key, _, _, value)| {
                let outcome = key.key().labels().find(|l| l.key() == "outcome")?.value().to_string();
                match value {
                    DebugValue::Counter(n) => Some((outcome, n)),
                    _ => None,
                }
            })
            .collect();
        counts.sort();
        counts
    }

    #[test]
    fn test_each_outcome_increments_its_counter() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            // Current-thread runtime so every task records on this thread.
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            runtime.block_on(async {
                let slot = ProblemsSlot::new();
                let release_old = Arc::new(Notify::new());
                let old = CatalogLoader::remote(
                    slot.clone(),
                    Arc::new(GatedSource {
                        release: release_old.clone(),
                        catalog: vec![example_record()],
                    }),
                    RenderHookSlot::new(),
                )
                .spawn();

                let fresh = CatalogLoader::remote(
                    slot.clone(),
                    Arc::new(StaticSource(vec![example_record()])),
                    RenderHookSlot::new(),
                );
                fresh.load().await;
                release_old.notify_one();
                assert_eq!(old.await.unwrap(), LoadOutcome::Superseded);

                let failing = CatalogLoader::remote(slot.clone(), Arc::new(FailingSource), RenderHookSlot::new());
                failing.load().await;
                failing.load().await;

                CatalogLoader::inline(slot).load().await;
            });
        });

        assert_eq!(
            load_counts(&snapshotter),
            vec![
                ("failed".to_string(), 2),
                ("loaded".to_string(), 2),
                ("superseded".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_inline_load_publishes_literal_catalog() {
        let slot = ProblemsSlot::new();
        let handle = CatalogLoader::inline(slot.clone()).spawn();

        // Populated before the task is even polled.
        assert_eq!(slot.snapshot().as_slice(), inline_catalog().as_slice());

        let count = inline_catalog().len();
        assert_eq!(handle.await.unwrap(), LoadOutcome::Loaded { count, rendered: false });
    }
}
