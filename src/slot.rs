use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::types::Catalog;

/// The well-known process-wide catalog location.
pub static PROBLEMS: Lazy<ProblemsSlot> = Lazy::new(ProblemsSlot::new);

/// Identifies one load attempt against a slot.
pub type Generation = u64;

#[derive(Debug, Default)]
struct SlotState {
    records: Arc<Catalog>,
    generation: Generation,
}

/// Single-writer container for the loaded catalog.
///
/// Readers always observe a whole sequence: a publish swaps the inner `Arc`
/// in one step, so there is no partially populated state. Each load takes a
/// new generation and a publish from an older generation is ignored.
#[derive(Debug, Clone, Default)]
pub struct ProblemsSlot {
    inner: Arc<RwLock<SlotState>>,
}

impl ProblemsSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents. Cheap: clones the `Arc`, not the records.
    pub fn snapshot(&self) -> Arc<Catalog> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state.records)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Starts a load: bumps the generation and returns it.
    pub fn begin_load(&self) -> Generation {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        state.generation
    }

    /// Starts a load and empties the slot in the same step, so readers see
    /// "no data yet" until this load resolves.
    pub fn begin_empty_load(&self) -> Generation {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        state.records = Arc::new(Vec::new());
        debug!(generation = state.generation, "Catalog slot reset to empty");
        state.generation
    }

    /// Replaces the whole catalog if `generation` is still the latest load.
    /// Returns false when the publish was discarded as stale.
    pub fn publish(&self, generation: Generation, records: impl Into<Arc<Catalog>>) -> bool {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if generation != state.generation {
            debug!(generation, latest = state.generation, "Discarding stale catalog");
            return false;
        }
        state.records = records.into();
        true
    }

    pub fn current_generation(&self) -> Generation {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).generation
    }
}
