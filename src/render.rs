use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::{Catalog, ProblemRecord};

/// Consumer callback invoked with a freshly loaded catalog.
pub type RenderHook = Arc<dyn Fn(Vec<ProblemRecord>) + Send + Sync>;

/// Holds the render hook, if one is defined.
///
/// The hook can be set or cleared at any time; the loader looks it up only
/// when a load resolves.
#[derive(Clone, Default)]
pub struct RenderHookSlot {
    inner: Arc<RwLock<Option<RenderHook>>>,
}

impl RenderHookSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook<F>(hook: F) -> Self
    where
        F: Fn(Vec<ProblemRecord>) + Send + Sync + 'static,
    {
        let slot = Self::new();
        slot.set(hook);
        slot
    }

    pub fn set<F>(&self, hook: F)
    where
        F: Fn(Vec<ProblemRecord>) + Send + Sync + 'static,
    {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(hook));
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn current(&self) -> Option<RenderHook> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_defined(&self) -> bool {
        self.current().is_some()
    }

    /// Calls the hook with `catalog` if one is defined. Returns whether it ran.
    pub fn invoke(&self, catalog: &Catalog) -> bool {
        // Take the handle out before calling so the hook may replace itself.
        match self.current() {
            Some(hook) => {
                hook(catalog.clone());
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for RenderHookSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderHookSlot")
            .field("defined", &self.is_defined())
            .finish()
    }
}

/// Render hook used by the CLI: prints one line per record.
pub fn console_renderer(records: Vec<ProblemRecord>) {
    println!("📋 {} problem(s) in catalog", records.len());
    for record in &records {
        let vehicle = [record.brand.as_str(), record.model.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let codes = if record.error_codes.is_empty() {
            String::new()
        } else {
            format!(" [{}]", record.error_codes.join(", "))
        };
        println!(
            "   - {}{}{} ({})",
            record.title,
            if vehicle.is_empty() { String::new() } else { format!(" / {vehicle}") },
            codes,
            record.source_url
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_invoke_without_hook_is_noop() {
        let hooks = RenderHookSlot::new();
        assert!(!hooks.is_defined());
        assert!(!hooks.invoke(&Vec::new()));
    }

    #[test]
    fn test_invoke_passes_catalog_by_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let hooks = RenderHookSlot::with_hook(move |records| {
            sink.lock().unwrap().extend(records);
        });

        let catalog = vec![ProblemRecord {
            id: "a1".into(),
            title: "T1".into(),
            brand: "X".into(),
            model: "Y".into(),
            symptoms: vec!["s1".into()],
            error_codes: vec![],
            source_url: "http://e".into(),
            source: "t".into(),
            date_added: None,
        }];

        assert!(hooks.invoke(&catalog));
        assert_eq!(*seen.lock().unwrap(), catalog);
    }

    #[test]
    fn test_clear_removes_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let hooks = RenderHookSlot::with_hook(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        hooks.clear();
        hooks.invoke(&Vec::new());

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
