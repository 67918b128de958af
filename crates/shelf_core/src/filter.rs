use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tracing::{debug, warn};

use crate::{
    collaborators::{ItemView, SearchSurface},
    debounce::{lock, Debouncer},
};

/// Lowercased, trimmed search text.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// `query` must already be normalized.
pub fn matches_query(name: &str, description: Option<&str>, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    name.to_lowercase().contains(query)
        || description.is_some_and(|desc| desc.to_lowercase().contains(query))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub shown: usize,
    pub hidden: usize,
    pub skipped: usize,
}

struct FilterInner {
    items: Vec<Arc<dyn ItemView>>,
    surface: Arc<dyn SearchSurface>,
    state: Mutex<SearchState>,
    /// Bumped by every new query, clear and flush. Visibility writes happen
    /// under this lock, so a pass from an older epoch cannot write after
    /// the epoch moves on.
    epoch: Mutex<u64>,
    passes: AtomicU64,
    last_outcome: Mutex<Option<(String, FilterOutcome)>>,
}

impl FilterInner {
    fn advance(&self) -> u64 {
        let mut epoch = lock(&self.epoch);
        *epoch += 1;
        *epoch
    }

    /// Returns `None` when the pass was superseded before it finished.
    fn run_pass(&self, query: &str, epoch: u64) -> Option<FilterOutcome> {
        let mut outcome = FilterOutcome::default();
        for item in &self.items {
            let text = item
                .name()
                .and_then(|name| item.description().map(|desc| (name, desc)));
            match text {
                Ok((name, description)) => {
                    let visible = matches_query(&name, description.as_deref(), query);
                    let current = lock(&self.epoch);
                    if *current != epoch {
                        debug!(query, "search: superseded pass abandoned");
                        return None;
                    }
                    item.set_visible(visible);
                    if visible {
                        outcome.shown += 1;
                    } else {
                        outcome.hidden += 1;
                    }
                }
                Err(error) => {
                    warn!(item = %item.id(), %error, "search: skipping unreadable item");
                    outcome.skipped += 1;
                }
            }
        }

        let current = lock(&self.epoch);
        if *current != epoch {
            debug!(query, "search: superseded pass abandoned");
            return None;
        }
        self.surface.set_busy(false);
        self.passes.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_outcome) = Some((query.to_string(), outcome));
        debug!(
            query,
            shown = outcome.shown,
            hidden = outcome.hidden,
            skipped = outcome.skipped,
            "search: filter pass complete"
        );
        Some(outcome)
    }
}

/// Owns the search input and recomputes card visibility, debounced.
pub struct FilterController {
    inner: Arc<FilterInner>,
    debouncer: Debouncer,
}

impl FilterController {
    pub fn new(
        items: Vec<Arc<dyn ItemView>>,
        surface: Arc<dyn SearchSurface>,
        debounce: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(FilterInner {
                items,
                surface,
                state: Mutex::new(SearchState::default()),
                epoch: Mutex::new(0),
                passes: AtomicU64::new(0),
                last_outcome: Mutex::new(None),
            }),
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn on_query_changed(&self, raw_input: &str) {
        let query = normalize_query(raw_input);
        lock(&self.inner.state).query = query.clone();
        self.inner.surface.set_busy(true);

        let epoch = self.inner.advance();
        let inner = Arc::clone(&self.inner);
        self.debouncer.schedule(move || {
            inner.run_pass(&query, epoch);
        });
    }

    /// Escape handler: empties the query and shows every card immediately.
    pub fn clear(&self) {
        self.debouncer.cancel();
        let mut epoch = lock(&self.inner.epoch);
        *epoch += 1;
        lock(&self.inner.state).query.clear();
        self.inner.surface.clear_input();
        for item in &self.inner.items {
            item.set_visible(true);
        }
        self.inner.surface.set_busy(false);
        debug!("search: cleared");
    }

    /// Runs a pass for the current query right away, dropping any pending
    /// debounced pass. `None` if a concurrent clear superseded it.
    pub fn flush(&self) -> Option<FilterOutcome> {
        self.debouncer.cancel();
        let epoch = self.inner.advance();
        let query = self.query();
        self.inner.run_pass(&query, epoch)
    }

    pub fn query(&self) -> String {
        lock(&self.inner.state).query.clone()
    }

    pub fn state(&self) -> SearchState {
        lock(&self.inner.state).clone()
    }

    pub fn passes_completed(&self) -> u64 {
        self.inner.passes.load(Ordering::SeqCst)
    }

    pub fn last_outcome(&self) -> Option<(String, FilterOutcome)> {
        lock(&self.inner.last_outcome).clone()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn dispose(&self) {
        self.inner.advance();
        if self.debouncer.cancel() {
            self.inner.surface.set_busy(false);
        }
    }
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
