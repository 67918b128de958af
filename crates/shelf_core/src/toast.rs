use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::task::JoinHandle;

use crate::{collaborators::NotificationSink, debounce::lock};

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Where a toast is drawn. `None` hides it.
pub trait ToastDisplay: Send + Sync {
    fn render(&self, message: Option<&str>);
}

struct ToastState {
    current: Mutex<Option<String>>,
    shown: AtomicU64,
    display: Arc<dyn ToastDisplay>,
}

/// Single-slot notification area. A newer message replaces the displayed
/// one and restarts the hide timer; there is no queue.
pub struct ToastNotifier {
    state: Arc<ToastState>,
    ttl: Duration,
    hide_task: Mutex<Option<JoinHandle<()>>>,
}

impl ToastNotifier {
    pub fn new(display: Arc<dyn ToastDisplay>, ttl: Duration) -> Self {
        Self {
            state: Arc::new(ToastState {
                current: Mutex::new(None),
                shown: AtomicU64::new(0),
                display,
            }),
            ttl,
            hide_task: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<String> {
        lock(&self.state.current).clone()
    }

    pub fn shown(&self) -> u64 {
        self.state.shown.load(Ordering::SeqCst)
    }
}

impl NotificationSink for ToastNotifier {
    fn show(&self, message: &str) {
        let generation = self.state.shown.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.state.current) = Some(message.to_string());
        self.state.display.render(Some(message));

        let state = Arc::clone(&self.state);
        let ttl = self.ttl;
        let task = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if state.shown.load(Ordering::SeqCst) != generation {
                return;
            }
            *lock(&state.current) = None;
            state.display.render(None);
        });
        if let Some(previous) = lock(&self.hide_task).replace(task) {
            previous.abort();
        }
    }
}

impl Drop for ToastNotifier {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.hide_task).take() {
            task.abort();
        }
    }
}
