use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use shared::{
    domain::{configured_target, ActivationPhase, ItemId, PressState},
    protocol::Key,
};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    collaborators::{ItemView, Navigator, NotificationSink, Probe, ProbeError},
    debounce::lock,
};

/// Label used in notices when a card's name element cannot be read.
pub const UNNAMED_TOOL: &str = "unnamed tool";

pub fn not_configured_message(name: &str) -> String {
    format!("Tool \"{name}\" is not yet implemented.")
}

pub fn unavailable_message(name: &str) -> String {
    format!("Tool \"{name}\" is currently unavailable.")
}

pub fn failed_message(name: &str) -> String {
    format!("Failed to load \"{name}\". Check your connection.")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    Navigated { url: Url },
    Unavailable { status: u16 },
    Failed { reason: String },
    NotConfigured,
    /// The request was aborted by teardown before it resolved.
    Cancelled,
}

impl ActivationOutcome {
    pub fn phase(&self) -> ActivationPhase {
        match self {
            ActivationOutcome::Navigated { .. } => ActivationPhase::Navigating,
            ActivationOutcome::Unavailable { .. } => ActivationPhase::Unavailable,
            ActivationOutcome::Failed { .. } => ActivationPhase::Failed,
            ActivationOutcome::NotConfigured => ActivationPhase::NotConfigured,
            ActivationOutcome::Cancelled => ActivationPhase::Idle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivationSettings {
    pub probe_timeout: Duration,
    pub base_url: Option<Url>,
}

impl Default for ActivationSettings {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(8),
            base_url: None,
        }
    }
}

/// Handle to one in-flight activation request.
#[derive(Debug)]
pub struct ActivationTicket {
    pub item: ItemId,
    pub request: u64,
    handle: JoinHandle<ActivationOutcome>,
}

impl ActivationTicket {
    pub async fn outcome(self) -> ActivationOutcome {
        self.handle.await.unwrap_or(ActivationOutcome::Cancelled)
    }
}

#[derive(Debug)]
pub struct KeyResponse {
    pub default_prevented: bool,
    pub ticket: Option<ActivationTicket>,
}

struct ItemSlot {
    view: Arc<dyn ItemView>,
    phase: Mutex<ActivationPhase>,
}

type InFlight = Arc<Mutex<HashMap<ItemId, (u64, AbortHandle)>>>;

/// Owns the item lock for one request and releases it on every exit path,
/// including panics and task aborts.
struct ActivationGuard {
    item: ItemId,
    request: u64,
    slot: Arc<ItemSlot>,
    in_flight: InFlight,
}

impl ActivationGuard {
    fn engage(item: ItemId, request: u64, slot: Arc<ItemSlot>, in_flight: InFlight) -> Self {
        slot.view.set_loading(true);
        slot.view.set_pointer_enabled(false);
        Self {
            item,
            request,
            slot,
            in_flight,
        }
    }

    fn settle(&self, phase: ActivationPhase) {
        *lock(&self.slot.phase) = phase;
    }
}

impl Drop for ActivationGuard {
    fn drop(&mut self) {
        self.slot.view.set_loading(false);
        self.slot.view.set_pointer_enabled(true);
        {
            let mut phase = lock(&self.slot.phase);
            if *phase != ActivationPhase::Navigating {
                *phase = ActivationPhase::Idle;
            }
        }
        let mut in_flight = lock(&self.in_flight);
        if in_flight
            .get(&self.item)
            .is_some_and(|(request, _)| *request == self.request)
        {
            in_flight.remove(&self.item);
        }
    }
}

struct ActivationInner {
    slots: HashMap<ItemId, Arc<ItemSlot>>,
    notifier: Arc<dyn NotificationSink>,
    probe: Arc<dyn Probe>,
    navigator: Arc<dyn Navigator>,
    settings: ActivationSettings,
    requests: AtomicU64,
    in_flight: InFlight,
    detached: AtomicBool,
}

impl ActivationInner {
    async fn run(&self, guard: ActivationGuard) -> ActivationOutcome {
        let item = guard.item;
        let request = guard.request;
        let name = match guard.slot.view.name() {
            Ok(name) => name,
            Err(error) => {
                warn!(%item, %error, "activation: item name unreadable");
                UNNAMED_TOOL.to_string()
            }
        };

        let target = guard.slot.view.target();
        let Some(target) = configured_target(target.as_deref()) else {
            guard.settle(ActivationPhase::NotConfigured);
            debug!(%item, request, tool = %name, "activation: no target configured");
            self.notifier.show(&not_configured_message(&name));
            return ActivationOutcome::NotConfigured;
        };

        let url = match resolve_target(self.settings.base_url.as_ref(), target) {
            Ok(url) => url,
            Err(err) => return self.fail(&guard, &name, err),
        };

        debug!(%item, request, %url, "activation: probing target");
        let timeout = self.settings.probe_timeout;
        let probed = tokio::time::timeout(timeout, self.probe.probe(&url))
            .await
            .unwrap_or(Err(ProbeError::TimedOut(timeout)));

        match probed {
            Ok(status) if status.is_success() => {
                guard.settle(ActivationPhase::Navigating);
                info!(%item, request, tool = %name, %url, "activation: navigating");
                self.navigator.navigate(&url);
                ActivationOutcome::Navigated { url }
            }
            Ok(status) => {
                guard.settle(ActivationPhase::Unavailable);
                warn!(%item, request, tool = %name, status = status.0, "activation: tool unavailable");
                self.notifier.show(&unavailable_message(&name));
                ActivationOutcome::Unavailable { status: status.0 }
            }
            Err(err) => self.fail(&guard, &name, err),
        }
    }

    fn fail(&self, guard: &ActivationGuard, name: &str, err: ProbeError) -> ActivationOutcome {
        guard.settle(ActivationPhase::Failed);
        error!(
            item = %guard.item,
            request = guard.request,
            tool = %name,
            error = %err,
            "activation: error accessing tool"
        );
        self.notifier.show(&failed_message(name));
        ActivationOutcome::Failed {
            reason: err.to_string(),
        }
    }
}

/// Resolves a card target, joining relative references onto `base`.
pub fn resolve_target(base: Option<&Url>, target: &str) -> Result<Url, ProbeError> {
    let invalid = |message: String| ProbeError::InvalidTarget {
        target: target.to_string(),
        message,
    };
    match Url::parse(target) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| invalid("relative target without a base url".into()))?;
            base.join(target).map_err(|err| invalid(err.to_string()))
        }
        Err(err) => Err(invalid(err.to_string())),
    }
}

/// Click/keyboard activation of cards: probe the target, then navigate or
/// report why not.
pub struct ActivationController {
    inner: Arc<ActivationInner>,
}

impl ActivationController {
    pub fn new(
        items: Vec<Arc<dyn ItemView>>,
        notifier: Arc<dyn NotificationSink>,
        probe: Arc<dyn Probe>,
        navigator: Arc<dyn Navigator>,
        settings: ActivationSettings,
    ) -> Self {
        let slots = items
            .into_iter()
            .map(|view| {
                (
                    view.id(),
                    Arc::new(ItemSlot {
                        view,
                        phase: Mutex::new(ActivationPhase::Idle),
                    }),
                )
            })
            .collect();
        Self {
            inner: Arc::new(ActivationInner {
                slots,
                notifier,
                probe,
                navigator,
                settings,
                requests: AtomicU64::new(0),
                in_flight: Arc::new(Mutex::new(HashMap::new())),
                detached: AtomicBool::new(false),
            }),
        }
    }

    fn slot(&self, item: ItemId) -> Option<&Arc<ItemSlot>> {
        if self.inner.detached.load(Ordering::SeqCst) {
            return None;
        }
        let slot = self.inner.slots.get(&item);
        if slot.is_none() {
            warn!(%item, "activation: unknown item");
        }
        slot
    }

    /// Starts a request for `item` unless one is already outstanding.
    pub fn activate(&self, item: ItemId) -> Option<ActivationTicket> {
        let slot = self.slot(item)?;
        {
            let mut phase = lock(&slot.phase);
            if !phase.accepts_gesture() {
                let current = *phase;
                debug!(%item, phase = ?current, "activation: ignoring gesture while busy");
                return None;
            }
            *phase = ActivationPhase::Probing;
        }

        let request = self.inner.requests.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = ActivationGuard::engage(
            item,
            request,
            Arc::clone(slot),
            Arc::clone(&self.inner.in_flight),
        );
        let inner = Arc::clone(&self.inner);
        // The guard's drop takes this lock, so the entry is in place before
        // the request can remove it.
        let handle = {
            let mut in_flight = lock(&self.inner.in_flight);
            let handle = tokio::spawn(async move { inner.run(guard).await });
            in_flight.insert(item, (request, handle.abort_handle()));
            handle
        };

        Some(ActivationTicket {
            item,
            request,
            handle,
        })
    }

    pub fn on_click(&self, item: ItemId) -> Option<ActivationTicket> {
        self.activate(item)
    }

    pub fn on_key(&self, item: ItemId, key: &Key) -> KeyResponse {
        if !key.activates() {
            return KeyResponse {
                default_prevented: false,
                ticket: None,
            };
        }
        KeyResponse {
            default_prevented: true,
            ticket: self.activate(item),
        }
    }

    pub fn on_pointer_down(&self, item: ItemId) {
        if let Some(slot) = self.slot(item) {
            slot.view.set_press(PressState::Pressed);
        }
    }

    pub fn on_pointer_up(&self, item: ItemId) {
        if let Some(slot) = self.slot(item) {
            slot.view.set_press(PressState::Raised);
        }
    }

    pub fn on_pointer_leave(&self, item: ItemId) {
        if let Some(slot) = self.slot(item) {
            slot.view.set_press(PressState::Rest);
        }
    }

    pub fn on_focus(&self, item: ItemId) {
        if let Some(slot) = self.slot(item) {
            slot.view.set_focus_ring(true);
        }
    }

    pub fn on_blur(&self, item: ItemId) {
        if let Some(slot) = self.slot(item) {
            slot.view.set_focus_ring(false);
        }
    }

    pub fn phase(&self, item: ItemId) -> Option<ActivationPhase> {
        self.inner
            .slots
            .get(&item)
            .map(|slot| *lock(&slot.phase))
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.inner.in_flight).len()
    }

    /// Detaches from the page and aborts outstanding probes. Aborted
    /// requests still release their item locks.
    pub fn dispose(&self) {
        self.inner.detached.store(true, Ordering::SeqCst);
        let aborted: Vec<_> = lock(&self.inner.in_flight)
            .drain()
            .map(|(_, (_, handle))| handle)
            .collect();
        for handle in &aborted {
            handle.abort();
        }
        if !aborted.is_empty() {
            debug!(count = aborted.len(), "activation: aborted in-flight probes");
        }
    }
}

#[cfg(test)]
#[path = "tests/activation_tests.rs"]
mod tests;
