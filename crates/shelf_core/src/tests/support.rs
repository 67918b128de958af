use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Condvar, Mutex,
};

use async_trait::async_trait;
use shared::{
    domain::{ItemId, PressState, Theme},
    error::{ItemReadError, SurfaceError},
};
use url::Url;

use crate::collaborators::{
    ItemView, Navigator, NotificationSink, Probe, ProbeError, ProbeStatus, SearchSurface,
    ThemeSurface,
};

pub struct FakeItem {
    id: ItemId,
    name: Option<String>,
    description: Option<String>,
    description_unreadable: bool,
    gate: Option<Arc<ReadGate>>,
    target: Option<String>,
    pub visible: AtomicBool,
    pub visibility_writes: AtomicUsize,
    pub loading: AtomicBool,
    pub loading_writes: Mutex<Vec<bool>>,
    pub pointer_enabled: AtomicBool,
    pub focused: AtomicBool,
    pub press: Mutex<PressState>,
}

impl FakeItem {
    pub fn new(id: usize, name: &str) -> Self {
        Self {
            id: ItemId(id),
            name: Some(name.to_string()),
            description: None,
            description_unreadable: false,
            gate: None,
            target: None,
            visible: AtomicBool::new(true),
            visibility_writes: AtomicUsize::new(0),
            loading: AtomicBool::new(false),
            loading_writes: Mutex::new(Vec::new()),
            pointer_enabled: AtomicBool::new(true),
            focused: AtomicBool::new(false),
            press: Mutex::new(PressState::Rest),
        }
    }

    /// A card with no readable name element.
    pub fn malformed(id: usize) -> Self {
        let mut item = Self::new(id, "");
        item.name = None;
        item
    }

    /// A card whose description element exists but cannot be read.
    pub fn unreadable_description(mut self) -> Self {
        self.description_unreadable = true;
        self
    }

    /// Makes `name()` block until `gate` opens.
    pub fn gated(mut self, gate: Arc<ReadGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_pointer_enabled(&self) -> bool {
        self.pointer_enabled.load(Ordering::SeqCst)
    }
}

impl ItemView for FakeItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn name(&self) -> Result<String, ItemReadError> {
        if let Some(gate) = &self.gate {
            gate.pass();
        }
        self.name
            .clone()
            .ok_or(ItemReadError::MissingName { item: self.id })
    }

    fn description(&self) -> Result<Option<String>, ItemReadError> {
        if self.description_unreadable {
            return Err(ItemReadError::Malformed {
                item: self.id,
                reason: "description element detached".into(),
            });
        }
        Ok(self.description.clone())
    }

    fn target(&self) -> Option<String> {
        self.target.clone()
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
        self.visibility_writes.fetch_add(1, Ordering::SeqCst);
    }

    fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
        self.loading_writes.lock().expect("writes").push(loading);
    }

    fn set_pointer_enabled(&self, enabled: bool) {
        self.pointer_enabled.store(enabled, Ordering::SeqCst);
    }

    fn set_focus_ring(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    fn set_press(&self, press: PressState) {
        *self.press.lock().expect("press") = press;
    }
}

/// Blocks reader threads until opened. Records that a reader arrived.
#[derive(Default)]
pub struct ReadGate {
    open: Mutex<bool>,
    opened: Condvar,
    pub entered: AtomicBool,
}

impl ReadGate {
    fn pass(&self) {
        self.entered.store(true, Ordering::SeqCst);
        let mut open = self.open.lock().expect("gate");
        while !*open {
            open = self.opened.wait(open).expect("gate");
        }
    }

    pub fn open(&self) {
        *self.open.lock().expect("gate") = true;
        self.opened.notify_all();
    }

    pub fn has_reader(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }
}

pub fn views(items: &[Arc<FakeItem>]) -> Vec<Arc<dyn ItemView>> {
    items
        .iter()
        .map(|item| Arc::clone(item) as Arc<dyn ItemView>)
        .collect()
}

#[derive(Default)]
pub struct FakeSearchSurface {
    pub busy: AtomicBool,
    pub busy_writes: Mutex<Vec<bool>>,
    pub clears: AtomicUsize,
}

impl FakeSearchSurface {
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

impl SearchSurface for FakeSearchSurface {
    fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
        self.busy_writes.lock().expect("busy").push(busy);
    }

    fn clear_input(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeThemeSurface {
    pub theme: Mutex<Option<Theme>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FakeThemeSurface {
    pub fn current(&self) -> Option<Theme> {
        *self.theme.lock().expect("theme")
    }
}

impl ThemeSurface for FakeThemeSurface {
    fn applied(&self) -> Result<Option<Theme>, SurfaceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SurfaceError::new("theme marker", "read refused"));
        }
        Ok(self.current())
    }

    fn apply(&self, theme: Theme) -> Result<(), SurfaceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SurfaceError::new("theme marker", "write refused"));
        }
        *self.theme.lock().expect("theme") = Some(theme);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("messages").clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn show(&self, message: &str) {
        self.messages
            .lock()
            .expect("messages")
            .push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().expect("visited").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &Url) {
        self.visited
            .lock()
            .expect("visited")
            .push(target.to_string());
    }
}

pub enum ScriptedResponse {
    Status(u16),
    Transport(&'static str),
    Hang,
}

/// Probe that answers from a fixed script and counts calls.
pub struct ScriptedProbe {
    response: ScriptedResponse,
    pub calls: AtomicUsize,
    pub release: tokio::sync::Notify,
}

impl ScriptedProbe {
    pub fn new(response: ScriptedResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            release: tokio::sync::Notify::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self, _target: &Url) -> Result<ProbeStatus, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            ScriptedResponse::Status(code) => Ok(ProbeStatus(*code)),
            ScriptedResponse::Transport(message) => Err(ProbeError::Transport(message.to_string())),
            ScriptedResponse::Hang => {
                self.release.notified().await;
                Ok(ProbeStatus(200))
            }
        }
    }
}
