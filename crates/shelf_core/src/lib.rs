//! Behavior layer for a tool directory page: theme preference, debounced
//! search filtering and probe-before-navigate card activation.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    domain::{ItemId, Theme},
    protocol::{Key, PageEvent},
};
use tracing::{debug, info};

pub mod activation;
pub mod catalog;
pub mod collaborators;
pub mod debounce;
pub mod filter;
pub mod memory;
pub mod preference;
pub mod probe;
pub mod settings;
pub mod toast;

pub use activation::{ActivationController, ActivationOutcome, ActivationTicket};
pub use catalog::Catalog;
pub use collaborators::{
    DarkModeSignal, ItemView, ManualDarkModeSignal, Navigator, NotificationSink, PreferenceStore,
    Probe, ProbeError, ProbeStatus, SearchSurface, ThemeSurface,
};
pub use filter::FilterController;
pub use memory::MemoryPreferenceStore;
pub use preference::PreferenceController;
pub use probe::HttpProbe;
pub use settings::BehaviorSettings;
pub use toast::{ToastDisplay, ToastNotifier};

/// Everything the page hands the behavior layer at mount time.
pub struct PageContext {
    pub items: Vec<Arc<dyn ItemView>>,
    pub search: Arc<dyn SearchSurface>,
    pub theme: Arc<dyn ThemeSurface>,
    pub store: Arc<dyn PreferenceStore>,
    pub dark_mode: Arc<dyn DarkModeSignal>,
    /// Set when the host simulates the OS signal and wants
    /// `OsDarkModeChanged` events routed into it.
    pub os_feed: Option<Arc<ManualDarkModeSignal>>,
    pub notifier: Arc<dyn NotificationSink>,
    pub probe: Arc<dyn Probe>,
    pub navigator: Arc<dyn Navigator>,
    pub settings: BehaviorSettings,
}

#[derive(Debug)]
pub enum Dispatched {
    Handled,
    /// Key event whose browser default action was suppressed without
    /// starting a request.
    DefaultPrevented,
    Activation(ActivationTicket),
    ThemeToggled(Option<Theme>),
    Ignored,
}

/// The three controllers, mounted together and torn down together.
pub struct Page {
    filter: FilterController,
    activation: ActivationController,
    preference: PreferenceController,
    os_feed: Option<Arc<ManualDarkModeSignal>>,
    mounted: AtomicBool,
}

impl Page {
    pub async fn mount(ctx: PageContext) -> Self {
        let settings = ctx.settings.normalized();
        let item_count = ctx.items.len();

        let filter = FilterController::new(ctx.items.clone(), ctx.search, settings.search_debounce);
        let activation = ActivationController::new(
            ctx.items,
            ctx.notifier,
            ctx.probe,
            ctx.navigator,
            settings.activation(),
        );
        let preference =
            PreferenceController::new(ctx.store, ctx.theme, settings.preference_key.clone());
        let theme = preference.initialize(ctx.dark_mode.as_ref()).await;

        info!(items = item_count, %theme, "page initialized");
        Self {
            filter,
            activation,
            preference,
            os_feed: ctx.os_feed,
            mounted: AtomicBool::new(true),
        }
    }

    pub async fn dispatch(&self, event: PageEvent) -> Dispatched {
        if !self.is_mounted() {
            debug!(event = event.name(), "page: event after unmount ignored");
            return Dispatched::Ignored;
        }

        match event {
            PageEvent::QueryChanged { value } => {
                self.filter.on_query_changed(&value);
                Dispatched::Handled
            }
            PageEvent::SearchKey { key: Key::Escape } => {
                self.filter.clear();
                Dispatched::Handled
            }
            PageEvent::SearchKey { .. } => Dispatched::Ignored,
            PageEvent::Click { item } => self.activation_result(self.activation.on_click(item)),
            PageEvent::ItemKey { item, key } => {
                let response = self.activation.on_key(item, &key);
                match (response.ticket, response.default_prevented) {
                    (Some(ticket), _) => Dispatched::Activation(ticket),
                    (None, true) => Dispatched::DefaultPrevented,
                    (None, false) => Dispatched::Ignored,
                }
            }
            PageEvent::PointerDown { item } => self.presentational(item, |a| a.on_pointer_down(item)),
            PageEvent::PointerUp { item } => self.presentational(item, |a| a.on_pointer_up(item)),
            PageEvent::PointerLeave { item } => {
                self.presentational(item, |a| a.on_pointer_leave(item))
            }
            PageEvent::Focus { item } => self.presentational(item, |a| a.on_focus(item)),
            PageEvent::Blur { item } => self.presentational(item, |a| a.on_blur(item)),
            PageEvent::ToggleTheme => Dispatched::ThemeToggled(self.preference.toggle().await),
            PageEvent::OsDarkModeChanged { dark } => match &self.os_feed {
                Some(feed) => {
                    feed.set(dark);
                    Dispatched::Handled
                }
                None => {
                    debug!(dark, "page: os signal is owned by the host");
                    Dispatched::Ignored
                }
            },
        }
    }

    fn activation_result(&self, ticket: Option<ActivationTicket>) -> Dispatched {
        ticket.map_or(Dispatched::Ignored, Dispatched::Activation)
    }

    fn presentational(
        &self,
        item: ItemId,
        apply: impl FnOnce(&ActivationController),
    ) -> Dispatched {
        if self.activation.phase(item).is_none() {
            debug!(%item, "page: event for unknown item ignored");
            return Dispatched::Ignored;
        }
        apply(&self.activation);
        Dispatched::Handled
    }

    pub fn filter(&self) -> &FilterController {
        &self.filter
    }

    pub fn activation(&self) -> &ActivationController {
        &self.activation
    }

    pub fn preference(&self) -> &PreferenceController {
        &self.preference
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Disposes every controller's listeners, timers and in-flight probes.
    pub fn unmount(&self) {
        if !self.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        self.filter.dispose();
        self.activation.dispose();
        self.preference.dispose();
        info!("page unmounted");
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
