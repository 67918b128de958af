//! Terminal-backed page surfaces. Every visible state change becomes one
//! line on the output writer.

use std::{
    io::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use shared::{
    domain::{ItemId, PressState, Theme, ToolEntry},
    error::{ItemReadError, SurfaceError},
    protocol::PageUpdate,
};
use shelf_core::{ItemView, Navigator, SearchSurface, ThemeSurface, ToastDisplay};
use tracing::{debug, warn};
use url::Url;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Clone)]
pub struct Output {
    format: OutputFormat,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Output {
    pub fn new(format: OutputFormat, writer: Box<dyn Write + Send>) -> Self {
        Self {
            format,
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, Box::new(std::io::stdout()))
    }

    pub fn emit(&self, update: PageUpdate) {
        let line = match self.format {
            OutputFormat::Json => match serde_json::to_string(&update) {
                Ok(line) => line,
                Err(error) => {
                    warn!(%error, "failed to encode page update");
                    return;
                }
            },
            OutputFormat::Text => render_text(&update),
        };
        let mut writer = lock(&self.writer);
        if let Err(error) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            warn!(%error, "failed to write page update");
        }
    }
}

pub fn render_text(update: &PageUpdate) -> String {
    match update {
        PageUpdate::ThemeApplied { theme } => format!("theme: {theme}"),
        PageUpdate::ItemVisibility { item, visible } => {
            format!("card {item}: {}", if *visible { "shown" } else { "hidden" })
        }
        PageUpdate::ItemLoading { item, loading } => {
            format!("card {item}: {}", if *loading { "loading" } else { "ready" })
        }
        PageUpdate::SearchBusy { busy } => {
            format!("search: {}", if *busy { "filtering" } else { "idle" })
        }
        PageUpdate::Notification { message: Some(message) } => format!("toast: {message}"),
        PageUpdate::Notification { message: None } => "toast: hidden".to_string(),
        PageUpdate::Navigated { url } => format!("navigate: {url}"),
    }
}

/// One catalog entry rendered as a card.
pub struct CardView {
    id: ItemId,
    entry: ToolEntry,
    visible: AtomicBool,
    loading: AtomicBool,
    pointer_enabled: AtomicBool,
    focused: AtomicBool,
    press: Mutex<PressState>,
    output: Output,
}

impl CardView {
    pub fn new(id: ItemId, entry: ToolEntry, output: Output) -> Self {
        Self {
            id,
            entry,
            visible: AtomicBool::new(true),
            loading: AtomicBool::new(false),
            pointer_enabled: AtomicBool::new(true),
            focused: AtomicBool::new(false),
            press: Mutex::new(PressState::Rest),
            output,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }
}

impl ItemView for CardView {
    fn id(&self) -> ItemId {
        self.id
    }

    fn name(&self) -> Result<String, ItemReadError> {
        Ok(self.entry.name.clone())
    }

    fn description(&self) -> Result<Option<String>, ItemReadError> {
        Ok(self.entry.description.clone())
    }

    fn target(&self) -> Option<String> {
        self.entry.href.clone()
    }

    fn set_visible(&self, visible: bool) {
        if self.visible.swap(visible, Ordering::SeqCst) != visible {
            self.output.emit(PageUpdate::ItemVisibility {
                item: self.id,
                visible,
            });
        }
    }

    fn set_loading(&self, loading: bool) {
        if self.loading.swap(loading, Ordering::SeqCst) != loading {
            self.output.emit(PageUpdate::ItemLoading {
                item: self.id,
                loading,
            });
        }
    }

    fn set_pointer_enabled(&self, enabled: bool) {
        self.pointer_enabled.store(enabled, Ordering::SeqCst);
    }

    fn set_focus_ring(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
        debug!(item = %self.id, focused, "card focus ring");
    }

    fn set_press(&self, press: PressState) {
        *lock(&self.press) = press;
        debug!(item = %self.id, ?press, "card press state");
    }
}

pub struct SearchBox {
    busy: AtomicBool,
    output: Output,
}

impl SearchBox {
    pub fn new(output: Output) -> Self {
        Self {
            busy: AtomicBool::new(false),
            output,
        }
    }
}

impl SearchSurface for SearchBox {
    fn set_busy(&self, busy: bool) {
        if self.busy.swap(busy, Ordering::SeqCst) != busy {
            self.output.emit(PageUpdate::SearchBusy { busy });
        }
    }

    fn clear_input(&self) {
        debug!("search input cleared");
    }
}

pub struct ThemeMarker {
    theme: Mutex<Option<Theme>>,
    output: Output,
}

impl ThemeMarker {
    pub fn new(output: Output) -> Self {
        Self {
            theme: Mutex::new(None),
            output,
        }
    }
}

impl ThemeSurface for ThemeMarker {
    fn applied(&self) -> Result<Option<Theme>, SurfaceError> {
        Ok(*lock(&self.theme))
    }

    fn apply(&self, theme: Theme) -> Result<(), SurfaceError> {
        *lock(&self.theme) = Some(theme);
        self.output.emit(PageUpdate::ThemeApplied { theme });
        Ok(())
    }
}

pub struct ToastLine {
    output: Output,
}

impl ToastLine {
    pub fn new(output: Output) -> Self {
        Self { output }
    }
}

impl ToastDisplay for ToastLine {
    fn render(&self, message: Option<&str>) {
        self.output.emit(PageUpdate::Notification {
            message: message.map(str::to_string),
        });
    }
}

/// Records navigation instead of leaving the page.
pub struct PrintNavigator {
    output: Output,
}

impl PrintNavigator {
    pub fn new(output: Output) -> Self {
        Self { output }
    }
}

impl Navigator for PrintNavigator {
    fn navigate(&self, target: &Url) {
        self.output.emit(PageUpdate::Navigated {
            url: target.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
