//! Handles the behavior layer receives at mount time instead of reaching for
//! page-global singletons.

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{ItemId, PressState, Theme},
    error::{ItemReadError, SurfaceError},
};
use tokio::sync::broadcast;
use url::Url;

/// One tool card on the page.
pub trait ItemView: Send + Sync {
    fn id(&self) -> ItemId;
    fn name(&self) -> Result<String, ItemReadError>;
    fn description(&self) -> Result<Option<String>, ItemReadError>;
    fn target(&self) -> Option<String>;
    fn set_visible(&self, visible: bool);
    fn set_loading(&self, loading: bool);
    fn set_pointer_enabled(&self, enabled: bool);
    fn set_focus_ring(&self, focused: bool);
    fn set_press(&self, press: PressState);
}

/// The search input and the container that holds the cards.
pub trait SearchSurface: Send + Sync {
    fn set_busy(&self, busy: bool);
    fn clear_input(&self);
}

/// Page-wide theme marker.
pub trait ThemeSurface: Send + Sync {
    fn applied(&self) -> Result<Option<Theme>, SurfaceError>;
    fn apply(&self, theme: Theme) -> Result<(), SurfaceError>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Live OS dark-mode preference.
pub trait DarkModeSignal: Send + Sync {
    fn is_dark(&self) -> bool;
    fn subscribe(&self) -> broadcast::Receiver<bool>;
}

pub trait NotificationSink: Send + Sync {
    fn show(&self, message: &str);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &Url);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStatus(pub u16);

impl ProbeStatus {
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    TimedOut(std::time::Duration),
    #[error("invalid target {target:?}: {message}")]
    InvalidTarget { target: String, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// Metadata-only availability check.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &Url) -> Result<ProbeStatus, ProbeError>;
}

/// Broadcast-backed dark-mode signal whose value is driven by the owner.
pub struct ManualDarkModeSignal {
    dark: std::sync::atomic::AtomicBool,
    tx: broadcast::Sender<bool>,
}

impl ManualDarkModeSignal {
    pub fn new(dark: bool) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            dark: std::sync::atomic::AtomicBool::new(dark),
            tx,
        }
    }

    pub fn set(&self, dark: bool) {
        let previous = self
            .dark
            .swap(dark, std::sync::atomic::Ordering::SeqCst);
        if previous != dark {
            let _ = self.tx.send(dark);
        }
    }
}

impl DarkModeSignal for ManualDarkModeSignal {
    fn is_dark(&self) -> bool {
        self.dark.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.tx.subscribe()
    }
}
