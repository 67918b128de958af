use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use shared::domain::{Preference, Theme};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    collaborators::{DarkModeSignal, PreferenceStore, ThemeSurface},
    debounce::lock,
};

pub const DEFAULT_PREFERENCE_KEY: &str = "theme";

/// Theme applied when neither the store nor the OS asks for dark.
pub const DEFAULT_THEME: Theme = Theme::Light;

struct PreferenceInner {
    store: Arc<dyn PreferenceStore>,
    surface: Arc<dyn ThemeSurface>,
    key: String,
}

impl PreferenceInner {
    /// Persisted preference; read failures and unknown values count as unset.
    async fn persisted(&self) -> Preference {
        match self.store.get(&self.key).await {
            Ok(Some(raw)) => match Theme::from_str(&raw) {
                Ok(theme) => Preference::from(theme),
                Err(error) => {
                    warn!(key = %self.key, %error, "theme: ignoring stored preference");
                    Preference::Unset
                }
            },
            Ok(None) => Preference::Unset,
            Err(error) => {
                warn!(key = %self.key, error = %format!("{error:#}"), "theme: preference store read failed");
                Preference::Unset
            }
        }
    }

    fn apply_marker(&self, theme: Theme) -> bool {
        match self.surface.apply(theme) {
            Ok(()) => true,
            Err(error) => {
                error!(%theme, %error, "theme: failed to apply");
                false
            }
        }
    }

    async fn follow_os(&self, dark: bool) {
        if self.persisted().await != Preference::Unset {
            debug!(dark, "theme: explicit preference set, ignoring os change");
            return;
        }
        let theme = Theme::from_dark_flag(dark);
        if self.apply_marker(theme) {
            info!(%theme, "theme: following os preference");
        }
    }
}

/// Persisted light/dark preference reconciled with the live OS signal.
pub struct PreferenceController {
    inner: Arc<PreferenceInner>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl PreferenceController {
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        surface: Arc<dyn ThemeSurface>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(PreferenceInner {
                store,
                surface,
                key: key.into(),
            }),
            listener: Mutex::new(None),
        }
    }

    /// Applies the startup theme and starts following OS changes until the
    /// user picks a theme explicitly.
    pub async fn initialize(&self, signal: &dyn DarkModeSignal) -> Theme {
        let events = signal.subscribe();
        let theme = match self.inner.persisted().await.theme() {
            Some(theme) => {
                if self.inner.apply_marker(theme) {
                    debug!(%theme, "theme: restored persisted preference");
                }
                theme
            }
            None if signal.is_dark() => {
                self.inner.apply_marker(Theme::Dark);
                Theme::Dark
            }
            None => DEFAULT_THEME,
        };
        self.listen(events);
        theme
    }

    fn listen(&self, mut events: broadcast::Receiver<bool>) {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(dark) => inner.follow_os(dark).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "theme: os signal lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        if let Some(previous) = lock(&self.listener).replace(task) {
            previous.abort();
        }
    }

    /// Flips the applied theme and persists the result. Returns `None` and
    /// leaves everything unchanged when the marker or the store fails.
    pub async fn toggle(&self) -> Option<Theme> {
        let current = match self.inner.surface.applied() {
            Ok(current) => current,
            Err(error) => {
                error!(%error, "theme: toggle failed to read applied theme");
                return None;
            }
        };
        let next = current.unwrap_or(DEFAULT_THEME).flipped();

        match current {
            Some(previous) => {
                if !self.inner.apply_marker(next) {
                    return None;
                }
                if !self.save(next).await {
                    if let Err(error) = self.inner.surface.apply(previous) {
                        error!(%error, theme = %previous, "theme: failed to restore marker");
                    }
                    return None;
                }
            }
            // An unset marker cannot be restored, so persist before touching it.
            None => {
                if !self.save(next).await || !self.inner.apply_marker(next) {
                    return None;
                }
            }
        }
        info!(theme = %next, "theme: toggled");
        Some(next)
    }

    async fn save(&self, theme: Theme) -> bool {
        match self.inner.store.set(&self.inner.key, theme.as_str()).await {
            Ok(()) => true,
            Err(error) => {
                error!(error = %format!("{error:#}"), %theme, "theme: failed to save preference");
                false
            }
        }
    }

    /// Sets the applied marker and persists it.
    pub async fn apply(&self, theme: Theme) -> anyhow::Result<()> {
        self.inner.surface.apply(theme)?;
        self.inner.store.set(&self.inner.key, theme.as_str()).await?;
        info!(%theme, "theme: applied and saved");
        Ok(())
    }

    pub async fn preference(&self) -> Preference {
        self.inner.persisted().await
    }

    pub fn applied(&self) -> Option<Theme> {
        self.inner.surface.applied().ok().flatten()
    }

    pub fn dispose(&self) {
        if let Some(task) = lock(&self.listener).take() {
            task.abort();
        }
    }
}

impl Drop for PreferenceController {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "tests/preference_tests.rs"]
mod tests;
