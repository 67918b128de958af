use std::time::Duration;

use url::Url;

use crate::{
    activation::ActivationSettings, preference::DEFAULT_PREFERENCE_KEY,
    toast::DEFAULT_NOTIFICATION_TTL,
};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(100);
pub const MIN_SEARCH_DEBOUNCE: Duration = Duration::from_millis(100);
pub const MAX_SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone)]
pub struct BehaviorSettings {
    pub search_debounce: Duration,
    pub probe_timeout: Duration,
    pub notification_ttl: Duration,
    pub preference_key: String,
    pub base_url: Option<Url>,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            preference_key: DEFAULT_PREFERENCE_KEY.to_string(),
            base_url: None,
        }
    }
}

impl BehaviorSettings {
    /// Clamps the debounce window into 100..=200 ms and forces a non-zero
    /// probe timeout.
    pub fn normalized(mut self) -> Self {
        self.search_debounce = self
            .search_debounce
            .clamp(MIN_SEARCH_DEBOUNCE, MAX_SEARCH_DEBOUNCE);
        if self.probe_timeout.is_zero() {
            self.probe_timeout = DEFAULT_PROBE_TIMEOUT;
        }
        if self.preference_key.trim().is_empty() {
            self.preference_key = DEFAULT_PREFERENCE_KEY.to_string();
        }
        self
    }

    pub fn activation(&self) -> ActivationSettings {
        ActivationSettings {
            probe_timeout: self.probe_timeout,
            base_url: self.base_url.clone(),
        }
    }
}
