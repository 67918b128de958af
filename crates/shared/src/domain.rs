use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseThemeError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ItemId);

/// Target value the catalog uses for tools that have no page yet.
pub const PLACEHOLDER_TARGET: &str = "#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn from_dark_flag(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

/// Persisted theme choice. `Unset` means the user never toggled and the OS
/// signal is allowed to drive the applied theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    Dark,
    Light,
    #[default]
    Unset,
}

impl Preference {
    pub fn theme(self) -> Option<Theme> {
        match self {
            Preference::Dark => Some(Theme::Dark),
            Preference::Light => Some(Theme::Light),
            Preference::Unset => None,
        }
    }
}

impl From<Theme> for Preference {
    fn from(value: Theme) -> Self {
        match value {
            Theme::Dark => Preference::Dark,
            Theme::Light => Preference::Light,
        }
    }
}

impl From<Option<Theme>> for Preference {
    fn from(value: Option<Theme>) -> Self {
        value.map(Preference::from).unwrap_or_default()
    }
}

/// One catalog row as it appears on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "target", skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl ToolEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            href: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Returns the usable target, or `None` when it is missing, blank or the
/// placeholder.
pub fn configured_target(raw: Option<&str>) -> Option<&str> {
    let target = raw?.trim();
    if target.is_empty() || target == PLACEHOLDER_TARGET {
        None
    } else {
        Some(target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPhase {
    Idle,
    Probing,
    Navigating,
    Unavailable,
    Failed,
    NotConfigured,
}

impl ActivationPhase {
    pub fn accepts_gesture(self) -> bool {
        self == ActivationPhase::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressState {
    Rest,
    Pressed,
    Raised,
}
