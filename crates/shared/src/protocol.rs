use serde::{Deserialize, Serialize};

use crate::domain::{ItemId, Theme};

/// Decodes through [`Key::parse`], so both browser key names (`"Enter"`,
/// `" "`) and the snake_case forms are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Key {
    Enter,
    Space,
    Escape,
    #[serde(untagged)]
    Other(String),
}

impl Key {
    /// Keys that activate a focused card.
    pub fn activates(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "Enter" | "enter" => Key::Enter,
            " " | "Space" | "space" | "Spacebar" => Key::Space,
            "Escape" | "escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

impl From<String> for Key {
    fn from(raw: String) -> Self {
        Key::parse(&raw)
    }
}

/// Input events the page delivers to the behavior layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PageEvent {
    QueryChanged { value: String },
    SearchKey { key: Key },
    Click { item: ItemId },
    ItemKey { item: ItemId, key: Key },
    PointerDown { item: ItemId },
    PointerUp { item: ItemId },
    PointerLeave { item: ItemId },
    Focus { item: ItemId },
    Blur { item: ItemId },
    ToggleTheme,
    OsDarkModeChanged { dark: bool },
}

impl PageEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PageEvent::QueryChanged { .. } => "query_changed",
            PageEvent::SearchKey { .. } => "search_key",
            PageEvent::Click { .. } => "click",
            PageEvent::ItemKey { .. } => "item_key",
            PageEvent::PointerDown { .. } => "pointer_down",
            PageEvent::PointerUp { .. } => "pointer_up",
            PageEvent::PointerLeave { .. } => "pointer_leave",
            PageEvent::Focus { .. } => "focus",
            PageEvent::Blur { .. } => "blur",
            PageEvent::ToggleTheme => "toggle_theme",
            PageEvent::OsDarkModeChanged { .. } => "os_dark_mode_changed",
        }
    }

    pub fn item(&self) -> Option<ItemId> {
        match self {
            PageEvent::Click { item }
            | PageEvent::ItemKey { item, .. }
            | PageEvent::PointerDown { item }
            | PageEvent::PointerUp { item }
            | PageEvent::PointerLeave { item }
            | PageEvent::Focus { item }
            | PageEvent::Blur { item } => Some(*item),
            _ => None,
        }
    }
}

/// Page-visible state changes, rendered by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PageUpdate {
    ThemeApplied { theme: Theme },
    ItemVisibility { item: ItemId, visible: bool },
    ItemLoading { item: ItemId, loading: bool },
    SearchBusy { busy: bool },
    Notification { message: Option<String> },
    Navigated { url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_event_uses_tagged_payload() {
        let event: PageEvent =
            serde_json::from_str(r#"{"type":"item_key","payload":{"item":2,"key":"enter"}}"#)
                .expect("decode");
        assert_eq!(
            event,
            PageEvent::ItemKey {
                item: ItemId(2),
                key: Key::Enter
            }
        );
        assert_eq!(event.item(), Some(ItemId(2)));
    }

    #[test]
    fn unit_event_decodes_without_payload() {
        let event: PageEvent = serde_json::from_str(r#"{"type":"toggle_theme"}"#).expect("decode");
        assert_eq!(event, PageEvent::ToggleTheme);
        assert_eq!(event.item(), None);
    }

    #[test]
    fn unknown_key_is_kept_verbatim() {
        let key: Key = serde_json::from_str(r#""Tab""#).expect("decode");
        assert_eq!(key, Key::Other("Tab".into()));
        assert!(!key.activates());
    }

    #[test]
    fn decodes_browser_key_names_in_events() {
        for (raw, expected) in [("Enter", Key::Enter), (" ", Key::Space), ("Escape", Key::Escape)] {
            let key: Key = serde_json::from_str(&serde_json::to_string(raw).expect("encode"))
                .expect("decode");
            assert_eq!(key, expected, "key {raw:?}");
        }

        let event: PageEvent =
            serde_json::from_str(r#"{"type":"search_key","payload":{"key":"Escape"}}"#)
                .expect("decode");
        assert_eq!(event, PageEvent::SearchKey { key: Key::Escape });
    }

    #[test]
    fn snake_case_keys_survive_encoding() {
        let encoded = serde_json::to_string(&Key::Space).expect("encode");
        assert_eq!(encoded, r#""space""#);
        assert_eq!(serde_json::from_str::<Key>(&encoded).expect("decode"), Key::Space);
    }

    #[test]
    fn parses_browser_key_names() {
        assert_eq!(Key::parse(" "), Key::Space);
        assert_eq!(Key::parse("Escape"), Key::Escape);
        assert!(Key::parse("Enter").activates());
    }
}
