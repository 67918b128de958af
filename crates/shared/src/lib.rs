pub mod domain;
pub mod error;
pub mod protocol;

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::domain::{configured_target, Preference, Theme, ToolEntry};

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!(Theme::from_str(" Dark ").expect("dark"), Theme::Dark);
        assert_eq!(Theme::from_str("light").expect("light"), Theme::Light);
        assert!(Theme::from_str("sepia").is_err());
    }

    #[test]
    fn theme_flips_both_ways() {
        assert_eq!(Theme::Dark.flipped(), Theme::Light);
        assert_eq!(Theme::Light.flipped(), Theme::Dark);
    }

    #[test]
    fn preference_maps_from_optional_theme() {
        assert_eq!(Preference::from(None), Preference::Unset);
        assert_eq!(Preference::from(Some(Theme::Dark)), Preference::Dark);
        assert_eq!(Preference::Light.theme(), Some(Theme::Light));
        assert_eq!(Preference::Unset.theme(), None);
    }

    #[test]
    fn placeholder_and_blank_targets_are_not_configured() {
        assert_eq!(configured_target(None), None);
        assert_eq!(configured_target(Some("")), None);
        assert_eq!(configured_target(Some("  ")), None);
        assert_eq!(configured_target(Some("#")), None);
        assert_eq!(
            configured_target(Some(" tools/compressor.html ")),
            Some("tools/compressor.html")
        );
    }

    #[test]
    fn tool_entry_accepts_target_alias() {
        let entry: ToolEntry =
            serde_json::from_str(r##"{"name":"Compressor","target":"#"}"##).expect("entry");
        assert_eq!(entry.href.as_deref(), Some("#"));
        assert_eq!(entry.description, None);
    }
}
