//! Shared domain enumerations for the client surface.

use serde::{Deserialize, Serialize};

/// Journey types offered by the composer. The field itself is free text in
/// storage; this list only seeds the selection surface.
pub const TRAVEL_TYPES: [&str; 8] = [
    "Adventure",
    "Relaxation",
    "Cultural",
    "Business",
    "Family",
    "Solo",
    "Question",
    "Opinion",
];

/// Sort key for the derived feed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    Like,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Like => "like",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

impl TryFrom<&str> for Theme {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_toggle_round_trips() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn theme_parses_known_names() {
        assert_eq!(Theme::try_from("dark"), Ok(Theme::Dark));
        assert!(Theme::try_from("sepia").is_err());
    }
}
