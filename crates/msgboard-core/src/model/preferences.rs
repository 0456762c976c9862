use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    HighContrast,
}

/// Per-user display preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub show_mature_content: bool,
    pub theme: Theme,
}

impl Preferences {
    pub fn new(show_mature_content: bool, theme: Theme) -> Self {
        Self {
            show_mature_content,
            theme,
        }
    }
}
