use super::storage::KeyValueStore;
use crate::error::Result;

/// Key under which the theme preference is persisted
pub const THEME_KEY: &str = "medisetu_theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Read the saved preference; anything but `"dark"` means light
    pub fn load(storage: &impl KeyValueStore) -> Result<Self> {
        Ok(match storage.get(THEME_KEY)?.as_deref() {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        })
    }

    pub fn save(&self, storage: &mut impl KeyValueStore) -> Result<()> {
        storage.set(THEME_KEY, self.as_str())
    }
}
