use crate::{StoreError, Theme};
use parking_lot::RwLock;

/// Durable client-side preferences.
pub trait PreferenceStore: Send + Sync {
    fn theme(&self) -> Option<Theme>;
    fn set_theme(&self, theme: Theme) -> Result<(), StoreError>;
}

/// Process-local store, for tests and for running without a data directory.
#[derive(Default)]
pub struct MemoryPrefs {
    theme: RwLock<Option<Theme>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(theme: Theme) -> Self {
        Self { theme: RwLock::new(Some(theme)) }
    }
}

impl PreferenceStore for MemoryPrefs {
    fn theme(&self) -> Option<Theme> {
        *self.theme.read()
    }

    fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        *self.theme.write() = Some(theme);
        Ok(())
    }
}
