//! Automatic lifecycle configuration.

use crate::error::{Error, Result};

/// Environment variable enabling [`MockConfig::clear_mocks`].
pub const CLEAR_MOCKS_ENV: &str = "TESTKIT_MOCK_CLEAR_MOCKS";
/// Environment variable enabling [`MockConfig::reset_mocks`].
pub const RESET_MOCKS_ENV: &str = "TESTKIT_MOCK_RESET_MOCKS";
/// Environment variable enabling [`MockConfig::restore_mocks`].
pub const RESTORE_MOCKS_ENV: &str = "TESTKIT_MOCK_RESTORE_MOCKS";

/// Which lifecycle operation a registry applies automatically.
///
/// When several flags are set the strongest wins: restore implies reset,
/// which implies clear.
///
/// # Example
///
/// ```rust
/// use testkit_mock::registry::{LifecycleAction, MockConfig};
///
/// let config = MockConfig::new().with_clear_mocks(true).with_restore_mocks(true);
/// assert_eq!(config.action(), Some(LifecycleAction::Restore));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MockConfig {
    /// Clear recorded history.
    pub clear_mocks: bool,
    /// Clear history and configured behavior.
    pub reset_mocks: bool,
    /// Reset and reinstate original behavior.
    pub restore_mocks: bool,
}

/// A single lifecycle operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleAction {
    /// `mock_clear`
    Clear,
    /// `mock_reset`
    Reset,
    /// `mock_restore`
    Restore,
}

impl MockConfig {
    /// A configuration with every flag off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `clear_mocks`.
    #[must_use]
    pub fn with_clear_mocks(mut self, enabled: bool) -> Self {
        self.clear_mocks = enabled;
        self
    }

    /// Set `reset_mocks`.
    #[must_use]
    pub fn with_reset_mocks(mut self, enabled: bool) -> Self {
        self.reset_mocks = enabled;
        self
    }

    /// Set `restore_mocks`.
    #[must_use]
    pub fn with_restore_mocks(mut self, enabled: bool) -> Self {
        self.restore_mocks = enabled;
        self
    }

    /// Read the flags from the process environment.
    ///
    /// Unset variables leave the flag off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mock`] if a variable holds something other than a
    /// boolean (`1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the flags through `lookup`, keyed by the environment variable names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mock`] if a value is not a recognized boolean.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| -> Result<bool> {
            match lookup(key) {
                Some(value) => parse_flag(key, &value),
                None => Ok(false),
            }
        };

        Ok(Self {
            clear_mocks: flag(CLEAR_MOCKS_ENV)?,
            reset_mocks: flag(RESET_MOCKS_ENV)?,
            restore_mocks: flag(RESTORE_MOCKS_ENV)?,
        })
    }

    /// The operation this configuration calls for, if any.
    #[must_use]
    pub fn action(&self) -> Option<LifecycleAction> {
        if self.restore_mocks {
            Some(LifecycleAction::Restore)
        } else if self.reset_mocks {
            Some(LifecycleAction::Reset)
        } else if self.clear_mocks {
            Some(LifecycleAction::Clear)
        } else {
            None
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::mock(format!(
            "{key} must be a boolean, got {other:?}"
        ))),
    }
}
