//! User settings singleton (theme and notifications).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ValidationError};
use crate::storage::Store;

/// Id of the single settings record.
pub const SETTINGS_ID: &str = "default";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    /// Whether the dark palette applies, given the platform preference.
    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::System => system_prefers_dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            other => Err(ValidationError::InvalidValue {
                field: "theme".into(),
                message: format!("'{other}' is not one of light, dark, system"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: ThemeMode,
    pub notifications_enabled: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Settings {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            theme: ThemeMode::System,
            notifications_enabled: false,
            created_at: now,
        }
    }

    /// Read the stored settings, creating and persisting defaults if absent.
    pub fn load_or_init<S: Store + ?Sized>(store: &mut S, now: DateTime<Utc>) -> Result<Self> {
        if let Some(settings) = store.get_settings()? {
            return Ok(settings);
        }
        let settings = Self::new(now);
        store.put_settings(&settings)?;
        tracing::info!("initialized default settings");
        Ok(settings)
    }

    /// Persist a new theme, then apply it to `self`.
    pub fn set_theme<S: Store + ?Sized>(&mut self, store: &mut S, theme: ThemeMode) -> Result<()> {
        let next = Self {
            theme,
            ..self.clone()
        };
        store.put_settings(&next)?;
        *self = next;
        tracing::info!(%theme, "theme changed");
        Ok(())
    }

    /// Persist the notifications flag, then apply it to `self`.
    pub fn set_notifications<S: Store + ?Sized>(&mut self, store: &mut S, enabled: bool) -> Result<()> {
        let next = Self {
            notifications_enabled: enabled,
            ..self.clone()
        };
        store.put_settings(&next)?;
        *self = next;
        tracing::info!(enabled, "notifications toggled");
        Ok(())
    }
}
