use serde::{de::Deserializer, Deserialize, Serialize};
use std::{fmt, path::PathBuf};

use crate::ConfigError;

/// User preferences shared by every ledger opened from this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default = "Config::default_currency_precision")]
    pub currency_precision: u8,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_ledger: Option<String>,
    /// Participants of the most recent expense, offered as the next default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub last_participants: Vec<String>,

    /// Directory holding ledger files. Defaults to `~/Documents/SplitLedger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_root: Option<PathBuf>,

    /// Directory holding ledger backups. Defaults to `<ledger root>/backups`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            currency: Self::default_currency(),
            currency_precision: Self::default_currency_precision(),
            theme: Theme::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            last_opened_ledger: None,
            last_participants: Vec::new(),
            ledger_root: None,
            backup_root: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 7] = [
        "locale",
        "currency",
        "currency_precision",
        "theme",
        "ui_color_enabled",
        "ledger_root",
        "backup_root",
    ];

    pub fn default_locale() -> String {
        "en-AU".into()
    }

    pub fn default_currency() -> String {
        "AUD".into()
    }

    pub fn default_currency_precision() -> u8 {
        2
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn resolve_ledger_root(&self) -> PathBuf {
        match &self.ledger_root {
            Some(path) => path.clone(),
            None => dirs::document_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("SplitLedger"),
        }
    }

    pub fn resolve_backup_root(&self) -> PathBuf {
        self.backup_root
            .clone()
            .unwrap_or_else(|| self.resolve_ledger_root().join("backups"))
    }

    /// Remembers the participants of the latest expense.
    pub fn remember_participants<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.last_participants = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
    }

    /// Remembered participants that are still on `roster`, in remembered order.
    pub fn participants_on<S: AsRef<str>>(&self, roster: &[S]) -> Vec<String> {
        self.last_participants
            .iter()
            .filter(|name| roster.iter().any(|member| member.as_ref() == name.as_str()))
            .cloned()
            .collect()
    }

    /// Reads a setting by key as display text.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "locale" => self.locale.clone(),
            "currency" => self.currency.clone(),
            "currency_precision" => self.currency_precision.to_string(),
            "theme" => self.theme.to_string(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "ledger_root" => self.resolve_ledger_root().display().to_string(),
            "backup_root" => self.resolve_backup_root().display().to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Updates a setting from user text.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        match key {
            "locale" if value.is_empty() => return Err(invalid("locale cannot be empty")),
            "locale" => self.locale = value.to_string(),
            "currency" if value.len() != 3 => {
                return Err(invalid("use a three-letter currency code"))
            }
            "currency" => self.currency = value.to_ascii_uppercase(),
            "currency_precision" => {
                self.currency_precision = value
                    .parse::<u8>()
                    .ok()
                    .filter(|digits| *digits <= 6)
                    .ok_or_else(|| invalid("expected a number between 0 and 6"))?;
            }
            "theme" => self.theme = Theme::from_str(value),
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => return Err(invalid("expected on or off")),
                }
            }
            "ledger_root" => self.ledger_root = optional_path(value),
            "backup_root" => self.backup_root = optional_path(value),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    match value {
        "" | "default" => None,
        path => Some(PathBuf::from(path)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Lenient parse: anything other than `dark` selects the light theme.
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().map(Theme::from_str).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembered_participants_are_filtered_to_roster() {
        let mut config = Config::default();
        config.remember_participants(["Ana", " Ben ", "", "Cho"]);
        assert_eq!(config.last_participants, vec!["Ana", "Ben", "Cho"]);
        assert_eq!(config.participants_on(&["Cho", "Ana"]), vec!["Ana", "Cho"]);
    }

    #[test]
    fn set_validates_values() {
        let mut config = Config::default();
        config.set("currency", "eur").expect("currency");
        assert_eq!(config.currency, "EUR");
        assert!(matches!(
            config.set("currency_precision", "12"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("colour", "blue"),
            Err(ConfigError::UnknownKey(_))
        ));
        config.set("theme", "DARK").expect("theme");
        assert_eq!(config.get("theme").expect("get"), "dark");
    }

    #[test]
    fn unknown_theme_falls_back_to_light() {
        let config: Config = serde_json::from_str(r#"{"theme":"neon"}"#).expect("parse");
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.locale, "en-AU");
        assert_eq!(config.currency_precision, 2);
    }
}
