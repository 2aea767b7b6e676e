//! Configuration module for the permissions console.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! Values that fail to parse fall back to their default.

use std::env;
use std::path::PathBuf;

/// What a configuration update does when the product has no configuration yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingConfiguration {
    /// Leave state untouched and report "not applied"
    #[default]
    Ignore,
    /// Fail with a not-found error
    Reject,
}

impl MissingConfiguration {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Some(MissingConfiguration::Ignore),
            "reject" => Some(MissingConfiguration::Reject),
            _ => None,
        }
    }
}

/// Which group wins when two groups grant the same logical permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupPrecedence {
    /// The group processed last replaces earlier grants
    #[default]
    LastWins,
    /// The first group to grant a key keeps it
    FirstWins,
}

impl GroupPrecedence {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" => Some(GroupPrecedence::LastWins),
            "first" => Some(GroupPrecedence::FirstWins),
            _ => None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Policies the console applies to every mutation and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsoleSettings {
    pub missing_configuration: MissingConfiguration,
    pub group_precedence: GroupPrecedence,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format (text, json)
    pub log_format: LogFormat,
    /// Optional JSON snapshot to seed the console from
    pub seed_path: Option<PathBuf>,
    pub settings: ConsoleSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            seed_path: None,
            settings: ConsoleSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_level = lookup("CONSOLE_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match lookup("CONSOLE_LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let seed_path = lookup("CONSOLE_SEED_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let missing_configuration = lookup("CONSOLE_MISSING_CONFIGURATION")
            .and_then(|v| MissingConfiguration::from_str(&v))
            .unwrap_or_default();

        let group_precedence = lookup("CONSOLE_GROUP_PRECEDENCE")
            .and_then(|v| GroupPrecedence::from_str(&v))
            .unwrap_or_default();

        Self {
            log_level,
            log_format,
            seed_path,
            settings: ConsoleSettings {
                missing_configuration,
                group_precedence,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]);

        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.seed_path.is_none());
        assert_eq!(
            config.settings.missing_configuration,
            MissingConfiguration::Ignore
        );
        assert_eq!(config.settings.group_precedence, GroupPrecedence::LastWins);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CONSOLE_LOG_LEVEL", "debug"),
            ("CONSOLE_LOG_FORMAT", "JSON"),
            ("CONSOLE_SEED_PATH", "./data/seed.json"),
            ("CONSOLE_MISSING_CONFIGURATION", "reject"),
            ("CONSOLE_GROUP_PRECEDENCE", "first"),
        ]);

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.seed_path, Some(PathBuf::from("./data/seed.json")));
        assert_eq!(
            config.settings.missing_configuration,
            MissingConfiguration::Reject
        );
        assert_eq!(config.settings.group_precedence, GroupPrecedence::FirstWins);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("CONSOLE_MISSING_CONFIGURATION", "explode"),
            ("CONSOLE_GROUP_PRECEDENCE", "middle"),
            ("CONSOLE_SEED_PATH", "  "),
        ]);

        assert!(config.seed_path.is_none());
        assert_eq!(config.settings, ConsoleSettings::default());
    }
}
