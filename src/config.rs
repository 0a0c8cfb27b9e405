use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::models::ReductionPolicy;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log level, format and optional file
    pub logging: LoggingConfig,
    /// Entity labels read from upstream documents
    pub extraction: ExtractionConfig,
    /// Calendar output settings
    pub calendar: CalendarConfig,
    /// Persistent schedule store
    pub storage: StorageConfig,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
    /// Daily-rolled log file; console only when unset
    pub file_path: Option<String>,
    /// Console format
    pub format: String, // "json" or "text"
}

/// Labels the extractor looks for in the upstream entity list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Entity kind of one schedule row
    pub shift_row_kind: String,
    /// Entity kinds whose text may carry the schedule's year
    pub year_marker_kinds: Vec<String>,
    /// Literal suffix removed from department labels
    pub department_suffix: String,
}

/// Calendar output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar name used when a conversion does not supply one
    pub default_name: String,
    /// PRODID value
    pub product_id: String,
    /// Fixed event title; when unset the department is used
    pub summary: Option<String>,
    /// IANA timezone name; when unset events use floating local time
    pub timezone: Option<String>,
    /// Whether several records on one date all become events
    pub reduction: ReductionPolicy,
    /// Mix the calendar name into event UIDs
    pub uid_includes_calendar_name: bool,
    /// Skip records with unreadable times instead of placing them at midnight
    pub strict_times: bool,
}

/// Schedule store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Keep each conversion under a job id
    pub enabled: bool,
    /// sled database directory
    pub path: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            shift_row_kind: "Work-shift".to_string(),
            year_marker_kinds: vec!["PageDateRange".to_string(), "DocumentTitle".to_string()],
            department_suffix: " Associate".to_string(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            default_name: "work-schedule".to_string(),
            product_id: "-//MySchedule Cloud//Work Schedule//EN".to_string(),
            summary: None,
            timezone: None,
            reduction: ReductionPolicy::PerRecord,
            uid_includes_calendar_name: false,
            strict_times: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            extraction: ExtractionConfig::default(),
            calendar: CalendarConfig::default(),
            storage: StorageConfig {
                enabled: false,
                path: ".schedule_store".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        Self::load_with_file(None)
    }

    /// Load configuration, layering an explicit file over the default search path
    pub fn load_with_file(extra_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Start with default values
        for (key, value) in Self::default().default_entries() {
            builder = builder.set_default(key, value)?;
        }

        // Add config files if they exist
        builder = builder
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("myschedule").required(false));

        if let Some(path) = extra_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Add environment variables with prefix, e.g. MYSCHEDULE_CALENDAR__TIMEZONE
        let config = builder
            .add_source(
                Environment::with_prefix("MYSCHEDULE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let mut app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        app_config.drop_unknown_timezone();

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        // Validate extraction config
        if self.extraction.shift_row_kind.trim().is_empty() {
            return Err(anyhow::anyhow!("shift_row_kind cannot be empty"));
        }

        // Validate calendar config
        if self.calendar.default_name.trim().is_empty() {
            return Err(anyhow::anyhow!("calendar default_name cannot be empty"));
        }
        if self.calendar.product_id.trim().is_empty() {
            return Err(anyhow::anyhow!("calendar product_id cannot be empty"));
        }

        // Validate storage config
        if self.storage.enabled && self.storage.path.trim().is_empty() {
            return Err(anyhow::anyhow!("storage path must be set when storage is enabled"));
        }

        Ok(())
    }

    /// Clear a calendar timezone chrono-tz does not know; events fall back to floating time
    pub fn drop_unknown_timezone(&mut self) {
        let unknown = self
            .calendar
            .timezone
            .as_deref()
            .filter(|tz| tz.parse::<chrono_tz::Tz>().is_err());
        if let Some(tz) = unknown {
            warn!(timezone = tz, "Unknown calendar timezone, using floating local time");
            self.calendar.timezone = None;
        }
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }

    /// Get calendar timezone from environment or config
    pub fn get_timezone(&self) -> Option<String> {
        std::env::var("MYSCHEDULE_TIMEZONE")
            .ok()
            .filter(|tz| !tz.trim().is_empty())
            .or_else(|| self.calendar.timezone.clone())
    }

    /// Flatten the configuration into key-value pairs for the config builder
    fn default_entries(self) -> Vec<(String, config::Value)> {
        let mut entries = vec![
            ("logging.level".to_string(), config::Value::from(self.logging.level)),
            ("logging.format".to_string(), config::Value::from(self.logging.format)),
            (
                "extraction.shift_row_kind".to_string(),
                config::Value::from(self.extraction.shift_row_kind),
            ),
            (
                "extraction.year_marker_kinds".to_string(),
                config::Value::from(self.extraction.year_marker_kinds),
            ),
            (
                "extraction.department_suffix".to_string(),
                config::Value::from(self.extraction.department_suffix),
            ),
            (
                "calendar.default_name".to_string(),
                config::Value::from(self.calendar.default_name),
            ),
            (
                "calendar.product_id".to_string(),
                config::Value::from(self.calendar.product_id),
            ),
            (
                "calendar.reduction".to_string(),
                config::Value::from(self.calendar.reduction.as_str()),
            ),
            (
                "calendar.uid_includes_calendar_name".to_string(),
                config::Value::from(self.calendar.uid_includes_calendar_name),
            ),
            (
                "calendar.strict_times".to_string(),
                config::Value::from(self.calendar.strict_times),
            ),
            ("storage.enabled".to_string(), config::Value::from(self.storage.enabled)),
            ("storage.path".to_string(), config::Value::from(self.storage.path)),
        ];

        if let Some(file_path) = self.logging.file_path {
            entries.push(("logging.file_path".to_string(), config::Value::from(file_path)));
        }
        if let Some(summary) = self.calendar.summary {
            entries.push(("calendar.summary".to_string(), config::Value::from(summary)));
        }
        if let Some(timezone) = self.calendar.timezone {
            entries.push(("calendar.timezone".to_string(), config::Value::from(timezone)));
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.extraction.shift_row_kind, "Work-shift");
        assert_eq!(config.calendar.reduction, ReductionPolicy::PerRecord);
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_timezone_is_cleared() {
        let mut config = AppConfig::default();
        config.calendar.timezone = Some("Mars/Olympus_Mons".to_string());
        assert!(config.validate().is_ok());

        config.drop_unknown_timezone();
        assert_eq!(config.calendar.timezone, None);
    }

    #[test]
    fn test_default_entries_cover_required_keys() {
        let keys: Vec<String> = AppConfig::default()
            .default_entries()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert!(keys.contains(&"calendar.reduction".to_string()));
        assert!(keys.contains(&"storage.path".to_string()));
        assert!(!keys.contains(&"calendar.timezone".to_string()));
    }
}
