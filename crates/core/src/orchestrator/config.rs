//! Orchestration configuration.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A schedule slot that does not parse as a daily wall-clock time.
#[derive(Debug, Error)]
#[error("invalid schedule time {slot:?}: {source}")]
pub struct ScheduleError {
    pub slot: String,
    #[source]
    pub source: chrono::ParseError,
}

fn default_grace_period_hours() -> u32 {
    4
}

fn default_max_backup_attempts() -> u32 {
    1
}

fn default_cross_link_template() -> String {
    "\n\nWatch the full episode:\n{url}".to_string()
}

/// Tunables for the trigger, backup and publish controllers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Hours a triggered run may stay unconfirmed before the backup
    /// check treats it as stalled.
    #[serde(default = "default_grace_period_hours")]
    pub grace_period_hours: u32,
    /// Maximum backup dispatches per original trigger date.
    #[serde(default = "default_max_backup_attempts")]
    pub max_backup_attempts: u32,
    /// Text block appended to secondary descriptions; `{url}` is
    /// replaced with the primary artifact's watch URL.
    #[serde(default = "default_cross_link_template")]
    pub cross_link_template: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            grace_period_hours: default_grace_period_hours(),
            max_backup_attempts: default_max_backup_attempts(),
            cross_link_template: default_cross_link_template(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_main() -> String {
    "00:05".to_string()
}

fn default_backup_check() -> String {
    "04:00".to_string()
}

fn default_publish_primary() -> String {
    "17:00".to_string()
}

fn default_publish_secondary() -> String {
    "17:30".to_string()
}

/// Daily trigger times, local wall clock, "HH:MM".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Whether the scheduler spawns trigger loops at all. Disabled in
    /// tests and when driving the controllers manually over HTTP.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_main")]
    pub main: String,
    #[serde(default = "default_backup_check")]
    pub backup_check: String,
    #[serde(default = "default_publish_primary")]
    pub publish_primary: String,
    #[serde(default = "default_publish_secondary")]
    pub publish_secondary: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            main: default_main(),
            backup_check: default_backup_check(),
            publish_primary: default_publish_primary(),
            publish_secondary: default_publish_secondary(),
        }
    }
}

impl ScheduleConfig {
    /// Parse one "HH:MM" slot.
    pub fn parse_slot(slot: &str) -> Result<NaiveTime, ScheduleError> {
        NaiveTime::parse_from_str(slot, "%H:%M").map_err(|e| ScheduleError {
            slot: slot.to_string(),
            source: e,
        })
    }

    /// Validate every configured slot.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for slot in [
            &self.main,
            &self.backup_check,
            &self.publish_primary,
            &self.publish_secondary,
        ] {
            Self::parse_slot(slot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orchestrator_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.grace_period_hours, 4);
        assert_eq!(config.max_backup_attempts, 1);
        assert!(config.cross_link_template.contains("{url}"));
    }

    #[test]
    fn test_schedule_defaults_are_valid() {
        let config = ScheduleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.main, "00:05");
        assert_eq!(config.publish_secondary, "17:30");
    }

    #[test]
    fn test_schedule_rejects_bad_slot() {
        let config = ScheduleConfig {
            main: "25:00".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.slot, "25:00");
        assert!(err.to_string().contains("25:00"));
    }
}
