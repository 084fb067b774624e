use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Category tree invariants (non-empty, unique groups)
/// - Schedule slots parse as "HH:MM"
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    config
        .category_tree()
        .map_err(|e| ConfigError::ValidationError(format!("content.categories: {e}")))?;

    config
        .schedule
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("schedule: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn base_config() -> Config {
        load_config_from_str(
            r#"
[content]
categories = [{ name = "history", sub_categories = ["ancient-rome"] }]

[dispatcher]
url = "https://ci.example.com/dispatch"
token = "dispatch-token"

[publisher]
api_base = "https://media.example.com/api"
api_token = "media-token"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server.port = 0;
        assert!(matches!(
            validate_config(&config).unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_validate_empty_sub_categories_fails() {
        let mut config = base_config();
        config.content.categories[0].sub_categories.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_schedule_slot_fails() {
        let mut config = base_config();
        config.schedule.publish_primary = "5pm".to_string();
        assert!(validate_config(&config).is_err());
    }
}
