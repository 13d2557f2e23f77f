//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client runs with no configuration.

use std::time::Duration;

use veilmatch_shared::constants::{ERROR_DISMISS_MS, SUCCESS_DISMISS_MS};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Fetch record payloads concurrently during a load instead of one
    /// after another.
    /// Env: `VEILMATCH_PARALLEL_FETCH` (true/false)
    /// Default: `false`
    pub parallel_fetch: bool,

    /// How long a success status stays visible.
    /// Env: `VEILMATCH_SUCCESS_DISMISS_MS`
    /// Default: `2000`
    pub success_dismiss: Duration,

    /// How long an error status stays visible.
    /// Env: `VEILMATCH_ERROR_DISMISS_MS`
    /// Default: `3000`
    pub error_dismiss: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            parallel_fetch: false,
            success_dismiss: Duration::from_millis(SUCCESS_DISMISS_MS),
            error_dismiss: Duration::from_millis(ERROR_DISMISS_MS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("VEILMATCH_PARALLEL_FETCH") {
            config.parallel_fetch = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("VEILMATCH_SUCCESS_DISMISS_MS") {
            match parse_millis(&val) {
                Some(d) => config.success_dismiss = d,
                None => tracing::warn!(
                    value = %val,
                    "Invalid VEILMATCH_SUCCESS_DISMISS_MS, using default"
                ),
            }
        }

        if let Ok(val) = std::env::var("VEILMATCH_ERROR_DISMISS_MS") {
            match parse_millis(&val) {
                Some(d) => config.error_dismiss = d,
                None => tracing::warn!(
                    value = %val,
                    "Invalid VEILMATCH_ERROR_DISMISS_MS, using default"
                ),
            }
        }

        config
    }
}

fn parse_flag(val: &str) -> bool {
    let val = val.trim();
    val != "false" && val != "0" && !val.is_empty()
}

fn parse_millis(val: &str) -> Option<Duration> {
    val.trim().parse::<u64>().ok().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(!config.parallel_fetch);
        assert_eq!(config.success_dismiss, Duration::from_secs(2));
        assert_eq!(config.error_dismiss, Duration::from_secs(3));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(parse_millis(" 250 "), Some(Duration::from_millis(250)));
        assert_eq!(parse_millis("soon"), None);
    }
}
