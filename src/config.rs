/*!
 * Binder Configuration
 * Environment-driven settings for the platform backend and bridge
 */

use crate::binding::linux::{DEFAULT_IW_PATH, DEFAULT_SYSFS_ROOT};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default bridge per-call timeout
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

const TRACE_JSON_VAR: &str = "WIFI_BIND_TRACE_JSON";

/// Runtime configuration
///
/// Environment variables:
/// - WIFI_BIND_SYSFS_ROOT: network class directory (default: /sys/class/net)
/// - WIFI_BIND_IW_PATH: `iw` executable (default: iw)
/// - WIFI_BIND_CALL_TIMEOUT_MS: bridge per-call timeout (default: 10000)
/// - WIFI_BIND_SIMULATION: force the simulation backend (default: false)
/// - WIFI_BIND_TRACE_JSON: JSON log output (default: false)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderConfig {
    pub sysfs_root: PathBuf,
    pub iw_path: PathBuf,
    pub call_timeout: Duration,
    pub force_simulation: bool,
    pub trace_json: bool,
}

impl BinderConfig {
    pub fn new() -> Self {
        Self {
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            iw_path: PathBuf::from(DEFAULT_IW_PATH),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            force_simulation: false,
            trace_json: false,
        }
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read only the log format flag
    ///
    /// Needed before the subscriber exists, so that warnings raised while
    /// parsing the rest of the configuration are not lost.
    pub fn trace_json_from_env() -> bool {
        flag(&|key: &str| std::env::var(key).ok(), TRACE_JSON_VAR)
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::new();
        Self {
            sysfs_root: lookup("WIFI_BIND_SYSFS_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.sysfs_root),
            iw_path: lookup("WIFI_BIND_IW_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.iw_path),
            call_timeout: millis(&lookup, "WIFI_BIND_CALL_TIMEOUT_MS")
                .unwrap_or(defaults.call_timeout),
            force_simulation: flag(&lookup, "WIFI_BIND_SIMULATION"),
            trace_json: flag(&lookup, TRACE_JSON_VAR),
        }
    }
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn millis<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Invalid duration, using default");
            None
        }
    }
}

fn flag<F>(lookup: &F, key: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BinderConfig::from_lookup(|_| None);
        assert_eq!(config, BinderConfig::default());
        assert_eq!(config.call_timeout, Duration::from_secs(10));
        assert_eq!(config.sysfs_root, PathBuf::from("/sys/class/net"));
    }

    #[test]
    fn test_overrides() {
        let config = BinderConfig::from_lookup(lookup_from(&[
            ("WIFI_BIND_SYSFS_ROOT", "/tmp/net"),
            ("WIFI_BIND_CALL_TIMEOUT_MS", "250"),
            ("WIFI_BIND_SIMULATION", "TRUE"),
            ("WIFI_BIND_TRACE_JSON", "1"),
        ]));
        assert_eq!(config.sysfs_root, PathBuf::from("/tmp/net"));
        assert_eq!(config.call_timeout, Duration::from_millis(250));
        assert!(config.force_simulation);
        assert!(config.trace_json);
    }

    #[test]
    fn test_throttle_is_not_a_setting() {
        let config = BinderConfig::from_lookup(lookup_from(&[("WIFI_BIND_THROTTLE_MS", "0")]));
        assert_eq!(config, BinderConfig::default());
    }

    #[test]
    #[serial_test::serial]
    fn test_trace_flag_read_without_parsing_rest() {
        std::env::set_var(TRACE_JSON_VAR, "true");
        std::env::set_var("WIFI_BIND_CALL_TIMEOUT_MS", "soon");
        let json = BinderConfig::trace_json_from_env();
        let config = BinderConfig::from_env();
        std::env::remove_var(TRACE_JSON_VAR);
        std::env::remove_var("WIFI_BIND_CALL_TIMEOUT_MS");

        assert!(json);
        assert!(config.trace_json);
        assert_eq!(config.call_timeout, DEFAULT_CALL_TIMEOUT);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = BinderConfig::from_lookup(lookup_from(&[
            ("WIFI_BIND_CALL_TIMEOUT_MS", "soon"),
            ("WIFI_BIND_SIMULATION", "yes"),
        ]));
        assert_eq!(config.call_timeout, DEFAULT_CALL_TIMEOUT);
        assert!(!config.force_simulation);
    }
}
