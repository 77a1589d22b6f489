//! Cut configuration.

use std::path::PathBuf;

use vmh_media::SilenceDetectionConfig;
use vmh_models::Distance;

/// Settings shared by every `vmh` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CutConfig {
    /// Silence detection parameters
    pub detection: SilenceDetectionConfig,
    /// Directory for cached detection results
    pub cache_dir: PathBuf,
    /// Skip the detection cache entirely
    pub no_cache: bool,
    /// Fail instead of picking the first of several matching chains
    pub strict: bool,
    /// Emit JSON logs
    pub json_logs: bool,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            detection: SilenceDetectionConfig::default(),
            cache_dir: std::env::temp_dir().join("vmh-cache"),
            no_cache: false,
            strict: false,
            json_logs: false,
        }
    }
}

impl CutConfig {
    /// Create config from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut detection = defaults.detection.clone();
        if let Some(secs) = env_parse::<f64>("VMH_MIN_SILENCE") {
            detection = detection.with_min_silence_secs(secs);
        }
        if let Some(db) = env_parse::<i32>("VMH_THRESHOLD_DB") {
            detection = detection.with_threshold_db(db);
        }
        if let Some(distance) = env_parse::<Distance>("VMH_DISTANCE") {
            detection = detection.with_distance(distance);
        }
        if let Some(secs) = env_parse::<u64>("VMH_DETECT_TIMEOUT") {
            detection.timeout_secs = secs;
        }

        Self {
            detection,
            cache_dir: std::env::var("VMH_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            no_cache: env_flag("VMH_NO_CACHE").unwrap_or(defaults.no_cache),
            strict: env_flag("VMH_STRICT").unwrap_or(defaults.strict),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(defaults.json_logs),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CutConfig::default();
        assert_eq!(config.detection, SilenceDetectionConfig::default());
        assert!(!config.strict);
        assert!(!config.no_cache);
        assert!(config.cache_dir.ends_with("vmh-cache"));
    }

    // Only variables no other test reads are touched here.
    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("VMH_MIN_SILENCE", "0.8");
        std::env::set_var("VMH_THRESHOLD_DB", "-42");
        std::env::set_var("VMH_DISTANCE", "large");
        std::env::set_var("VMH_STRICT", "true");
        std::env::set_var("VMH_NO_CACHE", "0");
        std::env::set_var("VMH_CACHE_DIR", "/var/cache/vmh");

        let config = CutConfig::from_env();
        assert!((config.detection.min_silence_secs - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.detection.threshold_db, -42);
        assert_eq!(config.detection.distance, Distance::Large);
        assert!(config.strict);
        assert!(!config.no_cache);
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/vmh"));

        std::env::set_var("VMH_DISTANCE", "enormous");
        assert_eq!(CutConfig::from_env().detection.distance, Distance::Tiny);

        for key in [
            "VMH_MIN_SILENCE",
            "VMH_THRESHOLD_DB",
            "VMH_DISTANCE",
            "VMH_STRICT",
            "VMH_NO_CACHE",
            "VMH_CACHE_DIR",
        ] {
            std::env::remove_var(key);
        }
    }
}
