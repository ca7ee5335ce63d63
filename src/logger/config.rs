/// Logger configuration derived from command-line flags
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Most detailed level that may be printed
    pub min_level: LogLevel,
    /// Tags with --debug-<tag> enabled
    pub debug_tags: HashSet<String>,
    /// Tags with --verbose-<tag> enabled
    pub verbose_tags: HashSet<String>,
    /// If non-empty, only these tags print at INFO/WARNING
    pub enabled_tags: HashSet<String>,
    /// Mirror console output to the log file
    pub file_logging: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Debug,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
            file_logging: true,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Build the logger configuration from the global argument list
pub fn init_from_args() {
    let args = crate::arguments::get_cmd_args();
    set_logger_config(config_from_args(&args));
}

pub(crate) fn config_from_args(args: &[String]) -> LoggerConfig {
    let mut config = LoggerConfig::default();

    for arg in args {
        if arg == "--verbose" {
            config.min_level = LogLevel::Verbose;
        } else if arg == "--quiet" {
            config.min_level = LogLevel::Warning;
        } else if arg == "--no-file-log" {
            config.file_logging = false;
        } else if let Some(key) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(key.to_lowercase());
        } else if let Some(key) = arg.strip_prefix("--verbose-") {
            config.verbose_tags.insert(key.to_lowercase());
        } else if let Some(level) = arg.strip_prefix("--log-level=") {
            if let Some(level) = LogLevel::parse(level) {
                config.min_level = level;
            }
        } else if let Some(list) = arg.strip_prefix("--log-tags=") {
            config.enabled_tags.extend(
                list.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty()),
            );
        }
    }

    config
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = LOGGER_CONFIG.read();
    config.debug_tags.contains("all") || config.debug_tags.contains(&tag.to_debug_key())
}

pub fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG.read().verbose_tags.contains(&tag.to_debug_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_debug_flags_collected() {
        let config = config_from_args(&args(&["yieldwatch", "--debug-refresh", "--debug-API"]));
        assert!(config.debug_tags.contains("refresh"));
        assert!(config.debug_tags.contains("api"));
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.file_logging);
    }

    #[test]
    fn test_verbose_and_file_flags() {
        let config = config_from_args(&args(&["yieldwatch", "--verbose", "--no-file-log"]));
        assert_eq!(config.min_level, LogLevel::Verbose);
        assert!(!config.file_logging);
    }

    #[test]
    fn test_log_level_flag() {
        let config = config_from_args(&args(&["yieldwatch", "--log-level=warn"]));
        assert_eq!(config.min_level, LogLevel::Warning);

        let config = config_from_args(&args(&["yieldwatch", "--log-level=chatty"]));
        assert_eq!(config.min_level, LogLevel::Debug);
    }

    #[test]
    fn test_log_tags_filter() {
        let config = config_from_args(&args(&["yieldwatch", "--log-tags=pools, refresh,"]));
        assert_eq!(config.enabled_tags.len(), 2);
        assert!(config.enabled_tags.contains("pools"));
    }
}
