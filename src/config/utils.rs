use super::schemas::Config;
/// Configuration utilities - loading, reloading, and access helpers
///
/// - Loading configuration from disk (missing file = defaults)
/// - Applying command-line overrides
/// - Thread-safe access helpers
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::path::Path;

/// Global configuration instance
///
/// Starts out as `Config::default()` so readers never observe an
/// uninitialized state; `load_config` replaces it at startup.
static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "config.toml";

/// Resolve the config path (--config override or default)
pub fn config_path() -> String {
    crate::arguments::get_config_path_override().unwrap_or_else(|| CONFIG_FILE_PATH.to_string())
}

/// Load configuration from the resolved path, apply CLI overrides, validate,
/// and install it globally
pub fn load_config() -> Result<(), String> {
    let mut config = read_config_file(&config_path())?;
    apply_cli_overrides(&mut config);
    config.validate()?;
    set_config(config);
    Ok(())
}

/// Parse a TOML configuration file
///
/// A missing file yields defaults; an unreadable or invalid file is an error.
pub fn read_config_file(path: &str) -> Result<Config, String> {
    if !Path::new(path).exists() {
        eprintln!("Config file '{}' not found, using default values", path);
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;

    parse_config(&contents).map_err(|e| format!("Failed to parse config file '{}': {}", path, e))
}

pub fn parse_config(contents: &str) -> Result<Config, String> {
    toml::from_str::<Config>(contents).map_err(|e| e.to_string())
}

/// Apply --host / --port / --interval
pub fn apply_cli_overrides(config: &mut Config) {
    if let Some(host) = crate::arguments::get_host_override() {
        config.webserver.host = host;
    }
    if let Some(port) = crate::arguments::get_port_override() {
        config.webserver.port = port;
    }
    if let Some(interval) = crate::arguments::get_interval_override() {
        config.refresh.interval_secs = interval;
    }
}

/// Replace the global configuration
pub fn set_config(config: Config) {
    *CONFIG.write() = config;
}

/// Execute a function with read access to the configuration
///
/// # Example
/// ```
/// use yieldwatch::config::with_config;
///
/// let interval = with_config(|cfg| cfg.refresh.interval_secs);
/// ```
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    let config = CONFIG.read();
    f(&config)
}

/// Clone the whole configuration (for components that keep their own copy)
pub fn get_config_clone() -> Config {
    CONFIG.read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.upstream.url, "https://yields.llama.fi/pools");
        assert_eq!(config.refresh.interval_secs, 30);
        assert_eq!(config.query.default_count, 5);
        assert_eq!(config.named.protocols.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[upstream]"));
        assert!(toml_str.contains("[refresh]"));
        assert!(toml_str.contains("[[named.protocols]]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [refresh]
            interval_secs = 60

            [[named.protocols]]
            label = "Lido"
            project = "lido"
            "#,
        )
        .unwrap();

        assert_eq!(config.refresh.interval_secs, 60);
        assert!(config.refresh.enabled);
        assert_eq!(config.upstream.timeout_secs, 10);
        assert_eq!(config.named.protocols, vec![super::super::NamedProtocol::new("Lido", "lido")]);
    }

    #[test]
    fn test_validate_rejects_timeout_not_below_interval() {
        let mut config = Config::default();
        config.upstream.timeout_secs = 30;
        let err = config.validate().unwrap_err();
        assert!(err.contains("shorter than"));
    }

    #[test]
    fn test_validate_rejects_duplicate_labels() {
        let mut config = Config::default();
        config.named.protocols.push(super::super::NamedProtocol::new("Aave-V3", "aave-v2"));
        assert!(config.validate().unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_read_config_file_missing_uses_defaults() {
        let config = read_config_file("/nonexistent/yieldwatch.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_read_config_file_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[refresh\ninterval_secs = ").unwrap();
        let err = read_config_file(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.contains("Failed to parse"));
    }
}
