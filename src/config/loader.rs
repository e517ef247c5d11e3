//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles YAML file discovery,
//! environment detection, and merging of environment-specific overrides.

use super::error::{ConfigResult, ConfigurationError};
use super::HostUpdateConfig;
use serde_yaml::Value as YamlValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_NAMES: [&str; 2] = ["hostupdate-config.yaml", "hostupdate-config.yml"];
const ENVIRONMENT_SECTIONS: [&str; 3] = ["development", "test", "production"];
const MAX_CONFIG_FILE_BYTES: u64 = 1024 * 1024;

/// Loaded configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: HostUpdateConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load from `config_dir` (or `$HOSTUPDATE_CONFIG_DIR`, or `config/`) for the
    /// environment named by `HOSTUPDATE_ENV`/`APP_ENV`
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Tests use this to avoid touching process environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        info!(
            environment = %environment,
            task_name = %config.runner.task_name,
            start_timeout_ms = config.runner.start_timeout_ms,
            poll_interval_ms = config.runner.poll_interval_ms,
            completion_timeout_ms = ?config.runner.completion_timeout_ms,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &HostUpdateConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect the active environment from environment variables
    fn detect_environment() -> String {
        crate::logging::get_environment()
    }

    fn default_config_directory() -> PathBuf {
        std::env::var("HOSTUPDATE_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    /// Read the file, refusing anything that is not a small regular file
    fn read_config_file_safely(path: &Path) -> ConfigResult<String> {
        let metadata =
            std::fs::metadata(path).map_err(|e| ConfigurationError::unreadable(path, e))?;

        if !metadata.is_file() {
            return Err(ConfigurationError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        if metadata.len() > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigurationError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: MAX_CONFIG_FILE_BYTES,
            });
        }

        std::fs::read_to_string(path).map_err(|e| ConfigurationError::unreadable(path, e))
    }

    /// First candidate name present in the directory
    fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let searched: Vec<PathBuf> = CONFIG_FILE_NAMES
            .iter()
            .map(|name| config_directory.join(name))
            .collect();

        match searched.iter().find(|path| path.exists()) {
            Some(found) => {
                debug!(path = %found.display(), "Found configuration file");
                Ok(found.clone())
            }
            None => Err(ConfigurationError::NotFound { searched }),
        }
    }

    /// Load and merge configuration with environment-specific overrides
    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<HostUpdateConfig> {
        let config_file = Self::find_config_file(config_directory)?;
        let yaml_content = Self::read_config_file_safely(&config_file)?;

        let mut yaml_data: YamlValue = serde_yaml::from_str(&yaml_content)
            .map_err(|e| ConfigurationError::invalid_yaml(&config_file, e))?;

        // An empty file is a valid all-defaults configuration
        if yaml_data.is_null() {
            yaml_data = YamlValue::Mapping(Default::default());
        }

        if let Some(env_overrides) = yaml_data
            .get(YamlValue::String(environment.to_string()))
            .cloned()
        {
            debug!("Applying environment-specific overrides for: {}", environment);
            Self::merge_yaml_values(&mut yaml_data, env_overrides);
        }

        if let YamlValue::Mapping(ref mut map) = yaml_data {
            for section in ENVIRONMENT_SECTIONS {
                map.remove(YamlValue::String(section.to_string()));
            }
        }

        let mut config: HostUpdateConfig = serde_yaml::from_value(yaml_data).map_err(|e| {
            ConfigurationError::invalid_yaml(&config_file, format!("unexpected shape: {e}"))
        })?;

        config.environment = environment.to_string();

        Ok(config)
    }

    /// Recursively merge YAML values (environment overrides into base config)
    fn merge_yaml_values(base: &mut YamlValue, override_value: YamlValue) {
        match (&mut *base, override_value) {
            (YamlValue::Mapping(base_map), YamlValue::Mapping(override_map)) => {
                for (key, value) in override_map {
                    if let Some(existing_value) = base_map.get_mut(&key) {
                        Self::merge_yaml_values(existing_value, value);
                    } else {
                        base_map.insert(key, value);
                    }
                }
            }
            (base_ref, override_val) => {
                *base_ref = override_val;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_config_yaml() -> &'static str {
        r#"
runner:
  task_name: "hostupdate"
  start_timeout_ms: 5000
  poll_interval_ms: 100

orchestrator:
  default_category: "CriticalUpdates"

logging:
  log_directory: "log"

test:
  runner:
    start_timeout_ms: 500
    poll_interval_ms: 10
  logging:
    level: "debug"

production:
  runner:
    task_name: "hostupdate-prod"
    completion_timeout_ms: 3600000
  orchestrator:
    default_category: "SecurityUpdates"
"#
    }

    fn setup_test_config_dir() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().to_path_buf();
        fs::write(
            config_dir.join("hostupdate-config.yaml"),
            create_test_config_yaml(),
        )
        .unwrap();

        (temp_dir, config_dir)
    }

    #[test]
    fn test_config_file_discovery() {
        let (_temp_dir, config_dir) = setup_test_config_dir();

        let config_file = ConfigManager::find_config_file(&config_dir).unwrap();
        assert!(config_file.exists());
        assert_eq!(config_file.file_name().unwrap(), "hostupdate-config.yaml");
    }

    #[test]
    fn test_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();

        let result = ConfigManager::find_config_file(temp_dir.path());
        match result {
            Err(ConfigurationError::NotFound { searched }) => assert_eq!(searched.len(), 2),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_environment_specific_overrides() {
        let (_temp_dir, config_dir) = setup_test_config_dir();

        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir.clone()), "test").unwrap();
        let config = manager.config();
        assert_eq!(manager.environment(), "test");
        assert_eq!(config.environment, "test");
        assert_eq!(config.runner.start_timeout(), Duration::from_millis(500));
        assert_eq!(config.runner.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.runner.task_name, "hostupdate");
        assert_eq!(config.logging.level.as_deref(), Some("debug"));

        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir.clone()), "production")
                .unwrap();
        let config = manager.config();
        assert_eq!(config.runner.task_name, "hostupdate-prod");
        assert_eq!(
            config.runner.completion_timeout(),
            Some(Duration::from_secs(3600))
        );
        assert_eq!(config.runner.start_timeout_ms, 5000);
        assert_eq!(config.orchestrator.default_category, "SecurityUpdates");

        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir), "development").unwrap();
        assert!(manager.config().runner.completion_timeout().is_none());
        assert!(manager.config().logging.level.is_none());
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("hostupdate-config.yml"),
            "runner: [unclosed",
        )
        .unwrap();

        let result = ConfigManager::load_from_directory_with_env(
            Some(temp_dir.path().to_path_buf()),
            "test",
        );
        assert!(matches!(result, Err(ConfigurationError::InvalidYaml { .. })));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("hostupdate-config.yaml"),
            "runner:\n  start_timeout_ms: 0\n",
        )
        .unwrap();

        let result = ConfigManager::load_from_directory_with_env(
            Some(temp_dir.path().to_path_buf()),
            "test",
        );
        assert!(matches!(result, Err(ConfigurationError::InvalidValue { .. })));
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("hostupdate-config.yaml"), "").unwrap();

        let manager = ConfigManager::load_from_directory_with_env(
            Some(temp_dir.path().to_path_buf()),
            "development",
        )
        .unwrap();
        assert_eq!(manager.config().runner.start_timeout_ms, 5000);
    }

    #[test]
    fn test_yaml_merge_replaces_scalars_and_keeps_siblings() {
        let mut base: YamlValue = serde_yaml::from_str("a:\n  b: 1\n  c: 2\n").unwrap();
        let overrides: YamlValue = serde_yaml::from_str("a:\n  b: 5\n").unwrap();
        ConfigManager::merge_yaml_values(&mut base, overrides);

        assert_eq!(base["a"]["b"], YamlValue::from(5));
        assert_eq!(base["a"]["c"], YamlValue::from(2));
    }
}
