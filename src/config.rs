use crate::defaults;
use crate::error::{RepcountError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub estimator: EstimatorConfig,
    pub output: OutputConfig,
}

/// Frame capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera index, video file, stream URL or image directory
    pub source: String,
    pub width: u32,
    pub height: u32,
    /// Pause after each emitted record
    pub delay_ms: u64,
}

/// Pose estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Helper program and its arguments; empty means no estimator
    pub command: Vec<String>,
    /// Landmarks below this visibility are ignored by the metrics
    pub min_visibility: f32,
}

/// Record output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub jpeg_quality: u8,
    pub draw_landmarks: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: defaults::DEFAULT_SOURCE.to_string(),
            width: defaults::FRAME_WIDTH,
            height: defaults::FRAME_HEIGHT,
            delay_ms: defaults::PACE_DELAY_MS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: defaults::JPEG_QUALITY,
            draw_landmarks: false,
        }
    }
}

impl CaptureConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values. A missing file is
    /// [`RepcountError::ConfigFileNotFound`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RepcountError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                RepcountError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(RepcountError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - REPCOUNT_SOURCE → capture.source
    /// - REPCOUNT_ESTIMATOR → estimator.command (split on whitespace)
    /// - REPCOUNT_DELAY_MS → capture.delay_ms
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(source) = std::env::var("REPCOUNT_SOURCE")
            && !source.is_empty()
        {
            self.capture.source = source;
        }

        if let Ok(command) = std::env::var("REPCOUNT_ESTIMATOR")
            && !command.trim().is_empty()
        {
            self.estimator.command = command.split_whitespace().map(str::to_string).collect();
        }

        if let Ok(delay) = std::env::var("REPCOUNT_DELAY_MS")
            && !delay.is_empty()
        {
            self.capture.delay_ms =
                delay
                    .trim()
                    .parse()
                    .map_err(|_| RepcountError::ConfigInvalidValue {
                        key: "REPCOUNT_DELAY_MS".to_string(),
                        message: format!("expected milliseconds, got {:?}", delay),
                    })?;
        }

        Ok(self)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capture.width == 0 {
            return Err(invalid("capture.width", "must be greater than 0"));
        }
        if self.capture.height == 0 {
            return Err(invalid("capture.height", "must be greater than 0"));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(invalid("output.jpeg_quality", "must be between 1 and 100"));
        }
        if !(0.0..=1.0).contains(&self.estimator.min_visibility) {
            return Err(invalid(
                "estimator.min_visibility",
                "must be between 0.0 and 1.0",
            ));
        }
        Ok(())
    }

    /// Render as TOML, for `config show`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RepcountError::Other(e.to_string()))
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/repcount/config.toml on Linux
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| RepcountError::Other("could not determine config directory".into()))?;
        Ok(dir.join("repcount").join("config.toml"))
    }
}

fn invalid(key: &str, message: &str) -> RepcountError {
    RepcountError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_repcount_env() {
        remove_env("REPCOUNT_SOURCE");
        remove_env("REPCOUNT_ESTIMATOR");
        remove_env("REPCOUNT_DELAY_MS");
    }

    fn write_temp(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.capture.source, "0");
        assert_eq!(config.capture.width, 640);
        assert_eq!(config.capture.height, 480);
        assert_eq!(config.capture.delay(), Duration::from_millis(50));

        assert!(config.estimator.command.is_empty());
        assert_eq!(config.estimator.min_visibility, 0.0);

        assert_eq!(config.output.jpeg_quality, 90);
        assert!(!config.output.draw_landmarks);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_file = write_temp(
            r#"
            [capture]
            source = "/videos/squats.mp4"
            width = 1280
            height = 720
            delay_ms = 100

            [estimator]
            command = ["python3", "pose_sidecar.py", "--model", "full"]
            min_visibility = 0.5

            [output]
            jpeg_quality = 75
            draw_landmarks = true
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.capture.source, "/videos/squats.mp4");
        assert_eq!(config.capture.width, 1280);
        assert_eq!(config.capture.height, 720);
        assert_eq!(config.capture.delay_ms, 100);
        assert_eq!(
            config.estimator.command,
            vec!["python3", "pose_sidecar.py", "--model", "full"]
        );
        assert_eq!(config.estimator.min_visibility, 0.5);
        assert_eq!(config.output.jpeg_quality, 75);
        assert!(config.output.draw_landmarks);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let temp_file = write_temp(
            r#"
            [output]
            jpeg_quality = 60
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.output.jpeg_quality, 60);
        assert!(!config.output.draw_landmarks);
        assert_eq!(config.capture, CaptureConfig::default());
        assert_eq!(config.estimator, EstimatorConfig::default());
    }

    #[test]
    fn test_env_override_source() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_repcount_env();

        set_env("REPCOUNT_SOURCE", "2");
        let config = Config::default().with_env_overrides().unwrap();

        assert_eq!(config.capture.source, "2");
        assert_eq!(config.capture.delay_ms, 50); // Not overridden

        clear_repcount_env();
    }

    #[test]
    fn test_env_override_estimator_splits_words() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_repcount_env();

        set_env("REPCOUNT_ESTIMATOR", "python3  sidecar.py --lite");
        let config = Config::default().with_env_overrides().unwrap();

        assert_eq!(
            config.estimator.command,
            vec!["python3", "sidecar.py", "--lite"]
        );

        clear_repcount_env();
    }

    #[test]
    fn test_env_override_delay() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_repcount_env();

        set_env("REPCOUNT_DELAY_MS", "100");
        let config = Config::default().with_env_overrides().unwrap();
        assert_eq!(config.capture.delay(), Duration::from_millis(100));

        set_env("REPCOUNT_DELAY_MS", "fast");
        let result = Config::default().with_env_overrides();
        assert!(matches!(
            result,
            Err(RepcountError::ConfigInvalidValue { .. })
        ));

        clear_repcount_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_repcount_env();

        set_env("REPCOUNT_SOURCE", "");
        set_env("REPCOUNT_ESTIMATOR", "   ");
        let config = Config::default().with_env_overrides().unwrap();

        assert_eq!(config, Config::default());

        clear_repcount_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let temp_file = write_temp(
            r#"
            [capture
            source = "broken
        "#,
        );

        let result = Config::load(temp_file.path());

        assert!(matches!(result, Err(RepcountError::Config(_))));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let temp_file = write_temp(
            r#"
            [output]
            jpeg_quality = "high"
        "#,
        );
        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.capture.width = 0;
        assert!(matches!(
            config.validate(),
            Err(RepcountError::ConfigInvalidValue { key, .. }) if key == "capture.width"
        ));

        let mut config = Config::default();
        config.output.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.jpeg_quality = 101;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.estimator.min_visibility = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_toml_round_trips_through_load() {
        let mut config = Config::default();
        config.estimator.command = vec!["pose-helper".to_string()];
        config.output.draw_landmarks = true;

        let temp_file = write_temp(&config.to_toml().unwrap());
        assert_eq!(Config::load(temp_file.path()).unwrap(), config);
    }

    #[test]
    fn test_default_path_is_xdg_compliant() {
        let path = Config::default_path().unwrap();
        let path_str = path.to_string_lossy();

        assert!(path_str.contains("repcount"));
        assert!(path_str.ends_with("config.toml"));
    }

    #[test]
    fn test_load_missing_file_is_not_found_error() {
        let missing_path = Path::new("/tmp/nonexistent_repcount_config_12345.toml");
        assert!(matches!(
            Config::load(missing_path),
            Err(RepcountError::ConfigFileNotFound { .. })
        ));
        assert_eq!(
            Config::load_or_default(missing_path).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn test_load_or_default_errors_on_invalid_toml() {
        let temp_file = write_temp("[capture\nsource = \"broken\n");
        assert!(Config::load_or_default(temp_file.path()).is_err());
    }
}
