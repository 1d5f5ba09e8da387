//! Configuration management for recap-audio

use crate::{audio::PcmFormat, effects::EffectsConfig, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// PCM contract with the narration collaborator
    #[serde(default)]
    pub input: PcmFormat,
    /// Speed and mastering
    #[serde(default)]
    pub effects: EffectsConfig,
    /// Fit-to-duration settings
    #[serde(default)]
    pub sync: SyncConfig,
    /// Artifact naming and selection
    #[serde(default)]
    pub output: OutputConfig,
}

/// Stretch the narration to a known length instead of a fixed speed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Target duration in seconds (e.g. the video being narrated)
    pub target_duration: Option<f64>,
}

/// Output artifact settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Title used to derive download filenames
    pub title: String,
    /// Emit an SRT next to the WAV
    pub subtitles: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            title: crate::pipeline::DEFAULT_TITLE.into(),
            subtitles: true,
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Create default configuration and save to file
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.input.sample_rate == 0 {
            return Err(Error::Config("Sample rate must be > 0".into()));
        }
        if self.input.channels == 0 {
            return Err(Error::Config("Channel count must be > 0".into()));
        }
        if u16::try_from(self.input.channels).is_err() {
            return Err(Error::Config("Channel count must fit in 16 bits".into()));
        }

        if !self.effects.speed.is_finite() || self.effects.speed <= 0.0 {
            return Err(Error::Config("Speed must be > 0".into()));
        }

        if let Some(target) = self.sync.target_duration {
            if !target.is_finite() || target <= 0.0 {
                return Err(Error::Config("Sync target duration must be > 0".into()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.input.sample_rate, 24000);
        assert_eq!(cfg.input.channels, 1);
        assert_eq!(cfg.effects.speed, 1.05);
        assert!(cfg.effects.mastering_enabled);
        assert!(cfg.sync.target_duration.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut cfg = Config::default();
        cfg.effects.speed = 1.3;
        cfg.sync.target_duration = Some(95.0);
        cfg.output.title = "Night Train".into();
        cfg.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), cfg);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "effects": { "speed": 0.9, "mastering_enabled": false } }"#).unwrap();

        let cfg = Config::load_json(&path).unwrap();
        assert_eq!(cfg.effects, EffectsConfig::new(0.9, false));
        assert_eq!(cfg.input, PcmFormat::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.effects.speed = 0.0;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));

        let mut cfg = Config::default();
        cfg.input.channels = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.sync.target_duration = Some(-4.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/recap.yaml"),
            Err(Error::FileNotFound(_))
        ));
    }
}
