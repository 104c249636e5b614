//! TOML-based core configuration.
//!
//! Carries the ringing timing constants (tick period, sound delay, fade
//! durations) and the hold gesture constants. The defaults are the shipped
//! product values; changing one is a config edit, not a code change.
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Escalation engine timing and curve configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Seconds between haptic ticks.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: f64,
    /// Per-tick fraction of the remaining headroom added to intensity.
    #[serde(default = "default_intensity_gain")]
    pub intensity_gain: f32,
    /// Seconds of haptics-only escalation before audio joins in.
    #[serde(default = "default_sound_delay_secs")]
    pub sound_delay_secs: f64,
    /// Seconds over which audio fades in from silence.
    #[serde(default = "default_fade_in_secs")]
    pub fade_in_secs: f64,
    /// Seconds over which audio fades out after dismissal.
    #[serde(default = "default_fade_out_secs")]
    pub fade_out_secs: f64,
}

/// Hold-to-stop gesture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldConfig {
    /// Seconds of continuous hold required to confirm dismissal.
    #[serde(default = "default_hold_duration_secs")]
    pub duration_secs: f64,
    /// Seconds between progress steps.
    #[serde(default = "default_hold_step_secs")]
    pub step_secs: f64,
    /// Presentation settle delay between completion and stop.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: f64,
}

/// Core configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub escalation: EscalationConfig,
    #[serde(default)]
    pub hold: HoldConfig,
}

// Default functions
fn default_tick_secs() -> f64 {
    1.5
}
fn default_intensity_gain() -> f32 {
    0.22
}
fn default_sound_delay_secs() -> f64 {
    15.0
}
fn default_fade_in_secs() -> f64 {
    5.0
}
fn default_fade_out_secs() -> f64 {
    1.5
}
fn default_hold_duration_secs() -> f64 {
    5.0
}
fn default_hold_step_secs() -> f64 {
    0.01
}
fn default_settle_secs() -> f64 {
    0.2
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            intensity_gain: default_intensity_gain(),
            sound_delay_secs: default_sound_delay_secs(),
            fade_in_secs: default_fade_in_secs(),
            fade_out_secs: default_fade_out_secs(),
        }
    }
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_hold_duration_secs(),
            step_secs: default_hold_step_secs(),
            settle_secs: default_settle_secs(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|d| d.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from disk or return default, writing the default back so the
    /// file exists for editing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.escalation.tick_secs, 1.5);
        assert_eq!(parsed.hold.duration_secs, 5.0);
    }

    #[test]
    fn shipped_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.escalation.tick_secs, 1.5);
        assert_eq!(cfg.escalation.intensity_gain, 0.22);
        assert_eq!(cfg.escalation.sound_delay_secs, 15.0);
        assert_eq!(cfg.escalation.fade_in_secs, 5.0);
        assert_eq!(cfg.escalation.fade_out_secs, 1.5);
        assert_eq!(cfg.hold.duration_secs, 5.0);
        assert_eq!(cfg.hold.step_secs, 0.01);
        assert_eq!(cfg.hold.settle_secs, 0.2);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let parsed: Config = toml::from_str("[escalation]\nsound_delay_secs = 20.0\n").unwrap();
        assert_eq!(parsed.escalation.sound_delay_secs, 20.0);
        assert_eq!(parsed.escalation.tick_secs, 1.5);
        assert_eq!(parsed.hold.duration_secs, 5.0);
    }
}
