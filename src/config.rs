use crate::capture::CaptureSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Folder selected at startup; can be changed with `:folder`
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default = "default_fallback_dir")]
    pub fallback_dir: PathBuf,

    #[serde(default = "default_clip_extension")]
    pub clip_extension: String,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    #[serde(default = "default_input_format")]
    pub input_format: String,

    #[serde(default = "default_input_device")]
    pub input_device: String,

    #[serde(default)]
    pub video_size: Option<String>,

    #[serde(default = "default_framerate")]
    pub framerate: u32,

    #[serde(default = "default_audio_feedback")]
    pub audio_feedback: bool,

    #[serde(default = "default_start_sound")]
    pub start_sound_path: String,

    #[serde(default = "default_stop_sound")]
    pub stop_sound_path: String,

    #[serde(default = "default_error_sound")]
    pub error_sound_path: String,

    #[serde(default)]
    pub on_saved_hook: Option<String>,
}

fn default_fallback_dir() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join("Downloads"),
        Err(_) => std::env::temp_dir().join("shiprec"),
    }
}

fn default_clip_extension() -> String {
    "mp4".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_input_format() -> String {
    "v4l2".to_string()
}

fn default_input_device() -> String {
    "/dev/video0".to_string()
}

fn default_framerate() -> u32 {
    30
}

fn default_audio_feedback() -> bool {
    true
}

fn default_start_sound() -> String {
    "ping-up.opus".to_string()
}

fn default_stop_sound() -> String {
    "ping-down.opus".to_string()
}

fn default_error_sound() -> String {
    "buzz.opus".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            fallback_dir: default_fallback_dir(),
            clip_extension: default_clip_extension(),
            ffmpeg_path: default_ffmpeg_path(),
            input_format: default_input_format(),
            input_device: default_input_device(),
            video_size: None,
            framerate: default_framerate(),
            audio_feedback: default_audio_feedback(),
            start_sound_path: default_start_sound(),
            stop_sound_path: default_stop_sound(),
            error_sound_path: default_error_sound(),
            on_saved_hook: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.config/shiprec/config.json)
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!(
                "Config file not found at {:?}, creating default config",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        tracing::info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        tracing::info!("Saved config to {:?}", config_path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(dir)
        } else {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            PathBuf::from(home).join(".config")
        };

        Ok(config_dir.join("shiprec").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.ffmpeg_path.is_empty() {
            return Err(anyhow::anyhow!("ffmpeg_path cannot be empty"));
        }

        if self.clip_extension.is_empty() || self.clip_extension.contains(['.', '/']) {
            return Err(anyhow::anyhow!(
                "clip_extension must be a bare extension such as \"mp4\""
            ));
        }

        if self.framerate == 0 {
            return Err(anyhow::anyhow!("framerate must be greater than zero"));
        }

        Ok(())
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            ffmpeg_path: self.ffmpeg_path.clone(),
            input_format: self.input_format.clone(),
            input_device: self.input_device.clone(),
            video_size: self.video_size.clone(),
            framerate: self.framerate,
            extension: self.clip_extension.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = Config::from_json(r#"{ "output_dir": "/srv/shipments" }"#).unwrap();

        assert_eq!(config.output_dir, Some(PathBuf::from("/srv/shipments")));
        assert_eq!(config.clip_extension, "mp4");
        assert_eq!(config.framerate, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            clip_extension: ".mp4".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            framerate: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            ffmpeg_path: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
