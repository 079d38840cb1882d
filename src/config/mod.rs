//! Configuration management for Axe Link
//!
//! Handles loading, parsing and validation of the YAML configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::protocol::constants::DEFAULT_MODEL;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub midi: MidiConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// MIDI port configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MidiConfig {
    pub input_port: String,
    pub output_port: String,
}

/// Axe-Fx device settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// MIDI channel the device listens on (1-16)
    #[serde(default = "default_channel")]
    pub channel: u8,
    /// Model byte assumed until the device reports its own
    #[serde(default = "default_model")]
    pub model: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            midi: MidiConfig::default(),
            device: DeviceConfig::default(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            input_port: "Axe-Fx".to_string(),
            output_port: "Axe-Fx".to_string(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            model: default_model(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        // Validate the loaded configuration
        config.validate()?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path).await
        } else {
            info!("Config file '{}' not found, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.midi.input_port.is_empty() {
            anyhow::bail!("MIDI input_port cannot be empty");
        }
        if self.midi.output_port.is_empty() {
            anyhow::bail!("MIDI output_port cannot be empty");
        }

        if self.device.channel == 0 || self.device.channel > 16 {
            anyhow::bail!(
                "Device has invalid MIDI channel {} (must be 1-16)",
                self.device.channel
            );
        }
        if self.device.model > 127 {
            anyhow::bail!("Device model {} is not a valid data byte (must be 0-127)", self.device.model);
        }

        if self.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be greater than 0");
        }

        Ok(())
    }
}

// Default value functions
fn default_channel() -> u8 { 1 }
fn default_model() -> u8 { DEFAULT_MODEL }
fn default_poll_interval() -> u64 { 2 }
