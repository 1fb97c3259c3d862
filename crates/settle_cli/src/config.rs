//! Settle configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use settle_spring::{SpringConfig, SpringSettler, DEFAULT_FRAME_RATE, DEFAULT_REST_THRESHOLD};
use std::fmt::Debug;
use std::fs;
use std::hash::Hash;
use std::path::Path;

pub const CONFIG_FILE: &str = "settle.toml";

/// Top-level Settle configuration (settle.toml)
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct SettleConfig {
    #[serde(default)]
    pub spring: SpringSection,
    #[serde(default)]
    pub timing: TimingSection,
    #[serde(default)]
    pub rest: RestSection,
    #[serde(default = "default_layers")]
    pub layers: Vec<LayerConfig>,
}

/// Named starting points for the spring constants
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Parallax,
    Gentle,
    Snappy,
    Bouncy,
}

impl Preset {
    fn spring(self) -> SpringConfig {
        match self {
            Preset::Parallax => SpringConfig::parallax(),
            Preset::Gentle => SpringConfig::gentle(),
            Preset::Snappy => SpringConfig::snappy(),
            Preset::Bouncy => SpringConfig::bouncy(),
        }
    }
}

/// Spring constants. Explicit fields override the preset.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SpringSection {
    #[serde(default)]
    pub preset: Preset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f32>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct TimingSection {
    /// Frame rate the spring constants are tuned for
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
}

fn default_frame_rate() -> f32 {
    DEFAULT_FRAME_RATE
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct RestSection {
    #[serde(default = "default_rest")]
    pub displacement: f32,
    #[serde(default = "default_rest")]
    pub velocity: f32,
}

fn default_rest() -> f32 {
    DEFAULT_REST_THRESHOLD
}

impl Default for RestSection {
    fn default() -> Self {
        Self {
            displacement: default_rest(),
            velocity: default_rest(),
        }
    }
}

/// One parallax layer: scrolls at `speed` times the page scroll
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LayerConfig {
    pub name: String,
    pub speed: f32,
}

fn default_layers() -> Vec<LayerConfig> {
    [("background", 0.2), ("midground", 0.5), ("foreground", 0.8)]
        .into_iter()
        .map(|(name, speed)| LayerConfig {
            name: name.to_string(),
            speed,
        })
        .collect()
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SettleConfig {
    /// Load configuration from a file or a directory containing settle.toml.
    ///
    /// A missing file falls back to defaults unless `required` is set.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            if required {
                anyhow::bail!(
                    "No config found at {}. Run `settle init` to create one.",
                    config_path.display()
                );
            }
            tracing::debug!("No {} found, using defaults", config_path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SettleConfig = toml::from_str(content)?;
        config.spring_config()?;
        Ok(config)
    }

    pub fn new() -> Self {
        Self {
            spring: SpringSection::default(),
            timing: TimingSection::default(),
            rest: RestSection::default(),
            layers: default_layers(),
        }
    }

    /// Resolve preset, overrides and rest thresholds into a validated config.
    pub fn spring_config(&self) -> Result<SpringConfig> {
        let base = self.spring.preset.spring();
        let config = SpringConfig {
            stiffness: self.spring.stiffness.unwrap_or(base.stiffness),
            damping: self.spring.damping.unwrap_or(base.damping),
            mass: self.spring.mass.unwrap_or(base.mass),
            ..base
        }
        .with_rest_thresholds(self.rest.displacement, self.rest.velocity);

        config.validate().context("Invalid [spring] or [rest] section")?;
        Ok(config)
    }

    /// Build an empty settler from this configuration.
    pub fn settler<K: Hash + Eq + Debug>(&self) -> Result<SpringSettler<K>> {
        let settler = SpringSettler::with_config(self.spring_config()?)
            .context("Invalid [spring] or [rest] section")?
            .frame_rate(self.timing.frame_rate)
            .context("Invalid [timing] section")?;
        Ok(settler)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
