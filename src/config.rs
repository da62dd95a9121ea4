// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// File configuration for the standalone host, plus the library-facing
// `BridgeConfig` derived from it. Every field has a default, and a missing
// file means "all defaults".

use anyhow::{Context, Result};
use serde::Deserialize;
use skia_safe::Color;
use std::path::Path;

use crate::canvas::CanvasSpec;
use crate::locator::{search::default_traverse_prefixes, LocatorConfig, DEFAULT_STEP_BUDGET};

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub bridge: BridgeSection,
    pub debug: DebugConfig,
    pub logging: LoggingConfig,
    pub run: RunConfig,
}

/// Offscreen canvas settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// RGBA, 0-255
    pub background: [u8; 4],
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 256,
            background: [24, 26, 33, 255],
        }
    }
}

/// GPU bridging settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeSection {
    /// Set to false to skip GPU bridging entirely
    pub prefer_gpu: bool,
    pub step_budget: usize,
    pub traverse_prefixes: Vec<String>,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            prefer_gpu: true,
            step_budget: DEFAULT_STEP_BUDGET,
            traverse_prefixes: default_traverse_prefixes(),
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
}

/// Logging settings (RUST_LOG wins when set)
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Standalone run loop settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub frames: u32,
    /// Seconds per simulated frame
    pub frame_delta: f64,
    /// Log a status line every N frames (0 = never)
    pub report_every: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 300,
            frame_delta: 1.0 / 60.0,
            report_every: 60,
        }
    }
}

/// What the bridge itself needs to start.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub spec: CanvasSpec,
    pub background: Color,
    pub prefer_gpu: bool,
    pub locator: LocatorConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Config::default().bridge_config()
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_or_default("config.toml")
    }

    /// Load from `path`, logging and falling back to defaults on error
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::load_from_path(path).unwrap_or_else(|e| {
            log::warn!("Failed to load {:?}: {:#}. Using defaults.", path, e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let max = i32::MAX as u32;
        if self.canvas.width == 0 || self.canvas.height == 0 || self.canvas.width > max || self.canvas.height > max {
            anyhow::bail!(
                "canvas size {}x{} is out of range",
                self.canvas.width,
                self.canvas.height
            );
        }
        if !(self.run.frame_delta.is_finite() && self.run.frame_delta >= 0.0) {
            anyhow::bail!("run.frame_delta must be a non-negative number");
        }
        Ok(())
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        let [r, g, b, a] = self.canvas.background;
        BridgeConfig {
            spec: CanvasSpec::new(self.canvas.width as i32, self.canvas.height as i32),
            background: Color::from_argb(a, r, g, b),
            prefer_gpu: self.bridge.prefer_gpu,
            locator: LocatorConfig {
                step_budget: self.bridge.step_budget,
                traverse_prefixes: self.bridge.traverse_prefixes.clone(),
            },
        }
    }
}
