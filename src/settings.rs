use crate::sketch::model::Position;
use crate::sketch::palette::DEFAULT_SWATCHES;
use crate::sketch::session::{SessionConfig, DEFAULT_ANCHOR};
use crate::sketch::surface::{DEFAULT_ERASER_SIZE, DEFAULT_STROKE_WIDTH};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.json";
/// Environment variable that overrides `api_url`.
pub const API_URL_ENV: &str = "SKETCH_CALC_API_URL";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Base address of the recognition service; requests go to
    /// `{api_url}/calculate`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives log output in addition to stdout.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    /// Side of the square cleared by the eraser, in pixels.
    #[serde(default = "default_eraser_size")]
    pub eraser_size: u32,
    #[serde(default = "default_swatches")]
    pub swatches: Vec<String>,
    /// Where results are placed when the submitted drawing has no ink.
    #[serde(default = "default_anchor")]
    pub default_anchor: (f32, f32),
    #[serde(default = "default_window_size")]
    pub window_size: (f32, f32),
}

fn default_api_url() -> String {
    "http://localhost:8900".into()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

fn default_stroke_width() -> u32 {
    DEFAULT_STROKE_WIDTH
}

fn default_eraser_size() -> u32 {
    DEFAULT_ERASER_SIZE
}

fn default_swatches() -> Vec<String> {
    DEFAULT_SWATCHES.iter().map(|s| s.to_string()).collect()
}

fn default_anchor() -> (f32, f32) {
    (DEFAULT_ANCHOR.x, DEFAULT_ANCHOR.y)
}

fn default_window_size() -> (f32, f32) {
    (1280.0, 800.0)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            debug_logging: false,
            log_file: None,
            enable_toasts: default_toasts(),
            toast_duration: default_toast_duration(),
            stroke_width: default_stroke_width(),
            eraser_size: default_eraser_size(),
            swatches: default_swatches(),
            default_anchor: default_anchor(),
            window_size: default_window_size(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing or empty file yields defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).with_context(|| format!("parse settings file {path}"))
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, json).with_context(|| format!("write settings file {path}"))?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            tracing::debug!(%url, "recognition url taken from environment");
            self.api_url = url;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }

    /// Session configuration for a surface of the given viewport size.
    pub fn session_config(&self, width: u32, height: u32) -> SessionConfig {
        SessionConfig {
            width,
            height,
            stroke_width: self.stroke_width,
            eraser_size: self.eraser_size,
            default_anchor: Position::from(self.default_anchor),
        }
    }
}
