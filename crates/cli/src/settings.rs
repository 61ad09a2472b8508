use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use facecrop_core::detection::domain::box_mapper::BoxLayout;
use facecrop_core::inference::domain::model_spec::{ModelSpec, OutputNames};
use facecrop_core::shared::constants::{
    DEFAULT_CONFIDENCE, DEFAULT_FRAMES_ADDR, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH,
    DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_SERVING_ADDR, DEFAULT_THROTTLE,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Every tunable of a crop run, as stored in a JSON settings file.
///
/// Missing keys fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub throttle_ms: u64,
    pub serving_addr: String,
    pub model: ModelSpec,
    pub outputs: OutputNames,
    pub frames_addr: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub confidence: f32,
    pub box_layout: BoxLayout,
    pub output_dir: PathBuf,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub max_message_size: usize,
    pub max_frames: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            throttle_ms: DEFAULT_THROTTLE.as_millis() as u64,
            serving_addr: DEFAULT_SERVING_ADDR.to_string(),
            model: ModelSpec::default(),
            outputs: OutputNames::default(),
            frames_addr: DEFAULT_FRAMES_ADDR.to_string(),
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            confidence: DEFAULT_CONFIDENCE,
            box_layout: BoxLayout::default(),
            output_dir: PathBuf::from("."),
            timeout_ms: None,
            connect_timeout_ms: None,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_frames: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
