use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::shared::constants::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_THROTTLE};

/// Loop-level settings for a crop run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Minimum time between the start of two iterations. Zero disables.
    pub throttle: Duration,
    /// Stop after this many frames. `None` runs until failure or cancel.
    pub max_frames: Option<u64>,
    /// Frame size the camera is expected to deliver. Only used to warn.
    pub expected_size: Option<(u32, u32)>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            throttle: DEFAULT_THROTTLE,
            max_frames: None,
            expected_size: Some((DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}
