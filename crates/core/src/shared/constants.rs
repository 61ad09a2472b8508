use std::time::Duration;

pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(1000);

pub const DEFAULT_SERVING_ADDR: &str = "localhost:8500";
pub const DEFAULT_MODEL_NAME: &str = "face_detection";
pub const DEFAULT_SIGNATURE_NAME: &str = "serving_default";
pub const DEFAULT_MODEL_VERSION: i64 = 1;
pub const DEFAULT_INPUT_NAME: &str = "image_tensor";

pub const DEFAULT_SCORES_OUTPUT: &str = "detection_scores";
pub const DEFAULT_CLASSES_OUTPUT: &str = "detection_classes";
pub const DEFAULT_BOXES_OUTPUT: &str = "detection_boxes";
pub const DEFAULT_NUM_DETECTIONS_OUTPUT: &str = "num_detections";

pub const DEFAULT_FRAMES_ADDR: &str = "mirror.local:5555";
pub const DEFAULT_FRAME_WIDTH: u32 = 1640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 1232;

/// Candidate slots the detection model returns per frame.
pub const DETECTION_SLOTS: usize = 100;

/// Minimum score for a slot to become an artifact.
pub const DEFAULT_CONFIDENCE: f32 = 0.6;

/// Upper bound (exclusive) on the float-encoded class id of the face category.
pub const FACE_CLASS_LIMIT: f32 = 1.5;

/// Largest gRPC message either adapter will send or accept.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 0x800000;

pub const ARTIFACT_PREFIX: &str = "image";
pub const ARTIFACT_EXTENSION: &str = "jpg";
