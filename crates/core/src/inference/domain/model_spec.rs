use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    DEFAULT_BOXES_OUTPUT, DEFAULT_CLASSES_OUTPUT, DEFAULT_INPUT_NAME, DEFAULT_MODEL_NAME,
    DEFAULT_MODEL_VERSION, DEFAULT_NUM_DETECTIONS_OUTPUT, DEFAULT_SCORES_OUTPUT,
    DEFAULT_SIGNATURE_NAME,
};

/// Which served model, signature and version a prediction targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    pub name: String,
    pub signature_name: String,
    pub version: i64,
    /// Name of the single input tensor.
    pub input_name: String,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            signature_name: DEFAULT_SIGNATURE_NAME.to_string(),
            version: DEFAULT_MODEL_VERSION,
            input_name: DEFAULT_INPUT_NAME.to_string(),
        }
    }
}

/// Names of the model outputs the detection pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputNames {
    pub scores: String,
    pub classes: String,
    pub boxes: String,
    /// Optional count of valid slots. Ignored when the model does not
    /// produce it; `null` in a settings file disables the lookup.
    pub num_detections: Option<String>,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            scores: DEFAULT_SCORES_OUTPUT.to_string(),
            classes: DEFAULT_CLASSES_OUTPUT.to_string(),
            boxes: DEFAULT_BOXES_OUTPUT.to_string(),
            num_detections: Some(DEFAULT_NUM_DETECTIONS_OUTPUT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let spec = ModelSpec::default();
        assert_eq!(spec.name, "face_detection");
        assert_eq!(spec.signature_name, "serving_default");
        assert_eq!(spec.version, 1);
        assert_eq!(spec.input_name, "image_tensor");

        let outputs = OutputNames::default();
        assert_eq!(outputs.scores, "detection_scores");
        assert_eq!(outputs.classes, "detection_classes");
        assert_eq!(outputs.boxes, "detection_boxes");
        assert_eq!(outputs.num_detections.as_deref(), Some("num_detections"));
    }

    #[test]
    fn test_partial_output_names_keep_defaults() {
        let json = r#"{"scores":"s"}"#;
        let outputs: OutputNames = serde_json::from_str(json).unwrap();
        assert_eq!(outputs.scores, "s");
        assert_eq!(outputs.classes, "detection_classes");
        assert_eq!(outputs.num_detections.as_deref(), Some("num_detections"));
    }

    #[test]
    fn test_null_num_detections_disables_it() {
        let json = r#"{"num_detections":null}"#;
        let outputs: OutputNames = serde_json::from_str(json).unwrap();
        assert!(outputs.num_detections.is_none());
    }

    #[test]
    fn test_partial_model_spec_keeps_defaults() {
        let spec: ModelSpec = serde_json::from_str(r#"{"version":3}"#).unwrap();
        assert_eq!(spec.version, 3);
        assert_eq!(spec.name, "face_detection");
    }
}
