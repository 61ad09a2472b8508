use crate::inference::domain::raw_detections::RawDetections;
use crate::inference::domain::tensor::Tensor;

/// Runs the remote detection model on one input tensor.
///
/// Each call is independent; implementations may block for the full
/// round trip.
pub trait InferenceClient: Send {
    fn infer(&mut self, tensor: &Tensor<'_>) -> Result<RawDetections, Box<dyn std::error::Error>>;
}
