pub mod inference_client;
pub mod model_spec;
pub mod raw_detections;
pub mod tensor;
