pub mod crop_faces_use_case;
pub mod loop_state;
pub mod pipeline_config;
pub mod pipeline_logger;
