pub mod artifact_counter;
pub mod artifact_writer;
