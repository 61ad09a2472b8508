pub mod jpeg_artifact_writer;
