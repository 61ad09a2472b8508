pub mod grpc_frame_source;
pub mod jpeg_frame_decoder;
mod video_proto;
