//! Messages of the camera service's `videoService.Video` gRPC API.

pub const FRAME_JPEG_PATH: &str = "/videoService.Video/FrameJPEG";

/// `google.protobuf.Empty`.
#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FrameJpeg {
    #[prost(bytes = "vec", tag = "1")]
    pub data: Vec<u8>,
}
