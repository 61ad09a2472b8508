use crate::capture::domain::frame_source::{EncodedFrame, FrameSource};
use crate::capture::infrastructure::video_proto::{Empty, FrameJpeg, FRAME_JPEG_PATH};
use crate::transport::grpc_channel::{ChannelOptions, GrpcChannel, TransportError};

/// Pulls JPEG frames from the camera service over gRPC.
pub struct GrpcFrameSource {
    channel: GrpcChannel,
}

impl GrpcFrameSource {
    pub fn connect(address: &str, options: &ChannelOptions) -> Result<Self, TransportError> {
        Ok(Self {
            channel: GrpcChannel::connect(address, options)?,
        })
    }
}

impl FrameSource for GrpcFrameSource {
    fn fetch(&mut self) -> Result<EncodedFrame, Box<dyn std::error::Error>> {
        let frame: FrameJpeg = self.channel.unary(FRAME_JPEG_PATH, Empty {})?;
        log::trace!(
            "Received {} byte frame from {}",
            frame.data.len(),
            self.channel.address()
        );
        Ok(EncodedFrame::new(frame.data))
    }
}
