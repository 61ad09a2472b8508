use crate::capture::domain::frame_source::EncodedFrame;
use crate::shared::frame::Frame;

/// Turns a compressed frame into an RGB pixel buffer.
pub trait FrameDecoder: Send {
    /// Decodes `encoded`, tagging the result with its arrival `index`.
    fn decode(
        &self,
        encoded: &EncodedFrame,
        index: u64,
    ) -> Result<Frame, Box<dyn std::error::Error>>;
}
