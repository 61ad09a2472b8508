/// One compressed still image as delivered by the camera service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedFrame {
    pub data: Vec<u8>,
}

impl EncodedFrame {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

/// Supplies one compressed frame per call.
///
/// Implementations block until a frame is available or the source fails.
pub trait FrameSource: Send {
    fn fetch(&mut self) -> Result<EncodedFrame, Box<dyn std::error::Error>>;
}
