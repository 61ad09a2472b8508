use crate::shared::frame::Frame;

/// Element type of a [`Tensor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TensorDType {
    Uint8,
}

/// A shaped byte tensor borrowed from a frame, ready to be sent for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<'a> {
    dtype: TensorDType,
    shape: Vec<i64>,
    content: &'a [u8],
}

impl<'a> Tensor<'a> {
    /// Packs a frame as a `[1, W, H, 3]` uint8 tensor.
    ///
    /// The bytes are the frame's row-major RGB pixels unchanged: no resize,
    /// no colour conversion, no padding. The dimension order is the one the
    /// serving model was exported with and does not reflect the memory layout.
    pub fn from_frame(frame: &'a Frame) -> Self {
        Self {
            dtype: TensorDType::Uint8,
            shape: vec![
                1,
                i64::from(frame.width()),
                i64::from(frame.height()),
                frame.channels() as i64,
            ],
            content: frame.data(),
        }
    }

    pub fn dtype(&self) -> TensorDType {
        self.dtype
    }

    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    pub fn content(&self) -> &'a [u8] {
        self.content
    }
}
