use crate::shared::region::ClampedRect;

/// Number of interleaved colour channels in a decoded frame.
pub const RGB_CHANNELS: usize = 3;

/// A decoded camera frame: contiguous RGB bytes in row-major order.
///
/// Owned by a single pipeline iteration and dropped once its crops have
/// been written.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: u64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * RGB_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        RGB_CHANNELS
    }

    /// Arrival order of the frame within the current run.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Copies the pixels inside `rect` into a new frame with the same index.
    ///
    /// `rect` must lie inside the frame (see `CropRect::clamp_to`).
    pub fn crop(&self, rect: &ClampedRect) -> Frame {
        debug_assert!(rect.x + rect.width <= self.width && rect.y + rect.height <= self.height);
        let stride = self.width as usize * RGB_CHANNELS;
        let row_len = rect.width as usize * RGB_CHANNELS;
        let left = rect.x as usize * RGB_CHANNELS;

        let mut data = Vec::with_capacity(row_len * rect.height as usize);
        for row in rect.y as usize..(rect.y + rect.height) as usize {
            let start = row * stride + left;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Frame::new(data, rect.width, rect.height, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    /// 4x3 frame where pixel (x, y) is `[x, y, 9]`.
    fn coordinate_frame() -> Frame {
        let mut data = Vec::new();
        for y in 0..3u8 {
            for x in 0..4u8 {
                data.extend_from_slice(&[x, y, 9]);
            }
        }
        Frame::new(data, 4, 3, 2)
    }

    #[test]
    fn test_crop_copies_sub_region() {
        let frame = coordinate_frame();
        let rect = ClampedRect {
            x: 1,
            y: 1,
            width: 2,
            height: 2,
        };
        let crop = frame.crop(&rect);
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
        assert_eq!(crop.index(), 2);
        assert_eq!(
            crop.data(),
            &[1, 1, 9, 2, 1, 9, 1, 2, 9, 2, 2, 9][..]
        );
    }

    #[test]
    fn test_crop_full_frame_is_identity() {
        let frame = coordinate_frame();
        let rect = ClampedRect {
            x: 0,
            y: 0,
            width: 4,
            height: 3,
        };
        assert_eq!(frame.crop(&rect).data(), frame.data());
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::new(vec![100u8; 12], 2, 2, 0);
        let cloned = frame.clone();
        drop(frame);
        assert_eq!(cloned.data()[0], 100);
    }
}
