use crate::capture::domain::frame_decoder::FrameDecoder;
use crate::capture::domain::frame_source::EncodedFrame;
use crate::shared::frame::Frame;

/// Decodes JPEG frames with the `image` crate.
///
/// Greyscale and CMYK JPEGs are converted to RGB so every frame reaching the
/// pipeline has three channels.
pub struct JpegFrameDecoder;

impl JpegFrameDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JpegFrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder for JpegFrameDecoder {
    fn decode(
        &self,
        encoded: &EncodedFrame,
        index: u64,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let img = image::load_from_memory_with_format(&encoded.data, image::ImageFormat::Jpeg)?
            .into_rgb8();
        let (width, height) = img.dimensions();
        Ok(Frame::new(img.into_raw(), width, height, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_dimensions_and_index() {
        let encoded = EncodedFrame::new(encode_jpeg(64, 48, [50, 100, 200]));
        let frame = JpegFrameDecoder::new().decode(&encoded, 7).unwrap();
        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.index(), 7);
        assert_eq!(frame.data().len(), 64 * 48 * 3);
    }

    #[test]
    fn test_decode_is_approximately_lossless_for_flat_colour() {
        let encoded = EncodedFrame::new(encode_jpeg(16, 16, [50, 100, 200]));
        let frame = JpegFrameDecoder::new().decode(&encoded, 0).unwrap();
        let px = &frame.data()[..3];
        assert!((px[0] as i32 - 50).abs() <= 6);
        assert!((px[1] as i32 - 100).abs() <= 6);
        assert!((px[2] as i32 - 200).abs() <= 6);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let encoded = EncodedFrame::new(b"not a jpeg".to_vec());
        assert!(JpegFrameDecoder::new().decode(&encoded, 0).is_err());
    }

    #[test]
    fn test_decode_png_is_rejected() {
        let img = image::RgbImage::new(4, 4);
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        let encoded = EncodedFrame::new(out.into_inner());
        assert!(JpegFrameDecoder::new().decode(&encoded, 0).is_err());
    }
}
