//! Leaf image → classifier input tensor.

use crate::error::ModelResult;
use crate::model::InputTensor;
use image::imageops::FilterType;

/// Side length of the square grid the disease classifier was trained on.
pub const IMAGE_SIZE: u32 = 128;
pub const IMAGE_CHANNELS: usize = 3;

/// Decode (format guessed from the bytes), resize to 128×128, drop alpha, and
/// lay out as NHWC `[1, 128, 128, 3]` with raw 0–255 channel values.
pub fn prepare_image(bytes: &[u8]) -> ModelResult<InputTensor> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = decoded
        .resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::CatmullRom)
        .to_rgb8();

    let side = IMAGE_SIZE as usize;
    let values: Vec<f32> = rgb.into_raw().into_iter().map(f32::from).collect();
    debug_assert_eq!(values.len(), side * side * IMAGE_CHANNELS);

    Ok(InputTensor::new(vec![1, side, side, IMAGE_CHANNELS], values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn produces_batched_nhwc_tensor() {
        let tensor = prepare_image(&png(300, 200, [10, 120, 250, 255])).unwrap();
        assert_eq!(tensor.shape, vec![1, 128, 128, 3]);
        assert_eq!(tensor.values.len(), 128 * 128 * 3);
        assert_eq!(&tensor.values[..3], &[10.0, 120.0, 250.0]);
    }

    #[test]
    fn alpha_channel_is_dropped() {
        let tensor = prepare_image(&png(4, 4, [1, 2, 3, 0])).unwrap();
        assert_eq!(tensor.shape[3], 3);
    }

    #[test]
    fn undecodable_bytes_are_an_image_error() {
        assert!(matches!(
            prepare_image(b"not an image"),
            Err(ModelError::Image(_))
        ));
    }
}
