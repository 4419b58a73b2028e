use crate::parallel;
use elevest_image::{Image, ImageError};

/// Value written for foreground pixels.
pub const FOREGROUND: u8 = 255;

/// Value written for background pixels.
pub const BACKGROUND: u8 = 0;

/// Default threshold above which a channel counts as white background.
pub const DEFAULT_BACKGROUND_THRESHOLD: u8 = 245;

/// Compute a foreground mask of an RGB8 image rendered on a white background.
///
/// A pixel is background when all of its channels are strictly greater than
/// `threshold`.
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output mask, [`FOREGROUND`] or [`BACKGROUND`] per pixel.
/// * `threshold` - The near-white threshold.
///
/// # Example
///
/// ```
/// use elevest_image::{Image, ImageSize};
/// use elevest_imgproc::mask::foreground_mask_rgb;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize { width: 2, height: 1 },
///     vec![255, 255, 255, 10, 250, 250],
/// )
/// .unwrap();
/// let mut mask = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// foreground_mask_rgb(&image, &mut mask, 245).unwrap();
/// assert_eq!(mask.as_slice(), &[0, 255]);
/// ```
pub fn foreground_mask_rgb(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 1>,
    threshold: u8,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let is_background = src_pixel.iter().all(|&v| v > threshold);
        dst_pixel[0] = if is_background { BACKGROUND } else { FOREGROUND };
    });

    Ok(())
}

/// Compute a foreground mask of an RGBA8 image from its alpha channel.
///
/// A pixel is foreground when its alpha is non-zero.
pub fn foreground_mask_rgba(src: &Image<u8, 4>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = if src_pixel[3] > 0 { FOREGROUND } else { BACKGROUND };
    });

    Ok(())
}

/// Whether the mask marks the pixel containing the point `(x, y)` as foreground.
///
/// The coordinates are truncated to the pixel grid. Points outside the image
/// are never foreground.
pub fn is_foreground(mask: &Image<u8, 1>, x: f64, y: f64) -> bool {
    if !(x >= 0.0 && y >= 0.0) {
        return false;
    }
    mask.get_pixel(x as usize, y as usize, 0)
        .is_ok_and(|v| v != BACKGROUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use elevest_image::ImageSize;

    #[test]
    fn test_foreground_mask_rgb_threshold() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 3,
                height: 1,
            },
            vec![246, 246, 246, 245, 255, 255, 0, 0, 0],
        )?;
        let mut mask = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        foreground_mask_rgb(&image, &mut mask, DEFAULT_BACKGROUND_THRESHOLD)?;
        assert_eq!(mask.as_slice(), &[BACKGROUND, FOREGROUND, FOREGROUND]);
        Ok(())
    }

    #[test]
    fn test_foreground_mask_rgba_alpha() -> Result<(), ImageError> {
        let image = Image::<u8, 4>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![255, 255, 255, 0, 255, 255, 255, 1],
        )?;
        let mut mask = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        foreground_mask_rgba(&image, &mut mask)?;
        assert_eq!(mask.as_slice(), &[BACKGROUND, FOREGROUND]);
        Ok(())
    }

    #[test]
    fn test_is_foreground() -> Result<(), ImageError> {
        let mask = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0, 255, 255, 0],
        )?;
        assert!(!is_foreground(&mask, 0.2, 0.9));
        assert!(is_foreground(&mask, 1.7, 0.1));
        assert!(is_foreground(&mask, 0.5, 1.5));
        assert!(!is_foreground(&mask, 2.0, 0.0));
        assert!(!is_foreground(&mask, -0.5, 0.0));
        assert!(!is_foreground(&mask, f64::NAN, 0.0));
        Ok(())
    }
}
