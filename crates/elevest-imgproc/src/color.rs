use crate::parallel;
use elevest_image::{Image, ImageError};

fn gray_from_rgb_pixel(r: u8, g: u8, b: u8) -> u8 {
    ((r as u16 * 77 + g as u16 * 150 + b as u16 * 29) >> 8) as u8
}

/// Convert an RGB8 image to grayscale using the formula:
///
/// Y = (77 * R + 150 * G + 29 * B) >> 8
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use elevest_image::{Image, ImageSize};
/// use elevest_imgproc::color::gray_from_rgb_u8;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 1,
///         height: 1,
///     },
///     vec![255, 255, 255],
/// )
/// .unwrap();
///
/// let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
/// gray_from_rgb_u8(&image, &mut gray).unwrap();
/// assert_eq!(gray.as_slice(), &[255]);
/// ```
pub fn gray_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = gray_from_rgb_pixel(src_pixel[0], src_pixel[1], src_pixel[2]);
    });

    Ok(())
}

/// Convert an RGBA8 image to grayscale, ignoring the alpha channel.
///
/// Precondition: the input and output images must have the same size.
pub fn gray_from_rgba_u8(src: &Image<u8, 4>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = gray_from_rgb_pixel(src_pixel[0], src_pixel[1], src_pixel[2]);
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use elevest_image::ImageSize;

    #[test]
    fn test_gray_from_rgb_u8() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255],
        )?;
        let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        gray_from_rgb_u8(&image, &mut gray)?;
        assert_eq!(gray.as_slice(), &[0, 76, 149, 28]);
        Ok(())
    }

    #[test]
    fn test_gray_from_rgba_ignores_alpha() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 1,
            height: 2,
        };
        let image = Image::<u8, 4>::new(size, vec![100, 100, 100, 0, 100, 100, 100, 255])?;
        let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;
        gray_from_rgba_u8(&image, &mut gray)?;
        assert_eq!(gray.as_slice()[0], gray.as_slice()[1]);
        assert_eq!(gray.as_slice()[0], 100);
        Ok(())
    }

    #[test]
    fn test_gray_size_mismatch() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val([2, 2].into(), 0)?;
        let mut gray = Image::<u8, 1>::from_size_val([3, 2].into(), 0)?;
        assert_eq!(
            gray_from_rgb_u8(&image, &mut gray),
            Err(ImageError::InvalidImageSize(2, 2, 3, 2))
        );
        Ok(())
    }
}
