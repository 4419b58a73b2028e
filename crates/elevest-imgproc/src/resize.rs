use elevest_image::{Image, ImageError};
use rayon::prelude::*;

/// Sample position along one axis: the two source indices and the weight of the second.
fn linear_coeffs(dst_index: usize, scale: f32, src_len: usize) -> (usize, usize, f32) {
    // pixel centers are aligned, as in OpenCV's INTER_LINEAR
    let pos = ((dst_index as f32 + 0.5) * scale - 0.5).max(0.0);
    let i0 = (pos.floor() as usize).min(src_len - 1);
    let i1 = (i0 + 1).min(src_len - 1);
    let frac = if i0 == src_len - 1 { 0.0 } else { pos - i0 as f32 };
    (i0, i1, frac)
}

/// Resize an 8-bit image with bilinear interpolation.
///
/// The destination size is taken from `dst`. Source borders are clamped.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, pre-allocated with the target size.
///
/// # Errors
///
/// Returns an error if either image is empty.
///
/// # Example
///
/// ```
/// use elevest_image::{Image, ImageSize};
/// use elevest_imgproc::resize::resize_bilinear_u8;
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 4, height: 5 }, vec![7u8; 20]).unwrap();
/// let mut resized = Image::<u8, 1>::from_size_val(ImageSize { width: 2, height: 3 }, 0).unwrap();
///
/// resize_bilinear_u8(&image, &mut resized).unwrap();
/// assert_eq!(resized.as_slice(), &[7u8; 6]);
/// ```
pub fn resize_bilinear_u8<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.width() == 0 || src.height() == 0 || dst.width() == 0 || dst.height() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let scale_x = src.width() as f32 / dst.width() as f32;
    let scale_y = src.height() as f32 / dst.height() as f32;

    let x_coeffs = (0..dst.width())
        .map(|x| linear_coeffs(x, scale_x, src.width()))
        .collect::<Vec<_>>();

    let src_width = src.width();
    let src_height = src.height();
    let src_data = src.as_slice();
    let row_stride = C * dst.width();

    dst.as_slice_mut()
        .par_chunks_exact_mut(row_stride)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let (y0, y1, fy) = linear_coeffs(y, scale_y, src_height);
            let row0 = &src_data[y0 * src_width * C..(y0 + 1) * src_width * C];
            let row1 = &src_data[y1 * src_width * C..(y1 + 1) * src_width * C];

            for (dst_pixel, &(x0, x1, fx)) in dst_row.chunks_exact_mut(C).zip(x_coeffs.iter()) {
                for (k, out) in dst_pixel.iter_mut().enumerate() {
                    let top = row0[x0 * C + k] as f32 * (1.0 - fx) + row0[x1 * C + k] as f32 * fx;
                    let bottom =
                        row1[x0 * C + k] as f32 * (1.0 - fx) + row1[x1 * C + k] as f32 * fx;
                    let val = top * (1.0 - fy) + bottom * fy;
                    *out = val.round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use elevest_image::ImageSize;

    #[test]
    fn test_resize_identity() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 2,
        };
        let image = Image::<u8, 1>::new(size, vec![0, 10, 20, 30, 40, 50])?;
        let mut resized = Image::<u8, 1>::from_size_val(size, 0)?;
        resize_bilinear_u8(&image, &mut resized)?;
        assert_eq!(resized.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn test_resize_upsample_interpolates() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([2, 1].into(), vec![0, 100])?;
        let mut resized = Image::<u8, 1>::from_size_val([4, 1].into(), 0)?;
        resize_bilinear_u8(&image, &mut resized)?;
        // centers at -0.25 (clamped), 0.25, 0.75, 1.25 (clamped)
        assert_eq!(resized.as_slice(), &[0, 25, 75, 100]);
        Ok(())
    }

    #[test]
    fn test_resize_multichannel() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val([8, 8].into(), 200)?;
        let mut resized = Image::<u8, 3>::from_size_val([3, 5].into(), 0)?;
        resize_bilinear_u8(&image, &mut resized)?;
        assert!(resized.as_slice().iter().all(|&v| v == 200));
        Ok(())
    }

    #[test]
    fn test_resize_empty() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([0, 0].into(), vec![])?;
        let mut resized = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        assert!(resize_bilinear_u8(&image, &mut resized).is_err());
        Ok(())
    }
}
