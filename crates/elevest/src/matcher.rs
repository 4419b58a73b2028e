use elevest_3d::hypothesis::NUM_VIEWS;
use elevest_image::{Image, ImageSize};
use elevest_imgproc::{
    color::{gray_from_rgb_u8, gray_from_rgba_u8},
    mask::{foreground_mask_rgb, foreground_mask_rgba, is_foreground, DEFAULT_BACKGROUND_THRESHOLD},
    resize::resize_bilinear_u8,
};
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::correspondence::{view_pairs, Correspondence, PairwiseMatches};
use crate::error::{BoxError, ElevationError};

/// Keypoint matches returned by a feature matcher.
///
/// Keypoints are pixel coordinates in the images given to the matcher.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatcherOutput {
    /// Matched keypoints in the first image.
    pub keypoints0: Vec<DVec2>,
    /// Matched keypoints in the second image.
    pub keypoints1: Vec<DVec2>,
    /// Confidence of every match.
    pub confidence: Vec<f64>,
}

/// A dense feature matcher working on pairs of grayscale images of equal size.
pub trait FeatureMatcher {
    /// Match two grayscale images.
    fn match_images(
        &mut self,
        image0: &Image<u8, 1>,
        image1: &Image<u8, 1>,
    ) -> Result<MatcherOutput, BoxError>;
}

impl<F> FeatureMatcher for F
where
    F: FnMut(&Image<u8, 1>, &Image<u8, 1>) -> Result<MatcherOutput, BoxError>,
{
    fn match_images(
        &mut self,
        image0: &Image<u8, 1>,
        image1: &Image<u8, 1>,
    ) -> Result<MatcherOutput, BoxError> {
        self(image0, image1)
    }
}

/// An input view, either rendered on a white background or with an alpha channel.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewImage {
    /// RGB8 image on a near-white background.
    Rgb(Image<u8, 3>),
    /// RGBA8 image whose alpha channel marks the object.
    Rgba(Image<u8, 4>),
}

impl ViewImage {
    /// Size of the view in pixels.
    pub fn size(&self) -> ImageSize {
        match self {
            ViewImage::Rgb(image) => image.size(),
            ViewImage::Rgba(image) => image.size(),
        }
    }

    /// Foreground mask of the view.
    ///
    /// RGBA views use their alpha channel. RGB views treat pixels whose
    /// channels all exceed `background_threshold` as background.
    pub fn foreground_mask(&self, background_threshold: u8) -> Result<Image<u8, 1>, ElevationError> {
        let mut mask = Image::<u8, 1>::from_size_val(self.size(), 0)?;
        match self {
            ViewImage::Rgb(image) => {
                log::info!("Image has no alpha channel, using thresholding to mask out background");
                foreground_mask_rgb(image, &mut mask, background_threshold)?;
            }
            ViewImage::Rgba(image) => foreground_mask_rgba(image, &mut mask)?,
        }
        Ok(mask)
    }

    /// Grayscale version of the view.
    pub fn to_gray(&self) -> Result<Image<u8, 1>, ElevationError> {
        let mut gray = Image::<u8, 1>::from_size_val(self.size(), 0)?;
        match self {
            ViewImage::Rgb(image) => gray_from_rgb_u8(image, &mut gray)?,
            ViewImage::Rgba(image) => gray_from_rgba_u8(image, &mut gray)?,
        }
        Ok(gray)
    }
}

/// Parameters of the pairwise matching stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingParams {
    /// Side length in pixels of the square images given to the matcher.
    pub matcher_input_size: usize,
    /// Near-white threshold for views without alpha channel.
    pub background_threshold: u8,
}

impl Default for MatchingParams {
    fn default() -> Self {
        Self {
            matcher_input_size: 480,
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
        }
    }
}

/// A view prepared for matching.
struct PreparedView {
    size: ImageSize,
    mask: Image<u8, 1>,
    resized: Image<u8, 1>,
}

fn prepare_view(view: &ViewImage, params: &MatchingParams) -> Result<PreparedView, ElevationError> {
    let mask = view.foreground_mask(params.background_threshold)?;
    let gray = view.to_gray()?;
    let input_size = ImageSize {
        width: params.matcher_input_size,
        height: params.matcher_input_size,
    };
    let mut resized = Image::<u8, 1>::from_size_val(input_size, 0)?;
    resize_bilinear_u8(&gray, &mut resized)?;
    Ok(PreparedView {
        size: view.size(),
        mask,
        resized,
    })
}

/// Match every pair of views and keep the matches lying on the object.
///
/// Each view is converted to grayscale and resized to the matcher input size.
/// Matched keypoints are scaled back to the original resolution and a match is
/// kept only when each endpoint falls on the foreground of its own view.
///
/// # Errors
///
/// * [`ElevationError::ImageSizeMismatch`] if the views of a pair differ in size.
/// * [`ElevationError::MatcherOutputMismatch`] if the matcher output is inconsistent.
/// * [`ElevationError::Matcher`] if the matcher fails.
pub fn compute_pairwise_matches<M>(
    matcher: &mut M,
    images: &[ViewImage; NUM_VIEWS],
    params: &MatchingParams,
) -> Result<PairwiseMatches, ElevationError>
where
    M: FeatureMatcher + ?Sized,
{
    let views = images
        .iter()
        .map(|view| prepare_view(view, params))
        .collect::<Result<Vec<_>, _>>()?;

    let mut pairwise = PairwiseMatches::new();
    for (i, j) in view_pairs() {
        let (view0, view1) = (&views[i], &views[j]);
        if view0.size != view1.size {
            return Err(ElevationError::ImageSizeMismatch {
                view_a: i,
                view_b: j,
                size_a: view0.size,
                size_b: view1.size,
            });
        }

        let output = matcher
            .match_images(&view0.resized, &view1.resized)
            .map_err(ElevationError::Matcher)?;
        if output.keypoints0.len() != output.keypoints1.len()
            || output.keypoints0.len() != output.confidence.len()
        {
            return Err(ElevationError::MatcherOutputMismatch {
                keypoints0: output.keypoints0.len(),
                keypoints1: output.keypoints1.len(),
                confidence: output.confidence.len(),
            });
        }

        let scale = DVec2::new(
            view0.size.width as f64 / params.matcher_input_size as f64,
            view0.size.height as f64 / params.matcher_input_size as f64,
        );

        let matches = output
            .keypoints0
            .iter()
            .zip(output.keypoints1.iter())
            .zip(output.confidence.iter())
            .map(|((p0, p1), &confidence)| Correspondence::new(*p0 * scale, *p1 * scale, confidence))
            .filter(|c| {
                is_foreground(&view0.mask, c.x0, c.y0) && is_foreground(&view1.mask, c.x1, c.y1)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "views {i}-{j}: {} matches, {} on the foreground",
            output.confidence.len(),
            matches.len()
        );
        pairwise.insert(i, j, matches)?;
    }

    Ok(pairwise)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_masked_rgba(size: ImageSize) -> Image<u8, 4> {
        // left half transparent, right half opaque
        let mut data = Vec::with_capacity(size.width * size.height * 4);
        for _ in 0..size.height {
            for x in 0..size.width {
                let alpha = if x < size.width / 2 { 0 } else { 255 };
                data.extend_from_slice(&[120, 80, 40, alpha]);
            }
        }
        Image::new(size, data).unwrap()
    }

    #[test]
    fn test_view_image_mask_and_gray() -> Result<(), ElevationError> {
        let size = ImageSize {
            width: 4,
            height: 2,
        };
        let view = ViewImage::Rgba(half_masked_rgba(size));
        let mask = view.foreground_mask(245)?;
        assert_eq!(mask.as_slice(), &[0, 0, 255, 255, 0, 0, 255, 255]);
        let gray = view.to_gray()?;
        assert_eq!(gray.size(), size);

        let white = ViewImage::Rgb(Image::from_size_val(size, 255)?);
        assert!(white.foreground_mask(245)?.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn test_compute_pairwise_matches_rescale_and_mask() -> Result<(), ElevationError> {
        let size = ImageSize {
            width: 200,
            height: 100,
        };
        let views: [ViewImage; NUM_VIEWS] =
            std::array::from_fn(|_| ViewImage::Rgba(half_masked_rgba(size)));
        let params = MatchingParams {
            matcher_input_size: 50,
            ..Default::default()
        };

        let mut calls = 0;
        let mut matcher = |a: &Image<u8, 1>, b: &Image<u8, 1>| -> Result<MatcherOutput, BoxError> {
            calls += 1;
            assert_eq!(a.size(), b.size());
            assert_eq!(a.width(), 50);
            Ok(MatcherOutput {
                // foreground in both, background in the first, background in the second
                keypoints0: vec![DVec2::new(40.0, 10.0), DVec2::new(5.0, 10.0), DVec2::new(40.0, 10.0)],
                keypoints1: vec![DVec2::new(30.0, 20.0), DVec2::new(30.0, 20.0), DVec2::new(5.0, 20.0)],
                confidence: vec![0.9, 0.8, 0.7],
            })
        };

        let pairwise = compute_pairwise_matches(&mut matcher, &views, &params)?;
        assert_eq!(calls, 6);
        assert_eq!(pairwise.len(), 6);
        for (_, table) in pairwise.iter() {
            assert_eq!(table.len(), 1);
            assert_eq!(<[f64; 5]>::from(table[0]), [160.0, 20.0, 120.0, 40.0, 0.9]);
        }
        Ok(())
    }

    #[test]
    fn test_compute_pairwise_matches_size_mismatch() -> Result<(), ElevationError> {
        let small = ImageSize {
            width: 10,
            height: 10,
        };
        let large = ImageSize {
            width: 20,
            height: 10,
        };
        let views = [
            ViewImage::Rgb(Image::from_size_val(small, 0)?),
            ViewImage::Rgb(Image::from_size_val(small, 0)?),
            ViewImage::Rgb(Image::from_size_val(large, 0)?),
            ViewImage::Rgb(Image::from_size_val(small, 0)?),
        ];
        let mut matcher = |_: &Image<u8, 1>, _: &Image<u8, 1>| -> Result<MatcherOutput, BoxError> {
            Ok(MatcherOutput::default())
        };
        let res = compute_pairwise_matches(&mut matcher, &views, &MatchingParams::default());
        assert!(matches!(
            res,
            Err(ElevationError::ImageSizeMismatch {
                view_a: 0,
                view_b: 2,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn test_compute_pairwise_matches_bad_output() -> Result<(), ElevationError> {
        let views: [ViewImage; NUM_VIEWS] =
            std::array::from_fn(|_| ViewImage::Rgba(half_masked_rgba([8, 8].into())));
        let mut matcher = |_: &Image<u8, 1>, _: &Image<u8, 1>| -> Result<MatcherOutput, BoxError> {
            Ok(MatcherOutput {
                keypoints0: vec![DVec2::ZERO],
                keypoints1: vec![],
                confidence: vec![1.0],
            })
        };
        let res = compute_pairwise_matches(&mut matcher, &views, &MatchingParams::default());
        assert!(matches!(
            res,
            Err(ElevationError::MatcherOutputMismatch {
                keypoints0: 1,
                keypoints1: 0,
                confidence: 1
            })
        ));

        let mut failing = |_: &Image<u8, 1>, _: &Image<u8, 1>| -> Result<MatcherOutput, BoxError> {
            Err("model not loaded".into())
        };
        let res = compute_pairwise_matches(&mut failing, &views, &MatchingParams::default());
        assert!(matches!(res, Err(ElevationError::Matcher(_))));
        Ok(())
    }
}
