//! Monochromatic border trimming
//!
//! Scraped pictures frequently carry letterbox padding (white or black bars
//! added to fit Instagram's aspect ratios). The background color is taken
//! from the top-left pixel; everything that differs from it by more than a
//! threshold is content, and the image is cropped to the content bounding box
//! in place.

use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use log::{info, warn};
use rayon::prelude::*;

use crate::media;
use crate::progress;

/// A pixel counts as content when any channel differs from the background by
/// more than this (out of 255)
const DIFF_THRESHOLD: u8 = 100;

/// Skip the crop when the content box covers at least this share of the
/// image; rewriting for a sub-permille trim would only recompress the file
const MAX_BBOX_PROPORTION: f64 = 0.999;

/// Bounding box `(x, y, width, height)` of all non-background pixels, or
/// `None` when the whole image matches the top-left color.
fn content_bbox(img: &DynamicImage) -> Option<(u32, u32, u32, u32)> {
    let bg = img.get_pixel(0, 0);
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut found = false;

    for (x, y, px) in img.pixels() {
        let differs = px
            .0
            .iter()
            .zip(bg.0.iter())
            .any(|(a, b)| a.abs_diff(*b) > DIFF_THRESHOLD);
        if differs {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Trim the borders of a single image, overwriting it in place.
///
/// Returns whether the file was rewritten.
pub fn trim_file(path: &Path) -> Result<bool> {
    let img = image::open(path).with_context(|| format!("failed to load {}", path.display()))?;

    let Some((x, y, w, h)) = content_bbox(&img) else {
        // entirely background, nothing to anchor a crop on
        return Ok(false);
    };

    let (iw, ih) = img.dimensions();
    let proportion = f64::from(w) * f64::from(h) / (f64::from(iw) * f64::from(ih));
    if proportion >= MAX_BBOX_PROPORTION {
        return Ok(false);
    }

    img.crop_imm(x, y, w, h)
        .save(path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    Ok(true)
}

/// Trim every image in `dir` (parallel). Returns the number of files
/// rewritten; unreadable files are logged and skipped.
pub fn remove_borders(dir: &Path) -> Result<usize> {
    let files = media::list_images(dir)?;

    let bar = progress::stage_bar(files.len() as u64, "Trimming borders");
    let trimmed: usize = files
        .par_iter()
        .map(|path| {
            let n = match trim_file(path) {
                Ok(true) => 1,
                Ok(false) => 0,
                Err(e) => {
                    warn!("{:#}", e);
                    0
                }
            };
            bar.inc(1);
            n
        })
        .sum();
    bar.finish_and_clear();

    if trimmed > 0 {
        info!("trimmed borders on {} file(s) in {}", trimmed, dir.display());
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// White canvas with a black rectangle at (x, y, w, h)
    fn boxed_image(size: (u32, u32), rect: (u32, u32, u32, u32)) -> RgbImage {
        RgbImage::from_fn(size.0, size.1, |x, y| {
            let inside = x >= rect.0 && x < rect.0 + rect.2 && y >= rect.1 && y < rect.1 + rect.3;
            if inside { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        })
    }

    #[test]
    fn test_content_bbox_finds_rectangle() {
        let img = DynamicImage::ImageRgb8(boxed_image((50, 40), (20, 15, 10, 5)));
        assert_eq!(content_bbox(&img), Some((20, 15, 10, 5)));
    }

    #[test]
    fn test_content_bbox_uniform_image_is_none() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 30, Rgb([7, 7, 7])));
        assert_eq!(content_bbox(&img), None);
    }

    #[test]
    fn test_content_bbox_ignores_small_differences() {
        // 40 is below the threshold of 100, so near-background noise stays
        // part of the border
        let mut img = RgbImage::from_pixel(20, 20, Rgb([200, 200, 200]));
        img.put_pixel(3, 3, Rgb([170, 170, 170]));
        img.put_pixel(10, 10, Rgb([0, 0, 0]));
        let bbox = content_bbox(&DynamicImage::ImageRgb8(img));
        assert_eq!(bbox, Some((10, 10, 1, 1)));
    }

    #[test]
    fn test_trim_file_crops_and_overwrites() {
        let dir = temp_dir("dinsta_test_borders");
        let path = dir.join("user_5_2020-02-02_9.png");
        boxed_image((64, 48), (16, 8, 20, 24)).save(&path).unwrap();

        assert!(trim_file(&path).unwrap());
        let cropped = image::open(&path).unwrap();
        assert_eq!(cropped.dimensions(), (20, 24));

        // no uniform edge rows/columns are left after the crop
        assert!(content_bbox(&cropped).is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_trim_file_leaves_borderless_images_alone() {
        let dir = temp_dir("dinsta_test_borders_noop");
        let path = dir.join("user_5_2020-02-02_9.png");
        // content reaches every edge
        boxed_image((30, 30), (0, 0, 30, 30)).save(&path).unwrap();

        assert!(!trim_file(&path).unwrap());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_remove_borders_skips_unreadable_files() {
        let dir = temp_dir("dinsta_test_borders_bad");
        std::fs::write(dir.join("user_5_2020-02-02_9.jpg"), b"not an image").unwrap();
        boxed_image((40, 40), (10, 10, 8, 8))
            .save(dir.join("user_6_2020-02-03_10.png"))
            .unwrap();

        assert_eq!(remove_borders(&dir).unwrap(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
