//! Perceptual duplicate removal
//!
//! Instagram profiles often contain the same picture posted twice (reposts,
//! crops re-uploaded at a different size). Byte hashes miss those, so images
//! are compared perceptually instead.
//!
//! # Algorithm
//!
//! 1. Load every image as a 100x100 grayscale thumbnail (parallel)
//! 2. Sort thumbnails by top-left luma; only neighbors within 0.1 of each
//!    other are candidates, which keeps the scan near-linear in practice
//! 3. Score candidate pairs with mean SSIM over 7x7 windows
//! 4. A pair above the threshold is a duplicate: the file with the smaller
//!    source pixel count is deleted, the higher-resolution copy survives

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::imageops::FilterType;
use log::{info, warn};
use rayon::prelude::*;

use crate::media;
use crate::progress;

/// Thumbnails are compared at this square size
const THUMB_SIZE: u32 = 100;

/// SSIM window side length
const SSIM_WINDOW: usize = 7;

/// An anchor is only compared against thumbnails whose top-left luma is
/// within this distance (the candidate list is sorted by that value)
const LUMA_PRUNE: f32 = 0.1;

struct Thumb {
    path: PathBuf,
    /// `THUMB_SIZE` x `THUMB_SIZE` luma values in [0, 1], row-major
    luma: Vec<f32>,
    /// Pixel count of the source image, used to pick the survivor
    source_pixels: u64,
}

fn load_thumb(path: &Path) -> Option<Thumb> {
    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            warn!("could not load {}: {}", path.display(), e);
            return None;
        }
    };

    let source_pixels = u64::from(img.width()) * u64::from(img.height());
    let thumb = image::imageops::resize(
        &img.to_luma32f(),
        THUMB_SIZE,
        THUMB_SIZE,
        FilterType::Triangle,
    );

    Some(Thumb {
        path: path.to_path_buf(),
        luma: thumb.into_raw(),
        source_pixels,
    })
}

/// Mean SSIM of two equally-sized luma images over sliding 7x7 windows.
///
/// Standard constants for unit dynamic range; the result is 1.0 for
/// identical inputs and drops toward 0 (or below) as they diverge.
fn ssim(a: &[f32], b: &[f32], width: usize, height: usize) -> f64 {
    const C1: f64 = 0.01 * 0.01;
    const C2: f64 = 0.03 * 0.03;

    debug_assert_eq!(a.len(), width * height);
    debug_assert_eq!(b.len(), width * height);

    let n = (SSIM_WINDOW * SSIM_WINDOW) as f64;
    let mut total = 0.0;
    let mut windows = 0u64;

    for y in 0..=(height - SSIM_WINDOW) {
        for x in 0..=(width - SSIM_WINDOW) {
            let (mut sa, mut sb) = (0.0f64, 0.0f64);
            let (mut saa, mut sbb, mut sab) = (0.0f64, 0.0f64, 0.0f64);

            for dy in 0..SSIM_WINDOW {
                let row = (y + dy) * width + x;
                for dx in 0..SSIM_WINDOW {
                    let pa = f64::from(a[row + dx]);
                    let pb = f64::from(b[row + dx]);
                    sa += pa;
                    sb += pb;
                    saa += pa * pa;
                    sbb += pb * pb;
                    sab += pa * pb;
                }
            }

            let ma = sa / n;
            let mb = sb / n;
            let va = saa / n - ma * ma;
            let vb = sbb / n - mb * mb;
            let cov = sab / n - ma * mb;

            total += ((2.0 * ma * mb + C1) * (2.0 * cov + C2))
                / ((ma * ma + mb * mb + C1) * (va + vb + C2));
            windows += 1;
        }
    }

    total / windows as f64
}

/// Remove perceptual duplicates from `dir`, keeping the highest-resolution
/// copy of each duplicate set. Returns the number of files removed.
pub fn remove_duplicates(dir: &Path, threshold: f64) -> Result<usize> {
    let files = media::list_images(dir)?;

    let bar = progress::stage_bar(files.len() as u64, "Loading images");
    let mut thumbs: Vec<Thumb> = files
        .par_iter()
        .filter_map(|p| {
            let t = load_thumb(p);
            bar.inc(1);
            t
        })
        .collect();
    bar.finish_and_clear();

    thumbs.sort_by(|a, b| a.luma[0].total_cmp(&b.luma[0]));

    let bar = progress::stage_bar(thumbs.len() as u64, "Searching for duplicates");
    let side = THUMB_SIZE as usize;
    let mut removed = 0usize;

    let mut i = 0;
    while i < thumbs.len() {
        let mut j = i + 1;
        while j < thumbs.len() {
            // the list is sorted by top-left luma, so past this gap nothing
            // further can match either
            if (thumbs[j].luma[0] - thumbs[i].luma[0]).abs() > LUMA_PRUNE {
                break;
            }

            let score = ssim(&thumbs[i].luma, &thumbs[j].luma, side, side);
            if score > threshold {
                // delete the smaller copy; ties keep the anchor
                let victim = if thumbs[j].source_pixels > thumbs[i].source_pixels {
                    i
                } else {
                    j
                };
                info!(
                    "duplicate pair (ssim {:.3}): removing {}",
                    score,
                    thumbs[victim].path.display()
                );

                if let Err(e) = fs::remove_file(&thumbs[victim].path) {
                    warn!("could not remove {}: {}", thumbs[victim].path.display(), e);
                    j += 1;
                    continue;
                }

                removed += 1;
                thumbs.remove(victim);
                if victim == i {
                    // the anchor changed; restart its comparisons
                    j = i + 1;
                }
                // victim == j: the next candidate slid into j, don't advance
                continue;
            }

            j += 1;
        }
        bar.inc(1);
        i += 1;
    }
    bar.finish_and_clear();

    if removed > 0 {
        info!("removed {} duplicate file(s) from {}", removed, dir.display());
    }
    Ok(removed)
}
