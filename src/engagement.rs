//! Engagement outliers
//!
//! Copies posts whose like count stands out from their neighborhood into an
//! `abs_std/` subdirectory, named by a zero-padded engagement score so any
//! viewer that sorts lexically shows them best-first.
//!
//! A sliding window over the date-ordered timeline is used instead of global
//! statistics: accounts grow, so 10k likes may be ordinary today but
//! exceptional two years ago.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::media::{self, PostMeta};
use crate::stats;

/// Subdirectory receiving the outlier copies
pub const OUTLIER_DIR: &str = "abs_std";

/// Minimum window width when none is given
const MIN_WINDOW: usize = 50;

/// Digits in the score-based file names
const SCORE_DIGITS: usize = 6;

/// Tuning for the outlier scan
#[derive(Debug, Clone, Copy)]
pub struct SortOpts {
    /// Window standard deviations above the window mean a like count must
    /// exceed to count as an outlier
    pub stds: f64,
    /// Window width; `None` means `max(count / 10, 50)`
    pub window_size: Option<usize>,
}

impl Default for SortOpts {
    fn default() -> Self {
        Self {
            stds: 2.0,
            window_size: None,
        }
    }
}

/// Engagement score: like count relative to the window mean, scaled to an
/// integer (1000 = exactly average).
fn score(likes: u64, window_avg: f64) -> u64 {
    (likes as f64 / window_avg * 1000.0).round() as u64
}

/// Scan the date-ordered timeline of `dir` and copy like-count outliers into
/// `abs_std/`. The subdirectory is rebuilt from scratch on every run.
/// Returns the number of copies made.
pub fn sort_by_std(dir: &Path, opts: &SortOpts) -> Result<usize> {
    let mut posts: Vec<(PostMeta, PathBuf)> = media::list_images(dir)?
        .into_iter()
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("jpg"))
        })
        .filter_map(|p| PostMeta::parse(&p).map(|m| (m, p)))
        .collect();
    posts.sort_by_key(|(meta, _)| meta.date);

    let out = dir.join(OUTLIER_DIR);
    if out.exists() {
        fs::remove_dir_all(&out)
            .with_context(|| format!("failed to clear {}", out.display()))?;
    }
    fs::create_dir(&out).with_context(|| format!("failed to create {}", out.display()))?;

    if posts.is_empty() {
        return Ok(0);
    }

    let window = opts
        .window_size
        .unwrap_or_else(|| (posts.len() / 10).max(MIN_WINDOW));
    let likes: Vec<f64> = posts.iter().map(|(m, _)| m.likes as f64).collect();

    let mut copied = 0usize;
    for (i, (meta, path)) in posts.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (start + window).min(posts.len());
        let slice = &likes[start..end];

        let avg = stats::mean(slice);
        let sd = stats::std_dev(slice);
        if avg <= 0.0 {
            continue;
        }

        if meta.likes as f64 > avg + sd * opts.stds {
            let mut name = format!("{:0width$}.jpg", score(meta.likes, avg), width = SCORE_DIGITS);
            // two outliers can land on the same score; keep both
            if out.join(&name).exists() {
                name = format!(
                    "{:0width$}_{}.jpg",
                    score(meta.likes, avg),
                    meta.id,
                    width = SCORE_DIGITS
                );
            }

            debug!(
                "outlier: {} ({} likes, window avg {:.1}, sd {:.1})",
                path.display(),
                meta.likes,
                avg,
                sd
            );
            fs::copy(path, out.join(&name))
                .with_context(|| format!("failed to copy {}", path.display()))?;
            copied += 1;
        }
    }

    info!("copied {} outlier(s) into {}", copied, out.display());
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// 60 ordinary posts with 100 likes and one viral post
    fn seed_timeline(dir: &Path) {
        for i in 0..60u32 {
            let name = format!("user_100_2020-01-{:02}_{}.jpg", (i % 28) + 1, i);
            fs::write(dir.join(name), b"img").unwrap();
        }
        fs::write(dir.join("user_10000_2020-01-15_999.jpg"), b"viral").unwrap();
    }

    #[test]
    fn test_sort_by_std_copies_outlier() {
        let dir = temp_dir("dinsta_test_engagement");
        seed_timeline(&dir);

        let copied = sort_by_std(&dir, &SortOpts::default()).unwrap();
        assert_eq!(copied, 1);

        let out: Vec<_> = fs::read_dir(dir.join(OUTLIER_DIR))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().into_string().unwrap())
            .collect();
        assert_eq!(out.len(), 1);
        // zero-padded score, well above 1000 (= window average)
        assert_eq!(out[0].len(), "000000.jpg".len());
        assert!(out[0] > "001000.jpg".to_string());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_sort_by_std_rebuilds_output_dir() {
        let dir = temp_dir("dinsta_test_engagement_rebuild");
        seed_timeline(&dir);

        sort_by_std(&dir, &SortOpts::default()).unwrap();
        fs::write(dir.join(OUTLIER_DIR).join("stale.jpg"), b"old").unwrap();

        sort_by_std(&dir, &SortOpts::default()).unwrap();
        assert!(!dir.join(OUTLIER_DIR).join("stale.jpg").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_sort_by_std_flat_timeline_has_no_outliers() {
        let dir = temp_dir("dinsta_test_engagement_flat");
        for i in 0..20u32 {
            let name = format!("user_100_2020-02-{:02}_{}.jpg", (i % 28) + 1, i);
            fs::write(dir.join(name), b"img").unwrap();
        }

        assert_eq!(sort_by_std(&dir, &SortOpts::default()).unwrap(), 0);
        assert!(dir.join(OUTLIER_DIR).is_dir());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_score_scaling() {
        assert_eq!(score(100, 100.0), 1000);
        assert_eq!(score(250, 100.0), 2500);
        assert_eq!(score(50, 100.0), 500);
    }
}
