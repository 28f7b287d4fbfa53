//! Image listing and filename metadata
//!
//! **Why**: Every post-processing stage operates on the image set produced by
//! the scraper, and most of them need the metadata the download template bakes
//! into each name (`<prefix>_<likes>_<date>_<id>.<ext>`).
//!
//! **Used by**: dedup, borders, timestamps, engagement, normalize

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// File extensions the post-processing stages operate on
pub const IMAGE_EXTS: &[&str] = &["jpg", "png"];

/// Date format used by the download template
pub const DATE_FMT: &str = "%Y-%m-%d";

/// Check if a path looks like a processable image file
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| IMAGE_EXTS.contains(&s.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// List the image files directly inside `dir`, sorted by name.
///
/// Subdirectories (e.g. a previous run's `abs_std/`) are not descended into.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    files.sort();
    Ok(files)
}

// Prefix never contains `_` (the template strips it from the username), so a
// plain underscore split is unambiguous.
static META_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<prefix>[^_]+)_(?P<likes>\d+)_(?P<date>\d{4}-\d{2}-\d{2})_(?P<id>[^_]+)$")
        .expect("static pattern")
});

/// Post metadata embedded in a downloaded file's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMeta {
    /// Username with underscores removed (the template prefix)
    pub prefix: String,
    /// Like count at download time
    pub likes: u64,
    /// Post date
    pub date: NaiveDate,
    /// Instagram media id
    pub id: String,
}

impl PostMeta {
    /// Parse metadata from a file name produced by the download template.
    ///
    /// Returns `None` for names that don't match (files dropped into the
    /// directory by hand, sidecar files, etc.) so callers can skip them.
    pub fn parse(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let caps = META_RE.captures(stem)?;

        let likes = caps["likes"].parse::<u64>().ok()?;
        let date = NaiveDate::parse_from_str(&caps["date"], DATE_FMT).ok()?;

        Some(Self {
            prefix: caps["prefix"].to_string(),
            likes,
            date,
            id: caps["id"].to_string(),
        })
    }

    /// Reformat as a file name, zero-padding the like count to `pad` digits.
    ///
    /// `parse` of the result yields the same metadata: padding never changes
    /// the integer value of the like count.
    pub fn file_name(&self, ext: &str, pad: usize) -> String {
        format!(
            "{}_{:0pad$}_{}_{}.{}",
            self.prefix,
            self.likes,
            self.date.format(DATE_FMT),
            self.id,
            ext,
        )
    }
}
