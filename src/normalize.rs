//! Like-count normalization
//!
//! Pads the like-count field of every file name with leading zeros to the
//! width of the directory's maximum, so viewers that only sort lexically
//! order the set numerically. Padding never changes the parsed value.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::media::{self, PostMeta};

/// Rename every parseable image in `dir` with a zero-padded like count.
/// Returns the number of files renamed; already-padded names are left alone.
pub fn normalize_likes(dir: &Path) -> Result<usize> {
    let posts: Vec<_> = media::list_images(dir)?
        .into_iter()
        .filter_map(|p| PostMeta::parse(&p).map(|m| (p, m)))
        .collect();

    let Some(max_likes) = posts.iter().map(|(_, m)| m.likes).max() else {
        return Ok(0);
    };
    let pad = max_likes.to_string().len();

    let mut renamed = 0usize;
    for (path, meta) in posts {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };

        let target = path.with_file_name(meta.file_name(ext, pad));
        if target == path {
            continue;
        }

        debug!("renaming {} -> {}", path.display(), target.display());
        fs::rename(&path, &target)
            .with_context(|| format!("failed to rename {}", path.display()))?;
        renamed += 1;
    }

    info!("normalized {} file name(s) in {}", renamed, dir.display());
    Ok(renamed)
}
