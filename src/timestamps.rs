//! File time rewriting
//!
//! Downloads carry the time of the scrape, which makes "sort by date" in file
//! managers useless for archives. This stage sets access and modification
//! times back to the post date taken from the file name.

use std::fs::{File, FileTimes};
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use log::{debug, info};

use crate::media::{self, PostMeta};

/// `SystemTime` for local midnight of the post date.
///
/// The template only records a day, so midnight is the best resolution
/// available.
pub fn post_time(meta: &PostMeta) -> Option<SystemTime> {
    let midnight = meta.date.and_hms_opt(0, 0, 0)?;
    let local = Local.from_local_datetime(&midnight).earliest()?;
    Some(SystemTime::from(local))
}

/// Set access and modification times of every parseable image in `dir` to
/// its post date. Returns the number of files updated.
pub fn set_dates(dir: &Path) -> Result<usize> {
    let mut updated = 0usize;

    for path in media::list_images(dir)? {
        let Some(meta) = PostMeta::parse(&path) else {
            debug!(
                "skipping {}: name does not match the archive template",
                path.display()
            );
            continue;
        };
        let Some(time) = post_time(&meta) else {
            continue;
        };

        let file = File::options()
            .write(true)
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
            .with_context(|| format!("failed to set times on {}", path.display()))?;
        updated += 1;
    }

    info!("re-timed {} file(s) in {}", updated, dir.display());
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_set_dates_rewrites_mtime() {
        let dir = temp_dir("dinsta_test_timestamps");
        let path = dir.join("user_10_2019-05-04_123.jpg");
        fs::write(&path, b"jpeg bytes don't matter here").unwrap();

        assert_eq!(set_dates(&dir).unwrap(), 1);

        let meta = PostMeta::parse(&path).unwrap();
        let expected = post_time(&meta).unwrap();
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(mtime, expected);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_set_dates_skips_unparseable_names() {
        let dir = temp_dir("dinsta_test_timestamps_skip");
        fs::write(dir.join("random.jpg"), b"x").unwrap();

        assert_eq!(set_dates(&dir).unwrap(), 0);

        let _ = fs::remove_dir_all(&dir);
    }
}
