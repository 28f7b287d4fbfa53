//! Delegation to the external `instalooter` scraper
//!
//! All interaction with Instagram (auth, pagination, rate limiting) happens
//! inside instalooter. This module only builds the command line, picks the
//! filename template the rest of the pipeline relies on, and reports the
//! child's exit status.

use std::io;
use std::path::Path;
use std::process::Command;

use anyhow::{Result, anyhow, bail};
use log::{debug, info};

/// Download options forwarded to the scraper
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadOpts {
    /// Download videos in addition to pictures
    pub videos: bool,
    /// Download only videos
    pub only_videos: bool,
}

/// Filename prefix used in the download template.
///
/// Underscores are removed so the `_`-separated metadata fields stay
/// unambiguous; a leading dot is stripped so no download ends up hidden.
pub fn template_prefix(username: &str) -> String {
    let stripped = username.replace('_', "");
    let stripped = stripped.trim();
    stripped.strip_prefix('.').unwrap_or(stripped).to_string()
}

/// Template passed to instalooter: `<prefix>_{likescount}_{date}_{id}`
pub fn template(username: &str) -> String {
    format!("{}_{{likescount}}_{{date}}_{{id}}", template_prefix(username))
}

/// Run `instalooter user <username> <dest>` with the archive template.
///
/// Stdio is inherited so instalooter's own progress bars reach the terminal.
/// Scraper failures (missing user, auth, network) show up as a non-zero exit
/// status and are surfaced as-is; there is no retry logic here.
pub fn download(username: &str, dest: &Path, opts: DownloadOpts) -> Result<()> {
    let mut cmd = Command::new("instalooter");
    cmd.arg("user")
        .arg(username)
        .arg(dest)
        .arg("-T")
        .arg(template(username));

    if opts.only_videos {
        cmd.arg("-V");
    } else if opts.videos {
        cmd.arg("-v");
    }

    debug!("running {:?}", cmd);
    let status = cmd.status().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            anyhow!("`instalooter` not found on PATH (install it with `pip install instalooter`)")
        } else {
            anyhow!("failed to run instalooter: {}", e)
        }
    })?;

    if !status.success() {
        bail!("instalooter exited with {} for user `{}`", status, username);
    }

    info!("downloaded profile `{}` into {}", username, dest.display());
    Ok(())
}
