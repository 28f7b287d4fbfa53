use clap::Parser;
use std::path::PathBuf;

// Build version with scraper info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Scraper: instalooter (external, via PATH)\n",
    "Target: ",
    std::env::consts::ARCH,
    "-",
    std::env::consts::OS
);

/// Instagram profile archiver built on instalooter.
///
/// Downloads all media from the given profiles and optionally runs a sequence
/// of cleanup passes over the resulting image set. Scraping itself (auth,
/// pagination, rate limits) is instalooter's job; check its documentation for
/// anything related to talking to Instagram.
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None, disable_version_flag = true)]
pub struct Args {
    /// Instagram username(s) to download
    #[arg(value_name = "USERNAME", required = true)]
    pub usernames: Vec<String>,

    /// Remove duplicate images, keeping the one with highest resolution
    #[arg(short = 'd', long = "duplicates")]
    pub duplicates: bool,

    /// Remove monochromatic image borders
    #[arg(short = 'b', long = "borders")]
    pub borders: bool,

    /// Set image access and modification time to the Instagram post time
    #[arg(short = 't', long = "time")]
    pub time: bool,

    /// Copy like-count outliers (by windowed std. dev.) into abs_std/
    #[arg(short = 's', long = "sort")]
    pub sort: bool,

    /// Zero-pad like counts in file names, for viewers that only sort
    /// lexically
    #[arg(short = 'n', long = "normalize-likes")]
    pub normalize_likes: bool,

    /// Download videos too
    #[arg(short = 'v', long = "videos")]
    pub videos: bool,

    /// Download only videos, ignore images
    #[arg(short = 'V', long = "only-videos", conflicts_with = "videos")]
    pub only_videos: bool,

    /// Base directory for per-user download directories (default: current
    /// directory)
    #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// SSIM threshold above which two images count as duplicates
    #[arg(long = "threshold", value_name = "X", default_value_t = 0.8)]
    pub threshold: f64,

    /// Std. deviations above the window mean for a like-count outlier
    #[arg(long = "stds", value_name = "X", default_value_t = 2.0)]
    pub stds: f64,

    /// Window width for like-count statistics (default: max(count/10, 50))
    #[arg(long = "window-size", value_name = "N")]
    pub window_size: Option<usize>,

    /// Worker threads for the parallel stages (default: all cores)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Increase logging verbosity (default: warn; once: info, twice: debug,
    /// three+: trace)
    #[arg(long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Enable logging to file (default: dinsta.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Print version information
    ///
    /// -V is taken by --only-videos, so the shorthand clap normally claims
    /// for the version flag stays free.
    #[arg(long = "version", action = clap::ArgAction::Version, value_parser = clap::value_parser!(bool))]
    version: Option<bool>,
}
