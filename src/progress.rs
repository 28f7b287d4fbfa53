//! Progress bars shared by the post-processing stages

use indicatif::{ProgressBar, ProgressStyle};

/// Create a bar for a per-file stage (`msg` names the stage)
pub fn stage_bar(len: u64, msg: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:<26} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
            .expect("static template")
            .progress_chars("█▓░"),
    );
    bar.set_message(msg);
    bar
}
