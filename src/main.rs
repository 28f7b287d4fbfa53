use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{debug, error, info};

use dinsta::cli::Args;
use dinsta::engagement::SortOpts;
use dinsta::looter::DownloadOpts;
use dinsta::{borders, dedup, engagement, looter, normalize, timestamps};

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(&args);

    info!("dinsta starting...");
    debug!("command-line args: {:?}", args);

    if let Some(jobs) = args.jobs {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
        {
            error!("could not size the worker pool: {}", e);
        }
    }

    let base = args.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    let total = args.usernames.len();
    let mut failures = 0usize;
    for (i, user) in args.usernames.iter().enumerate() {
        println!("Downloading {} {}/{}...", user, i + 1, total);
        if let Err(e) = process_user(user, &base, &args) {
            error!("{}: {:#}", user, e);
            failures += 1;
        }
    }

    if failures > 0 {
        error!("{}/{} profile(s) failed", failures, total);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Download one profile and run the requested cleanup passes over its
/// directory, in the documented order: duplicates, borders, sort, time,
/// normalize.
fn process_user(user: &str, base: &Path, args: &Args) -> Result<()> {
    let dir = base.join(user);

    looter::download(
        user,
        &dir,
        DownloadOpts {
            videos: args.videos,
            only_videos: args.only_videos,
        },
    )?;

    if args.duplicates {
        dedup::remove_duplicates(&dir, args.threshold)?;
    }
    if args.borders {
        borders::remove_borders(&dir)?;
    }
    if args.sort {
        engagement::sort_by_std(
            &dir,
            &SortOpts {
                stds: args.stds,
                window_size: args.window_size,
            },
        )?;
    }
    if args.time {
        timestamps::set_dates(&dir)?;
    }
    if args.normalize_likes {
        normalize::normalize_likes(&dir)?;
    }

    Ok(())
}

// Determine log level based on verbosity flags
// 0 (default) = warn, 1 (--verbose) = info, 2 = debug, 3+ = trace
fn init_logger(args: &Args) {
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        // File logging with specified verbosity level
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("dinsta.log"));

        match std::fs::File::create(&log_path) {
            Ok(file) => {
                env_logger::Builder::new()
                    .filter_level(log_level)
                    .format_timestamp_millis()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
                info!(
                    "Logging to file: {} (level: {:?})",
                    log_path.display(),
                    log_level
                );
            }
            Err(e) => {
                env_logger::Builder::new().filter_level(log_level).init();
                error!("could not create log file {}: {}", log_path.display(), e);
            }
        }
    } else {
        // Console logging with specified verbosity level (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
}
