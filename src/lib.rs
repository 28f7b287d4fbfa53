//! DINSTA - Instagram profile archiver library
//!
//! Thin wrapper around the external `instalooter` scraper plus a set of
//! post-download cleanup passes over the resulting image set. Re-exports all
//! modules for use by the binary target.

// Scraper delegation and CLI surface
pub mod cli;
pub mod looter;

// Post-processing stages
pub mod borders;
pub mod dedup;
pub mod engagement;
pub mod normalize;
pub mod timestamps;

// Shared helpers
pub mod media;
pub mod progress;
pub mod stats;

// Re-export commonly used types
pub use cli::Args;
pub use engagement::SortOpts;
pub use looter::DownloadOpts;
pub use media::PostMeta;
