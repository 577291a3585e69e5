//! Batch download of synthesized voice data.
//!
//! This module turns batches of texts and voice settings into bin
//! containers on disk, with progress reporting along the way.

pub mod manager;
pub mod progress;

// Re-export commonly used types
pub use manager::{DownloadItem, DownloadReport, ItemOutcome, VoiceDataDownloader};
pub use progress::{DownloadProgress, DownloadState, ProgressCallback};
