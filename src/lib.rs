//! Downloads synthesized voice data from a cloud speech subscription and
//! extracts the resulting bin containers.
//!
//! Two components, connected only by the bin files that flow between
//! them:
//!
//! - [`VoiceDataDownloader`] holds a subscription key, exchanges it for a
//!   short-lived access token, and downloads one bin container per batch
//!   item into an output directory.
//! - [`extract_bin_files`] unpacks previously downloaded bin containers
//!   into an output directory.
//!
//! ```no_run
//! use voicedata::{extract_bin_files, VoiceDataDownloader};
//!
//! # async fn example() -> voicedata::Result<()> {
//! let downloader = VoiceDataDownloader::new("abc123")?;
//! downloader.authenticate().await?;
//!
//! let report = downloader
//!     .download_voice_data(
//!         vec![vec!["Hello world.".to_string()]],
//!         vec!["en-US".to_string()],
//!         vec!["en-US-JennyNeural".to_string()],
//!         vec!["medium".to_string()],
//!         "/tmp/out",
//!     )
//!     .await?;
//!
//! extract_bin_files(&report.bin_files(), "/tmp/out/extracted")?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod api;
pub mod container;
pub mod download;
pub mod error;
pub mod extract;
pub mod file;

// Re-export commonly used types for convenience
pub use api::{
    AuthFailure, AuthenticationCallback, OutputFormat, ServiceRegion, SpeechClient,
    VoiceDescription,
};
pub use download::{
    DownloadItem, DownloadProgress, DownloadReport, DownloadState, ProgressCallback,
    VoiceDataDownloader,
};
pub use error::{Result, VoiceDataError};
pub use extract::{extract_bin_files, ExtractReport};
