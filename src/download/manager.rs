// voicedata - cloud speech voice-data downloader
// Copyright (C) 2026 voicedata contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Batch download orchestration.
//!
//! `VoiceDataDownloader` authenticates against the speech service and
//! downloads one bin container per batch item into an output directory.
//! Only one batch may be in flight per downloader; the in-progress flag
//! is observable and a second call is rejected while it is set.

use crate::api::auth::{AuthFailure, AuthenticationCallback};
use crate::api::client::{OutputFormat, SpeechClient, SynthesisRequest};
use crate::api::ServiceRegion;
use crate::container::BinWriter;
use crate::download::progress::{DownloadState, ProgressCallback, ProgressTracker};
use crate::error::{Result, VoiceDataError};
use crate::file::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One download unit: the text segments and voice settings that produce
/// one bin file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadItem {
    /// Text segments synthesized into separate payloads of the same bin
    /// container.
    pub text_segments: Vec<String>,

    /// Language tag, e.g. `en-US`.
    pub language: String,

    /// Voice name, e.g. `en-US-JennyNeural`.
    pub voice: String,

    /// Speaking rate for the prosody element, e.g. `medium` or `+20%`.
    pub speaking_rate: String,
}

impl DownloadItem {
    /// Stem for the item's bin file and its entry names.
    fn file_stem(&self, index: usize) -> String {
        format!("voice_{index:03}_{}", paths::sanitize_file_name(&self.voice))
    }
}

/// What happened to one item of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub item_index: usize,

    /// Path of the written bin file, when the item succeeded.
    pub bin_file: Option<PathBuf>,

    /// Payload entries written into the bin file.
    pub segments_written: usize,

    /// Failure description, when the item did not succeed.
    pub error: Option<String>,
}

impl ItemOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-item outcomes of one batch download.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl DownloadReport {
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }

    pub fn is_all_completed(&self) -> bool {
        self.failed() == 0
    }

    /// Paths of every bin file the batch produced.
    pub fn bin_files(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| o.bin_file.as_deref())
            .collect()
    }
}

/// Downloads synthesized voice data for batches of texts and settings.
pub struct VoiceDataDownloader {
    client: SpeechClient,
    output_format: OutputFormat,
    progress_callback: Option<ProgressCallback>,
    download_in_progress: Arc<AtomicBool>,
}

impl VoiceDataDownloader {
    /// Create a downloader for the given subscription key in the default
    /// region.
    ///
    /// Fails with `InvalidInput` when the key is empty or blank.
    pub fn new(subscription_key: impl Into<String>) -> Result<Self> {
        Self::with_region(subscription_key, ServiceRegion::default())
    }

    pub fn with_region(
        subscription_key: impl Into<String>,
        region: ServiceRegion,
    ) -> Result<Self> {
        Ok(Self::with_client(SpeechClient::new(subscription_key, region)?))
    }

    /// Wrap an already configured client.
    pub fn with_client(client: SpeechClient) -> Self {
        Self {
            client,
            output_format: OutputFormat::default(),
            progress_callback: None,
            download_in_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The subscription key supplied at construction, verbatim.
    pub fn subscription_key(&self) -> &str {
        self.client.subscription_key()
    }

    /// Whether a batch download is currently executing.
    pub fn download_in_progress(&self) -> bool {
        self.download_in_progress.load(Ordering::SeqCst)
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress_callback = Some(callback);
    }

    pub fn client(&self) -> &SpeechClient {
        &self.client
    }

    /// Authenticate against the token endpoint.
    ///
    /// Returns the HTTP status code (200) on success; the token is cached
    /// inside the client for the batch download to use.
    pub async fn authenticate(&self) -> Result<u16> {
        self.client.authenticate().await
    }

    /// Callback form of [`authenticate`](Self::authenticate).
    ///
    /// Runs the token request on the ambient tokio runtime and invokes
    /// `callback` exactly once with `(status_code, failure)`. Status `0`
    /// means no HTTP response was obtained. Without a callback the
    /// request still runs; its result is only logged.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn authenticate_with(&self, callback: Option<AuthenticationCallback>) {
        let client = self.client.clone();
        tokio::spawn(async move {
            let (status_code, failure) = match client.authenticate().await {
                Ok(status_code) => (status_code, None),
                Err(VoiceDataError::AuthenticationFailed {
                    status_code,
                    message,
                }) => (
                    status_code,
                    Some(AuthFailure {
                        status_code,
                        message,
                    }),
                ),
                Err(err) => (
                    0,
                    Some(AuthFailure {
                        status_code: 0,
                        message: err.to_string(),
                    }),
                ),
            };

            match &failure {
                None => log::info!("authentication succeeded with status {status_code}"),
                Some(failure) => log::warn!("authentication failed: {failure}"),
            }

            if let Some(callback) = callback {
                callback(status_code, failure);
            }
        });
    }

    /// Download voice data for four index-aligned settings sequences.
    ///
    /// Index `i` of `texts` (the segments of one item), `language_settings`,
    /// `voice_settings`, and `speaking_rate_settings` together describe one
    /// download unit; the sequences must have equal lengths or the call is
    /// rejected before any network or filesystem activity.
    pub async fn download_voice_data(
        &self,
        texts: Vec<Vec<String>>,
        language_settings: Vec<String>,
        voice_settings: Vec<String>,
        speaking_rate_settings: Vec<String>,
        output_dir: impl AsRef<Path>,
    ) -> Result<DownloadReport> {
        let items = zip_settings(
            texts,
            language_settings,
            voice_settings,
            speaking_rate_settings,
        )?;
        self.download_batch(items, output_dir).await
    }

    /// Download voice data for a list of batch items.
    ///
    /// One bin container is written per item. Per-item failures are
    /// recorded in the report and logged; they do not abort the remaining
    /// items. `Err` is reserved for conditions that invalidate the whole
    /// call: a batch already in flight, or an unusable output directory.
    pub async fn download_batch(
        &self,
        items: Vec<DownloadItem>,
        output_dir: impl AsRef<Path>,
    ) -> Result<DownloadReport> {
        let _guard = DownloadGuard::acquire(&self.download_in_progress)?;
        let output_dir = output_dir.as_ref();

        if items.is_empty() {
            log::debug!("empty batch, nothing to download");
            return Ok(DownloadReport::default());
        }

        paths::prepare_output_dir(output_dir)?;
        log::info!(
            "downloading voice data for {} item(s) into {}",
            items.len(),
            output_dir.display()
        );

        let mut outcomes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.download_item(index, item, output_dir).await {
                Ok((bin_file, segments_written)) => {
                    log::info!(
                        "item {index}: wrote {} segment(s) to {}",
                        segments_written,
                        bin_file.display()
                    );
                    outcomes.push(ItemOutcome {
                        item_index: index,
                        bin_file: Some(bin_file),
                        segments_written,
                        error: None,
                    });
                }
                Err(err) => {
                    log::warn!("item {index} failed: {err}");
                    outcomes.push(ItemOutcome {
                        item_index: index,
                        bin_file: None,
                        segments_written: 0,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        let report = DownloadReport { outcomes };
        log::info!(
            "batch finished: {} completed, {} failed",
            report.completed(),
            report.failed()
        );
        Ok(report)
    }

    async fn download_item(
        &self,
        index: usize,
        item: &DownloadItem,
        output_dir: &Path,
    ) -> Result<(PathBuf, usize)> {
        if item.text_segments.is_empty() {
            return Err(VoiceDataError::InvalidInput(
                "download item has no text segments".to_string(),
            ));
        }
        if item.voice.trim().is_empty() || item.language.trim().is_empty() {
            return Err(VoiceDataError::InvalidInput(
                "download item needs a language and a voice".to_string(),
            ));
        }

        let stem = item.file_stem(index);
        let mut tracker = ProgressTracker::new(index, stem.clone(), item.text_segments.len());
        tracker.set_state(DownloadState::Downloading);
        self.emit(&tracker);

        let extension = self.output_format.file_extension();
        let mut writer = BinWriter::new();

        for (segment_index, text) in item.text_segments.iter().enumerate() {
            if text.trim().is_empty() {
                log::warn!("item {index}: skipping empty text segment {segment_index}");
                tracker.segment_done();
                continue;
            }

            let request = SynthesisRequest {
                text: text.clone(),
                language: item.language.clone(),
                voice: item.voice.clone(),
                speaking_rate: item.speaking_rate.clone(),
                output_format: self.output_format,
            };

            let result = self
                .client
                .synthesize_with(&request, |received, total| {
                    tracker.update_bytes(received, total);
                    if tracker.should_emit() {
                        if let Some(callback) = &self.progress_callback {
                            callback(tracker.snapshot());
                        }
                        tracker.mark_emitted();
                    }
                })
                .await;

            let audio = match result {
                Ok(audio) => audio,
                Err(err) => {
                    tracker.set_error(err.to_string());
                    self.emit(&tracker);
                    return Err(err);
                }
            };

            writer.push(format!("{stem}_{segment_index:03}.{extension}"), audio);
            tracker.segment_done();
            self.emit(&tracker);
        }

        if writer.is_empty() {
            return Err(VoiceDataError::InvalidInput(
                "download item has only empty text segments".to_string(),
            ));
        }

        let segments_written = writer.entry_count();
        let bin_file = paths::unique_path(output_dir, &format!("{stem}.bin"));
        tokio::fs::write(&bin_file, writer.to_bytes()).await?;

        tracker.set_state(DownloadState::Completed);
        self.emit(&tracker);
        Ok((bin_file, segments_written))
    }

    fn emit(&self, tracker: &ProgressTracker) {
        if let Some(callback) = &self.progress_callback {
            callback(tracker.snapshot());
        }
    }
}

/// Turn the four parallel settings sequences into batch items, rejecting
/// mismatched lengths.
fn zip_settings(
    texts: Vec<Vec<String>>,
    language_settings: Vec<String>,
    voice_settings: Vec<String>,
    speaking_rate_settings: Vec<String>,
) -> Result<Vec<DownloadItem>> {
    let len = texts.len();
    if language_settings.len() != len
        || voice_settings.len() != len
        || speaking_rate_settings.len() != len
    {
        return Err(VoiceDataError::InvalidInput(format!(
            "settings sequences must have equal lengths \
             (texts: {len}, languages: {}, voices: {}, speaking rates: {})",
            language_settings.len(),
            voice_settings.len(),
            speaking_rate_settings.len()
        )));
    }

    let items = texts
        .into_iter()
        .zip(language_settings)
        .zip(voice_settings)
        .zip(speaking_rate_settings)
        .map(
            |(((text_segments, language), voice), speaking_rate)| DownloadItem {
                text_segments,
                language,
                voice,
                speaking_rate,
            },
        )
        .collect();
    Ok(items)
}

/// Clears the in-progress flag when the batch scope ends, on every exit
/// path.
struct DownloadGuard {
    flag: Arc<AtomicBool>,
}

impl DownloadGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(VoiceDataError::DownloadInProgress);
        }
        Ok(Self { flag: flag.clone() })
    }
}

impl Drop for DownloadGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
