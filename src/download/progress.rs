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

//! Download progress tracking and reporting.
//!
//! One batch item produces one `ProgressTracker`. The tracker counts
//! synthesized segments and streamed bytes, smooths a transfer-speed
//! estimate, and throttles how often snapshots reach the caller's
//! callback.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

/// Progress snapshot for one batch item, as delivered to callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// Index of the item within its batch.
    pub item_index: usize,

    /// Output file stem of the item's bin file.
    pub label: String,

    /// Segments fully synthesized so far.
    pub segments_completed: usize,

    /// Total segments in this item.
    pub segment_count: usize,

    /// Bytes received for the segment currently streaming.
    pub bytes_received: u64,

    /// Size of the current segment, when the service announced one.
    pub total_bytes: Option<u64>,

    /// Smoothed transfer speed in bytes per second.
    pub bytes_per_second: u64,

    /// Current download state.
    pub state: DownloadState,

    /// Error message when `state` is `Failed`.
    pub error_message: Option<String>,
}

impl DownloadProgress {
    pub fn new(item_index: usize, label: String, segment_count: usize) -> Self {
        Self {
            item_index,
            label,
            segments_completed: 0,
            segment_count,
            bytes_received: 0,
            total_bytes: None,
            bytes_per_second: 0,
            state: DownloadState::Pending,
            error_message: None,
        }
    }

    /// Completed fraction over the item's segments (0.0 - 1.0).
    pub fn as_fraction(&self) -> f64 {
        if self.segment_count == 0 {
            0.0
        } else {
            self.segments_completed as f64 / self.segment_count as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == DownloadState::Completed
    }
}

/// Download state of one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadState {
    /// Not started yet.
    Pending,
    /// Segments are being synthesized and streamed.
    Downloading,
    /// The item's bin file has been written.
    Completed,
    /// The item failed; see `error_message`.
    Failed,
}

/// Type alias for progress callback functions.
///
/// Uses Arc instead of Box so the callback can be shared with spawned
/// work.
pub type ProgressCallback = Arc<dyn Fn(DownloadProgress) + Send + Sync>;

/// Tracks one item's progress and throttles snapshot emission.
pub struct ProgressTracker {
    progress: DownloadProgress,
    speed: AverageSpeed,
    last_emit: Instant,
    emit_interval_ms: u64,
}

impl ProgressTracker {
    pub fn new(item_index: usize, label: String, segment_count: usize) -> Self {
        Self {
            progress: DownloadProgress::new(item_index, label, segment_count),
            speed: AverageSpeed::new(),
            last_emit: Instant::now(),
            emit_interval_ms: 200,
        }
    }

    /// Record streamed bytes for the current segment.
    pub fn update_bytes(&mut self, bytes_received: u64, total_bytes: Option<u64>) {
        self.speed.add_position(bytes_received);
        self.progress.bytes_received = bytes_received;
        self.progress.total_bytes = total_bytes;
        self.progress.bytes_per_second = self.speed.average();
    }

    /// Record one fully synthesized segment and reset the byte counters
    /// for the next one.
    pub fn segment_done(&mut self) {
        self.progress.segments_completed += 1;
        self.progress.bytes_received = 0;
        self.progress.total_bytes = None;
        self.speed = AverageSpeed::new();
    }

    pub fn set_state(&mut self, state: DownloadState) {
        self.progress.state = state;
    }

    pub fn set_error(&mut self, error: String) {
        self.progress.state = DownloadState::Failed;
        self.progress.error_message = Some(error);
    }

    /// Whether enough time has passed since the last emitted snapshot.
    pub fn should_emit(&self) -> bool {
        self.last_emit.elapsed().as_millis() >= self.emit_interval_ms as u128
    }

    pub fn mark_emitted(&mut self) {
        self.last_emit = Instant::now();
    }

    pub fn snapshot(&self) -> DownloadProgress {
        self.progress.clone()
    }
}

/// Rolling average transfer speed over the most recent position samples.
pub struct AverageSpeed {
    samples: VecDeque<(Instant, u64)>,
    max_samples: usize,
}

impl AverageSpeed {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::new(),
            // ~2 seconds of history at the 200ms emit cadence
            max_samples: 10,
        }
    }

    pub fn add_position(&mut self, position: u64) {
        self.samples.push_back((Instant::now(), position));
        if self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
    }

    /// Average speed in bytes per second over the retained window.
    pub fn average(&self) -> u64 {
        let (first, last) = match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) if self.samples.len() >= 2 => (first, last),
            _ => return 0,
        };

        let bytes = last.1.saturating_sub(first.1);
        let elapsed = last.0.duration_since(first.0).as_secs_f64();
        if elapsed > 0.0 {
            (bytes as f64 / elapsed) as u64
        } else {
            0
        }
    }
}

impl Default for AverageSpeed {
    fn default() -> Self {
        Self::new()
    }
}
