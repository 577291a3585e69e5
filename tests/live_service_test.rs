//! Live Service Integration Tests
//!
//! These tests connect to the actual speech service to verify:
//! 1. Token acquisition with a real subscription key
//! 2. Voice catalogue retrieval
//! 3. A complete download → extract round through the service
//!
//! # Running These Tests
//!
//! These tests are ignored by default. They need a valid subscription:
//!
//! ```bash
//! export VOICEDATA_SUBSCRIPTION_KEY=your-key
//! export VOICEDATA_REGION=westeurope   # optional, defaults to westus
//!
//! cargo test --test live_service_test -- --ignored --nocapture --test-threads=1
//! ```

use std::sync::Arc;
use voicedata::{extract_bin_files, DownloadItem, ServiceRegion, VoiceDataDownloader};

fn live_downloader() -> Option<VoiceDataDownloader> {
    let key = match std::env::var("VOICEDATA_SUBSCRIPTION_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            println!("VOICEDATA_SUBSCRIPTION_KEY not set, skipping live test");
            return None;
        }
    };

    let region: ServiceRegion = std::env::var("VOICEDATA_REGION")
        .ok()
        .and_then(|r| r.parse().ok())
        .unwrap_or_default();

    println!("using region {region}");
    Some(VoiceDataDownloader::with_region(key, region).expect("key accepted"))
}

#[tokio::test]
#[ignore] // Needs a live subscription
async fn test_01_authenticate() {
    let Some(downloader) = live_downloader() else {
        return;
    };

    let status = downloader.authenticate().await.expect("authentication");
    println!("✅ authenticated, status {status}");
    assert_eq!(status, 200);
}

#[tokio::test]
#[ignore] // Needs a live subscription
async fn test_02_list_voices() {
    let Some(downloader) = live_downloader() else {
        return;
    };

    let voices = downloader.client().list_voices().await.expect("voice list");
    println!("✅ {} voices available", voices.len());
    for voice in voices.iter().take(10) {
        println!("   {:40} {}", voice.short_name, voice.locale);
    }
    assert!(!voices.is_empty());
    assert!(voices.iter().any(|v| v.locale.starts_with("en-")));
}

#[tokio::test]
#[ignore] // Needs a live subscription
async fn test_03_download_and_extract() {
    let Some(mut downloader) = live_downloader() else {
        return;
    };

    downloader.set_progress_callback(Arc::new(|progress| {
        println!(
            "   item {} [{:?}] {}/{} segments, {} B/s",
            progress.item_index,
            progress.state,
            progress.segments_completed,
            progress.segment_count,
            progress.bytes_per_second
        );
    }));

    let status = downloader.authenticate().await.expect("authentication");
    assert_eq!(status, 200);

    let dir = tempfile::tempdir().expect("tempdir");
    let download_dir = dir.path().join("downloads");

    let items = vec![DownloadItem {
        text_segments: vec![
            "Hello from the live integration test.".to_string(),
            "This is the second segment.".to_string(),
        ],
        language: "en-US".to_string(),
        voice: "en-US-JennyNeural".to_string(),
        speaking_rate: "medium".to_string(),
    }];

    let report = downloader
        .download_batch(items, &download_dir)
        .await
        .expect("batch download");

    println!(
        "✅ download finished: {} completed, {} failed",
        report.completed(),
        report.failed()
    );
    assert!(report.is_all_completed());
    assert!(!downloader.download_in_progress());

    let bin_files = report.bin_files();
    assert_eq!(bin_files.len(), 1);

    let extract_dir = dir.path().join("extracted");
    let extraction = extract_bin_files(&bin_files, &extract_dir).expect("extraction");
    println!(
        "✅ extracted {} file(s) from {} bin file(s)",
        extraction.files_written().len(),
        extraction.outcomes.len()
    );

    assert_eq!(extraction.failed(), 0);
    assert_eq!(extraction.files_written().len(), 2);
    for path in extraction.files_written() {
        let bytes = std::fs::read(path).expect("extracted file readable");
        println!("   {} ({} bytes)", path.display(), bytes.len());
        // RIFF header of the default PCM output format.
        assert_eq!(&bytes[..4], b"RIFF");
    }
}
