//! Offline contract tests for the download and extraction flow.
//!
//! Everything here runs without a subscription or network access: the
//! networked half is exercised against unroutable endpoint overrides,
//! and the bin flow is exercised through the container codec directly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use voicedata::api::{AuthenticationCallback, ClientConfig, SpeechClient};
use voicedata::container::BinWriter;
use voicedata::{extract_bin_files, ServiceRegion, VoiceDataDownloader, VoiceDataError};

/// An endpoint nothing listens on; requests fail fast without leaving
/// the machine.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:9/token";

fn offline_downloader() -> VoiceDataDownloader {
    let config = ClientConfig {
        token_endpoint: Some(DEAD_ENDPOINT.to_string()),
        synthesis_endpoint: Some(DEAD_ENDPOINT.to_string()),
        voices_endpoint: Some(DEAD_ENDPOINT.to_string()),
        request_timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    };
    let client = SpeechClient::with_config("abc123", ServiceRegion::WestUs, config).unwrap();
    VoiceDataDownloader::with_client(client)
}

#[test]
fn test_construction_echoes_key_exactly() {
    let downloader = VoiceDataDownloader::new("abc123").unwrap();
    assert_eq!(downloader.subscription_key(), "abc123");

    let downloader = VoiceDataDownloader::new("  spaced key  ").unwrap();
    assert_eq!(downloader.subscription_key(), "  spaced key  ");
}

#[test]
fn test_construction_rejects_empty_key() {
    assert!(matches!(
        VoiceDataDownloader::new(""),
        Err(VoiceDataError::InvalidInput(_))
    ));
    assert!(VoiceDataDownloader::new("\t \n").is_err());
}

#[tokio::test]
async fn test_mismatched_sequence_lengths_rejected_before_any_work() {
    let downloader = offline_downloader();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out");

    let err = downloader
        .download_voice_data(
            vec![vec!["a".to_string()], vec!["b".to_string()]],
            vec!["en-US".to_string()],
            vec!["en-US-JennyNeural".to_string(); 2],
            vec!["medium".to_string(); 2],
            &output,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, VoiceDataError::InvalidInput(_)));
    // Rejected before touching the filesystem.
    assert!(!output.exists());
    assert!(!downloader.download_in_progress());
}

#[tokio::test]
async fn test_download_in_progress_false_around_failed_batch() {
    let downloader = offline_downloader();
    let dir = tempfile::tempdir().unwrap();

    assert!(!downloader.download_in_progress());

    // The synthesis endpoint is dead, so the single item fails; the flag
    // must still come back down.
    let report = downloader
        .download_voice_data(
            vec![vec!["hello".to_string()]],
            vec!["en-US".to_string()],
            vec!["en-US-JennyNeural".to_string()],
            vec!["medium".to_string()],
            dir.path(),
        )
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert!(!downloader.download_in_progress());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_authenticate_callback_invoked_exactly_once_on_failure() {
    let downloader = offline_downloader();

    let invocations = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::sync_channel(2);

    let counter = invocations.clone();
    let callback: AuthenticationCallback = Arc::new(move |status_code, failure| {
        counter.fetch_add(1, Ordering::SeqCst);
        // No HTTP response was obtained, so the status is 0 and the
        // failure detail is present.
        assert_eq!(status_code, 0);
        assert!(failure.is_some());
        tx.send(()).unwrap();
    });

    downloader.authenticate_with(Some(callback));

    rx.recv_timeout(Duration::from_secs(10))
        .expect("callback was never invoked");
    // Give a buggy double-invocation a moment to show up.
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_authenticate_without_callback_still_executes() {
    let downloader = offline_downloader();
    // Nothing to observe directly; the call must not panic and the task
    // must complete on its own.
    downloader.authenticate_with(None);
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_async_authenticate_reports_transport_failure() {
    let downloader = offline_downloader();
    let err = downloader.authenticate().await.unwrap_err();
    assert!(matches!(err, VoiceDataError::Network(_)));
}

#[test]
fn test_bin_files_extract_end_to_end() {
    // The downloaded artifact, as the downloader writes it: one
    // container holding the item's synthesized segments.
    let dir = tempfile::tempdir().unwrap();
    let download_dir = dir.path().join("downloads");
    std::fs::create_dir_all(&download_dir).unwrap();

    let mut writer = BinWriter::new();
    writer.push("voice_000_jenny_000.wav", b"RIFFfake-audio-one".to_vec());
    writer.push("voice_000_jenny_001.wav", b"RIFFfake-audio-two".to_vec());
    let bin_path = download_dir.join("voice_000_jenny.bin");
    writer.write_to(&bin_path).unwrap();

    let extract_dir = dir.path().join("extracted");
    let report = extract_bin_files(&[&bin_path], &extract_dir).unwrap();

    assert_eq!(report.extracted(), 1);
    assert_eq!(report.failed(), 0);
    let written = report.files_written();
    assert_eq!(written.len(), 2);
    assert_eq!(
        std::fs::read(extract_dir.join("voice_000_jenny_000.wav")).unwrap(),
        b"RIFFfake-audio-one"
    );
    assert_eq!(
        std::fs::read(extract_dir.join("voice_000_jenny_001.wav")).unwrap(),
        b"RIFFfake-audio-two"
    );
}

#[test]
fn test_extract_empty_input_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never_created");

    let report = extract_bin_files::<&std::path::Path>(&[], &output).unwrap();
    assert_eq!(report.outcomes.len(), 0);
    assert!(!output.exists());
}

#[test]
fn test_region_endpoints_are_well_formed() {
    for region in [
        ServiceRegion::WestUs,
        ServiceRegion::EastUs,
        ServiceRegion::WestEurope,
        ServiceRegion::SoutheastAsia,
    ] {
        let token = region.token_url();
        let synthesis = region.synthesis_url();
        assert!(token.starts_with("https://"));
        assert!(token.ends_with("/sts/v1.0/issueToken"));
        assert!(synthesis.contains(".tts.speech.microsoft.com/"));
    }
}
