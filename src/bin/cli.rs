//! Desktop command-line front end.
//!
//! ```bash
//! # List the voices available to the subscription
//! voicedata-cli --key $KEY --region westeurope voices
//!
//! # Download a batch described by a JSON manifest
//! voicedata-cli --key $KEY download --manifest batch.json --output ./out
//!
//! # Extract downloaded bin files
//! voicedata-cli extract --output ./out/extracted ./out/*.bin
//! ```
//!
//! The manifest is a JSON array of download items:
//!
//! ```json
//! [{"text_segments": ["Hello."], "language": "en-US",
//!   "voice": "en-US-JennyNeural", "speaking_rate": "medium"}]
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use voicedata::{extract_bin_files, DownloadItem, ServiceRegion, VoiceDataDownloader};

#[derive(Parser)]
#[command(name = "voicedata-cli", version, about = "Download and extract cloud-synthesized voice data")]
struct Cli {
    /// Subscription key for the speech service
    #[arg(long, env = "VOICEDATA_SUBSCRIPTION_KEY", global = true, default_value = "")]
    key: String,

    /// Service region hosting the subscription
    #[arg(long, env = "VOICEDATA_REGION", global = true, default_value = "westus")]
    region: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the voices available to the subscription
    Voices,

    /// Download voice data for a batch manifest
    Download {
        /// JSON manifest describing the batch items
        #[arg(long)]
        manifest: PathBuf,

        /// Directory the bin files are written into
        #[arg(long)]
        output: PathBuf,
    },

    /// Extract previously downloaded bin files
    Extract {
        /// Directory the extracted voice files are written into
        #[arg(long)]
        output: PathBuf,

        /// Bin files to extract
        #[arg(required = true)]
        bin_files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let Cli {
        key,
        region,
        command,
    } = Cli::parse();

    match command {
        Command::Voices => {
            let downloader = downloader(&key, &region)?;
            let voices = downloader.client().list_voices().await?;
            println!("{} voice(s) available in {region}:", voices.len());
            for voice in voices {
                println!(
                    "  {:40} {:8} {}",
                    voice.short_name,
                    voice.locale,
                    voice.display_name.unwrap_or_default()
                );
            }
        }

        Command::Download { manifest, output } => {
            let downloader = downloader(&key, &region)?;
            let json = fs::read_to_string(&manifest)
                .with_context(|| format!("reading manifest {}", manifest.display()))?;
            let items: Vec<DownloadItem> =
                serde_json::from_str(&json).context("parsing manifest")?;

            let status = downloader.authenticate().await?;
            println!("authenticated (status {status})");

            let report = downloader.download_batch(items, &output).await?;
            for outcome in &report.outcomes {
                match (&outcome.bin_file, &outcome.error) {
                    (Some(path), _) => println!(
                        "item {}: {} ({} segment(s))",
                        outcome.item_index,
                        path.display(),
                        outcome.segments_written
                    ),
                    (None, Some(error)) => {
                        println!("item {}: FAILED - {error}", outcome.item_index)
                    }
                    (None, None) => unreachable!("outcome without file or error"),
                }
            }
            println!(
                "{} completed, {} failed",
                report.completed(),
                report.failed()
            );
            if !report.is_all_completed() {
                bail!("{} item(s) failed", report.failed());
            }
        }

        Command::Extract { output, bin_files } => {
            let report = extract_bin_files(&bin_files, &output)?;
            for outcome in &report.outcomes {
                match &outcome.error {
                    None => println!(
                        "{}: {} file(s)",
                        outcome.bin_file.display(),
                        outcome.files_written.len()
                    ),
                    Some(error) => println!("{}: FAILED - {error}", outcome.bin_file.display()),
                }
            }
            println!(
                "{} of {} bin file(s) extracted",
                report.extracted(),
                report.outcomes.len()
            );
            if report.failed() > 0 {
                bail!("{} bin file(s) failed to extract", report.failed());
            }
        }
    }

    Ok(())
}

fn downloader(key: &str, region: &str) -> anyhow::Result<VoiceDataDownloader> {
    let region: ServiceRegion = region.parse()?;
    Ok(VoiceDataDownloader::with_region(key, region)?)
}
