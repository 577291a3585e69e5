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

//! HTTP client for the speech service.
//!
//! `SpeechClient` owns the subscription key and a cached access token,
//! exchanges the key for tokens on demand, and performs synthesis
//! requests. Synthesis posts an SSML document and receives the encoded
//! audio bytes back.

use crate::api::auth::{AccessToken, ServiceRegion, SUBSCRIPTION_KEY_HEADER};
use crate::error::{Result, VoiceDataError};
use futures_util::StreamExt;
use reqwest::header;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Header selecting the synthesis audio encoding.
pub const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";

/// Tunables for the underlying HTTP client.
///
/// The endpoint overrides exist for tests and for sovereign-cloud hosts;
/// when unset, the region's standard endpoints are used.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub request_timeout: Duration,
    pub token_endpoint: Option<String>,
    pub synthesis_endpoint: Option<String>,
    pub voices_endpoint: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("voicedata/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(30),
            token_endpoint: None,
            synthesis_endpoint: None,
            voices_endpoint: None,
        }
    }
}

/// Audio encoding of the synthesized payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Riff16KhzMonoPcm,
    Riff24KhzMonoPcm,
    Mp3_16Khz128Kbit,
    Mp3_24Khz160Kbit,
}

impl OutputFormat {
    /// Value for the `X-Microsoft-OutputFormat` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Riff16KhzMonoPcm => "riff-16khz-16bit-mono-pcm",
            Self::Riff24KhzMonoPcm => "riff-24khz-16bit-mono-pcm",
            Self::Mp3_16Khz128Kbit => "audio-16khz-128kbitrate-mono-mp3",
            Self::Mp3_24Khz160Kbit => "audio-24khz-160kbitrate-mono-mp3",
        }
    }

    /// Extension for files holding a payload in this encoding.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Riff16KhzMonoPcm | Self::Riff24KhzMonoPcm => "wav",
            Self::Mp3_16Khz128Kbit | Self::Mp3_24Khz160Kbit => "mp3",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Riff24KhzMonoPcm
    }
}

/// One synthesis unit: a text segment plus its voice settings.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub language: String,
    pub voice: String,
    pub speaking_rate: String,
    pub output_format: OutputFormat,
}

impl SynthesisRequest {
    /// Render the request as the SSML document the service expects.
    ///
    /// The speaking rate lands on a `prosody` element; all attribute and
    /// text content is XML-escaped.
    pub fn to_ssml(&self) -> String {
        let lang = escape_xml(&self.language);
        format!(
            "<speak version='1.0' xml:lang='{lang}'>\
             <voice xml:lang='{lang}' name='{voice}'>\
             <prosody rate='{rate}'>{text}</prosody>\
             </voice></speak>",
            voice = escape_xml(&self.voice),
            rate = escape_xml(&self.speaking_rate),
            text = escape_xml(&self.text),
        )
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Client for the token, synthesis, and voice-list endpoints.
///
/// Cheap to clone; clones share the cached access token.
#[derive(Clone)]
pub struct SpeechClient {
    http: reqwest::Client,
    subscription_key: String,
    region: ServiceRegion,
    config: ClientConfig,
    token: Arc<Mutex<Option<AccessToken>>>,
}

impl SpeechClient {
    /// Create a client for the given subscription key and region.
    ///
    /// Fails with `InvalidInput` when the key is empty or blank.
    pub fn new(subscription_key: impl Into<String>, region: ServiceRegion) -> Result<Self> {
        Self::with_config(subscription_key, region, ClientConfig::default())
    }

    pub fn with_config(
        subscription_key: impl Into<String>,
        region: ServiceRegion,
        config: ClientConfig,
    ) -> Result<Self> {
        let subscription_key = subscription_key.into();
        if subscription_key.trim().is_empty() {
            return Err(VoiceDataError::InvalidInput(
                "subscription key must not be empty".to_string(),
            ));
        }

        for endpoint in [
            &config.token_endpoint,
            &config.synthesis_endpoint,
            &config.voices_endpoint,
        ]
        .into_iter()
        .flatten()
        {
            url::Url::parse(endpoint).map_err(|e| {
                VoiceDataError::InvalidInput(format!("invalid endpoint override '{endpoint}': {e}"))
            })?;
        }

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            subscription_key,
            region,
            config,
            token: Arc::new(Mutex::new(None)),
        })
    }

    /// The subscription key this client was constructed with, verbatim.
    pub fn subscription_key(&self) -> &str {
        &self.subscription_key
    }

    pub fn region(&self) -> ServiceRegion {
        self.region
    }

    fn token_endpoint(&self) -> String {
        self.config
            .token_endpoint
            .clone()
            .unwrap_or_else(|| self.region.token_url())
    }

    fn synthesis_endpoint(&self) -> String {
        self.config
            .synthesis_endpoint
            .clone()
            .unwrap_or_else(|| self.region.synthesis_url())
    }

    pub(crate) fn voices_endpoint(&self) -> String {
        self.config
            .voices_endpoint
            .clone()
            .unwrap_or_else(|| self.region.voices_url())
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Exchange the subscription key for a fresh access token.
    ///
    /// On success the token is cached for subsequent synthesis calls and
    /// the HTTP status code (200) is returned.
    ///
    /// # Errors
    /// - `AuthenticationFailed` - the endpoint rejected the key
    /// - `Network` - the request never completed
    pub async fn authenticate(&self) -> Result<u16> {
        let (status, token) = self.request_token().await?;
        *self.token.lock().await = Some(token);
        log::debug!("authenticated against {}", self.token_endpoint());
        Ok(status)
    }

    async fn request_token(&self) -> Result<(u16, AccessToken)> {
        let url = self.token_endpoint();
        let response = self
            .http
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .header(header::CONTENT_LENGTH, 0)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceDataError::AuthenticationFailed {
                status_code: status.as_u16(),
                message: if body.is_empty() {
                    "subscription key rejected".to_string()
                } else {
                    body
                },
            });
        }

        let token = response.text().await?;
        if token.trim().is_empty() {
            return Err(VoiceDataError::InvalidApiResponse {
                message: "token endpoint returned an empty body".to_string(),
                response_body: None,
            });
        }

        Ok((status.as_u16(), AccessToken::new(token)))
    }

    /// A token string valid for at least the refresh margin, acquiring or
    /// renewing one as needed.
    async fn bearer_token(&self) -> Result<String> {
        {
            let guard = self.token.lock().await;
            if let Some(token) = guard.as_ref() {
                if !token.needs_refresh() {
                    return Ok(token.token.clone());
                }
            }
        }

        log::debug!("access token missing or stale, requesting a new one");
        let (_, token) = self.request_token().await?;
        let value = token.token.clone();
        *self.token.lock().await = Some(token);
        Ok(value)
    }

    /// Synthesize one text segment and return the encoded audio bytes.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>> {
        self.synthesize_with(request, |_, _| {}).await
    }

    /// Synthesize one text segment, reporting `(bytes_received,
    /// total_bytes)` to `observer` as the response body streams in.
    pub async fn synthesize_with<F>(
        &self,
        request: &SynthesisRequest,
        mut observer: F,
    ) -> Result<Vec<u8>>
    where
        F: FnMut(u64, Option<u64>),
    {
        let token = self.bearer_token().await?;
        let url = self.synthesis_endpoint();
        let ssml = request.to_ssml();

        let response = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/ssml+xml")
            .header(OUTPUT_FORMAT_HEADER, request.output_format.as_str())
            .body(ssml)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            return Err(VoiceDataError::InvalidApiResponse {
                message: format!("synthesis request failed with status {status}"),
                response_body: body,
            });
        }

        let total_bytes = response.content_length();
        let mut audio: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            audio.extend_from_slice(&chunk);
            observer(audio.len() as u64, total_bytes);
        }

        if audio.is_empty() {
            return Err(VoiceDataError::InvalidApiResponse {
                message: "synthesis returned an empty audio payload".to_string(),
                response_body: None,
            });
        }

        log::debug!(
            "synthesized {} bytes for voice '{}'",
            audio.len(),
            request.voice
        );
        Ok(audio)
    }
}
