//! Voice catalogue retrieval.

use crate::api::auth::SUBSCRIPTION_KEY_HEADER;
use crate::api::client::SpeechClient;
use crate::error::{Result, VoiceDataError};
use serde::{Deserialize, Serialize};

/// One entry of the service's voice catalogue.
///
/// Field names follow the service's JSON; only the fields this tool uses
/// are modelled, everything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceDescription {
    #[serde(rename = "Name")]
    pub name: String,

    /// The value accepted as a voice setting, e.g. `en-US-JennyNeural`.
    #[serde(rename = "ShortName")]
    pub short_name: String,

    #[serde(rename = "DisplayName", default)]
    pub display_name: Option<String>,

    #[serde(rename = "Locale")]
    pub locale: String,

    #[serde(rename = "Gender", default)]
    pub gender: Option<String>,

    #[serde(rename = "SampleRateHertz", default)]
    pub sample_rate_hertz: Option<String>,

    #[serde(rename = "VoiceType", default)]
    pub voice_type: Option<String>,
}

impl SpeechClient {
    /// List the voices available to this subscription's region.
    ///
    /// Authenticates with the subscription key directly; no bearer token
    /// is involved.
    pub async fn list_voices(&self) -> Result<Vec<VoiceDescription>> {
        let url = self.voices_endpoint();
        let response = self
            .http()
            .get(&url)
            .header(SUBSCRIPTION_KEY_HEADER, self.subscription_key())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            return Err(VoiceDataError::InvalidApiResponse {
                message: format!("voice list request failed with status {status}"),
                response_body: body,
            });
        }

        let voices: Vec<VoiceDescription> = response.json().await?;
        log::debug!("voice catalogue holds {} voices", voices.len());
        Ok(voices)
    }
}
