//! Authentication primitives for the speech service.
//!
//! The service issues short-lived bearer tokens in exchange for a
//! subscription key. The key travels in the `Ocp-Apim-Subscription-Key`
//! header; the returned token is an opaque string valid for ten minutes
//! and is sent as `Authorization: Bearer ...` on synthesis requests.

use crate::error::{Result, VoiceDataError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Header carrying the subscription key on token and voice-list requests.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Tokens are valid for ten minutes.
pub const TOKEN_LIFETIME_SECS: i64 = 600;

/// Refresh this long before the nominal expiry so an in-flight request
/// never crosses the boundary with a stale token.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Service region hosting the subscription.
///
/// Each region exposes its own token, synthesis, and voice-list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRegion {
    WestUs,
    WestUs2,
    EastUs,
    EastUs2,
    CentralUs,
    WestEurope,
    NorthEurope,
    UkSouth,
    SoutheastAsia,
    EastAsia,
    JapanEast,
    AustraliaEast,
    BrazilSouth,
    CentralIndia,
}

impl ServiceRegion {
    /// The region identifier as it appears in service host names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WestUs => "westus",
            Self::WestUs2 => "westus2",
            Self::EastUs => "eastus",
            Self::EastUs2 => "eastus2",
            Self::CentralUs => "centralus",
            Self::WestEurope => "westeurope",
            Self::NorthEurope => "northeurope",
            Self::UkSouth => "uksouth",
            Self::SoutheastAsia => "southeastasia",
            Self::EastAsia => "eastasia",
            Self::JapanEast => "japaneast",
            Self::AustraliaEast => "australiaeast",
            Self::BrazilSouth => "brazilsouth",
            Self::CentralIndia => "centralindia",
        }
    }

    /// Token-issuing endpoint for this region.
    pub fn token_url(&self) -> String {
        format!(
            "https://{}.api.cognitive.microsoft.com/sts/v1.0/issueToken",
            self.as_str()
        )
    }

    /// Speech-synthesis endpoint for this region.
    pub fn synthesis_url(&self) -> String {
        format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.as_str()
        )
    }

    /// Voice-list endpoint for this region.
    pub fn voices_url(&self) -> String {
        format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/voices/list",
            self.as_str()
        )
    }
}

impl Default for ServiceRegion {
    fn default() -> Self {
        Self::WestUs
    }
}

impl fmt::Display for ServiceRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceRegion {
    type Err = VoiceDataError;

    fn from_str(s: &str) -> Result<Self> {
        let region = match s.trim().to_ascii_lowercase().as_str() {
            "westus" => Self::WestUs,
            "westus2" => Self::WestUs2,
            "eastus" => Self::EastUs,
            "eastus2" => Self::EastUs2,
            "centralus" => Self::CentralUs,
            "westeurope" => Self::WestEurope,
            "northeurope" => Self::NorthEurope,
            "uksouth" => Self::UkSouth,
            "southeastasia" => Self::SoutheastAsia,
            "eastasia" => Self::EastAsia,
            "japaneast" => Self::JapanEast,
            "australiaeast" => Self::AustraliaEast,
            "brazilsouth" => Self::BrazilSouth,
            "centralindia" => Self::CentralIndia,
            other => {
                return Err(VoiceDataError::InvalidInput(format!(
                    "unknown service region: {other}"
                )))
            }
        };
        Ok(region)
    }
}

/// A bearer token issued by the token endpoint, with its issue time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Opaque token string, sent verbatim after `Bearer `.
    pub token: String,

    /// When the token was obtained.
    pub issued_at: DateTime<Utc>,
}

impl AccessToken {
    /// Wrap a freshly issued token.
    pub fn new(token: String) -> Self {
        Self {
            token,
            issued_at: Utc::now(),
        }
    }

    /// Whether the token is past (or within the refresh margin of) its
    /// ten-minute lifetime.
    pub fn needs_refresh(&self) -> bool {
        let age = Utc::now().signed_duration_since(self.issued_at);
        age >= Duration::seconds(TOKEN_LIFETIME_SECS - TOKEN_REFRESH_MARGIN_SECS)
    }

    /// Value for the `Authorization` header.
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Details of a failed authentication attempt, as delivered to callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthFailure {
    /// HTTP status of the rejection, or `0` when no response was obtained.
    pub status_code: u16,

    /// Human-readable description of what went wrong.
    pub message: String,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}: {}", self.status_code, self.message)
    }
}

/// Completion handler for the callback form of `authenticate`.
///
/// Invoked exactly once per call with the HTTP status code and, on
/// failure, the failure details. Status `200` with `None` means success;
/// status `0` means the request never reached the service.
pub type AuthenticationCallback = Arc<dyn Fn(u16, Option<AuthFailure>) + Send + Sync>;
