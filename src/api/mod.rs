//! Speech service client: authentication, synthesis, and the voice
//! catalogue.

pub mod auth;
pub mod client;
pub mod voices;

// Re-export commonly used types
pub use auth::{AccessToken, AuthFailure, AuthenticationCallback, ServiceRegion};
pub use client::{ClientConfig, OutputFormat, SpeechClient, SynthesisRequest};
pub use voices::VoiceDescription;
