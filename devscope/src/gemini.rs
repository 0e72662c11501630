// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Gemini `generateContent` client.
///
/// Issues exactly one request per call and never retries.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::Error, insight::TextGenerator};

const SERVICE: &str = "gemini";
/// Public Gemini API endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Model used when the configuration does not name one.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize,)]
struct GenerateRequest<'prompt,>
{
    contents: [RequestContent<'prompt,>; 1],
}

#[derive(Debug, Serialize,)]
struct RequestContent<'prompt,>
{
    parts: [RequestPart<'prompt,>; 1],
}

#[derive(Debug, Serialize,)]
struct RequestPart<'prompt,>
{
    text: &'prompt str,
}

#[derive(Debug, Default, Deserialize,)]
#[serde(default)]
struct GenerateResponse
{
    candidates: Vec<Candidate,>,
}

#[derive(Debug, Default, Deserialize,)]
#[serde(default)]
struct Candidate
{
    content: Option<ResponseContent,>,
}

#[derive(Debug, Default, Deserialize,)]
#[serde(default)]
struct ResponseContent
{
    parts: Vec<ResponsePart,>,
}

#[derive(Debug, Default, Deserialize,)]
#[serde(default)]
struct ResponsePart
{
    text: Option<String,>,
}

impl GenerateResponse
{
    /// Concatenated text of the first candidate.
    fn into_text(self,) -> Option<String,>
    {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|part| part.text,).collect();
        if text.trim().is_empty() { None } else { Some(text,) }
    }
}

/// HTTP client for the Gemini text generation API.
#[derive(Clone,)]
pub struct GeminiClient
{
    http:     reqwest::Client,
    base_url: String,
    api_key:  String,
    model:    String,
}

impl std::fmt::Debug for GeminiClient
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("GeminiClient",)
            .field("base_url", &self.base_url,)
            .field("api_key", &"<redacted>",)
            .field("model", &self.model,)
            .finish()
    }
}

impl GeminiClient
{
    /// Builds a client for `model`.
    ///
    /// `timeout` bounds each HTTP exchange end to end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String,>,
        model: impl Into<String,>,
        base_url: impl Into<String,>,
        timeout: Duration,
    ) -> Result<Self, Error,>
    {
        let http = reqwest::Client::builder().timeout(timeout,).build().map_err(|e| {
            Error::configuration(format!("failed to initialize Gemini client: {e}"),)
        },)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/',).to_owned(),
            api_key: api_key.into(),
            model: model.into(),
        },)
    }

    pub fn model(&self,) -> &str
    {
        &self.model
    }

    fn endpoint(&self,) -> String
    {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient
{
    async fn generate(&self, prompt: &str,) -> Result<String, Error,>
    {
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart {
                    text: prompt,
                }],
            }],
        };

        debug!("Requesting generation from {} ({} prompt bytes)", self.model, prompt.len());
        let response = self
            .http
            .post(self.endpoint(),)
            .header("x-goog-api-key", &self.api_key,)
            .json(&request,)
            .send()
            .await
            .map_err(|e| Error::upstream(SERVICE, e.to_string(),),)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body.trim(),),);
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("malformed response: {e}"),),)?;

        payload.into_text().ok_or_else(|| Error::generation("response contained no text",),)
    }
}

fn classify_status(status: StatusCode, body: &str,) -> Error
{
    let message = format!("HTTP {}: {body}", status.as_u16());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::unauthorized(SERVICE, message,),
        StatusCode::TOO_MANY_REQUESTS => Error::upstream(SERVICE, message,),
        status if status.is_server_error() => Error::upstream(SERVICE, message,),
        _ => Error::generation(message,),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn request_matches_generate_content_shape()
    {
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart {
                    text: "hello",
                }],
            }],
        };
        let json = serde_json::to_value(&request,).expect("serialization failed",);
        assert_eq!(json, serde_json::json!({ "contents": [{ "parts": [{ "text": "hello" }] }] }));
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate()
    {
        let payload: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Rust, " }, { "text": "Go" }], "role": "model" } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }),)
        .expect("valid payload",);
        assert_eq!(payload.into_text().as_deref(), Some("Rust, Go"));
    }

    #[test]
    fn blocked_response_has_no_text()
    {
        let payload: GenerateResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }),)
        .expect("valid payload",);
        assert!(payload.into_text().is_none());
    }

    #[test]
    fn status_classification()
    {
        assert!(matches!(classify_status(StatusCode::FORBIDDEN, "",), Error::Unauthorized { .. }));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "quota",),
            Error::Upstream { .. }
        ));
        assert!(matches!(classify_status(StatusCode::BAD_GATEWAY, "",), Error::Upstream { .. }));
        assert!(matches!(classify_status(StatusCode::BAD_REQUEST, "",), Error::Generation { .. }));
    }

    #[test]
    fn debug_output_redacts_api_key()
    {
        let client = GeminiClient::new(
            "secret-key",
            DEFAULT_GEMINI_MODEL,
            format!("{DEFAULT_GEMINI_BASE_URL}/"),
            Duration::from_secs(5,),
        )
        .expect("client builds",);
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert_eq!(client.endpoint(), format!("{DEFAULT_GEMINI_BASE_URL}/v1beta/models/gemini-2.0-flash:generateContent"));
    }
}
