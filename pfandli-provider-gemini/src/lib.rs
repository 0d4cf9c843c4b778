//! Classification provider speaking to a Gemini-style `generateContent` API.
//!
//! The oracle receives the instruction prompt plus the image as inline
//! base64 data and answers with free-form text. No schema is assumed beyond
//! "natural-language text"; interpreting the answer is the core gate's job.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pfandli_core::ports::{ClassifierPort, ImageData, PortError};

const BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Classifier implementation for the Gemini REST API.
pub struct GeminiClassifier {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClassifier {
    /// Create a classifier against the public endpoint with the default model.
    #[must_use]
    pub fn new<K: Into<String>>(client: Client, api_key: K) -> Self {
        Self::with_base_url(client, BASE_URL, api_key)
    }

    /// Create a classifier against a custom endpoint (local gateways, tests).
    #[must_use]
    pub fn with_base_url<U: Into<String>, K: Into<String>>(
        client: Client,
        base_url: U,
        api_key: K,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ClassifierPort for GeminiClassifier {
    async fn classify(&self, image: &ImageData, prompt: &str) -> Result<String, PortError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt.to_owned()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type.clone(),
                            data: BASE64.encode(&image.bytes),
                        }),
                    },
                ],
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response: GenerateResponse = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .filter_map(|part| part.text)
            .collect::<Vec<String>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(PortError::Classification(String::from(
                "oracle returned no text",
            )));
        }

        debug!(chars = text.len(), "oracle answered");
        Ok(text)
    }
}
