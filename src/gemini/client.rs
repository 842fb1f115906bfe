use async_trait::async_trait;
use log::info;
use reqwest::Client;

use crate::error::{ classify_api_error, ApiErrorKind, GenerateError };
use super::types::{ ApiErrorBody, GenerateContentRequest, GenerateContentResponse };

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Backend seam for the image model. The studio only talks to this trait;
/// tests script it with a mock.
#[async_trait]
pub trait ImageModelClient: Send + Sync {
    async fn generate(
        &self,
        request: GenerateContentRequest
    ) -> Result<GenerateContentResponse, GenerateError>;
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, GenerateError> {
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(GenerateError::MissingCredential);
        }

        Ok(Self {
            http: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ImageModelClient for GeminiClient {
    async fn generate(
        &self,
        request: GenerateContentRequest
    ) -> Result<GenerateContentResponse, GenerateError> {
        info!(
            "GeminiClient::generate → model={} content_blocks={}",
            self.model,
            request.contents.len()
        );

        let response = self.http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send().await?;

        let http_status = response.status();
        let body = response.text().await?;

        if !http_status.is_success() {
            let (api_status, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(parsed) => (Some(parsed.error.status), parsed.error.message),
                Err(_) => (None, format!("HTTP {}: {}", http_status.as_u16(), truncate(&body, 200))),
            };
            let kind = classify_api_error(
                Some(http_status.as_u16()),
                api_status.as_deref(),
                &message
            );
            return Err(GenerateError::api(kind, message));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(reason) = safety_block_reason(&parsed) {
            return Err(
                GenerateError::api(ApiErrorKind::SafetyFilter, format!("blocked ({})", reason))
            );
        }

        Ok(parsed)
    }
}

/// A response blocked by safety filtering carries no usable parts; surface it
/// as a classified error rather than an empty result.
fn safety_block_reason(response: &GenerateContentResponse) -> Option<String> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Some(reason.clone());
        }
    }

    let has_parts = response.candidates
        .iter()
        .any(|c| c.content.as_ref().is_some_and(|content| !content.parts.is_empty()));
    if has_parts {
        return None;
    }

    response.candidates
        .iter()
        .filter_map(|c| c.finish_reason.as_deref())
        .find(|reason| reason.contains("SAFETY") || reason.contains("PROHIBITED"))
        .map(|reason| reason.to_string())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::types::{ Candidate, Content, ContentPart, PromptFeedback };

    #[test]
    fn blank_api_key_is_rejected_before_any_network_call() {
        assert!(matches!(
            GeminiClient::new("   ".to_string(), None, None),
            Err(GenerateError::MissingCredential)
        ));
    }

    #[test]
    fn endpoint_joins_base_url_and_model() {
        let client = GeminiClient::new(
            "k".to_string(),
            Some("gemini-2.5-flash-image-preview".to_string()),
            Some("https://example.test/v1beta/".to_string())
        ).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash-image-preview:generateContent"
        );
    }

    #[test]
    fn block_reason_in_prompt_feedback_is_a_safety_block() {
        let response = GenerateContentResponse {
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some("SAFETY".to_string()),
            }),
            ..Default::default()
        };
        assert_eq!(safety_block_reason(&response).as_deref(), Some("SAFETY"));
    }

    #[test]
    fn safety_finish_reason_without_parts_is_a_safety_block() {
        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: None,
                finish_reason: Some("IMAGE_SAFETY".to_string()),
            }],
            ..Default::default()
        };
        assert!(safety_block_reason(&response).is_some());
    }

    #[test]
    fn responses_with_parts_are_not_safety_blocks() {
        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: None,
                    parts: vec![ContentPart::text("hello")],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            ..Default::default()
        };
        assert!(safety_block_reason(&response).is_none());
    }
}
