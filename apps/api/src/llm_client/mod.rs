/// Completion client — the single point of entry for all calls to the
/// external text/image generation service.
///
/// ARCHITECTURAL RULE: no other module may call the completion API directly.
/// All generation traffic MUST go through this module.
///
/// There is deliberately no retry/backoff here: a failed call surfaces a
/// typed error to the caller unrecovered.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

/// The model used for every text completion call.
pub const CHAT_MODEL: &str = "gpt-3.5-turbo";
/// The model used for image generation.
pub const IMAGE_MODEL: &str = "dall-e-2";
/// Fixed resolution for generated post images.
pub const DEFAULT_PICTURE_SIZE: &str = "256x256";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("completion service returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single completion client shared by all services.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CompletionClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Makes a single chat completion call and returns the first choice's
    /// text content.
    pub async fn complete(&self, prompt: &str, system: &str) -> Result<String, CompletionError> {
        let request_body = ChatRequest {
            model: CHAT_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(CompletionError::EmptyContent)?;

        debug!("Completion call succeeded ({} chars)", content.len());
        Ok(content)
    }

    /// Convenience method that calls the service and deserializes the text
    /// response as JSON. The prompt must instruct the model to return valid
    /// JSON.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, CompletionError> {
        let text = self.complete(prompt, system).await?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&text);

        serde_json::from_str(text).map_err(CompletionError::Parse)
    }

    /// Submits an image prompt at the given resolution and returns the URL of
    /// the single generated image.
    pub async fn generate_image(
        &self,
        prompt: &str,
        size: &str,
    ) -> Result<String, CompletionError> {
        let request_body = ImageRequest {
            model: IMAGE_MODEL,
            prompt,
            size,
            quality: "standard",
            n: 1,
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let images: ImageResponse = response.json().await?;
        images
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or(CompletionError::EmptyContent)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"caption1\": \"a\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"caption1\": \"a\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"caption1\": \"a\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"caption1\": \"a\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"caption1\": \"a\"}";
        assert_eq!(strip_json_fences(input), "{\"caption1\": \"a\"}");
    }

    #[test]
    fn test_chat_response_extracts_first_choice() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "hello"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn test_image_response_extracts_url() {
        let json = r#"{"created": 0, "data": [{"url": "https://img.example/a.png"}]}"#;
        let response: ImageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.data.into_iter().next().and_then(|d| d.url),
            Some("https://img.example/a.png".to_string())
        );
    }

    #[test]
    fn test_api_error_body_parses() {
        let json = r#"{"error": {"message": "invalid api key", "type": "auth"}}"#;
        let err: ApiError = serde_json::from_str(json).unwrap();
        assert_eq!(err.error.message, "invalid api key");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = CompletionClient::new("key".to_string(), "http://localhost:9/v1/".to_string());
        assert_eq!(client.base_url, "http://localhost:9/v1");
    }
}
