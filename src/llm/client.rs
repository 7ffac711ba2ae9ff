//! OpenAI-compatible chat client used to reconcile category tags.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::LlmConfig;
use crate::llm::{TagMergeError, TagMergeErrorKind};

/// Reconciles two tag lists into one, possibly renaming tags.
#[async_trait]
pub trait TagMerger: Send + Sync {
    async fn merge(
        &self,
        first: &[String],
        second: &[String],
    ) -> Result<Vec<String>, TagMergeError>;
}

const MERGE_TAGS_PROMPT: &str = r#"I will provide you with two lists of tags from different sources. These tags describe the type of cuisine or food offered by a restaurant.
Your task is to merge these lists into a single, cohesive list by selecting the most appropriate tags while avoiding redundancies or duplicates.
Ensure that the final list is coherent and accurately represents the style of cuisine or type of restaurant.
The names of the tags should be uniform, starting with a capital letter and using spaces where necessary.
You should remove "point of interest", "establishment", "restaurant" and "food" from the tags:
example: "Italian restaurant" -> "Italian"

Expected OUTPUT JSON object: {"tags": [string]}"#;

/// Tag merger backed by a chat-completions endpoint in JSON mode.
#[derive(Clone)]
pub struct LlmTagMerger {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct ExpectedAnswer {
    tags: Vec<String>,
}

impl LlmTagMerger {
    /// Builds the client. Fails with `AuthFailure` when no API key is available.
    pub fn new(config: &LlmConfig) -> Result<Self, TagMergeError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            TagMergeError::new(
                TagMergeErrorKind::AuthFailure,
                "no LLM API key configured (llm.api_key or DEEPSEEK_API_KEY)",
            )
        })?;

        // Overall call time is bounded by the engine, which falls back on timeout.
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn user_prompt(first: &[String], second: &[String]) -> String {
        format!("List 1: {}\nList 2: {}", first.join(", "), second.join(", "))
    }

    /// Extracts the tag list from a chat-completions response body.
    fn parse_answer(body: &str) -> Result<Vec<String>, TagMergeError> {
        let response: ApiResponse = serde_json::from_str(body)?;
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                TagMergeError::new(TagMergeErrorKind::Unknown, "LLM returned no choices")
            })?;

        let answer: ExpectedAnswer = serde_json::from_str(&content)?;
        Ok(answer.tags)
    }
}

#[async_trait]
impl TagMerger for LlmTagMerger {
    async fn merge(
        &self,
        first: &[String],
        second: &[String],
    ) -> Result<Vec<String>, TagMergeError> {
        let body = serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": MERGE_TAGS_PROMPT},
                {"role": "user", "content": Self::user_prompt(first, second)}
            ],
            "response_format": {"type": "json_object"},
            "temperature": 0.0
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(TagMergeError::from_status(status, &text));
        }

        tracing::debug!(
            "LLM tag merge answer: {}",
            text.chars().take(500).collect::<String>()
        );
        Self::parse_answer(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt() {
        let prompt = LlmTagMerger::user_prompt(
            &["Italian restaurant".to_string(), "Pasta".to_string()],
            &["Pizza".to_string()],
        );
        assert_eq!(prompt, "List 1: Italian restaurant, Pasta\nList 2: Pizza");
    }

    #[test]
    fn test_parse_answer() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"tags\":[\"Italian\",\"Pizza\"]}"}}]}"#;
        let tags = LlmTagMerger::parse_answer(body).unwrap();
        assert_eq!(tags, vec!["Italian", "Pizza"]);
    }

    #[test]
    fn test_parse_answer_without_choices() {
        let err = LlmTagMerger::parse_answer(r#"{"choices":[]}"#).unwrap_err();
        assert_eq!(err.kind, TagMergeErrorKind::Unknown);
    }

    #[test]
    fn test_parse_answer_with_wrong_shape() {
        let body = r#"{"choices":[{"message":{"content":"{\"categories\":[]}"}}]}"#;
        let err = LlmTagMerger::parse_answer(body).unwrap_err();
        assert_eq!(err.kind, TagMergeErrorKind::Unknown);
    }

    #[test]
    #[serial_test::serial]
    fn test_new_requires_api_key() {
        let config = LlmConfig {
            api_key: Some(String::new()),
            ..LlmConfig::default()
        };
        // Only meaningful when the env fallback is absent too.
        if std::env::var(crate::config::API_KEY_ENV).is_err() {
            let err = LlmTagMerger::new(&config).err().unwrap();
            assert_eq!(err.kind, TagMergeErrorKind::AuthFailure);
        }
    }
}
