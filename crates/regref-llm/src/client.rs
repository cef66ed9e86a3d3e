use crate::LlmError;

/// Settings for the chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API, without trailing slash.
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.0,
        }
    }
}

/// Thin chat-completions client. One operation: messages in, the first
/// choice's text content out. Everything above this (prompting, parsing,
/// validation) lives in [`crate::normalizer`] and [`crate::oneshot`].
pub struct ChatClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// POST one chat completion and return the assistant text.
    pub async fn complete(
        &self,
        system: &str,
        user_content: serde_json::Value,
    ) -> Result<String, LlmError> {
        let api_key = self.config.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.config.api_base);

        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user_content },
            ],
        });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!(
                "HTTP {}: {}",
                status,
                regref_core::truncate_payload(&detail)
            )));
        }

        let data: serde_json::Value = resp.json().await?;
        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                LlmError::Api(format!(
                    "response has no text content: {}",
                    regref_core::truncate_payload(&data.to_string())
                ))
            })?;
        tracing::debug!(model = %self.config.model, chars = content.len(), "completion received");
        Ok(content.to_string())
    }
}

/// Strip a Markdown code fence wrapper, if present, and return the inner
/// payload. Models frequently wrap JSON output in ```json fences.
pub(crate) fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("[1]"), "[1]");
        assert_eq!(strip_code_fence("  [1, 2]  "), "[1, 2]");
    }
}
