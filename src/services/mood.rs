// SPDX-License-Identifier: MIT

//! Genre-to-color generation via the OpenAI chat API.

use crate::error::AppError;
use crate::services::gradient;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Asks a chat model for three hex colors matching a set of genres.
#[derive(Clone)]
pub struct MoodColorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MoodColorClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// Three hex colors evoking the mood of exactly three genres.
    pub async fn generate_colors(&self, genres: &[String]) -> Result<Vec<String>, AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "OpenAI API key not configured"
            )));
        }

        let prompt = format!(
            "Give me three hex color codes that capture the mood of these music \
             genres: {}. Respond with only the three hex codes separated by \
             commas, nothing else.",
            genres.join(", ")
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": MODEL,
                "messages": [{"role": "user", "content": prompt}],
            }))
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "OpenAI color generation failed");
            return Err(AppError::Internal(anyhow::anyhow!(
                "OpenAI returned {}: {}",
                status,
                body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("OpenAI response parse: {}", e)))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        parse_color_reply(content)
    }
}

/// Parse a comma-separated model reply into exactly three valid hex colors.
fn parse_color_reply(reply: &str) -> Result<Vec<String>, AppError> {
    let colors: Vec<String> = reply
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if colors.len() != 3 {
        return Err(AppError::Internal(anyhow::anyhow!(
            "Expected 3 colors, model returned: {}",
            reply
        )));
    }

    for color in &colors {
        gradient::parse_hex(color)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Model returned invalid color: {}", color)))?;
    }

    Ok(colors)
}
