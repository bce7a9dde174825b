use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::config::LlmConfig;
use crate::core::llm::{GenerationRequest, LlmProvider};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResContent>,
}

#[derive(Deserialize)]
struct GeminiResContent {
    #[serde(default)]
    parts: Vec<GeminiResPart>,
}

#[derive(Deserialize)]
struct GeminiResPart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// All text parts of the first candidate, concatenated.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

pub struct GoogleProvider {
    api_key: String,
    api_base: String,
    client: Client,
}

impl GoogleProvider {
    pub fn new(api_key: String, api_base: String) -> Self {
        Self {
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base,
            model_id,
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let req = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: request.max_output_tokens,
                temperature: request.temperature,
            },
        };
        let url = self.endpoint(&request.model);
        // The key rides in the query string, so keep it out of error text
        let res = self
            .client
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| anyhow!(e.without_url()))?;
        if !res.status().is_success() {
            let status = res.status();
            return Err(anyhow!(
                "Google Gemini API Error ({}): {}",
                status,
                res.text().await.unwrap_or_default()
            ));
        }
        let parsed: GeminiResponse = res.json().await.map_err(|e| anyhow!(e.without_url()))?;
        Ok(parsed.into_text())
    }
}
