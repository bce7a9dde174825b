use std::sync::Arc;
use tracing::{info, warn};

use crate::core::channels::ChannelSelection;
use crate::core::config::LlmConfig;
use crate::core::llm::{GenerationRequest, LlmProvider};

pub const PLACEHOLDER_INSIGHT: &str =
    "Select distribution channels and generate a tailored optimization strategy.";
pub const SELECT_CHANNEL_MESSAGE: &str = "Please select at least one distribution channel first.";
pub const EMPTY_RESPONSE_FALLBACK: &str = "Synchronize LinkedIn thought leadership with rapid-fire X threads for maximum multi-touch attribution.";
pub const SERVICE_FAILURE_FALLBACK: &str = "Leverage short-form video hooks on Instagram to drive high-intent traffic to your LinkedIn lead magnets.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightSource {
    /// Rejected locally; the service was not contacted.
    Validation,
    Generated,
    EmptyResponse,
    ServiceFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    pub text: String,
    pub source: InsightSource,
}

impl Insight {
    fn fixed(text: &str, source: InsightSource) -> Self {
        Self {
            text: text.to_string(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightSettings {
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl From<&LlmConfig> for InsightSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        }
    }
}

pub fn build_prompt(channel_names: &str) -> String {
    format!(
        "You are a world-class growth marketing strategist. Based on the selected distribution channels: {}, provide exactly one punchy, highly specific, and actionable single-sentence strategy to optimize cross-platform engagement and conversion for a B2B SaaS. Avoid generic advice.",
        channel_names
    )
}

#[derive(Clone)]
pub struct InsightRequester {
    provider: Arc<dyn LlmProvider>,
    settings: InsightSettings,
}

impl InsightRequester {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: InsightSettings) -> Self {
        Self { provider, settings }
    }

    /// Local check that runs before any request is dispatched.
    pub fn precheck(selection: &ChannelSelection) -> Option<Insight> {
        selection
            .is_empty()
            .then(|| Insight::fixed(SELECT_CHANNEL_MESSAGE, InsightSource::Validation))
    }

    pub fn request_for(&self, selection: &ChannelSelection) -> GenerationRequest {
        GenerationRequest {
            model: self.settings.model.clone(),
            prompt: build_prompt(&selection.joined_names()),
            max_output_tokens: self.settings.max_output_tokens,
            temperature: self.settings.temperature,
        }
    }

    /// Single attempt. Every service failure turns into the fixed fallback
    /// sentence; nothing is returned as an error.
    pub async fn generate_insight(&self, selection: &ChannelSelection) -> Insight {
        if let Some(rejected) = Self::precheck(selection) {
            return rejected;
        }

        let request = self.request_for(selection);
        info!(
            "Requesting insight for [{}] via {}",
            selection.joined_names(),
            request.model
        );

        match self.provider.generate(&request).await {
            Ok(text) if !text.is_empty() => Insight {
                text,
                source: InsightSource::Generated,
            },
            Ok(_) => {
                warn!("Insight service returned no text, using default insight");
                Insight::fixed(EMPTY_RESPONSE_FALLBACK, InsightSource::EmptyResponse)
            }
            Err(e) => {
                warn!("Insight generation failed: {:#}", e);
                Insight::fixed(SERVICE_FAILURE_FALLBACK, InsightSource::ServiceFailure)
            }
        }
    }
}

/// Text shown in the insight box plus the pending flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightState {
    text: String,
    in_flight: bool,
}

impl Default for InsightState {
    fn default() -> Self {
        Self {
            text: PLACEHOLDER_INSIGHT.to_string(),
            in_flight: false,
        }
    }
}

impl InsightState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Marks a request as pending. Returns false if one already is.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn finish(&mut self, insight: Insight) {
        self.text = insight.text;
        self.in_flight = false;
    }

    /// Shows a locally produced message without touching the pending flag.
    pub fn show(&mut self, insight: Insight) {
        self.text = insight.text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channels::Channel;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::Mutex;

    enum Reply {
        Text(&'static str),
        Fail,
    }

    struct ScriptedProvider {
        reply: Reply,
        calls: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedProvider {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<GenerationRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.calls.lock().unwrap().push(request.clone());
            match self.reply {
                Reply::Text(t) => Ok(t.to_string()),
                Reply::Fail => Err(anyhow!("429 rate limited")),
            }
        }
    }

    fn requester(provider: Arc<ScriptedProvider>) -> InsightRequester {
        InsightRequester::new(provider, (&LlmConfig::default()).into())
    }

    #[tokio::test]
    async fn empty_selection_never_calls_service() {
        let provider = ScriptedProvider::new(Reply::Text("unused"));
        let insight = requester(provider.clone())
            .generate_insight(&ChannelSelection::empty())
            .await;
        assert_eq!(insight.text, SELECT_CHANNEL_MESSAGE);
        assert_eq!(insight.source, InsightSource::Validation);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn service_text_is_shown_verbatim() {
        let provider = ScriptedProvider::new(Reply::Text("X"));
        let insight = requester(provider.clone())
            .generate_insight(&ChannelSelection::default())
            .await;
        assert_eq!(insight.text, "X");
        assert_eq!(insight.source, InsightSource::Generated);
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn empty_service_text_uses_default_insight() {
        let provider = ScriptedProvider::new(Reply::Text(""));
        let insight = requester(provider)
            .generate_insight(&ChannelSelection::default())
            .await;
        assert_eq!(insight.text, EMPTY_RESPONSE_FALLBACK);
        assert_eq!(insight.source, InsightSource::EmptyResponse);
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_kept_in_generated_text() {
        let provider = ScriptedProvider::new(Reply::Text("  X\n"));
        let insight = requester(provider.clone())
            .generate_insight(&ChannelSelection::default())
            .await;
        assert_eq!(insight.text, "  X\n");
        assert_eq!(insight.source, InsightSource::Generated);

        let provider = ScriptedProvider::new(Reply::Text(" "));
        let insight = requester(provider)
            .generate_insight(&ChannelSelection::default())
            .await;
        assert_eq!(insight.text, " ");
        assert_eq!(insight.source, InsightSource::Generated);
    }

    #[tokio::test]
    async fn service_failure_is_absorbed_into_fallback() {
        let provider = ScriptedProvider::new(Reply::Fail);
        let insight = requester(provider.clone())
            .generate_insight(&ChannelSelection::default())
            .await;
        assert_eq!(insight.text, SERVICE_FAILURE_FALLBACK);
        assert_eq!(insight.source, InsightSource::ServiceFailure);
        assert_eq!(provider.calls().len(), 1, "no retry expected");
    }

    #[tokio::test]
    async fn request_carries_channel_names_and_sampling_settings() {
        let provider = ScriptedProvider::new(Reply::Text("ok"));
        let mut selection = ChannelSelection::default();
        selection.toggle(Channel::Instagram);
        requester(provider.clone()).generate_insight(&selection).await;

        let calls = provider.calls();
        let request = &calls[0];
        assert_eq!(request.model, "gemini-3-flash-preview");
        assert_eq!(request.max_output_tokens, 80);
        assert!((request.temperature - 0.8).abs() < f32::EPSILON);
        assert!(
            request
                .prompt
                .contains("selected distribution channels: X, LinkedIn, Instagram,")
        );
        assert!(request.prompt.ends_with("Avoid generic advice."));
    }

    #[test]
    fn state_guards_against_overlapping_requests() {
        let mut state = InsightState::default();
        assert_eq!(state.text(), PLACEHOLDER_INSIGHT);
        assert!(state.begin());
        assert!(!state.begin());
        state.finish(Insight::fixed("done", InsightSource::Generated));
        assert!(!state.is_in_flight());
        assert_eq!(state.text(), "done");
        assert!(state.begin());
    }
}
