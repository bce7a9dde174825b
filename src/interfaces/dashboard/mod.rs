mod events;
mod stream;
mod ui;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::{broadcast, mpsc, watch};

use crate::core::channels::{Channel, ChannelSelection};
use crate::core::config::MetricsConfig;
use crate::core::insight::{Insight, InsightRequester, InsightState};
use crate::core::metrics::{MetricsFeed, MetricsSnapshot};
use crate::core::pipeline::PipelineStage;

enum InsightEvent {
    Resolved(Insight),
}

/// What a key press asks the event loop to do beyond updating local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Generate,
    Quit,
}

pub struct DashboardInterface {
    requester: InsightRequester,
    feed: MetricsFeed,
    metrics_rx: Option<watch::Receiver<MetricsSnapshot>>,
    metrics: MetricsSnapshot,

    // Selection state
    active_stage: PipelineStage,
    channels: ChannelSelection,

    insight: InsightState,
    insight_rx: Option<mpsc::Receiver<InsightEvent>>,
    thinking_tick: usize,

    log_rx: Option<broadcast::Receiver<String>>,
    last_log: String,
    should_quit: bool,
}

impl DashboardInterface {
    pub fn new(requester: InsightRequester, metrics_config: MetricsConfig) -> Self {
        let feed = MetricsFeed::new(metrics_config);
        let metrics = feed.latest();
        Self {
            requester,
            feed,
            metrics_rx: None,
            metrics,
            active_stage: PipelineStage::default(),
            channels: ChannelSelection::default(),
            insight: InsightState::default(),
            insight_rx: None,
            thinking_tick: 0,
            log_rx: None,
            last_log: String::new(),
            should_quit: false,
        }
    }

    /// Shows the most recent log line in the footer.
    pub fn with_log_feed(mut self, rx: broadcast::Receiver<String>) -> Self {
        self.log_rx = Some(rx);
        self
    }

    pub fn active_stage(&self) -> PipelineStage {
        self.active_stage
    }

    pub fn channels(&self) -> &ChannelSelection {
        &self.channels
    }

    pub fn insight(&self) -> &InsightState {
        &self.insight
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics
    }

    pub fn select_stage(&mut self, stage: PipelineStage) {
        self.active_stage = stage;
    }

    pub fn toggle_channel(&mut self, channel: Channel) {
        self.channels.toggle(channel);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
            KeyCode::Left | KeyCode::BackTab => {
                self.select_stage(self.active_stage.previous());
                Action::None
            }
            KeyCode::Right | KeyCode::Tab => {
                self.select_stage(self.active_stage.next());
                Action::None
            }
            KeyCode::Enter | KeyCode::Char('g') | KeyCode::Char('G') => {
                // Matches the disabled button while a request is pending
                if self.insight.is_in_flight() {
                    Action::None
                } else {
                    Action::Generate
                }
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = (c as usize) - ('1' as usize);
                if let Some(stage) = PipelineStage::from_index(index) {
                    self.select_stage(stage);
                }
                Action::None
            }
            KeyCode::Char(c) => {
                // Channel toggles are only on screen in the distribution panel
                if self.active_stage == PipelineStage::Distribution
                    && let Some(channel) = Channel::from_hotkey(c)
                {
                    self.toggle_channel(channel);
                }
                Action::None
            }
            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LlmConfig;
    use crate::core::insight::{
        PLACEHOLDER_INSIGHT, SELECT_CHANNEL_MESSAGE, SERVICE_FAILURE_FALLBACK,
    };
    use crate::core::llm::{GenerationRequest, LlmProvider};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingProvider {
        reply: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for CountingProvider {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.reply
                .map(str::to_string)
                .ok_or_else(|| anyhow!("connection refused"))
        }
    }

    fn dashboard(reply: Option<&'static str>) -> (DashboardInterface, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            reply,
            calls: AtomicUsize::new(0),
        });
        let requester = InsightRequester::new(provider.clone(), (&LlmConfig::default()).into());
        (
            DashboardInterface::new(requester, MetricsConfig::default()),
            provider,
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn wait_until_resolved(dash: &mut DashboardInterface) {
        for _ in 0..200 {
            dash.drain_insight_events();
            if !dash.insight().is_in_flight() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("insight request never resolved");
    }

    #[test]
    fn defaults_follow_dashboard_layout() {
        let (dash, _) = dashboard(None);
        assert_eq!(dash.active_stage(), PipelineStage::Creation);
        assert_eq!(dash.channels().ids(), vec!["x", "li"]);
        assert_eq!(dash.insight().text(), PLACEHOLDER_INSIGHT);
        assert_eq!(dash.metrics().reach, 1.2);
        assert_eq!(dash.metrics().roi, 4.2);
    }

    #[test]
    fn arrows_and_digits_move_the_single_active_stage() {
        let (mut dash, _) = dashboard(None);
        dash.handle_key(press(KeyCode::Char('3')));
        assert_eq!(dash.active_stage(), PipelineStage::Distribution);
        dash.handle_key(press(KeyCode::Right));
        assert_eq!(dash.active_stage(), PipelineStage::Optimization);
        dash.handle_key(press(KeyCode::Right));
        assert_eq!(dash.active_stage(), PipelineStage::Ideation);
        dash.handle_key(press(KeyCode::Left));
        assert_eq!(dash.active_stage(), PipelineStage::Optimization);
        dash.handle_key(press(KeyCode::Char('9')));
        assert_eq!(dash.active_stage(), PipelineStage::Optimization);
    }

    #[test]
    fn channel_keys_only_apply_in_distribution() {
        let (mut dash, _) = dashboard(None);
        dash.handle_key(press(KeyCode::Char('i')));
        assert_eq!(dash.channels().ids(), vec!["x", "li"]);

        dash.select_stage(PipelineStage::Distribution);
        dash.handle_key(press(KeyCode::Char('i')));
        assert_eq!(dash.channels().ids(), vec!["x", "li", "ig"]);
        dash.handle_key(press(KeyCode::Char('x')));
        assert_eq!(dash.channels().ids(), vec!["li", "ig"]);
    }

    #[test]
    fn quit_keys() {
        let (mut dash, _) = dashboard(None);
        assert_eq!(dash.handle_key(press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(dash.handle_key(press(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            dash.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[tokio::test]
    async fn generate_with_no_channels_shows_guidance_without_request() {
        let (mut dash, provider) = dashboard(Some("unused"));
        dash.select_stage(PipelineStage::Distribution);
        dash.handle_key(press(KeyCode::Char('x')));
        dash.handle_key(press(KeyCode::Char('l')));
        assert!(dash.channels().is_empty());

        assert_eq!(dash.handle_key(press(KeyCode::Char('g'))), Action::Generate);
        dash.request_insight();
        assert_eq!(dash.insight().text(), SELECT_CHANNEL_MESSAGE);
        assert!(!dash.insight().is_in_flight());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generate_is_ignored_while_pending() {
        let (mut dash, provider) = dashboard(Some("Post carousels on LinkedIn at 8am."));
        assert_eq!(dash.handle_key(press(KeyCode::Enter)), Action::Generate);
        dash.request_insight();
        assert!(dash.insight().is_in_flight());
        assert_eq!(dash.handle_key(press(KeyCode::Enter)), Action::None);
        dash.request_insight();

        wait_until_resolved(&mut dash).await;
        assert_eq!(dash.insight().text(), "Post carousels on LinkedIn at 8am.");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_request_shows_fallback() {
        let (mut dash, _) = dashboard(None);
        dash.request_insight();
        wait_until_resolved(&mut dash).await;
        assert_eq!(dash.insight().text(), SERVICE_FAILURE_FALLBACK);
    }
}
