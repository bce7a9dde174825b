use tokio::sync::{broadcast, mpsc};
use tracing::error;

use crate::core::insight::{
    Insight, InsightRequester, InsightSource, SERVICE_FAILURE_FALLBACK,
};

use super::{DashboardInterface, InsightEvent};

impl DashboardInterface {
    pub(super) fn request_insight(&mut self) {
        // Validation happens synchronously, before anything is spawned
        if let Some(rejected) = InsightRequester::precheck(&self.channels) {
            self.insight.show(rejected);
            return;
        }
        if !self.insight.begin() {
            return;
        }

        let requester = self.requester.clone();
        let selection = self.channels.clone();
        let (tx, rx) = mpsc::channel(1);
        self.insight_rx = Some(rx);
        self.thinking_tick = 0;

        tokio::spawn(async move {
            let insight = requester.generate_insight(&selection).await;
            let _ = tx.send(InsightEvent::Resolved(insight)).await;
        });
    }

    /// Non-blocking; applies a resolved request if one arrived.
    pub(super) fn drain_insight_events(&mut self) {
        let Some(rx) = self.insight_rx.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(InsightEvent::Resolved(insight)) => {
                self.insight.finish(insight);
                self.insight_rx = None;
            }
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => {
                error!("Insight task ended without a result");
                self.insight.finish(Insight {
                    text: SERVICE_FAILURE_FALLBACK.to_string(),
                    source: InsightSource::ServiceFailure,
                });
                self.insight_rx = None;
            }
        }
    }

    pub(super) fn drain_metrics(&mut self) {
        if let Some(rx) = self.metrics_rx.as_mut()
            && rx.has_changed().unwrap_or(false)
        {
            self.metrics = *rx.borrow_and_update();
        }
    }

    pub(super) fn drain_logs(&mut self) {
        let Some(rx) = self.log_rx.as_mut() else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(line) => self.last_log = line,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }
}
