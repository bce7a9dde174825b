use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::config::MetricsConfig;
use crate::core::lifecycle::{LifecycleComponent, LifecycleState};

/// Upper bound (exclusive) of a single reach draw, in millions.
pub const REACH_STEP_BOUND: f64 = 0.01;
/// Upper bound (exclusive) of a single ROI draw.
pub const ROI_STEP_BOUND: f64 = 0.05;

const REACH_DECIMALS: i32 = 2;
const ROI_DECIMALS: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedMetrics {
    pub reach: f64,
    pub roi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Increment {
    pub reach: f64,
    pub roi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
    pub reach: f64,
    pub roi: f64,
    /// 0 for the seed values, then one per update.
    pub tick: u64,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl SimulatedMetrics {
    pub fn new(reach: f64, roi: f64) -> Self {
        Self { reach, roi }
    }

    /// Adds the increment and rounds. Never goes below the current values,
    /// even for unrounded seeds.
    pub fn apply(&self, increment: Increment) -> Self {
        Self {
            reach: round_to(self.reach + increment.reach, REACH_DECIMALS).max(self.reach),
            roi: round_to(self.roi + increment.roi, ROI_DECIMALS).max(self.roi),
        }
    }
}

impl From<&MetricsConfig> for SimulatedMetrics {
    fn from(config: &MetricsConfig) -> Self {
        Self::new(config.initial_reach, config.initial_roi)
    }
}

pub struct MetricsSimulator<R: Rng> {
    metrics: SimulatedMetrics,
    tick: u64,
    rng: R,
    min_delay: Duration,
    max_delay: Duration,
}

impl<R: Rng> MetricsSimulator<R> {
    pub fn new(seed: SimulatedMetrics, rng: R, window: (Duration, Duration)) -> Self {
        Self {
            metrics: seed,
            tick: 0,
            rng,
            min_delay: window.0,
            max_delay: window.1,
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reach: self.metrics.reach,
            roi: self.metrics.roi,
            tick: self.tick,
        }
    }

    pub fn draw_increment(&mut self) -> Increment {
        Increment {
            reach: self.rng.gen_range(0.0..REACH_STEP_BOUND),
            roi: self.rng.gen_range(0.0..ROI_STEP_BOUND),
        }
    }

    pub fn advance(&mut self) -> MetricsSnapshot {
        let increment = self.draw_increment();
        self.metrics = self.metrics.apply(increment);
        self.tick += 1;
        self.snapshot()
    }

    /// Uniform in `[min_delay, max_delay)`; collapses to `min_delay` for an empty window.
    pub fn next_delay(&mut self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if max <= min {
            return self.min_delay;
        }
        Duration::from_millis(self.rng.gen_range(min..max))
    }
}

/// A running simulation task. The first update is published immediately,
/// later ones after a jittered delay. Dropping the handle cancels the task.
pub struct MetricsTicker {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    rx: watch::Receiver<MetricsSnapshot>,
}

impl MetricsTicker {
    pub fn start(config: &MetricsConfig) -> Self {
        Self::start_with_rng(config, StdRng::from_entropy())
    }

    pub fn start_with_rng(config: &MetricsConfig, rng: StdRng) -> Self {
        let mut simulator = MetricsSimulator::new(config.into(), rng, config.delay_window());
        let (tx, rx) = watch::channel(simulator.snapshot());
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                if token.is_cancelled() {
                    break;
                }
                let snapshot = simulator.advance();
                tx.send_replace(snapshot);

                let delay = simulator.next_delay();
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            debug!("Metrics ticker stopped at tick {}", simulator.snapshot().tick);
        });

        Self {
            cancel,
            handle: Some(handle),
            rx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MetricsSnapshot> {
        self.rx.clone()
    }

    pub fn latest(&self) -> MetricsSnapshot {
        *self.rx.borrow()
    }

    /// Cancels the pending update and waits for the task to exit. Nothing is
    /// published once this returns.
    pub async fn shutdown(mut self) -> Result<()> {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }
        Ok(())
    }
}

impl Drop for MetricsTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Mount/unmount wrapper around [`MetricsTicker`]. Each start begins again
/// from the configured seed values.
pub struct MetricsFeed {
    config: MetricsConfig,
    ticker: Option<MetricsTicker>,
    state: LifecycleState,
}

impl MetricsFeed {
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            config,
            ticker: None,
            state: LifecycleState::Init,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn subscribe(&self) -> Option<watch::Receiver<MetricsSnapshot>> {
        self.ticker.as_ref().map(MetricsTicker::subscribe)
    }

    /// Current values, or the seed when not mounted.
    pub fn latest(&self) -> MetricsSnapshot {
        match &self.ticker {
            Some(ticker) => ticker.latest(),
            None => MetricsSnapshot {
                reach: self.config.initial_reach,
                roi: self.config.initial_roi,
                tick: 0,
            },
        }
    }
}

#[async_trait]
impl LifecycleComponent for MetricsFeed {
    async fn on_start(&mut self) -> Result<()> {
        if self.ticker.is_some() {
            return Ok(());
        }
        info!(
            "Starting metrics simulation (delay {}-{}ms)",
            self.config.min_delay_ms, self.config.max_delay_ms
        );
        self.ticker = Some(MetricsTicker::start(&self.config));
        self.state = LifecycleState::Mounted;
        Ok(())
    }

    async fn on_shutdown(&mut self) -> Result<()> {
        if let Some(ticker) = self.ticker.take() {
            info!("Stopping metrics simulation");
            ticker.shutdown().await?;
        }
        self.state = LifecycleState::Shutdown;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> MetricsConfig {
        MetricsConfig {
            min_delay_ms: 1,
            max_delay_ms: 3,
            ..MetricsConfig::default()
        }
    }

    fn seeded(seed: u64) -> MetricsSimulator<StdRng> {
        let config = MetricsConfig::default();
        MetricsSimulator::new(
            (&config).into(),
            StdRng::seed_from_u64(seed),
            config.delay_window(),
        )
    }

    #[test]
    fn draws_stay_inside_bounds() {
        let mut sim = seeded(7);
        for _ in 0..10_000 {
            let inc = sim.draw_increment();
            assert!((0.0..REACH_STEP_BOUND).contains(&inc.reach), "{:?}", inc);
            assert!((0.0..ROI_STEP_BOUND).contains(&inc.roi), "{:?}", inc);
        }
    }

    #[test]
    fn snapshots_never_decrease_and_move_by_at_most_one_step() {
        let mut sim = seeded(42);
        let mut prev = sim.snapshot();
        for _ in 0..5_000 {
            let next = sim.advance();
            assert!(next.reach >= prev.reach, "{:?} -> {:?}", prev, next);
            assert!(next.roi >= prev.roi, "{:?} -> {:?}", prev, next);
            // Rounding to the display precision can land exactly on the bound.
            assert!(next.reach - prev.reach <= REACH_STEP_BOUND + 1e-9);
            assert!(next.roi - prev.roi <= ROI_STEP_BOUND + 1e-9);
            assert_eq!(next.tick, prev.tick + 1);
            prev = next;
        }
        assert!(prev.reach > 1.2, "reach should drift upward");
    }

    #[test]
    fn values_are_rounded_to_display_precision() {
        let metrics = SimulatedMetrics::new(1.2, 4.2).apply(Increment {
            reach: 0.0071,
            roi: 0.049,
        });
        assert_eq!(metrics.reach, 1.21);
        assert_eq!(metrics.roi, 4.2);
        assert_eq!(format!("{}", metrics.reach), "1.21");
    }

    #[test]
    fn unrounded_seed_does_not_decrease() {
        let metrics = SimulatedMetrics::new(1.234, 4.26).apply(Increment {
            reach: 0.0,
            roi: 0.0,
        });
        assert!(metrics.reach >= 1.234);
        assert!(metrics.roi >= 4.26);
    }

    #[test]
    fn delays_fall_inside_window() {
        let mut sim = seeded(3);
        for _ in 0..1_000 {
            let delay = sim.next_delay();
            assert!(delay >= Duration::from_millis(2000));
            assert!(delay < Duration::from_millis(4000));
        }
    }

    #[test]
    fn empty_delay_window_uses_minimum() {
        let mut sim = MetricsSimulator::new(
            SimulatedMetrics::new(1.0, 1.0),
            StdRng::seed_from_u64(1),
            (Duration::from_millis(50), Duration::from_millis(50)),
        );
        assert_eq!(sim.next_delay(), Duration::from_millis(50));
    }

    #[tokio::test]
    async fn ticker_publishes_increasing_ticks() {
        let ticker = MetricsTicker::start_with_rng(&fast_config(), StdRng::seed_from_u64(9));
        let mut rx = ticker.subscribe();
        let mut last = rx.borrow_and_update().tick;
        let mut seen = 0;
        while seen < 5 {
            rx.changed().await.unwrap();
            let snap = *rx.borrow_and_update();
            assert!(snap.tick > last);
            last = snap.tick;
            seen += 1;
        }
        ticker.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_stops_publishing() {
        let ticker = MetricsTicker::start_with_rng(&fast_config(), StdRng::seed_from_u64(5));
        let mut rx = ticker.subscribe();
        rx.changed().await.unwrap();
        ticker.shutdown().await.unwrap();

        let frozen = *rx.borrow_and_update();
        // The sender lives in the task, so a closed channel proves the task is gone.
        assert!(rx.changed().await.is_err());
        assert_eq!(*rx.borrow(), frozen);
    }

    #[tokio::test]
    async fn dropping_ticker_cancels_task() {
        let ticker = MetricsTicker::start_with_rng(&fast_config(), StdRng::seed_from_u64(11));
        let mut rx = ticker.subscribe();
        drop(ticker);
        let closed = tokio::time::timeout(Duration::from_secs(2), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok(), "ticker task kept running after drop");
    }

    #[tokio::test]
    async fn feed_remount_restarts_from_seed() {
        let mut feed = MetricsFeed::new(fast_config());
        assert_eq!(feed.state(), LifecycleState::Init);
        assert!(feed.subscribe().is_none());

        feed.on_start().await.unwrap();
        assert_eq!(feed.state(), LifecycleState::Mounted);
        let mut rx = feed.subscribe().unwrap();
        rx.changed().await.unwrap();
        feed.on_shutdown().await.unwrap();
        assert_eq!(feed.state(), LifecycleState::Shutdown);
        assert_eq!(feed.latest().tick, 0);

        feed.on_start().await.unwrap();
        let snap = feed.latest();
        assert!(snap.tick <= 1, "remount should start over, got {:?}", snap);
        feed.on_shutdown().await.unwrap();
    }
}
