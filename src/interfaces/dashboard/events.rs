use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend};
use std::{io, time::Duration};
use tracing::info;

use super::{Action, DashboardInterface};
use crate::core::lifecycle::LifecycleComponent;

impl DashboardInterface {
    pub async fn run_tui(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.feed.on_start().await?;
        self.metrics_rx = self.feed.subscribe();
        info!("Dashboard mounted");

        let res = self.run_app(&mut terminal).await;

        // Stop the ticker before the screen goes away
        let stopped = self.feed.on_shutdown().await;
        self.metrics_rx = None;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res.and(stopped)
    }

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        <B as Backend>::Error: std::error::Error + Send + Sync + 'static,
    {
        loop {
            if self.should_quit {
                return Ok(());
            }

            self.drain_insight_events();
            self.drain_metrics();
            self.drain_logs();

            if self.insight.is_in_flight() {
                self.thinking_tick = self.thinking_tick.wrapping_add(1);
            }

            terminal.draw(|f| self.draw(f))?;

            // Poll with a short timeout so the spinner and metrics keep moving
            if event::poll(Duration::from_millis(80))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                match self.handle_key(key) {
                    Action::Generate => self.request_insight(),
                    Action::Quit => self.should_quit = true,
                    Action::None => {}
                }
            }
        }
    }
}
