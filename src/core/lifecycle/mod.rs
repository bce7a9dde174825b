use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Init,
    Mounted,
    Shutdown,
}

/// Components that own background work tied to the dashboard being on screen.
#[async_trait::async_trait]
pub trait LifecycleComponent {
    async fn on_start(&mut self) -> Result<()> {
        Ok(())
    }
    async fn on_shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}
