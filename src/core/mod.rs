pub mod channels;
pub mod config;
pub mod insight;
pub mod lifecycle;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod terminal;
