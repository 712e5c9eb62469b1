mod orchestrator;
mod runtime;
mod shutdown;
mod startup;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use orchestrator::SelfcamApp;
pub use types::{AppOptions, ComponentState, ShutdownReason};
