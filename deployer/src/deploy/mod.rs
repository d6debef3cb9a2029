//! Deployment module

pub mod dedup;
pub mod fsm;
pub mod orchestrator;
pub mod plan;
pub mod poller;
pub mod progress;
