pub mod connectors;
pub mod error;
pub mod listener;
pub mod metrics;
pub mod state;
pub mod transform;
