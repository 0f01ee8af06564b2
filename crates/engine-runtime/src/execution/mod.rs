pub mod executor;
pub mod step;
