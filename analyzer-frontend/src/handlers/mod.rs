pub mod analysis;
pub mod app;
pub mod metrics;
pub mod session;
