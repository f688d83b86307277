//! analyzer-core: domain types and shared infrastructure for the medicine analyzer.
pub mod analysis;
pub mod config;
pub mod error;
pub mod intake;
pub mod middleware;
pub mod mode;
pub mod observability;
pub mod providers;
pub mod session;

pub use secrecy;
