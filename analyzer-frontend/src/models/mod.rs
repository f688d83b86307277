pub mod session;
pub mod store;

pub use session::AnalyzerSession;
pub use store::IdleSessionStore;
