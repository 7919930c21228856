//! Security checks applied during materialization.

pub mod path;
pub mod quota;

pub use path::resolve;
pub use quota::QuotaTracker;
