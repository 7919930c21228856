//! Writing parsed entries to disk and checking them afterwards.
//!
//! Every path goes through [`crate::security::resolve`] before any
//! filesystem call is made for it.

mod apply;
mod staging;
mod verify;
mod write;

pub use apply::apply;
pub use staging::apply_staged;
pub use staging::copy_staged;
pub use verify::verify;
