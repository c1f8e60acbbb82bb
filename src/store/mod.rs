//! Short-Lived State
//!
//! Injected, time-bounded storage for values that must not outlive their
//! deadline - one-time codes today, anything expiring tomorrow.

mod codes;
mod expiring;

pub use codes::CodeIssuer;
pub use expiring::ExpiringStore;
