//! Outbound request pacing.
//!
//! Enforces a minimum interval between consecutive dispatches to one
//! backend, respecting the remote services' own request quotas. One gate
//! exists per backend and is shared by every concurrent caller.

#![warn(missing_docs)]

mod limiter;

pub use limiter::RateLimiter;
