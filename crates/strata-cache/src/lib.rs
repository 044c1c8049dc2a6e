//! Collaborator caches for strata backends.
//!
//! [`TimedCache`] is an in-process map whose entries expire after a
//! per-cache time-to-live, with single-flight coalescing for concurrent
//! fetches of the same key. [`DiskCache`] persists opaque payloads under a
//! cache directory with a wall-clock expiry, so responses survive process
//! restarts.

mod clock;
mod disk;
mod timed;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use disk::DiskCache;
pub use timed::TimedCache;
