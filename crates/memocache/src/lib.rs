//! # memocache
//!
//! Thread-safe memoizing cache: look a key up, or compute its value once with
//! a caller-supplied loader and keep it for every later lookup.
//!
//! ## Architecture
//! - **MemoCache**: single-flight. Concurrent misses on one key run one loader;
//!   the other callers wait for its result. Other keys are never blocked.
//! - **RacyMemoCache**: at-least-once. Concurrent misses may all run their
//!   loader; the first result inserted is the only one stored.
//! - **Memoize**: the operations both caches share.
//!
//! Stored values are immutable. A loader error stores nothing, so the next
//! lookup for that key runs a loader again. There is no eviction, expiry or
//! capacity bound.

#![warn(missing_docs)]

mod cache;
mod error;
mod flight;
mod memoize;
mod racy;
mod stats;
pub mod validate;

pub use cache::MemoCache;
pub use error::{Error, Result};
pub use memoize::Memoize;
pub use racy::RacyMemoCache;
pub use stats::CacheStats;
