//! # Core Module
//!
//! Shared-ownership primitives used across the engine.
//!
//! ## Key Components
//! - `Shared`: Thread-safe reference-counted resource with read-write locking.
//!   The chunk registry lives in one so mesh workers can read it concurrently
//!   while the streaming driver keeps exclusive access for reconciliation.
//!
//! ## Usage
//! ```rust
//! use voxel_streaming_engine::core::Shared;
//!
//! let counter = Shared::new(0);
//! *counter.write().unwrap() += 1;
//! assert_eq!(*counter.read().unwrap(), 1);
//! ```

/// `Shared<T>` and its lock error.
pub mod shared_resource;

pub use shared_resource::{LockPoisoned, Shared};
