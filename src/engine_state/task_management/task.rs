//! # Task System Core Trait
//!
//! A `Task` is a self-contained unit of work executed on a background worker.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The returned `Output` is sent back to the owning thread
//! 4. The owner collects outputs with `TaskManager::drain_completed()`
//!
//! ## Thread Safety
//! - Tasks and their outputs must be `Send` to cross threads
//! - Shared state reached from a task must be properly synchronized

/// A unit of work that can be executed on a background worker.
///
/// # Implementation Guidelines
/// - Own the data you need, or hold thread-safe handles to it
/// - Be coarse-grained enough to amortize scheduling overhead
/// - Report failures through `Output` rather than panicking
pub trait Task: Send + 'static {
    /// What processing the task produces.
    type Output: Send + 'static;

    /// Performs the work. Runs on a worker thread.
    fn process(&self) -> Self::Output;
}
