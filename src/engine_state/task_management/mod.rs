//! # Task Management System
//!
//! This module provides a small worker pool for executing CPU-bound work off
//! the thread that drives streaming.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that produces an `Output` on a worker
//! - `TaskChannel`: Communication channel between the owner and one worker thread
//!
//! Each worker is a `std::thread` fed by its own mpsc channel, and results
//! come back on a second channel. The manager hands tasks to workers
//! round-robin, caps the number of tasks in flight per worker, and keeps
//! everything else in a FIFO queue.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send their outputs back
//! 4. Outputs are collected on the owning thread with `drain_completed()`
//! 5. Queued tasks are fed to freed workers by `process_queued_tasks()`
//!
//! ## Example Usage
//! ```rust
//! use voxel_streaming_engine::engine_state::task_management::{task::Task, TaskManager};
//!
//! struct Square(u64);
//!
//! impl Task for Square {
//!     type Output = u64;
//!     fn process(&self) -> u64 {
//!         self.0 * self.0
//!     }
//! }
//!
//! let mut task_manager = TaskManager::new(2);
//! task_manager.publish_task(Square(3));
//! task_manager.publish_task(Square(4));
//!
//! let mut results = Vec::new();
//! while task_manager.in_flight() > 0 {
//!     task_manager.process_queued_tasks();
//!     results.extend(task_manager.drain_completed());
//! }
//! results.sort();
//! assert_eq!(results, vec![9, 16]);
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, error};
use task::Task;

/// A communication channel between the owning thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the owner to the worker
/// - `result_receiver`: Receives task outputs from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `_worker`: Handle to the worker thread
///
/// Dropping the channel closes `task_sender`, which ends the worker loop.
#[derive(Debug)]
pub struct TaskChannel<T: Task> {
    task_sender: Sender<T>,
    result_receiver: Receiver<T::Output>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager<T: Task> {
    channels: Vec<TaskChannel<T>>,
    queued_tasks: VecDeque<T>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so a slow task only ever delays itself; everything else waits
/// in the shared queue and goes to whichever worker frees up first.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl<T: Task> TaskChannel<T> {
    /// Starts a worker thread and returns the channel feeding it.
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    fn spawn() -> Self {
        let (task_tx, task_rx) = channel::<T>();
        let (result_tx, result_rx) = channel::<T::Output>();

        let worker = thread::spawn(move || {
            while let Ok(task) = task_rx.recv() {
                if result_tx.send(task.process()).is_err() {
                    break;
                }
            }
        });

        TaskChannel {
            task_sender: task_tx,
            result_receiver: result_rx,
            num_tasks_in_flight: 0,
            _worker: worker,
        }
    }
}

impl<T: Task> TaskManager<T> {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        debug!(
            "Starting {num_workers} workers, available parallelism: {:?}",
            thread::available_parallelism()
        );

        TaskManager {
            channels: (0..num_workers).map(|_| TaskChannel::spawn()).collect(),
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of worker channels.
    pub fn num_workers(&self) -> usize {
        self.channels.len()
    }

    /// Tasks published but not yet drained: running on a worker, finished
    /// but uncollected, or still queued.
    pub fn in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum::<usize>()
            + self.queued_tasks.len()
    }

    /// Tasks waiting for a free worker.
    pub fn queued(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// A worker that has hung up is replaced first and the task goes to the
    /// fresh one.
    ///
    /// # Returns
    /// - `Ok(())` if the task was handed to a worker
    /// - `Err(task)` if even the replacement refused it, so the task can be
    ///   requeued
    fn try_send_task(&mut self, task: T, channel_idx: usize) -> Result<(), T> {
        let task = match self.channels[channel_idx].task_sender.send(task) {
            Ok(()) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                return Ok(());
            }
            Err(err) => err.0,
        };

        self.respawn(channel_idx);
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(()) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => Err(err.0),
        }
    }

    /// Replaces the worker behind `channel_idx`. Outputs it never sent are
    /// lost.
    fn respawn(&mut self, channel_idx: usize) {
        let lost = self.channels[channel_idx].num_tasks_in_flight;
        error!("worker {channel_idx} stopped with {lost} task(s) in flight; restarting it");
        self.channels[channel_idx] = TaskChannel::spawn();
    }

    /// Finds a worker channel that can accept a new task, starting from the
    /// round-robin cursor.
    ///
    /// # Returns
    /// - `Some(usize)` index of an available channel
    /// - `None` if all channels are busy or there are no channels
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|step| (self.current_channel + step) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// The task is sent to a worker right away if one is free and queued
    /// otherwise.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on a worker
    /// - `false` if the task was queued
    pub fn publish_task(&mut self, task: T) -> bool {
        let Some(channel_idx) = self.find_available_channel() else {
            self.queued_tasks.push_back(task);
            return false;
        };

        self.current_channel = (channel_idx + 1) % self.channels.len();
        match self.try_send_task(task, channel_idx) {
            Ok(()) => true,
            Err(task) => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Feeds queued tasks to free workers, oldest first, until either the
    /// queue is empty or every worker is busy.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            // Advance past the channel either way so one bad worker is not
            // retried forever
            self.current_channel = (channel_idx + 1) % self.channels.len();
            if let Err(task) = self.try_send_task(task, channel_idx) {
                self.queued_tasks.push_front(task);
                return;
            }
        }
    }

    /// Collects the outputs of all finished tasks without blocking.
    ///
    /// A worker that died (its task panicked) is replaced by a fresh one.
    /// The task it was running produces no output and no longer counts
    /// toward `in_flight()`, so callers waiting for zero are not held up.
    pub fn drain_completed(&mut self) -> Vec<T::Output> {
        let mut outputs = Vec::new();
        let mut dead = Vec::new();
        for (idx, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(output) => {
                        channel.num_tasks_in_flight -= 1;
                        outputs.push(output);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        dead.push(idx);
                        break;
                    }
                }
            }
        }
        for idx in dead {
            self.respawn(idx);
        }
        outputs
    }
}
