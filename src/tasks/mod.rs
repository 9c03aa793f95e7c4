//! Background Tasks Module
//!
//! Contains the task queue worker that runs cache operations off the
//! caller's turn.
//!
//! # Tasks
//! - Task queue: drains submitted operations in FIFO order

mod queue;

pub use queue::{queue_closed, spawn_queue_worker, Completion, Job, TaskQueue};
