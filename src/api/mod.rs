//! API Module
//!
//! The public cache surface used by host glue code.
//!
//! # Operations
//! - `set` / `get` / `remove` - deferred, completed through the task queue
//! - `set_then` / `get_then` / `remove_then` - the same with a continuation
//! - `size` / `left` - synchronous space accounting
//! - batch forms, `clear`, `update_each`, `contains`, `keys`, `stats`

pub mod storage;

pub use storage::Storage;
