//! Task domain subsystem.
//!
//! # Data Flow
//! ```text
//! route handler
//!     → store.rs (lock, mutate ordered Vec<Task>)
//!     → model.rs (Task snapshot, serialized to JSON)
//! ```
//!
//! # Design Decisions
//! - Identifiers come from a monotonic counter, never from the collection length
//! - Every operation runs under one mutex; callers receive cloned snapshots
//! - The store is owned by the server state, not a process global

pub mod model;
pub mod store;

pub use model::{Task, TaskId};
pub use store::TaskStore;
