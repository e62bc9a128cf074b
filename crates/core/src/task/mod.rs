//! The unit of work: one URL-to-file fetch and its mutable progress record.

mod registry;
mod types;

pub use registry::TaskRegistry;
pub use types::{Task, TaskId, TaskStatus};
