//! Dispatching polls to sources and relaying what is new.

pub mod dispatcher;
pub mod scheduler;

pub use dispatcher::{CycleReport, Relay};
pub use scheduler::{Scheduler, DEFAULT_INTERVAL_SECS};
