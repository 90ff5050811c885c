//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod link;
pub mod payload;

pub use link::link_task;
pub use payload::payload_task;
