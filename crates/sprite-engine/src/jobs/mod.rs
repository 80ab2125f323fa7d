//! Cross-thread job mailbox.
//!
//! Non-rendering threads build `RenderJob`s and submit them through a
//! `JobSender`. The renderer drains at most one job per frame, in submission
//! order.

mod job;
mod queue;

pub use job::RenderJob;
pub use queue::{JOB_QUEUE_CAPACITY, JobReceiver, JobSender, job_queue};
