//! Session State Store: active conversation, message log, staged files and
//! tracked dashboard jobs.
//!
//! I/O lives in `crate::services::session`.

mod store;
mod types;

pub(crate) use types::now_timestamp;
pub use store::SessionState;
pub use types::{Conversation, DashboardLinks, Job, JobStatus, Message, UploadedFile};
