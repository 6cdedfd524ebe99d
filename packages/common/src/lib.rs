pub mod api;
pub mod config;
pub mod event;
pub mod jobs;
pub mod retry;
pub mod status;
pub mod task;
pub mod topic;

pub use status::{PostStatus, PostType, ProcessingStatus, SIMPLE_POST_CHAR_LIMIT};
pub use task::{Lane, TaskErrorCode, TaskKind, TaskState};
pub use topic::Topic;
