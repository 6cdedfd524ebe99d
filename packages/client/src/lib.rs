//! Typed client SDK for the PostPilot API, plus a polling controller for
//! the task-status endpoint.

pub mod api;
pub mod error;
pub mod poll;

pub use api::{GeneratePost, GeneratePostOutcome, PostFilter, PostPatch, PostPilotClient, ThemePatch};
pub use error::ClientError;
pub use poll::{PollConfig, PollHandle, PollOutcome, RetryNotice, TaskPoller};
