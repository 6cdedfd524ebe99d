pub mod task_event;

pub use task_event::{apply_task_event, consume_task_events};
