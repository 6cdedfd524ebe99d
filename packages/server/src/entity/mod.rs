pub mod post;
pub mod task;
pub mod theme;
