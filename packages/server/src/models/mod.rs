pub mod post;
pub mod shared;
pub mod task;
pub mod theme;
