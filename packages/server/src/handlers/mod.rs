pub mod dashboard;
pub mod health;
pub mod post;
pub mod provider;
pub mod task;
pub mod theme;
