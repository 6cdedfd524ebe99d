mod common;
mod dashboard;
mod events;
mod post;
mod provider;
mod task;
mod theme;
