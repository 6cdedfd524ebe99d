pub mod stuck;

pub use stuck::{run_stuck_sweeper, sweep_once};
