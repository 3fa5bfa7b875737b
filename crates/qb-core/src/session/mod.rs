//! Session loop and run bookkeeping

mod runner;
mod types;

pub use runner::{Checkpoint, CycleReporter, SessionRunner, SessionSettings};
pub use types::Session;
