//! Launching external executables with inherited stdio and a cancelable
//! outcome.

mod handle;
mod runner;

pub use handle::{KillError, KillSignal, ProcessControl, ProcessHandle};
pub use runner::{spawn, ProcessRunner, RunProcessError};
