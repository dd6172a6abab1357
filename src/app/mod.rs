pub mod client;
pub mod command;

pub use client::{Client, ClientError};
pub use command::Command;
