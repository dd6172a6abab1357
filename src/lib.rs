//! Build orchestration helpers: launching tools as cancelable child
//! processes and running a bundler against layered configurations.

pub mod adapter;
pub mod app;
pub mod config;
pub mod domain;
pub mod process;
pub mod utils;

pub use adapter::try_import;
pub use process::spawn;
