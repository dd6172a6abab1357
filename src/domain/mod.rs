pub mod config;
pub mod entity;
pub mod invoker;
pub mod outbound;

pub use invoker::{BundlerInvoker, InvokeBundlerError};
