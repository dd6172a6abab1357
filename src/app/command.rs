use crate::domain::entity::{BuildRequest, SpawnRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the default project configuration
    Init,
    /// Launch a program and wait for it
    Spawn(SpawnRequest),
    /// Run the bundler with a named configuration
    Build(BuildRequest),
}
