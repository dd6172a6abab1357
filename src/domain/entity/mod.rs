pub mod diagnostic;
pub mod outcome;
pub mod request;

pub use diagnostic::{BuildStats, Diagnostic};
pub use outcome::ExitOutcome;
pub use request::{BuildRequest, EnvironmentMap, SpawnRequest};
