use std::error::Error as StdError;
use std::io::Error as IoError;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use snafu::prelude::*;

use crate::domain::entity::BuildStats;

/// A source of bundler configuration documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ConfigurationSource: Send + Sync + 'static {
    /// Load the named base configuration.
    ///
    /// # Errors
    ///
    /// This function will return an error if the configuration is missing or
    /// can't be loaded. A missing base configuration is a caller mistake and
    /// must never be treated as absent.
    async fn load_base(&self, name: &str) -> Result<Value, LoadBaseError>;

    /// Probe the optional local override configuration. Any failure means
    /// there is no override.
    async fn load_override(&self) -> Option<Value>;
}

/// An error type of loading a base configuration.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum LoadBaseError {
    #[snafu(display("Could not find configuration {name} at {}", path.display()))]
    NotFound { name: String, path: PathBuf },
    #[snafu(whatever, display("Could not load configuration: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

/// The external build tool.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Bundler: Send + Sync + 'static {
    /// Run one build with the merged configuration. Returns the build
    /// statistics if the bundler produced any.
    ///
    /// # Errors
    ///
    /// This function will return an error only if the bundler could not run
    /// at all. Errors found in the sources are part of the statistics.
    async fn build(&self, configuration: Value) -> Result<Option<BuildStats>, BundleError>;
}

/// A fatal error of invoking the bundler.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum BundleError {
    #[snafu(display("Bundler {program} is unavailable"))]
    Unavailable {
        program: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(whatever, display("Bundler failed: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

/// A sink for human-readable build diagnostics.
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticReporter: Send + Sync + 'static {
    fn warning(&self, message: &str);

    fn error(&self, message: &str);
}
