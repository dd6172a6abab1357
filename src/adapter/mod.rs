mod bundler;
mod reporter;
mod source;

pub use bundler::CommandBundler;
pub use reporter::ConsoleReporter;
pub use source::{import, try_import, FileConfigurationSource, ImportError, DEFAULT_OVERRIDE_FILE};
