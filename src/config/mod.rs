mod content;
mod reader;

use std::path::Path;

pub use content::{BundlerContent, Configuration, PathsContent};
pub use reader::{ConfigFileError, DEFAULT_CONTENT};

use snafu::prelude::*;
use toml::de::Error as DeError;

/// File name of the project configuration.
pub const CONFIG_FILE: &str = "buildtool.toml";

/// An error type for loading configuraton from files.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum LoadConfigurationError {
    #[snafu(display("Could not read content from file"))]
    Read { source: ConfigFileError },
    #[snafu(display("Could not parse invalid configurations"))]
    Parse { source: DeError },
}

/// Read configuration from a custom path. This won't create any new file.
///
/// # Errors
///
/// This function will return an error if reading content from file fails or
/// parsing configuration fails.
pub fn load_with_path<P: AsRef<Path>>(path: P) -> Result<Configuration, LoadConfigurationError> {
    let content = reader::read_content(path.as_ref()).context(ReadSnafu)?;
    toml::from_str(&content).context(ParseSnafu)
}

/// Read [`CONFIG_FILE`] from the project directory, falling back to the
/// default configuration if it doesn't exist.
///
/// # Errors
///
/// This function will return an error if an existing file can't be read or
/// parsed.
pub fn load_with_project<P: AsRef<Path>>(
    project: P,
) -> Result<Configuration, LoadConfigurationError> {
    match load_with_path(project.as_ref().join(CONFIG_FILE)) {
        Err(LoadConfigurationError::Read {
            source: ConfigFileError::NotFound { path },
        }) => {
            tracing::debug!(path = %path.display(), "Using default configuration");
            Ok(Configuration::default())
        }
        res => res,
    }
}

/// Write the default [`CONFIG_FILE`] into the project directory.
///
/// # Errors
///
/// This function will return an error if the file exists or can't be
/// written.
pub fn init<P: AsRef<Path>>(project: P) -> Result<(), ConfigFileError> {
    reader::write_default(&project.as_ref().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn default_content_matches_defaults() {
        let configuration: Configuration = toml::from_str(DEFAULT_CONTENT).unwrap();
        assert_eq!(configuration, Configuration::default());
    }

    #[test]
    fn load_partial_configuration() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        tmp.child(CONFIG_FILE)
            .write_str("[bundler]\nprogram = \"esbuild-runner\"\n")
            .unwrap();

        let configuration = load_with_project(tmp.path()).unwrap();
        assert_eq!(configuration.bundler.program, "esbuild-runner");
        assert!(configuration.bundler.args.is_empty());
        assert_eq!(configuration.paths.build_sources, PathBuf::from("build"));
    }

    #[test]
    fn load_with_project_missing() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        assert_eq!(load_with_project(tmp.path()).unwrap(), Configuration::default());
    }

    #[test]
    fn load_with_path_missing() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        assert!(matches!(
            load_with_path(tmp.child(CONFIG_FILE).path()),
            Err(LoadConfigurationError::Read { .. })
        ));
    }

    #[test]
    fn load_error_parse() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        tmp.child(CONFIG_FILE).write_str("[paths").unwrap();
        assert!(matches!(
            load_with_project(tmp.path()),
            Err(LoadConfigurationError::Parse { .. })
        ));
    }

    #[test]
    fn load_with_path_missing_creates_nothing() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child(CONFIG_FILE);
        assert!(load_with_path(file.path()).is_err());
        file.assert(predicates::path::missing());
    }

    #[test]
    fn init_configuration() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        init(tmp.path()).unwrap();
        tmp.child(CONFIG_FILE).assert(DEFAULT_CONTENT);
        assert!(matches!(
            init(tmp.path()),
            Err(ConfigFileError::AlreadyExists { .. })
        ));
    }
}
