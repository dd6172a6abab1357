use std::fs::{self, File};
use std::io::{Error as IoError, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;

/// Template written by `buildtool init`. Parses to [`Configuration::default`].
///
/// [`Configuration::default`]: super::Configuration
pub const DEFAULT_CONTENT: &str = r#"
# Generated by `buildtool init`.

# Named bundler configurations live in `<build_sources>/<name>.config.toml`,
# relative to this file. `override_file` is looked up in the working directory
# and merged on top of the named configuration when present.
[paths]
build_sources = "build"
override_file = "bundler.config.toml"

# The bundler reads the merged configuration as JSON on stdin and prints its
# statistics as JSON on stdout.
[bundler]
program = "bundler"
args = []
"#;

/// Read the whole project configuration file.
///
/// # Errors
///
/// This function will return [`ConfigFileError::NotFound`] if `path` doesn't
/// exist, or a file system error if it can't be read.
pub fn read_content(path: &Path) -> Result<String, ConfigFileError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => NotFoundSnafu { path }.fail(),
        Err(err) => Err(err).context(FileSystemSnafu {
            when: "Reading configuration",
        }),
    }
}

/// Write [`DEFAULT_CONTENT`] to `path`. An existing file is never replaced.
///
/// # Errors
///
/// This function will return [`ConfigFileError::AlreadyExists`] if `path`
/// exists, or a file system error if it can't be written.
pub fn write_default(path: &Path) -> Result<(), ConfigFileError> {
    let mut file = match File::options().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return AlreadyExistsSnafu { path }.fail()
        }
        Err(err) => {
            return Err(err).context(FileSystemSnafu {
                when: "Creating configuration",
            })
        }
    };

    file.write_all(DEFAULT_CONTENT.as_bytes())
        .context(FileSystemSnafu {
            when: "Writing default configuration",
        })
}

/// An error for accessing the project configuration file.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum ConfigFileError {
    #[snafu(display("Configuration {} doesn't exist", path.display()))]
    NotFound { path: PathBuf },
    #[snafu(display("Configuration {} already exists", path.display()))]
    AlreadyExists { path: PathBuf },
    #[snafu(display("Could not access configuration: {when}"))]
    FileSystem {
        when: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use predicates::path as path_pred;

    #[test]
    fn read_content_existing() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("buildtool.toml");
        file.write_str("[bundler]").unwrap();
        assert_eq!(read_content(file.path()).unwrap(), "[bundler]");
    }

    #[test]
    fn read_content_error_not_found() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("buildtool.toml");
        assert!(matches!(
            read_content(file.path()),
            Err(ConfigFileError::NotFound { ref path }) if path == file.path()
        ));
        file.assert(path_pred::missing());
    }

    #[test]
    fn write_default_missing() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("buildtool.toml");
        write_default(file.path()).unwrap();
        file.assert(DEFAULT_CONTENT);
    }

    #[test]
    fn write_default_error_exists() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("buildtool.toml");
        file.write_str("[paths]").unwrap();
        assert!(matches!(
            write_default(file.path()),
            Err(ConfigFileError::AlreadyExists { .. })
        ));
        file.assert("[paths]");
    }
}
