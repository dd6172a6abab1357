use std::ffi::OsStr;
use std::io::{Error as IoError, ErrorKind};
use std::path::{self, Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use snafu::prelude::*;
use tokio::fs;

use crate::domain::outbound::{ConfigurationSource, LoadBaseError, NotFoundSnafu};

/// File name of the local override configuration looked up in the working
/// directory.
pub const DEFAULT_OVERRIDE_FILE: &str = "bundler.config.toml";

const BASE_SUFFIX: &str = ".config.toml";

/// A [`ConfigurationSource`] reading named configurations from a build
/// sources directory and the override from the working directory.
#[derive(Debug, Clone)]
pub struct FileConfigurationSource {
    build_sources: PathBuf,
    working_dir: PathBuf,
    override_file: PathBuf,
}

impl FileConfigurationSource {
    /// Creates a new [`FileConfigurationSource`]. A relative `build_sources`
    /// is resolved against `working_dir`.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(build_sources: P, working_dir: Q) -> Self {
        Self {
            build_sources: build_sources.as_ref().to_path_buf(),
            working_dir: working_dir.as_ref().to_path_buf(),
            override_file: PathBuf::from(DEFAULT_OVERRIDE_FILE),
        }
    }

    /// Use another file name for the local override configuration.
    pub fn with_override_file<P: AsRef<Path>>(mut self, override_file: P) -> Self {
        self.override_file = override_file.as_ref().to_path_buf();
        self
    }

    /// Path of the base configuration called `name`.
    pub fn base_path(&self, name: &str) -> PathBuf {
        self.working_dir
            .join(&self.build_sources)
            .join(format!("{name}{BASE_SUFFIX}"))
    }

    /// Path of the local override configuration.
    pub fn override_path(&self) -> PathBuf {
        self.working_dir.join(&self.override_file)
    }
}

#[async_trait::async_trait]
impl ConfigurationSource for FileConfigurationSource {
    async fn load_base(&self, name: &str) -> Result<Value, LoadBaseError> {
        let path = whatever!(
            path::absolute(self.base_path(name)),
            "Could not resolve base configuration path"
        );

        match import(&path).await {
            Ok(value) => Ok(value),
            Err(ImportError::Missing { path }) => NotFoundSnafu { name, path }.fail(),
            Err(err) => Err(err).whatever_context(format!("Could not import {}", path.display())),
        }
    }

    async fn load_override(&self) -> Option<Value> {
        try_import(self.override_path()).await
    }
}

/// Read and parse a configuration document. Files ending with `.json` are
/// parsed as JSON, anything else as TOML.
///
/// # Errors
///
/// This function will return an error if the file can't be read or parsed.
pub async fn import<P: AsRef<Path>>(path: P) -> Result<Value, ImportError> {
    let path = path.as_ref();

    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) => match err.kind() {
            ErrorKind::NotFound => return MissingSnafu { path }.fail(),
            _ => return Err(err).context(ReadSnafu { path }),
        },
    };

    match path.extension().and_then(OsStr::to_str) {
        Some("json") => serde_json::from_str(&content).context(ParseJsonSnafu { path }),
        _ => toml::from_str(&content).context(ParseTomlSnafu { path }),
    }
}

/// Like [`import`], resolving `path` against the current directory and
/// treating every failure as an absent document.
pub async fn try_import<P: AsRef<Path>>(path: P) -> Option<Value> {
    let path = path::absolute(path.as_ref()).ok()?;
    match import(&path).await {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(err = %err, "Skipping optional configuration");
            None
        }
    }
}

/// An error for importing a configuration document.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ImportError {
    #[snafu(display("Could not open inexistent file {}", path.display()))]
    Missing { path: PathBuf },
    #[snafu(display("Could not read {}", path.display()))]
    Read {
        path: PathBuf,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Could not parse TOML document {}", path.display()))]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[snafu(display("Could not parse JSON document {}", path.display()))]
    ParseJson {
        path: PathBuf,
        source: serde_json::Error,
    },
}
