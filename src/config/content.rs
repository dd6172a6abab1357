use std::path::PathBuf;

use serde::Deserialize;

use crate::adapter::DEFAULT_OVERRIDE_FILE;

/// Project configuration of `buildtool`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub paths: PathsContent,
    pub bundler: BundlerContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathsContent {
    /// Directory holding `<name>.config.toml` files, relative to the project
    /// root.
    pub build_sources: PathBuf,
    /// File name of the local override configuration in the working
    /// directory.
    pub override_file: PathBuf,
}

impl Default for PathsContent {
    fn default() -> Self {
        Self {
            build_sources: PathBuf::from("build"),
            override_file: PathBuf::from(DEFAULT_OVERRIDE_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BundlerContent {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for BundlerContent {
    fn default() -> Self {
        Self {
            program: "bundler".to_owned(),
            args: Vec::new(),
        }
    }
}
