use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde_json::Value;
use snafu::prelude::*;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::domain::entity::BuildStats;
use crate::domain::outbound::{BundleError, Bundler, UnavailableSnafu};

/// A [`Bundler`] implementation which drives an external bundler executable.
///
/// The merged configuration is written to the bundler's stdin as JSON. The
/// bundler prints its statistics to stdout as a JSON document with
/// `warnings` and `errors` lists of `{"message": ...}` objects, and may print
/// anything else to stderr, which is inherited.
#[derive(Debug, Clone)]
pub struct CommandBundler {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandBundler {
    /// Creates a new [`CommandBundler`].
    pub fn new<P: AsRef<Path>>(program: String, args: Vec<String>, working_dir: P) -> Self {
        Self {
            program,
            args,
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl Bundler for CommandBundler {
    async fn build(&self, configuration: Value) -> Result<Option<BuildStats>, BundleError> {
        let input = whatever!(
            serde_json::to_vec(&configuration),
            "Could not serialize configuration"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .context(UnavailableSnafu {
                program: &self.program,
            })?;

        let writer = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                stdin.write_all(&input).await?;
                stdin.shutdown().await
            })
        });

        let output = whatever!(
            child.wait_with_output().await,
            "Could not wait for bundler"
        );

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::warn!(err = %err, "Bundler did not read the configuration"),
                Err(err) => tracing::warn!(err = %err, "Could not send configuration to bundler"),
            }
        }

        if !output.status.success() {
            whatever!("Bundler exited abnormally with {}", output.status);
        }

        let stdout = whatever!(
            String::from_utf8(output.stdout),
            "Bundler printed invalid statistics"
        );

        if stdout.trim().is_empty() {
            tracing::debug!("Bundler printed no statistics");
            return Ok(None);
        }

        let stats: BuildStats = whatever!(
            serde_json::from_str(&stdout),
            "Could not parse build statistics"
        );

        Ok(Some(stats))
    }
}
