use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;

use crate::app::command::Command;
use crate::config::{self, ConfigFileError};
use crate::domain::entity::{BuildRequest, ExitOutcome, SpawnRequest};
use crate::domain::{BundlerInvoker, InvokeBundlerError};
use crate::process::{ProcessRunner, RunProcessError};
use crate::tracing_report;

/// Main business logic implementation of the command line front end.
pub struct Client {
    runner: ProcessRunner,
    invoker: Arc<BundlerInvoker>,
    project: PathBuf,
}

impl Client {
    /// Creates a new [`Client`] working on the `project` directory.
    pub fn new<P: AsRef<Path>>(runner: ProcessRunner, invoker: Arc<BundlerInvoker>, project: P) -> Self {
        Self {
            runner,
            invoker,
            project: project.as_ref().to_path_buf(),
        }
    }

    /// Run specific function according to `command`. The returned outcome
    /// tells the caller whether to fail with a child's exit code.
    ///
    /// # Errors
    ///
    /// This function will return an error if any error occurs.
    pub async fn run(&self, command: Command) -> Result<ExitOutcome, ClientError> {
        match command {
            Command::Init => self.init(),
            Command::Spawn(request) => self.spawn(request).await,
            Command::Build(request) => self.build(request).await,
        }
    }

    /// Write the default configuration into the project directory.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file exists or can't be
    /// written.
    fn init(&self) -> Result<ExitOutcome, ClientError> {
        config::init(&self.project).context(InitSnafu)?;
        tracing::info!(project = %self.project.display(), "Created {}", config::CONFIG_FILE);
        Ok(ExitOutcome::Success)
    }

    /// Launch a program and wait for it. Ctrl-C aborts the program.
    ///
    /// # Errors
    ///
    /// This function will return an error if the program can't be launched,
    /// or it was aborted without being detached.
    async fn spawn(&self, request: SpawnRequest) -> Result<ExitOutcome, ClientError> {
        let handle = self.runner.spawn(request);
        let control = handle.control();
        let detached = handle.is_detached();
        let outcome = handle.wait();
        tokio::pin!(outcome);

        let interrupted = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {}
                Err(err) => {
                    tracing_report!(err);
                    std::future::pending::<()>().await
                }
            }
        };

        tokio::select! {
            res = &mut outcome => res.context(SpawnSnafu),
            () = interrupted => {
                tracing::info!(detached, "Interrupted, aborting process");
                control.abort("interrupted");
                outcome.await.context(SpawnSnafu)
            }
        }
    }

    /// Run the bundler. Build diagnostics never fail this function.
    ///
    /// # Errors
    ///
    /// This function will return an error if the base configuration is
    /// missing or the bundler can't run.
    async fn build(&self, request: BuildRequest) -> Result<ExitOutcome, ClientError> {
        self.invoker.invoke(&request).await.context(BuildSnafu)?;
        Ok(ExitOutcome::Success)
    }
}

/// An error for client's operations.
#[derive(Debug, Snafu)]
pub enum ClientError {
    #[snafu(display("Could not create configuration"))]
    Init { source: ConfigFileError },
    #[snafu(display("Could not run process"))]
    Spawn { source: RunProcessError },
    #[snafu(display("Could not build"))]
    Build { source: InvokeBundlerError },
}
