use std::io::Error as IoError;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use nix::sys::signal::Signal;
use snafu::prelude::*;
use tokio::process::{Child, Command};
use tokio::signal::unix::{signal as listen, Signal as SignalStream, SignalKind};
use tokio::task::JoinError;
use tokio::time::{self, Duration};

use crate::domain::entity::{EnvironmentMap, ExitOutcome, SpawnRequest};
use crate::process::handle::{ProcessControl, ProcessHandle};

/// Time an aborted process gets to exit before it is killed.
const ABORT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Launches executables on the tokio runtime, inheriting the caller's stdio.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    abort_signal: Signal,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            abort_signal: Signal::SIGTERM,
        }
    }
}

impl ProcessRunner {
    /// Creates a new [`ProcessRunner`] which terminates aborted processes with
    /// `SIGTERM`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signal sent to a running process when it is aborted.
    pub fn with_abort_signal(mut self, signal: Signal) -> Self {
        self.abort_signal = signal;
        self
    }

    /// Launch the requested program. Must be called within a tokio runtime.
    ///
    /// The launch itself happens in a background task, so launch failures
    /// are reported by the returned handle. The request's environment is
    /// layered over the inherited one instead of replacing it.
    ///
    /// Aborting a running process sends the abort signal and settles the
    /// handle right away. The process is reaped in the background and killed
    /// if it outlives a grace period.
    pub fn spawn(&self, request: SpawnRequest) -> ProcessHandle {
        let control = ProcessControl::new();
        let detached = request.is_detached();
        let task = tokio::spawn(Self::run(request, control.clone(), self.abort_signal));
        ProcessHandle::new(control, detached, task)
    }

    async fn run(
        request: SpawnRequest,
        control: ProcessControl,
        abort_signal: Signal,
    ) -> Result<ExitOutcome, RunProcessError> {
        let program = request.program();

        if control.is_aborted() {
            return AbortedSnafu {
                program,
                reason: control.reason(),
            }
            .fail();
        }

        let mut child = Self::command(&request)
            .spawn()
            .context(LaunchSnafu { program })?;

        if let Some(pid) = child.id() {
            control.attach(pid);
        }
        tracing::debug!(
            program,
            pid = ?child.id(),
            detached = request.is_detached(),
            "Process launched"
        );

        let mut exits = listen(SignalKind::child()).context(WaitSnafu { program })?;

        let res = tokio::select! {
            status = Self::wait_exit(&mut child, &control, &mut exits) => status
                .map(Self::outcome)
                .context(WaitSnafu { program }),
            _ = control.token().cancelled() => {
                Self::abort(child, control.clone(), exits, abort_signal);
                AbortedSnafu {
                    program,
                    reason: control.reason(),
                }
                .fail()
            }
        };

        if let Ok(outcome) = &res {
            tracing::debug!(program, %outcome, "Process closed");
        }
        res
    }

    /// Wait until the child exits. The child is reaped through
    /// [`ProcessControl::reap`] so its PID is never signaled after reaping.
    async fn wait_exit(
        child: &mut Child,
        control: &ProcessControl,
        exits: &mut SignalStream,
    ) -> Result<ExitStatus, IoError> {
        loop {
            if let Some(status) = control.reap(child)? {
                return Ok(status);
            }
            if exits.recv().await.is_none() {
                let status = child.wait().await?;
                control.detach();
                return Ok(status);
            }
        }
    }

    /// Signal an aborted child and reap it in the background. The child is
    /// killed if it is still running after [`ABORT_GRACE_PERIOD`].
    fn abort(mut child: Child, control: ProcessControl, mut exits: SignalStream, signal: Signal) {
        if let Err(err) = control.kill(signal) {
            tracing::warn!(err = %err, "Could not signal aborted process");
            let _ = child.start_kill();
        }

        tokio::spawn(async move {
            let res = time::timeout(
                ABORT_GRACE_PERIOD,
                Self::wait_exit(&mut child, &control, &mut exits),
            )
            .await;

            let res = match res {
                Ok(res) => res,
                Err(_) => {
                    tracing::warn!("Aborted process is still running, killing it");
                    let _ = child.start_kill();
                    Self::wait_exit(&mut child, &control, &mut exits).await
                }
            };

            match res {
                Ok(status) => tracing::debug!(%status, "Aborted process reaped"),
                Err(err) => tracing::warn!(err = %err, "Could not reap aborted process"),
            }
        });
    }

    fn command(request: &SpawnRequest) -> Command {
        let mut command = Command::new(request.program());

        command
            .args(request.arguments())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(env) = request.environment() {
            command.envs(env);
        }

        if request.is_detached() {
            command.process_group(0);
        }

        command
    }

    fn outcome(status: ExitStatus) -> ExitOutcome {
        match status.code() {
            Some(0) => ExitOutcome::Success,
            Some(code) => ExitOutcome::FatalExit { code },
            None => ExitOutcome::Signaled {
                signal: status.signal().unwrap_or_default(),
            },
        }
    }
}

/// Launch `program` with the default [`ProcessRunner`].
///
/// `env` adds variables to the inherited environment, overriding inherited
/// variables of the same name.
pub fn spawn<S, I, A>(program: S, args: I, detached: bool, env: Option<EnvironmentMap>) -> ProcessHandle
where
    S: Into<String>,
    I: IntoIterator<Item = A>,
    A: Into<String>,
{
    let request = SpawnRequest::new(program)
        .args(args)
        .detached(detached)
        .env(env);
    ProcessRunner::new().spawn(request)
}

/// An error for running a process.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum RunProcessError {
    #[snafu(display("Could not launch {program}"))]
    Launch {
        program: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Process {program} was aborted: {reason}"))]
    Aborted { program: String, reason: String },
    #[snafu(display("Could not wait for {program}"))]
    Wait {
        program: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Process task failed"))]
    Join { source: JoinError },
}

impl RunProcessError {
    /// Returns `true` if the process was cancelled through
    /// [`ProcessControl::abort`].
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}
