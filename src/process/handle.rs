use std::future::{Future, IntoFuture};
use std::io::Error as IoError;
use std::pin::Pin;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use snafu::prelude::*;
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::entity::ExitOutcome;
use crate::process::runner::{JoinSnafu, RunProcessError};

const DEFAULT_ABORT_REASON: &str = "aborted";

/// A signal sent to a running process, either by name or by its raw number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSignal {
    Named(Signal),
    /// A raw signal number. `0` only checks that the process exists.
    Code(i32),
}

impl KillSignal {
    fn resolve(self) -> Result<Option<Signal>, KillError> {
        match self {
            Self::Named(signal) => Ok(Some(signal)),
            Self::Code(0) => Ok(None),
            Self::Code(code) => Signal::try_from(code)
                .map(Some)
                .map_err(|_| InvalidSignalSnafu { code }.build()),
        }
    }
}

impl From<Signal> for KillSignal {
    fn from(value: Signal) -> Self {
        Self::Named(value)
    }
}

impl From<i32> for KillSignal {
    fn from(value: i32) -> Self {
        Self::Code(value)
    }
}

/// Controls of a launched process which may be used while its outcome is
/// being awaited.
///
/// Cancellation and signal delivery are independent: [`abort`] works before
/// the process exists and prevents the launch, while [`kill`] only reaches a
/// process that is already running.
///
/// [`abort`]: ProcessControl::abort
/// [`kill`]: ProcessControl::kill
#[derive(Debug, Clone)]
pub struct ProcessControl {
    token: CancellationToken,
    reason: Arc<OnceLock<String>>,
    pid: Arc<Mutex<Option<Pid>>>,
}

impl ProcessControl {
    pub(crate) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            reason: Arc::new(OnceLock::new()),
            pid: Arc::new(Mutex::new(None)),
        }
    }

    /// Cancel launching or running the process. Only the first call has an
    /// effect.
    pub fn abort<S: Into<String>>(&self, reason: S) {
        if self.reason.set(reason.into()).is_ok() {
            tracing::debug!(reason = %self.reason(), "Aborting process");
        }
        self.token.cancel();
    }

    /// Returns `true` if [`ProcessControl::abort`] has been called.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Send `signal` to the running process. Returns `false` without doing
    /// anything if the process hasn't been launched yet or has already been
    /// reaped.
    ///
    /// # Errors
    ///
    /// This function will return an error if the signal number is invalid or
    /// the system refuses to deliver it.
    pub fn kill<S: Into<KillSignal>>(&self, signal: S) -> Result<bool, KillError> {
        let signal = signal.into().resolve()?;

        let Some(pid) = *self.lock_pid() else {
            tracing::debug!("No running process to signal");
            return Ok(false);
        };

        match signal::kill(pid, signal) {
            Ok(()) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(err) => Err(err).context(DeliverSnafu { pid: pid.as_raw() }),
        }
    }

    pub(crate) fn reason(&self) -> String {
        self.reason
            .get()
            .cloned()
            .unwrap_or_else(|| DEFAULT_ABORT_REASON.to_owned())
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn attach(&self, pid: u32) {
        *self.lock_pid() = i32::try_from(pid).ok().map(Pid::from_raw);
    }

    pub(crate) fn detach(&self) {
        *self.lock_pid() = None;
    }

    /// Reap `child` if it has exited. The PID stays locked until it has been
    /// cleared, so [`ProcessControl::kill`] never signals a recycled PID.
    pub(crate) fn reap(&self, child: &mut Child) -> Result<Option<ExitStatus>, IoError> {
        let mut pid = self.lock_pid();
        let status = child.try_wait()?;
        if status.is_some() {
            *pid = None;
        }
        Ok(status)
    }

    fn lock_pid(&self) -> MutexGuard<'_, Option<Pid>> {
        match self.pid.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// An error for delivering a signal to a process.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum KillError {
    #[snafu(display("Could not send invalid signal {code}"))]
    InvalidSignal { code: i32 },
    #[snafu(display("Could not send signal to process {pid}"))]
    Deliver { pid: i32, source: Errno },
}

/// The single-shot outcome of a launched process together with its controls.
///
/// The handle can be awaited directly. A detached process that gets aborted
/// settles to [`ExitOutcome::Success`].
#[derive(Debug)]
pub struct ProcessHandle {
    control: ProcessControl,
    detached: bool,
    task: JoinHandle<Result<ExitOutcome, RunProcessError>>,
}

impl ProcessHandle {
    pub(crate) fn new(
        control: ProcessControl,
        detached: bool,
        task: JoinHandle<Result<ExitOutcome, RunProcessError>>,
    ) -> Self {
        Self {
            control,
            detached,
            task,
        }
    }

    /// Returns a clone of the process' controls.
    pub fn control(&self) -> ProcessControl {
        self.control.clone()
    }

    /// See [`ProcessControl::abort`].
    pub fn abort<S: Into<String>>(&self, reason: S) {
        self.control.abort(reason);
    }

    /// See [`ProcessControl::kill`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the signal can't be delivered.
    pub fn kill<S: Into<KillSignal>>(&self, signal: S) -> Result<bool, KillError> {
        self.control.kill(signal)
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Wait until the process closes or fails.
    ///
    /// # Errors
    ///
    /// This function will return an error if the process couldn't be
    /// launched, or it was aborted without being detached.
    pub async fn wait(self) -> Result<ExitOutcome, RunProcessError> {
        let res = match self.task.await {
            Ok(res) => res,
            Err(err) => Err(err).context(JoinSnafu),
        };

        match res {
            Err(err) if self.detached && err.is_cancellation() => {
                tracing::debug!(err = %err, "Detached process aborted");
                Ok(ExitOutcome::Success)
            }
            res => res,
        }
    }
}

impl IntoFuture for ProcessHandle {
    type Output = Result<ExitOutcome, RunProcessError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_without_process() {
        let control = ProcessControl::new();
        assert!(!control.kill(Signal::SIGTERM).unwrap());
        assert!(!control.kill(0).unwrap());
    }

    #[test]
    fn kill_error_invalid_signal() {
        let control = ProcessControl::new();
        assert!(matches!(
            control.kill(KillSignal::Code(4096)),
            Err(KillError::InvalidSignal { code: 4096 })
        ));
    }

    #[test]
    fn abort_keeps_first_reason() {
        let control = ProcessControl::new();
        assert!(!control.is_aborted());
        control.abort("first");
        control.abort("second");
        assert!(control.is_aborted());
        assert_eq!(control.reason(), "first");
    }

    #[tokio::test]
    async fn reap_clears_pid() {
        let control = ProcessControl::new();
        let mut child = tokio::process::Command::new("true").spawn().unwrap();
        control.attach(child.id().unwrap());

        let status = loop {
            if let Some(status) = control.reap(&mut child).unwrap() {
                break status;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        };
        assert!(status.success());
        assert!(control.lock_pid().is_none());
        assert!(!control.kill(Signal::SIGKILL).unwrap());
    }

    #[tokio::test]
    async fn reap_keeps_pid_while_running() {
        let control = ProcessControl::new();
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        control.attach(child.id().unwrap());

        assert!(control.reap(&mut child).unwrap().is_none());
        assert!(control.lock_pid().is_some());
        assert!(control.kill(0).unwrap());
    }

    #[test]
    fn abort_reason_default() {
        let control = ProcessControl::new();
        assert_eq!(control.reason(), DEFAULT_ABORT_REASON);
    }
}
