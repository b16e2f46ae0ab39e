// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A worker's OS process handle. Source and channel workers are real
//! processes, never in-process tasks — this wraps the `tokio::process`
//! spawn/wait/kill idiom generalized to either kind of worker.

use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn worker process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to signal worker process: {0}")]
    Signal(#[source] nix::Error),
}

/// Wraps a spawned child process with the `is_alive`/`exitcode`/
/// `terminate`/`join` operations both source and channel workers need.
pub struct WorkerProcess {
    child: Child,
    exit_code: Option<i32>,
}

impl WorkerProcess {
    /// Spawn `program` with `args`, inheriting stdio the way the
    /// supervisor's own logs capture worker output.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, ProcessError> {
        let child = Command::new(program).args(args).kill_on_drop(true).spawn().map_err(ProcessError::Spawn)?;
        Ok(Self { child, exit_code: None })
    }

    /// Non-blocking check: has the process exited, and with what code?
    /// `None` while still running.
    pub fn exitcode(&mut self) -> Option<i32> {
        if self.exit_code.is_some() {
            return self.exit_code;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.exit_code = Some(status.code().unwrap_or(-1));
                self.exit_code
            }
            _ => None,
        }
    }

    pub fn is_alive(&mut self) -> bool {
        self.exitcode().is_none()
    }

    /// Wait up to `timeout` for the process to exit on its own,
    /// returning its exit code if it did. `None` timeout waits
    /// indefinitely.
    pub async fn join(&mut self, timeout_dur: Option<Duration>) -> Option<i32> {
        if let Some(code) = self.exitcode() {
            return Some(code);
        }
        let wait = self.child.wait();
        let status = match timeout_dur {
            None => wait.await.ok(),
            Some(d) => timeout(d, wait).await.ok().and_then(|r| r.ok()),
        }?;
        let code = status.code().unwrap_or(-1);
        self.exit_code = Some(code);
        Some(code)
    }

    /// Force-kill the process with SIGTERM. Idempotent: killing an
    /// already-exited process is a no-op.
    pub fn terminate(&mut self) -> Result<(), ProcessError> {
        self.signal(Signal::SIGTERM)
    }

    /// Cooperative stop request: SIGUSR1, which a worker's own signal
    /// handler maps onto writing `OFFLINE` into its local state cell.
    /// Unlike `terminate`, the default disposition for an unhandled
    /// SIGUSR1 is to die — so a worker that hasn't installed the
    /// handler yet (or already exited) is no worse off than before.
    pub fn request_offline(&mut self) -> Result<(), ProcessError> {
        self.signal(Signal::SIGUSR1)
    }

    fn signal(&mut self, signal: Signal) -> Result<(), ProcessError> {
        if self.exitcode().is_some() {
            return Ok(());
        }
        let Some(raw_pid) = self.child.id() else {
            return Ok(());
        };
        let pid = Pid::from_raw(raw_pid as i32);
        match kill(pid, signal) {
            Ok(()) => Ok(()),
            // The process exited between our check and the signal.
            Err(nix::Error::ESRCH) => Ok(()),
            Err(err) => Err(ProcessError::Signal(err)),
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
