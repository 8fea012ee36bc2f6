//! Shell command execution for command actions.
//!
//! A command runs as `<shell> -c <command> _ <args...>` in its own process
//! group, with the entry content on stdin. Completion, the timeout and the
//! invocation's cancel handle race; whichever loses is dropped and the whole
//! process group is killed.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::debug;

use super::invocation::CancelHandle;
use crate::error::ActionError;

/// How a command run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Exit status 0. `stdout` is decoded lossily and untrimmed.
    Completed { stdout: String },
    Cancelled,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct CommandRunner {
    shell: String,
    timeout: Duration,
}

enum Ended {
    Exited(io::Result<(ExitStatus, Vec<u8>, Vec<u8>)>),
    TimedOut,
    Cancelled,
}

impl CommandRunner {
    pub fn new(shell: impl Into<String>, timeout: Duration) -> Self {
        Self {
            shell: shell.into(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `command` with positional `args` and `input` on stdin.
    ///
    /// A non-zero exit is an error carrying the command's stderr; timeout and
    /// cancellation are ordinary outcomes.
    pub async fn run(
        &self,
        command: &str,
        args: &[String],
        input: &str,
        cancel: &CancelHandle,
    ) -> Result<CommandOutcome, ActionError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .arg("_")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(ActionError::Spawn)?;
        let pid = child.id();

        let mut pipes = PipeTasks {
            stdin: spawn_stdin_writer(&mut child, input.to_owned()),
            stdout: tokio::spawn(read_pipe(child.stdout.take())),
            stderr: tokio::spawn(read_pipe(child.stderr.take())),
        };

        let ended = {
            let completion = async {
                let status = child.wait().await?;
                let stdout = join_pipe(&mut pipes.stdout).await?;
                let stderr = join_pipe(&mut pipes.stderr).await?;
                Ok::<_, io::Error>((status, stdout, stderr))
            };

            tokio::select! {
                result = completion => Ended::Exited(result),
                _ = tokio::time::sleep(self.timeout) => Ended::TimedOut,
                _ = cancel.cancelled() => Ended::Cancelled,
            }
        };

        // Every early return below drops `pipes`, aborting the pipe tasks.
        let (status, stdout, stderr) = match ended {
            Ended::Exited(Ok(output)) => output,
            Ended::Exited(Err(e)) => {
                terminate(&mut child, pid).await;
                return Err(ActionError::Io(e));
            }
            Ended::TimedOut => {
                terminate(&mut child, pid).await;
                return Ok(CommandOutcome::TimedOut);
            }
            Ended::Cancelled => {
                terminate(&mut child, pid).await;
                return Ok(CommandOutcome::Cancelled);
            }
        };
        drop(pipes);

        let stderr = String::from_utf8_lossy(&stderr).into_owned();
        if status.success() {
            return Ok(CommandOutcome::Completed {
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
            });
        }
        match status.code() {
            Some(code) => Err(ActionError::ExitStatus { code, stderr }),
            None => Err(ActionError::Terminated { stderr }),
        }
    }
}

/// Tasks pumping the child's pipes. A background process that inherited a
/// pipe can keep its task alive after the command returns, so they are
/// aborted on drop.
struct PipeTasks {
    stdin: JoinHandle<()>,
    stdout: JoinHandle<io::Result<Vec<u8>>>,
    stderr: JoinHandle<io::Result<Vec<u8>>>,
}

impl Drop for PipeTasks {
    fn drop(&mut self) {
        self.stdin.abort();
        self.stdout.abort();
        self.stderr.abort();
    }
}

/// Feed `input` to the child's stdin from a separate task, then close it.
fn spawn_stdin_writer(child: &mut Child, input: String) -> JoinHandle<()> {
    let stdin = child.stdin.take();
    tokio::spawn(async move {
        let Some(mut stdin) = stdin else {
            return;
        };
        // Commands that ignore stdin may exit before reading it.
        if let Err(e) = stdin.write_all(input.as_bytes()).await {
            debug!(error = %e, "Command did not consume stdin");
        }
    })
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn join_pipe(task: &mut JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    task.await.map_err(io::Error::other)?
}

/// Kill the command and everything it spawned, then reap it.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = pid {
            if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                debug!(pid, error = %e, "Process group already gone");
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Err(e) = child.kill().await {
        debug!(error = %e, "Failed to kill command");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    fn runner(timeout: Duration) -> CommandRunner {
        CommandRunner::new("sh", timeout)
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_positional_arguments() {
        let outcome = runner(Duration::from_secs(5))
            .run("echo \"$1|$2\"", &args(&["a b", "c"]), "", &CancelHandle::new())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Completed {
                stdout: "a b|c\n".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_stdin_is_content() {
        let outcome = runner(Duration::from_secs(5))
            .run("tr a-z A-Z", &[], "hello", &CancelHandle::new())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Completed {
                stdout: "HELLO".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_command_ignoring_stdin() {
        let big = "x".repeat(1 << 20);
        let outcome = runner(Duration::from_secs(5))
            .run("echo done", &[], &big, &CancelHandle::new())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Completed {
                stdout: "done\n".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let err = runner(Duration::from_secs(5))
            .run("echo oops >&2; exit 3", &[], "", &CancelHandle::new())
            .await
            .unwrap_err();
        match err {
            ActionError::ExitStatus { code, stderr } => {
                assert_eq!(code, 3);
                assert_eq!(stderr.trim(), "oops");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_signal_death_carries_stderr() {
        let err = runner(Duration::from_secs(5))
            .run("echo dying >&2; kill -9 $$", &[], "", &CancelHandle::new())
            .await
            .unwrap_err();
        match err {
            ActionError::Terminated { stderr } => assert_eq!(stderr.trim(), "dying"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pipe_tasks_abort_on_drop() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let pipes = PipeTasks {
            stdin: tokio::spawn(async move {
                let _tx = tx;
                std::future::pending::<()>().await
            }),
            stdout: tokio::spawn(std::future::pending::<io::Result<Vec<u8>>>()),
            stderr: tokio::spawn(std::future::pending::<io::Result<Vec<u8>>>()),
        };
        drop(pipes);
        // The sender is released only once the stdin task is torn down.
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_missing_shell_is_spawn_error() {
        let err = CommandRunner::new("/nonexistent/shell", Duration::from_secs(1))
            .run("true", &[], "", &CancelHandle::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Spawn(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let started = Instant::now();
        let outcome = runner(Duration::from_millis(200))
            .run("sleep 5", &[], "", &CancelHandle::new())
            .await
            .unwrap();
        assert_eq!(outcome, CommandOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_timeout_kills_background_children() {
        let started = Instant::now();
        let outcome = runner(Duration::from_millis(200))
            .run("sleep 5 & wait", &[], "", &CancelHandle::new())
            .await
            .unwrap();
        assert_eq!(outcome, CommandOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_cancel() {
        let cancel = CancelHandle::new();
        let trigger = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                cancel.cancel();
            })
        };
        let started = Instant::now();
        let outcome = runner(Duration::from_secs(30))
            .run("sleep 5", &[], "", &cancel)
            .await
            .unwrap();
        trigger.await.unwrap();
        assert_eq!(outcome, CommandOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
