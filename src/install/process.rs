// src/install/process.rs

//! Run one build or install command with its output streamed line by line
//!
//! stdout and stderr share a single pipe so lines reach the sink in the
//! order the command wrote them. The child runs in its own process group;
//! cancelling kills the whole group so `make -j` style children go too.

use crate::buildsys::CommandSpec;
use crate::error::Result;
use crate::install::CancelToken;
use crate::sink::LogSink;
use nix::fcntl::OFlag;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::{Pid, pipe2};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// How a streamed command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommandStatus {
    Succeeded,
    /// Exited non-zero, or was killed by a signal (`None`)
    Failed(Option<i32>),
    /// The program could not be located or launched
    NotFound(String),
    Cancelled,
}

/// Status plus everything the command printed
#[derive(Debug)]
pub(crate) struct CommandRun {
    pub status: CommandStatus,
    pub output: String,
}

impl CommandRun {
    fn not_found(reason: String) -> Self {
        Self {
            status: CommandStatus::NotFound(reason),
            output: String::new(),
        }
    }
}

/// Run `spec` in `workdir` with `env` added to the inherited environment
///
/// Every output line goes to `sink` as soon as it is read. stdin is closed.
/// The returned output is the concatenation of all lines, used for
/// dependency diagnosis.
pub(crate) fn run_streamed(
    spec: &CommandSpec,
    workdir: &Path,
    env: &[(&str, &OsStr)],
    sink: &dyn LogSink,
    cancel: &CancelToken,
    poll_interval: Duration,
) -> Result<CommandRun> {
    let program = match resolve_program(spec.program(), workdir) {
        Ok(program) => program,
        Err(reason) => {
            warn!("Cannot locate '{}': {}", spec.program(), reason);
            return Ok(CommandRun::not_found(reason));
        }
    };

    // Close-on-exec so commands spawned concurrently do not inherit it
    let (read_end, write_end) = pipe2(OFlag::O_CLOEXEC).map_err(std::io::Error::from)?;
    let write_end_err = write_end.try_clone()?;

    let mut command = Command::new(&program);
    command
        .args(spec.arguments())
        .current_dir(workdir)
        .envs(env.iter().copied())
        .stdin(Stdio::null())
        .stdout(Stdio::from(write_end))
        .stderr(Stdio::from(write_end_err))
        .process_group(0);

    debug!("Spawning {} in {}", spec, workdir.display());
    let spawned = command.spawn();
    // Our copies of the write end must close or the reader never sees EOF
    drop(command);

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            warn!("Failed to launch '{}': {}", spec, e);
            return Ok(CommandRun::not_found(e.to_string()));
        }
    };

    let (tx, rx) = mpsc::channel();
    let pipe = File::from(read_end);
    let reader = thread::Builder::new()
        .name("srctrack-output".to_string())
        .spawn(move || forward_lines(pipe, tx));
    let reader = match reader {
        Ok(handle) => handle,
        Err(e) => {
            kill_group(&mut child);
            let _ = child.wait();
            return Err(e.into());
        }
    };

    let mut output = String::new();
    loop {
        if cancel.is_cancelled() {
            debug!("Cancelling {} (pid {})", spec, child.id());
            kill_group(&mut child);
            let _ = child.wait();
            // The reader exits on its own once the group's pipe ends close
            return Ok(CommandRun {
                status: CommandStatus::Cancelled,
                output,
            });
        }

        match rx.recv_timeout(poll_interval) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let line = text.trim_end_matches(|c| c == '\n' || c == '\r');
                sink.line(line);
                output.push_str(line);
                output.push('\n');
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let status = child.wait()?;
    let _ = reader.join();

    let status = if status.success() {
        CommandStatus::Succeeded
    } else {
        debug!("{} exited with {}", spec, status);
        CommandStatus::Failed(status.code())
    };
    Ok(CommandRun { status, output })
}

/// Programs containing a `/` are relative to the working directory; bare
/// names are looked up on `PATH`
fn resolve_program(program: &str, workdir: &Path) -> std::result::Result<PathBuf, String> {
    if program.is_empty() {
        return Err("empty command".to_string());
    }

    if program.contains('/') {
        let path = workdir.join(program);
        if path.exists() {
            Ok(path)
        } else {
            Err(format!("{} does not exist", path.display()))
        }
    } else {
        which::which(program).map_err(|e| e.to_string())
    }
}

fn forward_lines(pipe: File, tx: Sender<Vec<u8>>) {
    let mut reader = BufReader::new(pipe);
    loop {
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("Output pipe read failed: {}", e);
                break;
            }
        }
    }
}

fn kill_group(child: &mut Child) {
    let pgid = Pid::from_raw(child.id() as i32);
    if let Err(e) = killpg(pgid, Signal::SIGKILL) {
        debug!("killpg({}) failed: {}, killing child only", pgid, e);
        let _ = child.kill();
    }
}
