// src/system/process.rs

//! The process-spawning seam and its real implementation.

use log::{debug, warn};
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command as StdCommand, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// How long output is still collected after a timed-out run was killed.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// How an entry's script is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationMode {
    /// The global interpreter is spawned directly, no shell involved.
    Global,
    /// A shell sources the environment's activation script, then runs its interpreter.
    VirtualEnv {
        /// The activation script that is sourced first.
        activate: PathBuf,
        /// The interpreter inside the environment.
        interpreter: PathBuf,
    },
}

/// A fully resolved child-process command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable looked up on `PATH` (or a path).
    pub program: String,
    /// Arguments after the program.
    pub args: Vec<String>,
    /// Working directory of the child.
    pub cwd: PathBuf,
    /// How the command was derived.
    pub mode: InvocationMode,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        match shlex::try_join(words) {
            Ok(line) => write!(f, "{}", line),
            Err(_) => write!(f, "{} {:?}", self.program, self.args),
        }
    }
}

/// What a finished (or killed) child left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Everything written to stdout, lossily decoded.
    pub stdout: String,
    /// Everything written to stderr, lossily decoded.
    pub stderr: String,
    /// `true` when the run was killed for exceeding its limit.
    pub timed_out: bool,
}

/// Spawns child processes and collects their output.
///
/// An `Err` means the process could not be started (or waited on). A child that runs
/// and exits non-zero is an `Ok` with its exit code.
pub trait ProcessSpawner {
    /// Runs `invocation` to completion, killing it once `timeout` has passed.
    fn run(&self, invocation: &Invocation, timeout: Option<Duration>) -> io::Result<CapturedOutput>;
}

/// Spawns real OS processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl ProcessSpawner for SystemSpawner {
    fn run(&self, invocation: &Invocation, timeout: Option<Duration>) -> io::Result<CapturedOutput> {
        let clean_cwd = dunce::simplified(&invocation.cwd);

        let mut command = StdCommand::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(clean_cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // A limited run leads its own process group so a timeout also reaches whatever
        // the child started (the venv shell forks the interpreter, for one).
        if timeout.is_some() {
            own_process_group(&mut command);
        }
        let mut child = command.spawn()?;
        debug!("Spawned '{}' (PID: {})", invocation, child.id());

        // Both pipes are drained on their own threads so a chatty child cannot fill one
        // pipe and deadlock while we wait on it.
        let stdout = child.stdout.take().map(spawn_drain);
        let stderr = child.stderr.take().map(spawn_drain);

        let mut timed_out = false;
        let status = match timeout {
            None => child.wait()?,
            Some(limit) => match child.wait_timeout(limit)? {
                Some(status) => status,
                None => {
                    warn!(
                        "'{}' exceeded {}s, killing PID {}",
                        invocation,
                        limit.as_secs(),
                        child.id()
                    );
                    timed_out = true;
                    if let Err(e) = kill_tree(&mut child) {
                        warn!("Failed to kill process group {}: {}", child.id(), e);
                    }
                    child.wait()?
                }
            },
        };

        // A descendant that left the group could keep a pipe open forever, so a limited
        // run never waits on its output without a bound.
        let drain_limit = if timed_out { Some(DRAIN_GRACE) } else { timeout };
        Ok(CapturedOutput {
            exit_code: status.code(),
            stdout: collect(stdout, drain_limit),
            stderr: collect(stderr, drain_limit),
            timed_out,
        })
    }
}

#[cfg(unix)]
fn own_process_group(command: &mut StdCommand) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut StdCommand) {}

/// Kills the child and every process in its group.
#[cfg(unix)]
fn kill_tree(child: &mut Child) -> io::Result<()> {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pid = i32::try_from(child.id())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    killpg(Pid::from_raw(pid), Signal::SIGKILL)?;
    Ok(())
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) -> io::Result<()> {
    child.kill()
}

fn spawn_drain(stream: impl Read + Send + 'static) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver is gone if the caller stopped waiting; nothing to report then.
        let _ = tx.send(drain(stream));
    });
    rx
}

fn collect(output: Option<Receiver<String>>, limit: Option<Duration>) -> String {
    let Some(rx) = output else {
        return String::new();
    };
    let received = match limit {
        None => rx.recv().ok(),
        Some(limit) => rx.recv_timeout(limit).ok(),
    };
    received.unwrap_or_else(|| {
        warn!("Child output was not closed in time; it is dropped");
        String::new()
    })
}

fn drain(mut stream: impl Read) -> String {
    let mut bytes = Vec::new();
    if let Err(e) = stream.read_to_end(&mut bytes) {
        warn!("Failed to read child output: {}", e);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sh(script: &str, cwd: PathBuf) -> Invocation {
        Invocation {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            cwd,
            mode: InvocationMode::Global,
        }
    }

    #[test]
    fn test_captures_both_streams_and_exit_code() {
        let dir = tempdir().unwrap();
        let output = SystemSpawner
            .run(&sh("echo out; echo err >&2; exit 3", dir.path().to_path_buf()), None)
            .unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.timed_out);
    }

    #[test]
    fn test_runs_in_requested_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

        let output = SystemSpawner
            .run(&sh("cat marker.txt", dir.path().to_path_buf()), None)
            .unwrap();

        assert_eq!(output.stdout, "here");
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let dir = tempdir().unwrap();
        let invocation = Invocation {
            program: "definitely-not-a-real-program-7f3a".to_string(),
            args: vec![],
            cwd: dir.path().to_path_buf(),
            mode: InvocationMode::Global,
        };
        let err = SystemSpawner.run(&invocation, None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_timeout_kills_child() {
        let dir = tempdir().unwrap();
        let output = SystemSpawner
            .run(
                &sh("exec sleep 5", dir.path().to_path_buf()),
                Some(Duration::from_millis(200)),
            )
            .unwrap();
        assert!(output.timed_out);
        assert_eq!(output.exit_code, None);
    }

    #[test]
    fn test_timeout_kills_processes_the_child_started() {
        let dir = tempdir().unwrap();
        // The shell forks `sleep` and a background job instead of exec-ing, so the
        // direct child is not the only process holding the pipes.
        let script = "(sleep 1; touch late.txt) & sleep 4; echo done";
        let started = std::time::Instant::now();

        let output = SystemSpawner
            .run(&sh(script, dir.path().to_path_buf()), Some(Duration::from_millis(300)))
            .unwrap();

        assert!(output.timed_out);
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
        assert!(!output.stdout.contains("done"));

        thread::sleep(Duration::from_millis(1500));
        assert!(!dir.path().join("late.txt").exists(), "background job survived the kill");
    }

    #[test]
    fn test_display_is_a_shell_line_for_the_same_command() {
        let invocation = sh("echo 'hi there'", PathBuf::from("/tmp"));
        let words = shlex::split(&invocation.to_string()).unwrap();
        assert_eq!(words, vec!["sh", "-c", "echo 'hi there'"]);
    }
}
