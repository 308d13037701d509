//! Bounded execution of the small tools probes ask for facts.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How long a single `--version`-style command may run.
pub const TOOL_TIMEOUT: Duration = Duration::from_millis(1500);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a tool that exited in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// stdout followed by stderr.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Run `program` with `args`, killing it if it outlives `timeout`.
///
/// Returns `None` when the tool could not start or was killed.
pub fn run_tool(program: &Path, args: &[&str], timeout: Duration) -> Option<ToolOutput> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| tracing::debug!("Failed to run {}: {}", program.display(), e))
        .ok()?;

    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let Some(success) = wait_with_deadline(&mut child, timeout) else {
        // A grandchild may still hold the pipes; leave the readers detached.
        tracing::debug!(
            "{} did not finish within {}ms, killed",
            program.display(),
            timeout.as_millis()
        );
        return None;
    };

    Some(ToolOutput {
        success,
        stdout: stdout.and_then(|h| h.join().ok()).unwrap_or_default(),
        stderr: stderr.and_then(|h| h.join().ok()).unwrap_or_default(),
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Poll until exit. On timeout the child is killed and reaped.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Option<bool> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status.success()),
            Ok(None) if Instant::now() < deadline => thread::sleep(POLL_INTERVAL),
            Ok(None) | Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }
}
