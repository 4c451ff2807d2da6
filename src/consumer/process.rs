use super::ConsumerInvocation;
use std::io::{self, BufReader};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use thiserror::Error;

/// Start of the text `kcat -V` prints.
pub const KCAT_BANNER_PREFIX: &str = "kcat - Apache Kafka producer and consumer tool";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Cannot run consumer '{program}'. Check that kcat is installed or pass --kcat: {source}")]
    ConsumerNotFound {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("'{program}' does not look like kcat; '-V' printed: {banner}")]
    UnrecognizedConsumer { program: String, banner: String },
}

/// Where the consumer's stderr goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StderrMode {
    #[default]
    Discard,
    Inherit,
}

impl From<StderrMode> for Stdio {
    fn from(mode: StderrMode) -> Self {
        match mode {
            StderrMode::Discard => Stdio::null(),
            StderrMode::Inherit => Stdio::inherit(),
        }
    }
}

/// Run `<program> -V` and check the banner; returns the first banner line.
pub fn verify_consumer(program: &Path) -> Result<String, StartupError> {
    let program_display = program.display().to_string();
    let output = Command::new(program)
        .arg("-V")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|source| StartupError::ConsumerNotFound {
            program: program_display.clone(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let banner = stdout.trim();
    if banner.starts_with(KCAT_BANNER_PREFIX) {
        Ok(banner.lines().next().unwrap_or_default().to_string())
    } else {
        Err(StartupError::UnrecognizedConsumer {
            program: program_display,
            banner: banner.lines().next().unwrap_or_default().to_string(),
        })
    }
}

/// A running consumer whose stdout is piped to us.
///
/// Dropping it kills and reaps the child if [`ConsumerProcess::wait`] has
/// not been called, so no exit path leaves a stray kcat behind.
#[derive(Debug)]
pub struct ConsumerProcess {
    child: Child,
    stdout: Option<ChildStdout>,
    finished: bool,
}

impl ConsumerProcess {
    pub fn spawn(invocation: &ConsumerInvocation, stderr: StderrMode) -> io::Result<Self> {
        let mut child = invocation
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .spawn()?;

        let stdout = child.stdout.take();
        Ok(Self {
            child,
            stdout,
            finished: false,
        })
    }

    /// Take the buffered stdout reader. Only the first call returns `Some`.
    pub fn take_reader(&mut self) -> Option<BufReader<ChildStdout>> {
        self.stdout.take().map(BufReader::new)
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Wait for the child to exit after its output is exhausted.
    pub fn wait(mut self) -> io::Result<ExitStatus> {
        drop(self.stdout.take());
        let status = self.child.wait()?;
        self.finished = true;
        Ok(status)
    }

    /// Stop the child early and reap it.
    pub fn kill(mut self) -> io::Result<ExitStatus> {
        drop(self.stdout.take());
        // Already exited is fine; wait() below still reaps it.
        let _ = self.child.kill();
        let status = self.child.wait()?;
        self.finished = true;
        Ok(status)
    }
}

impl Drop for ConsumerProcess {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.child.kill() {
            tracing::debug!(pid = self.child.id(), "kill on drop failed: {e}");
        }
        let _ = self.child.wait();
    }
}
