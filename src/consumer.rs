//! Command line for the external kcat consumer.

use crate::config::{BOOTSTRAP_SERVERS_KEY, ConfigError, ConfigSection};
use crate::window::TimeWindow;
use std::fmt;
use std::path::{Path, PathBuf};

mod process;

pub use process::{ConsumerProcess, KCAT_BANNER_PREFIX, StartupError, StderrMode, verify_consumer};

/// Value passed to kcat's `-m` flag.
pub const BATCH_LIMIT: u32 = 10;

/// Program path and argument list for one consumer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerInvocation {
    program: PathBuf,
    args: Vec<String>,
}

impl ConsumerInvocation {
    /// Build the kcat invocation for `topics` over `window`.
    ///
    /// `bootstrap.servers` becomes `-b`; every other entry of the section is
    /// forwarded as `-X key=value` without validation. The section itself is
    /// left untouched.
    pub fn build(
        program: impl Into<PathBuf>,
        section_name: &str,
        section: Option<&ConfigSection>,
        window: TimeWindow,
        topics: &[String],
    ) -> Result<Self, ConfigError> {
        let missing = || ConfigError::MissingBootstrapServers {
            section: section_name.to_string(),
        };
        let section = section.ok_or_else(missing)?;
        let brokers = section.get(BOOTSTRAP_SERVERS_KEY).ok_or_else(missing)?;

        let mut args = vec!["-b".to_string(), brokers.clone()];

        for (key, value) in section
            .iter()
            .filter(|(key, _)| key.as_str() != BOOTSTRAP_SERVERS_KEY)
        {
            args.push("-X".to_string());
            args.push(format!("{key}={value}"));
        }

        args.extend([
            "-m".to_string(),
            BATCH_LIMIT.to_string(),
            "-e".to_string(),
            "-C".to_string(),
            "-J".to_string(),
        ]);

        args.push("-t".to_string());
        args.push(topics.join(" "));
        args.push("-o".to_string());
        args.push(format!("s@{}", window.begin_ms));
        args.push("-o".to_string());
        args.push(format!("e@{}", window.end_ms));

        Ok(Self {
            program: program.into(),
            args,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Argument list with every `-X` value masked, safe for logging.
    pub fn redacted_args(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.args.len());
        let mut after_x = false;
        for arg in &self.args {
            if after_x {
                let key = arg.split_once('=').map(|(k, _)| k).unwrap_or(arg);
                out.push(format!("{key}=***"));
            } else {
                out.push(arg.clone());
            }
            after_x = arg == "-X";
        }
        out
    }

    pub(crate) fn command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ConsumerInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in self.redacted_args() {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}
