//! Streaming search over the consumer's line-delimited JSON output.

use crate::consumer::{ConsumerInvocation, ConsumerProcess, StderrMode};
use crate::filter::LineMatcher;
use std::io::{self, BufRead};
use std::process::ExitStatus;
use thiserror::Error;

pub mod display;
mod record;

pub use display::{PAYLOAD_PREVIEW_CHARS, TableWriter};
pub use record::StructuredRecord;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to start consumer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Line {line_number} from the consumer is not a valid record: {source}")]
    Decode {
        line_number: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to read consumer output: {0}")]
    Read(#[source] io::Error),
    #[error("Failed to write match: {0}")]
    Write(#[source] io::Error),
    #[error("Failed to wait for consumer: {0}")]
    Wait(#[source] io::Error),
}

/// Receives every record that matched, in stream order.
pub trait RecordSink {
    /// Called once the consumer is running, before any record.
    fn begin(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn emit(&mut self, record: &StructuredRecord) -> io::Result<()>;
}

impl RecordSink for Vec<StructuredRecord> {
    fn emit(&mut self, record: &StructuredRecord) -> io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Lines read, blank ones included
    pub lines_read: usize,
    pub records_matched: usize,
    /// The reader of our output went away (e.g. `| head`)
    pub output_closed: bool,
}

/// Applies one matcher to a stream of records.
pub struct SearchPipeline<'a> {
    matcher: &'a dyn LineMatcher,
}

impl<'a> SearchPipeline<'a> {
    pub fn new(matcher: &'a dyn LineMatcher) -> Self {
        Self { matcher }
    }

    /// Read `reader` to the end, one line at a time.
    ///
    /// Each line is decoded, matched against its raw text and, on a hit,
    /// handed to `sink` before the next line is read. A line that does not
    /// decode stops the run. A broken pipe from `sink` ends it quietly.
    pub fn run<R: BufRead, S: RecordSink + ?Sized>(
        &self,
        mut reader: R,
        sink: &mut S,
    ) -> Result<SearchStats, PipelineError> {
        let mut stats = SearchStats::default();
        let mut buf = String::new();

        loop {
            buf.clear();
            let read = reader.read_line(&mut buf).map_err(PipelineError::Read)?;
            if read == 0 {
                break;
            }
            stats.lines_read += 1;

            let line = buf.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }

            let record =
                StructuredRecord::from_line(line).map_err(|source| PipelineError::Decode {
                    line_number: stats.lines_read,
                    source,
                })?;

            if self.matcher.matches(line) {
                match sink.emit(&record) {
                    Ok(()) => stats.records_matched += 1,
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        stats.output_closed = true;
                        break;
                    }
                    Err(e) => return Err(PipelineError::Write(e)),
                }
            }
        }

        Ok(stats)
    }
}

/// Result of a complete consumer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub stats: SearchStats,
    pub exit_status: ExitStatus,
}

impl SearchOutcome {
    /// Whether the consumer exited non-zero after its output was read.
    ///
    /// A consumer stopped because our own output closed does not count.
    pub fn consumer_failed(&self) -> bool {
        !self.stats.output_closed && !self.exit_status.success()
    }
}

/// Spawn the consumer, stream its output through `matcher` into `sink`,
/// then collect its exit status.
///
/// `sink.begin()` runs only after a successful spawn. The child is killed if
/// anything fails before its output is exhausted, or if the sink's pipe
/// closes.
pub fn run_invocation<S: RecordSink + ?Sized>(
    invocation: &ConsumerInvocation,
    matcher: &dyn LineMatcher,
    sink: &mut S,
    stderr: StderrMode,
) -> Result<SearchOutcome, PipelineError> {
    let mut process =
        ConsumerProcess::spawn(invocation, stderr).map_err(|source| PipelineError::Spawn {
            program: invocation.program().display().to_string(),
            source,
        })?;
    tracing::debug!(pid = process.id(), "consumer started");

    let stats = match sink.begin() {
        Ok(()) => match process.take_reader() {
            Some(reader) => SearchPipeline::new(matcher).run(reader, sink)?,
            None => SearchStats::default(),
        },
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => SearchStats {
            output_closed: true,
            ..SearchStats::default()
        },
        Err(e) => return Err(PipelineError::Write(e)),
    };

    let exit_status = if stats.output_closed {
        tracing::debug!("output closed; stopping consumer");
        process.kill().map_err(PipelineError::Wait)?
    } else {
        process.wait().map_err(PipelineError::Wait)?
    };
    tracing::debug!(
        lines = stats.lines_read,
        matched = stats.records_matched,
        %exit_status,
        "consumer finished"
    );

    let outcome = SearchOutcome { stats, exit_status };
    if outcome.consumer_failed() {
        tracing::warn!(%exit_status, "consumer exited with a failure status");
    }

    Ok(outcome)
}
