use super::RecordSink;
use super::record::StructuredRecord;
use chrono::{DateTime, Local};
use colored::Colorize;
use std::io::{self, Write};

/// Payload characters shown per row.
pub const PAYLOAD_PREVIEW_CHARS: usize = 200;

const TOPIC_WIDTH: usize = 50;
const PARTITION_WIDTH: usize = 4;
const OFFSET_WIDTH: usize = 10;
const TIMESTAMP_WIDTH: usize = 30;
const RULE_WIDTH: usize = 300;

/// Writes matches as a fixed-width, left-aligned five column table.
pub struct TableWriter<W: Write> {
    out: W,
    header_written: bool,
}

impl<W: Write> TableWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
        }
    }

    /// Print the header and rule. Later calls do nothing.
    pub fn write_header(&mut self) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }
        let header = format_columns("Topic Name", "P#", "Offset", "Timestamp", "Payload");
        writeln!(self.out, "{}", header.bold())?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        self.out.flush()?;
        self.header_written = true;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for TableWriter<W> {
    fn begin(&mut self) -> io::Result<()> {
        self.write_header()
    }

    fn emit(&mut self, record: &StructuredRecord) -> io::Result<()> {
        self.write_header()?;
        writeln!(self.out, "{}", format_row(record))?;
        self.out.flush()
    }
}

/// Format one match the way it appears in the table.
pub fn format_row(record: &StructuredRecord) -> String {
    format_columns(
        &record.topic,
        &record.partition.to_string(),
        &record.offset.to_string(),
        &format_timestamp(record.timestamp),
        &payload_preview(&record.payload_text()),
    )
}

/// Local time in ctime style, e.g. `Tue Nov 14 22:13:20 2023`.
pub fn format_timestamp(epoch_ms: i64) -> String {
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(ts) => ts
            .with_timezone(&Local)
            .format("%a %b %e %H:%M:%S %Y")
            .to_string(),
        None => epoch_ms.to_string(),
    }
}

/// Escape newlines and cut to [`PAYLOAD_PREVIEW_CHARS`] characters.
pub fn payload_preview(payload: &str) -> String {
    payload
        .replace('\r', "\\r")
        .replace('\n', "\\n")
        .chars()
        .take(PAYLOAD_PREVIEW_CHARS)
        .collect()
}

fn format_columns(topic: &str, partition: &str, offset: &str, ts: &str, payload: &str) -> String {
    format!(
        "{topic:<TOPIC_WIDTH$} {partition:<PARTITION_WIDTH$} {offset:<OFFSET_WIDTH$} {ts:<TIMESTAMP_WIDTH$} {payload:<PAYLOAD_PREVIEW_CHARS$}"
    )
}
