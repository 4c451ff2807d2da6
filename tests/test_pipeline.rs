use message_finder::filter::{CompiledPattern, MatchOptions};
use message_finder::pipeline::PipelineError;
use message_finder::{RecordSink, SearchPipeline, StructuredRecord, TableWriter};
use std::cell::RefCell;
use std::io::{self, BufReader, Cursor, Read};
use std::rc::Rc;

fn record_line(offset: i64, payload: &str) -> String {
    format!(
        r#"{{"topic":"orders","partition":1,"offset":{offset},"tstype":"create","ts":1700000000000,"broker":0,"key":null,"payload":"{payload}"}}"#
    )
}

fn pattern(terms: &[&str]) -> CompiledPattern {
    CompiledPattern::compile(terms, MatchOptions::default()).unwrap()
}

#[test]
fn test_emits_only_matches_in_input_order() {
    let payloads = ["keep one", "drop", "keep two", "drop", "drop", "keep three"];
    let input: String = payloads
        .iter()
        .enumerate()
        .map(|(i, p)| record_line(i as i64, p) + "\n")
        .collect();

    let matcher = pattern(&["keep"]);
    let mut sink: Vec<StructuredRecord> = Vec::new();
    let stats = SearchPipeline::new(&matcher)
        .run(Cursor::new(input), &mut sink)
        .unwrap();

    assert_eq!(stats.lines_read, 6);
    assert_eq!(stats.records_matched, 3);
    let offsets: Vec<i64> = sink.iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![0, 2, 5]);
}

#[test]
fn test_no_matches_is_a_valid_outcome() {
    let input = format!("{}\n{}\n", record_line(1, "a"), record_line(2, "b"));
    let matcher = pattern(&["zzz"]);
    let mut sink: Vec<StructuredRecord> = Vec::new();

    let stats = SearchPipeline::new(&matcher)
        .run(Cursor::new(input), &mut sink)
        .unwrap();

    assert_eq!(stats.records_matched, 0);
    assert!(sink.is_empty());
}

#[test]
fn test_malformed_line_aborts_the_stream() {
    let input = format!(
        "{}\n{{\"topic\":\"orders\"}}\n{}\n",
        record_line(1, "hit"),
        record_line(3, "hit")
    );
    let matcher = pattern(&["hit"]);
    let mut sink: Vec<StructuredRecord> = Vec::new();

    let result = SearchPipeline::new(&matcher).run(Cursor::new(input), &mut sink);

    assert!(matches!(
        result,
        Err(PipelineError::Decode { line_number: 2, .. })
    ));
    assert_eq!(sink.len(), 1, "records before the bad line stay delivered");
}

#[derive(Debug, PartialEq)]
enum Event {
    Read(usize),
    Emit(i64),
}

/// Hands out one line per `read` call and records when it does so
struct LineFeeder {
    lines: Vec<String>,
    next: usize,
    events: Rc<RefCell<Vec<Event>>>,
}

impl Read for LineFeeder {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(line) = self.lines.get(self.next) else {
            return Ok(0);
        };
        assert!(buf.len() >= line.len(), "test lines must fit the buffer");
        buf[..line.len()].copy_from_slice(line.as_bytes());
        self.next += 1;
        self.events.borrow_mut().push(Event::Read(self.next));
        Ok(line.len())
    }
}

struct RecordingSink {
    events: Rc<RefCell<Vec<Event>>>,
}

impl RecordSink for RecordingSink {
    fn emit(&mut self, record: &StructuredRecord) -> io::Result<()> {
        self.events.borrow_mut().push(Event::Emit(record.offset));
        Ok(())
    }
}

#[test]
fn test_each_line_is_handled_before_the_next_is_read() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let feeder = LineFeeder {
        lines: vec![
            record_line(1, "match") + "\n",
            record_line(2, "skip") + "\n",
            record_line(3, "match") + "\n",
        ],
        next: 0,
        events: Rc::clone(&events),
    };
    let mut sink = RecordingSink {
        events: Rc::clone(&events),
    };

    let matcher = pattern(&["match"]);
    SearchPipeline::new(&matcher)
        .run(BufReader::new(feeder), &mut sink)
        .unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            Event::Read(1),
            Event::Emit(1),
            Event::Read(2),
            Event::Read(3),
            Event::Emit(3),
        ]
    );
}

/// Accepts `capacity` records, then behaves like a pipe whose reader left
struct ClosingSink {
    capacity: usize,
    events: Rc<RefCell<Vec<Event>>>,
}

impl RecordSink for ClosingSink {
    fn emit(&mut self, record: &StructuredRecord) -> io::Result<()> {
        if self.capacity == 0 {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        self.capacity -= 1;
        self.events.borrow_mut().push(Event::Emit(record.offset));
        Ok(())
    }
}

#[test]
fn test_broken_pipe_stops_reading_without_error() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let feeder = LineFeeder {
        lines: (1..=5).map(|i| record_line(i, "match") + "\n").collect(),
        next: 0,
        events: Rc::clone(&events),
    };
    let mut sink = ClosingSink {
        capacity: 1,
        events: Rc::clone(&events),
    };

    let matcher = pattern(&["match"]);
    let stats = SearchPipeline::new(&matcher)
        .run(BufReader::new(feeder), &mut sink)
        .unwrap();

    assert!(stats.output_closed);
    assert_eq!(stats.records_matched, 1);
    assert_eq!(
        *events.borrow(),
        vec![Event::Read(1), Event::Emit(1), Event::Read(2)]
    );
}

#[test]
fn test_other_write_errors_still_fail() {
    struct FullDisk;
    impl RecordSink for FullDisk {
        fn emit(&mut self, _: &StructuredRecord) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    let input = record_line(1, "match") + "\n";
    let matcher = pattern(&["match"]);
    let result = SearchPipeline::new(&matcher).run(Cursor::new(input), &mut FullDisk);

    assert!(matches!(result, Err(PipelineError::Write(_))));
}

#[test]
fn test_key_is_searched_through_the_raw_line() {
    let input = r#"{"topic":"orders","partition":0,"offset":4,"ts":1700000000000,"key":"customer-77","payload":"x"}"#;
    let matcher = pattern(&["customer-77"]);
    let mut sink: Vec<StructuredRecord> = Vec::new();

    SearchPipeline::new(&matcher)
        .run(Cursor::new(input), &mut sink)
        .unwrap();

    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0].offset, 4);
}

#[test]
fn test_table_writer_as_sink() {
    colored::control::set_override(false);
    let input = format!("{}\n{}\n", record_line(10, "x"), record_line(11, "y"));
    let matcher = pattern(&["\"y\""]);
    let mut table = TableWriter::new(Vec::new());
    table.begin().unwrap();

    SearchPipeline::new(&matcher)
        .run(Cursor::new(input), &mut table)
        .unwrap();

    let out = String::from_utf8(table.into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Topic Name"));
    assert!(lines[2].starts_with("orders"));
    assert!(lines[2].contains(" 11 "));
    assert!(lines[2].trim_end().ends_with('y'));
}
