use std::io::{self, Cursor, Read};

use crate::bounded::{BoundedReader, SizeExceeded};
use crate::framer::{FramerOptions, FramingFailure, RecordFramer, TextEncoding};

fn rec_framer(input: &str) -> RecordFramer<Cursor<Vec<u8>>> {
    RecordFramer::new(
        Cursor::new(input.as_bytes().to_vec()),
        FramerOptions::default().with_component("REC"),
    )
}

fn texts<R: Read>(framer: RecordFramer<R>) -> Vec<String> {
    framer
        .map(|record| record.into_text().unwrap().text)
        .collect()
}

#[test_log::test]
fn single_record_with_uid_hint() {
    let mut framer = rec_framer("BEGIN:REC\nUID:abc\nEND:REC\n");

    let record = framer.next().unwrap();
    assert_eq!(record.uid_hint(), Some("abc"));
    assert_eq!(record.into_text().unwrap().text, "BEGIN:REC\nUID:abc\nEND:REC\n");

    assert!(framer.next().is_none());
    assert!(framer.take_failure().is_none());
    assert_eq!(framer.records_emitted(), 1);
}

#[test_log::test]
fn nested_component_stays_inside_record() {
    let records = texts(rec_framer(
        "junk\nBEGIN:REC\nBEGIN:SUB\nEND:SUB\nEND:REC\n",
    ));
    assert_eq!(
        records,
        vec!["BEGIN:REC\nBEGIN:SUB\nEND:SUB\nEND:REC\n".to_string()]
    );
}

#[test]
fn noise_between_records_is_dropped() {
    let records = texts(rec_framer(
        "preamble\nBEGIN:REC\nA:1\nEND:REC\n\r\nstray line\nBEGIN:REC\nA:2\nEND:REC\ntrailer",
    ));
    assert_eq!(records.len(), 2);
    assert!(records[1].contains("A:2"));
}

#[test]
fn markers_are_case_insensitive_and_crlf_is_kept() {
    let mut framer = rec_framer("begin:rec\r\nUid:  x-1 \r\nend:rec\r\n");
    let record = framer.next().unwrap();
    assert_eq!(record.uid_hint(), Some("x-1"));
    assert_eq!(
        record.into_text().unwrap().text,
        "begin:rec\r\nUid:  x-1 \r\nend:rec\r\n"
    );
}

#[test]
fn missing_final_newline_is_synthesized() {
    let records = texts(rec_framer("BEGIN:REC\nA:1\nEND:REC"));
    assert_eq!(records, vec!["BEGIN:REC\nA:1\nEND:REC\n".to_string()]);
}

#[test]
fn only_first_top_level_uid_is_hinted() {
    let mut framer = rec_framer("BEGIN:REC\nBEGIN:SUB\nUID:inner\nEND:SUB\nUID:outer\nUID:second\nEND:REC\n");
    assert_eq!(framer.next().unwrap().uid_hint(), Some("outer"));
}

#[test]
fn other_components_do_not_open_records() {
    let mut framer = rec_framer("BEGIN:OTHER\nUID:x\nEND:OTHER\n");
    assert!(framer.next().is_none());
    assert_eq!(framer.records_emitted(), 0);
}

#[test_log::test]
fn truncated_trailing_record_is_counted_not_emitted() {
    let mut framer = rec_framer("BEGIN:REC\nA:1\nEND:REC\nBEGIN:REC\nA:2\n");
    assert!(framer.next().is_some());
    assert!(framer.next().is_none());
    assert_eq!(framer.discarded_partial_records(), 1);
    assert!(framer.take_failure().is_none());
}

#[test]
fn large_record_spills_to_disk_intact() {
    let body: String = (0..500).map(|i| format!("NOTE:line {i}\n")).collect();
    let input = format!("BEGIN:REC\n{body}END:REC\n");

    let framer = RecordFramer::new(
        Cursor::new(input.clone().into_bytes()),
        FramerOptions::default()
            .with_component("REC")
            .with_flush_threshold(64)
            .with_spill_threshold(256),
    );
    assert_eq!(texts(framer), vec![input]);
}

#[test]
fn latin1_fallback() {
    let mut bytes = b"BEGIN:REC\nFN:Ren".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"\nEND:REC\n");

    let mut framer = RecordFramer::new(
        Cursor::new(bytes),
        FramerOptions::default().with_component("REC"),
    );
    let text = framer.next().unwrap().into_text().unwrap();
    assert_eq!(text.encoding, TextEncoding::Latin1);
    assert!(text.text.contains("FN:René"));
}

#[test_log::test]
fn size_limit_stops_framing() {
    let input = "BEGIN:REC\nA:1\nEND:REC\nBEGIN:REC\nA:2\nEND:REC\n";
    let limited = BoundedReader::new(Cursor::new(input.as_bytes().to_vec()), Some(30));
    let mut framer = RecordFramer::new(limited, FramerOptions::default().with_component("REC"));

    // The first record ends at byte 22, under the limit.
    let first = framer.next().unwrap().into_text().unwrap();
    assert!(first.text.contains("A:1"));

    assert!(framer.next().is_none());
    assert!(framer.next().is_none());
    match framer.take_failure() {
        Some(FramingFailure::SizeExceeded(SizeExceeded { limit, .. })) => assert_eq!(limit, 30),
        other => panic!("expected size failure, got {other:?}"),
    }
}

struct Broken;

impl Read for Broken {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("device unplugged"))
    }
}

#[test]
fn io_failure_is_captured() {
    let mut framer = RecordFramer::new(Broken, FramerOptions::default());
    assert!(framer.next().is_none());
    assert!(matches!(framer.take_failure(), Some(FramingFailure::Io(_))));
}
