//! Print session scenarios against a scripted transport.
//!
//! The mock transport records every send and serves a queue of canned status
//! frames, so the tests can assert both the exact wire traffic and the
//! session outcome without a device.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use pt710bt::dispatch::JobOutcome;
use pt710bt::error::{Error, Result};
use pt710bt::printer::Printer;
use pt710bt::raster::{RasterBatch, RasterLineSource};
use pt710bt::raster_command::raster_transfer;
use pt710bt::status::{AdvancedMode, StatusFrame};
use pt710bt::tape::TapeSpec;
use pt710bt::transport::Transport;

/// Shared record of everything the session sent, one entry per send call.
type WireLog = Rc<RefCell<Vec<Vec<u8>>>>;

struct ScriptedTransport {
    log: WireLog,
    replies: VecDeque<Vec<u8>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Vec<u8>>) -> (Self, WireLog) {
        let log = WireLog::default();
        (
            ScriptedTransport {
                log: log.clone(),
                replies: replies.into(),
            },
            log,
        )
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.log.borrow_mut().push(data.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let reply = self.replies.pop_front().ok_or(Error::ReadTimeout)?;
        let n = reply.len().min(buf.len());
        buf[..n].copy_from_slice(&reply[..n]);
        Ok(n)
    }
}

/// Raster source producing one recognizable line per image, so tests can see
/// batch ordering on the wire. Also records every requested dot width.
struct CannedSource {
    widths: RefCell<Vec<u32>>,
}

impl CannedSource {
    fn new() -> Self {
        CannedSource {
            widths: RefCell::new(Vec::new()),
        }
    }
}

impl RasterLineSource for CannedSource {
    fn encode(&self, image: &Path, width_dots: u32) -> Result<RasterBatch> {
        self.widths.borrow_mut().push(width_dots);
        let tag = image.to_string_lossy().into_owned().into_bytes();
        Ok(RasterBatch::new(16, vec![raster_transfer(&tag)]))
    }
}

fn frame(fields: &[(usize, u8)]) -> Vec<u8> {
    let mut raw = vec![0u8; StatusFrame::LEN];
    for &(offset, value) in fields {
        raw[offset] = value;
    }
    raw
}

fn status_reply(width_mm: u8) -> Vec<u8> {
    frame(&[(18, 0x00), (10, width_mm), (11, 0x01)])
}

fn printing_completed() -> Vec<u8> {
    frame(&[(18, 0x01), (15, 0x40)])
}

fn images(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

const RESET_SEQUENCE_SENDS: usize = 1;

#[test]
fn info_query_records_media_width() {
    let (transport, log) = ScriptedTransport::new(vec![status_reply(24)]);
    let mut printer = Printer::new(transport);

    let outcome = printer.get_printer_info().unwrap();
    assert_eq!(outcome, None);
    assert_eq!(printer.state().media_width_mm, Some(24));

    // 24mm tape resolves to the full 128-dot head.
    let tape = TapeSpec::from_width_mm(24).unwrap();
    assert_eq!(tape.width_dots, 128);

    // One send: 100 null bytes, ESC @, ESC i S.
    let sends = log.borrow();
    assert_eq!(sends.len(), RESET_SEQUENCE_SENDS);
    let mut expected = vec![0u8; 100];
    expected.extend_from_slice(b"\x1B\x40\x1B\x69\x53");
    assert_eq!(sends[0], expected);
}

#[test]
fn single_image_job_survives_a_notification_then_completes() {
    let replies = vec![
        status_reply(12),
        frame(&[(18, 0x05), (22, 0x01)]), // notification: cover open
        printing_completed(),
    ];
    let (transport, log) = ScriptedTransport::new(replies);
    let mut printer = Printer::new(transport);

    let source = CannedSource::new();
    let outcome = printer
        .print_labels(&images(&["label.png"]), AdvancedMode::NO_CHAIN_PRINT, &source)
        .unwrap();

    assert_eq!(outcome, JobOutcome::Completed);
    assert_eq!(outcome.exit_code(), 0);
    // Encoded for 12mm tape = 70 dots.
    assert_eq!(*source.widths.borrow(), vec![70]);

    let sends = log.borrow();
    // reset, setup, one raster line, print-and-feed
    assert_eq!(sends.len(), 4);

    // Setup carries print information for 16 raw bytes (>> 4 == 1 line) on
    // 12mm tape, then mode/advanced-mode/margin/compression.
    let setup = &sends[1];
    let mut expected = Vec::new();
    expected.extend_from_slice(b"\x1B\x69\x61\x01"); // raster mode
    expected.extend_from_slice(b"\x1B\x69\x21\x00"); // status notifications
    expected.extend_from_slice(&[0x1B, 0x69, 0x7A, 0x84, 0x00, 12, 0x00, 1, 0, 0, 0, 0x00, 0x00]);
    expected.extend_from_slice(b"\x1B\x69\x4D\x40"); // auto-cut
    expected.extend_from_slice(b"\x1B\x69\x4B\x08"); // no chain print
    expected.extend_from_slice(b"\x1B\x69\x64\x00\x00"); // zero margin
    expected.extend_from_slice(b"\x4D\x02"); // TIFF compression
    assert_eq!(setup, &expected);

    assert_eq!(sends[2], raster_transfer(b"label.png"));
    assert_eq!(sends[3], vec![0x1A]);
}

#[test]
fn device_error_at_reset_aborts_before_any_raster_data() {
    // First reply: ERROR_OCCURRED with CUTTER_JAM set.
    let (transport, log) = ScriptedTransport::new(vec![frame(&[(18, 0x02), (8, 0x04)])]);
    let mut printer = Printer::new(transport);

    let source = CannedSource::new();
    let outcome = printer
        .print_labels(&images(&["label.png"]), AdvancedMode::NO_CHAIN_PRINT, &source)
        .unwrap();

    assert_eq!(outcome, JobOutcome::ErrorOccurred);
    assert_eq!(outcome.exit_code(), 1);

    // Nothing was encoded and nothing beyond the reset sequence was sent.
    assert!(source.widths.borrow().is_empty());
    assert_eq!(log.borrow().len(), RESET_SEQUENCE_SENDS);
}

#[test]
fn three_image_chain_sends_two_advances_and_one_feed() {
    let replies = vec![status_reply(24), printing_completed()];
    let (transport, log) = ScriptedTransport::new(replies);
    let mut printer = Printer::new(transport);

    let source = CannedSource::new();
    let outcome = printer
        .print_labels(
            &images(&["a.png", "b.png", "c.png"]),
            AdvancedMode::default(), // chain printing: no NO_CHAIN_PRINT bit
            &source,
        )
        .unwrap();
    assert_eq!(outcome, JobOutcome::Completed);

    let sends = log.borrow();
    let advances = sends.iter().filter(|s| s.as_slice() == [0x0C]).count();
    let feeds = sends.iter().filter(|s| s.as_slice() == [0x1A]).count();
    assert_eq!(advances, 2);
    assert_eq!(feeds, 1);

    // Batches hit the wire in image order, with an advance between each.
    let expected_tail = vec![
        raster_transfer(b"a.png"),
        vec![0x0C],
        raster_transfer(b"b.png"),
        vec![0x0C],
        raster_transfer(b"c.png"),
        vec![0x1A],
    ];
    assert_eq!(&sends[sends.len() - 6..], expected_tail.as_slice());

    // The chain job still configures advanced mode, with no bits set.
    assert!(
        sends[1]
            .windows(4)
            .any(|w| w == [0x1B, 0x69, 0x4B, 0x00])
    );
}

#[test]
fn turned_off_during_poll_is_a_distinct_failure() {
    let replies = vec![
        status_reply(24),
        frame(&[(18, 0x06), (19, 0x01)]), // phase change: printing
        frame(&[(18, 0x04)]),             // turned off
    ];
    let (transport, _log) = ScriptedTransport::new(replies);
    let mut printer = Printer::new(transport);

    let outcome = printer
        .print_labels(
            &images(&["label.png"]),
            AdvancedMode::NO_CHAIN_PRINT,
            &CannedSource::new(),
        )
        .unwrap();
    assert_eq!(outcome, JobOutcome::TurnedOff);
    assert_eq!(outcome.exit_code(), 2);
}

#[test]
fn short_status_reply_is_a_framing_error() {
    let (transport, _log) = ScriptedTransport::new(vec![vec![0u8; 31]]);
    let mut printer = Printer::new(transport);

    match printer.get_printer_info() {
        Err(Error::FrameLength(31)) => {}
        other => panic!("expected FrameLength(31), got {other:?}"),
    }
}

#[test]
fn unknown_status_type_during_poll_fails_loudly() {
    let replies = vec![status_reply(24), frame(&[(18, 0x7F)])];
    let (transport, _log) = ScriptedTransport::new(replies);
    let mut printer = Printer::new(transport);

    match printer.print_labels(
        &images(&["label.png"]),
        AdvancedMode::NO_CHAIN_PRINT,
        &CannedSource::new(),
    ) {
        Err(Error::UnknownStatusType(0x7F)) => {}
        other => panic!("expected UnknownStatusType, got {other:?}"),
    }
}

#[test]
fn unsupported_tape_width_aborts_before_encoding() {
    let (transport, log) = ScriptedTransport::new(vec![status_reply(10)]);
    let mut printer = Printer::new(transport);

    let source = CannedSource::new();
    match printer.print_labels(&images(&["label.png"]), AdvancedMode::NO_CHAIN_PRINT, &source) {
        Err(Error::UnsupportedTapeWidth(10)) => {}
        other => panic!("expected UnsupportedTapeWidth, got {other:?}"),
    }
    assert!(source.widths.borrow().is_empty());
    assert_eq!(log.borrow().len(), RESET_SEQUENCE_SENDS);
}

#[test]
fn empty_job_is_rejected_without_traffic() {
    let (transport, log) = ScriptedTransport::new(vec![]);
    let mut printer = Printer::new(transport);

    match printer.print_labels(&[], AdvancedMode::NO_CHAIN_PRINT, &CannedSource::new()) {
        Err(Error::EmptyJob) => {}
        other => panic!("expected EmptyJob, got {other:?}"),
    }
    assert!(log.borrow().is_empty());
}

#[test]
fn exhausted_device_reads_surface_as_timeout() {
    // Device never reports completion; the scripted queue running dry plays
    // the role of the transport read timeout.
    let replies = vec![status_reply(24)];
    let (transport, _log) = ScriptedTransport::new(replies);
    let mut printer = Printer::new(transport);

    match printer.print_labels(
        &images(&["label.png"]),
        AdvancedMode::NO_CHAIN_PRINT,
        &CannedSource::new(),
    ) {
        Err(Error::ReadTimeout) => {}
        other => panic!("expected ReadTimeout, got {other:?}"),
    }
}
