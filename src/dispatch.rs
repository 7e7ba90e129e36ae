//! Status dispatch: maps a decoded status frame to a report and a session
//! outcome.
//!
//! Reporting (human-readable, on stdout) and control flow are kept apart: the
//! returned value alone decides what the print session does next, so tests
//! can assert on outcomes without capturing output.

use crate::error::Result;
use crate::status::{PhaseType, StatusFrame, StatusType};

/// Terminal result of a print session, as reported by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    ErrorOccurred,
    TurnedOff,
}

impl JobOutcome {
    /// Process exit code convention: 0 success, 1 device error, 2 power loss.
    pub fn exit_code(self) -> i32 {
        match self {
            JobOutcome::Completed => 0,
            JobOutcome::ErrorOccurred => 1,
            JobOutcome::TurnedOff => 2,
        }
    }
}

/// Session-scoped state derived from status replies.
#[derive(Debug, Default)]
pub struct PrinterState {
    /// Media width in mm from the last reply-to-status-request frame.
    pub media_width_mm: Option<u8>,
}

/// Dispatch one status frame: print its report, update `state`, and return
/// `Some(outcome)` when the frame terminates the session.
///
/// A frame with an unknown status type is a protocol error and fails loudly.
pub fn dispatch(frame: &StatusFrame, state: &mut PrinterState) -> Result<Option<JobOutcome>> {
    match frame.status_type()? {
        StatusType::ReplyToStatusRequest => {
            handle_status_reply(frame, state);
            Ok(None)
        }
        StatusType::PrintingCompleted => {
            handle_printing_completed(frame);
            Ok(Some(JobOutcome::Completed))
        }
        StatusType::ErrorOccurred => {
            handle_error_occurred(frame);
            Ok(Some(JobOutcome::ErrorOccurred))
        }
        StatusType::TurnedOff => {
            handle_turned_off();
            Ok(Some(JobOutcome::TurnedOff))
        }
        StatusType::Notification => {
            handle_notification(frame);
            Ok(None)
        }
        StatusType::PhaseChange => {
            handle_phase_change(frame);
            Ok(None)
        }
    }
}

fn handle_status_reply(frame: &StatusFrame, state: &mut PrinterState) {
    println!("Printer Status");
    println!("--------------");
    println!("Media Width: {}mm", frame.media_width_mm());
    println!("Media Type: {}", frame.media_type());
    println!("Tape Color: {}", frame.tape_color());
    println!("Text Color: {}", frame.text_color());
    println!();

    state.media_width_mm = Some(frame.media_width_mm());
}

fn handle_printing_completed(frame: &StatusFrame) {
    println!("Printing Completed");
    println!("------------------");
    println!("Mode: {}", frame.mode().names().join(", "));
}

fn handle_error_occurred(frame: &StatusFrame) {
    println!("Error Occurred");
    println!("--------------");
    println!(
        "Error information 1: {}",
        frame.error_information_1().names().join(", ")
    );
    println!(
        "Error information 2: {}",
        frame.error_information_2().names().join(", ")
    );
    eprintln!("An error has occurred; exiting program");
}

fn handle_turned_off() {
    println!("Turned Off");
    println!("----------");
    eprintln!("Device was turned off");
}

fn handle_notification(frame: &StatusFrame) {
    println!("Notification");
    println!("------------");
    println!("Notification number: {}", frame.notification_number());
    println!();
}

fn handle_phase_change(frame: &StatusFrame) {
    let phase_type = frame.phase_type();
    println!("Phase Changed");
    println!("-------------");
    println!("Phase type: {}", phase_type);
    println!(
        "Phase state: {}",
        phase_state_name(phase_type, frame.phase_number())
    );
    println!();
}

/// Interpret the two-byte phase number against the vocabulary selected by the
/// phase type.
pub fn phase_state_name(phase_type: PhaseType, number: u16) -> String {
    match phase_type {
        PhaseType::EditingState => match number {
            0x0000 => "EDITING_STATE".to_string(),
            0x0001 => "FEED".to_string(),
            other => format!("UNKNOWN (0x{:04X})", other),
        },
        PhaseType::PrintingState => match number {
            0x0000 => "PRINTING".to_string(),
            0x0014 => "COVER_OPEN_WHILE_RECEIVING".to_string(),
            other => format!("UNKNOWN (0x{:04X})", other),
        },
        PhaseType::Unknown(_) => format!("0x{:04X}", number),
    }
}
