//! Print session orchestration.
//!
//! A [`Printer`] owns its transport for the whole session; dropping the
//! printer (on any exit path, including early aborts and propagated errors)
//! releases the connection. The protocol is strictly sequential: every
//! expected reply is consumed with one blocking receive before the next send.

use crate::dispatch::{self, JobOutcome, PrinterState};
use crate::error::{Error, Result};
use crate::raster::{RasterBatch, RasterLineSource};
use crate::raster_command::RasterCommand;
use crate::status::{AdvancedMode, Mode, StatusFrame};
use crate::tape::TapeSpec;
use crate::transport::{RfcommSocket, Transport};
use std::path::PathBuf;

pub struct Printer<T: Transport> {
    transport: T,
    state: PrinterState,
}

impl Printer<RfcommSocket> {
    /// Connect over RFCOMM. The session exclusively owns the connection
    /// until the printer is dropped.
    pub fn connect(address: &str, channel: u8) -> Result<Self> {
        Ok(Printer::new(RfcommSocket::connect(address, channel)?))
    }
}

impl<T: Transport> Printer<T> {
    pub fn new(transport: T) -> Self {
        Printer {
            transport,
            state: PrinterState::default(),
        }
    }

    pub fn state(&self) -> &PrinterState {
        &self.state
    }

    /// Query and report the printer's status without printing anything.
    pub fn get_printer_info(&mut self) -> Result<Option<JobOutcome>> {
        self.reset_and_query()
    }

    /// Print one label per image, in order.
    ///
    /// Chain behavior, resolution and buffer handling come from
    /// `advanced_mode`; the raster data comes from `source`, encoded for the
    /// tape width the device reports during the reset phase. If the device is
    /// already in a terminal state the job aborts before any raster data is
    /// sent.
    pub fn print_labels<S: RasterLineSource>(
        &mut self,
        images: &[PathBuf],
        advanced_mode: AdvancedMode,
        source: &S,
    ) -> Result<JobOutcome> {
        if images.is_empty() {
            return Err(Error::EmptyJob);
        }

        if let Some(outcome) = self.reset_and_query()? {
            return Ok(outcome);
        }

        let width_mm = self.state.media_width_mm.ok_or(Error::MediaWidthUnknown)?;
        let tape = TapeSpec::from_width_mm(width_mm).ok_or(Error::UnsupportedTapeWidth(width_mm))?;
        log::info!("printing {} image(s) on {} tape", images.len(), tape);

        let batches = images
            .iter()
            .map(|image| source.encode(image, tape.width_dots))
            .collect::<Result<Vec<_>>>()?;

        let first = &batches[0];
        self.send_command(|c| {
            c.switch_to_raster_mode()
                .enable_status_notifications()
                .print_information(first.raw_len(), width_mm)
                .set_mode(Mode::AUTO_CUT)
                .set_advanced_mode(advanced_mode)
                .set_margin(0)
                .select_compression(true)
        })?;
        self.send_lines(first)?;

        for batch in &batches[1..] {
            self.send_command(|c| c.advance_to_next_label())?;
            self.send_lines(batch)?;
        }

        self.send_command(|c| c.print_and_feed())?;
        self.wait_for_outcome()
    }

    /// Invalidate, initialize, request status, and dispatch the single reply.
    fn reset_and_query(&mut self) -> Result<Option<JobOutcome>> {
        self.send_command(|c| c.invalidate().initialize().request_status())?;
        let frame = self.read_status()?;
        dispatch::dispatch(&frame, &mut self.state)
    }

    /// Dispatch device-driven status frames until one terminates the job.
    /// The transport's read timeout bounds the wait on an unresponsive
    /// device.
    fn wait_for_outcome(&mut self) -> Result<JobOutcome> {
        loop {
            let frame = self.read_status()?;
            if let Some(outcome) = dispatch::dispatch(&frame, &mut self.state)? {
                return Ok(outcome);
            }
        }
    }

    fn send_command(
        &mut self,
        build: impl FnOnce(&mut RasterCommand) -> &mut RasterCommand,
    ) -> Result<()> {
        let mut cmd = RasterCommand::new();
        build(&mut cmd);
        self.transport.send(&cmd.build())
    }

    fn send_lines(&mut self, batch: &RasterBatch) -> Result<()> {
        for line in batch.lines() {
            self.transport.send(line)?;
        }
        Ok(())
    }

    fn read_status(&mut self) -> Result<StatusFrame> {
        let mut buf = [0u8; StatusFrame::LEN];
        let n = self.transport.receive(&mut buf)?;
        StatusFrame::parse(&buf[..n])
    }
}
