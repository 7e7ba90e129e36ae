//! PT-P710BT raster command builder.
//!
//! Based on the Brother "Raster Command Reference" for the PT-P710BT
//! (ESC/P-style opcodes, raster dynamic command mode). Commands accumulate in
//! a buffer; `build()` returns the exact wire bytes. Every method is total:
//! callers are responsible for value ranges such as the one-byte tape width.

use crate::status::{AdvancedMode, Mode};

/// Fluent builder for PT-P710BT command sequences.
///
/// # Example
///
/// ```
/// use pt710bt::raster_command::RasterCommand;
///
/// let mut cmd = RasterCommand::new();
/// cmd.invalidate().initialize().request_status();
/// let bytes = cmd.build();
/// // Send bytes to the printer, then read one 32-byte status frame.
/// ```
#[derive(Default)]
pub struct RasterCommand {
    buffer: Vec<u8>,
}

impl RasterCommand {
    pub fn new() -> Self {
        RasterCommand { buffer: Vec::new() }
    }

    /// 100 null bytes, clearing any partial command left in the printer's
    /// receive buffer by an interrupted session.
    pub fn invalidate(&mut self) -> &mut Self {
        self.buffer.extend_from_slice(&[0x00; 100]);
        self
    }

    /// ESC @ — reset command interpretation state.
    pub fn initialize(&mut self) -> &mut Self {
        self.buffer.extend_from_slice(b"\x1B\x40");
        self
    }

    /// ESC i a 01 — select the raster dynamic command mode.
    pub fn switch_to_raster_mode(&mut self) -> &mut Self {
        self.buffer.extend_from_slice(b"\x1B\x69\x61\x01");
        self
    }

    /// ESC i ! 00 — ask the printer to push status frames on its own.
    pub fn enable_status_notifications(&mut self) -> &mut Self {
        self.buffer.extend_from_slice(b"\x1B\x69\x21\x00");
        self
    }

    /// ESC i S — solicit exactly one status frame in reply.
    pub fn request_status(&mut self) -> &mut Self {
        self.buffer.extend_from_slice(b"\x1B\x69\x53");
        self
    }

    /// ESC i M — various mode settings bitset.
    pub fn set_mode(&mut self, mode: Mode) -> &mut Self {
        self.buffer.extend_from_slice(b"\x1B\x69\x4D");
        self.buffer.push(mode.bits());
        self
    }

    /// ESC i K — advanced mode settings bitset.
    pub fn set_advanced_mode(&mut self, mode: AdvancedMode) -> &mut Self {
        self.buffer.extend_from_slice(b"\x1B\x69\x4B");
        self.buffer.push(mode.bits());
        self
    }

    /// ESC i d — feed margin in dots, little-endian.
    pub fn set_margin(&mut self, dots: u16) -> &mut Self {
        self.buffer.extend_from_slice(b"\x1B\x69\x64");
        self.buffer.extend_from_slice(&dots.to_le_bytes());
        self
    }

    /// M — compression selector: TIFF run-length or none.
    pub fn select_compression(&mut self, tiff: bool) -> &mut Self {
        self.buffer.push(0x4D);
        self.buffer.push(if tiff { 0x02 } else { 0x00 });
        self
    }

    /// ESC i z — print information: tape width in mm plus the raster payload
    /// size.
    ///
    /// `raw_len` is the uncompressed raster byte count. The device encoding
    /// transmits it arithmetically shifted right by four (one raster line is
    /// 16 raw bytes, so the shifted value is the line count). The shift is
    /// reproduced literally from the documented exchange.
    pub fn print_information(&mut self, raw_len: usize, width_mm: u8) -> &mut Self {
        self.buffer.extend_from_slice(b"\x1B\x69\x7A\x84\x00");
        self.buffer.push(width_mm);
        self.buffer.push(0x00);
        self.buffer
            .extend_from_slice(&((raw_len >> 4) as u32).to_le_bytes());
        self.buffer.extend_from_slice(b"\x00\x00");
        self
    }

    /// Append one pre-encoded raster line verbatim. Compression and the
    /// transfer header have already been applied by the raster line source.
    pub fn raster_line(&mut self, line: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(line);
        self
    }

    /// FF — print the buffered page and start the next label without feeding.
    /// Sent between the images of a chain job.
    pub fn advance_to_next_label(&mut self) -> &mut Self {
        self.buffer.push(0x0C);
        self
    }

    /// SUB — print the last page and feed, cutting per the configured mode.
    pub fn print_and_feed(&mut self) -> &mut Self {
        self.buffer.push(0x1A);
        self
    }

    /// Return the accumulated wire bytes.
    pub fn build(self) -> Vec<u8> {
        self.buffer
    }
}

/// Wrap one compressed raster line in the raster transfer command
/// (G + little-endian payload length).
pub fn raster_transfer(payload: &[u8]) -> Vec<u8> {
    let mut line = Vec::with_capacity(payload.len() + 3);
    line.push(0x47);
    line.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    line.extend_from_slice(payload);
    line
}
