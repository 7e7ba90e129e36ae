//! Raster line source: turns an image into the pre-encoded line commands the
//! print session streams to the device.
//!
//! The session never looks inside a line; it only needs the uncompressed byte
//! length (for the print information command) and the ordered lines. PNG
//! format decoding is delegated to the `png` crate; this module owns the
//! grayscale conversion, scaling, thresholding, bit packing and TIFF-style
//! run compression.

use crate::error::{Error, Result};
use crate::raster_command::raster_transfer;
use crate::tape::{BYTES_PER_LINE, TOTAL_PINS};
use png::ColorType;
use std::path::Path;

/// Threshold below which a grayscale pixel prints black.
const BLACK_THRESHOLD: u8 = 127;

/// The encoded raster data for one image: the raw (uncompressed) byte count
/// plus the ordered, pre-encoded raster line commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBatch {
    raw_len: usize,
    lines: Vec<Vec<u8>>,
}

impl RasterBatch {
    pub fn new(raw_len: usize, lines: Vec<Vec<u8>>) -> Self {
        RasterBatch { raw_len, lines }
    }

    /// Uncompressed raster payload size (16 bytes per line).
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }
}

/// Boundary between the print session and image encoding. The session calls
/// this once per image, after the device has reported the installed tape.
pub trait RasterLineSource {
    fn encode(&self, image: &Path, width_dots: u32) -> Result<RasterBatch>;
}

/// Raster line source for PNG files on disk.
pub struct PngRasterSource;

impl RasterLineSource for PngRasterSource {
    fn encode(&self, image: &Path, width_dots: u32) -> Result<RasterBatch> {
        let (pixels, width, height) = load_grayscale(image)?;
        encode_bitmap(&pixels, width, height, width_dots)
    }
}

/// Encode an 8-bit grayscale bitmap into raster lines for a tape of
/// `width_dots` printable dots.
///
/// The image height is scaled to the printable width (the label runs
/// lengthwise along the tape, one raster line per image column) and centered
/// on the 128-pin head.
pub fn encode_bitmap(
    pixels: &[u8],
    width: usize,
    height: usize,
    width_dots: u32,
) -> Result<RasterBatch> {
    if width == 0 || height == 0 || pixels.len() != width * height {
        return Err(Error::Image(format!(
            "bad bitmap dimensions: {width}x{height} with {} pixels",
            pixels.len()
        )));
    }
    if width_dots == 0 || width_dots > TOTAL_PINS {
        return Err(Error::Image(format!(
            "target width {width_dots} exceeds the {TOTAL_PINS}-pin head"
        )));
    }

    let target_height = width_dots as usize;
    let target_width = (width * target_height / height).max(1);
    let scaled = scale_nearest(pixels, width, height, target_width, target_height);

    let pin_offset = ((TOTAL_PINS - width_dots) / 2) as usize;
    let mut lines = Vec::with_capacity(target_width);
    let mut raw_len = 0;

    for x in 0..target_width {
        let mut line = [0u8; BYTES_PER_LINE];
        for y in 0..target_height {
            if scaled[y * target_width + x] < BLACK_THRESHOLD {
                let pin = pin_offset + y;
                line[pin / 8] |= 1 << (7 - pin % 8);
            }
        }
        raw_len += BYTES_PER_LINE;
        lines.push(raster_transfer(&compress_tiff(&line)));
    }

    Ok(RasterBatch::new(raw_len, lines))
}

fn load_grayscale(path: &Path) -> Result<(Vec<u8>, usize, usize)> {
    let file = std::fs::File::open(path)?;
    let decoder = png::Decoder::new(file);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != png::BitDepth::Eight {
        return Err(Error::Image(format!(
            "unsupported PNG bit depth: {:?}",
            info.bit_depth
        )));
    }

    let gray = match info.color_type {
        ColorType::Grayscale => buf,
        ColorType::GrayscaleAlpha => buf
            .chunks(2)
            .map(|ga| {
                let alpha = ga[1] as u32;
                ((ga[0] as u32 * alpha + 255 * (255 - alpha)) / 255) as u8
            })
            .collect(),
        ColorType::Rgb => buf
            .chunks(3)
            .map(|rgb| ((rgb[0] as u32 + rgb[1] as u32 + rgb[2] as u32) / 3) as u8)
            .collect(),
        ColorType::Rgba => buf
            .chunks(4)
            .map(|rgba| {
                let alpha = rgba[3] as f32 / 255.0;
                let r = (rgba[0] as f32 * alpha + 255.0 * (1.0 - alpha)) as u32;
                let g = (rgba[1] as f32 * alpha + 255.0 * (1.0 - alpha)) as u32;
                let b = (rgba[2] as f32 * alpha + 255.0 * (1.0 - alpha)) as u32;
                ((r + g + b) / 3) as u8
            })
            .collect(),
        other => {
            return Err(Error::Image(format!(
                "unsupported PNG color type: {other:?}"
            )));
        }
    };

    Ok((gray, info.width as usize, info.height as usize))
}

fn scale_nearest(
    pixels: &[u8],
    width: usize,
    height: usize,
    target_width: usize,
    target_height: usize,
) -> Vec<u8> {
    if width == target_width && height == target_height {
        return pixels.to_vec();
    }
    let mut scaled = Vec::with_capacity(target_width * target_height);
    for y in 0..target_height {
        let src_y = y * height / target_height;
        for x in 0..target_width {
            let src_x = x * width / target_width;
            scaled.push(pixels[src_y * width + src_x]);
        }
    }
    scaled
}

/// TIFF-style run-length compression (PackBits sign convention): a run of
/// equal bytes becomes a negative count (two's complement of run length minus
/// one) followed by the byte; literals become a positive count followed by
/// the raw bytes. Runs cap at 129 bytes and literals at 128.
pub fn compress_tiff(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let run = run_length(&data[i..]);
        if run >= 2 {
            out.push((256 - (run - 1)) as u8);
            out.push(data[i]);
            i += run;
        } else {
            let start = i;
            i += 1;
            while i < data.len() && i - start < 128 && run_length(&data[i..]) < 2 {
                i += 1;
            }
            out.push((i - start - 1) as u8);
            out.extend_from_slice(&data[start..i]);
        }
    }

    out
}

/// Length of the leading run of equal bytes, capped at 129.
fn run_length(data: &[u8]) -> usize {
    match data.first() {
        Some(&first) => data.iter().take(129).take_while(|&&b| b == first).count(),
        None => 0,
    }
}
