//! Driver for the Brother PT-P710BT label printer over Bluetooth RFCOMM.
//!
//! The protocol engine lives in [`raster_command`] (command encoding),
//! [`status`] (32-byte status frame decoding), [`dispatch`] (status handling
//! and job outcomes) and [`printer`] (session orchestration). [`transport`]
//! and [`raster`] provide the byte-stream and image-encoding collaborators.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod printer;
pub mod raster;
pub mod raster_command;
pub mod status;
pub mod tape;
pub mod transport;

pub use error::{Error, Result};
