use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to connect to printer {address} (channel {channel}): {source}")]
    Connect {
        address: String,
        channel: u8,
        source: std::io::Error,
    },

    #[error("invalid bluetooth address: {0}")]
    InvalidAddress(String),

    #[error("timed out waiting for data from the printer")]
    ReadTimeout,

    #[error("printer closed the connection")]
    Disconnected,

    #[error("invalid status frame: expected 32 bytes, received {0}")]
    FrameLength(usize),

    #[error("unknown status type 0x{0:02X}")]
    UnknownStatusType(u8),

    #[error("unsupported tape width: {0} mm")]
    UnsupportedTapeWidth(u8),

    #[error("printer did not report its media width")]
    MediaWidthUnknown,

    #[error("print job contains no images")]
    EmptyJob,

    #[error("unsupported image: {0}")]
    Image(String),

    #[error("PNG decode error: {0}")]
    Png(#[from] png::DecodingError),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
