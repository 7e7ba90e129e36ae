//! Status frame decoding for the PT-P710BT.
//!
//! The printer answers a status request (and announces asynchronous events)
//! with a fixed 32-byte frame. Every field sits at a fixed byte offset; there
//! is no length prefix and no delimiter, so anything other than exactly 32
//! bytes is a framing error.

use crate::error::{Error, Result};

/// Byte offsets into the 32-byte status frame.
mod offset {
    pub const ERROR_INFORMATION_1: usize = 8;
    pub const ERROR_INFORMATION_2: usize = 9;
    pub const MEDIA_WIDTH: usize = 10;
    pub const MEDIA_TYPE: usize = 11;
    pub const MODE: usize = 15;
    pub const MEDIA_LENGTH: usize = 17;
    pub const STATUS_TYPE: usize = 18;
    pub const PHASE_TYPE: usize = 19;
    pub const PHASE_NUMBER: usize = 20;
    pub const NOTIFICATION_NUMBER: usize = 22;
    pub const TAPE_COLOR: usize = 24;
    pub const TEXT_COLOR: usize = 25;
}

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident { $($flag:ident = $bit:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name(u8);

        impl $name {
            $(pub const $flag: $name = $name($bit);)+

            pub const fn from_bits(bits: u8) -> Self {
                Self(bits)
            }

            pub const fn bits(self) -> u8 {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Names of the set bits, in declared bit order.
            pub fn names(self) -> Vec<&'static str> {
                [$((Self::$flag, stringify!($flag)),)+]
                    .into_iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, name)| name)
                    .collect()
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

flag_set! {
    /// Various mode settings (ESC i M), also echoed back in the status frame.
    Mode {
        AUTO_CUT = 0x40,
        MIRROR_PRINTING = 0x80,
    }
}

flag_set! {
    /// Advanced mode settings (ESC i K). Each bit is an independent device
    /// behavior toggle; leaving NO_CHAIN_PRINT clear selects chain printing.
    AdvancedMode {
        NO_CHAIN_PRINT = 0x08,
        SPECIAL_TAPE = 0x10,
        HIGH_RESOLUTION = 0x40,
        NO_BUFFER_CLEARING = 0x80,
    }
}

flag_set! {
    /// First error information byte of the status frame.
    ErrorInformation1 {
        NO_MEDIA = 0x01,
        CUTTER_JAM = 0x04,
        WEAK_BATTERIES = 0x08,
        HIGH_VOLTAGE_ADAPTER = 0x40,
    }
}

flag_set! {
    /// Second error information byte of the status frame.
    ErrorInformation2 {
        WRONG_MEDIA = 0x01,
        COVER_OPEN = 0x10,
        OVERHEATING = 0x20,
    }
}

/// Status type discriminant (offset 18) selecting how a frame is handled.
///
/// An unrecognized discriminant is a protocol violation and is rejected
/// rather than mapped to a catch-all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusType {
    ReplyToStatusRequest,
    PrintingCompleted,
    ErrorOccurred,
    TurnedOff,
    Notification,
    PhaseChange,
}

impl StatusType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(StatusType::ReplyToStatusRequest),
            0x01 => Some(StatusType::PrintingCompleted),
            0x02 => Some(StatusType::ErrorOccurred),
            0x04 => Some(StatusType::TurnedOff),
            0x05 => Some(StatusType::Notification),
            0x06 => Some(StatusType::PhaseChange),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseType {
    EditingState,
    PrintingState,
    Unknown(u8),
}

impl PhaseType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => PhaseType::EditingState,
            0x01 => PhaseType::PrintingState,
            other => PhaseType::Unknown(other),
        }
    }
}

impl std::fmt::Display for PhaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseType::EditingState => write!(f, "EDITING_STATE"),
            PhaseType::PrintingState => write!(f, "PRINTING_STATE"),
            PhaseType::Unknown(byte) => write!(f, "UNKNOWN (0x{:02X})", byte),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaType {
    NoMedia,
    LaminatedTape,
    NonLaminatedTape,
    HeatShrinkTube,
    IncompatibleTape,
    Unknown(u8),
}

impl MediaType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => MediaType::NoMedia,
            0x01 => MediaType::LaminatedTape,
            0x03 => MediaType::NonLaminatedTape,
            0x11 => MediaType::HeatShrinkTube,
            0xFF => MediaType::IncompatibleTape,
            other => MediaType::Unknown(other),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::NoMedia => write!(f, "NO_MEDIA"),
            MediaType::LaminatedTape => write!(f, "LAMINATED_TAPE"),
            MediaType::NonLaminatedTape => write!(f, "NON_LAMINATED_TAPE"),
            MediaType::HeatShrinkTube => write!(f, "HEAT_SHRINK_TUBE"),
            MediaType::IncompatibleTape => write!(f, "INCOMPATIBLE_TAPE"),
            MediaType::Unknown(byte) => write!(f, "UNKNOWN (0x{:02X})", byte),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationNumber {
    NotAvailable,
    CoverOpen,
    CoverClosed,
    Unknown(u8),
}

impl NotificationNumber {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => NotificationNumber::NotAvailable,
            0x01 => NotificationNumber::CoverOpen,
            0x02 => NotificationNumber::CoverClosed,
            other => NotificationNumber::Unknown(other),
        }
    }
}

impl std::fmt::Display for NotificationNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationNumber::NotAvailable => write!(f, "NOT_AVAILABLE"),
            NotificationNumber::CoverOpen => write!(f, "COVER_OPEN"),
            NotificationNumber::CoverClosed => write!(f, "COVER_CLOSED"),
            NotificationNumber::Unknown(byte) => write!(f, "UNKNOWN (0x{:02X})", byte),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapeColor {
    White,
    Other,
    Clear,
    Red,
    Blue,
    Yellow,
    Green,
    Black,
    ClearWhiteText,
    MatteWhite,
    MatteClear,
    MatteSilver,
    SatinGold,
    SatinSilver,
    BlueD,
    RedD,
    FluorescentOrange,
    FluorescentYellow,
    BerryPinkS,
    LightGrayS,
    LimeGreenS,
    YellowF,
    PinkF,
    BlueF,
    WhiteHeatShrinkTube,
    WhiteFlexId,
    YellowFlexId,
    Cleaning,
    Stencil,
    Incompatible,
    Unknown(u8),
}

impl TapeColor {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x01 => TapeColor::White,
            0x02 => TapeColor::Other,
            0x03 => TapeColor::Clear,
            0x04 => TapeColor::Red,
            0x05 => TapeColor::Blue,
            0x06 => TapeColor::Yellow,
            0x07 => TapeColor::Green,
            0x08 => TapeColor::Black,
            0x09 => TapeColor::ClearWhiteText,
            0x20 => TapeColor::MatteWhite,
            0x21 => TapeColor::MatteClear,
            0x22 => TapeColor::MatteSilver,
            0x23 => TapeColor::SatinGold,
            0x24 => TapeColor::SatinSilver,
            0x30 => TapeColor::BlueD,
            0x31 => TapeColor::RedD,
            0x40 => TapeColor::FluorescentOrange,
            0x41 => TapeColor::FluorescentYellow,
            0x50 => TapeColor::BerryPinkS,
            0x51 => TapeColor::LightGrayS,
            0x52 => TapeColor::LimeGreenS,
            0x60 => TapeColor::YellowF,
            0x61 => TapeColor::PinkF,
            0x62 => TapeColor::BlueF,
            0x70 => TapeColor::WhiteHeatShrinkTube,
            0x90 => TapeColor::WhiteFlexId,
            0x91 => TapeColor::YellowFlexId,
            0xF0 => TapeColor::Cleaning,
            0xF1 => TapeColor::Stencil,
            0xFF => TapeColor::Incompatible,
            other => TapeColor::Unknown(other),
        }
    }
}

impl std::fmt::Display for TapeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TapeColor::White => write!(f, "WHITE"),
            TapeColor::Other => write!(f, "OTHER"),
            TapeColor::Clear => write!(f, "CLEAR"),
            TapeColor::Red => write!(f, "RED"),
            TapeColor::Blue => write!(f, "BLUE"),
            TapeColor::Yellow => write!(f, "YELLOW"),
            TapeColor::Green => write!(f, "GREEN"),
            TapeColor::Black => write!(f, "BLACK"),
            TapeColor::ClearWhiteText => write!(f, "CLEAR_WHITE_TEXT"),
            TapeColor::MatteWhite => write!(f, "MATTE_WHITE"),
            TapeColor::MatteClear => write!(f, "MATTE_CLEAR"),
            TapeColor::MatteSilver => write!(f, "MATTE_SILVER"),
            TapeColor::SatinGold => write!(f, "SATIN_GOLD"),
            TapeColor::SatinSilver => write!(f, "SATIN_SILVER"),
            TapeColor::BlueD => write!(f, "BLUE_D"),
            TapeColor::RedD => write!(f, "RED_D"),
            TapeColor::FluorescentOrange => write!(f, "FLUORESCENT_ORANGE"),
            TapeColor::FluorescentYellow => write!(f, "FLUORESCENT_YELLOW"),
            TapeColor::BerryPinkS => write!(f, "BERRY_PINK_S"),
            TapeColor::LightGrayS => write!(f, "LIGHT_GRAY_S"),
            TapeColor::LimeGreenS => write!(f, "LIME_GREEN_S"),
            TapeColor::YellowF => write!(f, "YELLOW_F"),
            TapeColor::PinkF => write!(f, "PINK_F"),
            TapeColor::BlueF => write!(f, "BLUE_F"),
            TapeColor::WhiteHeatShrinkTube => write!(f, "WHITE_HEAT_SHRINK_TUBE"),
            TapeColor::WhiteFlexId => write!(f, "WHITE_FLEX_ID"),
            TapeColor::YellowFlexId => write!(f, "YELLOW_FLEX_ID"),
            TapeColor::Cleaning => write!(f, "CLEANING"),
            TapeColor::Stencil => write!(f, "STENCIL"),
            TapeColor::Incompatible => write!(f, "INCOMPATIBLE"),
            TapeColor::Unknown(byte) => write!(f, "UNKNOWN (0x{:02X})", byte),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextColor {
    White,
    Other,
    Red,
    Blue,
    Black,
    Gold,
    BlueF,
    Cleaning,
    Stencil,
    Incompatible,
    Unknown(u8),
}

impl TextColor {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x01 => TextColor::White,
            0x02 => TextColor::Other,
            0x04 => TextColor::Red,
            0x05 => TextColor::Blue,
            0x08 => TextColor::Black,
            0x0A => TextColor::Gold,
            0x62 => TextColor::BlueF,
            0xF0 => TextColor::Cleaning,
            0xF1 => TextColor::Stencil,
            0xFF => TextColor::Incompatible,
            other => TextColor::Unknown(other),
        }
    }
}

impl std::fmt::Display for TextColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextColor::White => write!(f, "WHITE"),
            TextColor::Other => write!(f, "OTHER"),
            TextColor::Red => write!(f, "RED"),
            TextColor::Blue => write!(f, "BLUE"),
            TextColor::Black => write!(f, "BLACK"),
            TextColor::Gold => write!(f, "GOLD"),
            TextColor::BlueF => write!(f, "BLUE_F"),
            TextColor::Cleaning => write!(f, "CLEANING"),
            TextColor::Stencil => write!(f, "STENCIL"),
            TextColor::Incompatible => write!(f, "INCOMPATIBLE"),
            TextColor::Unknown(byte) => write!(f, "UNKNOWN (0x{:02X})", byte),
        }
    }
}

/// One received status frame, immutable once parsed.
#[derive(Debug)]
pub struct StatusFrame {
    raw: [u8; Self::LEN],
}

impl StatusFrame {
    pub const LEN: usize = 32;

    /// Parse a received buffer. Anything other than exactly 32 bytes is a
    /// framing error; the frame is never padded or truncated to fit.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let raw: [u8; Self::LEN] = data
            .try_into()
            .map_err(|_| Error::FrameLength(data.len()))?;
        Ok(StatusFrame { raw })
    }

    pub fn raw(&self) -> &[u8; Self::LEN] {
        &self.raw
    }

    pub fn error_information_1(&self) -> ErrorInformation1 {
        ErrorInformation1::from_bits(self.raw[offset::ERROR_INFORMATION_1])
    }

    pub fn error_information_2(&self) -> ErrorInformation2 {
        ErrorInformation2::from_bits(self.raw[offset::ERROR_INFORMATION_2])
    }

    /// Installed tape width in millimeters.
    pub fn media_width_mm(&self) -> u8 {
        self.raw[offset::MEDIA_WIDTH]
    }

    pub fn media_type(&self) -> MediaType {
        MediaType::from_byte(self.raw[offset::MEDIA_TYPE])
    }

    pub fn mode(&self) -> Mode {
        Mode::from_bits(self.raw[offset::MODE])
    }

    pub fn media_length(&self) -> u8 {
        self.raw[offset::MEDIA_LENGTH]
    }

    pub fn status_type(&self) -> Result<StatusType> {
        let byte = self.raw[offset::STATUS_TYPE];
        StatusType::from_byte(byte).ok_or(Error::UnknownStatusType(byte))
    }

    pub fn phase_type(&self) -> PhaseType {
        PhaseType::from_byte(self.raw[offset::PHASE_TYPE])
    }

    /// Phase number, big-endian. Its meaning depends on the phase type.
    pub fn phase_number(&self) -> u16 {
        u16::from_be_bytes([
            self.raw[offset::PHASE_NUMBER],
            self.raw[offset::PHASE_NUMBER + 1],
        ])
    }

    pub fn notification_number(&self) -> NotificationNumber {
        NotificationNumber::from_byte(self.raw[offset::NOTIFICATION_NUMBER])
    }

    pub fn tape_color(&self) -> TapeColor {
        TapeColor::from_byte(self.raw[offset::TAPE_COLOR])
    }

    pub fn text_color(&self) -> TextColor {
        TextColor::from_byte(self.raw[offset::TEXT_COLOR])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(fields: &[(usize, u8)]) -> StatusFrame {
        let mut raw = [0u8; StatusFrame::LEN];
        for &(offset, value) in fields {
            raw[offset] = value;
        }
        StatusFrame::parse(&raw).unwrap()
    }

    #[test]
    fn rejects_short_and_long_buffers() {
        for len in [0, 1, 16, 31, 33, 64] {
            let buf = vec![0u8; len];
            match StatusFrame::parse(&buf) {
                Err(Error::FrameLength(reported)) => assert_eq!(reported, len),
                other => panic!("expected FrameLength error for {len} bytes, got {other:?}"),
            }
        }
    }

    #[test]
    fn fields_come_from_documented_offsets() {
        let frame = frame_with(&[
            (8, 0x04),  // error information 1
            (9, 0x10),  // error information 2
            (10, 24),   // media width
            (11, 0x01), // media type
            (15, 0x40), // mode
            (17, 5),    // media length
            (18, 0x00), // status type
            (19, 0x01), // phase type
            (20, 0x00), // phase number hi
            (21, 0x14), // phase number lo
            (22, 0x02), // notification number
            (24, 0x08), // tape color
            (25, 0x01), // text color
        ]);

        assert_eq!(frame.error_information_1(), ErrorInformation1::CUTTER_JAM);
        assert_eq!(frame.error_information_2(), ErrorInformation2::COVER_OPEN);
        assert_eq!(frame.media_width_mm(), 24);
        assert_eq!(frame.media_type(), MediaType::LaminatedTape);
        assert_eq!(frame.mode(), Mode::AUTO_CUT);
        assert_eq!(frame.media_length(), 5);
        assert_eq!(
            frame.status_type().unwrap(),
            StatusType::ReplyToStatusRequest
        );
        assert_eq!(frame.phase_type(), PhaseType::PrintingState);
        assert_eq!(frame.phase_number(), 0x0014);
        assert_eq!(frame.notification_number(), NotificationNumber::CoverClosed);
        assert_eq!(frame.tape_color(), TapeColor::Black);
        assert_eq!(frame.text_color(), TextColor::White);
    }

    #[test]
    fn phase_number_is_big_endian() {
        let frame = frame_with(&[(18, 0x06), (20, 0x01), (21, 0x02)]);
        assert_eq!(frame.phase_number(), 0x0102);
    }

    #[test]
    fn unknown_status_type_is_rejected() {
        let frame = frame_with(&[(18, 0x7F)]);
        match frame.status_type() {
            Err(Error::UnknownStatusType(0x7F)) => {}
            other => panic!("expected UnknownStatusType, got {other:?}"),
        }
    }

    #[test]
    fn unknown_enum_values_stay_representable() {
        let frame = frame_with(&[(11, 0x42), (24, 0x7E), (25, 0x7E), (22, 0x7E), (19, 0x7E)]);
        assert_eq!(frame.media_type(), MediaType::Unknown(0x42));
        assert_eq!(frame.tape_color(), TapeColor::Unknown(0x7E));
        assert_eq!(frame.text_color(), TextColor::Unknown(0x7E));
        assert_eq!(
            frame.notification_number(),
            NotificationNumber::Unknown(0x7E)
        );
        assert_eq!(frame.phase_type(), PhaseType::Unknown(0x7E));
    }

    #[test]
    fn flag_names_follow_declared_bit_order() {
        let all = ErrorInformation1::from_bits(0xFF);
        assert_eq!(
            all.names(),
            vec![
                "NO_MEDIA",
                "CUTTER_JAM",
                "WEAK_BATTERIES",
                "HIGH_VOLTAGE_ADAPTER"
            ]
        );

        let some = ErrorInformation2::WRONG_MEDIA | ErrorInformation2::OVERHEATING;
        assert_eq!(some.names(), vec!["WRONG_MEDIA", "OVERHEATING"]);
        assert!(ErrorInformation2::default().names().is_empty());
    }

    #[test]
    fn flags_combine_with_bitor() {
        let mut advanced = AdvancedMode::default();
        advanced |= AdvancedMode::NO_CHAIN_PRINT;
        advanced |= AdvancedMode::HIGH_RESOLUTION;
        assert_eq!(advanced.bits(), 0x48);
        assert!(advanced.contains(AdvancedMode::NO_CHAIN_PRINT));
        assert!(!advanced.contains(AdvancedMode::SPECIAL_TAPE));
    }
}
