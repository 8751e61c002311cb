// Version 2 picture opcodes
//
// Only the opcodes a raster picture may contain are recognized. Vector
// drawing opcodes are known solely so that their operands can be skipped.

/// V1 no-op byte
pub const V1_NOP: u8 = 0x00;
/// V1 version marker, followed by a version byte
pub const V1_VERSION: u8 = 0x11;
/// Byte that must follow the V1 version marker of a version 2 picture
pub const V1_END_OF_HEADER: u8 = 0xFF;

/// Plain version 2 header
pub const HEADER_VERSION_2: u16 = 0xFFFF;
/// Extended version 2 header with resolution fields
pub const HEADER_VERSION_2_EXTENDED: u16 = 0xFFFE;

/// Region size of a rectangular clip region
pub const RECT_REGION_SIZE: u16 = 0x000A;

/// Version 2 opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    Nop = 0x0000,
    Clip = 0x0001,
    PenSize = 0x0007,
    RgbFgColor = 0x001A,
    RgbBkColor = 0x001B,
    DefHilite = 0x001E,
    OpColor = 0x001F,
    ShortLine = 0x0022,
    FrameRect = 0x0030,
    PaintRect = 0x0031,
    FrameSameRect = 0x0038,
    PaintSameRect = 0x0039,
    FrameOval = 0x0050,
    PaintOval = 0x0051,
    FrameSameOval = 0x0058,
    PaintSameOval = 0x0059,
    FrameArc = 0x0060,
    PaintArc = 0x0061,
    FrameSameArc = 0x0068,
    PaintSameArc = 0x0069,
    FramePoly = 0x0070,
    PaintPoly = 0x0071,
    PackBitsRect = 0x0098,
    DirectBitsRect = 0x009A,
    ShortComment = 0x00A0,
    LongComment = 0x00A1,
    EndPic = 0x00FF,
    HeaderOp = 0x0C00,
}

/// How the operands of an opcode are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    /// A fixed number of bytes
    Fixed(usize),
    /// u16 total size (including itself), then the rest rounded up to even
    Polygon,
    /// u16 kind, u16 length, then `length` bytes rounded up to even
    LongComment,
    /// Parsed by the decoder itself
    Structured,
}

impl Opcode {
    /// Create from u16 value
    pub fn from_u16(value: u16) -> Option<Self> {
        let op = match value {
            0x0000 => Self::Nop,
            0x0001 => Self::Clip,
            0x0007 => Self::PenSize,
            0x001A => Self::RgbFgColor,
            0x001B => Self::RgbBkColor,
            0x001E => Self::DefHilite,
            0x001F => Self::OpColor,
            0x0022 => Self::ShortLine,
            0x0030 => Self::FrameRect,
            0x0031 => Self::PaintRect,
            0x0038 => Self::FrameSameRect,
            0x0039 => Self::PaintSameRect,
            0x0050 => Self::FrameOval,
            0x0051 => Self::PaintOval,
            0x0058 => Self::FrameSameOval,
            0x0059 => Self::PaintSameOval,
            0x0060 => Self::FrameArc,
            0x0061 => Self::PaintArc,
            0x0068 => Self::FrameSameArc,
            0x0069 => Self::PaintSameArc,
            0x0070 => Self::FramePoly,
            0x0071 => Self::PaintPoly,
            0x0098 => Self::PackBitsRect,
            0x009A => Self::DirectBitsRect,
            0x00A0 => Self::ShortComment,
            0x00A1 => Self::LongComment,
            0x00FF => Self::EndPic,
            0x0C00 => Self::HeaderOp,
            _ => return None,
        };
        Some(op)
    }

    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn operands(self) -> Operands {
        match self {
            Self::Nop
            | Self::DefHilite
            | Self::FrameSameRect
            | Self::PaintSameRect
            | Self::FrameSameOval
            | Self::PaintSameOval
            | Self::EndPic => Operands::Fixed(0),
            Self::PenSize | Self::FrameSameArc | Self::PaintSameArc => Operands::Fixed(4),
            Self::ShortComment => Operands::Fixed(2),
            Self::RgbFgColor | Self::RgbBkColor | Self::OpColor | Self::ShortLine => {
                Operands::Fixed(6)
            },
            Self::FrameRect | Self::PaintRect | Self::FrameOval | Self::PaintOval => {
                Operands::Fixed(8)
            },
            Self::FrameArc | Self::PaintArc => Operands::Fixed(12),
            Self::FramePoly | Self::PaintPoly => Operands::Polygon,
            Self::LongComment => Operands::LongComment,
            Self::Clip | Self::PackBitsRect | Self::DirectBitsRect | Self::HeaderOp => {
                Operands::Structured
            },
        }
    }

    /// True for vector drawing opcodes, which make a picture non-raster.
    ///
    /// Pen, color and comment opcodes change no pixels and do not count.
    pub fn is_drawing(self) -> bool {
        matches!(
            self,
            Self::ShortLine
                | Self::FrameRect
                | Self::PaintRect
                | Self::FrameSameRect
                | Self::PaintSameRect
                | Self::FrameOval
                | Self::PaintOval
                | Self::FrameSameOval
                | Self::PaintSameOval
                | Self::FrameArc
                | Self::PaintArc
                | Self::FrameSameArc
                | Self::PaintSameArc
                | Self::FramePoly
                | Self::PaintPoly
        )
    }
}

/// Round a byte count up to the next even number.
#[inline]
pub fn round_up_even(n: usize) -> usize {
    n + (n & 1)
}
