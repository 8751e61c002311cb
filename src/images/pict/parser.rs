// PICT resource decoder
//
// Interprets the opcode stream of a 'PICT' resource and rasterizes its
// pixmap opcodes onto a single canvas covering the picture frame.
//
// A picture starts with a 2-byte size (ignored) and its frame rectangle,
// followed by a byte-oriented V1 token stream. The V1 version token either
// ends the picture (version 1, nothing to draw) or switches to the
// word-oriented V2 opcode stream. Once the V2 stream reaches its end opcode
// the V1 scan resumes, so trailing zero padding is accepted.

use super::opcodes::{
    HEADER_VERSION_2, HEADER_VERSION_2_EXTENDED, Opcode, Operands, RECT_REGION_SIZE,
    V1_END_OF_HEADER, V1_NOP, V1_VERSION, round_up_even,
};
use crate::common::BeReader;
use crate::common::error::{Error, Result};
use crate::images::DecodeOptions;
use crate::images::clut::ColorTable;
use crate::images::pixmap::{Fixed, PixMapHeader};
use crate::images::raster::{AlphaColor, RasterImage, Rect, RectConstant, TranslatedView};

/// Transfer mode bit requesting dithering, which has no effect on decoding
const MODE_DITHER: i16 = 0x0040;
/// The source-copy transfer mode
const MODE_SRC_COPY: i16 = 0;

/// Decoded 'PICT' resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    bounds: Rect,
    version: u8,
    is_raster: bool,
    canvas: RasterImage,
}

impl Picture {
    /// Decode a 'PICT' resource with default options.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_with(data, &DecodeOptions::default())
    }

    /// Decode a 'PICT' resource.
    ///
    /// Decoding succeeds for vector pictures too; whether the result can be
    /// exported is a separate question answered by [`Picture::ensure_exportable`].
    pub fn decode_with(data: &[u8], options: &DecodeOptions) -> Result<Self> {
        let mut reader = BeReader::new(data);
        let _size = reader.read_u16()?;
        let bounds = Rect::read(&mut reader)?;
        log::debug!("picture frame {:?}, {} bytes", bounds, data.len());

        let decoder = PictureDecoder {
            reader,
            options,
            picture: Picture {
                bounds,
                version: 0,
                is_raster: true,
                canvas: RasterImage::new(bounds),
            },
        };
        decoder.run()
    }

    /// Picture frame
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// 1 or 2 once a version token was seen, otherwise 0
    pub fn version(&self) -> u8 {
        self.version
    }

    /// False once any vector drawing opcode was encountered
    pub fn is_raster(&self) -> bool {
        self.is_raster
    }

    pub fn canvas(&self) -> &RasterImage {
        &self.canvas
    }

    /// Check that the picture may be exported as a raster image.
    pub fn ensure_exportable(&self) -> Result<()> {
        if self.version != 2 {
            return Err(Error::Export(format!(
                "version must be 2 to export 'PICT' resource, not {}",
                self.version
            )));
        }
        if !self.is_raster {
            return Err(Error::Export("cannot export vector picture".into()));
        }
        Ok(())
    }

    /// Row-major RGBA8 bytes of an exportable picture.
    pub fn to_rgba_bytes(&self) -> Result<Vec<u8>> {
        self.ensure_exportable()?;
        Ok(self.canvas.to_rgba_bytes())
    }
}

/// Decoder states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Scanning V1 tokens one byte at a time
    ReadingV1,
    /// Expecting the V2 header opcode and record
    ReadingV2Header,
    /// Dispatching V2 opcodes until the end opcode
    DispatchingV2Ops,
    Done,
}

/// Where a bits opcode places its tile
struct Placement {
    src: Rect,
    dst: Rect,
}

struct PictureDecoder<'data, 'opts> {
    reader: BeReader<'data>,
    options: &'opts DecodeOptions,
    picture: Picture,
}

impl PictureDecoder<'_, '_> {
    fn run(mut self) -> Result<Picture> {
        let mut state = State::ReadingV1;
        loop {
            state = match state {
                State::ReadingV1 => self.scan_v1()?,
                State::ReadingV2Header => self.read_v2_header()?,
                State::DispatchingV2Ops => self.dispatch_v2_op()?,
                State::Done => return Ok(self.picture),
            };
        }
    }

    fn scan_v1(&mut self) -> Result<State> {
        if self.reader.is_empty() {
            return Ok(State::Done);
        }
        match self.reader.read_u8()? {
            V1_NOP => Ok(State::ReadingV1),
            V1_VERSION => match self.reader.read_u8()? {
                0x01 => {
                    self.picture.version = 1;
                    log::debug!("version 1 picture");
                    Ok(State::Done)
                },
                0x02 => {
                    self.picture.version = 2;
                    if self.reader.read_u8()? != V1_END_OF_HEADER {
                        return Err(Error::InvalidFormat(
                            "expected end of version 1 'PICT' resource".into(),
                        ));
                    }
                    Ok(State::ReadingV2Header)
                },
                other => Err(Error::Unsupported(format!(
                    "only version 1 and 2 'PICT' resources are supported, not {}",
                    other
                ))),
            },
            op => Err(Error::Unsupported(format!(
                "unsupported op ${:02x} in 'PICT' resource",
                op
            ))),
        }
    }

    fn read_v2_header(&mut self) -> Result<State> {
        if self.reader.read_u16()? != Opcode::HeaderOp.code() {
            return Err(Error::InvalidFormat(
                "expected header of version 2 'PICT' resource".into(),
            ));
        }

        let bounds = match self.reader.read_u16()? {
            HEADER_VERSION_2 => {
                self.reader.skip(2)?;
                let left = Fixed::read(&mut self.reader)?.floor();
                let top = Fixed::read(&mut self.reader)?.floor();
                let right = Fixed::read(&mut self.reader)?.floor();
                let bottom = Fixed::read(&mut self.reader)?.floor();
                self.reader.skip(4)?;
                Rect::new(top, left, bottom, right)
            },
            HEADER_VERSION_2_EXTENDED => {
                self.reader.skip(2)?;
                if Fixed::read(&mut self.reader)? != Fixed::DPI_72 {
                    return Err(Error::InvalidFormat("horizontal resolution != 72 dpi".into()));
                }
                if Fixed::read(&mut self.reader)? != Fixed::DPI_72 {
                    return Err(Error::InvalidFormat("vertical resolution != 72 dpi".into()));
                }
                let bounds = Rect::read(&mut self.reader)?;
                self.reader.skip(2)?;
                bounds
            },
            other => {
                return Err(Error::Unsupported(format!(
                    "unsupported 'PICT' header version ${:04x}",
                    other
                )));
            },
        };

        if bounds != self.picture.bounds {
            return Err(Error::InvalidFormat("PICT resource must fill bounds".into()));
        }
        Ok(State::DispatchingV2Ops)
    }

    fn dispatch_v2_op(&mut self) -> Result<State> {
        let code = self.reader.read_u16()?;
        let op = Opcode::from_u16(code).ok_or_else(|| unsupported_op(code))?;
        log::debug!("op {:?} at offset {}", op, self.reader.position() - 2);

        if op.is_drawing() {
            self.picture.is_raster = false;
        }

        match (op, op.operands()) {
            (Opcode::EndPic, _) => return Ok(State::ReadingV1),
            (Opcode::Clip, _) => self.read_clip()?,
            (Opcode::PackBitsRect, _) => self.read_pack_bits_rect()?,
            (Opcode::DirectBitsRect, _) => self.read_direct_bits_rect()?,
            (_, Operands::Fixed(len)) => self.reader.skip(len)?,
            (_, Operands::Polygon) => {
                let size = self.reader.read_u16()? as usize;
                let rest = size.checked_sub(2).ok_or_else(|| {
                    Error::InvalidFormat(format!("polygon size {} is too small", size))
                })?;
                self.reader.skip(round_up_even(rest))?;
            },
            (_, Operands::LongComment) => {
                let _kind = self.reader.read_u16()?;
                let len = self.reader.read_u16()? as usize;
                self.reader.skip(round_up_even(len))?;
            },
            // A second header opcode inside the stream
            (_, Operands::Structured) => return Err(unsupported_op(code)),
        }
        Ok(State::DispatchingV2Ops)
    }

    fn read_clip(&mut self) -> Result<()> {
        if self.reader.read_u16()? != RECT_REGION_SIZE {
            return Err(Error::Unsupported(
                "only rectangular clip regions are supported".into(),
            ));
        }
        if Rect::read(&mut self.reader)? != self.picture.bounds {
            return Err(Error::Unsupported("PICT clip must fill bounds".into()));
        }
        Ok(())
    }

    fn read_pack_bits_rect(&mut self) -> Result<()> {
        let header = PixMapHeader::read(&mut self.reader)?;
        let clut = ColorTable::read(&mut self.reader)?;
        let placement = self.read_placement(MODE_SRC_COPY)?;
        let tile = header.decode_packed_indexed(&mut self.reader, &clut, self.options.missing_color)?;
        self.draw(&tile, &placement);
        Ok(())
    }

    fn read_direct_bits_rect(&mut self) -> Result<()> {
        let header = PixMapHeader::read_addressed(&mut self.reader)?;
        let placement = self.read_placement(MODE_DITHER)?;
        let tile = header.decode_packed_direct(&mut self.reader)?;
        self.draw(&tile, &placement);
        Ok(())
    }

    /// Read src and dst rectangles and a transfer mode, ignoring `ignored_bits` of the mode.
    fn read_placement(&mut self, ignored_bits: i16) -> Result<Placement> {
        let src = Rect::read(&mut self.reader)?;
        let dst = Rect::read(&mut self.reader)?;
        let mode = self.reader.read_i16()? & !ignored_bits;
        if mode != MODE_SRC_COPY {
            return Err(Error::Unsupported(format!(
                "only source compositing is supported, not mode {}",
                mode
            )));
        }
        Ok(Placement { src, dst })
    }

    /// Copy `tile` onto the canvas so that `src` lands on `dst`.
    fn draw(&mut self, tile: &RasterImage, placement: &Placement) {
        let Placement { src, dst } = placement;
        let mask = RectConstant::new(*dst, AlphaColor::BLACK);
        let view = TranslatedView::new(
            tile,
            dst.left.wrapping_sub(src.left),
            dst.top.wrapping_sub(src.top),
        );
        self.picture.canvas.src(&view, &mask);
    }
}

fn unsupported_op(code: u16) -> Error {
    Error::Unsupported(format!("unsupported op ${:04x} in 'PICT' resource", code))
}
