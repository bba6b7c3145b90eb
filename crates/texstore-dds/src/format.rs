//! Format resolution.
//!
//! Every DDS file names its encoding in one of three ways: a DXGI value in
//! the DX10 extension, a FourCC code, or a set of legacy channel bit masks.
//! [`resolve_format`] turns whichever one is present into a
//! [`FormatDescriptor`], which is all the layout planner needs to know.

use std::fmt;

use crate::dxgi::DxgiFormat;
use crate::header::{DdsHeaders, DdsPixelFormat, FourCC, PixelFormatFlags};
use crate::{Error, Result};

/// One component slot of a texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    R,
    G,
    B,
    A,
    /// Padding bits.
    X,
    /// Luminance.
    L,
    /// Depth.
    D,
    /// Stencil.
    S,
}

impl Channel {
    fn as_char(self) -> char {
        match self {
            Channel::R => 'R',
            Channel::G => 'G',
            Channel::B => 'B',
            Channel::A => 'A',
            Channel::X => 'X',
            Channel::L => 'L',
            Channel::D => 'D',
            Channel::S => 'S',
        }
    }
}

/// Channel slots in memory order, least significant first.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channels {
    order: [Channel; 4],
    count: u8,
}

impl Channels {
    pub const NONE: Self = Self::new([]);
    pub const R: Self = Self::new([Channel::R]);
    pub const RG: Self = Self::new([Channel::R, Channel::G]);
    pub const RGB: Self = Self::new([Channel::R, Channel::G, Channel::B]);
    pub const RGBA: Self = Self::new([Channel::R, Channel::G, Channel::B, Channel::A]);
    pub const BGRA: Self = Self::new([Channel::B, Channel::G, Channel::R, Channel::A]);
    pub const BGRX: Self = Self::new([Channel::B, Channel::G, Channel::R, Channel::X]);

    /// Build from up to four slots.
    pub const fn new<const N: usize>(channels: [Channel; N]) -> Self {
        assert!(N <= 4);
        let mut order = [Channel::X; 4];
        let mut i = 0;
        while i < N {
            order[i] = channels[i];
            i += 1;
        }
        Self {
            order,
            count: N as u8,
        }
    }

    /// Number of slots.
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// The slots in memory order.
    pub fn as_slice(&self) -> &[Channel] {
        &self.order[..self.count()]
    }

    /// Whether `channel` occupies any slot.
    pub fn contains(&self, channel: Channel) -> bool {
        self.as_slice().contains(&channel)
    }
}

impl fmt::Display for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return f.write_str("-");
        }
        self.as_slice()
            .iter()
            .try_for_each(|c| write!(f, "{}", c.as_char()))
    }
}

impl fmt::Debug for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Channels({self})")
    }
}

/// How component bits are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Numeric {
    Typeless,
    Unorm,
    UnormSrgb,
    Snorm,
    Uint,
    Sint,
    Float,
    /// Unsigned half float (BC6H UF16).
    Ufloat,
    /// RGB mantissas with a shared 5-bit exponent.
    SharedExponent,
    /// Mixed depth and stencil components.
    DepthStencil,
}

/// Whether the format can be stored as a linear run of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Support {
    /// Rows of fixed-size blocks; decodable.
    Linear,
    /// Multi-plane video formats (NV12, P010, ...).
    Planar,
    /// Palette indices without a palette.
    Palettized,
    /// `DXGI_FORMAT_UNKNOWN`.
    Unknown,
}

/// Size of the smallest addressable unit of a format, in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockFootprint {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl BlockFootprint {
    /// A single texel.
    pub const TEXEL: Self = Self::new(1, 1);
    /// The 4x4 blocks of the BC formats.
    pub const BC: Self = Self::new(4, 4);

    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 1,
        }
    }
}

/// Legacy channel bit masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelMasks {
    pub r: u32,
    pub g: u32,
    pub b: u32,
    pub a: u32,
}

/// Everything the layout planner needs to know about an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    /// DXGI identity, when the encoding has one.
    pub dxgi: Option<DxgiFormat>,
    /// Component slots in memory order.
    pub channels: Channels,
    pub numeric: Numeric,
    /// Whether this is a BC block-compressed format.
    pub compressed: bool,
    /// Texels covered by one block (1x1 for plain formats).
    pub block: BlockFootprint,
    /// Bytes per block.
    pub block_bytes: u32,
    /// Rows are padded to a multiple of this many bytes.
    pub row_alignment: u32,
    pub support: Support,
    /// Source masks for bit-mask formats.
    pub masks: Option<ChannelMasks>,
}

impl FormatDescriptor {
    /// A plain format with one texel per block.
    pub const fn uncompressed(bytes: u32, channels: Channels, numeric: Numeric) -> Self {
        Self {
            dxgi: None,
            channels,
            numeric,
            compressed: false,
            block: BlockFootprint::TEXEL,
            block_bytes: bytes,
            row_alignment: 1,
            support: Support::Linear,
            masks: None,
        }
    }

    /// An uncompressed format that packs `width` horizontally adjacent texels
    /// into one `bytes`-sized unit.
    pub const fn packed(width: u32, bytes: u32, channels: Channels, numeric: Numeric) -> Self {
        let mut desc = Self::uncompressed(bytes, channels, numeric);
        desc.block = BlockFootprint::new(width, 1);
        desc
    }

    /// A BC format with 4x4 blocks of `bytes` bytes.
    pub const fn block_compressed(bytes: u32, channels: Channels, numeric: Numeric) -> Self {
        let mut desc = Self::uncompressed(bytes, channels, numeric);
        desc.compressed = true;
        desc.block = BlockFootprint::BC;
        desc
    }

    pub const fn with_support(mut self, support: Support) -> Self {
        self.support = support;
        self
    }

    pub const fn with_dxgi(mut self, format: DxgiFormat) -> Self {
        self.dxgi = Some(format);
        self
    }

    /// Bits per texel, for formats with a single-texel footprint.
    pub fn bits_per_texel(&self) -> Option<u32> {
        (self.block == BlockFootprint::TEXEL).then_some(self.block_bytes * 8)
    }

    pub fn is_srgb(&self) -> bool {
        self.numeric == Numeric::UnormSrgb
    }

    pub fn has_alpha(&self) -> bool {
        self.channels.contains(Channel::A)
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dxgi {
            Some(format) => write!(f, "{format}"),
            None => write!(
                f,
                "{} {}bpp {:?}",
                self.channels,
                self.block_bytes * 8,
                self.numeric
            ),
        }
    }
}

/// Resolve the encoding declared by `headers`.
///
/// The DX10 extension wins over the FourCC, which wins over the bit masks.
pub fn resolve_format(headers: &DdsHeaders) -> Result<FormatDescriptor> {
    if let Some(dxt10) = &headers.dxt10 {
        return from_dxgi(dxt10.format());
    }

    let pf = headers.header.pixel_format;
    if pf.pixel_flags().contains(PixelFormatFlags::FOURCC) {
        let four_cc = pf.four_cc;
        let format = fourcc_to_dxgi(four_cc).ok_or(Error::UnknownFourCC(four_cc))?;
        return from_dxgi(format);
    }

    from_masks(&pf)
}

fn from_dxgi(format: DxgiFormat) -> Result<FormatDescriptor> {
    let desc = format
        .descriptor()
        .ok_or(Error::UnknownDxgiFormat(format.0))?;

    if desc.support != Support::Linear {
        return Err(Error::UnsupportedDxgiFormat {
            format,
            support: desc.support,
        });
    }

    Ok(desc)
}

/// Map a legacy FourCC code to its DXGI equivalent.
pub fn fourcc_to_dxgi(four_cc: FourCC) -> Option<DxgiFormat> {
    let format = match four_cc {
        FourCC::DXT1 => DxgiFormat::BC1_UNORM,
        FourCC::DXT2 | FourCC::DXT3 => DxgiFormat::BC2_UNORM,
        FourCC::DXT4 | FourCC::DXT5 => DxgiFormat::BC3_UNORM,
        FourCC::ATI1 | FourCC::BC4U => DxgiFormat::BC4_UNORM,
        FourCC::BC4S => DxgiFormat::BC4_SNORM,
        FourCC::ATI2 | FourCC::BC5U => DxgiFormat::BC5_UNORM,
        FourCC::BC5S => DxgiFormat::BC5_SNORM,
        FourCC::RGBG => DxgiFormat::R8G8_B8G8_UNORM,
        FourCC::GRGB => DxgiFormat::G8R8_G8B8_UNORM,
        FourCC::YUY2 => DxgiFormat::YUY2,
        FourCC::A16B16G16R16 => DxgiFormat::R16G16B16A16_UNORM,
        FourCC::Q16W16V16U16 => DxgiFormat::R16G16B16A16_SNORM,
        FourCC::R16F => DxgiFormat::R16_FLOAT,
        FourCC::G16R16F => DxgiFormat::R16G16_FLOAT,
        FourCC::A16B16G16R16F => DxgiFormat::R16G16B16A16_FLOAT,
        FourCC::R32F => DxgiFormat::R32_FLOAT,
        FourCC::G32R32F => DxgiFormat::R32G32_FLOAT,
        FourCC::A32B32G32R32F => DxgiFormat::R32G32B32A32_FLOAT,
        _ => return None,
    };
    Some(format)
}

/// Mask sets with a DXGI equivalent: `(bit count, r, g, b, a, signed, format)`.
const KNOWN_MASKS: &[(u32, u32, u32, u32, u32, bool, DxgiFormat)] = &[
    (32, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000, false, DxgiFormat::B8G8R8A8_UNORM),
    (32, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0, false, DxgiFormat::B8G8R8X8_UNORM),
    (32, 0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0xff00_0000, false, DxgiFormat::R8G8B8A8_UNORM),
    (32, 0x0000_03ff, 0x000f_fc00, 0x3ff0_0000, 0xc000_0000, false, DxgiFormat::R10G10B10A2_UNORM),
    (32, 0x0000_ffff, 0xffff_0000, 0, 0, false, DxgiFormat::R16G16_UNORM),
    (16, 0xf800, 0x07e0, 0x001f, 0, false, DxgiFormat::B5G6R5_UNORM),
    (16, 0x7c00, 0x03e0, 0x001f, 0x8000, false, DxgiFormat::B5G5R5A1_UNORM),
    (16, 0x0f00, 0x00f0, 0x000f, 0xf000, false, DxgiFormat::B4G4R4A4_UNORM),
    (16, 0xffff, 0, 0, 0, false, DxgiFormat::R16_UNORM),
    (16, 0x00ff, 0, 0, 0xff00, false, DxgiFormat::R8G8_UNORM),
    (8, 0xff, 0, 0, 0, false, DxgiFormat::R8_UNORM),
    (8, 0, 0, 0, 0xff, false, DxgiFormat::A8_UNORM),
    (16, 0x00ff, 0xff00, 0, 0, true, DxgiFormat::R8G8_SNORM),
    (32, 0x0000_ffff, 0xffff_0000, 0, 0, true, DxgiFormat::R16G16_SNORM),
    (32, 0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0xff00_0000, true, DxgiFormat::R8G8B8A8_SNORM),
];

/// Derive a descriptor from the legacy bit-mask pixel format.
fn from_masks(pf: &DdsPixelFormat) -> Result<FormatDescriptor> {
    let flags = pf.pixel_flags();
    let structural = PixelFormatFlags::RGB
        | PixelFormatFlags::LUMINANCE
        | PixelFormatFlags::ALPHA
        | PixelFormatFlags::BUMP_DUDV
        | PixelFormatFlags::YUV;
    if !flags.intersects(structural) {
        return Err(Error::invalid_field(
            "pixel_format.flags",
            format!("{:#x} names no FourCC, RGB, luminance, alpha, YUV or bump layout", {
                pf.flags
            }),
        ));
    }

    let bit_count = pf.rgb_bit_count;
    if bit_count == 0 || bit_count % 8 != 0 || bit_count > 32 {
        return Err(Error::InconsistentMasks(format!(
            "bit count {bit_count} is not 8, 16, 24 or 32"
        )));
    }

    let masks = ChannelMasks {
        r: pf.r_bit_mask,
        g: pf.g_bit_mask,
        b: pf.b_bit_mask,
        a: pf.a_bit_mask,
    };
    let first = if flags.contains(PixelFormatFlags::LUMINANCE) {
        Channel::L
    } else {
        Channel::R
    };
    let mut present: Vec<(u32, Channel)> = [
        (masks.r, first),
        (masks.g, Channel::G),
        (masks.b, Channel::B),
        (masks.a, Channel::A),
    ]
    .into_iter()
    .filter(|(mask, _)| *mask != 0)
    .collect();

    if present.is_empty() {
        return Err(Error::InconsistentMasks("all channel masks are zero".into()));
    }

    let mut union = 0u32;
    for &(mask, channel) in &present {
        let shifted = mask >> mask.trailing_zeros();
        if shifted & shifted.wrapping_add(1) != 0 {
            return Err(Error::InconsistentMasks(format!(
                "{channel:?} mask {mask:#010x} is not contiguous"
            )));
        }
        if union & mask != 0 {
            return Err(Error::InconsistentMasks(format!(
                "{channel:?} mask {mask:#010x} overlaps another channel"
            )));
        }
        union |= mask;
    }
    if bit_count < 32 && union >> bit_count != 0 {
        return Err(Error::InconsistentMasks(format!(
            "masks {union:#010x} do not fit in {bit_count} bits"
        )));
    }

    present.sort_by_key(|(mask, _)| mask.trailing_zeros());
    let mut order = [Channel::X; 4];
    for (slot, (_, channel)) in order.iter_mut().zip(&present) {
        *slot = *channel;
    }
    let channels = Channels {
        order,
        count: present.len() as u8,
    };

    let signed = flags.contains(PixelFormatFlags::BUMP_DUDV);
    let numeric = if signed { Numeric::Snorm } else { Numeric::Unorm };

    let mut desc = FormatDescriptor::uncompressed(bit_count / 8, channels, numeric);
    desc.masks = Some(masks);
    desc.dxgi = KNOWN_MASKS
        .iter()
        .find(|&&(bits, r, g, b, a, s, _)| {
            bits == bit_count
                && s == signed
                && masks == ChannelMasks { r, g, b, a }
        })
        .map(|&(.., format)| format);

    Ok(desc)
}

#[cfg(test)]
mod tests {
    use zerocopy::FromZeros;

    use super::*;
    use crate::header::{DdsHeader, DdsHeaderDxt10};
    use crate::ErrorKind;

    fn legacy(flags: PixelFormatFlags, bits: u32, masks: [u32; 4]) -> DdsHeaders {
        let mut header = DdsHeader::new_zeroed();
        header.size = DdsHeader::SIZE;
        header.pixel_format.size = DdsPixelFormat::SIZE;
        header.pixel_format.flags = flags.bits();
        header.pixel_format.rgb_bit_count = bits;
        header.pixel_format.r_bit_mask = masks[0];
        header.pixel_format.g_bit_mask = masks[1];
        header.pixel_format.b_bit_mask = masks[2];
        header.pixel_format.a_bit_mask = masks[3];
        DdsHeaders {
            header,
            dxt10: None,
        }
    }

    fn fourcc(code: FourCC) -> DdsHeaders {
        let mut headers = legacy(PixelFormatFlags::FOURCC, 0, [0; 4]);
        headers.header.pixel_format.four_cc = code;
        headers
    }

    fn dx10(format: u32) -> DdsHeaders {
        let mut headers = fourcc(FourCC::DX10);
        let mut ext = DdsHeaderDxt10::new_zeroed();
        ext.dxgi_format = format;
        headers.dxt10 = Some(ext);
        headers
    }

    #[test]
    fn test_dxt1_resolves_to_bc1() {
        let desc = resolve_format(&fourcc(FourCC::DXT1)).unwrap();
        assert_eq!(desc.dxgi, Some(DxgiFormat::BC1_UNORM));
        assert!(desc.compressed);
        assert_eq!(desc.block, BlockFootprint::BC);
        assert_eq!(desc.block_bytes, 8);
    }

    #[test]
    fn test_fourcc_aliases() {
        assert_eq!(fourcc_to_dxgi(FourCC::ATI2), Some(DxgiFormat::BC5_UNORM));
        assert_eq!(fourcc_to_dxgi(FourCC::DXT4), Some(DxgiFormat::BC3_UNORM));
        assert_eq!(
            fourcc_to_dxgi(FourCC::A32B32G32R32F),
            Some(DxgiFormat::R32G32B32A32_FLOAT)
        );
        assert_eq!(fourcc_to_dxgi(FourCC(*b"UYVY")), None);
    }

    #[test]
    fn test_unknown_fourcc() {
        let err = resolve_format(&fourcc(FourCC(*b"ETC1"))).unwrap_err();
        assert!(matches!(err, Error::UnknownFourCC(c) if c == FourCC(*b"ETC1")));
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_dx10_takes_precedence() {
        let desc = resolve_format(&dx10(DxgiFormat::R16G16_FLOAT.0)).unwrap();
        assert_eq!(desc.dxgi, Some(DxgiFormat::R16G16_FLOAT));
        assert_eq!(desc.bits_per_texel(), Some(32));
    }

    #[test]
    fn test_dx10_unknown_and_planar() {
        let err = resolve_format(&dx10(500)).unwrap_err();
        assert!(matches!(err, Error::UnknownDxgiFormat(500)));
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);

        let err = resolve_format(&dx10(DxgiFormat::NV12.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedDxgiFormat {
                support: Support::Planar,
                ..
            }
        ));
    }

    #[test]
    fn test_a8r8g8b8_masks() {
        let headers = legacy(
            PixelFormatFlags::RGB | PixelFormatFlags::ALPHA_PIXELS,
            32,
            [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000],
        );
        let desc = resolve_format(&headers).unwrap();

        assert_eq!(desc.channels, Channels::BGRA);
        assert_eq!(desc.bits_per_texel(), Some(32));
        assert_eq!(desc.dxgi, Some(DxgiFormat::B8G8R8A8_UNORM));
        assert!(!desc.compressed);
        assert!(desc.has_alpha());
    }

    #[test]
    fn test_r8g8b8_masks_have_no_dxgi_equivalent() {
        let headers = legacy(
            PixelFormatFlags::RGB,
            24,
            [0xff_0000, 0x00_ff00, 0x00_00ff, 0],
        );
        let desc = resolve_format(&headers).unwrap();

        assert_eq!(desc.channels.to_string(), "BGR");
        assert_eq!(desc.block_bytes, 3);
        assert_eq!(desc.dxgi, None);
    }

    #[test]
    fn test_luminance_alpha_masks() {
        let headers = legacy(
            PixelFormatFlags::LUMINANCE | PixelFormatFlags::ALPHA_PIXELS,
            16,
            [0x00ff, 0, 0, 0xff00],
        );
        let desc = resolve_format(&headers).unwrap();

        assert_eq!(desc.channels.as_slice(), &[Channel::L, Channel::A]);
        assert_eq!(desc.dxgi, Some(DxgiFormat::R8G8_UNORM));
    }

    #[test]
    fn test_bump_masks_are_signed() {
        let headers = legacy(PixelFormatFlags::BUMP_DUDV, 16, [0x00ff, 0xff00, 0, 0]);
        let desc = resolve_format(&headers).unwrap();

        assert_eq!(desc.numeric, Numeric::Snorm);
        assert_eq!(desc.dxgi, Some(DxgiFormat::R8G8_SNORM));
    }

    #[test]
    fn test_inconsistent_masks() {
        let cases = [
            // Bit count too small for the masks.
            (16, [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0]),
            // Overlapping channels.
            (32, [0x0000_ffff, 0x0000_ff00, 0, 0]),
            // Split mask.
            (16, [0x0f0f, 0, 0, 0]),
            // No channels at all.
            (32, [0, 0, 0, 0]),
            // Not a whole number of bytes.
            (12, [0x0f00, 0x00f0, 0x000f, 0]),
        ];

        for (bits, masks) in cases {
            let err = resolve_format(&legacy(PixelFormatFlags::RGB, bits, masks)).unwrap_err();
            assert!(matches!(err, Error::InconsistentMasks(_)), "{bits} {masks:x?}");
            assert_eq!(err.kind(), ErrorKind::Format);
        }
    }

    #[test]
    fn test_no_layout_flags() {
        let headers = legacy(PixelFormatFlags::empty(), 32, [0xff, 0, 0, 0]);
        let err = resolve_format(&headers).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                field: "pixel_format.flags",
                ..
            }
        ));

        let headers = legacy(PixelFormatFlags::ALPHA_PIXELS, 32, [0, 0, 0, 0xff00_0000]);
        let err = resolve_format(&headers).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                field: "pixel_format.flags",
                ..
            }
        ));
    }

    #[test]
    fn test_display() {
        let desc = resolve_format(&fourcc(FourCC::DXT5)).unwrap();
        assert_eq!(desc.to_string(), "BC3_UNORM");

        let rgb = legacy(
            PixelFormatFlags::RGB,
            24,
            [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0],
        );
        let desc = resolve_format(&rgb).unwrap();
        assert_eq!(desc.to_string(), "BGR 24bpp Unorm");
    }
}
