//! DXGI format enumeration and its descriptor table.

use std::fmt;

use crate::format::{Channel, Channels, FormatDescriptor, Numeric, Support};

/// A `DXGI_FORMAT` value as stored in the DX10 extension header.
///
/// Values outside the known enumeration are representable so that the
/// resolver can report them; [`DxgiFormat::descriptor`] returns `None` for
/// them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DxgiFormat(pub u32);

macro_rules! dxgi_formats {
    ($($name:ident = $value:literal,)*) => {
        impl DxgiFormat {
            $(pub const $name: Self = Self($value);)*

            /// The enumerator name without the `DXGI_FORMAT_` prefix.
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

dxgi_formats! {
    UNKNOWN = 0,
    R32G32B32A32_TYPELESS = 1,
    R32G32B32A32_FLOAT = 2,
    R32G32B32A32_UINT = 3,
    R32G32B32A32_SINT = 4,
    R32G32B32_TYPELESS = 5,
    R32G32B32_FLOAT = 6,
    R32G32B32_UINT = 7,
    R32G32B32_SINT = 8,
    R16G16B16A16_TYPELESS = 9,
    R16G16B16A16_FLOAT = 10,
    R16G16B16A16_UNORM = 11,
    R16G16B16A16_UINT = 12,
    R16G16B16A16_SNORM = 13,
    R16G16B16A16_SINT = 14,
    R32G32_TYPELESS = 15,
    R32G32_FLOAT = 16,
    R32G32_UINT = 17,
    R32G32_SINT = 18,
    R32G8X24_TYPELESS = 19,
    D32_FLOAT_S8X24_UINT = 20,
    R32_FLOAT_X8X24_TYPELESS = 21,
    X32_TYPELESS_G8X24_UINT = 22,
    R10G10B10A2_TYPELESS = 23,
    R10G10B10A2_UNORM = 24,
    R10G10B10A2_UINT = 25,
    R11G11B10_FLOAT = 26,
    R8G8B8A8_TYPELESS = 27,
    R8G8B8A8_UNORM = 28,
    R8G8B8A8_UNORM_SRGB = 29,
    R8G8B8A8_UINT = 30,
    R8G8B8A8_SNORM = 31,
    R8G8B8A8_SINT = 32,
    R16G16_TYPELESS = 33,
    R16G16_FLOAT = 34,
    R16G16_UNORM = 35,
    R16G16_UINT = 36,
    R16G16_SNORM = 37,
    R16G16_SINT = 38,
    R32_TYPELESS = 39,
    D32_FLOAT = 40,
    R32_FLOAT = 41,
    R32_UINT = 42,
    R32_SINT = 43,
    R24G8_TYPELESS = 44,
    D24_UNORM_S8_UINT = 45,
    R24_UNORM_X8_TYPELESS = 46,
    X24_TYPELESS_G8_UINT = 47,
    R8G8_TYPELESS = 48,
    R8G8_UNORM = 49,
    R8G8_UINT = 50,
    R8G8_SNORM = 51,
    R8G8_SINT = 52,
    R16_TYPELESS = 53,
    R16_FLOAT = 54,
    D16_UNORM = 55,
    R16_UNORM = 56,
    R16_UINT = 57,
    R16_SNORM = 58,
    R16_SINT = 59,
    R8_TYPELESS = 60,
    R8_UNORM = 61,
    R8_UINT = 62,
    R8_SNORM = 63,
    R8_SINT = 64,
    A8_UNORM = 65,
    R1_UNORM = 66,
    R9G9B9E5_SHAREDEXP = 67,
    R8G8_B8G8_UNORM = 68,
    G8R8_G8B8_UNORM = 69,
    BC1_TYPELESS = 70,
    BC1_UNORM = 71,
    BC1_UNORM_SRGB = 72,
    BC2_TYPELESS = 73,
    BC2_UNORM = 74,
    BC2_UNORM_SRGB = 75,
    BC3_TYPELESS = 76,
    BC3_UNORM = 77,
    BC3_UNORM_SRGB = 78,
    BC4_TYPELESS = 79,
    BC4_UNORM = 80,
    BC4_SNORM = 81,
    BC5_TYPELESS = 82,
    BC5_UNORM = 83,
    BC5_SNORM = 84,
    B5G6R5_UNORM = 85,
    B5G5R5A1_UNORM = 86,
    B8G8R8A8_UNORM = 87,
    B8G8R8X8_UNORM = 88,
    R10G10B10_XR_BIAS_A2_UNORM = 89,
    B8G8R8A8_TYPELESS = 90,
    B8G8R8A8_UNORM_SRGB = 91,
    B8G8R8X8_TYPELESS = 92,
    B8G8R8X8_UNORM_SRGB = 93,
    BC6H_TYPELESS = 94,
    BC6H_UF16 = 95,
    BC6H_SF16 = 96,
    BC7_TYPELESS = 97,
    BC7_UNORM = 98,
    BC7_UNORM_SRGB = 99,
    AYUV = 100,
    Y410 = 101,
    Y416 = 102,
    NV12 = 103,
    P010 = 104,
    P016 = 105,
    OPAQUE_420 = 106,
    YUY2 = 107,
    Y210 = 108,
    Y216 = 109,
    NV11 = 110,
    AI44 = 111,
    IA44 = 112,
    P8 = 113,
    A8P8 = 114,
    B4G4R4A4_UNORM = 115,
    P208 = 130,
    V208 = 131,
    V408 = 132,
}

impl DxgiFormat {
    /// Look up the layout of this format.
    ///
    /// Returns `None` for values outside the DXGI enumeration. Known formats
    /// that cannot be stored as a linear run of blocks are returned with a
    /// non-[`Support::Linear`] classification rather than omitted.
    pub fn descriptor(self) -> Option<FormatDescriptor> {
        use Channel::{A, B, D, G, R, S, X};
        use Numeric::*;

        let rgba = Channels::RGBA;
        let rgb = Channels::RGB;
        let rg = Channels::RG;
        let r = Channels::R;
        let bgra = Channels::BGRA;
        let bgrx = Channels::BGRX;

        let plain = FormatDescriptor::uncompressed;
        let bc = FormatDescriptor::block_compressed;
        let packed = FormatDescriptor::packed;

        let descriptor = match self {
            Self::UNKNOWN => plain(1, Channels::NONE, Typeless).with_support(Support::Unknown),

            Self::R32G32B32A32_TYPELESS => plain(16, rgba, Typeless),
            Self::R32G32B32A32_FLOAT => plain(16, rgba, Float),
            Self::R32G32B32A32_UINT => plain(16, rgba, Uint),
            Self::R32G32B32A32_SINT => plain(16, rgba, Sint),

            Self::R32G32B32_TYPELESS => plain(12, rgb, Typeless),
            Self::R32G32B32_FLOAT => plain(12, rgb, Float),
            Self::R32G32B32_UINT => plain(12, rgb, Uint),
            Self::R32G32B32_SINT => plain(12, rgb, Sint),

            Self::R16G16B16A16_TYPELESS => plain(8, rgba, Typeless),
            Self::R16G16B16A16_FLOAT => plain(8, rgba, Float),
            Self::R16G16B16A16_UNORM => plain(8, rgba, Unorm),
            Self::R16G16B16A16_UINT => plain(8, rgba, Uint),
            Self::R16G16B16A16_SNORM => plain(8, rgba, Snorm),
            Self::R16G16B16A16_SINT => plain(8, rgba, Sint),

            Self::R32G32_TYPELESS => plain(8, rg, Typeless),
            Self::R32G32_FLOAT => plain(8, rg, Float),
            Self::R32G32_UINT => plain(8, rg, Uint),
            Self::R32G32_SINT => plain(8, rg, Sint),

            Self::R32G8X24_TYPELESS => plain(8, Channels::new([R, G, X]), Typeless),
            Self::D32_FLOAT_S8X24_UINT => plain(8, Channels::new([D, S, X]), DepthStencil),
            Self::R32_FLOAT_X8X24_TYPELESS => plain(8, Channels::new([R, X]), Float),
            Self::X32_TYPELESS_G8X24_UINT => plain(8, Channels::new([X, G, X]), Uint),

            Self::R10G10B10A2_TYPELESS => plain(4, rgba, Typeless),
            Self::R10G10B10A2_UNORM => plain(4, rgba, Unorm),
            Self::R10G10B10A2_UINT => plain(4, rgba, Uint),
            Self::R11G11B10_FLOAT => plain(4, rgb, Float),

            Self::R8G8B8A8_TYPELESS => plain(4, rgba, Typeless),
            Self::R8G8B8A8_UNORM => plain(4, rgba, Unorm),
            Self::R8G8B8A8_UNORM_SRGB => plain(4, rgba, UnormSrgb),
            Self::R8G8B8A8_UINT => plain(4, rgba, Uint),
            Self::R8G8B8A8_SNORM => plain(4, rgba, Snorm),
            Self::R8G8B8A8_SINT => plain(4, rgba, Sint),

            Self::R16G16_TYPELESS => plain(4, rg, Typeless),
            Self::R16G16_FLOAT => plain(4, rg, Float),
            Self::R16G16_UNORM => plain(4, rg, Unorm),
            Self::R16G16_UINT => plain(4, rg, Uint),
            Self::R16G16_SNORM => plain(4, rg, Snorm),
            Self::R16G16_SINT => plain(4, rg, Sint),

            Self::R32_TYPELESS => plain(4, r, Typeless),
            Self::D32_FLOAT => plain(4, Channels::new([D]), Float),
            Self::R32_FLOAT => plain(4, r, Float),
            Self::R32_UINT => plain(4, r, Uint),
            Self::R32_SINT => plain(4, r, Sint),

            Self::R24G8_TYPELESS => plain(4, rg, Typeless),
            Self::D24_UNORM_S8_UINT => plain(4, Channels::new([D, S]), DepthStencil),
            Self::R24_UNORM_X8_TYPELESS => plain(4, Channels::new([R, X]), Unorm),
            Self::X24_TYPELESS_G8_UINT => plain(4, Channels::new([X, G]), Uint),

            Self::R8G8_TYPELESS => plain(2, rg, Typeless),
            Self::R8G8_UNORM => plain(2, rg, Unorm),
            Self::R8G8_UINT => plain(2, rg, Uint),
            Self::R8G8_SNORM => plain(2, rg, Snorm),
            Self::R8G8_SINT => plain(2, rg, Sint),

            Self::R16_TYPELESS => plain(2, r, Typeless),
            Self::R16_FLOAT => plain(2, r, Float),
            Self::D16_UNORM => plain(2, Channels::new([D]), Unorm),
            Self::R16_UNORM => plain(2, r, Unorm),
            Self::R16_UINT => plain(2, r, Uint),
            Self::R16_SNORM => plain(2, r, Snorm),
            Self::R16_SINT => plain(2, r, Sint),

            Self::R8_TYPELESS => plain(1, r, Typeless),
            Self::R8_UNORM => plain(1, r, Unorm),
            Self::R8_UINT => plain(1, r, Uint),
            Self::R8_SNORM => plain(1, r, Snorm),
            Self::R8_SINT => plain(1, r, Sint),
            Self::A8_UNORM => plain(1, Channels::new([A]), Unorm),

            // Eight 1-bit texels per byte.
            Self::R1_UNORM => packed(8, 1, r, Unorm),
            Self::R9G9B9E5_SHAREDEXP => plain(4, rgb, SharedExponent),
            Self::R8G8_B8G8_UNORM => packed(2, 4, Channels::new([R, G, B, G]), Unorm),
            Self::G8R8_G8B8_UNORM => packed(2, 4, Channels::new([G, R, G, B]), Unorm),

            Self::BC1_TYPELESS => bc(8, rgba, Typeless),
            Self::BC1_UNORM => bc(8, rgba, Unorm),
            Self::BC1_UNORM_SRGB => bc(8, rgba, UnormSrgb),
            Self::BC2_TYPELESS => bc(16, rgba, Typeless),
            Self::BC2_UNORM => bc(16, rgba, Unorm),
            Self::BC2_UNORM_SRGB => bc(16, rgba, UnormSrgb),
            Self::BC3_TYPELESS => bc(16, rgba, Typeless),
            Self::BC3_UNORM => bc(16, rgba, Unorm),
            Self::BC3_UNORM_SRGB => bc(16, rgba, UnormSrgb),
            Self::BC4_TYPELESS => bc(8, r, Typeless),
            Self::BC4_UNORM => bc(8, r, Unorm),
            Self::BC4_SNORM => bc(8, r, Snorm),
            Self::BC5_TYPELESS => bc(16, rg, Typeless),
            Self::BC5_UNORM => bc(16, rg, Unorm),
            Self::BC5_SNORM => bc(16, rg, Snorm),

            Self::B5G6R5_UNORM => plain(2, Channels::new([B, G, R]), Unorm),
            Self::B5G5R5A1_UNORM => plain(2, bgra, Unorm),
            Self::B8G8R8A8_UNORM => plain(4, bgra, Unorm),
            Self::B8G8R8X8_UNORM => plain(4, bgrx, Unorm),
            Self::R10G10B10_XR_BIAS_A2_UNORM => plain(4, rgba, Unorm),
            Self::B8G8R8A8_TYPELESS => plain(4, bgra, Typeless),
            Self::B8G8R8A8_UNORM_SRGB => plain(4, bgra, UnormSrgb),
            Self::B8G8R8X8_TYPELESS => plain(4, bgrx, Typeless),
            Self::B8G8R8X8_UNORM_SRGB => plain(4, bgrx, UnormSrgb),

            Self::BC6H_TYPELESS => bc(16, rgb, Typeless),
            Self::BC6H_UF16 => bc(16, rgb, Ufloat),
            Self::BC6H_SF16 => bc(16, rgb, Float),
            Self::BC7_TYPELESS => bc(16, rgba, Typeless),
            Self::BC7_UNORM => bc(16, rgba, Unorm),
            Self::BC7_UNORM_SRGB => bc(16, rgba, UnormSrgb),

            // Video formats name their YUV components after the RGBA slots
            // they occupy.
            Self::AYUV => plain(4, rgba, Unorm),
            Self::Y410 => plain(4, rgba, Unorm),
            Self::Y416 => plain(8, rgba, Unorm),
            Self::YUY2 => packed(2, 4, rgba, Unorm),
            Self::Y210 => packed(2, 8, rgba, Unorm),
            Self::Y216 => packed(2, 8, rgba, Unorm),

            Self::NV12 | Self::NV11 | Self::OPAQUE_420 | Self::P208 | Self::V208 | Self::V408 => {
                plain(1, rgb, Unorm).with_support(Support::Planar)
            }
            Self::P010 | Self::P016 => plain(2, rgb, Unorm).with_support(Support::Planar),

            Self::AI44 | Self::IA44 | Self::P8 => {
                plain(1, Channels::NONE, Uint).with_support(Support::Palettized)
            }
            Self::A8P8 => plain(2, Channels::NONE, Uint).with_support(Support::Palettized),

            Self::B4G4R4A4_UNORM => plain(2, bgra, Unorm),

            _ => return None,
        };

        Some(descriptor.with_dxgi(self))
    }
}

impl fmt::Debug for DxgiFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "DxgiFormat({})", self.0),
        }
    }
}

impl fmt::Display for DxgiFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_named_format_has_descriptor() {
        for value in (0..=115).chain(130..=132) {
            let format = DxgiFormat(value);
            assert!(format.name().is_some(), "missing name for {value}");
            let desc = format.descriptor().expect("descriptor");
            assert_eq!(desc.dxgi, Some(format));
            assert!(desc.block_bytes > 0);
        }
    }

    #[test]
    fn test_gaps_are_unknown() {
        for value in (116..130).chain([133, 200, u32::MAX]) {
            assert!(DxgiFormat(value).descriptor().is_none());
            assert!(DxgiFormat(value).name().is_none());
        }
    }

    #[test]
    fn test_block_compressed_sizes() {
        let bc1 = DxgiFormat::BC1_UNORM.descriptor().unwrap();
        assert!(bc1.compressed);
        assert_eq!((bc1.block.width, bc1.block.height), (4, 4));
        assert_eq!(bc1.block_bytes, 8);

        let bc7 = DxgiFormat::BC7_UNORM_SRGB.descriptor().unwrap();
        assert_eq!(bc7.block_bytes, 16);
        assert!(bc7.is_srgb());

        let bc4 = DxgiFormat::BC4_SNORM.descriptor().unwrap();
        assert_eq!(bc4.block_bytes, 8);
        assert_eq!(bc4.channels.count(), 1);
    }

    #[test]
    fn test_packed_formats() {
        let yuy2 = DxgiFormat::YUY2.descriptor().unwrap();
        assert!(!yuy2.compressed);
        assert_eq!((yuy2.block.width, yuy2.block_bytes), (2, 4));

        let r1 = DxgiFormat::R1_UNORM.descriptor().unwrap();
        assert_eq!((r1.block.width, r1.block_bytes), (8, 1));
    }

    #[test]
    fn test_support_classification() {
        let linear = DxgiFormat::R8G8B8A8_UNORM.descriptor().unwrap();
        assert_eq!(linear.support, Support::Linear);
        assert_eq!(linear.bits_per_texel(), Some(32));

        assert_eq!(
            DxgiFormat::NV12.descriptor().unwrap().support,
            Support::Planar
        );
        assert_eq!(
            DxgiFormat::P8.descriptor().unwrap().support,
            Support::Palettized
        );
        assert_eq!(
            DxgiFormat::UNKNOWN.descriptor().unwrap().support,
            Support::Unknown
        );
    }

    #[test]
    fn test_debug_uses_names() {
        assert_eq!(format!("{:?}", DxgiFormat::BC3_UNORM), "BC3_UNORM");
        assert_eq!(format!("{:?}", DxgiFormat(999)), "DxgiFormat(999)");
    }
}
