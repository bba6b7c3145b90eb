//! DDS header structures.

use std::fmt;

use bitflags::bitflags;
use texstore_common::{ByteSource, ByteSourceExt};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::dxgi::DxgiFormat;
use crate::error::Stage;
use crate::{Error, Result, DDS_MAGIC};

/// DDS file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeader {
    /// Header size (should be 124).
    pub size: u32,
    /// Header flags.
    pub flags: u32,
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: u32,
    /// Depth (for volume textures).
    pub depth: u32,
    /// Number of mipmap levels.
    pub mipmap_count: u32,
    /// Reserved.
    pub reserved1: [u32; 11],
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities.
    pub caps: u32,
    /// Surface capabilities 2.
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
    /// Reserved.
    pub reserved2: u32,
}

impl DdsHeader {
    /// Expected header size.
    pub const SIZE: u32 = 124;

    /// Check if this is a DX10 extended header.
    pub fn is_dx10(&self) -> bool {
        self.pixel_format.four_cc == FourCC::DX10
    }

    /// Typed view of [`DdsHeader::flags`].
    pub fn dds_flags(&self) -> DdsFlags {
        DdsFlags::from_bits_retain(self.flags)
    }

    /// Typed view of [`DdsHeader::caps`].
    pub fn dds_caps(&self) -> DdsCaps {
        DdsCaps::from_bits_retain(self.caps)
    }

    /// Typed view of [`DdsHeader::caps2`].
    pub fn dds_caps2(&self) -> DdsCaps2 {
        DdsCaps2::from_bits_retain(self.caps2)
    }

    /// Explicit row pitch of the top level, if the header declares one.
    pub fn declared_pitch(&self) -> Option<u32> {
        self.dds_flags()
            .contains(DdsFlags::PITCH)
            .then_some(self.pitch_or_linear_size)
    }
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsPixelFormat {
    /// Structure size (should be 32).
    pub size: u32,
    /// Pixel format flags.
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed).
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    /// Expected pixel format size.
    pub const SIZE: u32 = 32;

    /// Typed view of [`DdsPixelFormat::flags`].
    pub fn pixel_flags(&self) -> PixelFormatFlags {
        PixelFormatFlags::from_bits_retain(self.flags)
    }
}

bitflags! {
    /// `DDS_HEADER.dwFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DdsFlags: u32 {
        const CAPS = 0x1;
        const HEIGHT = 0x2;
        const WIDTH = 0x4;
        /// Pitch is provided for an uncompressed texture.
        const PITCH = 0x8;
        const PIXEL_FORMAT = 0x1000;
        /// `mipmap_count` is valid.
        const MIPMAP_COUNT = 0x20000;
        /// Linear size is provided for a compressed texture.
        const LINEAR_SIZE = 0x80000;
        /// `depth` is valid.
        const DEPTH = 0x800000;
    }

    /// `DDS_HEADER.dwCaps`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DdsCaps: u32 {
        const COMPLEX = 0x8;
        const TEXTURE = 0x1000;
        const MIPMAP = 0x400000;
    }

    /// `DDS_HEADER.dwCaps2`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DdsCaps2: u32 {
        const CUBEMAP = 0x200;
        const CUBEMAP_POSITIVE_X = 0x400;
        const CUBEMAP_NEGATIVE_X = 0x800;
        const CUBEMAP_POSITIVE_Y = 0x1000;
        const CUBEMAP_NEGATIVE_Y = 0x2000;
        const CUBEMAP_POSITIVE_Z = 0x4000;
        const CUBEMAP_NEGATIVE_Z = 0x8000;
        const VOLUME = 0x200000;

        const CUBEMAP_ALL_FACES = Self::CUBEMAP_POSITIVE_X.bits()
            | Self::CUBEMAP_NEGATIVE_X.bits()
            | Self::CUBEMAP_POSITIVE_Y.bits()
            | Self::CUBEMAP_NEGATIVE_Y.bits()
            | Self::CUBEMAP_POSITIVE_Z.bits()
            | Self::CUBEMAP_NEGATIVE_Z.bits();
    }

    /// `DDS_PIXELFORMAT.dwFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PixelFormatFlags: u32 {
        const ALPHA_PIXELS = 0x1;
        /// Alpha-only legacy format.
        const ALPHA = 0x2;
        const FOURCC = 0x4;
        const RGB = 0x40;
        const YUV = 0x200;
        const LUMINANCE = 0x20000;
        /// Signed bump-map data (V8U8 and friends).
        const BUMP_DUDV = 0x80000;
    }
}

/// Four-character code for compression type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// DXT1 compression.
    pub const DXT1: Self = Self(*b"DXT1");
    /// DXT2 compression (premultiplied DXT3).
    pub const DXT2: Self = Self(*b"DXT2");
    /// DXT3 compression.
    pub const DXT3: Self = Self(*b"DXT3");
    /// DXT4 compression (premultiplied DXT5).
    pub const DXT4: Self = Self(*b"DXT4");
    /// DXT5 compression.
    pub const DXT5: Self = Self(*b"DXT5");
    /// DX10 extended header.
    pub const DX10: Self = Self(*b"DX10");
    /// ATI1 (BC4) compression.
    pub const ATI1: Self = Self(*b"ATI1");
    /// BC4U compression.
    pub const BC4U: Self = Self(*b"BC4U");
    /// BC4S compression.
    pub const BC4S: Self = Self(*b"BC4S");
    /// ATI2 (BC5) compression.
    pub const ATI2: Self = Self(*b"ATI2");
    /// BC5U compression.
    pub const BC5U: Self = Self(*b"BC5U");
    /// BC5S compression.
    pub const BC5S: Self = Self(*b"BC5S");
    /// Packed R8G8_B8G8.
    pub const RGBG: Self = Self(*b"RGBG");
    /// Packed G8R8_G8B8.
    pub const GRGB: Self = Self(*b"GRGB");
    /// Packed YUV 4:2:2.
    pub const YUY2: Self = Self(*b"YUY2");

    /// D3DFMT_A16B16G16R16.
    pub const A16B16G16R16: Self = Self::from_u32(36);
    /// D3DFMT_Q16W16V16U16.
    pub const Q16W16V16U16: Self = Self::from_u32(110);
    /// D3DFMT_R16F.
    pub const R16F: Self = Self::from_u32(111);
    /// D3DFMT_G16R16F.
    pub const G16R16F: Self = Self::from_u32(112);
    /// D3DFMT_A16B16G16R16F.
    pub const A16B16G16R16F: Self = Self::from_u32(113);
    /// D3DFMT_R32F.
    pub const R32F: Self = Self::from_u32(114);
    /// D3DFMT_G32R32F.
    pub const G32R32F: Self = Self::from_u32(115);
    /// D3DFMT_A32B32G32R32F.
    pub const A32B32G32R32F: Self = Self::from_u32(116);

    /// Build a FourCC from its little-endian integer form.
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_le_bytes())
    }

    /// The little-endian integer form.
    pub const fn to_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            self.0.iter().try_for_each(|&b| write!(f, "{}", b as char))
        } else {
            write!(f, "{:#010x}", self.to_u32())
        }
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({self})")
    }
}

/// DX10 extended header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeaderDxt10 {
    /// DXGI format.
    pub dxgi_format: u32,
    /// Resource dimension.
    pub resource_dimension: u32,
    /// Misc flags.
    pub misc_flag: u32,
    /// Array size.
    pub array_size: u32,
    /// Misc flags 2.
    pub misc_flags2: u32,
}

impl DdsHeaderDxt10 {
    /// Encoded size of the extension.
    pub const SIZE: usize = 20;
    /// `misc_flag` bit marking a cube texture.
    pub const MISC_TEXTURE_CUBE: u32 = 0x4;
    /// `misc_flags2` bits holding the alpha mode.
    pub const ALPHA_MODE_MASK: u32 = 0x7;

    /// The DXGI format.
    pub fn format(&self) -> DxgiFormat {
        DxgiFormat(self.dxgi_format)
    }

    /// The resource dimension, if it is a known value.
    pub fn dimension(&self) -> Option<ResourceDimension> {
        ResourceDimension::from_u32(self.resource_dimension)
    }

    /// Whether the misc flag marks this as a cube texture.
    pub fn is_cubemap(&self) -> bool {
        self.misc_flag & Self::MISC_TEXTURE_CUBE != 0
    }
}

/// D3D10 resource dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResourceDimension {
    Unknown = 0,
    Buffer = 1,
    Texture1D = 2,
    Texture2D = 3,
    Texture3D = 4,
}

impl ResourceDimension {
    /// Convert from the raw header value.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::Buffer),
            2 => Some(Self::Texture1D),
            3 => Some(Self::Texture2D),
            4 => Some(Self::Texture3D),
            _ => None,
        }
    }
}

/// How the alpha channel of the texture should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AlphaMode {
    #[default]
    Unknown,
    Straight,
    Premultiplied,
    Opaque,
    Custom,
}

/// The DDS header plus the DX10 extension, if any.
#[derive(Debug, Clone, Copy)]
pub struct DdsHeaders {
    pub header: DdsHeader,
    pub dxt10: Option<DdsHeaderDxt10>,
}

impl DdsHeaders {
    /// Read and validate the magic, the header and the optional extension.
    ///
    /// Leaves `source` positioned at the first payload byte.
    pub fn read<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self> {
        let magic: [u8; 4] = source
            .read_array()
            .map_err(|e| Error::from_source(Stage::Header, e))?;
        if &magic != DDS_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let header: DdsHeader = source
            .read_struct()
            .map_err(|e| Error::from_source(Stage::Header, e))?;
        if header.size != DdsHeader::SIZE {
            return Err(Error::InvalidHeaderSize(header.size));
        }
        if header.pixel_format.size != DdsPixelFormat::SIZE {
            return Err(Error::InvalidPixelFormatSize(header.pixel_format.size));
        }

        let dxt10 = if header.is_dx10() {
            Some(
                source
                    .read_struct::<DdsHeaderDxt10>()
                    .map_err(|e| Error::from_source(Stage::Header, e))?,
            )
        } else {
            None
        };

        Ok(Self { header, dxt10 })
    }

    /// Number of bytes the magic and headers occupy on disk.
    pub fn encoded_len(&self) -> usize {
        DDS_MAGIC.len()
            + std::mem::size_of::<DdsHeader>()
            + self.dxt10.map_or(0, |_| std::mem::size_of::<DdsHeaderDxt10>())
    }

    /// Alpha interpretation declared by the file.
    ///
    /// The DX10 extension states it explicitly; legacy files only imply it
    /// through the premultiplied DXT2/DXT4 codes or the alpha pixel flag.
    pub fn alpha_mode(&self) -> AlphaMode {
        if let Some(dxt10) = &self.dxt10 {
            return match dxt10.misc_flags2 & DdsHeaderDxt10::ALPHA_MODE_MASK {
                1 => AlphaMode::Straight,
                2 => AlphaMode::Premultiplied,
                3 => AlphaMode::Opaque,
                4 => AlphaMode::Custom,
                _ => AlphaMode::Unknown,
            };
        }

        let pf = &self.header.pixel_format;
        let flags = pf.pixel_flags();
        if flags.contains(PixelFormatFlags::FOURCC) {
            match pf.four_cc {
                FourCC::DXT2 | FourCC::DXT4 => AlphaMode::Premultiplied,
                _ => AlphaMode::Unknown,
            }
        } else if flags.intersects(PixelFormatFlags::ALPHA_PIXELS | PixelFormatFlags::ALPHA) {
            AlphaMode::Straight
        } else {
            AlphaMode::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use texstore_common::SliceSource;
    use zerocopy::FromZeros;

    use super::*;
    use crate::ErrorKind;

    fn header_bytes(four_cc: FourCC, size: u32) -> Vec<u8> {
        let mut header = DdsHeader::new_zeroed();
        header.size = size;
        header.width = 4;
        header.height = 4;
        header.pixel_format.size = DdsPixelFormat::SIZE;
        header.pixel_format.flags = PixelFormatFlags::FOURCC.bits();
        header.pixel_format.four_cc = four_cc;

        let mut bytes = DDS_MAGIC.to_vec();
        bytes.extend_from_slice(header.as_bytes());
        bytes
    }

    #[test]
    fn test_struct_sizes() {
        assert_eq!(std::mem::size_of::<DdsHeader>(), DdsHeader::SIZE as usize);
        assert_eq!(
            std::mem::size_of::<DdsPixelFormat>(),
            DdsPixelFormat::SIZE as usize
        );
        assert_eq!(std::mem::size_of::<DdsHeaderDxt10>(), DdsHeaderDxt10::SIZE);
    }

    #[test]
    fn test_read_legacy_header() {
        let bytes = header_bytes(FourCC::DXT1, 124);
        let mut source = SliceSource::new(&bytes);

        let headers = DdsHeaders::read(&mut source).unwrap();
        assert!(headers.dxt10.is_none());
        assert_eq!(headers.header.pixel_format.four_cc, FourCC::DXT1);
        assert_eq!(headers.encoded_len(), 128);
        assert!(source.is_empty());
    }

    #[test]
    fn test_read_dx10_header() {
        let mut bytes = header_bytes(FourCC::DX10, 124);
        let ext = DdsHeaderDxt10 {
            dxgi_format: DxgiFormat::BC7_UNORM.0,
            resource_dimension: ResourceDimension::Texture2D as u32,
            misc_flag: DdsHeaderDxt10::MISC_TEXTURE_CUBE,
            array_size: 2,
            misc_flags2: 2,
        };
        bytes.extend_from_slice(ext.as_bytes());
        let mut source = SliceSource::new(&bytes);

        let headers = DdsHeaders::read(&mut source).unwrap();
        let dxt10 = headers.dxt10.unwrap();
        assert_eq!(dxt10.format(), DxgiFormat::BC7_UNORM);
        assert_eq!(dxt10.dimension(), Some(ResourceDimension::Texture2D));
        assert!(dxt10.is_cubemap());
        assert_eq!(headers.alpha_mode(), AlphaMode::Premultiplied);
        assert_eq!(headers.encoded_len(), 148);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = header_bytes(FourCC::DXT1, 124);
        bytes[..4].copy_from_slice(b"KTX ");

        let err = DdsHeaders::read(&mut SliceSource::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic(m) if &m == b"KTX "));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_bad_header_size() {
        let bytes = header_bytes(FourCC::DXT1, 100);

        let err = DdsHeaders::read(&mut SliceSource::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::InvalidHeaderSize(100)));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_truncated_header() {
        let bytes = header_bytes(FourCC::DXT1, 124);

        let err = DdsHeaders::read(&mut SliceSource::new(&bytes[..60])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn test_truncated_dx10_extension() {
        let mut bytes = header_bytes(FourCC::DX10, 124);
        bytes.extend_from_slice(&[0u8; 12]);

        let err = DdsHeaders::read(&mut SliceSource::new(&bytes)).unwrap_err();
        assert!(matches!(
            err,
            Error::Truncated {
                stage: Stage::Header,
                needed: 20,
                available: 12
            }
        ));
    }

    #[test]
    fn test_legacy_alpha_modes() {
        let bytes = header_bytes(FourCC::DXT2, 124);
        let headers = DdsHeaders::read(&mut SliceSource::new(&bytes)).unwrap();
        assert_eq!(headers.alpha_mode(), AlphaMode::Premultiplied);

        let bytes = header_bytes(FourCC::DXT5, 124);
        let headers = DdsHeaders::read(&mut SliceSource::new(&bytes)).unwrap();
        assert_eq!(headers.alpha_mode(), AlphaMode::Unknown);
    }

    #[test]
    fn test_fourcc_display() {
        assert_eq!(FourCC::DXT5.to_string(), "DXT5");
        assert_eq!(FourCC::R16F.to_string(), "0x0000006f");
        assert_eq!(FourCC::R16F.to_u32(), 111);
    }
}
