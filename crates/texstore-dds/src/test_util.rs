//! Synthetic DDS files for tests.

use zerocopy::{FromZeros, IntoBytes};

use crate::dxgi::DxgiFormat;
use crate::header::{
    DdsCaps, DdsCaps2, DdsFlags, DdsHeader, DdsHeaderDxt10, DdsHeaders, DdsPixelFormat, FourCC,
    PixelFormatFlags, ResourceDimension,
};
use crate::DDS_MAGIC;

/// Builder for DDS headers, with an encoder that appends a payload.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TestDds {
    pub headers: DdsHeaders,
}

impl TestDds {
    fn base(width: u32, height: u32) -> Self {
        let mut header = DdsHeader::new_zeroed();
        header.size = DdsHeader::SIZE;
        header.flags =
            (DdsFlags::CAPS | DdsFlags::HEIGHT | DdsFlags::WIDTH | DdsFlags::PIXEL_FORMAT).bits();
        header.width = width;
        header.height = height;
        header.caps = DdsCaps::TEXTURE.bits();
        header.pixel_format.size = DdsPixelFormat::SIZE;
        Self {
            headers: DdsHeaders {
                header,
                dxt10: None,
            },
        }
    }

    pub fn fourcc(four_cc: FourCC, width: u32, height: u32) -> Self {
        let mut dds = Self::base(width, height);
        let pf = &mut dds.headers.header.pixel_format;
        pf.flags = PixelFormatFlags::FOURCC.bits();
        pf.four_cc = four_cc;
        dds
    }

    pub fn masks(
        flags: PixelFormatFlags,
        bit_count: u32,
        [r, g, b, a]: [u32; 4],
        width: u32,
        height: u32,
    ) -> Self {
        let mut dds = Self::base(width, height);
        let pf = &mut dds.headers.header.pixel_format;
        pf.flags = flags.bits();
        pf.rgb_bit_count = bit_count;
        pf.r_bit_mask = r;
        pf.g_bit_mask = g;
        pf.b_bit_mask = b;
        pf.a_bit_mask = a;
        dds
    }

    /// 32-bit A8R8G8B8.
    pub fn argb8(width: u32, height: u32) -> Self {
        Self::masks(
            PixelFormatFlags::RGB | PixelFormatFlags::ALPHA_PIXELS,
            32,
            [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000],
            width,
            height,
        )
    }

    pub fn dx10(format: DxgiFormat, width: u32, height: u32) -> Self {
        let mut dds = Self::fourcc(FourCC::DX10, width, height);
        let mut ext = DdsHeaderDxt10::new_zeroed();
        ext.dxgi_format = format.0;
        ext.resource_dimension = ResourceDimension::Texture2D as u32;
        ext.array_size = 1;
        dds.headers.dxt10 = Some(ext);
        dds
    }

    pub fn mips(mut self, count: u32) -> Self {
        let header = &mut self.headers.header;
        header.flags |= DdsFlags::MIPMAP_COUNT.bits();
        header.caps |= (DdsCaps::MIPMAP | DdsCaps::COMPLEX).bits();
        header.mipmap_count = count;
        self
    }

    pub fn cubemap(mut self) -> Self {
        let header = &mut self.headers.header;
        header.caps |= DdsCaps::COMPLEX.bits();
        header.caps2 |= (DdsCaps2::CUBEMAP | DdsCaps2::CUBEMAP_ALL_FACES).bits();
        self
    }

    pub fn volume(mut self, depth: u32) -> Self {
        let header = &mut self.headers.header;
        header.flags |= DdsFlags::DEPTH.bits();
        header.caps |= DdsCaps::COMPLEX.bits();
        header.caps2 |= DdsCaps2::VOLUME.bits();
        header.depth = depth;
        if let Some(ext) = self.headers.dxt10.as_mut() {
            ext.resource_dimension = ResourceDimension::Texture3D as u32;
        }
        self
    }

    /// Only meaningful on DX10 files.
    pub fn array(mut self, layers: u32) -> Self {
        if let Some(ext) = self.headers.dxt10.as_mut() {
            ext.array_size = layers;
        }
        self
    }

    pub fn pitch(mut self, pitch: u32) -> Self {
        let header = &mut self.headers.header;
        header.flags |= DdsFlags::PITCH.bits();
        header.pitch_or_linear_size = pitch;
        self
    }

    /// Serialize the headers followed by `payload`.
    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        encode(&self.headers, payload)
    }
}

/// Serialize `headers` followed by `payload`.
pub(crate) fn encode(headers: &DdsHeaders, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(headers.encoded_len() + payload.len());
    out.extend_from_slice(DDS_MAGIC);
    out.extend_from_slice(headers.header.as_bytes());
    if let Some(ext) = &headers.dxt10 {
        out.extend_from_slice(ext.as_bytes());
    }
    out.extend_from_slice(payload);
    out
}

/// Deterministic non-repeating-ish payload bytes.
pub(crate) fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + i / 251) as u8).collect()
}
