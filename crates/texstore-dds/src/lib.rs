//! DDS texture loading.
//!
//! A DDS file is a small header followed by the raw payload of every mip
//! level of every face of every array layer. This crate parses the header,
//! works out the pixel format and the texture's shape, and copies the
//! payload into a single [`Storage`] buffer without decoding it.
//!
//! Supported inputs:
//! - legacy headers with a FourCC code (DXT1-5, ATI1/2, BC4/5, float and
//!   16-bit D3DFMT codes)
//! - legacy headers with RGB, luminance, alpha or bump bit masks
//! - DX10 extended headers naming any linear DXGI format
//! - 1D, 2D, 3D, cube, and array textures with full or partial mip chains
//!
//! # Example
//!
//! ```no_run
//! use texstore_dds::load_dds_file;
//!
//! let storage = load_dds_file("skybox.dds")?;
//! for level in 0..storage.level_count() {
//!     let extent = storage.extent(level).unwrap();
//!     println!("mip {level}: {}x{}", extent.width, extent.height);
//! }
//! let top = storage.level_data(0, 0, 0).unwrap();
//! # let _ = top;
//! # Ok::<(), texstore_dds::Error>(())
//! ```

mod dxgi;
mod error;
mod format;
mod header;
mod layout;
mod load;
mod options;
mod storage;

#[cfg(test)]
mod test_util;

pub use dxgi::DxgiFormat;
pub use error::{Error, ErrorKind, Result, Stage};
pub use format::{
    fourcc_to_dxgi, resolve_format, BlockFootprint, Channel, ChannelMasks, Channels,
    FormatDescriptor, Numeric, Support,
};
pub use header::{
    AlphaMode, DdsCaps, DdsCaps2, DdsFlags, DdsHeader, DdsHeaderDxt10, DdsHeaders,
    DdsPixelFormat, FourCC, PixelFormatFlags, ResourceDimension,
};
pub use layout::{
    max_mip_levels, mip_dimension, plan_layout, Layout, LevelPlan, MipExtent, TextureKind,
    TextureShape, CUBE_FACES,
};
pub use load::{load_dds_file, load_dds_memory, load_dds_stream, DdsInfo, DdsLoader};
pub use options::{LoadOptions, PitchPolicy};
pub use storage::Storage;

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";
