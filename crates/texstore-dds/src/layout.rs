//! Texture shape and mip pyramid layout.
//!
//! The header's flag soup (cubemap bits, volume caps, mip-count flag, DX10
//! dimension and array size) is resolved exactly once into a
//! [`TextureShape`]. [`plan_layout`] then walks layers, faces and mips in
//! storage order and assigns every level its size and offset.

use tracing::debug;

use crate::format::FormatDescriptor;
use crate::header::{DdsCaps2, DdsFlags, DdsHeaders, ResourceDimension};
use crate::options::PitchPolicy;
use crate::{Error, Result};

/// Number of faces in a cubemap.
pub const CUBE_FACES: u32 = 6;

/// What kind of texture the file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture3D,
    Cube,
    CubeArray,
}

impl TextureKind {
    /// Whether this kind stores more than one layer.
    pub fn is_array(self) -> bool {
        matches!(
            self,
            TextureKind::Texture1DArray | TextureKind::Texture2DArray | TextureKind::CubeArray
        )
    }
}

/// Dimensions and counts of a texture, resolved from its headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureShape {
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub layers: u32,
    pub faces: u32,
    pub mip_levels: u32,
    /// Row pitch the header declares for level 0, if any.
    pub declared_pitch: Option<u32>,
}

impl TextureShape {
    /// Resolve the shape from the parsed headers.
    pub fn resolve(headers: &DdsHeaders) -> Result<Self> {
        let header = &headers.header;
        let flags = header.dds_flags();
        let caps2 = header.dds_caps2();

        let width = header.width;
        let height = header.height;
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions(format!(
                "base level is {width}x{height}"
            )));
        }

        let dimension = match &headers.dxt10 {
            Some(dxt10) => match dxt10.dimension() {
                Some(
                    dim @ (ResourceDimension::Texture1D
                    | ResourceDimension::Texture2D
                    | ResourceDimension::Texture3D),
                ) => dim,
                _ => {
                    return Err(Error::invalid_field(
                        "dxt10.resource_dimension",
                        format!("{} is not a 1D, 2D or 3D texture", {
                            dxt10.resource_dimension
                        }),
                    ))
                }
            },
            None if caps2.contains(DdsCaps2::VOLUME) => ResourceDimension::Texture3D,
            None => ResourceDimension::Texture2D,
        };

        if dimension == ResourceDimension::Texture1D && height != 1 {
            return Err(Error::invalid_field(
                "height",
                format!("1D texture with height {height}"),
            ));
        }

        let is_volume = dimension == ResourceDimension::Texture3D
            || caps2.contains(DdsCaps2::VOLUME)
            || flags.contains(DdsFlags::DEPTH);
        let depth = if is_volume { header.depth } else { 1 };
        if depth == 0 {
            return Err(Error::InvalidDimensions("volume depth is 0".into()));
        }

        let layers = match &headers.dxt10 {
            Some(dxt10) if dxt10.array_size == 0 => {
                return Err(Error::InvalidDimensions("array size is 0".into()));
            }
            Some(dxt10) => dxt10.array_size,
            None => 1,
        };

        let is_cube = caps2.contains(DdsCaps2::CUBEMAP)
            || headers.dxt10.is_some_and(|dxt10| dxt10.is_cubemap());
        let faces = if is_cube { CUBE_FACES } else { 1 };

        let is_3d = dimension == ResourceDimension::Texture3D || depth > 1;
        if is_3d && faces > 1 {
            return Err(Error::UnsupportedShape(format!(
                "cubemap with volume depth {depth}"
            )));
        }
        if is_3d && layers > 1 {
            return Err(Error::UnsupportedShape(format!(
                "array of {layers} volume textures"
            )));
        }

        let mip_levels = match { header.mipmap_count } {
            count if count > 0 && flags.contains(DdsFlags::MIPMAP_COUNT) => count,
            _ => 1,
        };
        let full_chain = max_mip_levels(width, height, depth);
        if mip_levels > full_chain {
            return Err(Error::invalid_field(
                "mipmap_count",
                format!("{mip_levels} levels but a {width}x{height}x{depth} chain has {full_chain}"),
            ));
        }

        let kind = match (dimension, is_3d, faces > 1, layers > 1) {
            (_, true, _, _) => TextureKind::Texture3D,
            (_, _, true, false) => TextureKind::Cube,
            (_, _, true, true) => TextureKind::CubeArray,
            (ResourceDimension::Texture1D, _, _, false) => TextureKind::Texture1D,
            (ResourceDimension::Texture1D, _, _, true) => TextureKind::Texture1DArray,
            (_, _, _, false) => TextureKind::Texture2D,
            (_, _, _, true) => TextureKind::Texture2DArray,
        };

        Ok(Self {
            kind,
            width,
            height,
            depth,
            layers,
            faces,
            mip_levels,
            declared_pitch: header.declared_pitch(),
        })
    }

    /// Extent of mip `level` along each axis.
    pub fn level_extent(&self, level: u32) -> (u32, u32, u32) {
        (
            mip_dimension(self.width, level),
            mip_dimension(self.height, level),
            mip_dimension(self.depth, level),
        )
    }
}

/// Size of `base` at mip `level`: halved per level, never below 1.
#[inline]
pub fn mip_dimension(base: u32, level: u32) -> u32 {
    base.checked_shr(level).unwrap_or(0).max(1)
}

/// Length of the full mip chain down to 1x1x1.
#[inline]
pub fn max_mip_levels(width: u32, height: u32, depth: u32) -> u32 {
    32 - width.max(height).max(depth).max(1).leading_zeros()
}

/// Dimensions and sizes of one mip level, shared by every layer and face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipExtent {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Bytes between consecutive rows of blocks.
    pub row_pitch: usize,
    /// Bytes between consecutive depth slices.
    pub slice_pitch: usize,
    /// Bytes in the whole level.
    pub size: usize,
}

/// Placement of one (layer, face, mip) level in the storage buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelPlan {
    pub layer: u32,
    pub face: u32,
    pub level: u32,
    pub extent: MipExtent,
    /// Byte offset from the start of the buffer.
    pub offset: usize,
}

/// The full storage layout.
///
/// Every layer and face repeats the same mip chain, so only the chain is
/// stored; individual level placements are computed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Per-mip extents of one layer/face chain.
    pub chain: Vec<MipExtent>,
    pub layers: u32,
    pub faces: u32,
    /// Bytes in one layer/face chain.
    pub chain_size: usize,
    /// Total buffer size in bytes.
    pub total_size: usize,
    /// Offset of each mip within a chain.
    mip_offsets: Vec<usize>,
}

impl Layout {
    /// Number of mip levels per layer and face.
    pub fn mip_levels(&self) -> u32 {
        self.chain.len() as u32
    }

    /// Number of (layer, face, mip) levels.
    pub fn level_count(&self) -> u64 {
        u64::from(self.layers) * u64::from(self.faces) * self.chain.len() as u64
    }

    /// Placement of one level, if the indices are in range.
    pub fn level(&self, layer: u32, face: u32, level: u32) -> Option<LevelPlan> {
        if layer >= self.layers || face >= self.faces {
            return None;
        }
        let extent = *self.chain.get(level as usize)?;
        let mip_offset = *self.mip_offsets.get(level as usize)?;
        let surface = layer as usize * self.faces as usize + face as usize;
        Some(LevelPlan {
            layer,
            face,
            level,
            extent,
            offset: surface * self.chain_size + mip_offset,
        })
    }

    /// Every level in storage order.
    pub fn levels(&self) -> impl Iterator<Item = LevelPlan> + '_ {
        (0..self.layers).flat_map(move |layer| {
            (0..self.faces).flat_map(move |face| {
                (0..self.mip_levels()).filter_map(move |level| self.level(layer, face, level))
            })
        })
    }
}

fn overflow(what: &str) -> Error {
    Error::InvalidDimensions(format!("{what} overflows the address space"))
}

/// Compute the byte size of one mip level.
fn plan_extent(
    format: &FormatDescriptor,
    width: u32,
    height: u32,
    depth: u32,
    pitch_override: Option<u32>,
) -> Result<MipExtent> {
    let block = format.block;
    let blocks_x = u64::from(width.div_ceil(block.width));
    let blocks_y = u64::from(height.div_ceil(block.height));
    let blocks_z = u64::from(depth.div_ceil(block.depth));

    let packed_row = blocks_x
        .checked_mul(u64::from(format.block_bytes))
        .ok_or_else(|| overflow("row pitch"))?;
    let alignment = u64::from(format.row_alignment.max(1));
    let aligned_row = packed_row
        .checked_next_multiple_of(alignment)
        .ok_or_else(|| overflow("row pitch"))?;

    let row_pitch = match pitch_override {
        Some(declared) if u64::from(declared) < packed_row => {
            return Err(Error::invalid_field(
                "pitch_or_linear_size",
                format!("declared pitch {declared} is smaller than a {width} texel row ({packed_row} bytes)"),
            ));
        }
        Some(declared) => u64::from(declared),
        None => aligned_row,
    };

    let slice_pitch = row_pitch
        .checked_mul(blocks_y)
        .ok_or_else(|| overflow("slice pitch"))?;
    let size = slice_pitch
        .checked_mul(blocks_z)
        .ok_or_else(|| overflow("level size"))?;

    let to_usize = |v: u64| usize::try_from(v).map_err(|_| overflow("level size"));
    Ok(MipExtent {
        width,
        height,
        depth,
        row_pitch: to_usize(row_pitch)?,
        slice_pitch: to_usize(slice_pitch)?,
        size: to_usize(size)?,
    })
}

/// Plan the storage layout of `shape` in `format`.
///
/// Levels are ordered layer-major, then face, then mip from largest to
/// smallest, with no padding between them.
pub fn plan_layout(
    shape: &TextureShape,
    format: &FormatDescriptor,
    pitch_policy: PitchPolicy,
) -> Result<Layout> {
    let base_pitch = match pitch_policy {
        PitchPolicy::PreferDeclared if !format.compressed => shape.declared_pitch,
        _ => None,
    };

    let chain = (0..shape.mip_levels)
        .map(|level| {
            let (width, height, depth) = shape.level_extent(level);
            let pitch = if level == 0 { base_pitch } else { None };
            plan_extent(format, width, height, depth, pitch)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut mip_offsets = Vec::with_capacity(chain.len());
    let mut chain_size = 0usize;
    for extent in &chain {
        mip_offsets.push(chain_size);
        chain_size = chain_size
            .checked_add(extent.size)
            .ok_or_else(|| overflow("chain size"))?;
    }

    let surfaces = usize::try_from(u64::from(shape.layers) * u64::from(shape.faces))
        .map_err(|_| overflow("surface count"))?;
    let total_size = chain_size
        .checked_mul(surfaces)
        .ok_or_else(|| overflow("total size"))?;

    debug!(
        kind = ?shape.kind,
        layers = shape.layers,
        faces = shape.faces,
        mips = shape.mip_levels,
        total_size,
        "planned texture layout"
    );

    Ok(Layout {
        chain,
        layers: shape.layers,
        faces: shape.faces,
        chain_size,
        total_size,
        mip_offsets,
    })
}
