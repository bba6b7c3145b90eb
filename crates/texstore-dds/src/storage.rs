//! Decoded texture storage.

use texstore_common::ByteSource;
use tracing::trace;

use crate::error::Stage;
use crate::format::FormatDescriptor;
use crate::header::AlphaMode;
use crate::layout::{Layout, LevelPlan, MipExtent, TextureKind, TextureShape};
use crate::{Error, Result};

/// Largest slice of a level read in one go from a source of unknown length.
const READ_CHUNK: usize = 1 << 20;

/// A texture's payload in one contiguous buffer.
///
/// Levels are stored layer-major, then by face, then by mip from largest to
/// smallest, back to back. The bytes are exactly what the file contained;
/// nothing is decompressed or converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    format: FormatDescriptor,
    kind: TextureKind,
    alpha_mode: AlphaMode,
    layout: Layout,
    data: Vec<u8>,
}

impl Storage {
    /// Read every planned level from `source`.
    ///
    /// `source` must be positioned at the first payload byte. Bytes past the
    /// last level are left unread. Sources that know their length are checked
    /// up front; others grow the buffer as bytes arrive, so a short stream
    /// fails without committing the declared size.
    pub(crate) fn read<S: ByteSource + ?Sized>(
        source: &mut S,
        format: FormatDescriptor,
        shape: &TextureShape,
        alpha_mode: AlphaMode,
        layout: Layout,
    ) -> Result<Self> {
        let total = layout.total_size;
        let mut data = Vec::new();
        if let Some(available) = source.remaining_hint() {
            if available < total {
                return Err(Error::Truncated {
                    stage: Stage::Payload,
                    needed: total,
                    available,
                });
            }
            data.try_reserve_exact(total).map_err(|_| unallocatable(total))?;
        }

        for plan in layout.levels() {
            let mut left = plan.extent.size;
            while left > 0 {
                let start = data.len();
                let len = left.min(READ_CHUNK);
                data.try_reserve(len).map_err(|_| unallocatable(total))?;
                data.resize(start + len, 0);
                source
                    .read_into(&mut data[start..])
                    .map_err(|e| match e {
                        texstore_common::Error::UnexpectedEof { available, .. } => {
                            Error::Truncated {
                                stage: Stage::Payload,
                                needed: total,
                                available: start + available,
                            }
                        }
                        other => Error::from_source(Stage::Payload, other),
                    })?;
                left -= len;
            }
            trace!(
                layer = plan.layer,
                face = plan.face,
                level = plan.level,
                offset = plan.offset,
                size = plan.extent.size,
                "copied level"
            );
        }

        Ok(Self {
            format,
            kind: shape.kind,
            alpha_mode,
            layout,
            data,
        })
    }

    pub fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    /// Number of array layers.
    pub fn layers(&self) -> u32 {
        self.layout.layers
    }

    /// Number of faces per layer: 6 for cubemaps, otherwise 1.
    pub fn faces(&self) -> u32 {
        self.layout.faces
    }

    /// Number of mip levels per layer and face.
    pub fn level_count(&self) -> u32 {
        self.layout.mip_levels()
    }

    /// Dimensions and pitches of mip `level`.
    pub fn extent(&self, level: u32) -> Option<&MipExtent> {
        self.layout.chain.get(level as usize)
    }

    /// Every level's placement, in storage order.
    pub fn levels(&self) -> impl Iterator<Item = LevelPlan> + '_ {
        self.layout.levels()
    }

    /// The whole payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Byte offset of a level within [`data`](Self::data).
    pub fn offset(&self, layer: u32, face: u32, level: u32) -> Option<usize> {
        self.layout.level(layer, face, level).map(|plan| plan.offset)
    }

    /// The bytes of one level.
    pub fn level_data(&self, layer: u32, face: u32, level: u32) -> Option<&[u8]> {
        let plan = self.layout.level(layer, face, level)?;
        self.data.get(plan.offset..plan.offset + plan.extent.size)
    }
}

fn unallocatable(total: usize) -> Error {
    Error::InvalidDimensions(format!("payload of {total} bytes cannot be allocated"))
}
