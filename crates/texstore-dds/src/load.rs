//! Loading entry points.

use std::io::Read;
use std::path::Path;

use texstore_common::{ByteSource, MappedSource, SliceSource, StreamSource};
use tracing::debug;

use crate::format::{resolve_format, FormatDescriptor};
use crate::header::{AlphaMode, DdsHeaders};
use crate::layout::{plan_layout, Layout, TextureShape};
use crate::options::LoadOptions;
use crate::storage::Storage;
use crate::{Error, Result};

/// Everything known about a file before its payload is read.
#[derive(Debug, Clone)]
pub struct DdsInfo {
    pub headers: DdsHeaders,
    pub format: FormatDescriptor,
    pub shape: TextureShape,
    pub alpha_mode: AlphaMode,
    pub layout: Layout,
}

impl DdsInfo {
    /// Bytes the payload will occupy once loaded.
    pub fn payload_size(&self) -> usize {
        self.layout.total_size
    }
}

/// A configurable DDS loader.
///
/// # Example
///
/// ```no_run
/// use texstore_dds::{DdsLoader, LoadOptions, PitchPolicy};
///
/// let loader = DdsLoader::new(
///     LoadOptions::new()
///         .pitch_policy(PitchPolicy::Recompute)
///         .max_payload_bytes(256 << 20),
/// );
/// let storage = loader.load_file("albedo.dds")?;
/// println!("{} levels of {}", storage.level_count(), storage.format());
/// # Ok::<(), texstore_dds::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DdsLoader {
    options: LoadOptions,
}

impl DdsLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load a file by memory-mapping it.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Storage> {
        let mut source = open(path.as_ref())?;
        self.load_source(&mut source)
    }

    /// Load from a complete in-memory file.
    pub fn load_memory(&self, data: &[u8]) -> Result<Storage> {
        self.load_source(&mut SliceSource::new(data))
    }

    /// Load from a sequential reader.
    pub fn load_stream<R: Read>(&self, reader: R) -> Result<Storage> {
        self.load_source(&mut StreamSource::new(reader))
    }

    /// Load from an arbitrary byte source positioned at the magic.
    pub fn load_source(&self, source: &mut dyn ByteSource) -> Result<Storage> {
        let info = self.inspect_source(source)?;
        Storage::read(
            source,
            info.format,
            &info.shape,
            info.alpha_mode,
            info.layout,
        )
    }

    pub fn inspect_file<P: AsRef<Path>>(&self, path: P) -> Result<DdsInfo> {
        let mut source = open(path.as_ref())?;
        self.inspect_source(&mut source)
    }

    pub fn inspect_memory(&self, data: &[u8]) -> Result<DdsInfo> {
        self.inspect_source(&mut SliceSource::new(data))
    }

    pub fn inspect_stream<R: Read>(&self, reader: R) -> Result<DdsInfo> {
        self.inspect_source(&mut StreamSource::new(reader))
    }

    /// Parse the headers and plan the layout without touching the payload.
    ///
    /// On success `source` is left at the first payload byte.
    pub fn inspect_source(&self, source: &mut dyn ByteSource) -> Result<DdsInfo> {
        let headers = DdsHeaders::read(source)?;
        let header = &headers.header;
        debug!(
            width = { header.width },
            height = { header.height },
            depth = { header.depth },
            mips = { header.mipmap_count },
            dx10 = headers.dxt10.is_some(),
            "parsed DDS header"
        );

        let format = resolve_format(&headers)?;
        debug!(format = %format, compressed = format.compressed, "resolved format");

        let shape = TextureShape::resolve(&headers)?;
        let layout = plan_layout(&shape, &format, self.options.pitch_policy)?;

        if let Some(limit) = self.options.max_payload_bytes {
            if layout.total_size as u64 > limit {
                return Err(Error::InvalidDimensions(format!(
                    "payload of {} bytes exceeds the {limit} byte limit",
                    layout.total_size
                )));
            }
        }

        Ok(DdsInfo {
            alpha_mode: headers.alpha_mode(),
            headers,
            format,
            shape,
            layout,
        })
    }
}

fn open(path: &Path) -> Result<MappedSource> {
    MappedSource::open(path).map_err(|source| Error::ResourceNotFound {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a DDS file with default options.
pub fn load_dds_file<P: AsRef<Path>>(path: P) -> Result<Storage> {
    DdsLoader::default().load_file(path)
}

/// Load a DDS file held in memory with default options.
pub fn load_dds_memory(data: &[u8]) -> Result<Storage> {
    DdsLoader::default().load_memory(data)
}

/// Load a DDS file from a reader with default options.
pub fn load_dds_stream<R: Read>(reader: R) -> Result<Storage> {
    DdsLoader::default().load_stream(reader)
}
