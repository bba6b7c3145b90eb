//! Texstore - texture file loading into contiguous level storage.
//!
//! This crate provides a unified interface to the texstore crates.
//!
//! # Crates
//!
//! - [`texstore_common`] - Byte sources over memory, mapped files and streams
//! - [`texstore_dds`] - DDS header parsing, format resolution and loading
//!
//! # Example
//!
//! ```no_run
//! use texstore::prelude::*;
//!
//! let storage = load_dds_file("albedo.dds")?;
//! println!(
//!     "{} {:?}: {} layers, {} faces, {} mips",
//!     storage.format(),
//!     storage.kind(),
//!     storage.layers(),
//!     storage.faces(),
//!     storage.level_count(),
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use texstore_common as common;
pub use texstore_dds as dds;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use texstore_common::{ByteSource, MappedSource, SliceSource, StreamSource};
    pub use texstore_dds::{
        load_dds_file, load_dds_memory, load_dds_stream, DdsInfo, DdsLoader, ErrorKind,
        FormatDescriptor, LoadOptions, PitchPolicy, Storage, TextureKind,
    };
}

// Re-export commonly used types at the crate root
pub use texstore_dds::{DdsLoader, Storage};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
