//! Common utilities for texstore.
//!
//! This crate provides the input side shared by every texstore decoder:
//!
//! - [`ByteSource`] - sequential "next N bytes or exhaustion" reads
//! - [`SliceSource`], [`MappedSource`], [`StreamSource`] - memory, file and
//!   stream adapters
//! - [`ByteSourceExt`] - little-endian and zerocopy struct helpers

mod error;
mod source;

pub use error::{Error, Result};
pub use source::{ByteSource, ByteSourceExt, MappedSource, SliceSource, StreamSource};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
