//! Sequential byte sources over memory, files and streams.
//!
//! Every decoder in texstore reads its input through [`ByteSource`], a single
//! "give me the next N bytes or tell me you ran out" capability. Three
//! adapters are provided:
//!
//! - [`SliceSource`] - a borrowed memory block
//! - [`MappedSource`] - a memory-mapped file opened from a path
//! - [`StreamSource`] - any [`std::io::Read`] implementation

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;
use zerocopy::FromBytes;

use crate::{Error, Result};

/// A forward-only source of bytes.
pub trait ByteSource {
    /// Fill `buf` completely with the next `buf.len()` bytes.
    ///
    /// Fails with [`Error::UnexpectedEof`] if the source is exhausted first.
    /// The cursor position after a failed read is unspecified.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Number of bytes consumed so far.
    fn position(&self) -> u64;

    /// Number of bytes left, if the source knows it up front.
    fn remaining_hint(&self) -> Option<usize> {
        None
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_into(buf)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn remaining_hint(&self) -> Option<usize> {
        (**self).remaining_hint()
    }
}

/// Convenience readers built on top of [`ByteSource::read_into`].
pub trait ByteSourceExt: ByteSource {
    /// Read a fixed-size byte array.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        self.read_into(&mut bytes)?;
        Ok(bytes)
    }

    /// Read a little-endian u32.
    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(LittleEndian::read_u32(&bytes))
    }

    /// Read a struct using zerocopy.
    fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let mut bytes = vec![0u8; size];
        self.read_into(&mut bytes)?;
        T::read_from_bytes(&bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }
}

impl<S: ByteSource + ?Sized> ByteSourceExt for S {}

/// Copy the next `buf.len()` bytes out of `data` starting at `*position`.
#[inline]
fn copy_from_slice(data: &[u8], position: &mut usize, buf: &mut [u8]) -> Result<()> {
    let available = data.len().saturating_sub(*position);
    if available < buf.len() {
        return Err(Error::UnexpectedEof {
            needed: buf.len(),
            available,
        });
    }
    buf.copy_from_slice(&data[*position..*position + buf.len()]);
    *position += buf.len();
    Ok(())
}

/// A byte source over a borrowed memory block.
///
/// # Example
///
/// ```
/// use texstore_common::{ByteSourceExt, SliceSource};
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05];
/// let mut source = SliceSource::new(&data);
///
/// assert_eq!(source.read_u32().unwrap(), 0x04030201);
/// assert_eq!(source.remaining(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a new source from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Borrow the next `count` bytes without copying.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }
}

impl ByteSource for SliceSource<'_> {
    #[inline]
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        copy_from_slice(self.data, &mut self.position, buf)
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position as u64
    }

    #[inline]
    fn remaining_hint(&self) -> Option<usize> {
        Some(self.remaining())
    }
}

/// A byte source over a memory-mapped file.
#[derive(Debug)]
pub struct MappedSource {
    /// `None` for empty files, which cannot be mapped on every platform.
    mmap: Option<Mmap>,
    position: usize,
}

impl MappedSource {
    /// Open and map the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_file(&file)
    }

    /// Map an already opened file.
    pub fn from_file(file: &File) -> io::Result<Self> {
        let mmap = if file.metadata()?.len() == 0 {
            None
        } else {
            // The mapping is read-only; concurrent truncation of the file by
            // another process is outside what we can guard against.
            Some(unsafe { Mmap::map(file)? })
        };

        Ok(Self { mmap, position: 0 })
    }

    /// The whole mapped file.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.as_slice().len().saturating_sub(self.position)
    }
}

impl ByteSource for MappedSource {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let data = self.mmap.as_deref().unwrap_or(&[]);
        copy_from_slice(data, &mut self.position, buf)
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position as u64
    }

    #[inline]
    fn remaining_hint(&self) -> Option<usize> {
        Some(self.remaining())
    }
}

/// A byte source over any sequential reader.
///
/// The total length is unknown, so exhaustion is only discovered when a read
/// comes up short.
#[derive(Debug)]
pub struct StreamSource<R> {
    inner: R,
    position: u64,
}

impl<R: Read> StreamSource<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.position += filled as u64;
                    return Err(Error::UnexpectedEof {
                        needed: buf.len(),
                        available: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }
        self.position += filled as u64;
        Ok(())
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position
    }
}
