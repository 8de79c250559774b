use crate::{Error, Result};

#[derive(Clone, Debug)]
/// A readable stream of binary data.
pub struct Reader<'a> {
    /// The underlying data of the reader.
    data: &'a [u8],
    /// The current offset in bytes. Is not guaranteed to be in range.
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Create a new readable stream of binary data.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a new readable stream of binary data at a specific position.
    pub fn new_at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    /// The remaining data from the current offset.
    pub fn tail(&self) -> Option<&'a [u8]> {
        self.data.get(self.offset..)
    }

    /// Try to read `T` from the data.
    pub fn read<T: Readable<'a>>(&mut self) -> Option<T> {
        T::read(self)
    }

    /// Read a certain number of bytes.
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let v = self.data.get(self.offset..self.offset.checked_add(len)?)?;
        self.offset += len;
        Some(v)
    }

    /// Skip the next `n` bytes, failing if that would leave the data.
    pub fn skip_bytes(&mut self, n: usize) -> Option<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Returns the current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Trait for an object that can be read from a byte stream.
pub trait Readable<'a>: Sized {
    fn read(r: &mut Reader<'a>) -> Option<Self>;

    /// Read `Self` at an absolute offset of `data`.
    fn read_at(data: &'a [u8], offset: usize) -> Result<Self> {
        Reader::new_at(data, offset).read::<Self>().ok_or(Error::MissingData)
    }
}

impl<const N: usize> Readable<'_> for [u8; N] {
    fn read(r: &mut Reader) -> Option<Self> {
        r.read_bytes(N)?.try_into().ok()
    }
}

impl Readable<'_> for u16 {
    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<[u8; 2]>().map(Self::from_be_bytes)
    }
}

impl Readable<'_> for i16 {
    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<[u8; 2]>().map(Self::from_be_bytes)
    }
}

impl Readable<'_> for u32 {
    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<[u8; 4]>().map(Self::from_be_bytes)
    }
}

/// A writable stream of binary data.
pub struct Writer(Vec<u8>);

impl Writer {
    /// Create a new writable stream of binary data.
    pub fn new() -> Self {
        Self(Vec::with_capacity(1024))
    }

    /// Create a new writable stream of binary data with a capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Write `T` into the data.
    pub fn write<T: Writeable>(&mut self, data: T) {
        data.write(self);
    }

    /// Give bytes into the writer.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.0.extend(bytes);
    }

    /// Align the contents to a byte boundary.
    pub fn align(&mut self, to: usize) {
        while self.0.len() % to != 0 {
            self.0.push(0);
        }
    }

    /// The number of written bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return the written bytes.
    pub fn finish(self) -> Vec<u8> {
        self.0
    }
}

/// Trait for an object that can be written into a byte stream.
pub trait Writeable: Sized {
    fn write(&self, w: &mut Writer);
}

impl<const N: usize> Writeable for [u8; N] {
    fn write(&self, w: &mut Writer) {
        w.extend(self)
    }
}

impl Writeable for u16 {
    fn write(&self, w: &mut Writer) {
        w.write::<[u8; 2]>(self.to_be_bytes());
    }
}

impl Writeable for i16 {
    fn write(&self, w: &mut Writer) {
        w.write::<[u8; 2]>(self.to_be_bytes());
    }
}

impl Writeable for u32 {
    fn write(&self, w: &mut Writer) {
        w.write::<[u8; 4]>(self.to_be_bytes());
    }
}

/// A private, patchable copy of some font data.
///
/// The original data is never modified, so it can still be read while the
/// copy is being patched.
pub struct Patcher {
    data: Vec<u8>,
    patched: usize,
}

impl Patcher {
    /// Create a working copy of `data`.
    pub fn new(data: &[u8]) -> Self {
        Self { data: data.to_vec(), patched: 0 }
    }

    /// Overwrite the bytes at the absolute `offset` with `value`.
    pub fn write_at<T: Writeable>(&mut self, offset: usize, value: T) -> Result<()> {
        let mut w = Writer::with_capacity(4);
        w.write(value);
        let bytes = w.finish();
        let end = offset.checked_add(bytes.len()).ok_or(Error::InvalidOffset)?;
        self.data
            .get_mut(offset..end)
            .ok_or(Error::MissingData)?
            .copy_from_slice(&bytes);
        self.patched += bytes.len();
        Ok(())
    }

    /// The number of bytes overwritten so far.
    pub fn patched(&self) -> usize {
        self.patched
    }

    /// Return the patched data.
    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}
