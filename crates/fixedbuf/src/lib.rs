use bytes::{BufMut, BytesMut};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixedBufError {
    #[error("exceeds fixed capacity: need {need} bytes but only {remaining} remaining")]
    Overflow { need: usize, remaining: usize },
    #[error("offset {offset} is out of written range {len}")]
    OutOfRange { offset: usize, len: usize },
}

/// A `BytesMut` which refuses to grow past the capacity given at creation.
///
/// Every write is checked up front, so a failed write leaves the buffer
/// untouched.
#[derive(Debug)]
pub struct FixedBuf {
    inner: BytesMut,
    capacity: usize,
}

impl FixedBuf {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.inner.len()
    }

    fn reserve(&self, need: usize) -> Result<(), FixedBufError> {
        if need > self.remaining() {
            return Err(FixedBufError::Overflow {
                need,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn put_u8(&mut self, val: u8) -> Result<(), FixedBufError> {
        self.reserve(1)?;
        self.inner.put_u8(val);
        Ok(())
    }

    pub fn put_u16(&mut self, val: u16) -> Result<(), FixedBufError> {
        self.reserve(2)?;
        self.inner.put_u16(val);
        Ok(())
    }

    pub fn put_slice(&mut self, src: &[u8]) -> Result<(), FixedBufError> {
        self.reserve(src.len())?;
        self.inner.put_slice(src);
        Ok(())
    }

    /// Overwrite two already written bytes, used to back-fill length fields.
    pub fn put_u16_at(&mut self, offset: usize, val: u16) -> Result<(), FixedBufError> {
        if offset + 2 > self.inner.len() {
            return Err(FixedBufError::OutOfRange {
                offset,
                len: self.inner.len(),
            });
        }
        self.inner[offset..offset + 2].copy_from_slice(&val.to_be_bytes());
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.inner[..]
    }

    pub fn into_inner(self) -> BytesMut {
        self.inner
    }
}
