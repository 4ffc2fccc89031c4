use byteorder::{ReadBytesExt, BE};

use crate::error::decode::{DecodeCause, DecodeError};

/// A read-only view over an immutable byte buffer plus an offset into it.
///
/// Every read advances the offset by exactly the width consumed; there are
/// no partial reads. Reading past the end of the buffer is always
/// [`DecodeCause::UnexpectedEof`], never a panic.
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Cursor<'a> {
        Cursor { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn require(&self, n: usize) -> Result<(), DecodeError> {
        if self.remaining() < n {
            Err(DecodeError::new(
                DecodeCause::UnexpectedEof {
                    at: self.pos,
                    wanted: n,
                },
                "cursor ran out of bytes",
            ))
        } else {
            Ok(())
        }
    }

    pub fn read_u1(&mut self) -> Result<u8, DecodeError> {
        self.require(1)?;
        let mut slice = &self.buf[self.pos..];
        let v = slice.read_u8().expect("bounds checked above");
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u2(&mut self) -> Result<u16, DecodeError> {
        self.require(2)?;
        let mut slice = &self.buf[self.pos..];
        let v = slice.read_u16::<BE>().expect("bounds checked above");
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u4(&mut self) -> Result<u32, DecodeError> {
        self.require(4)?;
        let mut slice = &self.buf[self.pos..];
        let v = slice.read_u32::<BE>().expect("bounds checked above");
        self.pos += 4;
        Ok(v)
    }

    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.require(n)?;
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.require(n)?;
        self.pos += n;
        Ok(())
    }

    /// Moves the cursor to an absolute offset, used to resync after an
    /// attribute body over- or under-reads its declared length.
    pub fn seek_to(&mut self, pos: usize) -> Result<(), DecodeError> {
        if pos > self.buf.len() {
            return Err(DecodeError::new(
                DecodeCause::UnexpectedEof {
                    at: self.pos,
                    wanted: pos.saturating_sub(self.buf.len()),
                },
                "resync target past end of buffer",
            ));
        }
        self.pos = pos;
        Ok(())
    }
}
