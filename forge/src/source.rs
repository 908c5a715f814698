//! Pull-style message sources.
//!
//! Every digest consumes its input through [`MessageSource`]: a single-pass
//! reader that hands out bytes until EOF and reports its total length when
//! it is known. Digests never rely on the length being known — the final
//! short read is what triggers padding and finalization.

use std::io::Read;

use crate::HashError;

/// A single-pass byte reader.
///
/// `read` fills as much of `dst` as it can and returns the number of bytes
/// written; `0` means EOF. Callers needing a restart create a new source.
pub trait MessageSource {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize, HashError>;

    /// Total byte length, when known up front.
    fn length(&self) -> Option<u64>;
}

/// Source over a borrowed byte slice with an internal cursor.
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceSource { data, pos: 0 }
    }
}

impl MessageSource for SliceSource<'_> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize, HashError> {
        let remaining = self.data.len() - self.pos;
        let n = remaining.min(dst.len());
        dst[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn length(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}

/// Source over an owning byte stream. The stream is released by the caller,
/// not by the digest; dropping the source drops the reader.
pub struct StreamSource<R: Read> {
    inner: R,
    length: Option<u64>,
}

impl<R: Read> StreamSource<R> {
    /// Wrap a reader of unknown length.
    pub fn new(inner: R) -> Self {
        StreamSource { inner, length: None }
    }

    /// Wrap a reader whose total length the caller knows.
    pub fn with_length(inner: R, length: u64) -> Self {
        StreamSource { inner, length: Some(length) }
    }
}

impl<R: Read> MessageSource for StreamSource<R> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize, HashError> {
        Ok(self.inner.read(dst)?)
    }

    fn length(&self) -> Option<u64> {
        self.length
    }
}

/// Read from `source` until `block` is full or EOF. Returns the number of
/// bytes placed in `block`; anything short of `block.len()` is EOF.
pub(crate) fn fill_block(
    source: &mut dyn MessageSource,
    block: &mut [u8],
) -> Result<usize, HashError> {
    let mut filled = 0;
    while filled < block.len() {
        let n = source.read(&mut block[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_reads_to_eof() {
        let mut src = SliceSource::new(b"abcdef");
        assert_eq!(src.length(), Some(6));
        let mut buf = [0u8; 4];
        assert_eq!(src.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(src.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(src.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn stream_source_length_is_declared_not_probed() {
        let src = StreamSource::new(std::io::Cursor::new(vec![1, 2, 3]));
        assert_eq!(src.length(), None);
        let src = StreamSource::with_length(std::io::Cursor::new(vec![1, 2, 3]), 3);
        assert_eq!(src.length(), Some(3));
    }

    #[test]
    fn fill_block_stitches_short_reads() {
        // A reader that trickles one byte at a time.
        struct Trickle(Vec<u8>, usize);
        impl MessageSource for Trickle {
            fn read(&mut self, dst: &mut [u8]) -> Result<usize, HashError> {
                if self.1 == self.0.len() || dst.is_empty() {
                    return Ok(0);
                }
                dst[0] = self.0[self.1];
                self.1 += 1;
                Ok(1)
            }
            fn length(&self) -> Option<u64> {
                None
            }
        }
        let mut src = Trickle((0..10).collect(), 0);
        let mut block = [0u8; 8];
        assert_eq!(fill_block(&mut src, &mut block).unwrap(), 8);
        assert_eq!(block, [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(fill_block(&mut src, &mut block).unwrap(), 2);
    }
}
