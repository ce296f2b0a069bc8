use crate::error::DecodeError;

/// A bounds-checked, big-endian cursor over a borrowed byte slice.
///
/// Every read either advances the cursor by exactly the bytes it consumed or
/// fails without moving it.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Takes the next `len` bytes as a slice.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::InsufficientBytes {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Splits off the next `len` bytes as an independent cursor.
    pub fn split(&mut self, len: usize) -> Result<Cursor<'a>, DecodeError> {
        self.take(len).map(Cursor::new)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.take(len).map(|_| ())
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Reads an unsigned integer stored in `len` big-endian bytes (`len <= 8`).
    pub fn uint(&mut self, len: usize) -> Result<u64, DecodeError> {
        debug_assert!(len <= 8);
        Ok(self
            .take(len)?
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
    }

    /// Reads a two's complement integer stored in `len` big-endian bytes and
    /// sign-extends it.
    pub fn int(&mut self, len: usize) -> Result<i64, DecodeError> {
        let raw = self.uint(len)?;
        if len == 0 {
            return Ok(0);
        }
        let shift = 64 - (len as u32) * 8;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Reads the length of a variable-length field occurrence.
    ///
    /// A one byte prefix carries lengths below 255. The value 255 announces
    /// that the real length follows as a two byte integer.
    pub fn variable_length(&mut self) -> Result<usize, DecodeError> {
        let short = *self
            .data
            .get(self.position)
            .ok_or(DecodeError::InsufficientBytes {
                needed: 1,
                remaining: 0,
            })?;
        if short < 255 {
            self.position += 1;
            return Ok(usize::from(short));
        }
        if self.remaining() < 3 {
            return Err(DecodeError::ExtendedLengthTruncated {
                remaining: self.remaining() - 1,
            });
        }
        self.position += 1;
        Ok(usize::from(self.u16()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_integers() {
        let mut cursor = Cursor::new(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);
        assert_eq!(cursor.u8(), Ok(0x01));
        assert_eq!(cursor.u16(), Ok(0x0203));
        assert_eq!(cursor.u32(), Ok(0x0405_0607));
        assert!(cursor.is_empty());
    }

    #[test]
    fn failed_read_does_not_advance() {
        let mut cursor = Cursor::new(&[0xAA, 0xBB]);
        assert_eq!(
            cursor.u32(),
            Err(DecodeError::InsufficientBytes {
                needed: 4,
                remaining: 2
            })
        );
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.u16(), Ok(0xAABB));
    }

    #[test]
    fn sign_extends_reduced_size_integers() {
        assert_eq!(Cursor::new(&[0xFF]).int(1), Ok(-1));
        assert_eq!(Cursor::new(&[0xFF, 0x38]).int(2), Ok(-200));
        assert_eq!(Cursor::new(&[0x00, 0x7F]).int(2), Ok(127));
        assert_eq!(Cursor::new(&[0x80, 0, 0, 0, 0, 0, 0, 0]).int(8), Ok(i64::MIN));
    }

    #[test]
    fn short_variable_length() {
        let mut cursor = Cursor::new(&[0x05, 0xFF]);
        assert_eq!(cursor.variable_length(), Ok(5));
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn extended_variable_length_uses_following_two_bytes() {
        let mut cursor = Cursor::new(&[0xFF, 0x01, 0x2C, 0x00]);
        assert_eq!(cursor.variable_length(), Ok(300));
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn extended_variable_length_truncated() {
        let mut cursor = Cursor::new(&[0xFF, 0x01]);
        assert_eq!(
            cursor.variable_length(),
            Err(DecodeError::ExtendedLengthTruncated { remaining: 1 })
        );
        assert_eq!(cursor.position(), 0);
    }
}
