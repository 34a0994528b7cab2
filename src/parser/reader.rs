use crate::AppSW;

/// Bounds-checked cursor over a byte buffer.
///
/// Every read that would run past the end fails with [`AppSW::ParseError`] and leaves the
/// cursor where it was.
pub struct Reader<'a> {
    data: &'a [u8],
    ix: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, ix: 0 }
    }

    pub fn position(&self) -> usize {
        self.ix
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.ix
    }

    pub fn is_empty(&self) -> bool {
        self.ix == self.data.len()
    }

    pub fn byte(&mut self) -> Result<u8, AppSW> {
        let b = *self.data.get(self.ix).ok_or(AppSW::ParseError)?;
        self.ix += 1;
        Ok(b)
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], AppSW> {
        let end = self.ix.checked_add(n).ok_or(AppSW::ParseError)?;
        let slice = self.data.get(self.ix..end).ok_or(AppSW::ParseError)?;
        self.ix = end;
        Ok(slice)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], AppSW> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u16_be(&mut self) -> Result<u16, AppSW> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub fn u32_be(&mut self) -> Result<u32, AppSW> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub fn i32_be(&mut self) -> Result<i32, AppSW> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    /// Unsigned base-128 integer, least significant group first.
    ///
    /// Accumulation is not bounded: bits shifted past 64 are dropped.
    pub fn z(&mut self) -> Result<u64, AppSW> {
        let mut acc: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let b = self.byte()?;
            if shift < 64 {
                acc |= u64::from(b & 0x7F) << shift;
            }
            shift = shift.saturating_add(7);
            if b & 0x80 == 0 {
                return Ok(acc);
            }
        }
    }

    /// Fails unless every byte has been consumed.
    pub fn finish(&self) -> Result<(), AppSW> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppSW::ParseError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_bounds_checked() {
        let mut r = Reader::new(&[1, 2, 3]);
        assert_eq!(r.byte(), Ok(1));
        assert_eq!(r.take(3), Err(AppSW::ParseError));
        assert_eq!(r.position(), 1);
        assert_eq!(r.u16_be(), Ok(0x0203));
        assert_eq!(r.byte(), Err(AppSW::ParseError));
        assert!(r.finish().is_ok());
    }

    #[test]
    fn test_z_decoding() {
        assert_eq!(Reader::new(&[0x00]).z(), Ok(0));
        assert_eq!(Reader::new(&[0x7F]).z(), Ok(127));
        assert_eq!(Reader::new(&[0x80, 0x01]).z(), Ok(128));
        assert_eq!(Reader::new(&[0xE5, 0x8E, 0x26]).z(), Ok(624_485));
        assert_eq!(Reader::new(&[0x80]).z(), Err(AppSW::ParseError));
    }

    #[test]
    fn test_z_wraps_past_64_bits() {
        let mut bytes = [0xFFu8; 10];
        bytes[9] = 0x7F;
        assert_eq!(Reader::new(&bytes).z(), Ok(u64::MAX));

        let mut long = [0x80u8; 12];
        long[11] = 0x01;
        assert_eq!(Reader::new(&long).z(), Ok(0));
    }
}
