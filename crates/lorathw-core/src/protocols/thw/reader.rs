use super::error::ThwError;
use super::layout;
use crate::protocols::common::nibble::{high_nibble, low_nibble};

pub struct ThwReader<'a> {
    payload: &'a [u8],
}

impl<'a> ThwReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), ThwError> {
        if self.payload.len() < needed {
            return Err(ThwError::PayloadTooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, ThwError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(ThwError::PayloadTooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_u32_le(&self, offset: usize) -> Result<u32, ThwError> {
        let bytes = self.read_slice(offset..offset + 4)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(word))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], ThwError> {
        self.payload
            .get(range.clone())
            .ok_or(ThwError::PayloadTooShort {
                needed: range.end,
                actual: self.payload.len(),
            })
    }

    /// 12-bit value: low nibble of `high_offset` above all of `low_offset`.
    pub fn read_u12_low_nibble_high(
        &self,
        high_offset: usize,
        low_offset: usize,
    ) -> Result<u16, ThwError> {
        let high = u16::from(low_nibble(self.read_u8(high_offset)?));
        let low = u16::from(self.read_u8(low_offset)?);
        Ok(((high << 8) | low) & layout::TEMPWIND_MASK)
    }

    /// 12-bit value: all of `high_offset` above the high nibble of `low_offset`.
    pub fn read_u12_high_nibble_low(
        &self,
        high_offset: usize,
        low_offset: usize,
    ) -> Result<u16, ThwError> {
        let high = u16::from(self.read_u8(high_offset)?);
        let low = u16::from(high_nibble(self.read_u8(low_offset)?));
        Ok(((high << 4) | low) & layout::TEMPWIND_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::ThwReader;
    use crate::protocols::thw::error::ThwError;

    #[test]
    fn read_u8_out_of_range() {
        let reader = ThwReader::new(&[1, 2]);
        assert_eq!(
            reader.read_u8(2),
            Err(ThwError::PayloadTooShort {
                needed: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn read_u12_splits_shared_byte() {
        let reader = ThwReader::new(&[0x34, 0xAB, 0xCD]);
        // 0xAB low nibble (0xB) above 0x34
        assert_eq!(reader.read_u12_low_nibble_high(1, 0).unwrap(), 0x0B34);
        // 0xCD above 0xAB high nibble (0xA)
        assert_eq!(reader.read_u12_high_nibble_low(2, 1).unwrap(), 0x0CDA);
    }

    #[test]
    fn read_u32_le_orders_bytes() {
        let reader = ThwReader::new(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(reader.read_u32_le(0).unwrap(), 0x0403_0201);
    }

    #[test]
    fn read_u32_le_truncated_reports_full_need() {
        let reader = ThwReader::new(&[0; 7]);
        assert_eq!(
            reader.read_u32_le(4),
            Err(ThwError::PayloadTooShort {
                needed: 8,
                actual: 7
            })
        );
    }
}
