use crate::error::SerdeErr;

/// Reads bits back out of a buffer produced by `BitWriter`.
pub struct BitReader<'b> {
    buffer: &'b [u8],
    position: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let byte_index = self.position / 8;
        let Some(byte) = self.buffer.get(byte_index) else {
            return Err(SerdeErr);
        };
        let bit = (byte >> (self.position % 8)) & 1 != 0;
        self.position += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        if self.position % 8 == 0 {
            let Some(byte) = self.buffer.get(self.position / 8) else {
                return Err(SerdeErr);
            };
            self.position += 8;
            return Ok(*byte);
        }

        let mut output: u8 = 0;
        for index in 0..8 {
            if self.read_bit()? {
                output |= 1 << index;
            }
        }
        Ok(output)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, SerdeErr> {
        if count.saturating_mul(8) > self.bits_remaining() {
            return Err(SerdeErr);
        }
        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(self.read_byte()?);
        }
        Ok(output)
    }

    /// Bits not yet consumed, including the zero fill of the last byte
    pub fn bits_remaining(&self) -> usize {
        (self.buffer.len() * 8).saturating_sub(self.position)
    }

    /// Whole bytes not yet touched by the reader
    pub fn bytes_remaining(&self) -> usize {
        self.bits_remaining() / 8
    }

    pub fn bit_position(&self) -> usize {
        self.position
    }
}
