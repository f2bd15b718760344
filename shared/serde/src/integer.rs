use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde, ConstBitLength,
};

pub type UnsignedInteger<const BITS: u8> = SerdeInteger<false, BITS>;
pub type UnsignedVariableInteger<const BITS: u8> = SerdeInteger<true, BITS>;

/// An unsigned integer written with an explicit bit width.
///
/// Fixed integers always take `BITS` bits. Variable integers are written in
/// `BITS`-sized chunks, each preceded by a continuation bit, so small values
/// stay small on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SerdeInteger<const VARIABLE: bool, const BITS: u8> {
    value: u64,
}

impl<const VARIABLE: bool, const BITS: u8> SerdeInteger<VARIABLE, BITS> {
    pub fn new<T: Into<u64>>(value: T) -> Self {
        if BITS == 0 || BITS > 64 {
            panic!("can't create an integer with {} bits", BITS);
        }
        let value = value.into();
        if !VARIABLE && (value as u128) >= (1_u128 << BITS) {
            panic!(
                "with {} bits, can't encode number greater than {}",
                BITS,
                (1_u128 << BITS) - 1
            );
        }
        Self { value }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<const VARIABLE: bool, const BITS: u8> Serde for SerdeInteger<VARIABLE, BITS> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let mut value = self.value;

        if VARIABLE {
            loop {
                let proceed = (value as u128) >= (1_u128 << BITS);
                writer.write_bit(proceed);
                for _ in 0..BITS {
                    writer.write_bit(value & 1 != 0);
                    value >>= 1;
                }
                if !proceed {
                    return;
                }
            }
        } else {
            for _ in 0..BITS {
                writer.write_bit(value & 1 != 0);
                value >>= 1;
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let mut output: u64 = 0;
        let mut shift: u32 = 0;

        if VARIABLE {
            loop {
                let proceed = reader.read_bit()?;
                for _ in 0..BITS {
                    let bit = reader.read_bit()?;
                    if bit {
                        // a set bit past 64 means the sender wrote garbage
                        if shift >= 64 {
                            return Err(SerdeErr);
                        }
                        output |= 1 << shift;
                    }
                    shift += 1;
                }
                if !proceed {
                    return Ok(Self { value: output });
                }
                if shift >= 64 {
                    return Err(SerdeErr);
                }
            }
        } else {
            for _ in 0..BITS {
                if reader.read_bit()? {
                    output |= 1 << shift;
                }
                shift += 1;
            }
            Ok(Self { value: output })
        }
    }

    fn bit_length(&self) -> u32 {
        if !VARIABLE {
            return BITS as u32;
        }

        let mut output: u32 = 0;
        let mut value = self.value as u128;
        loop {
            let proceed = value >= (1_u128 << BITS);
            output += 1 + BITS as u32;
            value >>= BITS;
            if !proceed {
                return output;
            }
        }
    }
}

impl<const BITS: u8> ConstBitLength for SerdeInteger<false, BITS> {
    fn const_bit_length() -> u32 {
        BITS as u32
    }
}
