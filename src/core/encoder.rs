//! # Packet Encoder
//!
//! Writes a [`Packet`] tree back into the bit layout the decoder reads.
//!
//! Operators keep the framing they were decoded with, so decoding and re-encoding
//! a transmission reproduces its packet bits exactly. Literals are always written
//! with the fewest groups that hold their value.

use crate::core::bits::{BitBuf, BitWriter};
use crate::core::decoder::{LITERAL_GROUP_BITS, TYPE_ID_BITS, VERSION_BITS};
use crate::core::packet::{LengthType, Packet, LITERAL_TYPE_ID};
use crate::error::{constants, DecodeError, Result};

/// Largest value of the 15-bit total-length field
pub const MAX_TOTAL_BITS: usize = (1 << 15) - 1;
/// Largest value of the 11-bit sub-packet count field
pub const MAX_SUB_PACKETS: usize = (1 << 11) - 1;

const CONTINUATION: u8 = 0b1_0000;

/// Split `value` into 5-bit literal groups.
///
/// Each group is a continuation flag followed by a nibble; the flag is set on every
/// group except the last. Zero encodes as a single group.
///
/// ```
/// use packet_decoder::core::encoder::encode_literal_groups;
/// assert_eq!(encode_literal_groups(2021), vec![0b10111, 0b11110, 0b00101]);
/// ```
pub fn encode_literal_groups(value: u64) -> Vec<u8> {
    let nibbles = ((64 - value.leading_zeros() as usize).div_ceil(4)).max(1);
    (0..nibbles)
        .rev()
        .map(|index| {
            let nibble = ((value >> (index * 4)) & 0xF) as u8;
            if index == 0 {
                nibble
            } else {
                nibble | CONTINUATION
            }
        })
        .collect()
}

/// Stateless packet encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketEncoder;

impl PacketEncoder {
    /// Append `packet` to `writer`, returning the number of bits written.
    ///
    /// # Errors
    /// Returns `DecodeError::MalformedPacket` if a version does not fit in 3 bits
    /// or an operator's children do not fit its length field
    pub fn encode(&self, packet: &Packet, writer: &mut BitWriter) -> Result<usize> {
        let start = writer.len();
        let version = u64::from(packet.version());
        if version >= 1 << VERSION_BITS {
            return Err(DecodeError::MalformedPacket(format!(
                "{}: version {version}",
                constants::ERR_FIELD_TOO_WIDE
            )));
        }
        writer.write_bits(version, VERSION_BITS);

        match packet {
            Packet::Literal { value, .. } => {
                writer.write_bits(u64::from(LITERAL_TYPE_ID), TYPE_ID_BITS);
                for group in encode_literal_groups(*value) {
                    writer.write_bits(u64::from(group), LITERAL_GROUP_BITS);
                }
            }
            Packet::Operator {
                operator,
                length_type,
                children,
                ..
            } => {
                writer.write_bits(u64::from(operator.type_id()), TYPE_ID_BITS);
                writer.write_bits(u64::from(length_type.id()), 1);
                match length_type {
                    LengthType::TotalBits => {
                        // Field length is only known once the children are laid out
                        let mut body = BitWriter::new();
                        for child in children {
                            self.encode(child, &mut body)?;
                        }
                        if body.len() > MAX_TOTAL_BITS {
                            return Err(DecodeError::MalformedPacket(format!(
                                "{}: {} bits",
                                constants::ERR_LENGTH_FIELD_TOO_SMALL,
                                body.len()
                            )));
                        }
                        writer.write_bits(body.len() as u64, length_type.field_width());
                        writer.append(&body.into_bitbuf());
                    }
                    LengthType::SubPacketCount => {
                        if children.len() > MAX_SUB_PACKETS {
                            return Err(DecodeError::MalformedPacket(format!(
                                "{}: {} sub-packets",
                                constants::ERR_COUNT_FIELD_TOO_SMALL,
                                children.len()
                            )));
                        }
                        writer.write_bits(children.len() as u64, length_type.field_width());
                        for child in children {
                            self.encode(child, writer)?;
                        }
                    }
                }
            }
        }

        Ok(writer.len() - start)
    }

    /// Encode `packet` into a fresh bit buffer
    pub fn encode_bits(&self, packet: &Packet) -> Result<BitBuf> {
        let mut writer = BitWriter::new();
        self.encode(packet, &mut writer)?;
        Ok(writer.into_bitbuf())
    }
}

/// Encode `packet` as uppercase hex, zero-padded to a whole nibble.
///
/// ```
/// use packet_decoder::core::encoder::encode_hex;
/// use packet_decoder::core::packet::Packet;
///
/// assert_eq!(encode_hex(&Packet::literal(6, 2021)).unwrap(), "D2FE28");
/// ```
pub fn encode_hex(packet: &Packet) -> Result<String> {
    let mut writer = BitWriter::new();
    PacketEncoder.encode(packet, &mut writer)?;
    Ok(writer.to_hex())
}
