//! # Packet Decoder
//!
//! Recursive-descent parser from a bit stream to a [`Packet`] tree.
//!
//! Each call consumes exactly one packet (and its sub-packets) from the reader and
//! reports how many bits that took. Whatever follows the outermost packet, normally
//! zero padding up to a nibble boundary, is left unread.
//!
//! ## Limits
//! - Nesting deeper than [`DecodeSettings::max_depth`] is rejected
//! - A sub-packet that runs past its parent's declared bit length is rejected
//!   while [`DecodeSettings::strict_length`] is set
//! - Literals wider than 64 bits are rejected

use crate::config::DecodeSettings;
use crate::core::bits::{expand_hex, BitReader};
use crate::core::packet::{LengthType, Operator, Packet, LITERAL_TYPE_ID};
use crate::error::{constants, DecodeError, Result};
use crate::utils::metrics::Metrics;
use tracing::{debug, trace, warn};

/// Width of the version field
pub const VERSION_BITS: usize = 3;
/// Width of the type ID field
pub const TYPE_ID_BITS: usize = 3;
/// Width of one literal group: continuation flag plus a nibble
pub const LITERAL_GROUP_BITS: usize = 5;

/// A packet together with the number of bits it occupied on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub packet: Packet,
    pub bits_consumed: usize,
}

/// Stateless decoder carrying its limits and an optional metrics sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketDecoder<'m> {
    settings: DecodeSettings,
    metrics: Option<&'m Metrics>,
}

impl<'m> PacketDecoder<'m> {
    pub fn new(settings: DecodeSettings) -> Self {
        Self {
            settings,
            metrics: None,
        }
    }

    /// Record decode activity into `metrics`
    pub fn with_metrics(mut self, metrics: &'m Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Decode one packet starting at the reader's current position.
    ///
    /// On success the reader sits on the first bit after the packet.
    ///
    /// # Errors
    /// Returns `DecodeError::MalformedPacket` for truncated streams, length-field
    /// overruns, over-wide literals or excessive nesting
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<Decoded> {
        let start = reader.position();
        match self.decode_packet(reader, 1) {
            Ok(packet) => {
                let bits_consumed = reader.position() - start;
                debug!(
                    bits_consumed,
                    trailing_bits = reader.remaining(),
                    packets = packet.packet_count(),
                    "Decoded transmission"
                );
                if let Some(metrics) = self.metrics {
                    let total = packet.packet_count();
                    let literals = literal_count(&packet);
                    metrics.packets_decoded(literals, total - literals);
                    metrics.transmission_decoded(bits_consumed, reader.remaining());
                }
                Ok(Decoded {
                    packet,
                    bits_consumed,
                })
            }
            Err(e) => {
                debug!(error = %e, offset = reader.position(), "Decode failed");
                self.record_error();
                Err(e)
            }
        }
    }

    /// Expand hexadecimal text and decode the outermost packet.
    pub fn decode_hex(&self, hex: &str) -> Result<Decoded> {
        let bits = expand_hex(hex).inspect_err(|_| self.record_error())?;
        let mut reader = bits.reader();
        self.decode(&mut reader)
    }

    fn record_error(&self) {
        if let Some(metrics) = self.metrics {
            metrics.decode_error();
        }
    }

    fn decode_packet(&self, reader: &mut BitReader<'_>, depth: usize) -> Result<Packet> {
        if depth > self.settings.max_depth {
            return Err(DecodeError::MalformedPacket(format!(
                "{}: {depth} > {}",
                constants::ERR_DEPTH_EXCEEDED,
                self.settings.max_depth
            )));
        }

        let start = reader.position();
        let version = reader.read_bits(VERSION_BITS)? as u8;
        let type_id = reader.read_bits(TYPE_ID_BITS)? as u8;

        let packet = if type_id == LITERAL_TYPE_ID {
            Packet::Literal {
                version,
                value: read_literal(reader)?,
            }
        } else {
            let operator = Operator::try_from(type_id)?;
            let length_type = LengthType::from_bit(reader.read_bit()?);
            let field = reader.read_bits(length_type.field_width())? as usize;
            let children = match length_type {
                LengthType::TotalBits => self.decode_by_length(reader, field, depth)?,
                LengthType::SubPacketCount => self.decode_by_count(reader, field, depth)?,
            };
            Packet::Operator {
                version,
                operator,
                length_type,
                children,
            }
        };

        trace!(
            version,
            type_id,
            depth,
            offset = start,
            bits = reader.position() - start,
            "Decoded packet"
        );
        Ok(packet)
    }

    fn decode_by_length(
        &self,
        reader: &mut BitReader<'_>,
        total_bits: usize,
        depth: usize,
    ) -> Result<Vec<Packet>> {
        if total_bits > reader.remaining() {
            return Err(DecodeError::MalformedPacket(format!(
                "Declared sub-packet length {total_bits} exceeds the {} bits left",
                reader.remaining()
            )));
        }

        let end = reader.position() + total_bits;
        let mut children = Vec::new();
        while reader.position() < end {
            children.push(self.decode_packet(reader, depth + 1)?);
        }

        let overrun = reader.position() - end;
        if overrun > 0 {
            if self.settings.strict_length {
                return Err(DecodeError::MalformedPacket(format!(
                    "{} by {overrun} bits",
                    constants::ERR_LENGTH_OVERRUN
                )));
            }
            warn!(
                declared = total_bits,
                overrun, "Sub-packets overran declared length"
            );
        }
        Ok(children)
    }

    fn decode_by_count(
        &self,
        reader: &mut BitReader<'_>,
        count: usize,
        depth: usize,
    ) -> Result<Vec<Packet>> {
        let mut children = Vec::with_capacity(count);
        for _ in 0..count {
            children.push(self.decode_packet(reader, depth + 1)?);
        }
        Ok(children)
    }
}

/// Read 5-bit literal groups until one has a clear continuation flag and join
/// their nibbles into one big-endian value.
fn literal_count(packet: &Packet) -> usize {
    if packet.is_literal() {
        1
    } else {
        packet.children().iter().map(literal_count).sum()
    }
}

fn read_literal(reader: &mut BitReader<'_>) -> Result<u64> {
    let mut value = 0u64;
    loop {
        let more = reader.read_bit()?;
        let nibble = reader.read_bits(LITERAL_GROUP_BITS - 1)?;
        if value > u64::MAX >> 4 {
            return Err(DecodeError::malformed(constants::ERR_LITERAL_TOO_WIDE));
        }
        value = (value << 4) | nibble;
        if !more {
            return Ok(value);
        }
    }
}

/// Decode the outermost packet of a hexadecimal transmission with default limits.
///
/// ```
/// use packet_decoder::core::decoder::parse_packet;
///
/// let packet = parse_packet("D2FE28").unwrap();
/// assert_eq!(packet.version(), 6);
/// assert_eq!(packet.literal_value(), Some(2021));
/// ```
pub fn parse_packet(hex: &str) -> Result<Packet> {
    PacketDecoder::default()
        .decode_hex(hex)
        .map(|decoded| decoded.packet)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::core::bits::BitBuf;

    fn decode(hex: &str) -> Decoded {
        PacketDecoder::default().decode_hex(hex).expect("decode")
    }

    #[test]
    fn test_literal_packet() {
        let decoded = decode("D2FE28");
        assert_eq!(decoded.packet, Packet::literal(6, 2021));
        assert_eq!(decoded.bits_consumed, 21);
    }

    #[test]
    fn test_operator_total_bits() {
        let decoded = decode("38006F45291200");
        let packet = decoded.packet;
        assert_eq!(packet.version(), 1);
        assert_eq!(packet.type_id(), 6);
        assert_eq!(packet.length_type(), Some(LengthType::TotalBits));
        let values: Vec<_> = packet
            .children()
            .iter()
            .map(|c| c.literal_value().unwrap())
            .collect();
        assert_eq!(values, vec![10, 20]);
        // header 6 + I 1 + length 15 + 27 bits of sub-packets
        assert_eq!(decoded.bits_consumed, 49);
    }

    #[test]
    fn test_operator_sub_packet_count() {
        let decoded = decode("EE00D40C823060");
        let packet = decoded.packet;
        assert_eq!(packet.version(), 7);
        assert_eq!(packet.type_id(), 3);
        assert_eq!(packet.length_type(), Some(LengthType::SubPacketCount));
        let values: Vec<_> = packet
            .children()
            .iter()
            .map(|c| c.literal_value().unwrap())
            .collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(decoded.bits_consumed, 51);
    }

    #[test]
    fn test_truncated_literal() {
        // version 6, type 4, then a group announcing more groups that never arrive
        let bits = BitBuf::from_binary_str("11010010111").unwrap();
        let err = PacketDecoder::default()
            .decode(&mut bits.reader())
            .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPacket(_)));
    }

    #[test]
    fn test_length_field_beyond_stream() {
        // operator, I=0, declares 100 bits of sub-packets with none present
        let bits = BitBuf::from_binary_str("0010000000000001100100").unwrap();
        let err = PacketDecoder::default()
            .decode(&mut bits.reader())
            .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPacket(msg) if msg.contains("exceeds")));
    }

    fn overrunning_stream() -> BitBuf {
        // sum packet, I=0, declares 10 bits; the single literal child takes 11
        let mut s = String::from("000000");
        s.push('0');
        s.push_str(&format!("{:015b}", 10));
        s.push_str("00110000001");
        BitBuf::from_binary_str(&s).unwrap()
    }

    #[test]
    fn test_length_overrun_rejected_when_strict() {
        let bits = overrunning_stream();
        let err = PacketDecoder::default()
            .decode(&mut bits.reader())
            .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPacket(msg) if msg.contains("overran")));
    }

    #[test]
    fn test_length_overrun_tolerated_when_lenient() {
        let bits = overrunning_stream();
        let decoder = PacketDecoder::new(DecodeSettings {
            strict_length: false,
            ..DecodeSettings::default()
        });
        let decoded = decoder.decode(&mut bits.reader()).unwrap();
        assert_eq!(decoded.packet.children(), &[Packet::literal(1, 1)]);
        assert_eq!(decoded.bits_consumed, 33);
    }

    #[test]
    fn test_depth_limit() {
        // two nested count-framed operators around a literal: depth 3
        let mut s = String::new();
        for _ in 0..2 {
            s.push_str("000000");
            s.push('1');
            s.push_str(&format!("{:011b}", 1));
        }
        s.push_str("00010000101");
        let bits = BitBuf::from_binary_str(&s).unwrap();

        let shallow = PacketDecoder::new(DecodeSettings {
            max_depth: 2,
            ..DecodeSettings::default()
        });
        let err = shallow.decode(&mut bits.reader()).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPacket(msg) if msg.contains("depth")));

        let deep_enough = PacketDecoder::new(DecodeSettings {
            max_depth: 3,
            ..DecodeSettings::default()
        });
        let decoded = deep_enough.decode(&mut bits.reader()).unwrap();
        assert_eq!(decoded.packet.depth(), 3);
    }

    #[test]
    fn test_literal_wider_than_64_bits() {
        // 17 nibbles of 0xF
        let mut s = String::from("000100");
        for _ in 0..16 {
            s.push_str("11111");
        }
        s.push_str("01111");
        let bits = BitBuf::from_binary_str(&s).unwrap();
        let err = PacketDecoder::default()
            .decode(&mut bits.reader())
            .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPacket(msg) if msg.contains("64 bits")));
    }

    #[test]
    fn test_literal_exactly_64_bits() {
        let mut s = String::from("000100");
        for _ in 0..15 {
            s.push_str("11111");
        }
        s.push_str("01111");
        let bits = BitBuf::from_binary_str(&s).unwrap();
        let decoded = PacketDecoder::default().decode(&mut bits.reader()).unwrap();
        assert_eq!(decoded.packet.literal_value(), Some(u64::MAX));
    }

    #[test]
    fn test_invalid_character() {
        assert!(matches!(
            parse_packet("D2FE2X"),
            Err(DecodeError::InvalidCharacter {
                character: 'X',
                position: 5
            })
        ));
    }

    #[test]
    fn test_metrics_recorded() {
        let metrics = Metrics::new();
        let decoder = PacketDecoder::default().with_metrics(&metrics);
        decoder.decode_hex("EE00D40C823060").unwrap();
        let _ = decoder.decode_hex("ZZ");

        let snap = metrics.snapshot();
        assert_eq!(snap.transmissions_total, 1);
        assert_eq!(snap.packets_total, 4);
        assert_eq!(snap.literal_packets, 3);
        assert_eq!(snap.operator_packets, 1);
        assert_eq!(snap.bits_consumed, 51);
        assert_eq!(snap.padding_bits, 5);
        assert_eq!(snap.decode_errors, 1);
    }

    #[test]
    fn test_rejected_transmission_adds_no_packets() {
        let metrics = Metrics::new();
        let decoder = PacketDecoder::default().with_metrics(&metrics);
        // count-framed sum announcing three children, only two present
        let hex = "C200B40A82";
        let mut bits = expand_hex(hex).unwrap().to_string();
        bits.replace_range(7..18, &format!("{:011b}", 3));
        bits.truncate(7 + 11 + 22);
        let truncated = BitBuf::from_binary_str(&bits).unwrap();
        assert!(decoder.decode(&mut truncated.reader()).is_err());

        let snap = metrics.snapshot();
        assert_eq!(snap.decode_errors, 1);
        assert_eq!(snap.packets_total, 0);
        assert_eq!(snap.literal_packets, 0);
        assert_eq!(snap.operator_packets, 0);
    }
}
