//! # Tree Dump Formats
//!
//! Serialization of decoded packet trees for inspection and interchange.
//! Supports JSON (default, human-readable), bincode and MessagePack.
//!
//! ## Features
//! - **Multiple formats**: JSON, Bincode, MessagePack with format-byte detection
//! - **Format metadata**: Optional format byte prefix for automatic detection
//! - **Human-readable option**: Pretty-printed JSON for eyeballing a tree
//!
//! ## Usage
//! ```
//! use packet_decoder::core::packet::Packet;
//! use packet_decoder::core::serialization::{MultiFormat, SerializationFormat};
//!
//! let packet = Packet::literal(6, 2021);
//! let bytes = packet.serialize_with_header(SerializationFormat::MessagePack).unwrap();
//! let (restored, format) = Packet::deserialize_with_header(&bytes).unwrap();
//! assert_eq!(restored, packet);
//! assert_eq!(format, SerializationFormat::MessagePack);
//! ```

use crate::core::packet::Packet;
use crate::error::{DecodeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported serialization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationFormat {
    /// Human-readable JSON format (default)
    #[default]
    Json,
    /// Binary compact format
    Bincode,
    /// Compact binary format (MessagePack)
    #[serde(alias = "msgpack")]
    MessagePack,
}

impl SerializationFormat {
    /// Get the format identifier byte for headered dumps
    pub fn format_byte(self) -> u8 {
        match self {
            SerializationFormat::Bincode => 0x01,
            SerializationFormat::Json => 0x02,
            SerializationFormat::MessagePack => 0x03,
        }
    }

    /// Detect format from identifier byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(SerializationFormat::Bincode),
            0x02 => Some(SerializationFormat::Json),
            0x03 => Some(SerializationFormat::MessagePack),
            _ => None,
        }
    }

    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            SerializationFormat::Bincode => "Bincode",
            SerializationFormat::Json => "JSON",
            SerializationFormat::MessagePack => "MessagePack",
        }
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SerializationFormat {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(SerializationFormat::Json),
            "bincode" => Ok(SerializationFormat::Bincode),
            "messagepack" | "msgpack" => Ok(SerializationFormat::MessagePack),
            other => Err(DecodeError::ConfigError(format!(
                "Unknown serialization format: {other}"
            ))),
        }
    }
}

/// Trait for types that support multiple serialization formats
pub trait MultiFormat: Serialize + for<'de> Deserialize<'de> + Sized {
    /// Serialize to bytes using the specified format
    fn serialize_format(&self, format: SerializationFormat) -> Result<Vec<u8>> {
        match format {
            SerializationFormat::Bincode => {
                bincode::serialize(self).map_err(|e| DecodeError::SerializeError(e.to_string()))
            }
            SerializationFormat::Json => serde_json::to_vec_pretty(self)
                .map_err(|e| DecodeError::SerializeError(e.to_string())),
            SerializationFormat::MessagePack => {
                rmp_serde::to_vec(self).map_err(|e| DecodeError::SerializeError(e.to_string()))
            }
        }
    }

    /// Serialize to bytes with format header
    fn serialize_with_header(&self, format: SerializationFormat) -> Result<Vec<u8>> {
        let mut data = vec![format.format_byte()];
        let mut payload = self.serialize_format(format)?;
        data.append(&mut payload);
        Ok(data)
    }

    /// Deserialize from bytes using the specified format
    fn deserialize_format(data: &[u8], format: SerializationFormat) -> Result<Self> {
        match format {
            SerializationFormat::Bincode => bincode::deserialize(data)
                .map_err(|e| DecodeError::DeserializeError(e.to_string())),
            SerializationFormat::Json => serde_json::from_slice(data)
                .map_err(|e| DecodeError::DeserializeError(e.to_string())),
            SerializationFormat::MessagePack => rmp_serde::from_slice(data)
                .map_err(|e| DecodeError::DeserializeError(e.to_string())),
        }
    }

    /// Deserialize from bytes with format header
    fn deserialize_with_header(data: &[u8]) -> Result<(Self, SerializationFormat)> {
        let Some((&first, payload)) = data.split_first() else {
            return Err(DecodeError::DeserializeError("Empty data".to_string()));
        };

        let format = SerializationFormat::from_byte(first).ok_or_else(|| {
            DecodeError::DeserializeError(format!("Unknown format byte: {first}"))
        })?;

        let value = Self::deserialize_format(payload, format)?;
        Ok((value, format))
    }
}

impl MultiFormat for Packet {}
impl MultiFormat for Vec<Packet> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::packet::{LengthType, Operator};

    fn sample() -> Packet {
        Packet::operator_with_framing(
            3,
            Operator::GreaterThan,
            LengthType::TotalBits,
            vec![Packet::literal(1, 7), Packet::literal(2, u64::MAX)],
        )
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_format_byte_roundtrip() {
        for format in &[
            SerializationFormat::Bincode,
            SerializationFormat::Json,
            SerializationFormat::MessagePack,
        ] {
            let byte = format.format_byte();
            let recovered = SerializationFormat::from_byte(byte).expect("valid format byte");
            assert_eq!(*format, recovered);
        }
        assert_eq!(SerializationFormat::from_byte(0xFF), None);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(SerializationFormat::Bincode.name(), "Bincode");
        assert_eq!(SerializationFormat::Json.name(), "JSON");
        assert_eq!(SerializationFormat::MessagePack.name(), "MessagePack");
    }

    #[test]
    fn test_default_format() {
        assert_eq!(SerializationFormat::default(), SerializationFormat::Json);
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_from_str_aliases() {
        assert_eq!(
            "msgpack".parse::<SerializationFormat>().expect("alias"),
            SerializationFormat::MessagePack
        );
        assert_eq!(
            "JSON".parse::<SerializationFormat>().expect("case"),
            SerializationFormat::Json
        );
        assert!("yaml".parse::<SerializationFormat>().is_err());
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_every_format_restores_tree() {
        let packet = sample();
        for format in [
            SerializationFormat::Json,
            SerializationFormat::Bincode,
            SerializationFormat::MessagePack,
        ] {
            let bytes = packet.serialize_with_header(format).expect("serialize");
            let (restored, detected) = Packet::deserialize_with_header(&bytes).expect("deserialize");
            assert_eq!(restored, packet, "{format}");
            assert_eq!(detected, format);
        }
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_json_shape() {
        let json = Packet::literal(6, 2021)
            .serialize_format(SerializationFormat::Json)
            .expect("json");
        let value: serde_json::Value = serde_json::from_slice(&json).expect("parse");
        assert_eq!(value["Literal"]["version"], 6);
        assert_eq!(value["Literal"]["value"], 2021);
    }

    #[test]
    fn test_empty_and_unknown_headers() {
        assert!(matches!(
            Packet::deserialize_with_header(&[]),
            Err(DecodeError::DeserializeError(_))
        ));
        assert!(matches!(
            Packet::deserialize_with_header(&[0x09, 0x00]),
            Err(DecodeError::DeserializeError(msg)) if msg.contains("Unknown format byte")
        ));
    }
}
