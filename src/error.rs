//! # Error Types
//!
//! Error handling for packet decoding and evaluation.
//!
//! This module defines every error variant that can surface while turning a
//! hexadecimal transmission into a packet tree and evaluating it.
//!
//! ## Error Categories
//! - **I/O Errors**: Input file missing or unreadable
//! - **Input Errors**: Characters outside the hexadecimal alphabet
//! - **Framing Errors**: Truncated streams, length-field overruns, excessive nesting
//! - **Evaluation Errors**: Operator arity violations, arithmetic overflow
//! - **Configuration Errors**: Invalid or unreadable configuration
//!
//! All errors implement `std::error::Error` for interoperability.
//!
//! ## Example Usage
//! ```rust
//! use packet_decoder::core::decoder::parse_packet;
//! use packet_decoder::error::DecodeError;
//!
//! match parse_packet("D2FZ28") {
//!     Err(DecodeError::InvalidCharacter { character, position }) => {
//!         assert_eq!(character, 'Z');
//!         assert_eq!(position, 3);
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Bit stream errors
    pub const ERR_UNEXPECTED_END: &str = "Unexpected end of bit stream";
    pub const ERR_READ_TOO_WIDE: &str = "Cannot read more than 64 bits into one integer";

    /// Framing errors
    pub const ERR_LITERAL_TOO_WIDE: &str = "Literal value does not fit in 64 bits";
    pub const ERR_LENGTH_OVERRUN: &str = "Sub-packets overran the declared bit length";
    pub const ERR_DEPTH_EXCEEDED: &str = "Packet nesting exceeds the configured depth limit";
    pub const ERR_LITERAL_TYPE_ID: &str = "Type ID 4 denotes a literal, not an operator";
    pub const ERR_LINE_TOO_LONG: &str = "Transmission line exceeds the maximum frame length";

    /// Encoding errors
    pub const ERR_LENGTH_FIELD_TOO_SMALL: &str = "Sub-packets do not fit in a 15-bit length field";
    pub const ERR_COUNT_FIELD_TOO_SMALL: &str = "Sub-packet count does not fit in an 11-bit field";
    pub const ERR_FIELD_TOO_WIDE: &str = "Header field does not fit in 3 bits";

    /// Evaluation errors
    pub const ERR_SUM_OVERFLOW: &str = "Sum overflowed 64 bits";
    pub const ERR_PRODUCT_OVERFLOW: &str = "Product overflowed 64 bits";
}

// DecodeError is the primary error type for all decoder operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("Invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    #[error("Invalid arity for {operator}: expected {expected} sub-packets, found {found}")]
    InvalidArity {
        operator: String,
        expected: String,
        found: usize,
    },

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Deserialize error: {0}")]
    DeserializeError(String),
}

impl DecodeError {
    /// Shorthand for a [`DecodeError::MalformedPacket`] built from a static message.
    pub(crate) fn malformed(msg: &str) -> Self {
        DecodeError::MalformedPacket(msg.to_string())
    }
}

/// Type alias for Results using DecodeError
pub type Result<T> = std::result::Result<T, DecodeError>;
