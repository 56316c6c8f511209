//! # Packet Decoder
//!
//! Decoding and evaluation of hexadecimal bit-packed packet transmissions.
//!
//! A transmission is a hex string whose bits hold a tree of packets. Literal
//! packets carry integers; operator packets combine the values of their
//! sub-packets with sum, product, minimum, maximum and comparisons.
//!
//! ## Example
//! ```
//! use packet_decoder::{eval, parse_packet};
//!
//! let packet = parse_packet("9C0141080250320F1802104A08").unwrap();
//! assert_eq!(eval::version_sum(&packet), 20);
//! assert_eq!(eval::evaluate(&packet).unwrap(), 1);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod eval;
pub mod utils;

pub use crate::core::decoder::{parse_packet, Decoded, PacketDecoder};
pub use crate::core::packet::{LengthType, Operator, Packet};
pub use crate::error::{DecodeError, Result};
pub use crate::eval::{evaluate, solve, version_sum, Evaluation};
