//! # Core Decoding Components
//!
//! Bit-level access, the packet tree, and conversion between the two.
//!
//! ## Components
//! - **Bits**: Hex expansion, bit reader and writer
//! - **Packet**: Literal/operator packet tree
//! - **Decoder**: Recursive-descent parser from bits to packets
//! - **Encoder**: Packets back to bits and hex
//! - **Codec**: Newline-framed transmissions over byte buffers
//! - **Serialization**: JSON, bincode and MessagePack tree dumps
//!
//! ## Wire Format
//! ```text
//! [Version(3)] [TypeID(3)] [Literal groups | LengthTypeID(1) Length(15|11) Sub-packets]
//! ```
//!
//! ## Safety
//! - Every read is bounds-checked; truncated input is an error, never a panic
//! - Nesting depth is limited before recursing

pub mod bits;
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod packet;
pub mod serialization;
