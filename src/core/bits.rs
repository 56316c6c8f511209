//! # Bit Streams
//!
//! Hexadecimal expansion and MSB-first bit access.
//!
//! A transmission arrives as hexadecimal text. Every hex digit contributes exactly
//! four bits, most significant bit first, so `"1A"` expands to `00011010`. The
//! expanded bits are kept packed in a [`BitBuf`] together with their exact length,
//! which allows odd-length hex strings without inventing a padding nibble.
//!
//! [`BitReader`] turns runs of bits back into big-endian integers and refuses to
//! read past the end of the buffer. [`BitWriter`] is its inverse and is used by the
//! encoder.

use crate::error::{constants, DecodeError, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// Packed, MSB-first sequence of bits with an exact bit length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitBuf {
    bytes: Bytes,
    len: usize,
}

impl BitBuf {
    /// Number of bits held in the buffer
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit at `index`, or `None` past the end
    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some((self.bytes[index / 8] >> (7 - index % 8)) & 1 == 1)
    }

    /// Build a buffer from a string of `0` and `1` characters.
    pub fn from_binary_str(input: &str) -> Result<Self> {
        let mut writer = BitWriter::with_capacity(input.len());
        for (position, character) in input.chars().enumerate() {
            match character {
                '0' => writer.write_bit(false),
                '1' => writer.write_bit(true),
                _ => {
                    return Err(DecodeError::InvalidCharacter {
                        character,
                        position,
                    })
                }
            }
        }
        Ok(writer.into_bitbuf())
    }

    /// Open a reader positioned at the first bit
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(self)
    }
}

impl fmt::Display for BitBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.len {
            let digit = if self.get(index) == Some(true) { '1' } else { '0' };
            fmt::Write::write_char(f, digit)?;
        }
        Ok(())
    }
}

/// Expand hexadecimal text into bits, four per digit.
///
/// Leading and trailing whitespace is ignored. Both upper- and lowercase digits are
/// accepted; anything else yields [`DecodeError::InvalidCharacter`] carrying the
/// offending character and its index in the trimmed input.
pub fn expand_hex(input: &str) -> Result<BitBuf> {
    let input = input.trim();
    let mut bytes = BytesMut::with_capacity(input.len().div_ceil(2));
    let mut digits = 0usize;

    for (position, character) in input.chars().enumerate() {
        let nibble = character
            .to_digit(16)
            .ok_or(DecodeError::InvalidCharacter {
                character,
                position,
            })? as u8;

        if position % 2 == 0 {
            bytes.put_u8(nibble << 4);
        } else if let Some(last) = bytes.last_mut() {
            *last |= nibble;
        }
        digits += 1;
    }

    Ok(BitBuf {
        bytes: bytes.freeze(),
        len: digits * 4,
    })
}

/// Expand hexadecimal text into a string of `0`/`1` digits.
///
/// ```
/// use packet_decoder::core::bits::hex_to_bit_string;
/// assert_eq!(hex_to_bit_string("1A").unwrap(), "00011010");
/// ```
pub fn hex_to_bit_string(input: &str) -> Result<String> {
    expand_hex(input).map(|bits| bits.to_string())
}

/// Cursor over a [`BitBuf`] that reads big-endian unsigned integers.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    buf: &'a BitBuf,
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a BitBuf) -> Self {
        Self { buf, pos: 0 }
    }

    /// Index of the next bit to be read
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bits left before the end of the buffer
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// Returns `DecodeError::MalformedPacket` at the end of the stream
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        let bit = self
            .buf
            .get(self.pos)
            .ok_or_else(|| DecodeError::malformed(constants::ERR_UNEXPECTED_END))?;
        self.pos += 1;
        Ok(bit)
    }

    /// Read `count` bits as a big-endian unsigned integer.
    ///
    /// The read is all-or-nothing: on error the cursor does not move.
    ///
    /// # Errors
    /// Returns `DecodeError::MalformedPacket` if `count` exceeds 64 or the stream
    /// holds fewer than `count` bits
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(DecodeError::malformed(constants::ERR_READ_TOO_WIDE));
        }
        if count > self.remaining() {
            return Err(DecodeError::MalformedPacket(format!(
                "{}: wanted {count} bits at offset {}, {} left",
                constants::ERR_UNEXPECTED_END,
                self.pos,
                self.remaining()
            )));
        }

        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value)
    }
}

/// Append-only MSB-first bit sink.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: BytesMut,
    len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: BytesMut::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// Number of bits written so far
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.put_u8(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 1 << (7 - self.len % 8);
            }
        }
        self.len += 1;
    }

    /// Write the low `count` bits of `value`, most significant first.
    ///
    /// Higher bits of `value` are ignored; callers validate field widths.
    pub fn write_bits(&mut self, value: u64, count: usize) {
        debug_assert!(count <= 64);
        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 == 1);
        }
    }

    /// Copy every bit of `other` onto the end of this writer
    pub fn append(&mut self, other: &BitBuf) {
        for index in 0..other.len() {
            self.write_bit(other.get(index) == Some(true));
        }
    }

    pub fn into_bitbuf(self) -> BitBuf {
        BitBuf {
            bytes: self.bytes.freeze(),
            len: self.len,
        }
    }

    /// Render the written bits as uppercase hex, zero-padding the final nibble.
    pub fn to_hex(&self) -> String {
        let nibbles = self.len.div_ceil(4);
        let mut out = String::with_capacity(nibbles);
        for index in 0..nibbles {
            let byte = self.bytes[index / 2];
            let nibble = if index % 2 == 0 { byte >> 4 } else { byte & 0x0F };
            out.push(char::from_digit(u32::from(nibble), 16).map_or('0', |c| c.to_ascii_uppercase()));
        }
        out
    }
}
