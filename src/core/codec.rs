//! # Transmission Codec
//!
//! Frames newline-separated hexadecimal transmissions out of a byte buffer.
//!
//! Implements the tokio-util [`Decoder`]/[`Encoder`] traits so it can sit behind a
//! `FramedRead` on any byte stream, but it needs no runtime and is driven directly
//! over a [`BytesMut`] by the command-line tool.
//!
//! ## Framing
//! ```text
//! [hex digits] ['\r'?] ['\n']
//! ```
//! Blank lines are skipped. An unterminated final line is decoded at end of input.

use crate::config::DecodeSettings;
use crate::core::decoder::{Decoded, PacketDecoder};
use crate::core::encoder::encode_hex;
use crate::core::packet::Packet;
use crate::error::{constants, DecodeError, Result};
use crate::utils::metrics::Metrics;
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// Longest accepted line, terminator excluded (1 MiB)
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// One decoded line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    /// 1-based line number the transmission came from
    pub line: usize,
    pub decoded: Decoded,
}

/// Codec turning hex lines into decoded packet trees and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransmissionCodec<'m> {
    decoder: PacketDecoder<'m>,
    line: usize,
}

impl<'m> TransmissionCodec<'m> {
    pub fn new(settings: DecodeSettings) -> Self {
        Self {
            decoder: PacketDecoder::new(settings),
            line: 0,
        }
    }

    /// Record decode activity into `metrics`
    pub fn with_metrics(mut self, metrics: &'m Metrics) -> Self {
        self.decoder = self.decoder.with_metrics(metrics);
        self
    }

    /// Line number of the most recently framed line (0 before any input)
    pub fn current_line(&self) -> usize {
        self.line
    }

    fn decode_line(&mut self, raw: &[u8]) -> Result<Option<Transmission>> {
        self.line += 1;
        let text = String::from_utf8_lossy(raw);
        let text = text.trim();
        if text.is_empty() {
            trace!(line = self.line, "Skipping blank line");
            return Ok(None);
        }

        let decoded = self.decoder.decode_hex(text)?;
        Ok(Some(Transmission {
            line: self.line,
            decoded,
        }))
    }
}

impl Decoder for TransmissionCodec<'_> {
    type Item = Transmission;
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            let Some(newline) = src.iter().position(|&b| b == b'\n') else {
                if src.len() > MAX_LINE_LENGTH {
                    return Err(DecodeError::MalformedPacket(format!(
                        "{}: {} bytes without a newline",
                        constants::ERR_LINE_TOO_LONG,
                        src.len()
                    )));
                }
                return Ok(None);
            };

            if newline > MAX_LINE_LENGTH {
                return Err(DecodeError::malformed(constants::ERR_LINE_TOO_LONG));
            }

            let line = src.split_to(newline);
            src.advance(1);
            if let Some(transmission) = self.decode_line(&line)? {
                return Ok(Some(transmission));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(transmission) = self.decode(src)? {
            return Ok(Some(transmission));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let line = src.split();
        self.decode_line(&line)
    }
}

impl Encoder<&Packet> for TransmissionCodec<'_> {
    type Error = DecodeError;

    fn encode(&mut self, packet: &Packet, dst: &mut BytesMut) -> Result<()> {
        let hex = encode_hex(packet)?;
        dst.reserve(hex.len() + 1);
        dst.put_slice(hex.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
