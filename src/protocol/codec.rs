use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::core::{AssemblerConfig, Error, Result};
use super::packet::{Packet, PacketEncoder};
use super::state::PacketAssembler;

/// Stream codec framing port agent packets over any async byte source
///
/// Decoding runs the bytes through a [`PacketAssembler`], so garbage between
/// frames is skipped and sync is recovered the same way. Each decoded item is
/// the outcome of one frame: a strict checksum failure arrives as an
/// `Err` item and decoding carries on with the next frame. Only I/O errors
/// and a frame cut off by end of stream fail the stream itself.
#[derive(Debug, Default)]
pub struct PacketCodec {
    assembler: PacketAssembler,
}

impl PacketCodec {
    /// Creates a codec with the default strict, NTP-timestamp configuration
    pub fn new() -> Self {
        PacketCodec::default()
    }

    /// Creates a codec with a custom assembler configuration
    pub fn with_config(config: AssemblerConfig) -> Result<Self> {
        Ok(PacketCodec {
            assembler: PacketAssembler::new(config)?,
        })
    }

    /// The underlying assembler, for state and statistics
    pub fn assembler(&self) -> &PacketAssembler {
        &self.assembler
    }

    /// An encoder using the same timestamp format as the decoder
    pub fn encoder(&self) -> PacketEncoder {
        PacketEncoder::new(self.assembler.config().timestamp_format)
    }
}

impl Decoder for PacketCodec {
    type Item = Result<Packet>;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        while !src.is_empty() {
            let (consumed, outcome) = self.assembler.advance(&src[..]);
            src.advance(consumed);

            match outcome {
                Some(Ok(packet)) => return Ok(Some(Ok(packet))),
                Some(Err(e)) if e.is_frame_error() => return Ok(Some(Err(e))),
                Some(Err(e)) => return Err(e),
                None => {}
            }
        }

        // Everything buffered has been absorbed by the assembler
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(outcome) = self.decode(src)? {
            return Ok(Some(outcome));
        }

        debug!(stats = ?self.assembler.stats(), "Byte stream ended");
        self.assembler.finish()?;
        Ok(None)
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = Error;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<()> {
        let frame = item.to_bytes();
        dst.reserve(frame.len());
        dst.extend_from_slice(&frame);
        Ok(())
    }
}
