use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use tracing::{debug, trace, warn};

use crate::core::{AssemblerConfig, Error, Result, VerifyMode, HEADER_SIZE, SYNC};
use crate::time::TimestampCodec;
use super::checksum;
use super::header::PacketHeader;
use super::packet::Packet;

/// Where the assembler is within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanState {
    /// Sliding a 3-byte window over the stream looking for the sync marker
    SeekingSync,
    /// Sync found, collecting the rest of the 16-byte header
    ReadingHeader,
    /// Header decoded, collecting `packet_size - 16` payload bytes
    ReadingPayload,
}

impl ScanState {
    /// Short description used in logs and truncation errors
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::SeekingSync => "seeking sync",
            ScanState::ReadingHeader => "reading header",
            ScanState::ReadingPayload => "reading payload",
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters kept by an assembler over its lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Bytes fed in
    pub bytes_consumed: u64,
    /// Bytes dropped while looking for a sync marker
    pub bytes_skipped: u64,
    /// Packets handed to the caller
    pub packets_emitted: u64,
    /// Frames dropped for an out-of-range size or undecodable timestamp
    pub frames_discarded: u64,
    /// Frames whose stored checksum did not match
    pub checksum_failures: u64,
}

/// Reassembles packets from a byte stream.
///
/// The assembler owns its scan buffer and is fed chunks of any size, down to
/// a single byte. Between feeds it simply holds the partial frame; waiting
/// for more input is up to whoever owns the byte source.
///
/// Malformed input never ends the stream. Lost sync is recovered one byte at
/// a time, and frames with an impossible size are dropped. In
/// [`VerifyMode::Strict`] a checksum mismatch drops the frame and is
/// reported as an `Err` for that frame only.
///
/// One assembler serves one stream; use a separate instance per connection.
#[derive(Debug)]
pub struct PacketAssembler {
    config: AssemblerConfig,
    timestamps: TimestampCodec,
    state: ScanState,
    buffer: BytesMut,
    pending: Option<PacketHeader>,
    stats: AssemblerStats,
}

impl Default for PacketAssembler {
    fn default() -> Self {
        Self::with_valid_config(AssemblerConfig::default())
    }
}

impl PacketAssembler {
    /// Creates an assembler, validating the configuration
    pub fn new(config: AssemblerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: AssemblerConfig) -> Self {
        PacketAssembler {
            timestamps: TimestampCodec::new(config.timestamp_format),
            config,
            state: ScanState::SeekingSync,
            buffer: BytesMut::with_capacity(HEADER_SIZE),
            pending: None,
            stats: AssemblerStats::default(),
        }
    }

    /// The configuration in use
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Current scan state
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Bytes held for the frame in progress
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no frame is in progress.
    ///
    /// Up to two bytes of a possible sync marker may still be buffered.
    pub fn is_idle(&self) -> bool {
        self.state == ScanState::SeekingSync
    }

    /// Lifetime counters
    pub fn stats(&self) -> &AssemblerStats {
        &self.stats
    }

    /// Drops any partial frame and starts looking for sync again
    pub fn reset(&mut self) {
        self.state = ScanState::SeekingSync;
        self.buffer.clear();
        self.pending = None;
    }

    /// Feeds a single byte
    pub fn push(&mut self, byte: u8) -> Result<Option<Packet>> {
        self.advance(&[byte]).1.transpose()
    }

    /// Feeds a chunk, returning every frame outcome it completed in order
    pub fn feed(&mut self, mut data: &[u8]) -> Vec<Result<Packet>> {
        let mut out = Vec::new();
        while !data.is_empty() {
            let (consumed, outcome) = self.advance(data);
            data = &data[consumed..];
            out.extend(outcome);
        }
        out
    }

    /// Consumes bytes from `data` until one frame outcome is produced or the
    /// data runs out.
    ///
    /// Returns how many bytes were consumed along with the outcome, if any.
    /// Bytes past a completed frame are left for the next call.
    pub fn advance(&mut self, data: &[u8]) -> (usize, Option<Result<Packet>>) {
        let mut consumed = 0;
        let mut outcome = None;

        while consumed < data.len() && outcome.is_none() {
            match self.state {
                ScanState::SeekingSync => {
                    self.buffer.put_u8(data[consumed]);
                    consumed += 1;
                    self.seek_sync();
                }
                ScanState::ReadingHeader => {
                    consumed += self.fill(&data[consumed..], HEADER_SIZE);
                    if self.buffer.len() == HEADER_SIZE {
                        outcome = self.on_header();
                    }
                }
                ScanState::ReadingPayload => {
                    let frame_len = self.expected_len();
                    consumed += self.fill(&data[consumed..], frame_len);
                    if self.buffer.len() == frame_len {
                        if let Some(header) = self.pending.take() {
                            outcome = self.emit(header);
                        }
                    }
                }
            }
        }

        self.stats.bytes_consumed += consumed as u64;
        (consumed, outcome)
    }

    /// Signals end of stream.
    ///
    /// Fails with [`Error::TruncatedFrame`] if a header or payload was only
    /// partly received. The assembler is reset either way.
    pub fn finish(&mut self) -> Result<()> {
        let result = match self.state {
            ScanState::SeekingSync => Ok(()),
            ScanState::ReadingHeader | ScanState::ReadingPayload => {
                let expected = match self.state {
                    ScanState::ReadingPayload => self.expected_len(),
                    _ => HEADER_SIZE,
                };
                debug!(
                    state = self.state.as_str(),
                    buffered = self.buffer.len(),
                    expected,
                    "Stream ended mid-frame"
                );
                Err(Error::TruncatedFrame {
                    state: self.state.as_str(),
                    buffered: self.buffer.len(),
                    expected,
                })
            }
        };
        self.reset();
        result
    }

    fn seek_sync(&mut self) {
        if self.buffer.len() < SYNC.len() {
            return;
        }
        if self.buffer[..] == SYNC {
            trace!("Sync marker found");
            self.state = ScanState::ReadingHeader;
        } else {
            trace!(byte = self.buffer[0], "Skipping byte while seeking sync");
            self.buffer.advance(1);
            self.stats.bytes_skipped += 1;
        }
    }

    // Copies up to `target - buffered` bytes, returning how many were taken
    fn fill(&mut self, data: &[u8], target: usize) -> usize {
        let take = (target - self.buffer.len()).min(data.len());
        self.buffer.extend_from_slice(&data[..take]);
        take
    }

    fn expected_len(&self) -> usize {
        self.pending
            .map(|h| h.packet_size as usize)
            .unwrap_or(HEADER_SIZE)
    }

    fn on_header(&mut self) -> Option<Result<Packet>> {
        let mut raw = [0u8; HEADER_SIZE];
        raw.copy_from_slice(&self.buffer[..HEADER_SIZE]);

        let header = match PacketHeader::parse(&raw) {
            Ok(header) => header,
            Err(e) => return self.discard(e),
        };

        if let Err(e) = header.payload_len() {
            return self.discard(e);
        }
        if header.packet_size > self.config.max_packet_size {
            return self.discard(Error::InvalidPacketSize {
                size: header.packet_size,
            });
        }

        debug!(
            message_type = header.message_type,
            packet_size = header.packet_size,
            checksum = header.checksum,
            "Decoded packet header"
        );

        if header.packet_size as usize == HEADER_SIZE {
            self.emit(header)
        } else {
            self.pending = Some(header);
            self.state = ScanState::ReadingPayload;
            None
        }
    }

    fn emit(&mut self, header: PacketHeader) -> Option<Result<Packet>> {
        let timestamp = match self.timestamps.decode(header.timestamp) {
            Ok(timestamp) => timestamp,
            Err(e) => return self.discard(e),
        };

        let frame = self.buffer.split().freeze();
        self.reset();

        let actual = checksum::compute(&frame);
        if actual != header.checksum {
            self.stats.checksum_failures += 1;
            let err = Error::ChecksumMismatch {
                expected: header.checksum,
                actual,
            };
            match self.config.verify {
                VerifyMode::Strict => {
                    warn!(error = %err, "Rejecting packet");
                    return Some(Err(err));
                }
                VerifyMode::Lenient => warn!(error = %err, "Passing packet with bad checksum"),
            }
        }

        self.stats.packets_emitted += 1;
        let payload = frame.slice(HEADER_SIZE..);
        Some(Ok(Packet::from_parts(header, timestamp, payload)))
    }

    fn discard(&mut self, reason: Error) -> Option<Result<Packet>> {
        warn!(error = %reason, buffered = self.buffer.len(), "Discarding frame");
        self.stats.frames_discarded += 1;
        self.reset();
        None
    }
}
