//! Frame checksum.
//!
//! The checksum is an XOR fold of every frame byte into an 8-bit accumulator,
//! stored zero-extended in the 16-bit header field. The two checksum bytes
//! count as zero while folding, so a frame can be verified in place.
//!
//! This only catches accidental corruption. Any even number of flips in the
//! same bit column cancels out, and anyone able to modify a frame can fix the
//! checksum up trivially; it is not an integrity guarantee against tampering.

use crate::core::{CHECKSUM_OFFSET, HEADER_SIZE};

/// Computes the checksum of a complete frame.
///
/// Whatever is currently stored in the checksum field is ignored.
pub fn compute(frame: &[u8]) -> u16 {
    let fold = frame
        .iter()
        .enumerate()
        .filter(|(i, _)| !is_checksum_byte(*i))
        .fold(0u8, |acc, (_, b)| acc ^ b);
    fold as u16
}

/// Checksum stored in a frame header, `None` if the frame is too short to
/// hold one
pub fn stored(frame: &[u8]) -> Option<u16> {
    frame
        .get(CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
}

/// Returns true if the stored checksum matches the frame contents
pub fn verify(frame: &[u8]) -> bool {
    frame.len() >= HEADER_SIZE && stored(frame) == Some(compute(frame))
}

/// Writes the computed checksum into the frame's checksum field
pub(crate) fn seal(frame: &mut [u8]) -> u16 {
    let checksum = compute(frame);
    frame[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&checksum.to_be_bytes());
    checksum
}

fn is_checksum_byte(offset: usize) -> bool {
    offset == CHECKSUM_OFFSET || offset == CHECKSUM_OFFSET + 1
}
