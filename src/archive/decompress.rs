//! Back-reference (LZSS-style) decoder used for compressed entries.
//!
//! The stream is a sequence of groups. Each group starts with a control byte
//! whose bits, least significant first, select the next eight operations:
//!
//! - bit set: literal, one byte copied through to the output
//! - bit clear: back-reference, two bytes `lo, hi` naming a 12-bit position
//!   `((hi & 0xF0) << 4) | lo` in the history window and a length
//!   `(hi & 0x0F) + 3`
//!
//! Every output byte is also written into a 4096-byte circular history window.
//! There is no end marker; decoding stops when the input runs out, including
//! in the middle of a group or a back-reference.

use crate::error::{BnkError, Result};

/// Size of the circular history window
pub const WINDOW_SIZE: usize = 4096;

/// Write cursor position at the start of every stream
pub const INITIAL_CURSOR: usize = 0xFEE;

/// Shortest back-reference run
pub const MIN_MATCH: usize = 3;

const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// Upper bound on output bytes per input byte: 17 bytes of control plus
/// eight references decode to at most 144 bytes
const MAX_EXPANSION: usize = 9;

/// Stateful decoder over a zero-filled history window
pub struct BackReferenceDecoder {
    window: [u8; WINDOW_SIZE],
    cursor: usize,
}

impl BackReferenceDecoder {
    pub fn new() -> Self {
        Self {
            window: [0u8; WINDOW_SIZE],
            cursor: INITIAL_CURSOR,
        }
    }

    /// Decode `input` until it is exhausted
    ///
    /// `size_hint` only pre-sizes the output and is capped by what `input`
    /// could possibly expand to.
    pub fn decode(&mut self, input: &[u8], size_hint: usize) -> Vec<u8> {
        let capacity = size_hint.min(input.len().saturating_mul(MAX_EXPANSION));
        let mut output = Vec::with_capacity(capacity);
        let mut pos = 0;

        'groups: while pos < input.len() {
            let control = input[pos];
            pos += 1;

            for bit in 0..8 {
                if control & (1 << bit) != 0 {
                    let Some(&byte) = input.get(pos) else {
                        break 'groups;
                    };
                    pos += 1;
                    self.emit(byte, &mut output);
                } else {
                    let (Some(&lo), Some(&hi)) = (input.get(pos), input.get(pos + 1)) else {
                        break 'groups;
                    };
                    pos += 2;

                    let offset = (((hi & 0xF0) as usize) << 4) | lo as usize;
                    let length = (hi & 0x0F) as usize + MIN_MATCH;
                    for i in 0..length {
                        // Source may overlap bytes written by this same run
                        let byte = self.window[(offset + i) & WINDOW_MASK];
                        self.emit(byte, &mut output);
                    }
                }
            }
        }

        output
    }

    fn emit(&mut self, byte: u8, output: &mut Vec<u8>) {
        output.push(byte);
        self.window[self.cursor] = byte;
        self.cursor = (self.cursor + 1) & WINDOW_MASK;
    }
}

impl Default for BackReferenceDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a complete stream and check it against the declared size
///
/// The whole stream is decoded before the length check, so a mismatch
/// discards the decoded buffer.
pub fn decompress(input: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let output = BackReferenceDecoder::new().decode(input, expected_size);

    if output.len() != expected_size {
        return Err(BnkError::Integrity {
            expected: expected_size,
            actual: output.len(),
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_literal_group() {
        let input = [0xFF, b'W', b'i', b'l', b'd', b'f', b'i', b'r', b'e'];
        assert_eq!(decompress(&input, 8).unwrap(), b"Wildfire");
    }

    #[test]
    fn test_reference_into_unwritten_window_yields_zeros() {
        // Control 0: first op is a back-reference to position 0, length 3
        let input = [0x00, 0x00, 0x00];
        assert_eq!(decompress(&input, 3).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_longest_reference() {
        // hi low nibble 0xF gives the maximum run of 18
        let input = [0x00, 0x00, 0x0F];
        assert_eq!(decompress(&input, 18).unwrap(), vec![0u8; 18]);
    }

    #[test]
    fn test_self_overlapping_run() {
        // Literal 'A' lands at 0xFEE, then copy 6 bytes starting at 0xFEE
        // while the copy itself keeps extending the source.
        let input = [0b0000_0001, b'A', 0xEE, 0xF3];
        assert_eq!(decompress(&input, 7).unwrap(), b"AAAAAAA");
    }

    #[test]
    fn test_reference_repeats_earlier_literals() {
        // "abc" at 0xFEE..0xFF1, then copy 3 from 0xFEE
        let input = [0b0000_0111, b'a', b'b', b'c', 0xEE, 0xF0];
        assert_eq!(decompress(&input, 6).unwrap(), b"abcabc");
    }

    #[test]
    fn test_window_wraps() {
        // 20 literals starting at 0xFEE wrap past 0xFFF to the start of the window
        let mut input = Vec::new();
        let mut literals = Vec::new();
        for group in 0..3u8 {
            input.push(0xFF);
            for i in 0..8u8 {
                let byte = group * 8 + i + 1;
                input.push(byte);
                literals.push(byte);
            }
        }
        // Position 0 now holds the 19th literal (0xFEE + 18 == 0x1000)
        input.push(0x00);
        input.extend_from_slice(&[0x00, 0x00]);

        let output = decompress(&input, 27).unwrap();
        assert_eq!(&output[..24], &literals[..]);
        assert_eq!(&output[24..], &literals[18..21]);
    }

    #[test]
    fn test_truncated_input_stops_cleanly() {
        // Literal bit set but no payload byte
        assert_eq!(BackReferenceDecoder::new().decode(&[0xFF], 0), Vec::<u8>::new());
        // Back-reference missing its high byte
        assert_eq!(
            BackReferenceDecoder::new().decode(&[0b0000_0001, b'x', 0x10], 1),
            b"x"
        );
        assert!(BackReferenceDecoder::new().decode(&[], 0).is_empty());
    }

    #[test]
    fn test_size_mismatch_is_integrity_error() {
        let input = [0xFF, 1, 2, 3];
        match decompress(&input, 4) {
            Err(BnkError::Integrity { expected, actual }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("Expected Integrity error, got: {:?}", other),
        }
    }

    #[test]
    fn test_size_hint_capped_by_input() {
        let output = BackReferenceDecoder::new().decode(&[0xFF, 1], 1 << 30);
        assert_eq!(output, vec![1]);
        assert!(output.capacity() < 1024);

        // Densest stream: eight maximal references per 17 bytes
        let mut input = vec![0x00];
        input.extend_from_slice(&[0x00, 0x0F].repeat(8));
        let output = BackReferenceDecoder::new().decode(&input, usize::MAX);
        assert_eq!(output.len(), 144);
        assert!(output.len() <= input.len() * MAX_EXPANSION);
    }

    #[test]
    fn test_huge_declared_size_is_integrity_error() {
        match decompress(&[0xFF, 1], 1 << 30) {
            Err(BnkError::Integrity { expected, actual }) => {
                assert_eq!(expected, 1 << 30);
                assert_eq!(actual, 1);
            }
            other => panic!("Expected Integrity error, got: {:?}", other),
        }
    }
}
