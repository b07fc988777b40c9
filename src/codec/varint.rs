use crate::core::error::{Error, ErrorKind, Result};

/// Nibble that terminates the digit stream.
pub const TERM_NIBBLE: u8 = 0xA;
/// Nibble padding the final byte when the terminator lands in the high half.
pub const PAD_NIBBLE: u8 = 0xB;

/// Opens a meta-id list inside a file-occurrence datum.
pub const META_OPEN: u8 = 0xE0;
/// Closes a meta-id list.
pub const META_CLOSE: u8 = 0xE1;
/// Ends the file-occurrence data of one word entry.
pub const ENTRY_END: u8 = 0xFF;

/// Digit-packed variable-length integer codec.
///
/// An integer is its decimal digits, most significant first, packed two
/// nibbles per byte, followed by a terminator nibble. An odd digit count
/// puts the terminator in the low half of the last byte; an even count
/// overflows it into a fresh byte padded with `PAD_NIBBLE`, so the decoder
/// can read the digit-count parity straight off the terminator pattern.
///
/// Every byte of an encoded integer has a low nibble <= 9 except the final
/// one, whose low nibble is `TERM_NIBBLE` or `PAD_NIBBLE`. No encoded byte
/// can equal `META_OPEN`, `META_CLOSE`, or `ENTRY_END`, so a linear scanner
/// can skip over integers without any table lookups.
pub struct Bcd;

impl Bcd {
    /// Append the encoding of `value` to `output`.
    pub fn encode(output: &mut Vec<u8>, value: u32) {
        let mut digits = [0u8; 10];
        let mut n = 0;
        let mut v = value;
        loop {
            digits[n] = (v % 10) as u8;
            n += 1;
            v /= 10;
            if v == 0 {
                break;
            }
        }

        // Digits were produced least significant first.
        let mut nibbles = [0u8; 12];
        for (i, d) in digits[..n].iter().rev().enumerate() {
            nibbles[i] = *d;
        }
        nibbles[n] = TERM_NIBBLE;
        let mut total = n + 1;
        if total % 2 != 0 {
            nibbles[total] = PAD_NIBBLE;
            total += 1;
        }

        for pair in nibbles[..total].chunks(2) {
            output.push((pair[0] << 4) | pair[1]);
        }
    }

    /// Decode one integer, returning `(value, bytes_consumed, digit_count)`.
    pub fn decode(input: &[u8]) -> Result<(u32, usize, usize)> {
        let mut value: u64 = 0;
        let mut digits = 0usize;
        let mut consumed = 0usize;

        for &byte in input {
            consumed += 1;
            let hi = byte >> 4;
            let lo = byte & 0x0F;

            if hi == TERM_NIBBLE {
                if lo != PAD_NIBBLE {
                    return Err(Error::new(
                        ErrorKind::Corrupt,
                        format!("bad varint padding nibble {lo:#x}"),
                    ));
                }
                return Self::finish(value, consumed, digits);
            }
            if hi > 9 {
                return Err(Error::new(
                    ErrorKind::Corrupt,
                    format!("bad varint digit nibble {hi:#x}"),
                ));
            }
            value = value * 10 + hi as u64;
            digits += 1;

            if lo == TERM_NIBBLE {
                return Self::finish(value, consumed, digits);
            }
            if lo > 9 {
                return Err(Error::new(
                    ErrorKind::Corrupt,
                    format!("bad varint digit nibble {lo:#x}"),
                ));
            }
            value = value * 10 + lo as u64;
            digits += 1;

            if value > u32::MAX as u64 {
                return Err(Error::new(ErrorKind::Corrupt, "varint overflow".to_string()));
            }
        }

        Err(Error::new(ErrorKind::Corrupt, "incomplete varint".to_string()))
    }

    fn finish(value: u64, consumed: usize, digits: usize) -> Result<(u32, usize, usize)> {
        if digits == 0 {
            return Err(Error::new(ErrorKind::Corrupt, "empty varint".to_string()));
        }
        if value > u32::MAX as u64 {
            return Err(Error::new(ErrorKind::Corrupt, "varint overflow".to_string()));
        }
        Ok((value as u32, consumed, digits))
    }

    /// Length in bytes of the encoded integer starting at `input[0]`,
    /// without decoding its value.
    pub fn skip(input: &[u8]) -> Result<usize> {
        for (i, &byte) in input.iter().enumerate() {
            if byte & 0x0F >= TERM_NIBBLE {
                return Ok(i + 1);
            }
        }
        Err(Error::new(ErrorKind::Corrupt, "incomplete varint".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: u32) -> (u32, usize, usize) {
        let mut buf = Vec::new();
        Bcd::encode(&mut buf, value);
        let (back, consumed, digits) = Bcd::decode(&buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(Bcd::skip(&buf).unwrap(), buf.len());
        (back, consumed, digits)
    }

    #[test]
    fn round_trips_small_and_large_values() {
        for value in (0..=10_000u32).chain([99_999, 100_000, 123_456_789, u32::MAX]) {
            let (back, _, _) = round_trip(value);
            assert_eq!(back, value);
        }
    }

    #[test]
    fn terminator_encodes_digit_parity() {
        // One digit (odd): digit and terminator share the single byte.
        let mut buf = Vec::new();
        Bcd::encode(&mut buf, 7);
        assert_eq!(buf, vec![0x7A]);
        let (_, _, digits) = Bcd::decode(&buf).unwrap();
        assert_eq!(digits, 1);

        // Two digits (even): terminator overflows into a padded byte.
        buf.clear();
        Bcd::encode(&mut buf, 42);
        assert_eq!(buf, vec![0x42, 0xAB]);
        let (_, _, digits) = Bcd::decode(&buf).unwrap();
        assert_eq!(digits, 2);
    }

    #[test]
    fn encoded_bytes_never_collide_with_markers() {
        for value in [0u32, 9, 10, 99, 12_345, u32::MAX] {
            let mut buf = Vec::new();
            Bcd::encode(&mut buf, value);
            for &b in &buf {
                assert!(b != META_OPEN && b != META_CLOSE && b != ENTRY_END);
                assert!(b < 0xC0, "{b:#x} escapes the varint byte range");
            }
            // Only the final byte may carry a terminal low nibble.
            for &b in &buf[..buf.len() - 1] {
                assert!(b & 0x0F <= 9);
            }
            assert!(buf[buf.len() - 1] & 0x0F >= TERM_NIBBLE);
        }
    }

    #[test]
    fn rejects_truncated_and_garbage_input() {
        assert!(Bcd::decode(&[]).is_err());
        assert!(Bcd::decode(&[0x42]).is_err());
        assert!(Bcd::decode(&[0xAB]).is_err()); // terminator with no digits
        assert!(Bcd::decode(&[0xC4]).is_err());
        assert!(Bcd::skip(&[0x12, 0x34]).is_err());
    }
}
