//! Splits mixed content into mode segments.
//!
//! Each run is encoded in the cheapest mode its characters allow, but a short
//! numeric or alphanumeric run embedded in a wider mode is only split out when
//! the saved payload bits outweigh the cost of the extra segment header.
//! Byte versus Kanji is never guessed: the caller's hint decides whether
//! double-byte pairs are recognised at all.

use log::trace;

use crate::error::{QrError, Result};
use crate::input::QrInput;
use crate::segment::{alphanumeric_index, is_kanji_pair, QrSegment, QrSegmentMode};
use crate::spec::Version;

/// Splits `data` and appends the resulting segments to `input`.
///
/// Count indicator widths are taken from the input's version, or version 1
/// when the version is automatic.
pub fn split_into(
    data: &[u8],
    input: &mut QrInput,
    hint: QrSegmentMode,
    case_sensitive: bool,
) -> Result<()> {
    let version = Version::try_from(input.version()).unwrap_or(Version::MIN);
    for seg in split_segments(data, version, hint, case_sensitive)? {
        input.append_segment(seg);
    }
    Ok(())
}

/// Splits `data` into segments using the count indicator widths of `version`.
///
/// # Errors
///
/// [`QrError::UnsupportedMode`] if `hint` is neither `Byte` nor `Kanji`.
pub fn split_segments(
    data: &[u8],
    version: Version,
    hint: QrSegmentMode,
    case_sensitive: bool,
) -> Result<Vec<QrSegment>> {
    if hint != QrSegmentMode::Byte && hint != QrSegmentMode::Kanji {
        return Err(QrError::UnsupportedMode {
            mode: hint,
            reason: "only Byte or Kanji may be used as a split hint".to_string(),
        });
    }
    let splitter = Splitter { version, hint };
    let folded;
    let mut rest: &[u8] = if case_sensitive {
        data
    } else {
        folded = splitter.to_upper(data);
        &folded
    };

    let mut segments = Vec::new();
    while !rest.is_empty() {
        let (mode, len) = match splitter.identify_mode(rest, 0) {
            Some(QrSegmentMode::Numeric) => splitter.eat_num(rest),
            Some(QrSegmentMode::Alphanumeric) => splitter.eat_an(rest),
            Some(QrSegmentMode::Kanji) => splitter.eat_kanji(rest),
            _ => splitter.eat_8(rest),
        };
        trace!("Split {:?} segment of {} bytes", mode, len);
        segments.push(QrSegment::new(mode, &rest[..len])?);
        rest = &rest[len..];
    }
    Ok(segments)
}

struct Splitter {
    version: Version,
    hint: QrSegmentMode,
}

impl Splitter {
    fn identify_mode(&self, data: &[u8], pos: usize) -> Option<QrSegmentMode> {
        let c = *data.get(pos)?;
        Some(if c.is_ascii_digit() {
            QrSegmentMode::Numeric
        } else if alphanumeric_index(c).is_some() {
            QrSegmentMode::Alphanumeric
        } else if self.hint == QrSegmentMode::Kanji
            && data.get(pos + 1).is_some_and(|&d| is_kanji_pair(c, d))
        {
            QrSegmentMode::Kanji
        } else {
            QrSegmentMode::Byte
        })
    }

    fn is_digit_at(data: &[u8], pos: usize) -> bool {
        data.get(pos).is_some_and(u8::is_ascii_digit)
    }

    fn is_alnum_at(data: &[u8], pos: usize) -> bool {
        data.get(pos).is_some_and(|&c| alphanumeric_index(c).is_some())
    }

    /// Header bits a new segment of `mode` costs at this version.
    fn header_bits(&self, mode: QrSegmentMode) -> isize {
        4 + isize::from(mode.num_char_count_bits(self.version))
    }

    fn bits(mode: QrSegmentMode, numchars: usize) -> isize {
        mode.payload_bits(numchars) as isize
    }

    fn eat_num(&self, data: &[u8]) -> (QrSegmentMode, usize) {
        use QrSegmentMode::*;
        let mut p = 0;
        while Self::is_digit_at(data, p) {
            p += 1;
        }
        let run = p;
        match self.identify_mode(data, p) {
            Some(Byte) => {
                let dif = Self::bits(Numeric, run) + self.header_bits(Numeric) + Self::bits(Byte, 1)
                    - Self::bits(Byte, run + 1);
                if dif > 0 {
                    return self.eat_8(data);
                }
            }
            Some(Alphanumeric) => {
                let dif = Self::bits(Numeric, run)
                    + self.header_bits(Numeric)
                    + Self::bits(Alphanumeric, 1)
                    - Self::bits(Alphanumeric, run + 1);
                if dif > 0 {
                    return self.eat_an(data);
                }
            }
            _ => {}
        }
        (Numeric, run)
    }

    fn eat_an(&self, data: &[u8]) -> (QrSegmentMode, usize) {
        use QrSegmentMode::*;
        let mut p = 0;
        while Self::is_alnum_at(data, p) {
            if Self::is_digit_at(data, p) {
                let mut q = p;
                while Self::is_digit_at(data, q) {
                    q += 1;
                }
                let dif = Self::bits(Alphanumeric, p)
                    + Self::bits(Numeric, q - p)
                    + self.header_bits(Numeric)
                    - Self::bits(Alphanumeric, q);
                if dif < 0 {
                    break;
                }
                p = q;
            } else {
                p += 1;
            }
        }
        let run = p;
        if p < data.len() && !Self::is_alnum_at(data, p) {
            let dif = Self::bits(Alphanumeric, run)
                + self.header_bits(Alphanumeric)
                + Self::bits(Byte, 1)
                - Self::bits(Byte, run + 1);
            if dif > 0 {
                return self.eat_8(data);
            }
        }
        (Alphanumeric, run)
    }

    fn eat_kanji(&self, data: &[u8]) -> (QrSegmentMode, usize) {
        let mut p = 0;
        while self.identify_mode(data, p) == Some(QrSegmentMode::Kanji) {
            p += 2;
        }
        (QrSegmentMode::Kanji, p)
    }

    fn eat_8(&self, data: &[u8]) -> (QrSegmentMode, usize) {
        use QrSegmentMode::*;
        let mut p = 1;
        while p < data.len() {
            match self.identify_mode(data, p) {
                Some(Kanji) => break,
                Some(Numeric) => {
                    let mut q = p;
                    while Self::is_digit_at(data, q) {
                        q += 1;
                    }
                    let dif = Self::bits(Byte, p)
                        + Self::bits(Numeric, q - p)
                        + self.header_bits(Numeric)
                        - Self::bits(Byte, q);
                    if dif < 0 {
                        break;
                    }
                    p = q;
                }
                Some(Alphanumeric) => {
                    let mut q = p;
                    while Self::is_alnum_at(data, q) {
                        q += 1;
                    }
                    let dif = Self::bits(Byte, p) + Self::bits(Alphanumeric, q - p)
                        + self.header_bits(Alphanumeric)
                        - Self::bits(Byte, q);
                    if dif < 0 {
                        break;
                    }
                    p = q;
                }
                _ => p += 1,
            }
        }
        (Byte, p)
    }

    /// ASCII upper-casing that leaves double-byte pairs untouched.
    fn to_upper(&self, data: &[u8]) -> Vec<u8> {
        let mut result = data.to_vec();
        let mut p = 0;
        while p < result.len() {
            if self.identify_mode(&result, p) == Some(QrSegmentMode::Kanji) {
                p += 2;
            } else {
                result[p] = result[p].to_ascii_uppercase();
                p += 1;
            }
        }
        result
    }
}
