//! Encoding segments: one mode plus the raw characters it carries.

use crate::bitstream::BitBuffer;
use crate::error::{QrError, Result};
use crate::spec::Version;

static ALPHANUMERIC_CHARSET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum QrSegmentMode {
    Numeric,
    Alphanumeric,
    Byte,
    /// Shift JIS double-byte characters.
    Kanji,
    Eci,
    StructuredAppend,
}

impl QrSegmentMode {
    /// The 4-bit mode indicator.
    pub fn mode_bits(self) -> u32 {
        use QrSegmentMode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
            Kanji => 0x8,
            Eci => 0x7,
            StructuredAppend => 0x3,
        }
    }

    /// Width of the character count indicator at the given version.
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        use QrSegmentMode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
            Kanji => [8, 10, 12],
            Eci | StructuredAppend => [0, 0, 0],
        })[ver.tier()]
    }

    /// Most characters one segment header can announce at this version.
    pub fn max_chars(self, ver: Version) -> usize {
        (1usize << self.num_char_count_bits(ver)) - 1
    }

    /// Payload bits (no header) for `numchars` characters in this mode.
    pub fn payload_bits(self, numchars: usize) -> usize {
        use QrSegmentMode::*;
        match self {
            Numeric => numchars / 3 * 10 + [0, 4, 7][numchars % 3],
            Alphanumeric => numchars / 2 * 11 + 6 * (numchars % 2),
            Byte => numchars * 8,
            Kanji => numchars * 13,
            Eci | StructuredAppend => 0,
        }
    }
}

/// A segment of data in a QR code.
///
/// Segments keep their raw characters and are packed when the target version
/// is known, since the count indicator width depends on it. A segment longer
/// than one header can announce is written as several consecutive headers.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QrSegment {
    mode: QrSegmentMode,
    numchars: usize,
    data: Vec<u8>,
}

impl QrSegment {
    /// Validates `data` against `mode` and wraps it in a segment.
    pub fn new(mode: QrSegmentMode, data: &[u8]) -> Result<Self> {
        use QrSegmentMode::*;
        match mode {
            Numeric => Self::make_numeric(data),
            Alphanumeric => Self::make_alphanumeric(data),
            Byte => Ok(Self::make_bytes(data)),
            Kanji => Self::make_kanji(data),
            Eci | StructuredAppend => Err(QrError::UnsupportedMode {
                mode,
                reason: "header segments carry no character data".to_string(),
            }),
        }
    }

    pub fn make_bytes(data: &[u8]) -> Self {
        Self {
            mode: QrSegmentMode::Byte,
            numchars: data.len(),
            data: data.to_vec(),
        }
    }

    /// Creates a segment for a string of decimal digits in numeric mode.
    pub fn make_numeric(digits: &[u8]) -> Result<Self> {
        if let Some(&b) = digits.iter().find(|b| !b.is_ascii_digit()) {
            return Err(QrError::UnsupportedMode {
                mode: QrSegmentMode::Numeric,
                reason: format!("byte 0x{b:02x} is not a decimal digit"),
            });
        }
        Ok(Self {
            mode: QrSegmentMode::Numeric,
            numchars: digits.len(),
            data: digits.to_vec(),
        })
    }

    /// Creates a segment for alphanumeric text.
    ///
    /// Allowed characters: 0–9, A–Z (uppercase), space, `$`, `%`, `*`, `+`, `-`, `.`, `/`, `:`.
    pub fn make_alphanumeric(text: &[u8]) -> Result<Self> {
        if let Some(&b) = text.iter().find(|&&b| alphanumeric_index(b).is_none()) {
            return Err(QrError::UnsupportedMode {
                mode: QrSegmentMode::Alphanumeric,
                reason: format!("byte 0x{b:02x} is outside the alphanumeric charset"),
            });
        }
        Ok(Self {
            mode: QrSegmentMode::Alphanumeric,
            numchars: text.len(),
            data: text.to_vec(),
        })
    }

    /// Creates a segment of Shift JIS double-byte characters.
    pub fn make_kanji(sjis: &[u8]) -> Result<Self> {
        let unsupported = |reason: String| QrError::UnsupportedMode {
            mode: QrSegmentMode::Kanji,
            reason,
        };
        if sjis.len() % 2 != 0 {
            return Err(unsupported(format!("odd byte length {}", sjis.len())));
        }
        for pair in sjis.chunks_exact(2) {
            if !is_kanji_pair(pair[0], pair[1]) {
                return Err(unsupported(format!(
                    "0x{:02x}{:02x} is not a double-byte character",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self {
            mode: QrSegmentMode::Kanji,
            numchars: sjis.len() / 2,
            data: sjis.to_vec(),
        })
    }

    /// Creates a segment representing an Extended Channel Interpretation
    /// (ECI) designator with the given assignment value.
    pub fn make_eci(assignval: u32) -> Result<Self> {
        if assignval >= 1_000_000 {
            return Err(QrError::UnsupportedMode {
                mode: QrSegmentMode::Eci,
                reason: format!("assignment value {assignval} out of range"),
            });
        }
        Ok(Self {
            mode: QrSegmentMode::Eci,
            numchars: 0,
            data: assignval.to_be_bytes().to_vec(),
        })
    }

    /// Creates a structured append header for symbol `index` (0-based) of
    /// `total` symbols sharing one `parity` byte.
    pub fn make_structured_append(total: usize, index: usize, parity: u8) -> Result<Self> {
        if !(2..=16).contains(&total) || index >= total {
            return Err(QrError::UnsupportedMode {
                mode: QrSegmentMode::StructuredAppend,
                reason: format!("symbol {index} of {total} (expected 2..=16 symbols)"),
            });
        }
        Ok(Self {
            mode: QrSegmentMode::StructuredAppend,
            numchars: 0,
            data: vec![index as u8, total as u8, parity],
        })
    }

    pub fn mode(&self) -> QrSegmentMode {
        self.mode
    }

    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn eci_value(&self) -> u32 {
        u32::from_be_bytes([self.data[0], self.data[1], self.data[2], self.data[3]])
    }

    /// Bits this segment occupies when written at `version`, headers included.
    pub fn bit_length(&self, version: Version) -> usize {
        use QrSegmentMode::*;
        match self.mode {
            Eci => {
                let val = self.eci_value();
                4 + eci_designator_bits(val)
            }
            StructuredAppend => 20,
            mode => {
                let maxchars = mode.max_chars(version);
                let header = 4 + usize::from(mode.num_char_count_bits(version));
                let fullchunks = self.numchars / maxchars;
                let rest = self.numchars % maxchars;
                let mut bits = fullchunks * (header + mode.payload_bits(maxchars));
                if rest > 0 || self.numchars == 0 {
                    bits += header + mode.payload_bits(rest);
                }
                bits
            }
        }
    }

    /// Writes mode indicator, count indicator and packed payload.
    pub fn append_to(&self, version: Version, bb: &mut BitBuffer) {
        use QrSegmentMode::*;
        match self.mode {
            Eci => {
                bb.append_bits(Eci.mode_bits(), 4);
                let val = self.eci_value();
                if val < 1 << 7 {
                    bb.append_bits(val, 8);
                } else if val < 1 << 14 {
                    bb.append_bits(0b10, 2);
                    bb.append_bits(val, 14);
                } else {
                    bb.append_bits(0b110, 3);
                    bb.append_bits(val, 21);
                }
            }
            StructuredAppend => {
                bb.append_bits(StructuredAppend.mode_bits(), 4);
                bb.append_bits(u32::from(self.data[0]), 4);
                bb.append_bits(u32::from(self.data[1]) - 1, 4);
                bb.append_bits(u32::from(self.data[2]), 8);
            }
            mode => {
                let unit = if mode == Kanji { 2 } else { 1 };
                let ccbits = mode.num_char_count_bits(version);
                if self.data.is_empty() {
                    bb.append_bits(mode.mode_bits(), 4);
                    bb.append_bits(0, ccbits);
                    return;
                }
                for chunk in self.data.chunks(mode.max_chars(version) * unit) {
                    bb.append_bits(mode.mode_bits(), 4);
                    bb.append_bits((chunk.len() / unit) as u32, ccbits);
                    pack(mode, chunk, bb);
                }
            }
        }
    }

    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_digit())
    }

    pub fn is_alphanumeric(text: &str) -> bool {
        text.bytes().all(|b| alphanumeric_index(b).is_some())
    }
}

fn pack(mode: QrSegmentMode, chunk: &[u8], bb: &mut BitBuffer) {
    use QrSegmentMode::*;
    match mode {
        Numeric => {
            for group in chunk.chunks(3) {
                let value = group.iter().fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'));
                bb.append_bits(value, group.len() as u8 * 3 + 1);
            }
        }
        Alphanumeric => {
            for pair in chunk.chunks(2) {
                let mut value: u32 = 0;
                for &b in pair {
                    value = value * 45 + u32::from(alphanumeric_index(b).unwrap_or(0));
                }
                bb.append_bits(value, if pair.len() == 2 { 11 } else { 6 });
            }
        }
        Byte => bb.append_bytes(chunk),
        Kanji => {
            for pair in chunk.chunks_exact(2) {
                let word = u32::from(pair[0]) << 8 | u32::from(pair[1]);
                let shifted = if word <= 0x9ffc { word - 0x8140 } else { word - 0xc140 };
                bb.append_bits((shifted >> 8) * 0xc0 + (shifted & 0xff), 13);
            }
        }
        Eci | StructuredAppend => {}
    }
}

fn eci_designator_bits(val: u32) -> usize {
    if val < 1 << 7 {
        8
    } else if val < 1 << 14 {
        16
    } else {
        24
    }
}

/// Position of `b` in the 45-character alphanumeric set.
pub fn alphanumeric_index(b: u8) -> Option<u8> {
    ALPHANUMERIC_CHARSET.iter().position(|&c| c == b).map(|i| i as u8)
}

/// Whether two bytes form a Shift JIS character that Kanji mode can carry.
pub fn is_kanji_pair(hi: u8, lo: u8) -> bool {
    let word = u16::from(hi) << 8 | u16::from(lo);
    (0x40..=0xfc).contains(&lo)
        && ((0x8140..=0x9ffc).contains(&word) || (0xe040..=0xebbf).contains(&word))
}
