//! The encoding pipeline and the finished symbol.
//!
//! `QrCode` sequences the whole pipeline: segments are packed into data
//! codewords ([`QrInput`]), split into blocks and extended with error
//! correction ([`RawCode`]), placed into the version template
//! ([`FrameFiller`]) and finally masked and format-stamped ([`select_mask`]).

use std::fmt;

use crate::error::{QrError, Result};
use crate::filler::FrameFiller;
use crate::input::QrInput;
use crate::mask::{select_mask, Mask, MaskStrategy};
use crate::rawcode::RawCode;
use crate::segment::{QrSegment, QrSegmentMode};
use crate::spec::{self, QrCodeEcc, Version};
use crate::split;

/// Number of header bits a structured append segment takes.
const STRUCTURED_APPEND_BITS: usize = 20;

/// Caller-supplied encoding parameters.
///
/// # Example
///
/// ```rust
/// use qrmatrix::{EncodeOptions, QrCodeEcc, Mask, MaskStrategy};
///
/// let options = EncodeOptions::default()
///     .with_version(5)
///     .with_level(QrCodeEcc::Quartile)
///     .with_mask(MaskStrategy::Fixed(Mask::new(2)));
/// assert_eq!(options.version, 5);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EncodeOptions {
    /// 1 to 40, or 0 for the smallest version that fits.
    pub version: u8,
    pub level: QrCodeEcc,
    /// `Byte` or `Kanji`: how bytes outside the numeric and alphanumeric
    /// sets are encoded.
    pub hint: QrSegmentMode,
    /// When false, ASCII lowercase is upper-cased so it can use
    /// alphanumeric mode.
    pub case_sensitive: bool,
    pub mask: MaskStrategy,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            version: 0,
            level: QrCodeEcc::Low,
            hint: QrSegmentMode::Byte,
            case_sensitive: true,
            mask: MaskStrategy::Best,
        }
    }
}

impl EncodeOptions {
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn with_level(mut self, level: QrCodeEcc) -> Self {
        self.level = level;
        self
    }

    pub fn with_hint(mut self, hint: QrSegmentMode) -> Self {
        self.hint = hint;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_mask(mut self, mask: MaskStrategy) -> Self {
        self.mask = mask;
        self
    }
}

/// A finished QR symbol: a square grid of dark and light modules.
///
/// Instances are immutable once built.
///
/// # Example
///
/// ```rust
/// use qrmatrix::{EncodeOptions, QrCode, QrCodeEcc};
///
/// let options = EncodeOptions::default().with_level(QrCodeEcc::Medium);
/// let qr = QrCode::encode_text("HELLO WORLD", &options).unwrap();
/// assert_eq!(qr.version().value(), 1);
/// assert_eq!(qr.size(), 21);
/// assert_eq!(qr.error_correction_level(), QrCodeEcc::Medium);
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QrCode {
    version: Version,
    size: usize,
    errorcorrectionlevel: QrCodeEcc,
    mask: Mask,
    // Row-major, true = dark
    modules: Vec<bool>,
}

impl QrCode {
    /// Encodes text, splitting it into the cheapest mix of modes.
    pub fn encode_text(text: &str, options: &EncodeOptions) -> Result<Self> {
        Self::encode_segmented(text.as_bytes(), options)
    }

    /// Encodes raw bytes, splitting them into the cheapest mix of modes
    /// according to the options' hint and case sensitivity.
    pub fn encode_segmented(data: &[u8], options: &EncodeOptions) -> Result<Self> {
        let mut input = QrInput::new(options.version, options.level)?;
        split::split_into(data, &mut input, options.hint, options.case_sensitive)?;
        Self::encode_input(&input, options.mask)
    }

    /// Encodes raw bytes as a single byte-mode segment.
    pub fn encode_binary(data: &[u8], options: &EncodeOptions) -> Result<Self> {
        let mut input = QrInput::new(options.version, options.level)?;
        input.append_segment(QrSegment::make_bytes(data));
        Self::encode_input(&input, options.mask)
    }

    /// Encodes caller-built segments in order.
    pub fn encode_segments(segs: &[QrSegment], options: &EncodeOptions) -> Result<Self> {
        let mut input = QrInput::new(options.version, options.level)?;
        for seg in segs {
            input.append_segment(seg.clone());
        }
        Self::encode_input(&input, options.mask)
    }

    /// Runs the full pipeline on a prepared input.
    ///
    /// # Panics
    ///
    /// Panics if the version template and the capacity tables disagree on
    /// the number of data modules.
    pub fn encode_input(input: &QrInput, strategy: MaskStrategy) -> Result<Self> {
        let ecl = input.level();
        let (version, data) = input.finish()?;
        let raw = RawCode::new(&data, version, ecl);

        let mut frame = version.template();
        let expected = raw.codewords().len() * 8 + version.remainder_bits();
        let mut bits = raw.bits().chain(std::iter::repeat(false).take(version.remainder_bits()));
        let mut placed = 0usize;
        let mut filler = FrameFiller::new(&mut frame);
        while let Some(addr) = filler.next() {
            match bits.next() {
                Some(bit) => filler.set_frame_at(addr, bit),
                None => panic!(
                    "Template consistency failure at version {version} level {ecl}: \
                     more free modules than {expected} bits"
                ),
            }
            placed += 1;
        }
        if placed != expected {
            panic!(
                "Template consistency failure at version {version} level {ecl}: \
                 placed {placed} of {expected} bits"
            );
        }

        let candidate = select_mask(&frame, ecl, version, strategy);
        Ok(Self {
            version,
            size: version.width(),
            errorcorrectionlevel: ecl,
            mask: candidate.mask,
            modules: candidate.matrix.to_bools(),
        })
    }

    /// Splits `data` across a series of symbols linked by structured append
    /// headers.
    ///
    /// Every symbol uses the explicit version in `options`; the parity byte
    /// is the XOR of all payload bytes. A payload that fits one symbol is
    /// returned as a single plain symbol.
    ///
    /// # Errors
    ///
    /// - [`QrError::InvalidVersion`] when the version is automatic (0).
    /// - [`QrError::CapacityExceeded`] when more than 16 symbols are needed.
    pub fn encode_structured(data: &[u8], options: &EncodeOptions) -> Result<Vec<Self>> {
        let version = Version::try_from(options.version)?;
        let capacity = version.data_codewords(options.level) * 8;
        let header = STRUCTURED_APPEND_BITS
            + 4
            + usize::from(QrSegmentMode::Byte.num_char_count_bits(version));
        let chunk = capacity.saturating_sub(header) / 8;

        if data.len() * 8 + header - STRUCTURED_APPEND_BITS <= capacity {
            return Ok(vec![Self::encode_binary(data, options)?]);
        }
        let total = data.len().div_ceil(chunk.max(1));
        if chunk == 0 || total > 16 {
            return Err(QrError::CapacityExceeded {
                bits: data.len() * 8,
                capacity: chunk * 8 * 16,
            });
        }

        let parity = data.iter().fold(0u8, |acc, &b| acc ^ b);
        data.chunks(chunk)
            .enumerate()
            .map(|(index, part)| {
                let mut input = QrInput::new(options.version, options.level)?;
                input.append_segment(QrSegment::make_bytes(part));
                input.insert_structured_append_header(total, index, parity)?;
                Self::encode_input(&input, options.mask)
            })
            .collect()
    }

    /// Rebuilds a symbol from rows of `'0'` and `'1'` characters, as written
    /// by [`QrCode::rows`]. Level and mask are read back from the format
    /// information.
    pub fn from_text(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let size = rows.len();
        if !(21..=177).contains(&size) || (size - 17) % 4 != 0 {
            return Err(QrError::MalformedMatrix(format!("{size} rows is not a symbol width")));
        }
        let version = Version::try_from(((size - 17) / 4) as u8)
            .map_err(|_| QrError::MalformedMatrix(format!("{size} rows is not a symbol width")))?;

        let mut modules = Vec::with_capacity(size * size);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(QrError::MalformedMatrix(format!(
                    "row {y} has {} modules, expected {size}",
                    row.len()
                )));
            }
            for c in row.chars() {
                match c {
                    '0' => modules.push(false),
                    '1' => modules.push(true),
                    _ => {
                        return Err(QrError::MalformedMatrix(format!(
                            "unexpected character {c:?} in row {y}"
                        )))
                    }
                }
            }
        }

        let mut qr = Self {
            version,
            size,
            errorcorrectionlevel: QrCodeEcc::Low,
            mask: Mask::new(0),
            modules,
        };
        let (ecl, mask) = qr.read_format_info().ok_or_else(|| {
            QrError::MalformedMatrix("format information is unreadable".to_string())
        })?;
        qr.errorcorrectionlevel = ecl;
        qr.mask = mask;
        Ok(qr)
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Width and height in modules, `17 + 4 * version`.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.errorcorrectionlevel
    }

    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Color of the module at column `x`, row `y` (`true` = dark). Anything
    /// outside the symbol is light, which gives renderers the quiet zone.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let size = self.size as i32;
        (0..size).contains(&x) && (0..size).contains(&y) && self.modules[(y * size + x) as usize]
    }

    /// Row-major modules, `true` = dark.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Decodes the format information from the matrix, trying the copy
    /// around the top-left finder first and the split copy second.
    pub fn read_format_info(&self) -> Option<(QrCodeEcc, Mask)> {
        let positions = spec::format_info_positions(self.size);
        (0..2).find_map(|copy| {
            let bits = positions.iter().enumerate().fold(0u16, |acc, (i, pair)| {
                let (x, y) = pair[copy];
                acc | (u16::from(self.get_module(x as i32, y as i32)) << i)
            });
            spec::decode_format_bits(bits)
        })
    }

    /// One `'0'`/`'1'` string per row, `'1'` = dark.
    pub fn rows(&self) -> Vec<String> {
        self.modules
            .chunks(self.size)
            .map(|row| row.iter().map(|&dark| if dark { '1' } else { '0' }).collect())
            .collect()
    }
}

impl fmt::Display for QrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
